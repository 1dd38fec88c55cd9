use qnet_types::{Address, Hash32, Transaction};

#[derive(Debug, Clone)]
pub struct PooledTransaction {
    pub tx: Transaction,
    pub fingerprint: Hash32,
    pub submission_ts: u64,
}

impl PooledTransaction {
    pub fn sender(&self) -> Address {
        self.tx.sender
    }

    pub fn nonce(&self) -> u64 {
        self.tx.nonce
    }

    /// The mempool's ordering price. `spec.md` §4.3 calls this
    /// `gas_price`; QNet has no gas metering, so the transaction's flat
    /// `fee` fills that role.
    pub fn gas_price(&self) -> u128 {
        self.tx.fee
    }
}

/// Ordering key for the priced index: `(gas_price desc, submission_ts asc)`.
/// Implemented as a tuple that sorts ascending by negated price then by
/// timestamp, so a `BTreeSet` of these yields the spec's priority order
/// when iterated front-to-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    pub neg_gas_price: std::cmp::Reverse<u128>,
    pub submission_ts: u64,
    pub fingerprint: Hash32,
}

impl PriorityKey {
    pub fn of(pooled: &PooledTransaction) -> Self {
        Self {
            neg_gas_price: std::cmp::Reverse(pooled.gas_price()),
            submission_ts: pooled.submission_ts,
            fingerprint: pooled.fingerprint,
        }
    }
}
