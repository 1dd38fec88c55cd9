use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::RwLock;
use qnet_types::{Address, Hash32, Transaction};
use tracing::{debug, warn};

use super::admission::{self, Provisional};
use super::entities::{PooledTransaction, PriorityKey};
use super::errors::RejectionReason;
use crate::ports::AccountView;

pub const DEFAULT_MAX_SIZE: usize = 50_000;
pub const DEFAULT_MIN_GAS_PRICE: u128 = 1;
pub const TX_TTL_SECONDS: u64 = 3_600;

struct Inner {
    by_fingerprint: HashMap<Hash32, PooledTransaction>,
    by_price: BTreeSet<PriorityKey>,
    /// Per-sender nonce chain, to enforce monotonic inclusion and to
    /// compute provisional nonce/balance for admission.
    by_sender: BTreeMap<Address, BTreeMap<u64, Hash32>>,
}

impl Inner {
    fn new() -> Self {
        Self { by_fingerprint: HashMap::new(), by_price: BTreeSet::new(), by_sender: BTreeMap::new() }
    }

    fn provisional_for(&self, sender: &Address, base_nonce: u64, base_balance: u128) -> Provisional {
        let mut nonce = base_nonce;
        let mut spent = 0u128;
        if let Some(chain) = self.by_sender.get(sender) {
            for (pending_nonce, fingerprint) in chain {
                if *pending_nonce == nonce + 1 {
                    nonce += 1;
                    if let Some(pooled) = self.by_fingerprint.get(fingerprint) {
                        spent = spent.saturating_add(pooled.tx.amount).saturating_add(pooled.tx.fee);
                    }
                } else {
                    break;
                }
            }
        }
        Provisional { nonce, balance: base_balance.saturating_sub(spent) }
    }
}

/// Guarded transaction pool: `spec.md` §4.3/§5 — writers serialize
/// admissions, readers (the round driver) get a consistent snapshot via
/// the single `RwLock`.
pub struct TransactionPool {
    inner: RwLock<Inner>,
    max_size: usize,
    min_gas_price: u128,
}

impl TransactionPool {
    pub fn new(max_size: usize, min_gas_price: u128) -> Self {
        Self { inner: RwLock::new(Inner::new()), max_size, min_gas_price }
    }

    pub fn add_transaction(
        &self,
        tx: Transaction,
        accounts: &dyn AccountView,
        now: u64,
    ) -> Result<Hash32, RejectionReason> {
        let fingerprint = qnet_crypto::hashing::tx_fingerprint(&tx);
        let sender = tx.sender;

        let mut inner = self.inner.write();
        let base_nonce = accounts.current_nonce(&sender);
        let base_balance = accounts.balance(&sender);
        let provisional = inner.provisional_for(&sender, base_nonce, base_balance);

        admission::admit(
            &tx,
            || inner.by_fingerprint.contains_key(&fingerprint),
            accounts,
            provisional,
            self.min_gas_price,
        )?;

        let pooled = PooledTransaction { tx, fingerprint, submission_ts: now };
        inner.by_price.insert(PriorityKey::of(&pooled));
        inner.by_sender.entry(sender).or_default().insert(pooled.nonce(), fingerprint);
        inner.by_fingerprint.insert(fingerprint, pooled);

        if inner.by_fingerprint.len() > self.max_size {
            evict_lowest_priority(&mut inner);
        }

        debug!(?fingerprint, "transaction admitted");
        Ok(fingerprint)
    }

    /// Top-priority transactions honoring per-sender nonce monotonicity:
    /// a sender's nonce `k+1` is only included once `k` is already in the
    /// returned batch (or already confirmed).
    pub fn get_for_inclusion(&self, max_count: usize, max_bytes: usize) -> Vec<Transaction> {
        let inner = self.inner.read();
        let mut included_nonce: HashMap<Address, u64> = HashMap::new();
        let mut out = Vec::new();
        let mut bytes = 0usize;

        for key in inner.by_price.iter() {
            if out.len() >= max_count {
                break;
            }
            let Some(pooled) = inner.by_fingerprint.get(&key.fingerprint) else { continue };
            let sender = pooled.sender();
            let expected_next = included_nonce.get(&sender).copied().unwrap_or_else(|| {
                inner
                    .by_sender
                    .get(&sender)
                    .and_then(|chain| chain.keys().next())
                    .map(|first| first.saturating_sub(1))
                    .unwrap_or(pooled.nonce().saturating_sub(1))
            });
            if pooled.nonce() != expected_next + 1 {
                continue;
            }
            let size = serde_json::to_vec(&pooled.tx).map(|b| b.len()).unwrap_or(0);
            if bytes + size > max_bytes {
                continue;
            }
            bytes += size;
            included_nonce.insert(sender, pooled.nonce());
            out.push(pooled.tx.clone());
        }
        out
    }

    pub fn remove_confirmed(&self, hashes: &[Hash32]) {
        let mut inner = self.inner.write();
        for fingerprint in hashes {
            if let Some(pooled) = inner.by_fingerprint.remove(fingerprint) {
                inner.by_price.remove(&PriorityKey::of(&pooled));
                if let Some(chain) = inner.by_sender.get_mut(&pooled.sender()) {
                    chain.remove(&pooled.nonce());
                    if chain.is_empty() {
                        inner.by_sender.remove(&pooled.sender());
                    }
                }
            }
        }
    }

    pub fn size(&self) -> usize {
        self.inner.read().by_fingerprint.len()
    }

    pub fn get(&self, fingerprint: &Hash32) -> Option<Transaction> {
        self.inner.read().by_fingerprint.get(fingerprint).map(|p| p.tx.clone())
    }

    /// Drops entries older than `TX_TTL_SECONDS`. Run from the
    /// background-sweep task (T4).
    pub fn prune_expired(&self, now: u64) {
        let mut inner = self.inner.write();
        let expired: Vec<Hash32> = inner
            .by_fingerprint
            .values()
            .filter(|p| now.saturating_sub(p.submission_ts) > TX_TTL_SECONDS)
            .map(|p| p.fingerprint)
            .collect();
        drop(inner);
        if !expired.is_empty() {
            warn!(count = expired.len(), "pruning expired mempool transactions");
            self.remove_confirmed(&expired);
        }
    }
}

/// Evicts the single lowest-priority (lowest gas price, then oldest)
/// entry. Called once per admission once `max_size` is exceeded, so the
/// pool never grows unbounded.
fn evict_lowest_priority(inner: &mut Inner) {
    if let Some(worst) = inner.by_price.iter().next_back().copied() {
        inner.by_price.remove(&worst);
        if let Some(pooled) = inner.by_fingerprint.remove(&worst.fingerprint) {
            if let Some(chain) = inner.by_sender.get_mut(&pooled.sender()) {
                chain.remove(&pooled.nonce());
                if chain.is_empty() {
                    inner.by_sender.remove(&pooled.sender());
                }
            }
        }
    }
}
