use serde::{Deserialize, Serialize};

use crate::{Address, Hash32};

/// The kinds of transactions the mempool and consensus engine accept.
/// `spec.md` §3 distinguishes transfers from the two activation flavors;
/// everything else (contract calls, bridge messages) is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Transfer,
    ActivationPhase1,
    ActivationPhase2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    pub recipient: Address,
    pub amount: u128,
    pub nonce: u64,
    pub fee: u128,
    pub kind: TransactionKind,
    /// Set only for `ActivationPhase1`/`ActivationPhase2`: the externally
    /// verified burn/payment reference this transaction redeems.
    pub proof_ref: Option<String>,
    /// Dilithium3 public key bytes; `sender` must equal `hash(sender_pubkey)`.
    /// Dilithium has no signature-recovery shortcut, so the key travels
    /// with the transaction rather than being derived from the signature.
    pub sender_pubkey: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Transaction {
    /// Fields that enter the canonical signing/hash payload, in order.
    /// `signature` is excluded — it signs over everything else.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(&self.sender);
        buf.extend_from_slice(&self.recipient);
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(&self.fee.to_be_bytes());
        buf.push(self.kind as u8);
        if let Some(r) = &self.proof_ref {
            buf.extend_from_slice(r.as_bytes());
        }
        buf.extend_from_slice(&self.sender_pubkey);
        buf
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub tx: Transaction,
    pub fingerprint: Hash32,
    pub block_height: u64,
}
