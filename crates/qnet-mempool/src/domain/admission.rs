use qnet_crypto::envelope::{self, PublicKey, Signature};
use qnet_types::{Address, Transaction};

use super::errors::RejectionReason;
use crate::ports::AccountView;

pub const MAX_TX_SIZE_BYTES: usize = 100 * 1024;

/// Provisional balance/nonce for a sender, folding in the effect of their
/// other mempool-resident transactions so chained submissions (nonce N,
/// N+1, N+2, ...) are accepted before any of them confirm on chain.
pub struct Provisional {
    pub nonce: u64,
    pub balance: u128,
}

/// Runs the seven-step admission pipeline from `spec.md` §4.3. The first
/// failing check rejects; later checks are not attempted.
pub fn admit(
    tx: &Transaction,
    fingerprint_exists: impl FnOnce() -> bool,
    accounts: &dyn AccountView,
    provisional: Provisional,
    min_gas_price: u128,
) -> Result<(), RejectionReason> {
    // 1. Syntactic.
    let approx_size = serde_json::to_vec(tx).map(|b| b.len()).unwrap_or(usize::MAX);
    if approx_size > MAX_TX_SIZE_BYTES {
        return Err(RejectionReason::TooLarge { max: MAX_TX_SIZE_BYTES });
    }
    if tx.sender_pubkey.is_empty() || tx.signature.is_empty() {
        return Err(RejectionReason::Syntactic("missing sender_pubkey or signature".into()));
    }

    // 2. Signature verifies.
    let pk = PublicKey::from_bytes(&tx.sender_pubkey).map_err(|_| RejectionReason::BadSignature)?;
    let sig = Signature::from_bytes(&tx.signature).map_err(|_| RejectionReason::BadSignature)?;
    if !envelope::verify(&tx.signing_payload(), &sig, &pk) {
        return Err(RejectionReason::BadSignature);
    }

    // 3. tx.from == hash(pub_key).
    let derived: Address = envelope::address_of(&pk);
    if derived != tx.sender {
        return Err(RejectionReason::SenderMismatch);
    }

    // 4. Nonce strictly current+1 against provisional state.
    let expected = provisional.nonce + 1;
    if tx.nonce != expected {
        return Err(RejectionReason::BadNonce { expected, got: tx.nonce });
    }

    // 5. Balance sufficient against provisional state.
    let required = tx.amount.saturating_add(tx.fee);
    if provisional.balance < required {
        return Err(RejectionReason::InsufficientFunds);
    }
    let _ = accounts; // provisional already folds in live account state by construction.

    // 6. Minimum gas price (flat fee, per spec note in PooledTransaction::gas_price).
    if tx.fee < min_gas_price {
        return Err(RejectionReason::GasPriceTooLow { got: tx.fee, min: min_gas_price });
    }

    // 7. No duplicate fingerprint already resident.
    if fingerprint_exists() {
        return Err(RejectionReason::Duplicate);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qnet_crypto::{envelope::keygen, hashing};
    use qnet_types::TransactionKind;

    struct NoopAccounts;
    impl AccountView for NoopAccounts {
        fn current_nonce(&self, _addr: &Address) -> u64 {
            0
        }
        fn balance(&self, _addr: &Address) -> u128 {
            0
        }
    }

    fn signed_tx(nonce: u64, amount: u128, fee: u128) -> Transaction {
        let (pk, sk) = keygen();
        let sender = envelope::address_of(&pk);
        let mut tx = Transaction {
            sender,
            recipient: [1u8; 32],
            amount,
            nonce,
            fee,
            kind: TransactionKind::Transfer,
            proof_ref: None,
            sender_pubkey: pk.as_bytes().to_vec(),
            signature: Vec::new(),
        };
        let sig = envelope::sign(&tx.signing_payload(), &sk).unwrap();
        tx.signature = sig.as_bytes().to_vec();
        tx
    }

    #[test]
    fn accepts_well_formed_transaction() {
        let tx = signed_tx(1, 100, 10);
        let result = admit(&tx, || false, &NoopAccounts, Provisional { nonce: 0, balance: 1000 }, 1);
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_bad_nonce() {
        let tx = signed_tx(5, 100, 10);
        let result = admit(&tx, || false, &NoopAccounts, Provisional { nonce: 0, balance: 1000 }, 1);
        assert_eq!(result, Err(RejectionReason::BadNonce { expected: 1, got: 5 }));
    }

    #[test]
    fn rejects_insufficient_balance() {
        let tx = signed_tx(1, 1000, 10);
        let result = admit(&tx, || false, &NoopAccounts, Provisional { nonce: 0, balance: 5 }, 1);
        assert_eq!(result, Err(RejectionReason::InsufficientFunds));
    }

    #[test]
    fn rejects_tampered_signature() {
        let mut tx = signed_tx(1, 100, 10);
        tx.amount = 999;
        let result = admit(&tx, || false, &NoopAccounts, Provisional { nonce: 0, balance: 1000 }, 1);
        assert_eq!(result, Err(RejectionReason::BadSignature));
    }

    #[test]
    fn rejects_duplicate_fingerprint() {
        let tx = signed_tx(1, 100, 10);
        let result = admit(&tx, || true, &NoopAccounts, Provisional { nonce: 0, balance: 1000 }, 1);
        assert_eq!(result, Err(RejectionReason::Duplicate));
    }

    #[test]
    fn rejects_fee_below_minimum() {
        let tx = signed_tx(1, 100, 1);
        let result = admit(&tx, || false, &NoopAccounts, Provisional { nonce: 0, balance: 1000 }, 5);
        assert_eq!(result, Err(RejectionReason::GasPriceTooLow { got: 1, min: 5 }));
    }

    #[test]
    fn fingerprint_hash_excludes_signature_field() {
        let tx_a = signed_tx(1, 100, 10);
        let mut tx_b = tx_a.clone();
        tx_b.signature = vec![9; 10];
        assert_eq!(hashing::tx_fingerprint(&tx_a), hashing::tx_fingerprint(&tx_b));
    }
}
