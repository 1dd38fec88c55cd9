use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    #[error("transaction exceeds max size of {max} bytes")]
    TooLarge { max: usize },

    #[error("missing or out-of-range field: {0}")]
    Syntactic(String),

    #[error("signature does not verify")]
    BadSignature,

    #[error("sender address does not match public key hash")]
    SenderMismatch,

    #[error("nonce {got} is not current_nonce+1 ({expected}) against provisional state")]
    BadNonce { expected: u64, got: u64 },

    #[error("insufficient balance against provisional state")]
    InsufficientFunds,

    #[error("gas price {got} below mempool minimum {min}")]
    GasPriceTooLow { got: u128, min: u128 },

    #[error("duplicate fingerprint already resident")]
    Duplicate,
}
