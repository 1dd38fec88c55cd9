use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("proof_ref already consumed")]
    Conflict,

    #[error("wallet already owns an active or excluded node")]
    DuplicateWallet,

    #[error("external proof did not verify for the required amount")]
    Validation(String),

    #[error("node not found: {0}")]
    NotFound(String),

    #[error("node is not eligible: {0}")]
    NotEligible(String),

    #[error("reactivation requires paid proof beyond the free restoration window")]
    RestorationWindowExpired,
}
