use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("malformed public key: expected {expected} bytes, got {actual}")]
    MalformedPublicKey { expected: usize, actual: usize },

    #[error("malformed secret key: expected {expected} bytes, got {actual}")]
    MalformedSecretKey { expected: usize, actual: usize },

    #[error("malformed signature: expected {expected} bytes, got {actual}")]
    MalformedSignature { expected: usize, actual: usize },

    #[error("signing failed")]
    SigningFailed,
}
