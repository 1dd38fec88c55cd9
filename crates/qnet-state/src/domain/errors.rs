use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("block height conflict: expected {expected}, got {got}")]
    HeightConflict { expected: u64, got: u64 },

    #[error("structural link broken: prev_hash mismatch")]
    BrokenLink,

    #[error("account {0:?} has insufficient balance")]
    InsufficientFunds(qnet_types::Address),

    #[error("snapshot content hash mismatch")]
    SnapshotHashMismatch,

    #[error("snapshot height {0} is behind current tip")]
    SnapshotBehindTip(u64),

    #[error("storage engine failure: {0}")]
    Storage(String),
}
