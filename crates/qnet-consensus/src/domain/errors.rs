use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("node already committed this round")]
    DuplicateCommit,

    #[error("node already revealed this round")]
    DuplicateReveal,

    #[error("reveal without a matching commit")]
    UnknownCommit,

    #[error("revealed value does not hash to the stored commitment")]
    RevealMismatch,

    #[error("microblock proposer does not match the elected leader")]
    WrongProposer,

    #[error("microblock index is out of sequence")]
    WrongIndex,

    #[error("microblock does not chain from the expected previous hash")]
    BrokenLink,

    #[error("transaction merkle root does not match the included transactions")]
    MerkleMismatch,

    #[error("microblock timestamp falls outside the round's timing budget")]
    StaleTimestamp,

    #[error("round has no eligible nodes to elect a leader from")]
    NoEligibleNodes,

    #[error("combined reveal hash did not clear the round's difficulty target")]
    DifficultyNotMet,
}
