//! Commit-reveal consensus engine (C5): leader election, microblock and
//! macroblock production, ping-slot challenges, double-sign slashing,
//! and round-difficulty self-adjustment. `domain` holds the pure state
//! machine; `ports` names this crate's outbound collaborators; `adapters`
//! wires it to the shared event bus.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::ConsensusEngine;
pub use domain::{difficulty, ping, slashing, ConsensusError, RoundState, RoundTiming};
pub use ports::{BlockSink, TransactionSource};
