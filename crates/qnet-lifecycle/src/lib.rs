//! Node lifecycle and penalty engine (C4): activation pricing,
//! registration, ping bookkeeping, violation escalation, the inactivity
//! sweep, restoration, and the reward ledger. `domain` holds the pure
//! state machine; `ports` names its external collaborator; `adapters`
//! wires it to the shared event bus.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::LifecycleService;
pub use domain::{pricing, LifecycleError, NodeRegistry};
pub use ports::{AlwaysVerifyOracle, ProofOracle};
