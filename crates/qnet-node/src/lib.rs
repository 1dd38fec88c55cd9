//! QNet node composition root: wires the state store, mempool, node
//! registry and consensus engine behind the shared event bus, then
//! drives them with the five long-lived tasks from `spec.md` §5.

pub mod adapters;
pub mod config;
pub mod container;
pub mod genesis;
pub mod tasks;

pub use container::{CoreContext, LocalValidator};
