//! Transaction pool (C3): admission, ordering, and eviction per
//! `spec.md` §4.3.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::MempoolService;
pub use domain::{PooledTransaction, RejectionReason, TransactionPool};
pub use ports::{AccountView, MempoolApi};
