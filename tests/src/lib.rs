//! # QNet Test Suite
//!
//! Cross-crate integration scenarios for the QNet core. Unit tests for
//! individual invariants live beside the code they cover in each
//! `qnet-*` crate; this crate covers the scenarios that only make sense
//! wired across crate boundaries.
//!
//! ```bash
//! cargo test -p qnet-tests
//! cargo bench -p qnet-tests
//! ```

pub mod integration;
