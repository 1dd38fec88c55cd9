//! # Domain Module
//!
//! Core domain types for Light Client Sync.
//!
//! Reference: SPEC-13 Section 2

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
