//! Cross-crate scenarios, one module per `spec.md` §8 scenario group.

mod scenarios;
