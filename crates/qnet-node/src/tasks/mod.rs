//! The five long-lived tasks of `spec.md` §5: round driver, ingress
//! demux, mempool admission, background sweeps, and sync fetch. Each is
//! a plain async function the binary spawns with `tokio::spawn`; none
//! of them hold a lock across an `.await`.

pub mod admission;
pub mod ingress;
pub mod round_driver;
pub mod sweeps;
pub mod sync_fetch;
