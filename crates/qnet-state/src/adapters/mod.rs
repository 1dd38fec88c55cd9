pub mod memory;

#[cfg(feature = "rocks")]
pub mod rocks;

pub use memory::InMemoryStateStore;

#[cfg(feature = "rocks")]
pub use rocks::RocksStateStore;
