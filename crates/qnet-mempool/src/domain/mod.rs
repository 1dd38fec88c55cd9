pub mod admission;
pub mod entities;
pub mod errors;
pub mod pool;

pub use entities::PooledTransaction;
pub use errors::RejectionReason;
pub use pool::TransactionPool;
