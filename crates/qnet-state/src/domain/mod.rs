pub mod errors;
pub mod snapshot;

pub use errors::StateError;
pub use snapshot::{SnapshotPayload, SnapshotRef};
