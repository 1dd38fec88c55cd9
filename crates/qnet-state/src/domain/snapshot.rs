use serde::{Deserialize, Serialize};

use qnet_crypto::hashing::{hash, HashAlgorithm};
use qnet_types::{AccountState, BlockHeader, Hash32};

/// `spec.md` §4.2: a serializable capture of `(height, header,
/// account_map, total_issued)`, content-addressed by its own hash.
///
/// The account map travels as a sorted `Vec` rather than a
/// `BTreeMap<Address, _>` — JSON object keys must be strings, and a raw
/// 32-byte address is not one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub height: u64,
    pub header: BlockHeader,
    pub accounts: Vec<AccountState>,
    pub total_issued: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRef {
    pub payload: SnapshotPayload,
    pub content_hash: Hash32,
}

impl SnapshotRef {
    pub fn seal(payload: SnapshotPayload) -> Self {
        let bytes = serde_json::to_vec(&payload).expect("snapshot payload always serializes");
        let content_hash = hash(&bytes, HashAlgorithm::Sha256);
        Self { payload, content_hash }
    }

    pub fn verify_content_hash(&self) -> bool {
        let bytes = serde_json::to_vec(&self.payload).expect("snapshot payload always serializes");
        hash(&bytes, HashAlgorithm::Sha256) == self.content_hash
    }
}
