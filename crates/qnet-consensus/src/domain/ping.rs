//! Ping-slot challenge assignment (`spec.md` §3): a node's slot within a
//! 4-hour, 240-slot window is pseudorandomly derived from the window
//! start and the node's id, so no party can predict another node's slot
//! ahead of time without already knowing both inputs.

use qnet_crypto::hashing::{hash, HashAlgorithm};
use qnet_types::node::NodeId;

pub const PING_WINDOW_SECS: u64 = 4 * 3_600;
pub const PING_SLOTS: u16 = 240;
pub const PING_SLOT_SECS: u64 = 60;

pub fn assigned_slot(window_start: u64, node_id: &NodeId) -> u16 {
    let mut buf = Vec::with_capacity(8 + node_id.len());
    buf.extend_from_slice(&window_start.to_be_bytes());
    buf.extend_from_slice(node_id.as_bytes());
    let digest = hash(&buf, HashAlgorithm::Sha256);
    let value = u64::from_be_bytes(digest[0..8].try_into().unwrap());
    (value % PING_SLOTS as u64) as u16
}

pub fn slot_window(window_start: u64, slot: u16) -> (u64, u64) {
    let start = window_start + slot as u64 * PING_SLOT_SECS;
    (start, start + PING_SLOT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_assignment_is_deterministic() {
        let a = assigned_slot(1_000, &"node-1".to_string());
        let b = assigned_slot(1_000, &"node-1".to_string());
        assert_eq!(a, b);
        assert!(a < PING_SLOTS);
    }

    #[test]
    fn different_nodes_usually_diverge() {
        let a = assigned_slot(1_000, &"node-1".to_string());
        let b = assigned_slot(1_000, &"node-2".to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn slot_window_covers_one_minute() {
        let (start, end) = slot_window(0, 5);
        assert_eq!(start, 300);
        assert_eq!(end - start, PING_SLOT_SECS);
    }
}
