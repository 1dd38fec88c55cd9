//! Domain Services - Pure functions for Kademlia operations
//!
//! Reference: SPEC-01-PEER-DISCOVERY.md Section 2
//!
//! All functions in this module are pure (no I/O, no state mutation)
//! and deterministic (same inputs → same outputs).

use crate::domain::{Distance, IpAddr, NodeId, PeerInfo, SubnetMask};

/// Calculate the XOR distance between two NodeIds
///
/// # Properties (SPEC-01 Section 5.1 - Test Group 1)
/// - Symmetric: `xor_distance(a, b) == xor_distance(b, a)`
/// - Self is zero: `xor_distance(a, a)` returns bucket 255 (closest)
/// - Identifies correct bucket based on first differing bit
///
/// # Returns
/// Distance value representing the bucket index (0-255)
/// Lower values mean the nodes are "farther" in XOR space (more bits differ early)
/// Higher values mean the nodes are "closer" (more leading bits are the same)
pub fn xor_distance(a: &NodeId, b: &NodeId) -> Distance {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // XOR each byte and find the first non-zero byte
    for i in 0..32 {
        let xor = a_bytes[i] ^ b_bytes[i];
        if xor != 0 {
            // Find the position of the first set bit in this byte
            let leading_zeros = xor.leading_zeros() as u8;
            // Calculate bucket index: (byte_index * 8) + leading_zeros_in_byte
            // This gives us 0-255 range
            let bucket = (i as u8) * 8 + leading_zeros;
            return Distance::new(bucket);
        }
    }

    // All bytes are identical (same node) - return max distance (closest bucket)
    Distance::new(255)
}

/// Calculate the bucket index for a remote node relative to local node.
///
/// Bucket index equals the XOR distance, determining which k-bucket
/// stores peers at that distance range per Kademlia specification.
///
/// Reference: SPEC-01 Section 2.4 (INVARIANT-6: Distance Ordering)
pub fn calculate_bucket_index(local: &NodeId, remote: &NodeId) -> usize {
    xor_distance(local, remote).bucket_index() as usize
}

/// Optimized fused function: Calculate bucket index directly without intermediate Distance.
///
/// This is an optimized version of `calculate_bucket_index` that avoids creating
/// an intermediate `Distance` struct. Use this in hot paths where bucket lookup
/// performance is critical.
///
/// # Performance
/// - Avoids Distance struct allocation
/// - Single pass through node ID bytes
/// - O(1) for identical nodes, O(32) worst case
#[inline]
pub fn bucket_for_peer(local: &NodeId, remote: &NodeId) -> usize {
    let local_bytes = local.as_bytes();
    let remote_bytes = remote.as_bytes();

    // XOR each byte and find the first non-zero byte
    for i in 0..32 {
        let xor = local_bytes[i] ^ remote_bytes[i];
        if xor != 0 {
            // Calculate bucket index directly: (byte_index * 8) + leading_zeros_in_byte
            return (i * 8 + xor.leading_zeros() as usize) as usize;
        }
    }

    // Identical nodes - return max bucket (255)
    255
}

/// Check if two IP addresses share the same subnet prefix.
///
/// Used to enforce INVARIANT-3 (IP Diversity) for Sybil attack resistance.
/// Compares addresses using the specified prefix length (e.g., /24 for IPv4).
///
/// Reference: SPEC-01 Section 6.1 (Sybil Attack Resistance)
pub fn is_same_subnet(a: &IpAddr, b: &IpAddr, mask: &SubnetMask) -> bool {
    match (a, b) {
        (IpAddr::V4(a_bytes), IpAddr::V4(b_bytes)) => {
            let prefix_bytes = (mask.prefix_length / 8) as usize;
            let remaining_bits = mask.prefix_length % 8;

            // Compare full bytes within prefix
            for i in 0..prefix_bytes.min(4) {
                if a_bytes[i] != b_bytes[i] {
                    return false;
                }
            }

            // Compare partial byte if prefix doesn't align to byte boundary
            if remaining_bits > 0 && prefix_bytes < 4 {
                let mask_byte = 0xFF << (8 - remaining_bits);
                if (a_bytes[prefix_bytes] & mask_byte) != (b_bytes[prefix_bytes] & mask_byte) {
                    return false;
                }
            }

            true
        }
        (IpAddr::V6(a_bytes), IpAddr::V6(b_bytes)) => {
            let prefix_bytes = (mask.prefix_length / 8) as usize;
            let remaining_bits = mask.prefix_length % 8;

            for i in 0..prefix_bytes.min(16) {
                if a_bytes[i] != b_bytes[i] {
                    return false;
                }
            }

            if remaining_bits > 0 && prefix_bytes < 16 {
                let mask_byte = 0xFF << (8 - remaining_bits);
                if (a_bytes[prefix_bytes] & mask_byte) != (b_bytes[prefix_bytes] & mask_byte) {
                    return false;
                }
            }

            true
        }
        // IPv4 and IPv6 addresses are in disjoint address spaces
        _ => false,
    }
}

/// Sort peers by XOR distance from a target node (closest first).
///
/// Higher bucket index indicates closer distance in Kademlia XOR metric.
/// Used for iterative lookups per SPEC-01 Section 3.1 (`find_closest_peers`).
pub fn sort_peers_by_distance(peers: &[PeerInfo], target: &NodeId) -> Vec<PeerInfo> {
    let mut sorted = peers.to_vec();
    sorted.sort_by(|a, b| {
        let dist_a = xor_distance(&a.node_id, target);
        let dist_b = xor_distance(&b.node_id, target);
        // Higher bucket index = closer in XOR space = sort first
        dist_b.cmp(&dist_a)
    });
    sorted
}

/// Find the k closest peers to a target from a list
///
/// # Arguments
/// * `peers` - List of all available peers
/// * `target` - Target NodeId to measure distance from
/// * `k` - Maximum number of peers to return
///
/// # Returns
/// Up to k peers sorted by distance (closest first)
pub fn find_k_closest(peers: &[PeerInfo], target: &NodeId, k: usize) -> Vec<PeerInfo> {
    let sorted = sort_peers_by_distance(peers, target);
    sorted.into_iter().take(k).collect()
}
