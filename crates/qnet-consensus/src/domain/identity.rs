//! Bridges the two identity spaces in play: on-chain structures
//! (`Commit`, `Reveal`, `Microblock`) key on the raw 32-byte `Address`,
//! while the lifecycle engine and event bus key on the opaque `NodeId`
//! string (`spec.md` §3). `NodeId` is defined as the lowercase hex of
//! `Address`, so the mapping is total and reversible.

use qnet_types::node::NodeId;
use qnet_types::Address;

pub fn node_id_of(address: Address) -> NodeId {
    hex::encode(address)
}

pub fn address_of(node_id: &str) -> Option<Address> {
    let bytes = hex::decode(node_id).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Some(out)
}
