//! Genesis macroblock construction for chain initialization.

use qnet_crypto::hashing::{block_header_hash, HashAlgorithm};
use qnet_types::{Address, BlockHeader, Macroblock};

/// Genesis parameters; the `extra_data` field carries no on-chain
/// meaning and is hashed only for operator-visible chain identification.
#[derive(Debug, Clone)]
pub struct GenesisConfig {
    pub timestamp: Option<u64>,
    pub extra_data: Vec<u8>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self { timestamp: None, extra_data: b"QNet Genesis".to_vec() }
    }
}

/// Builds the height-0 macroblock: zero `prev_hash`, zero `leader`
/// (no round was run to elect one), no microblocks.
pub fn build_genesis(config: GenesisConfig) -> Macroblock {
    let timestamp = config.timestamp.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });

    let leader: Address = [0u8; 32];
    let microblocks_root = qnet_crypto::hashing::hash(&config.extra_data, HashAlgorithm::Sha256);

    Macroblock {
        header: BlockHeader {
            height: 0,
            round: 0,
            prev_hash: [0u8; 32],
            microblocks_root,
            leader,
            timestamp,
        },
        microblocks: Vec::new(),
    }
}

pub fn genesis_hash(block: &Macroblock) -> qnet_types::Hash32 {
    block_header_hash(&block.header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_has_height_zero_and_zero_prev_hash() {
        let genesis = build_genesis(GenesisConfig { timestamp: Some(1_700_000_000), extra_data: b"t".to_vec() });
        assert_eq!(genesis.header.height, 0);
        assert_eq!(genesis.header.prev_hash, [0u8; 32]);
        assert!(genesis.microblocks.is_empty());
    }

    #[test]
    fn genesis_hash_is_deterministic_given_fixed_timestamp() {
        let config = GenesisConfig { timestamp: Some(1_700_000_000), extra_data: b"same".to_vec() };
        let a = build_genesis(config.clone());
        let b = build_genesis(config);
        assert_eq!(genesis_hash(&a), genesis_hash(&b));
    }
}
