//! Post-quantum signature envelope, hashing, and Merkle tooling.
//!
//! The surrounding workspace treats the signature scheme as an opaque,
//! certified black box (`spec.md` §4.1, §9): callers only ever see
//! `keygen`/`sign`/`verify` and the fixed `pk`/`sk`/`sig` byte lengths.

pub mod envelope;
pub mod errors;
pub mod hashing;
pub mod merkle;

pub use envelope::{address_of, keygen, sign, verify, PublicKey, SecretKey, Signature};
pub use errors::CryptoError;
pub use hashing::{block_header_hash, hash, tx_fingerprint, HashAlgorithm};
pub use merkle::{merkle_proof, merkle_root, verify_proof, MerkleStep, Side};

/// `spec.md` §4.1: uppercase hex of the first bytes of
/// `SHA-256(wallet || proof_ref || ts)`, formatted `QNET-XXXX-XXXX-XXXX`
/// (three four-character groups, i.e. the digest's first 6 bytes).
pub fn activation_code(wallet: &str, proof_ref: &str, ts: u64) -> String {
    let mut buf = Vec::with_capacity(wallet.len() + proof_ref.len() + 8);
    buf.extend_from_slice(wallet.as_bytes());
    buf.extend_from_slice(proof_ref.as_bytes());
    buf.extend_from_slice(&ts.to_be_bytes());
    let digest = hashing::hash(&buf, HashAlgorithm::Sha256);
    let hex: String = digest[..6].iter().map(|b| format!("{b:02X}")).collect();
    format!("QNET-{}-{}-{}", &hex[0..4], &hex[4..8], &hex[8..12])
}
