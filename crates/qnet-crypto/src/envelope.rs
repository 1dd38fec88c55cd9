//! The post-quantum signature envelope (`spec.md` §4.1, §9).
//!
//! Wraps `pqcrypto-dilithium`'s Dilithium3 (NIST Level 3) behind a small,
//! opaque API so the rest of the workspace never touches the underlying
//! scheme directly — swapping the concrete algorithm later only touches
//! this module.

use pqcrypto_dilithium::dilithium3;
use pqcrypto_traits::sign::{
    DetachedSignature as _, PublicKey as _, SecretKey as _,
};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::errors::CryptoError;
use qnet_types::Address;

pub const PUBLIC_KEY_LEN: usize = dilithium3::public_key_bytes();
pub const SECRET_KEY_LEN: usize = dilithium3::secret_key_bytes();
pub const SIGNATURE_LEN: usize = dilithium3::signature_bytes();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(Vec<u8>);

pub struct SecretKey(Vec<u8>);

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(CryptoError::MalformedPublicKey { expected: PUBLIC_KEY_LEN, actual: bytes.len() });
        }
        Ok(Self(bytes.to_vec()))
    }
}

impl SecretKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SECRET_KEY_LEN {
            return Err(CryptoError::MalformedSecretKey { expected: SECRET_KEY_LEN, actual: bytes.len() });
        }
        Ok(Self(bytes.to_vec()))
    }
}

impl Signature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(CryptoError::MalformedSignature { expected: SIGNATURE_LEN, actual: bytes.len() });
        }
        Ok(Self(bytes.to_vec()))
    }
}

/// Generates a fresh Dilithium3 keypair.
pub fn keygen() -> (PublicKey, SecretKey) {
    let (pk, sk) = dilithium3::keypair();
    (PublicKey(pk.as_bytes().to_vec()), SecretKey(sk.as_bytes().to_vec()))
}

pub fn sign(msg: &[u8], sk: &SecretKey) -> Result<Signature, CryptoError> {
    let sk = dilithium3::SecretKey::from_bytes(&sk.0).map_err(|_| CryptoError::SigningFailed)?;
    let sig = dilithium3::detached_sign(msg, &sk);
    Ok(Signature(sig.as_bytes().to_vec()))
}

/// Constant-time with respect to signature contents; returns `false`
/// (never an error) on malformed input of incorrect length, per
/// `spec.md` §4.1's contract for all `verify_*` functions.
pub fn verify(msg: &[u8], sig: &Signature, pk: &PublicKey) -> bool {
    let Ok(pk) = dilithium3::PublicKey::from_bytes(&pk.0) else { return false };
    let Ok(sig) = dilithium3::DetachedSignature::from_bytes(&sig.0) else { return false };
    dilithium3::verify_detached_signature(&sig, msg, &pk).is_ok()
}

/// A node's address is the SHA-256 digest of its public key.
pub fn address_of(pk: &PublicKey) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(&pk.0);
    hasher.finalize().into()
}
