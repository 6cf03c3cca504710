//! Off-chain Content Store
//!
//! Profiles are stored as JSON documents in content-addressed storage and
//! referenced on-chain by the `bytes32` digest of their CID. Nothing is
//! cached, retried or re-verified here; integrity is whatever the content
//! addressing itself guarantees.
//!
//! - [`PinataStore`]: Pinata pinning API for writes, an IPFS gateway for reads
//! - [`InMemoryContentStore`]: CIDv0 over SHA-256, kept in process memory

pub mod memory;
pub mod pinata;

pub use memory::InMemoryContentStore;
pub use pinata::{PinataConfig, PinataStore};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Multihash prefix of a sha2-256 digest: code 0x12, length 32
const SHA2_256_PREFIX: [u8; 2] = [0x12, 0x20];

/// Errors from the content store
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid CID: {0}")]
    InvalidHandle(String),

    #[error("Failed to upload JSON: {0}")]
    Upload(String),

    #[error("Failed to fetch IPFS data: {0}")]
    Fetch(String),

    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("Stored content is not valid JSON: {0}")]
    InvalidContent(String),
}

/// CIDv0 content identifier (`Qm...`)
///
/// The contract keeps only the 32-byte sha2-256 digest, so the handle is
/// that digest. The base58btc text form is rebuilt on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHandle([u8; 32]);

impl ContentHandle {
    /// Parse a CIDv0 string
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let invalid = |reason: &str| StoreError::InvalidHandle(format!("{}: {}", s, reason));

        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| invalid(&e.to_string()))?;
        let digest = bytes
            .strip_prefix(&SHA2_256_PREFIX[..])
            .ok_or_else(|| invalid("expected a CIDv0 with a sha2-256 multihash"))?;
        let digest: [u8; 32] = digest
            .try_into()
            .map_err(|_| invalid("sha2-256 digest must be 32 bytes"))?;
        Ok(Self(digest))
    }

    /// Handle for an on-chain `bytes32` digest
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// Handle of raw bytes hashed with sha2-256
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(bytes));
        Self(digest)
    }

    /// The `bytes32` value stored on-chain
    pub fn digest(&self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut multihash = Vec::with_capacity(34);
        multihash.extend_from_slice(&SHA2_256_PREFIX);
        multihash.extend_from_slice(&self.0);
        f.write_str(&bs58::encode(multihash).into_string())
    }
}

impl TryFrom<String> for ContentHandle {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ContentHandle::parse(&value)
    }
}

impl From<ContentHandle> for String {
    fn from(handle: ContentHandle) -> Self {
        handle.to_string()
    }
}

/// Content-addressed JSON storage
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a JSON document and return its handle
    async fn put(&self, json: &serde_json::Value) -> Result<ContentHandle, StoreError>;

    /// Fetch a JSON document by handle
    async fn get(&self, handle: &ContentHandle) -> Result<serde_json::Value, StoreError>;

    /// Public URL the document can be fetched from
    fn gateway_url(&self, handle: &ContentHandle) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    const CID: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

    #[test]
    fn test_parse_cid_v0() {
        let handle = ContentHandle::parse(CID).unwrap();
        assert_eq!(
            hex::encode(handle.digest()),
            "9d6c2be50f706953479ab9df2ce3edca90b68053c00b3004b7f0accbe1e8eedf"
        );
        assert_eq!(handle.to_string(), CID);
    }

    #[test]
    fn test_digest_rebuilds_cid() {
        assert_eq!(
            ContentHandle::from_digest([0u8; 32]).to_string(),
            "QmNLei78zWmzUdbeRB3CiUfAizWUrbeeZh5K1rhAQKCh51"
        );
        assert_eq!(
            ContentHandle::of_bytes(b"{}").to_string(),
            "QmSvPd3sHK7iWgZuW47fyLy4CaZQe2DwxvRhrJ39VpBVMK"
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            ContentHandle::parse("not-a-cid"),
            Err(StoreError::InvalidHandle(_))
        ));
        assert!(ContentHandle::parse("").is_err());
        // CIDv1 has no bytes32 form
        assert!(
            ContentHandle::parse("bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku")
                .is_err()
        );
    }

    #[test]
    fn test_handle_serde() {
        let handle = ContentHandle::parse(CID).unwrap();
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, format!("\"{}\"", CID));
        let back: ContentHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, handle);
        assert!(serde_json::from_str::<ContentHandle>("\"nope\"").is_err());
    }
}
