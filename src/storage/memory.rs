//! In-memory content store
//!
//! Handles are CIDv0 values over the sha2-256 of the serialized JSON, so
//! they survive the same `bytes32` round trip through the contract as
//! pinned handles do.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ContentHandle, ContentStore, StoreError};

/// Simple in-memory content store
pub struct InMemoryContentStore {
    documents: Arc<RwLock<HashMap<ContentHandle, serde_json::Value>>>,
    gateway: String,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::with_gateway("http://localhost:8080")
    }

    pub fn with_gateway(gateway: impl Into<String>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            gateway: gateway.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(&self, json: &serde_json::Value) -> Result<ContentHandle, StoreError> {
        let bytes = serde_json::to_vec(json).map_err(|e| StoreError::Upload(e.to_string()))?;
        let handle = ContentHandle::of_bytes(&bytes);

        self.documents.write().await.insert(handle, json.clone());

        Ok(handle)
    }

    async fn get(&self, handle: &ContentHandle) -> Result<serde_json::Value, StoreError> {
        self.documents
            .read()
            .await
            .get(handle)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(handle.to_string()))
    }

    fn gateway_url(&self, handle: &ContentHandle) -> String {
        format!("{}/ipfs/{}", self.gateway, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = InMemoryContentStore::new();
        let doc = json!({"fullName": "Ada Lovelace", "email": "ada@example.com"});

        let handle = store.put(&doc).await.unwrap();
        assert!(handle.to_string().starts_with("Qm"));
        assert_eq!(store.get(&handle).await.unwrap(), doc);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_same_content_same_handle() {
        let store = InMemoryContentStore::new();
        let a = store.put(&json!({"k": 1})).await.unwrap();
        let b = store.put(&json!({"k": 1})).await.unwrap();
        let c = store.put(&json!({"k": 2})).await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_missing_handle() {
        let store = InMemoryContentStore::new();
        let handle = ContentHandle::of_bytes(b"{}");
        assert!(matches!(
            store.get(&handle).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_gateway_url() {
        let store = InMemoryContentStore::with_gateway("https://gw.example/");
        let handle = ContentHandle::of_bytes(b"{}");
        assert_eq!(
            store.gateway_url(&handle),
            format!("https://gw.example/ipfs/{}", handle)
        );
    }
}
