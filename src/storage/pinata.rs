//! Pinata IPFS client
//!
//! Writes use the pinning API (`/pinning/pinJSONToIPFS`) with a JWT bearer
//! token and always ask for CIDv0, the only form that fits the contract's
//! `bytes32`. Reads go through the configured dedicated gateway.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::{ContentHandle, ContentStore, StoreError};

/// Configuration for the Pinata client
#[derive(Debug, Clone)]
pub struct PinataConfig {
    /// Pinning API base URL
    pub api_url: String,
    /// JWT issued by Pinata
    pub jwt: String,
    /// Gateway domain or URL (e.g. "example.mypinata.cloud")
    pub gateway: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for PinataConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.pinata.cloud".to_string(),
            jwt: String::new(),
            gateway: "gateway.pinata.cloud".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PinJsonRequest<'a> {
    pinata_content: &'a serde_json::Value,
    pinata_options: PinOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PinOptions {
    cid_version: u8,
}

impl<'a> PinJsonRequest<'a> {
    fn new(pinata_content: &'a serde_json::Value) -> Self {
        Self {
            pinata_content,
            pinata_options: PinOptions { cid_version: 0 },
        }
    }
}

#[derive(Deserialize)]
struct PinJsonResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Content store backed by Pinata
pub struct PinataStore {
    config: PinataConfig,
    http: reqwest::Client,
}

impl PinataStore {
    pub fn new(config: PinataConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Upload(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn gateway_base(&self) -> String {
        let gateway = self.config.gateway.trim_end_matches('/');
        if gateway.starts_with("http://") || gateway.starts_with("https://") {
            gateway.to_string()
        } else {
            format!("https://{}", gateway)
        }
    }
}

#[async_trait::async_trait]
impl ContentStore for PinataStore {
    async fn put(&self, json: &serde_json::Value) -> Result<ContentHandle, StoreError> {
        let url = format!(
            "{}/pinning/pinJSONToIPFS",
            self.config.api_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.jwt)
            .json(&PinJsonRequest::new(json))
            .send()
            .await
            .map_err(|e| {
                error!("Error uploading JSON to Pinata: {}", e);
                StoreError::Upload(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Pinata rejected upload: HTTP {} {}", status, body);
            return Err(StoreError::Upload(format!("HTTP {}", status)));
        }

        let pinned: PinJsonResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Upload(format!("unexpected response: {}", e)))?;

        debug!(cid = %pinned.ipfs_hash, "pinned JSON");
        ContentHandle::parse(&pinned.ipfs_hash)
    }

    async fn get(&self, handle: &ContentHandle) -> Result<serde_json::Value, StoreError> {
        let url = self.gateway_url(handle);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Fetch(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(handle.to_string()));
        }
        if !status.is_success() {
            return Err(StoreError::Fetch(
                status.canonical_reason().unwrap_or("request failed").to_string(),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidContent(e.to_string()))
    }

    fn gateway_url(&self, handle: &ContentHandle) -> String {
        format!("{}/ipfs/{}", self.gateway_base(), handle)
    }
}
