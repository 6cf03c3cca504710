//! Health, version and client configuration endpoints
//!
//! - /health, /healthz - Liveness probe, always 200 while the process runs
//! - /version - Build information for deployment verification
//! - /api/config - Public settings the browser client needs to submit
//!   transactions itself

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::response::{json_response, ok, ApiResponse};
use crate::server::AppState;

/// Liveness response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Seconds since the server state was created
    pub uptime: u64,
    pub timestamp: String,
    /// "development" or "production"
    pub mode: &'static str,
    pub chain_id: u64,
    /// Which collaborator implementation is wired in
    pub backends: Backends,
}

/// Collaborator implementations in use
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backends {
    pub contract: &'static str,
    pub store: &'static str,
    pub waitlist: &'static str,
}

/// Handle liveness probe (/health, /healthz)
pub fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let response = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        chain_id: state.args.chain_id,
        backends: state.backends,
    };

    json_response(StatusCode::OK, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Git commit hash (full)
    pub commit_full: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "avasara",
    };

    json_response(StatusCode::OK, &response)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientConfig {
    chain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    contract_address: Option<String>,
    /// Decimal wei
    registration_fee: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    wallet_connect_project_id: Option<String>,
}

/// Handle client configuration (/api/config)
pub fn client_config(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let contract_address = if state.backends.contract == "json-rpc" {
        state.args.contract().ok().map(|address| address.to_checksum())
    } else {
        None
    };

    ok(&ApiResponse::ok(ClientConfig {
        chain_id: state.args.chain_id,
        contract_address,
        registration_fee: state.registration.registration_fee().to_string(),
        wallet_connect_project_id: state.args.walletconnect_project_id.clone(),
    }))
}
