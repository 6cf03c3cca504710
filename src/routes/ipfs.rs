//! Content store passthrough (/api/ipfs)
//!
//! POST pins an arbitrary JSON body and returns its CID. GET resolves a CID
//! (query `?cid=` or JSON body `{cid}`) to its public gateway URL.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use super::contract::parse_query;
use super::response::{failure, ok, ApiResponse};
use crate::server::AppState;
use crate::storage::ContentHandle;

#[derive(Serialize)]
struct CidData {
    cid: ContentHandle,
}

#[derive(Serialize)]
struct UrlData {
    url: String,
}

#[derive(Deserialize)]
struct CidBody {
    cid: String,
}

/// POST /api/ipfs
pub async fn handle_upload(state: Arc<AppState>, body: Bytes) -> Response<Full<Bytes>> {
    let json: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(json) => json,
        Err(e) => return failure(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e)),
    };

    match state.store.put(&json).await {
        Ok(cid) => {
            info!(cid = %cid, "uploaded JSON");
            ok(&ApiResponse::ok(CidData { cid }))
        }
        Err(e) => {
            error!("Error uploading JSON: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/ipfs
pub async fn handle_gateway_url(
    state: Arc<AppState>,
    query: Option<&str>,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let from_query = parse_query(query).remove("cid");
    let raw = match from_query {
        Some(cid) => cid,
        None => match serde_json::from_slice::<CidBody>(&body) {
            Ok(body) => body.cid,
            Err(_) => return failure(StatusCode::BAD_REQUEST, "CID parameter is required"),
        },
    };

    match ContentHandle::parse(&raw) {
        Ok(handle) => ok(&ApiResponse::ok(UrlData {
            url: state.store.gateway_url(&handle),
        })),
        Err(e) => failure(StatusCode::BAD_REQUEST, e.to_string()),
    }
}
