//! Registry writes (/api/register, /api/profile, /api/contract/withdraw-fees)
//!
//! Body is the registration draft plus an optional `from` account. The
//! configured sender is used when `from` is absent.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use super::response::{failure, json_response, ok, ApiResponse};
use crate::chain::Address;
use crate::profile::RegistrationDraft;
use crate::server::AppState;
use crate::services::RegistrationError;

#[derive(Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    from: Option<String>,
    #[serde(flatten)]
    draft: RegistrationDraft,
}

#[derive(Deserialize, Default)]
struct SenderRequest {
    #[serde(default)]
    from: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawReceipt {
    tx_hash: String,
}

fn parse_from(from: Option<&str>) -> Result<Option<Address>, String> {
    from.filter(|f| !f.trim().is_empty())
        .map(|f| f.parse::<Address>().map_err(|e| e.to_string()))
        .transpose()
}

fn parse_request(body: &Bytes) -> Result<(RegistrationDraft, Option<Address>), String> {
    let request: RegisterRequest =
        serde_json::from_slice(body).map_err(|e| format!("Invalid JSON body: {}", e))?;
    let from = parse_from(request.from.as_deref())?;
    Ok((request.draft, from))
}

fn registration_failure(action: &str, err: RegistrationError) -> Response<Full<Bytes>> {
    if let RegistrationError::Validation(validation) = &err {
        warn!("{} rejected: {}", action, validation);
        let envelope = ApiResponse {
            success: false,
            data: Some(&validation.errors),
            message: None,
            error: Some(validation.to_string()),
        };
        return json_response(StatusCode::BAD_REQUEST, &envelope);
    }

    if err.is_client_error() {
        warn!("{} rejected: {}", action, err);
        return failure(StatusCode::BAD_REQUEST, err.to_string());
    }

    error!("{} failed: {}", action, err);
    failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// POST /api/register
pub async fn handle_register(state: Arc<AppState>, body: Bytes) -> Response<Full<Bytes>> {
    let (draft, from) = match parse_request(&body) {
        Ok(parsed) => parsed,
        Err(message) => return failure(StatusCode::BAD_REQUEST, message),
    };

    match state.registration.register(&draft, from).await {
        Ok(receipt) => ok(&ApiResponse::ok(receipt).with_message("User registered successfully")),
        Err(e) => registration_failure("Registration", e),
    }
}

/// POST /api/profile
pub async fn handle_update_profile(state: Arc<AppState>, body: Bytes) -> Response<Full<Bytes>> {
    let (draft, from) = match parse_request(&body) {
        Ok(parsed) => parsed,
        Err(message) => return failure(StatusCode::BAD_REQUEST, message),
    };

    match state.registration.update_profile(&draft, from).await {
        Ok(receipt) => ok(&ApiResponse::ok(receipt).with_message("Profile updated successfully")),
        Err(e) => registration_failure("Profile update", e),
    }
}

/// POST /api/contract/withdraw-fees
///
/// Body `{from?}` is optional; the configured sender is used otherwise. The
/// contract reverts unless the sender is its owner.
pub async fn handle_withdraw_fees(state: Arc<AppState>, body: Bytes) -> Response<Full<Bytes>> {
    let request = if body.is_empty() {
        SenderRequest::default()
    } else {
        match serde_json::from_slice::<SenderRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return failure(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
            }
        }
    };
    let from = match parse_from(request.from.as_deref()) {
        Ok(from) => from,
        Err(message) => return failure(StatusCode::BAD_REQUEST, message),
    };

    match state.registration.withdraw_fees(from).await {
        Ok(tx_hash) => ok(&ApiResponse::ok(WithdrawReceipt { tx_hash })
            .with_message("Fees withdrawn successfully")),
        Err(e) => registration_failure("Fee withdrawal", e),
    }
}
