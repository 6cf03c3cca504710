//! Waitlist signup (/api/waitlist-user)

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;
use tracing::{error, info};

use super::response::{failure, ok, ApiResponse};
use crate::server::AppState;
use crate::waitlist::{is_valid_email, WaitlistRequest, WAITLIST_FAILURE_MESSAGE};

/// POST /api/waitlist-user
///
/// 400 when the body is not `{email}` with a valid address; the sink is
/// not called in that case. 500 when the sink fails.
pub async fn handle_waitlist_user(state: Arc<AppState>, body: Bytes) -> Response<Full<Bytes>> {
    let request: WaitlistRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => return failure(StatusCode::BAD_REQUEST, "Please enter a valid email address"),
    };

    let email = request.email.as_str();
    if !is_valid_email(email) {
        return failure(StatusCode::BAD_REQUEST, "Please enter a valid email address");
    }

    match state.waitlist.add(email).await {
        Ok(()) => {
            info!("Waitlist signup recorded");
            ok(&ApiResponse::message("Joined waitlist"))
        }
        Err(e) => {
            error!("Error adding waitlist user: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, WAITLIST_FAILURE_MESSAGE)
        }
    }
}
