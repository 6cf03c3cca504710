//! Registry read endpoints (/api/contract/*)
//!
//! Every outcome is an envelope with HTTP 200; callers branch on
//! `success`. Parameter problems are reported without touching the
//! contract client.

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};

use super::response::{ok, ApiResponse};
use crate::chain::Address;
use crate::server::AppState;
use crate::services::Page;

const INVALID_PAGE: &str = "Invalid start or count parameters";

/// Decode a query string into a map; malformed input yields an empty map
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
        .map(|pairs| pairs.into_iter().collect())
        .unwrap_or_default()
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// `start`/`count` from the query; `Ok(None)` when both are absent
fn parse_page(params: &HashMap<String, String>) -> Result<Option<Page>, &'static str> {
    let start = param(params, "start");
    let count = param(params, "count");
    if start.is_none() && count.is_none() {
        return Ok(None);
    }

    let defaults = Page::default();
    let parse = |value: Option<&str>, default: u64| match value {
        Some(v) => v.parse::<u64>().map_err(|_| INVALID_PAGE),
        None => Ok(default),
    };

    Ok(Some(Page {
        start: parse(start, defaults.start)?,
        count: parse(count, defaults.count)?,
    }))
}

fn failed(error: impl Into<String>) -> Response<Full<Bytes>> {
    ok(&ApiResponse::error(error))
}

#[derive(Serialize)]
struct TotalUsers {
    total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skill: Option<String>,
}

/// GET /api/contract/info
pub async fn handle_contract_info(state: Arc<AppState>) -> Response<Full<Bytes>> {
    match state.directory.contract_info().await {
        Ok(info) => ok(&ApiResponse::ok(info)
            .with_message("Contract information retrieved successfully")),
        Err(e) => {
            error!("Error fetching contract info: {}", e);
            failed(e.to_string())
        }
    }
}

/// GET /api/contract/total-users?location=|skill=
///
/// Without a filter counts every registered user.
pub async fn handle_total_users(
    state: Arc<AppState>,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let params = parse_query(query);
    let location = param(&params, "location");
    let skill = param(&params, "skill");

    let total = match (location, skill) {
        (Some(_), Some(_)) => return failed("Specify either location or skill, not both"),
        (Some(location), None) => state.directory.total_users_by_location(location).await,
        (None, Some(skill)) => state.directory.total_users_by_skill(skill).await,
        (None, None) => state.directory.total_users().await,
    };

    match total {
        Ok(total) => ok(&ApiResponse::ok(TotalUsers {
            total: total.to_string(),
            location: location.map(str::to_string),
            skill: skill.map(str::to_string),
        })
        .with_message("Total users retrieved successfully")),
        Err(e) => {
            error!("Error fetching total users: {}", e);
            failed(e.to_string())
        }
    }
}

/// GET /api/contract/registered-users?start=&count=
pub async fn handle_registered_users(
    state: Arc<AppState>,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let params = parse_query(query);
    let page = match parse_page(&params) {
        Ok(page) => page.unwrap_or_default(),
        Err(message) => {
            warn!("Rejected registered-users query: {:?}", query);
            return failed(message);
        }
    };

    match state.directory.registered_users(page).await {
        Ok(users) => ok(&ApiResponse::ok(users)
            .with_message("Registered users retrieved successfully")),
        Err(e) => {
            error!("Error fetching registered users: {}", e);
            failed(e.to_string())
        }
    }
}

/// GET /api/contract/user-profile?address=
pub async fn handle_user_profile(
    state: Arc<AppState>,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let params = parse_query(query);
    let Some(raw) = param(&params, "address") else {
        return failed("Address parameter is required");
    };

    let address: Address = match raw.parse() {
        Ok(address) => address,
        Err(e) => return failed(e.to_string()),
    };

    match state.directory.user_by_address(address).await {
        Ok(Some(user)) => ok(&ApiResponse::ok(user)
            .with_message("User profile retrieved successfully")),
        Ok(None) => failed("User not found"),
        Err(e) => {
            error!(address = %address, "Error fetching user profile: {}", e);
            failed(e.to_string())
        }
    }
}

/// GET /api/contract/users-by-location?location=&start=&count=
pub async fn handle_users_by_location(
    state: Arc<AppState>,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let params = parse_query(query);
    let Some(location) = param(&params, "location") else {
        return failed("Location parameter is required");
    };
    let page = match parse_page(&params) {
        Ok(page) => page,
        Err(message) => return failed(message),
    };

    match state.directory.users_by_location(location, page).await {
        Ok(users) => ok(&ApiResponse::ok(users)
            .with_message("Users by location retrieved successfully")),
        Err(e) => {
            error!("Error fetching users by location: {}", e);
            failed(e.to_string())
        }
    }
}

/// GET /api/contract/users-by-skill?skill=&start=&count=
pub async fn handle_users_by_skill(
    state: Arc<AppState>,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let params = parse_query(query);
    let Some(skill) = param(&params, "skill") else {
        return failed("Skill parameter is required");
    };
    let page = match parse_page(&params) {
        Ok(page) => page,
        Err(message) => return failed(message),
    };

    match state.directory.users_by_skill(skill, page).await {
        Ok(users) => ok(&ApiResponse::ok(users)
            .with_message("Users by skill retrieved successfully")),
        Err(e) => {
            error!("Error fetching users by skill: {}", e);
            failed(e.to_string())
        }
    }
}
