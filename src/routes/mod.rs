//! HTTP route handlers
//!
//! Handlers take the shared state plus whatever part of the request they
//! need (query string, collected body) and return a complete JSON response.

pub mod contract;
pub mod health;
pub mod ipfs;
pub mod register;
pub mod response;
pub mod waitlist;

pub use contract::{
    handle_contract_info, handle_registered_users, handle_total_users, handle_user_profile,
    handle_users_by_location, handle_users_by_skill,
};
pub use health::{client_config, health_check, version_info, Backends};
pub use ipfs::{handle_gateway_url, handle_upload};
pub use register::{handle_register, handle_update_profile, handle_withdraw_fees};
pub use response::ApiResponse;
pub use waitlist::handle_waitlist_user;
