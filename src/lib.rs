//! Avasara - registration gateway for the talent registry
//!
//! Registrations are split in two: free-text profile fields are pinned to
//! IPFS as JSON, while categorical fields (location, skills, professional
//! status, language) and years of experience are written to the registry
//! contract as small integer codes next to the payload's CID. Reads join
//! the two halves back into a single user view.
//!
//! ## Modules
//!
//! - **registry**: category tables and their code mapping
//! - **profile**: draft validation, forward and reverse mapping
//! - **chain**: registry contract client (JSON-RPC or in-process ledger)
//! - **storage**: content-addressed JSON store (Pinata or in-memory)
//! - **waitlist**: landing page email sink (Notion or in-memory)
//! - **services**: read and write orchestration
//! - **routes** / **server**: HTTP surface

pub mod chain;
pub mod config;
pub mod profile;
pub mod registry;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod types;
pub mod waitlist;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{AvasaraError, Result};
