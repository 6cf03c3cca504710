//! Waitlist sink
//!
//! The landing page collects emails into a Notion database. The sink only
//! appends; duplicate handling is left to the database.

pub mod notion;

pub use notion::{NotionConfig, NotionWaitlist};

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tokio::sync::RwLock;

/// Generic message returned when the database rejects a write
pub const WAITLIST_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later";

/// Errors from the waitlist sink
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WaitlistError {
    #[error("{0}")]
    Transport(String),

    #[error("Waitlist database rejected the entry (HTTP {0})")]
    Rejected(u16),
}

/// Body of `POST /api/waitlist-user`
#[derive(Debug, Clone, Deserialize)]
pub struct WaitlistRequest {
    pub email: String,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
            .unwrap_or_else(|_| unreachable!("email pattern is a valid regex"))
    })
}

/// Loose structural email check; surrounding whitespace is not accepted
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty()
        && email.len() <= 254
        && !email.contains("..")
        && email_regex().is_match(email)
}

/// Append-only store of waitlist emails
#[async_trait::async_trait]
pub trait WaitlistSink: Send + Sync {
    async fn add(&self, email: &str) -> Result<(), WaitlistError>;
}

/// Waitlist kept in process memory
#[derive(Default)]
pub struct InMemoryWaitlist {
    emails: RwLock<Vec<String>>,
}

impl InMemoryWaitlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn emails(&self) -> Vec<String> {
        self.emails.read().await.clone()
    }
}

#[async_trait::async_trait]
impl WaitlistSink for InMemoryWaitlist {
    async fn add(&self, email: &str) -> Result<(), WaitlistError> {
        self.emails.write().await.push(email.to_string());
        Ok(())
    }
}
