//! Notion database sink
//!
//! Each signup becomes a page in the configured database with the email as
//! its `Email` title property.

use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

use super::{WaitlistError, WaitlistSink};

const NOTION_PAGES_URL: &str = "https://api.notion.com/v1/pages";

/// Configuration for the Notion sink
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub database_id: String,
    pub integration_token: String,
    pub api_version: String,
    pub pages_url: String,
    pub timeout: Duration,
}

impl NotionConfig {
    pub fn new(database_id: impl Into<String>, integration_token: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            integration_token: integration_token.into(),
            api_version: "2022-06-28".to_string(),
            pages_url: NOTION_PAGES_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Page creation body for one signup
pub fn page_body(database_id: &str, email: &str) -> serde_json::Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Email": {
                "title": [
                    { "text": { "content": email } }
                ]
            }
        }
    })
}

/// Waitlist sink writing to a Notion database
pub struct NotionWaitlist {
    config: NotionConfig,
    http: reqwest::Client,
}

impl NotionWaitlist {
    pub fn new(config: NotionConfig) -> Result<Self, WaitlistError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WaitlistError::Transport(e.to_string()))?;
        Ok(Self { config, http })
    }
}

#[async_trait::async_trait]
impl WaitlistSink for NotionWaitlist {
    async fn add(&self, email: &str) -> Result<(), WaitlistError> {
        let response = self
            .http
            .post(&self.config.pages_url)
            .bearer_auth(&self.config.integration_token)
            .header("Notion-Version", &self.config.api_version)
            .json(&page_body(&self.config.database_id, email))
            .send()
            .await
            .map_err(|e| {
                error!("Notion request failed: {}", e);
                WaitlistError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Notion rejected waitlist entry: HTTP {} {}", status, body);
            return Err(WaitlistError::Rejected(status.as_u16()));
        }

        info!("Added waitlist entry to Notion");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_body_shape() {
        let body = page_body("db-123", "user@example.com");
        assert_eq!(body["parent"]["database_id"], "db-123");
        assert_eq!(
            body["properties"]["Email"]["title"][0]["text"]["content"],
            "user@example.com"
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = NotionConfig::new("db", "token");
        assert_eq!(config.api_version, "2022-06-28");
        assert_eq!(config.pages_url, NOTION_PAGES_URL);
    }
}
