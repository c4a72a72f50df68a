//! Publisher configuration

use serde::{Deserialize, Serialize};

/// Android Publisher v3 REST base
pub const API_BASE_URL: &str = "https://androidpublisher.googleapis.com/androidpublisher/v3";

/// Media upload base for the same API
pub const UPLOAD_BASE_URL: &str =
    "https://androidpublisher.googleapis.com/upload/androidpublisher/v3";

/// OAuth2 token endpoint for service accounts
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 scope granting publisher access
pub const PUBLISHER_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

/// What to do with an edit whose mutation failed after it was opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Leave the edit open until it expires remotely
    #[default]
    LeaveOpen,
    /// Issue an explicit delete for the edit
    DeleteOnFailure,
}

/// Endpoint and lifecycle configuration for a publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub api_base_url: String,
    pub upload_base_url: String,
    pub token_url: String,
    pub cleanup: CleanupPolicy,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            upload_base_url: UPLOAD_BASE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            cleanup: CleanupPolicy::LeaveOpen,
        }
    }
}

impl PublisherConfig {
    pub fn with_cleanup(mut self, cleanup: CleanupPolicy) -> Self {
        self.cleanup = cleanup;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_google() {
        let config = PublisherConfig::default();
        assert_eq!(config.api_base_url, API_BASE_URL);
        assert_eq!(config.cleanup, CleanupPolicy::LeaveOpen);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: PublisherConfig =
            serde_json::from_str(r#"{"cleanup": "delete_on_failure"}"#).unwrap();
        assert_eq!(config.cleanup, CleanupPolicy::DeleteOnFailure);
        assert_eq!(config.token_url, TOKEN_URL);
    }
}
