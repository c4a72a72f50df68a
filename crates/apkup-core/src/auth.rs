//! Service account authentication
//!
//! Requests are signed with an OAuth2 access token obtained by exchanging a
//! JWT assertion signed with the service account's private key.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::PUBLISHER_SCOPE;
use crate::error::{PublishError, Result};

/// Service account credentials
#[derive(Clone, Deserialize)]
pub struct AuthParams {
    /// Google client email
    pub client_email: String,
    /// Google private key (PEM)
    pub private_key: String,
}

impl fmt::Debug for AuthParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthParams")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl AuthParams {
    pub fn new(client_email: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            client_email: client_email.into(),
            private_key: private_key.into(),
        }
    }

    /// Load credentials from a service account JSON key file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PublishError::Auth(format!(
                "Failed to read service account key {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| PublishError::Auth(format!("Invalid service account key: {}", e)))
    }
}

/// OAuth token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Default)]
struct TokenCache {
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// Credential able to sign publisher requests.
///
/// Read-only after construction apart from the token cache, which is
/// guarded by a lock.
pub struct AuthContext {
    params: AuthParams,
    token_cache: RwLock<TokenCache>,
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("client_email", &self.params.client_email)
            .finish_non_exhaustive()
    }
}

impl AuthContext {
    pub fn new(params: AuthParams) -> Result<Self> {
        if params.client_email.trim().is_empty() {
            return Err(PublishError::Auth(
                "Missing required parameter client_email".to_string(),
            ));
        }
        if params.private_key.trim().is_empty() {
            return Err(PublishError::Auth(
                "Missing required parameter private_key".to_string(),
            ));
        }

        Ok(Self {
            params,
            token_cache: RwLock::new(TokenCache::default()),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.params.client_email
    }

    /// Get a cached access token or mint a new one
    pub async fn access_token(&self, http: &Client, token_url: &str) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let (Some(token), Some(expires)) = (&cache.access_token, cache.expires_at) {
                if Utc::now() < expires - Duration::minutes(5) {
                    return Ok(token.clone());
                }
            }
        }

        let jwt = self.signed_assertion(token_url)?;

        debug!(client_email = %self.params.client_email, "exchanging JWT for access token");
        let response = http
            .post(token_url)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PublishError::Auth(error_text));
        }

        let token_response: TokenResponse = response.json().await?;

        {
            let mut cache = self.token_cache.write().await;
            cache.access_token = Some(token_response.access_token.clone());
            cache.expires_at = Some(Utc::now() + Duration::seconds(token_response.expires_in));
        }

        Ok(token_response.access_token)
    }

    fn signed_assertion(&self, audience: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Claims<'a> {
            iss: &'a str,
            scope: &'a str,
            aud: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now();
        let claims = Claims {
            iss: &self.params.client_email,
            scope: PUBLISHER_SCOPE,
            aud: audience,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(
            self.params.private_key.as_bytes(),
        )
        .map_err(|e| PublishError::Auth(format!("Invalid private key: {}", e)))?;

        let jwt = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256),
            &claims,
            &encoding_key,
        )?;

        Ok(jwt)
    }
}
