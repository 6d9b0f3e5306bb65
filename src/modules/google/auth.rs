//! Service-account authentication for Google APIs.
//!
//! A signed RS256 JWT assertion is exchanged at the account's token endpoint
//! for a short-lived OAuth access token, which is cached until shortly
//! before it expires.

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::core::error::AppError;

pub const SCOPE_SPREADSHEETS: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const SCOPE_DRIVE: &str = "https://www.googleapis.com/auth/drive";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Anything able to hand out a bearer token for Google API calls
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, TokenError>;
}

/// The fields of a service-account `credentials.json` we rely on
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Response from the OAuth token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default, rename = "token_type")]
    pub _token_type: String,
}

/// Cached token with expiration tracking
struct TokenCache {
    token: TokenResponse,
    fetched_at: Instant,
}

/// Manages service-account access tokens with caching
pub struct ServiceAccountTokenManager {
    key: ServiceAccountKey,
    scopes: String,
    client: reqwest::Client,
    cache: RwLock<Option<TokenCache>>,
    /// Refresh token this many seconds before expiration
    refresh_margin: Duration,
}

impl ServiceAccountTokenManager {
    pub fn new(key: ServiceAccountKey, scopes: &[&str]) -> Self {
        Self {
            key,
            scopes: scopes.join(" "),
            client: reqwest::Client::new(),
            cache: RwLock::new(None),
            refresh_margin: Duration::from_secs(60),
        }
    }

    /// Load the service-account key from a `credentials.json` file
    pub fn from_file(path: &Path, scopes: &[&str]) -> Result<Self, TokenError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TokenError::CredentialsError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| TokenError::CredentialsError(format!("invalid credentials file: {}", e)))?;

        tracing::info!("Loaded Google service account {}", key.client_email);
        Ok(Self::new(key, scopes))
    }

    /// Build the signed JWT assertion presented to the token endpoint
    fn signed_assertion(&self) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scopes,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| TokenError::CredentialsError(format!("invalid private key: {}", e)))?;

        encode(&header, &claims, &signing_key)
            .map_err(|e| TokenError::CredentialsError(format!("failed to sign assertion: {}", e)))
    }

    /// Fetch a new token from the token endpoint
    async fn fetch_token(&self) -> Result<TokenResponse, TokenError> {
        tracing::debug!("Fetching new Google access token from {}", self.key.token_uri);

        let assertion = self.signed_assertion()?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| TokenError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::FetchError(format!(
                "Token request failed: HTTP {} - {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| TokenError::ParseError(e.to_string()))?;

        tracing::info!(
            "Fetched new Google access token, expires in {} seconds",
            token_response.expires_in
        );

        let mut cache = self.cache.write().await;
        *cache = Some(TokenCache {
            token: token_response.clone(),
            fetched_at: Instant::now(),
        });

        Ok(token_response)
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokenManager {
    async fn access_token(&self) -> Result<String, TokenError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                let elapsed = cached.fetched_at.elapsed();
                let expires_in = Duration::from_secs(cached.token.expires_in);

                if elapsed + self.refresh_margin < expires_in {
                    return Ok(cached.token.access_token.clone());
                }
            }
        }

        Ok(self.fetch_token().await?.access_token)
    }
}

/// Fixed token, for exercising API clients against mock servers
#[cfg(test)]
pub struct StaticTokenSource(pub String);

#[cfg(test)]
#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, TokenError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid service account credentials: {0}")]
    CredentialsError(String),

    #[error("Failed to fetch token: {0}")]
    FetchError(String),

    #[error("Failed to parse token response: {0}")]
    ParseError(String),
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        AppError::ExternalServiceError(e.to_string())
    }
}
