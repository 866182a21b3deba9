//! API client for communicating with the blog aggregator REST API.
//!
//! This module provides the `ApiClient` struct for registering users and
//! fetching feed and post data.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::Credential;
use crate::models::{Feed, Post};

use super::{ApiError, AuthError, Registrar};

// ============================================================================
// Constants
// ============================================================================

/// Version prefix shared by every endpoint
const API_PREFIX: &str = "/v1";

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
/// The server limits each IP per second, so a short wait is enough.
const INITIAL_BACKOFF_MS: u64 = 250;

/// Message the server answers with (as a 500) when a user has no posts yet
const EMPTY_POSTS_MESSAGE: &str = "Failed to get posts";

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
}

/// The created user. Only the key matters to the client.
#[derive(Debug, Deserialize)]
struct RegisterResponse {
    api_key: String,
}

/// Validate a registration response into a credential.
///
/// Anything but `201 Created` is a rejection. A `201` must carry a JSON body
/// with a non-empty `api_key`, otherwise it is a malformed response.
pub fn decode_registration(status: StatusCode, body: &str) -> Result<Credential, AuthError> {
    if status != StatusCode::CREATED {
        return Err(AuthError::from_status(status, body));
    }

    let parsed: RegisterResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

    Credential::parse(&parsed.api_key)
        .ok_or_else(|| AuthError::MalformedResponse("api_key is empty".to_string()))
}

/// API client for the aggregator server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the server at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a new ApiClient with the given credential, sharing the connection pool.
    pub fn with_token(&self, credential: &Credential) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(credential.expose().to_string()),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Fetch every feed known to the server (public)
    pub async fn fetch_feeds(&self) -> Result<Vec<Feed>, ApiError> {
        self.get(&self.endpoint("/feeds")).await
    }

    /// Fetch a page of posts from the feeds the signed-up user follows
    pub async fn fetch_posts(&self, offset: u32, limit: u32) -> Result<Vec<Post>, ApiError> {
        if !self.has_token() {
            return Err(ApiError::Unauthorized);
        }

        let url = format!("{}?offset={}&limit={}", self.endpoint("/posts"), offset, limit);
        match self.get(&url).await {
            Err(ApiError::ServerError(message)) if message == EMPTY_POSTS_MESSAGE => {
                debug!(offset, "No posts available for user");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .client
                .get(url)
                .header(header::ACCEPT, "application/json");
            if let Some(ref token) = self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RATE_LIMIT_RETRIES {
                retries += 1;
                warn!(url, retries, backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
                continue;
            }

            let body = response.text().await?;
            if !status.is_success() {
                return Err(ApiError::from_status(status, &body));
            }

            return serde_json::from_str(&body).map_err(|e| {
                debug!(url, error = %e, "Failed to decode response");
                ApiError::InvalidResponse(e.to_string())
            });
        }
    }
}

#[async_trait]
impl Registrar for ApiClient {
    async fn register(&self, username: &str) -> Result<Credential, AuthError> {
        let url = self.endpoint("/users");
        debug!(%url, "Sending registration request");

        let response = self
            .client
            .post(&url)
            .json(&RegisterRequest { name: username })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, "Registration response received");

        decode_registration(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(base_url, Duration::from_secs(5)).expect("client should build")
    }

    #[test]
    fn test_decode_registration_created() {
        let body = r#"{"id":"4e0b8c1a-6f0e-4a7e-9d55-3c5f0e1b2a9d","created_at":"2024-01-14T18:22:05Z","updated_at":"2024-01-14T18:22:05Z","name":"alice","api_key":"K123"}"#;
        let key = decode_registration(StatusCode::CREATED, body).expect("should decode");
        assert_eq!(key.expose(), "K123");
    }

    #[test]
    fn test_decode_registration_requires_created() {
        // 200 is success in general but not what registration promises
        let err = decode_registration(StatusCode::OK, r#"{"api_key":"K123"}"#).unwrap_err();
        assert!(matches!(err, AuthError::Rejected { status: 200, .. }));

        let err = decode_registration(StatusCode::BAD_REQUEST, r#"{"error":"User already exists"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::Rejected {
                status: 400,
                message: "User already exists".to_string()
            }
        );
    }

    #[test]
    fn test_decode_registration_malformed() {
        for body in ["{}", "", "not json", r#"{"api_key":null}"#, r#"{"api_key":"  "}"#] {
            let err = decode_registration(StatusCode::CREATED, body).unwrap_err();
            assert!(matches!(err, AuthError::MalformedResponse(_)), "body {:?} gave {:?}", body, err);
        }
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let api = client("http://localhost:8080/");
        assert_eq!(api.base_url(), "http://localhost:8080");
        assert_eq!(api.endpoint("/users"), "http://localhost:8080/v1/users");
    }

    #[test]
    fn test_with_token_leaves_original_anonymous() {
        let api = client("http://localhost:8080");
        assert!(!api.has_token());

        let key = Credential::parse("K123").expect("key should parse");
        let authed = api.with_token(&key);
        assert!(authed.has_token());
        assert_eq!(authed.base_url(), api.base_url());
        assert!(!api.has_token());
    }

    #[tokio::test]
    async fn test_fetch_posts_requires_token() {
        // Port 9 (discard) is never contacted: the missing token short-circuits
        let api = client("http://127.0.0.1:9");
        let result = api.fetch_posts(0, 10).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }
}
