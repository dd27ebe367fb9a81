//! Authenticated HTTP transport for the v1 API
//!
//! Every request is a GET against `API_ROOT + path` with the account's
//! `client_id` and `api_key` appended as query parameters.

use super::error::{ApiError, Result};
use super::types::ErrorResponse;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Instant;

/// Default API root
pub const API_ROOT: &str = "https://api.digitalocean.com";

/// User agent for API requests
const USER_AGENT: &str = concat!("digo/", env!("CARGO_PKG_VERSION"));

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Placeholder for the API key in anything that gets logged or displayed
const REDACTED: &str = "***";

/// Truncate a response body and strip control characters for logging
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Client id and API key pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("api_key", &REDACTED)
            .finish()
    }
}

/// Build the full request URL for `path`.
///
/// `path` must start with `/` and may already carry a query string, in which
/// case the credentials are joined with `&` instead of `?`.
pub fn build_url(api_root: &str, path: &str, credentials: &Credentials) -> String {
    join_credentials(
        api_root,
        path,
        &urlencoding::encode(&credentials.client_id),
        &urlencoding::encode(&credentials.api_key),
    )
}

/// Same URL as [`build_url`] with the API key replaced by a literal `***`
pub fn display_url(api_root: &str, path: &str, credentials: &Credentials) -> String {
    join_credentials(
        api_root,
        path,
        &urlencoding::encode(&credentials.client_id),
        REDACTED,
    )
}

fn join_credentials(api_root: &str, path: &str, client_id: &str, api_key: &str) -> String {
    debug_assert!(path.starts_with('/'), "path must start with '/': {path}");

    let mut url = format!("{}{}", api_root, path);
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(&format!("client_id={}&api_key={}", client_id, api_key));
    url
}

/// Turn a non-2xx response into the matching error variant
pub(crate) fn classify_failure(status: StatusCode, url: String, body: String) -> ApiError {
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(error) => ApiError::Status {
            status,
            message: error.error_message,
            url,
            body,
        },
        Err(_) => ApiError::StatusOnly { status, url, body },
    }
}

/// HTTP client wrapper bound to one API root
#[derive(Clone)]
pub struct ApiHttpClient {
    client: Client,
    api_root: String,
}

impl ApiHttpClient {
    /// Create a client for the default API root
    pub fn new() -> Result<Self> {
        Self::with_api_root(API_ROOT)
    }

    /// Create a client for a custom API root (no trailing slash)
    pub fn with_api_root(api_root: impl Into<String>) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            api_root: api_root.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Fetch `path` and return the raw body of a 2xx response
    pub async fn get(&self, path: &str, credentials: &Credentials) -> Result<Vec<u8>> {
        let url = build_url(&self.api_root, path, credentials);
        // Security: only the redacted form ever reaches logs or error messages
        let display_url = display_url(&self.api_root, path, credentials);

        tracing::debug!("fetching {}", display_url);
        let started = Instant::now();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.without_url()))?;

        let status = response.status();
        tracing::debug!(
            "got status {} for {} in {:.06}s",
            status,
            display_url,
            started.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, display_url, body));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.without_url()))?;

        Ok(body.to_vec())
    }
}

impl fmt::Debug for ApiHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiHttpClient")
            .field("api_root", &self.api_root)
            .finish()
    }
}
