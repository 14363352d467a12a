//! Authentication strategies for the phpIPAM API
//!
//! phpIPAM accepts either an API token (obtained from `POST /user/` with HTTP
//! basic credentials and sent back in a `token` header) or, for API apps
//! configured with "User token" security disabled, HTTP basic credentials on
//! every request. The strategy is chosen once when the client is built.

use crate::error::PhpIpamError;
use crate::models::{ApiResponse, TokenData};
use reqwest::{Client, RequestBuilder};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which authentication strategy to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Log in once, then send the token header
    #[default]
    Token,
    /// Send basic credentials with every request
    Basic,
}

impl FromStr for AuthMode {
    type Err = PhpIpamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "token" => Ok(AuthMode::Token),
            "basic" => Ok(AuthMode::Basic),
            other => Err(PhpIpamError::InvalidRequest(format!(
                "unknown auth mode '{}', expected 'token' or 'basic'",
                other
            ))),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Token => write!(f, "token"),
            AuthMode::Basic => write!(f, "basic"),
        }
    }
}

/// Credentials attached to every outbound request
#[derive(Clone)]
pub enum AuthStrategy {
    /// Token obtained by [`authenticate`]
    Token {
        /// Value of the `token` header
        token: String,
    },
    /// Username/password sent as HTTP basic auth
    Basic {
        /// phpIPAM username
        username: String,
        /// phpIPAM password
        password: String,
    },
}

impl AuthStrategy {
    /// Mode this strategy was built for
    pub fn mode(&self) -> AuthMode {
        match self {
            AuthStrategy::Token { .. } => AuthMode::Token,
            AuthStrategy::Basic { .. } => AuthMode::Basic,
        }
    }

    /// Attach credentials to a request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            AuthStrategy::Token { token } => request.header("token", token),
            AuthStrategy::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }
}

// Credentials never end up in logs
impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStrategy::Token { .. } => f.debug_struct("Token").finish_non_exhaustive(),
            AuthStrategy::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Obtain an API token from phpIPAM
///
/// Issues `POST {base_url}/user/` with basic credentials and extracts
/// `data.token` from the response.
///
/// # Errors
/// Every failure (transport, non-2xx status, undecodable body, missing or
/// empty token) is reported as [`PhpIpamError::Authentication`].
pub async fn authenticate(
    client: &Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<String, PhpIpamError> {
    let url = format!("{}/user/", base_url.trim_end_matches('/'));
    debug!("Requesting phpIPAM API token from {}", url);

    let response = client
        .post(&url)
        .basic_auth(username, Some(password))
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| PhpIpamError::Authentication(format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        PhpIpamError::Authentication(format!("failed to read login response: {}", e))
    })?;

    if !status.is_success() {
        return Err(PhpIpamError::Authentication(format!(
            "login rejected: {} - {}",
            status,
            body.chars().take(500).collect::<String>()
        )));
    }

    let envelope: ApiResponse<TokenData> = serde_json::from_str(&body).map_err(|e| {
        PhpIpamError::Authentication(format!("malformed login response: {}", e))
    })?;

    match envelope.data.and_then(|d| d.token) {
        Some(token) if !token.is_empty() => {
            debug!("phpIPAM API token acquired");
            Ok(token)
        }
        _ => Err(PhpIpamError::Authentication(format!(
            "login response carried no token{}",
            envelope
                .message
                .map(|m| format!(": {}", m))
                .unwrap_or_default()
        ))),
    }
}
