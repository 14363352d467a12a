//! phpIPAM API client
//!
//! Implements the read-only subset of the phpIPAM REST API the exporter needs:
//! `GET /sections` and `GET /sections/{id}/subnets`.

use crate::auth::{AuthMode, AuthStrategy, authenticate};
use crate::error::PhpIpamError;
use crate::models::{ApiResponse, Section, Subnet};
use crate::phpipam_trait::PhpIpamClientTrait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// phpIPAM API client
///
/// Immutable once built. Cloning is cheap and clones share the underlying
/// connection pool.
#[derive(Debug, Clone)]
pub struct PhpIpamClient {
    client: Client,
    base_url: String,
    auth: AuthStrategy,
}

impl PhpIpamClient {
    /// Create a client that logs in once and sends the token on every request
    ///
    /// # Arguments
    /// * `base_url` - phpIPAM API base address including the app id
    ///   (e.g., "http://ipam.example.com/api/exporter")
    /// * `username` / `password` - phpIPAM user credentials
    ///
    /// # Errors
    /// [`PhpIpamError::Authentication`] if the login fails.
    pub async fn login(
        base_url: impl Into<String>,
        username: &str,
        password: &str,
    ) -> Result<Self, PhpIpamError> {
        let client = build_http_client()?;
        let base_url = normalize_base_url(base_url.into())?;
        let token = authenticate(&client, &base_url, username, password).await?;

        Ok(Self {
            client,
            base_url,
            auth: AuthStrategy::Token { token },
        })
    }

    /// Create a client that sends basic credentials on every request
    ///
    /// No request is made here; bad credentials surface on the first fetch.
    pub fn with_basic_auth(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, PhpIpamError> {
        Ok(Self {
            client: build_http_client()?,
            base_url: normalize_base_url(base_url.into())?,
            auth: AuthStrategy::Basic {
                username: username.into(),
                password: password.into(),
            },
        })
    }

    /// Create a client using the given authentication mode
    pub async fn connect(
        base_url: impl Into<String>,
        username: &str,
        password: &str,
        mode: AuthMode,
    ) -> Result<Self, PhpIpamError> {
        match mode {
            AuthMode::Token => Self::login(base_url, username, password).await,
            AuthMode::Basic => Self::with_basic_auth(base_url, username, password),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authentication mode in use
    pub fn auth_mode(&self) -> AuthMode {
        self.auth.mode()
    }

    /// Fetch `base_url + path` and decode the JSON body into `T`
    ///
    /// # Errors
    /// * [`PhpIpamError::Http`] - transport failure
    /// * [`PhpIpamError::NotFound`] - HTTP 404
    /// * [`PhpIpamError::Api`] - any other non-2xx status
    /// * [`PhpIpamError::Decode`] - body is not the expected JSON
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PhpIpamError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .auth
            .apply(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(PhpIpamError::NotFound(format!("{} - {}", path, excerpt(&body))));
        }

        if !status.is_success() {
            return Err(PhpIpamError::Api(format!(
                "GET {} failed: {} - {}",
                path,
                status,
                excerpt(&body)
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            PhpIpamError::Decode(format!(
                "GET {}: {} - Response (first 500 chars): {}",
                path,
                e,
                excerpt(&body)
            ))
        })
    }

    /// List all sections
    pub async fn sections(&self) -> Result<Vec<Section>, PhpIpamError> {
        let response: ApiResponse<Vec<Section>> = self.fetch_json("/sections").await?;
        Ok(response.into_items())
    }

    /// List the subnets of one section
    pub async fn section_subnets(&self, section_id: &str) -> Result<Vec<Subnet>, PhpIpamError> {
        let response: ApiResponse<Vec<Subnet>> = self
            .fetch_json(&format!("/sections/{}/subnets", section_id))
            .await?;
        Ok(response.into_items())
    }
}

#[async_trait::async_trait]
impl PhpIpamClientTrait for PhpIpamClient {
    async fn sections(&self) -> Result<Vec<Section>, PhpIpamError> {
        PhpIpamClient::sections(self).await
    }

    async fn section_subnets(&self, section_id: &str) -> Result<Vec<Subnet>, PhpIpamError> {
        PhpIpamClient::section_subnets(self, section_id).await
    }
}

fn build_http_client() -> Result<Client, PhpIpamError> {
    Client::builder().build().map_err(PhpIpamError::Http)
}

fn normalize_base_url(base_url: String) -> Result<String, PhpIpamError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(PhpIpamError::InvalidRequest(
            "phpIPAM API address must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn excerpt(body: &str) -> String {
    body.chars().take(500).collect()
}
