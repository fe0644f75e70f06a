//! HTTP client for Cloudflare Images field uploads.
//!
//! Provides a minimal client with an explicit host-supplied credential, plus the
//! two domain calls an upload needs: asking the backend for a one-time upload
//! URL and posting the file directly to the image host. The widget crate drives
//! these through the [`UploadTransport`] seam.

pub mod api;
pub mod transport;

use anyhow::{Context, Result};
use cfimages_core::ClientConfig;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

/// Name of the CSRF cookie issued by the backend framework.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Header carrying the CSRF token on backend requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Credential attached to backend requests. Never sent to the image host.
#[derive(Clone)]
pub enum Credential {
    /// `X-CSRFToken: {token}`
    CsrfToken(String),
    /// No credential header
    Anonymous,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::CsrfToken(_) => f.write_str("CsrfToken(<redacted>)"),
            Credential::Anonymous => f.write_str("Anonymous"),
        }
    }
}

impl Credential {
    /// `CsrfToken` when a token is present, otherwise `Anonymous`.
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.is_empty() => Credential::CsrfToken(token),
            _ => Credential::Anonymous,
        }
    }
}

/// Read the `csrftoken` value out of a `Cookie` header string.
///
/// Host-side helper only; the orchestration core takes a [`Credential`].
pub fn csrf_token_from_cookie_header(cookie_header: &str) -> Option<String> {
    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == CSRF_COOKIE_NAME {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// HTTP client for the upload-url backend and the direct-upload host.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    upload_url_path: String,
    credential: Credential,
}

impl ApiClient {
    pub fn new(base_url: String, credential: Credential) -> Result<Self> {
        Self::with_timeout(base_url, credential, Duration::from_secs(60))
    }

    pub fn with_timeout(base_url: String, credential: Credential, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_url_path: cfimages_core::models::UPLOAD_URL_PATH.to_string(),
            credential,
        })
    }

    /// Create a client from loaded configuration (base URL, path, token, timeout).
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut client = Self::with_timeout(
            config.backend_url.clone(),
            Credential::from_token(config.csrf_token.clone()),
            Duration::from_secs(config.http_timeout_secs),
        )?;
        client.upload_url_path = config.upload_url_path.clone();
        Ok(client)
    }

    /// Create a client from `CFIMAGES_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env().context("Failed to load client configuration")?;
        Self::from_config(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL of the backend upload-url endpoint.
    pub fn upload_url_endpoint(&self) -> String {
        self.build_url(&self.upload_url_path)
    }

    fn apply_credential(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Credential::CsrfToken(token) => request.header(CSRF_HEADER, token.as_str()),
            Credential::Anonymous => request,
        }
    }

    /// Raw client for custom requests. Caller must apply credentials.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Read a failed response into "status {code}: {body}" for diagnostics.
pub(crate) async fn describe_failure(response: reqwest::Response) -> String {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    format!("status {}: {}", status, error_text)
}

pub use transport::UploadTransport;
