//! GitHub Actions client
//!
//! A small HTTP client for the self-hosted runner endpoints of the GitHub
//! REST API. It implements [`ControlPlane`] so the fleet reconciler can join
//! local runners with their registration status.
//!
//! # Example
//!
//! ```no_run
//! use ghr_client::GitHubClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GitHubClient::new("ghp_example");
//!
//!     for runner in client.list_org_runners("acme").await? {
//!         println!("{} {}", runner.name, runner.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod runners;

pub use error::{ClientError, Result};
pub use runners::{ApiRunner, ApiRunnerLabel};

use async_trait::async_trait;
use ghr_core::control_plane::ControlPlane;
use ghr_core::domain::runner::RemoteStatus;
use ghr_core::domain::scope::Scope;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Public GitHub API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// API version pinned in every request
const API_VERSION: &str = "2022-11-28";

const USER_AGENT: &str = concat!("ghr/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the GitHub Actions runner API
#[derive(Clone)]
pub struct GitHubClient {
    /// Base URL of the API (e.g., "https://api.github.com")
    base_url: String,
    /// Access token sent as a bearer token
    token: String,
    /// HTTP client instance
    client: Client,
}

impl GitHubClient {
    /// Create a client for the public GitHub API
    ///
    /// # Arguments
    /// * `token` - Personal access token with runner read access
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    /// Create a client for another API endpoint (GitHub Enterprise, tests)
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API, a trailing slash is ignored
    /// * `token` - Personal access token
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client: Client::new(),
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send an authenticated GET request and deserialize the JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl ControlPlane for GitHubClient {
    async fn list_workers(&self, scope: &Scope) -> ghr_core::Result<Vec<RemoteStatus>> {
        let runners = match scope {
            Scope::Organization { org } => self.list_org_runners(org).await?,
            Scope::Repository { owner, name } => self.list_repo_runners(owner, name).await?,
        };

        Ok(runners.into_iter().map(RemoteStatus::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GitHubClient::new("token");
        assert_eq!(client.base_url(), "https://api.github.com");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = GitHubClient::with_base_url("http://localhost:8080/", "token");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_debug_hides_token() {
        let client = GitHubClient::new("ghp_secret");
        assert!(!format!("{:?}", client).contains("ghp_secret"));
    }
}
