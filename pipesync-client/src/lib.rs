//! Pipesync HTTP Client
//!
//! A small, type-safe HTTP client for the remote pipeline service. Every
//! request is authenticated with a personal access token.
//!
//! # Example
//!
//! ```no_run
//! use pipesync_client::OrchestratorClient;
//! use pipesync_core::dto::space::CreateSpace;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pipesync_client::ClientError> {
//!     let client = OrchestratorClient::new(pipesync_client::DEFAULT_API_URL, "my-token");
//!
//!     let space = client
//!         .create_space(CreateSpace { name: "analytics".to_string() })
//!         .await?;
//!
//!     println!("Created space: {}", space.id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod pipelines;
mod spaces;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// Base URL of the hosted service
pub const DEFAULT_API_URL: &str = "https://api.glassflow.dev/v1";

/// Header carrying the personal access token
pub const ACCESS_TOKEN_HEADER: &str = "Personal-Access-Token";

/// HTTP client for the remote pipeline service
///
/// Groups:
/// - Space management (create)
/// - Pipeline management (create, get, update, delete)
#[derive(Clone)]
pub struct OrchestratorClient {
    /// Base URL of the service (e.g., "https://api.glassflow.dev/v1")
    base_url: String,
    /// Personal access token sent with every request
    access_token: String,
    /// HTTP client instance
    client: Client,
}

impl std::fmt::Debug for OrchestratorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"***")
            .finish()
    }
}

impl OrchestratorClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use pipesync_client::OrchestratorClient;
    ///
    /// let client = OrchestratorClient::new("https://api.glassflow.dev/v1/", "my-token");
    /// assert_eq!(client.base_url(), "https://api.glassflow.dev/v1");
    /// ```
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            client: Client::new(),
        }
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start an authenticated request against `path`
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        self.client
            .request(method, url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize a JSON body
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

    /// Check the status code of a response without a body (e.g. DELETE)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
