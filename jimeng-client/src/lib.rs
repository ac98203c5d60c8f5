//! Jimeng HTTP Client
//!
//! A small, type-safe client for the remote video generation task API.
//!
//! The crate exposes two layers:
//! - [`ArkClient`]: the raw HTTP endpoints (create task, get task)
//! - [`GenerationClient`]: the submit/poll contract the node layer depends on,
//!   plus [`wait_for_task`] which drives polling to a terminal state
//!
//! # Example
//!
//! ```no_run
//! use jimeng_client::{ArkClient, GenerationClient, PollPolicy, wait_for_task};
//! use jimeng_core::domain::generation::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ArkClient::new("my-api-key");
//!     let request = GenerationRequest::new(
//!         SEEDANCE_LITE_I2V,
//!         "a cat running",
//!         ClipDuration::Five,
//!         Resolution::P720,
//!         true,
//!         FrameImages::Single("data:image/jpeg;base64,...".to_string()),
//!     );
//!
//!     let task_id = client.submit(&request).await?;
//!     let outcome = wait_for_task(&client, &task_id, &PollPolicy::default()).await?;
//!     println!("video: {}", outcome.video_url());
//!     Ok(())
//! }
//! ```

pub mod error;
mod generation;
mod tasks;
mod wait;

#[cfg(test)]
mod testing;

pub use error::{ClientError, Result};
pub use generation::GenerationClient;
pub use wait::{PollOutcome, PollPolicy, wait_for_task};

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Default endpoint of the generation service
pub const DEFAULT_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";

/// Authenticated HTTP client for the generation service
#[derive(Clone)]
pub struct ArkClient {
    /// Base URL of the API (e.g., "https://ark.cn-beijing.volces.com/api/v3")
    base_url: String,
    /// Bearer credential sent with every request
    api_key: String,
    /// HTTP client instance
    client: Client,
}

impl std::fmt::Debug for ArkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArkClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ArkClient {
    /// Create a client against the default endpoint
    ///
    /// # Arguments
    /// * `api_key` - The caller-supplied credential
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a client against a specific endpoint
    ///
    /// # Example
    /// ```
    /// use jimeng_client::ArkClient;
    ///
    /// let client = ArkClient::with_base_url("http://localhost:8080/api/v3/", "key");
    /// assert_eq!(client.base_url(), "http://localhost:8080/api/v3");
    /// ```
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, Client::new())
    }

    /// Create a client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success responses become [`ClientError::ApiError`], using the
    /// service's error message when the body carries one.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(
                status.as_u16(),
                remote_error_message(&error_text),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: RemoteError,
}

#[derive(Deserialize)]
struct RemoteError {
    code: String,
    message: String,
}

/// Extract `code: message` from a service error body, falling back to the raw text
fn remote_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => format!("{}: {}", parsed.error.code, parsed.error.message),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ArkClient::new("key");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ArkClient::with_base_url("http://localhost:8080/", "key");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = ArkClient::new("super-secret");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_remote_error_message() {
        let body = r#"{"error":{"code":"InvalidParameter","message":"bad model"}}"#;
        assert_eq!(remote_error_message(body), "InvalidParameter: bad model");
        assert_eq!(remote_error_message("gateway timeout"), "gateway timeout");
    }
}
