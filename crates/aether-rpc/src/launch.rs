//! One-shot launch requests.
//!
//! A launch is a single `POST /run` with a JSON [`LaunchRequest`] body. The
//! response body is ignored; only completion and the status code matter.

use std::time::Duration;

use aether_types::LaunchRequest;
use tracing::debug;

use crate::error::{ClientError, Result};

const LAUNCH_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the launch endpoint
#[derive(Debug, Clone)]
pub struct LaunchClient {
    http: reqwest::Client,
    url: String,
}

impl LaunchClient {
    /// Build a client that posts to `url`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(LAUNCH_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send `request` and wait for the backend to answer.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the request cannot be delivered and
    /// `ClientError::Status` if the backend answers with a non-success code.
    pub async fn launch(&self, request: &LaunchRequest) -> Result<()> {
        debug!(
            "POST {} message={:?} search_in_web={}",
            self.url, request.message, request.search_in_web
        );
        let response = self.http.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(())
    }
}
