use std::time::Duration;

use tracing::{debug, instrument};

use crate::fetch_error::FetchError;

/// Retrieves forecast pages over HTTP.
///
/// Every request is bounded by the client timeout; there is no retry here.
#[derive(Clone)]
pub struct SeeingFetcher {
    client: reqwest::Client,
}

impl SeeingFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    #[instrument(skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        debug!("Sending HTTP request to forecast source");
        let response = self.client.get(url).send().await?;
        debug!("Received HTTP response with status: {}", response.status());

        let response = response.error_for_status()?;
        let html = response.text().await?;
        debug!("Retrieved HTML content, size: {} bytes", html.len());

        Ok(html)
    }
}
