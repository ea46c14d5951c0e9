// src/render/fetch.rs
use crate::status::{AggregateStatus, HEALTH_PATH};
use reqwest::Client;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("health endpoint answered HTTP {0}")]
    Status(u16),

    #[error("malformed health document: {0}")]
    Body(#[source] reqwest::Error),
}

/// Headroom on top of the server's worst-case check time, for the
/// round trip and serialization.
pub const FETCH_MARGIN: Duration = Duration::from_secs(2);

/// Client timeout for a server whose aggregate may take up to `check_bound`.
/// Anything shorter reports a slow but healthy endpoint as unreachable.
pub fn fetch_timeout(check_bound: Duration) -> Duration {
    check_bound + FETCH_MARGIN
}

/// Fetches the aggregate from a running server.
pub struct HealthFetcher {
    client: Client,
    url: Url,
}

impl HealthFetcher {
    pub fn new(base: &Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self {
            client,
            url: base.join(HEALTH_PATH)?,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn fetch(&self) -> Result<AggregateStatus, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<AggregateStatus>()
            .await
            .map_err(FetchError::Body)
    }
}
