use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use crate::error::ScoutError;
use crate::sources::traits::FeatureSource;
use crate::sources::types::WfsQuery;

const USER_AGENT: &str = concat!("parking-scout/", env!("CARGO_PKG_VERSION"));

/// WFS GetFeature client for the parking API
pub struct WfsClient {
    client: Client,
    base_url: Url,
    query: WfsQuery,
}

impl WfsClient {
    /// Create a client for `base_url` with the default query
    pub fn new(base_url: Url, timeout: Duration) -> reqwest::Result<Self> {
        Self::with_query(base_url, timeout, WfsQuery::default())
    }

    /// Create a client with custom query parameters
    pub fn with_query(base_url: Url, timeout: Duration, query: WfsQuery) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            query,
        })
    }

    /// Full request URL, query included
    pub fn request_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().extend_pairs(self.query.pairs());
        url
    }
}

#[async_trait]
impl FeatureSource for WfsClient {
    async fn fetch_body(&self) -> Result<String, ScoutError> {
        let url = self.request_url();
        info!("Fetching parking features from {}", self.base_url);
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| ScoutError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            warn!("WFS endpoint returned status: {}", response.status());
            return Err(ScoutError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ScoutError::Transport {
                url: url.to_string(),
                source,
            })?;

        debug!("Downloaded {} bytes of JSON", body.len());
        Ok(body)
    }

    fn source_name(&self) -> &'static str {
        "WFS"
    }
}
