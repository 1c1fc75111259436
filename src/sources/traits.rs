use async_trait::async_trait;

use crate::error::ScoutError;

/// Where parking features come from
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Fetch the raw response body. Parsing is left to the caller.
    async fn fetch_body(&self) -> Result<String, ScoutError>;

    /// Get the name of the source, used in logs
    fn source_name(&self) -> &'static str;
}
