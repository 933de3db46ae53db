use crate::models::MarketListing;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for market scanners
/// Shared by the saved-dump scanner and the live browser search, so a scan
/// can run against either without the caller caring which one it got
#[async_trait]
pub trait MarketScanner: Send + Sync {
    /// Scan the market and return the competitors found
    async fn scan(&self) -> Result<Vec<MarketListing>>;

    /// Get the name of the scanner source
    fn source_name(&self) -> &'static str;
}
