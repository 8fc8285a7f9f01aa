use crate::table::RawPriceTable;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed provider response: {0}")]
    Decode(String),

    #[error("no data returned for {0}")]
    NoData(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Market-data source for daily history and latest quotes.
///
/// The two failure tiers are deliberate: `fetch_daily_history` errors are
/// fatal to a run, while latest-quote errors are swallowed per ticker by the
/// intraday overlay.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Bulk daily close history for every symbol from `start` onward.
    async fn fetch_daily_history(
        &self,
        symbols: &[String],
        start: NaiveDate,
    ) -> ProviderResult<RawPriceTable>;

    /// Most recent traded price from today's intraday session, if any.
    async fn fetch_latest_intraday(&self, symbol: &str) -> ProviderResult<Option<f64>>;

    /// Most recent daily close, if any.
    async fn fetch_latest_daily(&self, symbol: &str) -> ProviderResult<Option<f64>>;
}
