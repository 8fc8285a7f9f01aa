use crate::provider::{PriceProvider, ProviderResult};
use crate::table::PriceTable;
use chrono::NaiveDate;
use log::warn;

/// Overwrites (or inserts) each symbol's price at `today` with the latest
/// available quote: intraday first, latest daily close as fallback. Failures
/// are swallowed per symbol, leaving that symbol's existing value untouched.
pub async fn apply<P: PriceProvider>(
    table: &mut PriceTable,
    provider: &P,
    symbols: &[String],
    today: NaiveDate,
) {
    for symbol in symbols {
        match latest_quote(provider, symbol).await {
            Ok(Some(price)) => table.insert(today, symbol, price),
            Ok(None) => warn!("no intraday or daily quote for {symbol}; keeping prior value"),
            Err(err) => warn!("latest quote fetch failed for {symbol}: {err}; keeping prior value"),
        }
    }
}

async fn latest_quote<P: PriceProvider>(
    provider: &P,
    symbol: &str,
) -> ProviderResult<Option<f64>> {
    // A failed intraday fetch skips the symbol entirely; only an empty
    // intraday session falls back to the latest daily close.
    if let Some(price) = provider.fetch_latest_intraday(symbol).await? {
        return Ok(Some(price));
    }
    provider.fetch_latest_daily(symbol).await
}
