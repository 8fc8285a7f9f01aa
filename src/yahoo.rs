use crate::provider::{PriceProvider, ProviderError, ProviderResult};
use crate::table::RawPriceTable;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) contest-tracker/0.1";

/// Yahoo Finance v8 chart API client.
pub struct YahooClient {
    http: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> ProviderResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> ProviderResult<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn chart(&self, symbol: &str, query: &[(&str, String)]) -> ProviderResult<ChartSeries> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let payload: ChartResponse = response.json().await?;
        if let Some(series) = payload
            .chart
            .result
            .and_then(|mut result| (!result.is_empty()).then(|| result.remove(0)))
        {
            return Ok(series);
        }
        match payload.chart.error {
            Some(error) if !error.is_null() => Err(ProviderError::Decode(error.to_string())),
            _ => Err(ProviderError::NoData(symbol.to_string())),
        }
    }
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch_daily_history(
        &self,
        symbols: &[String],
        start: NaiveDate,
    ) -> ProviderResult<RawPriceTable> {
        let period1 = Utc
            .from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap_or_default())
            .timestamp();
        let period2 = Utc::now().timestamp();

        // One chart request per symbol, sequentially. Any failure here fails
        // the whole history fetch.
        let mut rows: BTreeMap<String, std::collections::HashMap<String, f64>> = BTreeMap::new();
        for symbol in symbols {
            let series = self
                .chart(
                    symbol,
                    &[
                        ("interval", "1d".to_string()),
                        ("period1", period1.to_string()),
                        ("period2", period2.to_string()),
                    ],
                )
                .await?;
            for (index, &timestamp) in series.timestamp.iter().enumerate() {
                let Some(price) = series.close_at(index) else {
                    continue;
                };
                let Some(moment) = Utc.timestamp_opt(timestamp, 0).single() else {
                    continue;
                };
                let label = moment.date_naive().format("%Y-%m-%d").to_string();
                rows.entry(label).or_default().insert(symbol.clone(), price);
            }
        }

        let mut raw = RawPriceTable::default();
        for (label, prices) in rows {
            raw.push(label, prices);
        }
        Ok(raw)
    }

    async fn fetch_latest_intraday(&self, symbol: &str) -> ProviderResult<Option<f64>> {
        let series = self
            .chart(
                symbol,
                &[
                    ("interval", "1m".to_string()),
                    ("range", "1d".to_string()),
                ],
            )
            .await?;
        Ok(series.last_close())
    }

    async fn fetch_latest_daily(&self, symbol: &str) -> ProviderResult<Option<f64>> {
        let series = self
            .chart(
                symbol,
                &[
                    ("interval", "1d".to_string()),
                    ("range", "1d".to_string()),
                ],
            )
            .await?;
        Ok(series.last_close())
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartPayload,
}

#[derive(Debug, Deserialize)]
struct ChartPayload {
    #[serde(default)]
    result: Option<Vec<ChartSeries>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize, Default)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

impl ChartSeries {
    /// Close at bar `index`, preferring the adjusted series when present
    /// (matches a provider-side corporate-action adjustment).
    fn close_at(&self, index: usize) -> Option<f64> {
        let adjusted = self
            .indicators
            .adjclose
            .first()
            .and_then(|series| series.adjclose.get(index))
            .copied()
            .flatten();
        adjusted
            .or_else(|| {
                self.indicators
                    .quote
                    .first()
                    .and_then(|quote| quote.close.get(index))
                    .copied()
                    .flatten()
            })
            .filter(|price| price.is_finite())
    }

    /// Most recent non-null close in the series.
    fn last_close(&self) -> Option<f64> {
        (0..self.timestamp.len())
            .rev()
            .find_map(|index| self.close_at(index))
    }
}
