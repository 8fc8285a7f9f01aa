use crate::config::ContestConfig;
use crate::document::{self, OutputDocument};
use crate::overlay;
use crate::override_series::OverrideSeries;
use crate::provider::PriceProvider;
use crate::returns;
use crate::sink::StorageSink;
use crate::table::PriceTable;
use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, info};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Status code and body handed back to the invocation's caller.
#[derive(Debug, Clone)]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

/// One contest run: fetch, compute, publish. Everything is sequential and
/// run-to-completion; the only recovered failures are per-ticker overlay
/// fetches and override parsing.
pub struct Pipeline<P, S> {
    config: ContestConfig,
    provider: P,
    sink: S,
}

impl<P: PriceProvider, S: StorageSink> Pipeline<P, S> {
    pub fn new(config: ContestConfig, provider: P, sink: S) -> Self {
        Self {
            config,
            provider,
            sink,
        }
    }

    /// Runs the computation side of the pipeline: normalize, override merge,
    /// intraday overlay, window clamp, return engine, document assembly.
    /// Does not touch the sink.
    pub async fn build_document(&self) -> Result<OutputDocument> {
        let symbols = self.config.provider_universe();
        info!(
            "Fetching daily history for {} symbols since {}",
            symbols.len(),
            self.config.start_date
        );
        let raw = self
            .provider
            .fetch_daily_history(&symbols, self.config.start_date)
            .await
            .context("bulk daily history fetch failed")?;
        let mut table = PriceTable::normalize(raw);
        debug!("normalized history has {} rows", table.len());

        let series = self
            .config
            .override_path
            .as_deref()
            .map(OverrideSeries::load)
            .unwrap_or_default();
        if series.is_empty() {
            debug!("no usable historical override; skipping merge");
        } else {
            info!(
                "Merging {} override entries for {} before {}",
                series.len(),
                self.config.override_ticker,
                self.config.override_cutoff
            );
            series.merge_into(
                &mut table,
                &self.config.override_provider_symbol(),
                self.config.override_cutoff,
            );
        }

        // The overlay uses the execution environment's local date, matching
        // the dashboard's notion of "today".
        let today = Local::now().date_naive();
        overlay::apply(&mut table, &self.provider, &symbols, today).await;

        table.clamp_end(self.config.contest_end_date);

        let mut results = BTreeMap::new();
        for portfolio in &self.config.portfolios {
            let tickers: Vec<(String, String)> = portfolio
                .tickers
                .iter()
                .map(|ticker| {
                    (
                        ticker.clone(),
                        self.config.provider_symbol(portfolio, ticker),
                    )
                })
                .collect();
            results.insert(portfolio.name.clone(), returns::compute(&table, &tickers));
        }

        Ok(document::assemble(&table, results))
    }

    /// Builds the document and overwrites the sink object wholesale. No
    /// partial writes: the sink receives a complete document or nothing.
    pub async fn publish(&self) -> Result<()> {
        let document = self.build_document().await?;
        let body =
            serde_json::to_vec(&document).context("failed to serialize output document")?;
        self.sink
            .put(
                &self.config.bucket,
                &self.config.object_key,
                body,
                "application/json",
            )
            .await?;
        info!(
            "Published {}/{} ({} dates)",
            self.config.bucket,
            self.config.object_key,
            document.data.dates.len()
        );
        Ok(())
    }

    /// Invocation entry point. The event and context are opaque and unused;
    /// success is a 200 with a trivial body, fatal errors propagate to the
    /// caller.
    pub async fn handle(&self, _event: Value, _context: Value) -> Result<InvocationResponse> {
        self.publish().await?;
        Ok(InvocationResponse {
            status_code: 200,
            body: json!({"message": "ok"}).to_string(),
        })
    }
}
