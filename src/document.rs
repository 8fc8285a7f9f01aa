use crate::returns::PortfolioReturns;
use crate::table::PriceTable;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The published document. Field names and null-vs-numeric typing are the
/// compatibility contract with the front-end dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDocument {
    /// ISO-8601 local timestamp taken at assembly time.
    pub updated_at: String,
    pub data: DocumentData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentData {
    /// Shared date axis, `YYYY-MM-DD`, ascending.
    pub dates: Vec<String>,
    pub portfolios: BTreeMap<String, PortfolioDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDocument {
    pub assets: BTreeMap<String, Vec<Option<f64>>>,
    pub asset_prices: BTreeMap<String, Vec<Option<f64>>>,
    pub portfolio_return: Vec<Option<f64>>,
}

impl From<PortfolioReturns> for PortfolioDocument {
    fn from(returns: PortfolioReturns) -> Self {
        Self {
            assets: returns.assets,
            asset_prices: returns.asset_prices,
            portfolio_return: returns.portfolio_return,
        }
    }
}

/// Packages the clamped table's date axis and per-portfolio results. The
/// axis is shared across all portfolios; no other side effects.
pub fn assemble(
    table: &PriceTable,
    portfolios: BTreeMap<String, PortfolioReturns>,
) -> OutputDocument {
    let dates = table
        .dates()
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect();
    OutputDocument {
        updated_at: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        data: DocumentData {
            dates,
            portfolios: portfolios
                .into_iter()
                .map(|(name, returns)| (name, returns.into()))
                .collect(),
        },
    }
}
