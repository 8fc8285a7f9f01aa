use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A named group of logical ticker symbols competing in the contest.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub name: String,
    pub tickers: Vec<String>,
    /// Benchmark portfolios hold a single index symbol that is passed to the
    /// provider verbatim, without the market suffix transform.
    pub benchmark: bool,
}

impl Portfolio {
    pub fn new(name: &str, tickers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            benchmark: false,
        }
    }

    pub fn benchmark(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            tickers: vec![symbol.to_string()],
            benchmark: true,
        }
    }
}

/// Immutable configuration for one contest run. Constructed once and passed
/// into the pipeline so different contests are parameterizations of the same
/// engine.
#[derive(Debug, Clone)]
pub struct ContestConfig {
    pub portfolios: Vec<Portfolio>,
    /// First date requested from the price provider.
    pub start_date: NaiveDate,
    /// Inclusive end of the contest window; later rows are dropped.
    pub contest_end_date: NaiveDate,
    /// Logical ticker whose pre-cutoff history comes from the bundled
    /// override payload.
    pub override_ticker: String,
    /// Override entries at or after this date are ignored; provider data is
    /// authoritative from here on.
    pub override_cutoff: NaiveDate,
    /// Location of the bundled override payload, if any.
    pub override_path: Option<PathBuf>,
    /// Suffix appended to logical symbols to form provider symbols.
    pub market_suffix: String,
    pub bucket: String,
    pub object_key: String,
}

impl ContestConfig {
    /// The B3 2025 stock-picking contest universe.
    pub fn b3_2025() -> Self {
        Self {
            portfolios: vec![
                Portfolio::new("Ari", &["BBAS3", "VALE3", "EQTL3"]),
                Portfolio::new("Vai", &["MDIA3", "NATU3", "FLRY3"]),
                Portfolio::new("Jai", &["ITUB4", "LREN3", "SUZB3"]),
                Portfolio::benchmark("IBOV", "^BVSP"),
            ],
            start_date: date(2024, 12, 13),
            contest_end_date: date(2025, 12, 13),
            override_ticker: "NATU3".to_string(),
            override_cutoff: date(2025, 7, 2),
            override_path: Some(PathBuf::from("natu3.json")),
            market_suffix: ".SA".to_string(),
            bucket: "teleturfe-website-prod".to_string(),
            object_key: "portfolios.json".to_string(),
        }
    }

    /// Maps a logical ticker to the provider's symbol namespace.
    pub fn provider_symbol(&self, portfolio: &Portfolio, ticker: &str) -> String {
        if portfolio.benchmark {
            ticker.to_string()
        } else {
            format!("{}{}", ticker.to_uppercase(), self.market_suffix)
        }
    }

    /// Provider symbol of the override ticker (the override ticker always
    /// belongs to a non-benchmark portfolio).
    pub fn override_provider_symbol(&self) -> String {
        format!(
            "{}{}",
            self.override_ticker.to_uppercase(),
            self.market_suffix
        )
    }

    /// Sorted, deduplicated provider symbols across every portfolio.
    pub fn provider_universe(&self) -> Vec<String> {
        let mut symbols = BTreeSet::new();
        for portfolio in &self.portfolios {
            for ticker in &portfolio.tickers {
                symbols.insert(self.provider_symbol(portfolio, ticker));
            }
        }
        symbols.into_iter().collect()
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
