use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};

/// Price rows as returned by a provider: string date labels that may be
/// unsortable, duplicated or unparsable. Normalization turns this into a
/// [`PriceTable`].
#[derive(Debug, Clone, Default)]
pub struct RawPriceTable {
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone)]
pub struct RawRow {
    pub label: String,
    pub prices: HashMap<String, f64>,
}

impl RawPriceTable {
    pub fn push(&mut self, label: impl Into<String>, prices: HashMap<String, f64>) {
        self.rows.push(RawRow {
            label: label.into(),
            prices,
        });
    }
}

/// Date-indexed close prices. Dates are unique and iterate in ascending
/// order by construction; a missing (date, ticker) cell is an absent key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    rows: BTreeMap<NaiveDate, HashMap<String, f64>>,
}

impl PriceTable {
    /// Coerces raw rows into a sorted, deduplicated table. Rows whose label
    /// fails to parse are silently excluded; rows whose labels parse to the
    /// same date are merged, later rows winning per ticker.
    pub fn normalize(raw: RawPriceTable) -> Self {
        let mut rows: BTreeMap<NaiveDate, HashMap<String, f64>> = BTreeMap::new();
        for row in raw.rows {
            let Some(date) = parse_date_label(&row.label) else {
                continue;
            };
            let merged = rows.entry(date).or_default();
            for (ticker, price) in row.prices {
                merged.insert(ticker, price);
            }
        }
        Self { rows }
    }

    pub fn insert(&mut self, date: NaiveDate, ticker: &str, price: f64) {
        self.rows
            .entry(date)
            .or_default()
            .insert(ticker.to_string(), price);
    }

    pub fn get(&self, date: NaiveDate, ticker: &str) -> Option<f64> {
        self.rows.get(&date).and_then(|row| row.get(ticker)).copied()
    }

    /// Drops every row strictly after the inclusive `end` boundary.
    pub fn clamp_end(&mut self, end: NaiveDate) {
        if let Some(first_dropped) = end.succ_opt() {
            self.rows.split_off(&first_dropped);
        }
    }

    /// The shared date axis, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parses a raw date label: plain dates, RFC 3339 timestamps and
/// `YYYY-MM-DD HH:MM:SS` are accepted, anything else is rejected.
pub fn parse_date_label(label: &str) -> Option<NaiveDate> {
    let trimmed = label.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    None
}
