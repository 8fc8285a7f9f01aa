use crate::table::{parse_date_label, PriceTable};
use chrono::NaiveDate;
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Price keys probed on a keyed payload, in rank order.
const PRICE_KEYS: [&str; 5] = ["prices", "values", "closes", "series", "data"];

/// Externally supplied close series for a single designated ticker,
/// authoritative only before a cutoff date. An empty series is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideSeries {
    entries: BTreeMap<NaiveDate, f64>,
}

impl OverrideSeries {
    /// Reads the bundled override payload. Absence, unreadable bytes or
    /// malformed JSON all degrade to an empty series, never an error.
    pub fn load(path: &Path) -> Self {
        let Ok(bytes) = fs::read(path) else {
            debug!("override payload {} not readable; skipping", path.display());
            return Self::default();
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(payload) => Self::from_json(&payload),
            Err(err) => {
                debug!("override payload {} is not JSON: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Parses a payload against the ranked list of accepted shapes:
    /// 1. `{dates: [...], <prices|values|closes|series|data>: [...]}`;
    /// 2. a bare array, which carries no `dates` and therefore yields an
    ///    empty series.
    ///
    /// Mismatched lengths truncate both lists to the shorter one, keeping
    /// the leading elements. Entries with an unparsable date or a
    /// non-numeric price are dropped after that pairing.
    pub fn from_json(payload: &Value) -> Self {
        let Some(object) = payload.as_object() else {
            return Self::default();
        };
        let Some(dates) = object.get("dates").and_then(Value::as_array) else {
            return Self::default();
        };
        let Some(prices) = PRICE_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_array))
        else {
            return Self::default();
        };

        let usable = dates.len().min(prices.len());
        let mut entries = BTreeMap::new();
        for (raw_date, raw_price) in dates.iter().take(usable).zip(prices.iter().take(usable)) {
            let Some(date) = raw_date.as_str().and_then(parse_date_label) else {
                continue;
            };
            let Some(price) = coerce_number(raw_price) else {
                continue;
            };
            entries.insert(date, price);
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Splices the series into `table` under `ticker` for dates strictly
    /// before `cutoff`, expanding the date axis as needed. Dates at or after
    /// the cutoff keep whatever the provider returned.
    pub fn merge_into(&self, table: &mut PriceTable, ticker: &str, cutoff: NaiveDate) {
        for (&date, &price) in self.entries.range(..cutoff) {
            table.insert(date, ticker, price);
        }
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(raw) => raw.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
