use crate::table::PriceTable;
use std::collections::BTreeMap;

/// Result of the return engine for one portfolio, aligned with the shared
/// date axis of the clamped table.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReturns {
    /// Inception-to-date return per logical ticker; `None` where undefined.
    pub assets: BTreeMap<String, Vec<Option<f64>>>,
    /// Forward-filled raw price per logical ticker; `None` where missing.
    pub asset_prices: BTreeMap<String, Vec<Option<f64>>>,
    /// Equal-weighted mean of the defined per-ticker returns; `None` when
    /// none are defined at a date.
    pub portfolio_return: Vec<Option<f64>>,
}

/// Computes per-asset ITD returns and the portfolio mean for the given
/// `(logical, provider)` ticker pairs, in list order.
///
/// Forward-fill runs per column over the whole axis before anything else;
/// inception prices are read from the filled series at the first axis date,
/// never from the raw series. A pure function of its inputs.
pub fn compute(table: &PriceTable, tickers: &[(String, String)]) -> PortfolioReturns {
    let dates: Vec<_> = table.dates().collect();

    let mut filled: Vec<Vec<Option<f64>>> = Vec::with_capacity(tickers.len());
    for (_, provider_symbol) in tickers {
        let mut column = Vec::with_capacity(dates.len());
        let mut carried: Option<f64> = None;
        for &date in &dates {
            // Non-finite cells count as missing, same as absent ones.
            if let Some(price) = table.get(date, provider_symbol).filter(|p| p.is_finite()) {
                carried = Some(price);
            }
            column.push(carried);
        }
        filled.push(column);
    }

    let inception: Vec<Option<f64>> = filled
        .iter()
        .map(|column| column.first().copied().flatten())
        .collect();

    let mut assets: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    let mut asset_prices: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for (logical, _) in tickers {
        assets.insert(logical.clone(), Vec::with_capacity(dates.len()));
        asset_prices.insert(logical.clone(), Vec::with_capacity(dates.len()));
    }

    let mut portfolio_return = Vec::with_capacity(dates.len());
    for row in 0..dates.len() {
        let mut defined = Vec::with_capacity(tickers.len());
        for (index, (logical, _)) in tickers.iter().enumerate() {
            let price = filled[index][row];
            let itd = match (inception[index], price) {
                (Some(inception_price), Some(price)) if inception_price != 0.0 => {
                    Some(price / inception_price - 1.0)
                }
                _ => None,
            };

            if let Some(prices) = asset_prices.get_mut(logical) {
                prices.push(price);
            }
            if let Some(returns) = assets.get_mut(logical) {
                returns.push(itd);
            }
            if let Some(value) = itd {
                defined.push(value);
            }
        }

        // Undefined returns are excluded from both numerator and denominator.
        portfolio_return.push(if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        });
    }

    PortfolioReturns {
        assets,
        asset_prices,
        portfolio_return,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn pair(ticker: &str) -> (String, String) {
        (ticker.to_string(), format!("{ticker}.SA"))
    }

    fn axis(days: &[u32]) -> Vec<NaiveDate> {
        days.iter().map(|&d| date(2025, 1, d)).collect()
    }

    #[test]
    fn inception_price_comes_from_the_forward_filled_series() {
        // AAA has no price on the first axis date; the axis is widened by
        // another ticker. Forward-fill cannot fabricate values before the
        // first observation, so inception stays undefined until it appears.
        let mut table = PriceTable::default();
        table.insert(date(2025, 1, 1), "BBB.SA", 1.0);
        table.insert(date(2025, 1, 2), "AAA.SA", 10.0);
        table.insert(date(2025, 1, 3), "AAA.SA", 12.0);

        let result = compute(&table, &[pair("AAA")]);

        assert_eq!(result.assets["AAA"], vec![None, None, None]);
        assert_eq!(result.asset_prices["AAA"], vec![None, Some(10.0), Some(12.0)]);
        assert_eq!(result.portfolio_return, vec![None, None, None]);
    }

    #[test]
    fn forward_fill_happens_before_inception_capture() {
        // AAA misses the second axis date; BBB misses the first. BBB's
        // inception must be read from the filled series, which is still
        // empty on day one, so every BBB return is null.
        let mut table = PriceTable::default();
        table.insert(date(2025, 1, 1), "AAA.SA", 10.0);
        table.insert(date(2025, 1, 2), "BBB.SA", 20.0);
        table.insert(date(2025, 1, 3), "AAA.SA", 11.0);
        table.insert(date(2025, 1, 3), "BBB.SA", 22.0);

        let result = compute(&table, &[pair("AAA"), pair("BBB")]);

        // AAA: 10 carried over day two.
        assert_eq!(
            result.asset_prices["AAA"],
            vec![Some(10.0), Some(10.0), Some(11.0)]
        );
        assert_eq!(
            result.assets["AAA"],
            vec![Some(0.0), Some(0.0), Some(11.0 / 10.0 - 1.0)]
        );
        assert_eq!(result.assets["BBB"], vec![None, None, None]);
    }

    #[test]
    fn zero_inception_price_nulls_the_entire_series() {
        let mut table = PriceTable::default();
        table.insert(date(2025, 1, 1), "AAA.SA", 0.0);
        table.insert(date(2025, 1, 2), "AAA.SA", 5.0);

        let result = compute(&table, &[pair("AAA")]);

        assert_eq!(result.assets["AAA"], vec![None, None]);
        // Raw prices are still reported.
        assert_eq!(result.asset_prices["AAA"], vec![Some(0.0), Some(5.0)]);
    }

    #[test]
    fn portfolio_mean_divides_by_defined_returns_only() {
        // Three tickers, one of them (CCC) null on every date: the mean must
        // use a divisor of 2, not 3.
        let mut table = PriceTable::default();
        for (day, a, b) in [(1u32, 10.0, 20.0), (2, 11.0, 22.0)] {
            table.insert(date(2025, 1, day), "AAA.SA", a);
            table.insert(date(2025, 1, day), "BBB.SA", b);
        }

        let result = compute(&table, &[pair("AAA"), pair("BBB"), pair("CCC")]);

        let expected_day2 = ((11.0 / 10.0 - 1.0) + (22.0 / 20.0 - 1.0)) / 2.0;
        assert_eq!(result.portfolio_return[0], Some(0.0));
        let got = result.portfolio_return[1].expect("mean should be defined");
        assert!((got - expected_day2).abs() < 1e-12);
        assert_eq!(result.assets["CCC"], vec![None, None]);
    }

    #[test]
    fn portfolio_return_is_null_when_no_ticker_has_a_defined_return() {
        let mut table = PriceTable::default();
        table.insert(date(2025, 1, 1), "ZZZ.SA", 1.0);

        let result = compute(&table, &[pair("AAA"), pair("BBB")]);

        assert_eq!(result.portfolio_return, vec![None]);
    }

    #[test]
    fn single_ticker_benchmark_mean_equals_its_own_return() {
        let mut table = PriceTable::default();
        table.insert(date(2025, 1, 1), "^BVSP", 100_000.0);
        table.insert(date(2025, 1, 2), "^BVSP", 105_000.0);

        let tickers = vec![("^BVSP".to_string(), "^BVSP".to_string())];
        let result = compute(&table, &tickers);

        assert_eq!(result.portfolio_return, result.assets["^BVSP"]);
        assert_eq!(result.assets["^BVSP"][1], Some(0.05));
    }

    #[test]
    fn non_finite_prices_are_treated_as_missing() {
        let mut table = PriceTable::default();
        table.insert(date(2025, 1, 1), "AAA.SA", 10.0);
        table.insert(date(2025, 1, 2), "AAA.SA", f64::NAN);

        let result = compute(&table, &[pair("AAA")]);

        // The NaN cell forward-fills from the prior close.
        assert_eq!(result.asset_prices["AAA"], vec![Some(10.0), Some(10.0)]);
        assert_eq!(result.assets["AAA"], vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn engine_is_a_pure_function_of_its_inputs() {
        let mut table = PriceTable::default();
        for day in 1..=5 {
            table.insert(date(2025, 1, day), "AAA.SA", day as f64 * 1.5);
            if day != 3 {
                table.insert(date(2025, 1, day), "BBB.SA", day as f64 * 2.5);
            }
        }
        let tickers = vec![pair("AAA"), pair("BBB")];

        let first = compute(&table, &tickers);
        let second = compute(&table, &tickers);

        assert_eq!(first, second);
    }

    #[test]
    fn output_lists_align_with_the_date_axis() {
        let mut table = PriceTable::default();
        for &day in &[1u32, 2, 4, 7] {
            table.insert(date(2025, 1, day), "AAA.SA", day as f64);
        }
        let expected_axis = axis(&[1, 2, 4, 7]);
        assert_eq!(table.dates().collect::<Vec<_>>(), expected_axis);

        let result = compute(&table, &[pair("AAA"), pair("BBB")]);

        assert_eq!(result.portfolio_return.len(), expected_axis.len());
        for lists in [&result.assets, &result.asset_prices] {
            for series in lists.values() {
                assert_eq!(series.len(), expected_axis.len());
            }
        }
    }
}
