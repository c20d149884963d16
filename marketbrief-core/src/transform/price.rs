//! Price transform: per-symbol summary statistics plus a capped row set.

use crate::rows::PriceRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-symbol summary over the fetched window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolStats {
    pub symbol: String,
    pub min_close: f64,
    pub max_close: f64,
    pub last_close: f64,
    /// Percent change from the first to the last close of the window.
    pub pct_change: f64,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub symbols: Vec<SymbolStats>,
}

/// Group rows by symbol, compute per-symbol stats, and cap the retained
/// rows per symbol to the most recent `max_rows_per_symbol`.
///
/// Statistics are computed over the full window before capping, so a capped
/// document still reports the true window min/max/change.
pub fn summarize(rows: Vec<PriceRow>, max_rows_per_symbol: usize) -> (PriceStats, Vec<PriceRow>) {
    let mut by_symbol: BTreeMap<String, Vec<PriceRow>> = BTreeMap::new();
    for row in rows {
        by_symbol.entry(row.symbol.clone()).or_default().push(row);
    }

    let mut symbols = Vec::with_capacity(by_symbol.len());
    let mut retained = Vec::new();

    for (symbol, mut group) in by_symbol {
        group.sort_by_key(|r| r.date);

        let first_close = group.first().map(|r| r.close).unwrap_or(0.0);
        let last_close = group.last().map(|r| r.close).unwrap_or(0.0);
        let min_close = group.iter().map(|r| r.close).fold(f64::INFINITY, f64::min);
        let max_close = group
            .iter()
            .map(|r| r.close)
            .fold(f64::NEG_INFINITY, f64::max);
        let pct_change = if first_close != 0.0 {
            (last_close - first_close) / first_close * 100.0
        } else {
            0.0
        };

        if group.len() > max_rows_per_symbol {
            group.drain(..group.len() - max_rows_per_symbol);
        }

        symbols.push(SymbolStats {
            symbol,
            min_close,
            max_close,
            last_close,
            pct_change,
            row_count: group.len(),
        });
        retained.extend(group);
    }

    (PriceStats { symbols }, retained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(symbol: &str, day: u32, close: f64) -> PriceRow {
        PriceRow {
            symbol: symbol.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100,
        }
    }

    #[test]
    fn per_symbol_stats_cover_min_max_last_and_change() {
        let rows = vec![
            bar("SPY", 3, 100.0),
            bar("SPY", 4, 90.0),
            bar("SPY", 5, 110.0),
            bar("QQQ", 3, 50.0),
            bar("QQQ", 5, 55.0),
        ];
        let (stats, retained) = summarize(rows, 500);

        assert_eq!(retained.len(), 5);
        assert_eq!(stats.symbols.len(), 2);

        let spy = stats.symbols.iter().find(|s| s.symbol == "SPY").unwrap();
        assert_eq!(spy.min_close, 90.0);
        assert_eq!(spy.max_close, 110.0);
        assert_eq!(spy.last_close, 110.0);
        assert!((spy.pct_change - 10.0).abs() < 1e-9);

        let qqq = stats.symbols.iter().find(|s| s.symbol == "QQQ").unwrap();
        assert!((qqq.pct_change - 10.0).abs() < 1e-9);
    }

    #[test]
    fn cap_keeps_the_most_recent_rows() {
        let rows = (1..=10).map(|d| bar("SPY", d, d as f64)).collect();
        let (stats, retained) = summarize(rows, 3);

        assert_eq!(retained.len(), 3);
        assert_eq!(retained[0].date, NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
        // Stats still reflect the full window, not the capped rows.
        let spy = &stats.symbols[0];
        assert_eq!(spy.min_close, 1.0);
        assert_eq!(spy.max_close, 10.0);
        assert_eq!(spy.row_count, 3);
    }

    #[test]
    fn unsorted_input_is_ordered_by_date() {
        let rows = vec![bar("SPY", 7, 3.0), bar("SPY", 2, 1.0), bar("SPY", 5, 2.0)];
        let (stats, retained) = summarize(rows, 500);
        assert!(retained.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(stats.symbols[0].last_close, 3.0);
    }

    #[test]
    fn empty_input_yields_empty_stats() {
        let (stats, retained) = summarize(Vec::new(), 500);
        assert!(stats.symbols.is_empty());
        assert!(retained.is_empty());
    }
}
