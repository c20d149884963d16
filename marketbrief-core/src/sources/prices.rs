//! Price-series adapter — daily OHLCV bars from the Yahoo v8 chart API.
//!
//! One request per symbol; all bars are concatenated into a single batch
//! tagged by symbol. A symbol that reports "no data in range" (a documented
//! provider quirk) becomes a partial failure and the rest of the dataset
//! proceeds.

use super::http::HttpClient;
use super::{FetchError, FetchOutcome, PartialFailure, Source};
use crate::rows::{PriceRow, RowBatch};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartSeries>>,
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

pub struct PriceSource {
    http: Arc<HttpClient>,
    symbols: Vec<String>,
    period: String,
    interval: String,
}

impl PriceSource {
    pub fn new(http: Arc<HttpClient>, symbols: Vec<String>, period: String, interval: String) -> Self {
        Self {
            http,
            symbols,
            period,
            interval,
        }
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?range={}&interval={}",
            self.period, self.interval
        )
    }
}

/// Flatten one chart response into price rows for `symbol`.
///
/// Bars with no close (holidays, halted sessions) are dropped rather than
/// carried as NaN — downstream statistics assume every retained bar priced.
fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<PriceRow>, FetchError> {
    if let Some(err) = resp.chart.error {
        return Err(FetchError::Provider(format!(
            "{symbol}: {} ({})",
            err.description, err.code
        )));
    }

    let series = resp
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| {
            FetchError::ResponseFormatChanged(format!("{symbol}: empty chart result"))
        })?;

    let timestamps = series.timestamp.unwrap_or_default();
    let quote = series.indicators.quote.into_iter().next().ok_or_else(|| {
        FetchError::ResponseFormatChanged(format!("{symbol}: no quote block"))
    })?;

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = match chrono::DateTime::from_timestamp(ts, 0) {
            Some(dt) => dt.naive_utc().date(),
            None => continue,
        };

        let close = quote.close.get(i).copied().flatten();
        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();

        let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
            continue;
        };

        rows.push(PriceRow {
            symbol: symbol.to_string(),
            date,
            open,
            high,
            low,
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    if rows.is_empty() {
        return Err(FetchError::Provider(format!("{symbol}: no data in range")));
    }

    Ok(rows)
}

impl Source for PriceSource {
    fn name(&self) -> &str {
        "yahoo_chart"
    }

    fn fetch(&self) -> Result<FetchOutcome, FetchError> {
        let mut rows = Vec::new();
        let mut partial_failures = Vec::new();

        for symbol in &self.symbols {
            let fetched = self
                .http
                .get_json::<ChartResponse>(&self.chart_url(symbol))
                .and_then(|resp| parse_chart(symbol, resp));

            match fetched {
                Ok(bars) => rows.extend(bars),
                Err(err) if err.is_credential() => return Err(err),
                Err(err) => partial_failures.push(PartialFailure {
                    item: symbol.clone(),
                    reason: err.to_string(),
                }),
            }
        }

        Ok(FetchOutcome::new(RowBatch::Prices(rows), partial_failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parse_chart_builds_tagged_rows() {
        let resp = sample_response(
            r#"{
                "chart": {
                    "result": [{
                        "timestamp": [1735776000, 1735862400],
                        "indicators": {
                            "quote": [{
                                "open":   [100.0, 101.5],
                                "high":   [102.0, 103.0],
                                "low":    [99.0, 100.5],
                                "close":  [101.0, 102.5],
                                "volume": [1000, 2000]
                            }]
                        }
                    }],
                    "error": null
                }
            }"#,
        );

        let rows = parse_chart("SPY", resp).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "SPY");
        assert_eq!(rows[1].close, 102.5);
        assert!(rows[0].date < rows[1].date);
    }

    #[test]
    fn parse_chart_skips_unpriced_bars() {
        let resp = sample_response(
            r#"{
                "chart": {
                    "result": [{
                        "timestamp": [1735776000, 1735862400],
                        "indicators": {
                            "quote": [{
                                "open":   [100.0, null],
                                "high":   [102.0, null],
                                "low":    [99.0, null],
                                "close":  [101.0, null],
                                "volume": [1000, null]
                            }]
                        }
                    }],
                    "error": null
                }
            }"#,
        );

        let rows = parse_chart("SPY", resp).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn provider_error_carries_symbol() {
        let resp = sample_response(
            r#"{
                "chart": {
                    "result": null,
                    "error": {"code": "Not Found", "description": "No data found"}
                }
            }"#,
        );

        let err = parse_chart("XXXX", resp).unwrap_err();
        assert!(err.to_string().contains("XXXX"));
    }

    #[test]
    fn all_bars_missing_is_no_data_in_range() {
        let resp = sample_response(
            r#"{
                "chart": {
                    "result": [{
                        "timestamp": [],
                        "indicators": {"quote": [{"open":[],"high":[],"low":[],"close":[],"volume":[]}]}
                    }],
                    "error": null
                }
            }"#,
        );

        let err = parse_chart("THIN", resp).unwrap_err();
        assert!(err.to_string().contains("no data in range"));
    }
}
