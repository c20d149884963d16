//! Labor-series adapter — BLS v2 timeseries API.
//!
//! One POST covers every series id in the dataset. BLS responses carry no
//! titles or units, so display labels and units come from the descriptor;
//! frequency is derived from the period code. An API key is optional
//! (unregistered access is rate-limited harder, which the shared HTTP retry
//! absorbs).

use super::http::HttpClient;
use super::{FetchError, FetchOutcome, PartialFailure, Source};
use crate::rows::{RowBatch, SeriesRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const API_KEY_ENV: &str = "BLS_API_KEY";
const ENDPOINT: &str = "https://api.bls.gov/publicAPI/v2/timeseries/data/";

#[derive(Debug, Serialize)]
struct BlsRequest {
    seriesid: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    registrationkey: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlsResponse {
    status: String,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results", default)]
    results: Option<BlsResults>,
}

#[derive(Debug, Deserialize)]
struct BlsResults {
    #[serde(default)]
    series: Vec<BlsSeries>,
}

#[derive(Debug, Deserialize)]
struct BlsSeries {
    #[serde(rename = "seriesID")]
    series_id: String,
    #[serde(default)]
    data: Vec<BlsPoint>,
}

#[derive(Debug, Deserialize)]
struct BlsPoint {
    year: String,
    period: String,
    value: String,
}

pub struct BlsSource {
    http: Arc<HttpClient>,
    series: Vec<String>,
    labels: BTreeMap<String, String>,
    units: BTreeMap<String, String>,
    api_key: Option<String>,
}

impl BlsSource {
    pub fn from_env(
        http: Arc<HttpClient>,
        series: Vec<String>,
        labels: BTreeMap<String, String>,
        units: BTreeMap<String, String>,
    ) -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            http,
            series,
            labels,
            units,
            api_key,
        }
    }

    fn label_for(&self, series_id: &str) -> String {
        self.labels
            .get(series_id)
            .cloned()
            .unwrap_or_else(|| series_id.to_string())
    }

    /// Units for display. Empty when the descriptor doesn't say; the API
    /// itself never reports units, and guessing mislabels rate series.
    fn unit_for(&self, series_id: &str) -> String {
        self.units.get(series_id).cloned().unwrap_or_default()
    }
}

/// Map a BLS (year, period) pair to the first date of the period.
///
/// `M01`..`M12` are months (`M13` is the annual average and is skipped),
/// `Q01`..`Q04` are quarters, `A01` is annual.
fn period_to_date(year: &str, period: &str) -> Option<NaiveDate> {
    let year: i32 = year.parse().ok()?;
    // Provider data is untrusted: an empty or truncated period code skips
    // the point rather than panicking mid-run.
    let kind = period.chars().next()?;
    let num: u32 = period.get(1..)?.parse().ok()?;

    let month = match kind {
        'M' if (1..=12).contains(&num) => num,
        'Q' if (1..=4).contains(&num) => (num - 1) * 3 + 1,
        'A' => 1,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, 1)
}

fn period_frequency(period: &str) -> &'static str {
    match period.chars().next() {
        Some('M') => "monthly",
        Some('Q') => "quarterly",
        Some('A') => "annual",
        _ => "unknown",
    }
}

/// Normalize a BLS response into series rows, noting series the provider
/// silently dropped from the response.
fn parse_response(
    requested: &[String],
    labels: impl Fn(&str) -> String,
    units: impl Fn(&str) -> String,
    resp: BlsResponse,
) -> Result<(Vec<SeriesRow>, Vec<PartialFailure>), FetchError> {
    if resp.status != "REQUEST_SUCCEEDED" {
        return Err(FetchError::Provider(format!(
            "BLS status {}: {}",
            resp.status,
            resp.message.join("; ")
        )));
    }

    let series = resp
        .results
        .map(|r| r.series)
        .ok_or_else(|| FetchError::ResponseFormatChanged("BLS response without Results".into()))?;

    let mut rows = Vec::new();
    let mut returned = std::collections::HashSet::new();

    for s in series {
        returned.insert(s.series_id.clone());
        let title = labels(&s.series_id);
        let unit = units(&s.series_id);
        for point in s.data {
            let Some(date) = period_to_date(&point.year, &point.period) else {
                continue;
            };
            let Ok(value) = point.value.replace(',', "").parse::<f64>() else {
                continue;
            };
            rows.push(SeriesRow {
                series_id: s.series_id.clone(),
                date,
                value,
                title: title.clone(),
                units: unit.clone(),
                frequency: period_frequency(&point.period).into(),
            });
        }
    }

    let partial_failures = requested
        .iter()
        .filter(|id| !returned.contains(*id))
        .map(|id| PartialFailure {
            item: id.clone(),
            reason: "series absent from BLS response".into(),
        })
        .collect();

    Ok((rows, partial_failures))
}

impl Source for BlsSource {
    fn name(&self) -> &str {
        "bls"
    }

    fn fetch(&self) -> Result<FetchOutcome, FetchError> {
        let request = BlsRequest {
            seriesid: self.series.clone(),
            registrationkey: self.api_key.clone(),
        };
        let resp: BlsResponse = self.http.post_json(ENDPOINT, &request)?;
        let (rows, partial_failures) = parse_response(
            &self.series,
            |id| self.label_for(id),
            |id| self.unit_for(id),
            resp,
        )?;
        Ok(FetchOutcome::new(RowBatch::Series(rows), partial_failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_and_quarterly_periods_map_to_dates() {
        assert_eq!(
            period_to_date("2025", "M03"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(
            period_to_date("2024", "Q04"),
            NaiveDate::from_ymd_opt(2024, 10, 1)
        );
        assert_eq!(
            period_to_date("2023", "A01"),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        // Annual average pseudo-month is not a period
        assert_eq!(period_to_date("2023", "M13"), None);
        // Malformed codes from the provider degrade to None, never a panic
        assert_eq!(period_to_date("2025", ""), None);
        assert_eq!(period_to_date("2025", "M"), None);
        assert_eq!(period_to_date("2025", "X05"), None);
    }

    #[test]
    fn parse_response_tags_rows_and_notes_missing_series() {
        let resp: BlsResponse = serde_json::from_str(
            r#"{
                "status": "REQUEST_SUCCEEDED",
                "Results": {
                    "series": [{
                        "seriesID": "CUSR0000SA0",
                        "data": [
                            {"year": "2025", "period": "M02", "value": "319.1"},
                            {"year": "2025", "period": "M01", "value": "317.7"}
                        ]
                    }]
                }
            }"#,
        )
        .unwrap();

        let requested = vec!["CUSR0000SA0".to_string(), "LNS14000000".to_string()];
        let (rows, partial) = parse_response(
            &requested,
            |id| format!("label:{id}"),
            |id| format!("units:{id}"),
            resp,
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "label:CUSR0000SA0");
        assert_eq!(rows[0].units, "units:CUSR0000SA0");
        assert_eq!(rows[0].frequency, "monthly");
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].item, "LNS14000000");
    }

    #[test]
    fn units_come_from_the_descriptor_map() {
        let source = BlsSource::from_env(
            Arc::new(HttpClient::new()),
            vec!["CUSR0000SA0".into(), "LNS14000000".into()],
            BTreeMap::new(),
            BTreeMap::from([("CUSR0000SA0".into(), "index, 1982-84=100".into())]),
        );
        assert_eq!(source.unit_for("CUSR0000SA0"), "index, 1982-84=100");
        // Unlisted series get no units rather than a wrong guess.
        assert_eq!(source.unit_for("LNS14000000"), "");
    }

    #[test]
    fn failed_status_is_a_dataset_error() {
        let resp: BlsResponse = serde_json::from_str(
            r#"{"status": "REQUEST_NOT_PROCESSED", "message": ["daily threshold reached"]}"#,
        )
        .unwrap();
        let err =
            parse_response(&[], |id| id.to_string(), |_| String::new(), resp).unwrap_err();
        assert!(err.to_string().contains("daily threshold"));
    }
}
