//! Economic-series adapter — FRED observations.
//!
//! Two requests per series: `/fred/series` for title/units/frequency and
//! `/fred/series/observations` for the value history. Requires the
//! `FRED_API_KEY` environment variable; its absence fails this dataset only,
//! never the whole run.

use super::http::HttpClient;
use super::{FetchError, FetchOutcome, PartialFailure, Source};
use crate::rows::{RowBatch, SeriesRow};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

pub const API_KEY_ENV: &str = "FRED_API_KEY";
const BASE_URL: &str = "https://api.stlouisfed.org/fred";

#[derive(Debug, Deserialize)]
struct SeriesInfoResponse {
    seriess: Vec<SeriesInfo>,
}

#[derive(Debug, Deserialize)]
struct SeriesInfo {
    title: String,
    units: String,
    frequency: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: NaiveDate,
    value: String,
}

pub struct FredSource {
    http: Arc<HttpClient>,
    series: Vec<String>,
    api_key: String,
    incremental: bool,
}

impl FredSource {
    /// Construct from the process environment. A missing key is a
    /// per-dataset `MissingCredential`, surfaced at bridge construction.
    pub fn from_env(
        http: Arc<HttpClient>,
        series: Vec<String>,
        incremental: bool,
    ) -> Result<Self, FetchError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(FetchError::MissingCredential {
                env_var: API_KEY_ENV.into(),
            })?;
        Ok(Self {
            http,
            series,
            api_key,
            incremental,
        })
    }

    fn info_url(&self, series_id: &str) -> String {
        format!(
            "{BASE_URL}/series?series_id={series_id}&api_key={}&file_type=json",
            self.api_key
        )
    }

    fn observations_url(&self, series_id: &str) -> String {
        let mut url = format!(
            "{BASE_URL}/series/observations?series_id={series_id}&api_key={}&file_type=json",
            self.api_key
        );
        // Incremental is a request-shaping hint only: ask for the trailing
        // two years instead of the full history. Runs stay stateless.
        if self.incremental {
            if let Some(start) =
                chrono::Utc::now().date_naive().checked_sub_months(chrono::Months::new(24))
            {
                url.push_str(&format!("&observation_start={start}"));
            }
        }
        url
    }

    fn fetch_series(&self, series_id: &str) -> Result<Vec<SeriesRow>, FetchError> {
        let info: SeriesInfoResponse = self.http.get_json(&self.info_url(series_id))?;
        let info = info.seriess.into_iter().next().ok_or_else(|| {
            FetchError::ResponseFormatChanged(format!("{series_id}: no series metadata"))
        })?;

        let observations: ObservationsResponse =
            self.http.get_json(&self.observations_url(series_id))?;

        Ok(observations
            .observations
            .into_iter()
            // FRED encodes missing values as "."
            .filter_map(|obs| {
                let value = obs.value.parse::<f64>().ok()?;
                Some(SeriesRow {
                    series_id: series_id.to_string(),
                    date: obs.date,
                    value,
                    title: info.title.clone(),
                    units: info.units.clone(),
                    frequency: info.frequency.clone(),
                })
            })
            .collect())
    }
}

impl Source for FredSource {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(&self) -> Result<FetchOutcome, FetchError> {
        let mut rows = Vec::new();
        let mut partial_failures = Vec::new();

        for series_id in &self.series {
            match self.fetch_series(series_id) {
                Ok(observations) => rows.extend(observations),
                Err(err) if err.is_credential() => return Err(err),
                Err(err) => partial_failures.push(PartialFailure {
                    item: series_id.clone(),
                    reason: err.to_string(),
                }),
            }
        }

        Ok(FetchOutcome::new(RowBatch::Series(rows), partial_failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_are_dropped_not_zeroed() {
        let observations: ObservationsResponse = serde_json::from_str(
            r#"{"observations": [
                {"date": "2025-01-01", "value": "4.33"},
                {"date": "2025-02-01", "value": "."},
                {"date": "2025-03-01", "value": "4.28"}
            ]}"#,
        )
        .unwrap();

        let parsed: Vec<f64> = observations
            .observations
            .iter()
            .filter_map(|o| o.value.parse().ok())
            .collect();
        assert_eq!(parsed, vec![4.33, 4.28]);
    }

    #[test]
    fn from_env_without_key_is_missing_credential() {
        std::env::remove_var(API_KEY_ENV);
        let err = FredSource::from_env(Arc::new(HttpClient::new()), vec!["GDP".into()], false)
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingCredential { env_var } if env_var == API_KEY_ENV));
    }
}
