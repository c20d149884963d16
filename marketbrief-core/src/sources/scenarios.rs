//! Scenario-table adapter — supervisory stress-test scenario CSVs.
//!
//! The tables are published one CSV per (year, scenario), wide form: a
//! `Date` column of period labels plus one column per scenario variable.
//! Each cell melts into one `ScenarioRow`, so downstream consumers see a
//! uniform long-form shape regardless of which table a value came from.

use super::http::HttpClient;
use super::{FetchError, FetchOutcome, PartialFailure, Source};
use crate::rows::{RowBatch, ScenarioRow};
use std::sync::Arc;

const BASE_URL: &str = "https://www.federalreserve.gov/supervisionreg/files";

pub struct ScenarioSource {
    http: Arc<HttpClient>,
    years: Vec<i32>,
    scenarios: Vec<String>,
}

impl ScenarioSource {
    pub fn new(http: Arc<HttpClient>, years: Vec<i32>, scenarios: Vec<String>) -> Self {
        Self {
            http,
            years,
            scenarios,
        }
    }

    fn table_url(year: i32, scenario: &str) -> String {
        format!("{BASE_URL}/{year}-{scenario}.csv")
    }
}

/// Melt one wide scenario CSV into long rows.
///
/// Cells that don't parse as numbers (footnote markers, blanks) are dropped;
/// thousands separators and percent signs are stripped first.
fn parse_table(year: i32, scenario: &str, csv_text: &str) -> Result<Vec<ScenarioRow>, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FetchError::ResponseFormatChanged(format!("{year}/{scenario}: {e}")))?
        .clone();

    if headers.is_empty() {
        return Err(FetchError::ResponseFormatChanged(format!(
            "{year}/{scenario}: empty header row"
        )));
    }

    let variables: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record =
            record.map_err(|e| FetchError::ResponseFormatChanged(format!("{year}/{scenario}: {e}")))?;
        let Some(date) = record.get(0).map(str::trim).filter(|d| !d.is_empty()) else {
            continue;
        };

        for (variable, cell) in variables.iter().zip(record.iter().skip(1)) {
            let cleaned = cell.trim().replace([',', '%'], "");
            let Ok(value) = cleaned.parse::<f64>() else {
                continue;
            };
            rows.push(ScenarioRow {
                year,
                scenario: scenario.to_string(),
                variable: variable.clone(),
                date: date.to_string(),
                value,
            });
        }
    }

    if rows.is_empty() {
        return Err(FetchError::ResponseFormatChanged(format!(
            "{year}/{scenario}: table contained no numeric cells"
        )));
    }

    Ok(rows)
}

impl Source for ScenarioSource {
    fn name(&self) -> &str {
        "fed_stress"
    }

    fn fetch(&self) -> Result<FetchOutcome, FetchError> {
        let mut rows = Vec::new();
        let mut partial_failures = Vec::new();

        for &year in &self.years {
            for scenario in &self.scenarios {
                let result = self
                    .http
                    .get_text(&Self::table_url(year, scenario))
                    .and_then(|text| parse_table(year, scenario, &text));

                match result {
                    Ok(table) => rows.extend(table),
                    Err(err) if err.is_credential() => return Err(err),
                    Err(err) => partial_failures.push(PartialFailure {
                        item: format!("{year}/{scenario}"),
                        reason: err.to_string(),
                    }),
                }
            }
        }

        Ok(FetchOutcome::new(RowBatch::Scenarios(rows), partial_failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
Date,Real GDP growth,Unemployment rate,Dow Jones Total Stock Market Index
2025 Q1,2.1,4.1,\"60,123.4\"
2025 Q2,-0.5,4.4,\"55,002.1\"
2025 Q3,n/a,4.9,\"51,800.0\"
";

    #[test]
    fn wide_table_melts_into_long_rows() {
        let rows = parse_table(2025, "baseline", SAMPLE_CSV).unwrap();
        // 3 periods x 3 variables, minus the one non-numeric cell
        assert_eq!(rows.len(), 8);
        assert!(rows
            .iter()
            .all(|r| r.year == 2025 && r.scenario == "baseline"));
    }

    #[test]
    fn thousands_separators_are_stripped() {
        let rows = parse_table(2025, "baseline", SAMPLE_CSV).unwrap();
        let index = rows
            .iter()
            .find(|r| r.variable.starts_with("Dow Jones") && r.date == "2025 Q1")
            .unwrap();
        assert_eq!(index.value, 60123.4);
    }

    #[test]
    fn non_numeric_cells_are_dropped() {
        let rows = parse_table(2025, "baseline", SAMPLE_CSV).unwrap();
        assert!(!rows
            .iter()
            .any(|r| r.variable == "Real GDP growth" && r.date == "2025 Q3"));
    }

    #[test]
    fn all_text_table_is_a_format_error() {
        let err = parse_table(2025, "adverse", "Date,Note\nQ1,see footnote\n").unwrap_err();
        assert!(matches!(err, FetchError::ResponseFormatChanged(_)));
    }
}
