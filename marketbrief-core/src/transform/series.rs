//! Series transform: latest value and period-over-period change per series.

use crate::rows::SeriesRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one series within the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub series_id: String,
    pub title: String,
    pub units: String,
    pub frequency: String,
    pub latest_value: f64,
    pub latest_date: NaiveDate,
    /// Change from the previous period; absent for single-observation series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub series: Vec<SeriesSummary>,
}

/// Group by series id and summarize. The full history is retained, ordered
/// by (series id, date).
pub fn summarize(rows: Vec<SeriesRow>) -> (SeriesStats, Vec<SeriesRow>) {
    let mut by_series: BTreeMap<String, Vec<SeriesRow>> = BTreeMap::new();
    for row in rows {
        by_series.entry(row.series_id.clone()).or_default().push(row);
    }

    let mut series = Vec::with_capacity(by_series.len());
    let mut retained = Vec::new();

    for (series_id, mut group) in by_series {
        group.sort_by_key(|r| r.date);

        // Non-empty by construction of the grouping.
        let latest = &group[group.len() - 1];
        let previous = group.len().checked_sub(2).map(|i| &group[i]);

        series.push(SeriesSummary {
            series_id,
            title: latest.title.clone(),
            units: latest.units.clone(),
            frequency: latest.frequency.clone(),
            latest_value: latest.value,
            latest_date: latest.date,
            change: previous.map(|p| latest.value - p.value),
        });
        retained.extend(group);
    }

    (SeriesStats { series }, retained)
}
