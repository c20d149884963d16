//! Scenario transform: pass-through rows with a per-scenario breakdown.
//!
//! Scenario tables are already display-shaped after melting; no aggregate
//! statistics are computed. The stats block only describes what the table
//! contains so the index page can label it.

use crate::rows::ScenarioRow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBreakdown {
    pub scenario: String,
    pub variable_count: usize,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStats {
    pub scenarios: Vec<ScenarioBreakdown>,
}

pub fn summarize(rows: Vec<ScenarioRow>) -> (ScenarioStats, Vec<ScenarioRow>) {
    let mut variables: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for row in &rows {
        variables
            .entry(row.scenario.clone())
            .or_default()
            .insert(row.variable.clone());
        *counts.entry(row.scenario.clone()).or_default() += 1;
    }

    let scenarios = variables
        .into_iter()
        .map(|(scenario, vars)| {
            let row_count = counts.get(&scenario).copied().unwrap_or(0);
            ScenarioBreakdown {
                scenario,
                variable_count: vars.len(),
                row_count,
            }
        })
        .collect();

    (ScenarioStats { scenarios }, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(scenario: &str, variable: &str, date: &str) -> ScenarioRow {
        ScenarioRow {
            year: 2025,
            scenario: scenario.to_string(),
            variable: variable.to_string(),
            date: date.to_string(),
            value: 1.0,
        }
    }

    #[test]
    fn breakdown_groups_by_scenario_and_counts_variables() {
        let rows = vec![
            cell("baseline", "gdp", "2025 Q1"),
            cell("baseline", "gdp", "2025 Q2"),
            cell("baseline", "unrate", "2025 Q1"),
            cell("severely_adverse", "gdp", "2025 Q1"),
        ];
        let (stats, retained) = summarize(rows);

        assert_eq!(retained.len(), 4);
        assert_eq!(stats.scenarios.len(), 2);

        let baseline = stats
            .scenarios
            .iter()
            .find(|s| s.scenario == "baseline")
            .unwrap();
        assert_eq!(baseline.variable_count, 2);
        assert_eq!(baseline.row_count, 3);
    }

    #[test]
    fn rows_pass_through_unchanged() {
        let rows = vec![cell("baseline", "gdp", "2025 Q1")];
        let (_, retained) = summarize(rows.clone());
        assert_eq!(retained, rows);
    }

    #[test]
    fn empty_input_yields_empty_stats() {
        let (stats, retained) = summarize(Vec::new());
        assert!(stats.scenarios.is_empty());
        assert!(retained.is_empty());
    }
}
