//! Dataset registry — static mapping of dataset ids to source configuration.
//!
//! A registry is built once at startup (either the built-in default set or a
//! `datasets.toml` file) and is immutable for the run. All configuration
//! errors — duplicate ids, empty provider config, unknown category — are
//! detected here, before any fetch is attempted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// The five recognized dataset categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceCategory {
    PriceSeries,
    EconomicSeries,
    LaborSeries,
    NewsFeed,
    ScenarioTable,
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceCategory::PriceSeries => "price-series",
            SourceCategory::EconomicSeries => "economic-series",
            SourceCategory::LaborSeries => "labor-series",
            SourceCategory::NewsFeed => "news-feed",
            SourceCategory::ScenarioTable => "scenario-table",
        };
        f.write_str(name)
    }
}

/// One feed within a news-feed dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSpec {
    pub name: String,
    pub url: String,
}

/// Provider-specific configuration, tagged by category.
///
/// The category is derived from the variant, so a descriptor can never carry
/// a config shape that disagrees with its category. An unrecognized `type`
/// in a TOML file fails deserialization and surfaces as a `ConfigError`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Historical bars for a list of symbols over a relative window.
    PriceSeries {
        symbols: Vec<String>,
        #[serde(default = "default_period")]
        period: String,
        #[serde(default = "default_interval")]
        interval: String,
    },
    /// FRED series observations.
    EconomicSeries { series: Vec<String> },
    /// BLS series observations. BLS responses carry no titles or units, so
    /// labels and units come from the descriptor when display names matter.
    LaborSeries {
        series: Vec<String>,
        #[serde(default)]
        labels: BTreeMap<String, String>,
        #[serde(default)]
        units: BTreeMap<String, String>,
    },
    /// One or more RSS feeds.
    NewsFeed { feeds: Vec<FeedSpec> },
    /// Stress-test scenario tables, one CSV per (year, scenario).
    ScenarioTable {
        years: Vec<i32>,
        scenarios: Vec<String>,
    },
}

fn default_period() -> String {
    "1y".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

impl SourceConfig {
    pub fn category(&self) -> SourceCategory {
        match self {
            SourceConfig::PriceSeries { .. } => SourceCategory::PriceSeries,
            SourceConfig::EconomicSeries { .. } => SourceCategory::EconomicSeries,
            SourceConfig::LaborSeries { .. } => SourceCategory::LaborSeries,
            SourceConfig::NewsFeed { .. } => SourceCategory::NewsFeed,
            SourceConfig::ScenarioTable { .. } => SourceCategory::ScenarioTable,
        }
    }
}

/// One dataset: an independently fetched and published unit of data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// Unique key; also the output file stem.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub config: SourceConfig,
    /// Field names that uniquely identify a record. Declarative: the row
    /// model dedups on each shape's natural key, which these document.
    #[serde(default)]
    pub primary_keys: Vec<String>,
    /// Hint that subsequent fetches may request only newer records.
    /// Runs are stateless, so this shapes the provider request only.
    #[serde(default)]
    pub incremental: bool,
}

impl DatasetDescriptor {
    pub fn category(&self) -> SourceCategory {
        self.config.category()
    }
}

/// Registry load/validation errors. All fatal: the run aborts before any fetch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate dataset id '{0}'")]
    DuplicateId(String),

    #[error("dataset '{id}': {reason}")]
    InvalidDescriptor { id: String, reason: String },

    #[error("failed to read dataset config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// TOML file shape: a list of `[[datasets]]` tables.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    datasets: Vec<DatasetDescriptor>,
}

/// Ordered, validated set of dataset descriptors.
#[derive(Debug, Clone)]
pub struct Registry {
    datasets: Vec<DatasetDescriptor>,
}

impl Registry {
    /// Build a registry, rejecting duplicate ids and malformed descriptors.
    pub fn new(datasets: Vec<DatasetDescriptor>) -> Result<Self, ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for descriptor in &datasets {
            if !seen.insert(descriptor.id.clone()) {
                return Err(ConfigError::DuplicateId(descriptor.id.clone()));
            }
            validate(descriptor)?;
        }
        Ok(Self { datasets })
    }

    /// Parse a `datasets.toml` string.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: RegistryFile = toml::from_str(text)?;
        Self::new(file.datasets)
    }

    /// Load a `datasets.toml` file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Datasets in declaration order.
    pub fn list(&self) -> &[DatasetDescriptor] {
        &self.datasets
    }

    pub fn lookup(&self, id: &str) -> Option<&DatasetDescriptor> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// The default dataset set published by the site build.
    pub fn builtin() -> Self {
        let datasets = vec![
            DatasetDescriptor {
                id: "us_indices".into(),
                name: "US Equity Indices".into(),
                description: "Major US index levels, one year of daily bars".into(),
                config: SourceConfig::PriceSeries {
                    symbols: vec!["^GSPC".into(), "^DJI".into(), "^IXIC".into(), "^RUT".into()],
                    period: "1y".into(),
                    interval: "1d".into(),
                },
                primary_keys: vec!["symbol".into(), "date".into()],
                incremental: true,
            },
            DatasetDescriptor {
                id: "sector_etfs".into(),
                name: "Sector ETFs".into(),
                description: "SPDR sector ETF daily closes".into(),
                config: SourceConfig::PriceSeries {
                    symbols: vec![
                        "XLK".into(),
                        "XLF".into(),
                        "XLE".into(),
                        "XLV".into(),
                        "XLY".into(),
                        "XLI".into(),
                        "XLP".into(),
                        "XLU".into(),
                        "XLB".into(),
                        "XLRE".into(),
                        "XLC".into(),
                    ],
                    period: "1y".into(),
                    interval: "1d".into(),
                },
                primary_keys: vec!["symbol".into(), "date".into()],
                incremental: true,
            },
            DatasetDescriptor {
                id: "fred_rates".into(),
                name: "Interest Rates".into(),
                description: "Policy rate and Treasury yields from FRED".into(),
                config: SourceConfig::EconomicSeries {
                    series: vec![
                        "FEDFUNDS".into(),
                        "DGS2".into(),
                        "DGS10".into(),
                        "T10Y2Y".into(),
                    ],
                },
                primary_keys: vec!["series_id".into(), "date".into()],
                incremental: true,
            },
            DatasetDescriptor {
                id: "fred_macro".into(),
                name: "Macro Indicators".into(),
                description: "GDP, unemployment, and CPI from FRED".into(),
                config: SourceConfig::EconomicSeries {
                    series: vec!["GDP".into(), "UNRATE".into(), "CPIAUCSL".into()],
                },
                primary_keys: vec!["series_id".into(), "date".into()],
                incremental: true,
            },
            DatasetDescriptor {
                id: "bls_cpi".into(),
                name: "CPI (BLS)".into(),
                description: "Consumer Price Index for All Urban Consumers".into(),
                config: SourceConfig::LaborSeries {
                    series: vec!["CUSR0000SA0".into()],
                    labels: BTreeMap::from([(
                        "CUSR0000SA0".into(),
                        "CPI-U, all items, seasonally adjusted".into(),
                    )]),
                    units: BTreeMap::from([(
                        "CUSR0000SA0".into(),
                        "index, 1982-84=100".into(),
                    )]),
                },
                primary_keys: vec!["series_id".into(), "date".into()],
                incremental: true,
            },
            DatasetDescriptor {
                id: "fed_news".into(),
                name: "Federal Reserve News".into(),
                description: "Press releases and speeches from the Board's feeds".into(),
                config: SourceConfig::NewsFeed {
                    feeds: vec![
                        FeedSpec {
                            name: "Fed Press Releases".into(),
                            url: "https://www.federalreserve.gov/feeds/press_all.xml".into(),
                        },
                        FeedSpec {
                            name: "Fed Speeches".into(),
                            url: "https://www.federalreserve.gov/feeds/speeches.xml".into(),
                        },
                    ],
                },
                primary_keys: vec!["link".into()],
                incremental: false,
            },
            DatasetDescriptor {
                id: "fed_stress".into(),
                name: "Stress Test Scenarios".into(),
                description: "Supervisory stress-test scenario tables".into(),
                config: SourceConfig::ScenarioTable {
                    years: vec![2025],
                    scenarios: vec![
                        "Table_2A_Supervisory_Baseline_Domestic".into(),
                        "Table_3A_Supervisory_Severely_Adverse_Domestic".into(),
                    ],
                },
                primary_keys: vec![
                    "year".into(),
                    "scenario".into(),
                    "variable".into(),
                    "date".into(),
                ],
                incremental: false,
            },
        ];

        // The built-in set is fixed; a validation failure here is a bug.
        Self::new(datasets).expect("built-in registry is valid")
    }
}

fn validate(descriptor: &DatasetDescriptor) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidDescriptor {
        id: descriptor.id.clone(),
        reason: reason.to_string(),
    };

    if descriptor.id.trim().is_empty() {
        return Err(ConfigError::InvalidDescriptor {
            id: "<empty>".into(),
            reason: "dataset id must not be empty".into(),
        });
    }

    match &descriptor.config {
        SourceConfig::PriceSeries { symbols, .. } if symbols.is_empty() => {
            Err(invalid("price-series dataset needs at least one symbol"))
        }
        SourceConfig::EconomicSeries { series } | SourceConfig::LaborSeries { series, .. }
            if series.is_empty() =>
        {
            Err(invalid("series dataset needs at least one series id"))
        }
        SourceConfig::NewsFeed { feeds } if feeds.is_empty() => {
            Err(invalid("news-feed dataset needs at least one feed"))
        }
        SourceConfig::ScenarioTable { years, scenarios }
            if years.is_empty() || scenarios.is_empty() =>
        {
            Err(invalid("scenario-table dataset needs years and scenarios"))
        }
        _ => Ok(()),
    }
}
