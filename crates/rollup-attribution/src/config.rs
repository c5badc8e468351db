//! Engine configuration.
//!
//! Every field has a default, so a TOML file only needs the keys it
//! changes:
//!
//! ```toml
//! top_level_name = "Portfolio"
//! atom_conflict_policy = "error"
//! measure_columns = ["pnl", "moic", "irr"]
//!
//! [realization]
//! attribute = "RealizationStatus"
//! unknown_bucket = "REALIZED"
//!
//! [realization.mapping]
//! Realized = "REALIZED"
//! "Partially Realized" = "REALIZED"
//! Unrealized = "UNREALIZED"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use rollup_math::IrrConfig;
use rollup_performance::Measure;

use crate::error::{AttributionError, AttributionResult};

/// What the tree builder does with an atom that spans several investments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomConflictPolicy {
    /// Drop the atom, log a warning and count it in the build summary.
    #[default]
    Skip,
    /// Fail the build with `AttributionError::Ambiguity`.
    Error,
}

/// The two realization buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RealizationBucket {
    /// Fully exited positions.
    Realized,
    /// Positions still held.
    Unrealized,
}

impl RealizationBucket {
    /// Both buckets.
    pub const ALL: [RealizationBucket; 2] =
        [RealizationBucket::Realized, RealizationBucket::Unrealized];

    /// Upper-case bucket name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RealizationBucket::Realized => "REALIZED",
            RealizationBucket::Unrealized => "UNREALIZED",
        }
    }
}

impl fmt::Display for RealizationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How child layers are mapped to realization buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealizationConfig {
    /// Attribute whose values carry the realization status.
    pub attribute: String,

    /// Bucket that absorbs statuses missing from `mapping` in a split.
    pub unknown_bucket: RealizationBucket,

    /// Status value to bucket; matched after trimming, case-insensitively.
    pub mapping: BTreeMap<String, RealizationBucket>,
}

impl Default for RealizationConfig {
    fn default() -> Self {
        let mapping = [
            ("Realized".to_string(), RealizationBucket::Realized),
            ("Unrealized".to_string(), RealizationBucket::Unrealized),
        ]
        .into_iter()
        .collect();
        Self {
            attribute: "RealizationStatus".to_string(),
            unknown_bucket: RealizationBucket::Unrealized,
            mapping,
        }
    }
}

impl RealizationConfig {
    /// Maps an additional status value.
    #[must_use]
    pub fn with_mapping(mut self, status: impl Into<String>, bucket: RealizationBucket) -> Self {
        self.mapping.insert(status.into(), bucket);
        self
    }

    /// Sets the bucket that absorbs unmapped statuses.
    #[must_use]
    pub fn with_unknown_bucket(mut self, bucket: RealizationBucket) -> Self {
        self.unknown_bucket = bucket;
        self
    }

    /// Looks up the bucket of a status value.
    #[must_use]
    pub fn classify(&self, status: &str) -> Option<RealizationBucket> {
        let needle = normalize(status);
        self.mapping
            .iter()
            .find(|(key, _)| normalize(key) == needle)
            .map(|(_, bucket)| *bucket)
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Configuration for tree construction and report output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name of the root layer.
    pub top_level_name: String,

    /// Aggregation interval whose atom results are used.
    pub aggregate_interval: String,

    /// Column identifying the atom (finest attribution unit).
    pub atom_id_column: String,

    /// Column carrying the investment name in merged records.
    pub investment_column: String,

    /// Column carrying the manager name in merged records.
    pub manager_column: String,

    /// Handling of atoms that span several investments.
    pub atom_conflict_policy: AtomConflictPolicy,

    /// Default measure columns for report rows.
    pub measure_columns: Vec<Measure>,

    /// Realization bucket mapping.
    pub realization: RealizationConfig,

    /// IRR solver settings.
    pub irr: IrrConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_level_name: "Total".to_string(),
            aggregate_interval: "ITD".to_string(),
            atom_id_column: "PositionId".to_string(),
            investment_column: "InvestmentName".to_string(),
            manager_column: "ManagerName".to_string(),
            atom_conflict_policy: AtomConflictPolicy::Skip,
            measure_columns: vec![
                Measure::Cost,
                Measure::Distributions,
                Measure::Nav,
                Measure::Pnl,
                Measure::Moic,
                Measure::Dpi,
                Measure::Rvpi,
                Measure::Irr,
                Measure::LossRatio,
                Measure::FullExpandedCount,
            ],
            realization: RealizationConfig::default(),
            irr: IrrConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> AttributionResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| AttributionError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> AttributionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AttributionError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Renders the config as TOML.
    pub fn to_toml_string(&self) -> AttributionResult<String> {
        toml::to_string_pretty(self).map_err(|e| AttributionError::config(e.to_string()))
    }

    /// Sets the root layer name.
    #[must_use]
    pub fn with_top_level_name(mut self, name: impl Into<String>) -> Self {
        self.top_level_name = name.into();
        self
    }

    /// Sets the aggregation interval.
    #[must_use]
    pub fn with_aggregate_interval(mut self, interval: impl Into<String>) -> Self {
        self.aggregate_interval = interval.into();
        self
    }

    /// Sets the atom id column.
    #[must_use]
    pub fn with_atom_id_column(mut self, column: impl Into<String>) -> Self {
        self.atom_id_column = column.into();
        self
    }

    /// Sets the conflict policy.
    #[must_use]
    pub fn with_atom_conflict_policy(mut self, policy: AtomConflictPolicy) -> Self {
        self.atom_conflict_policy = policy;
        self
    }

    /// Sets the default measure columns.
    #[must_use]
    pub fn with_measure_columns(mut self, columns: Vec<Measure>) -> Self {
        self.measure_columns = columns;
        self
    }

    /// Sets the realization mapping.
    #[must_use]
    pub fn with_realization(mut self, realization: RealizationConfig) -> Self {
        self.realization = realization;
        self
    }

    /// Sets the IRR solver settings.
    #[must_use]
    pub fn with_irr(mut self, irr: IrrConfig) -> Self {
        self.irr = irr;
        self
    }

    /// Checks the configuration is internally consistent.
    pub fn validate(&self) -> AttributionResult<()> {
        let named = [
            ("top_level_name", &self.top_level_name),
            ("aggregate_interval", &self.aggregate_interval),
            ("atom_id_column", &self.atom_id_column),
            ("investment_column", &self.investment_column),
            ("manager_column", &self.manager_column),
            ("realization.attribute", &self.realization.attribute),
        ];
        if let Some((key, _)) = named.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AttributionError::config(format!("{key} must not be empty")));
        }

        let columns = [
            &self.atom_id_column,
            &self.investment_column,
            &self.manager_column,
        ];
        for (i, a) in columns.iter().enumerate() {
            if columns[i + 1..].contains(a) {
                return Err(AttributionError::config(format!(
                    "column '{a}' is used for more than one role"
                )));
            }
        }

        if self.measure_columns.is_empty() {
            return Err(AttributionError::config("measure_columns must not be empty"));
        }

        self.irr
            .validate()
            .map_err(|e| AttributionError::config(e.to_string()))
    }
}
