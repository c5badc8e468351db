//! Error types for attribution.

use thiserror::Error;

use rollup_core::CoreError;
use rollup_performance::PerformanceError;

/// Result type for attribution operations.
pub type AttributionResult<T> = Result<T, AttributionError>;

/// Errors that can occur while building or reading attribution trees.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributionError {
    /// One entity resolved to several values where exactly one was expected.
    #[error("Ambiguous {what} for '{entity}': {}", .values.join(", "))]
    Ambiguity {
        /// What was being resolved (e.g. "investment", "manager").
        what: String,
        /// The entity being resolved.
        entity: String,
        /// The competing values.
        values: Vec<String>,
    },

    /// Recursion went past the attribute list.
    #[error("Depth {depth} exceeds attribute list of length {max}")]
    DepthOverrun {
        /// The offending depth.
        depth: usize,
        /// Length of the attribute list.
        max: usize,
    },

    /// Nothing was left to build a tree or view from.
    #[error("Empty selection: {reason}")]
    EmptySelection {
        /// What was empty.
        reason: String,
    },

    /// A container has no leaf for an atom named in the records.
    #[error("Investment '{investment}' has no result for atom '{atom}' in interval '{interval}'")]
    MissingAtom {
        /// The owning investment.
        investment: String,
        /// The atom identifier.
        atom: String,
        /// The aggregation interval.
        interval: String,
    },

    /// Records reference an investment no container provides.
    #[error("Unknown investment: '{name}'")]
    UnknownInvestment {
        /// The investment name.
        name: String,
    },

    /// An argument outside its valid range.
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// Description of the problem.
        reason: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of the problem.
        reason: String,
    },

    /// Measure computation error.
    #[error(transparent)]
    Performance(#[from] PerformanceError),

    /// Input table error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AttributionError {
    /// Creates an ambiguity error.
    #[must_use]
    pub fn ambiguity(
        what: impl Into<String>,
        entity: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::Ambiguity {
            what: what.into(),
            entity: entity.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an empty selection error.
    #[must_use]
    pub fn empty_selection(reason: impl Into<String>) -> Self {
        Self::EmptySelection {
            reason: reason.into(),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AttributionError::ambiguity("manager", "Fund I", ["Alpha", "Beta"]);
        assert_eq!(err.to_string(), "Ambiguous manager for 'Fund I': Alpha, Beta");

        let err = AttributionError::DepthOverrun { depth: 3, max: 2 };
        assert!(err.to_string().contains("Depth 3"));
    }

    #[test]
    fn test_from_lower_crates() {
        let err: AttributionError = CoreError::missing_column("positions", "PositionId").into();
        assert!(matches!(err, AttributionError::Core(_)));

        let err: AttributionError = PerformanceError::empty_aggregate("Total").into();
        assert!(err.to_string().contains("Total"));
    }
}
