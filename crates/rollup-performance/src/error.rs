//! Error types for performance measures.

use thiserror::Error;

use rollup_core::CoreError;
use rollup_math::MathError;

/// Result type for performance operations.
pub type PerfResult<T> = Result<T, PerformanceError>;

/// Errors that can occur while computing or exporting performance measures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerformanceError {
    /// A measure name outside the fixed enumeration.
    #[error("Unknown measure: '{name}'")]
    UnknownMeasure {
        /// The name that failed to parse.
        name: String,
    },

    /// An aggregate was built without components.
    #[error("Aggregate '{name}' has no components")]
    EmptyAggregate {
        /// The aggregate name.
        name: String,
    },

    /// A ratio whose denominator is zero was requested through a strict accessor.
    #[error("Measure '{measure}' is undefined (zero denominator)")]
    UndefinedRatio {
        /// The measure requested.
        measure: String,
    },

    /// A base item override was attempted after measures were computed.
    #[error("Cannot override '{item}': measures already computed")]
    AlreadyComputed {
        /// The base item.
        item: &'static str,
    },

    /// Writing rows to an output format failed.
    #[error("Output error: {reason}")]
    Output {
        /// Underlying writer message.
        reason: String,
    },

    /// Numerical error from the solvers.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Input table or cashflow error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PerformanceError {
    /// Creates an unknown measure error.
    #[must_use]
    pub fn unknown_measure(name: impl Into<String>) -> Self {
        Self::UnknownMeasure { name: name.into() }
    }

    /// Creates an empty aggregate error.
    #[must_use]
    pub fn empty_aggregate(name: impl Into<String>) -> Self {
        Self::EmptyAggregate { name: name.into() }
    }

    /// Creates an undefined ratio error.
    #[must_use]
    pub fn undefined_ratio(measure: impl Into<String>) -> Self {
        Self::UndefinedRatio {
            measure: measure.into(),
        }
    }

    /// Creates an output error.
    #[must_use]
    pub fn output(reason: impl Into<String>) -> Self {
        Self::Output {
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for PerformanceError {
    fn from(err: csv::Error) -> Self {
        Self::output(err.to_string())
    }
}

impl From<serde_json::Error> for PerformanceError {
    fn from(err: serde_json::Error) -> Self {
        Self::output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PerformanceError::unknown_measure("sharpe");
        assert!(err.to_string().contains("sharpe"));

        let err = PerformanceError::empty_aggregate("Fund - A");
        assert!(err.to_string().contains("Fund - A"));

        let err = PerformanceError::undefined_ratio("moic");
        assert!(err.to_string().contains("moic"));
    }

    #[test]
    fn test_lower_crate_errors_convert() {
        let err: PerformanceError = MathError::insufficient_data(2, 0).into();
        assert!(matches!(err, PerformanceError::Math(_)));

        let err: PerformanceError = CoreError::missing_column("cashflows", "Amount").into();
        assert!(err.to_string().contains("Amount"));
    }
}
