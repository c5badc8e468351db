//! Error types for record validation and table handling.
//!
//! Schema and domain failures are fatal for the report being built; they are
//! surfaced to the caller unchanged and never retried.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while validating and reading tabular records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A required column is absent from an input table.
    #[error("Schema error: column '{column}' missing from {table}")]
    MissingColumn {
        /// Logical name of the table being validated.
        table: String,
        /// The missing column.
        column: String,
    },

    /// A value falls outside its allowed enumeration.
    #[error("Domain error: '{value}' is not a valid {domain} (row {row})")]
    InvalidDomainValue {
        /// The enumeration being checked (e.g. "cashflow type").
        domain: String,
        /// The offending value.
        value: String,
        /// Zero-based row index.
        row: usize,
    },

    /// A cell could not be parsed into its column's type.
    #[error("Cannot parse {column} '{value}' at row {row}: {reason}")]
    Parse {
        /// The column holding the cell.
        column: String,
        /// The raw cell text.
        value: String,
        /// Zero-based row index.
        row: usize,
        /// Parser message.
        reason: String,
    },

    /// Invalid calendar date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A row does not have one cell per column.
    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Number of columns in the header.
        expected: usize,
        /// Number of cells in the row.
        actual: usize,
    },

    /// The same column name appears twice in a header.
    #[error("Duplicate column '{column}'")]
    DuplicateColumn {
        /// The repeated column name.
        column: String,
    },

    /// CSV input could not be read.
    #[error("CSV error: {reason}")]
    Csv {
        /// Reader message.
        reason: String,
    },
}

impl CoreError {
    /// Creates a missing column (schema) error.
    #[must_use]
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a domain error for a value outside its enumeration.
    #[must_use]
    pub fn invalid_domain_value(
        domain: impl Into<String>,
        value: impl Into<String>,
        row: usize,
    ) -> Self {
        Self::InvalidDomainValue {
            domain: domain.into(),
            value: value.into(),
            row,
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(
        column: impl Into<String>,
        value: impl Into<String>,
        row: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parse {
            column: column.into(),
            value: value.into(),
            row,
            reason: reason.into(),
        }
    }

    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Returns true for schema errors (missing columns).
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::MissingColumn { .. })
    }

    /// Returns true for domain errors (values outside an enumeration).
    #[must_use]
    pub fn is_domain_error(&self) -> bool {
        matches!(self, Self::InvalidDomainValue { .. })
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            reason: err.to_string(),
        }
    }
}
