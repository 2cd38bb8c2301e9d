//! Error types for registry ingestion.

use std::path::PathBuf;

use thiserror::Error;

use waitlist_model::ModelError;

/// Errors that abort loading a registry file.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Registry file not found.
    #[error("registry file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to open or read the file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Errors ===
    /// Malformed CSV record.
    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// File has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    // === Column Errors ===
    /// A required field has no matching header.
    #[error("required column '{field}' not found in {path} (accepted headers: {accepted})")]
    MissingColumn {
        field: &'static str,
        accepted: String,
        path: PathBuf,
    },

    /// A column override names a field that does not exist.
    #[error("unknown field '{name}' in column overrides")]
    UnknownField { name: String },

    // === Value Errors ===
    /// A date cell could not be parsed.
    #[error("invalid date '{value}' in column {column} at row {row} of {path}")]
    InvalidDate {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    /// A numeric cell could not be parsed.
    #[error("invalid number '{value}' in column {column} at row {row} of {path}")]
    InvalidNumber {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    /// A required cell is empty.
    #[error("missing {field} at row {row} of {path}")]
    MissingValue {
        path: PathBuf,
        row: usize,
        field: &'static str,
    },

    /// An identifier cell is invalid.
    #[error("invalid identifier at row {row} of {path}: {source}")]
    InvalidId {
        path: PathBuf,
        row: usize,
        #[source]
        source: ModelError,
    },

    /// The same registration id appears on two rows.
    #[error("duplicate registration id {registration_id} at rows {first_row} and {row} of {path}")]
    DuplicateRegistration {
        path: PathBuf,
        registration_id: String,
        first_row: usize,
        row: usize,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_location() {
        let err = IngestError::InvalidDate {
            path: PathBuf::from("registry.csv"),
            row: 4,
            column: "CAN_LISTING_DT".to_string(),
            value: "31/31/2016".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid date '31/31/2016' in column CAN_LISTING_DT at row 4 of registry.csv"
        );
    }
}
