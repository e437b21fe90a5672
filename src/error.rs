//! Error types for testcost
//!
//! This module defines the error handling strategy for testcost. There are two
//! error types: `TestcostError` (main error enum) and `ConfigError` (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `TestcostError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling. The conversion
//! happens at the CLI boundary, where `exit_codes::exit_code_for_error` downcasts
//! back to `TestcostError` to pick the process exit status.
//!
//! ## No Partial Results
//!
//! Every error is terminating. Cost attribution either completes for the whole
//! dataset or nothing is written, so none of these variants is ever recovered
//! from inside the engine.
//!
//! ## When to Use Which Error
//!
//! - `InputNotFound`: a breakdown or dataset path that is missing or not a file
//! - `InvalidJson`: the breakdown document is not parseable JSON
//! - `Schema`: the document or dataset has the wrong shape (project count,
//!   header, field count, unparseable rate)
//! - `UnknownResourceType`: only raised under the strict classification policy
//! - `MissingField`: a resource type from the billing table carries no rate
//! - `InvalidRuntime` / `InvalidSplit`: bad calculation inputs
//! - `UnterminatedBracket`: a `terraform apply` row without its `terraform destroy`

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for testcost
#[derive(Error, Debug)]
pub enum TestcostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input not found: {what} '{}' does not exist or is not a readable file", path.display())]
    InputNotFound { what: String, path: PathBuf },

    #[error("Invalid JSON in '{}': {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Schema error: {context} - {reason}")]
    Schema { context: String, reason: String },

    #[error(
        "Unknown resource type '{resource_type}': it is unknown whether it is billed fine granular or per started hour \
         (known fine granular: {known_fine_granular}; known hourly interval: {known_hourly_interval}; \
         known traffic based: {known_traffic_based})"
    )]
    UnknownResourceType {
        resource_type: String,
        known_fine_granular: String,
        known_hourly_interval: String,
        known_traffic_based: String,
    },

    #[error("Missing field: '{field}' not found in resource {resource} of type {resource_type}")]
    MissingField {
        field: String,
        resource: String,
        resource_type: String,
    },

    #[error("Invalid runtime: {context} - '{value}' {reason}")]
    InvalidRuntime {
        context: String,
        value: String,
        reason: String,
    },

    #[error("Invalid split divisor: {value} (must be at least 1)")]
    InvalidSplit { value: i64 },

    #[error("Unterminated bracket: 'terraform apply' at row {apply_row} {reason}")]
    UnterminatedBracket { apply_row: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TestcostError>;

impl TestcostError {
    pub(crate) fn schema(context: impl Into<String>, reason: impl Into<String>) -> Self {
        TestcostError::Schema {
            context: context.into(),
            reason: reason.into(),
        }
    }
}
