//! Input validation utilities
//!
//! Checks run at the CLI boundary and while reading datasets, before any cost
//! is computed.

use crate::error::{Result, TestcostError};
use std::path::Path;

/// Validate that an input path exists and is a regular file
pub fn validate_input_file(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        return Err(TestcostError::InputNotFound {
            what: what.to_string(),
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Map an error from opening an input file
///
/// Missing and unreadable files are user errors. Anything else is an I/O failure.
pub fn input_open_error(error: std::io::Error, path: &Path, what: &str) -> TestcostError {
    match error.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            TestcostError::InputNotFound {
                what: what.to_string(),
                path: path.to_path_buf(),
            }
        }
        _ => TestcostError::Io(error),
    }
}

/// Parse a runtime given as text into whole seconds
///
/// Runtimes must be non-negative integers. Surrounding whitespace is ignored,
/// a sign, fraction or empty string is rejected. `context` names where the value
/// came from (a CLI flag, a dataset row) for the error message.
pub fn parse_runtime(value: &str, context: &str) -> Result<u64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TestcostError::InvalidRuntime {
            context: context.to_string(),
            value: value.to_string(),
            reason: "is empty".to_string(),
        });
    }

    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(TestcostError::InvalidRuntime {
            context: context.to_string(),
            value: value.to_string(),
            reason: "is not a non-negative integer number of seconds".to_string(),
        });
    }

    trimmed.parse::<u64>().map_err(|e| TestcostError::InvalidRuntime {
        context: context.to_string(),
        value: value.to_string(),
        reason: format!("cannot be read as seconds ({})", e),
    })
}
