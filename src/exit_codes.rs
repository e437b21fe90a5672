//! Exit code standardization for testcost
//!
//! Provides consistent exit codes for different error types so CI pipelines
//! wrapping the tool can tell bad input apart from environment failures.
//!
//! ## Exit Code Convention
//!
//! - `0` = Success
//! - `1` = User error (missing input, malformed breakdown or dataset, bad runtime)
//! - `2` = System error (I/O failure, CSV/JSON serialization failure)
//! - `3` = Configuration error (config parse error, invalid config value)

use crate::error::TestcostError;

/// Standard exit codes for testcost
pub mod codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// User error (invalid input, validation failure)
    pub const USER_ERROR: i32 = 1;
    /// System error (I/O, serialization)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a TestcostError to an appropriate exit code
pub fn exit_code_for_error(error: &TestcostError) -> i32 {
    use TestcostError::*;
    match error {
        Config(_) => codes::CONFIG_ERROR,

        InputNotFound { .. } => codes::USER_ERROR,
        InvalidJson { .. } => codes::USER_ERROR,
        Schema { .. } => codes::USER_ERROR,
        UnknownResourceType { .. } => codes::USER_ERROR,
        MissingField { .. } => codes::USER_ERROR,
        InvalidRuntime { .. } => codes::USER_ERROR,
        InvalidSplit { .. } => codes::USER_ERROR,
        UnterminatedBracket { .. } => codes::USER_ERROR,

        Io(_) => codes::SYSTEM_ERROR,
        Csv(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
    }
}

/// Exit code for an error that reached the CLI boundary as `anyhow::Error`.
///
/// Errors that did not originate in this crate (e.g. from clap) are system errors.
pub fn exit_code_for_anyhow(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<TestcostError>()
        .map(exit_code_for_error)
        .unwrap_or(codes::SYSTEM_ERROR)
}
