//! Tests for error conversion and exit codes
//!
//! These tests verify that:
//! 1. Library errors survive conversion to anyhow at the CLI boundary
//! 2. Every error maps to the documented exit code
//! 3. Error messages carry enough context to find the bad input

mod common;

use std::path::PathBuf;
use tempfile::TempDir;
use testcost::breakdown::CostBreakdown;
use testcost::error::{ConfigError, TestcostError};
use testcost::exit_codes::{codes, exit_code_for_anyhow, exit_code_for_error};
use testcost::measurements::MeasurementDataset;

#[test]
fn test_error_conversion_to_anyhow_keeps_type() {
    let err = TestcostError::InvalidSplit { value: -2 };
    let anyhow_error = anyhow::Error::from(err).context("while calculating costs");

    assert!(anyhow_error.downcast_ref::<TestcostError>().is_some());
    assert_eq!(exit_code_for_anyhow(&anyhow_error), codes::USER_ERROR);
    assert!(format!("{:#}", anyhow_error).contains("-2"));
}

#[test]
fn test_exit_codes_by_category() {
    let user_errors = vec![
        TestcostError::InputNotFound {
            what: "Infracost JSON".to_string(),
            path: PathBuf::from("x.json"),
        },
        TestcostError::Schema {
            context: "header".to_string(),
            reason: "mismatch".to_string(),
        },
        TestcostError::MissingField {
            field: "hourlyCost".to_string(),
            resource: "db".to_string(),
            resource_type: "aws_db_instance".to_string(),
        },
        TestcostError::UnterminatedBracket {
            apply_row: 3,
            reason: "no destroy".to_string(),
        },
    ];
    for err in &user_errors {
        assert_eq!(exit_code_for_error(err), codes::USER_ERROR, "{}", err);
    }

    let io = TestcostError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "Permission denied",
    ));
    assert_eq!(exit_code_for_error(&io), codes::SYSTEM_ERROR);

    let config: TestcostError = ConfigError::ParseError("bad".to_string()).into();
    assert_eq!(exit_code_for_error(&config), codes::CONFIG_ERROR);
}

#[test]
fn test_invalid_json_is_reported_with_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_file(temp_dir.path(), "broken.json", "{\"projects\": [");

    let err = CostBreakdown::load(&path).unwrap_err();
    assert!(matches!(err, TestcostError::InvalidJson { .. }));
    assert!(err.to_string().contains("broken.json"));
    assert_eq!(exit_code_for_error(&err), codes::USER_ERROR);
}

#[test]
fn test_missing_rate_names_resource() {
    let json = r#"{"projects": [{"breakdown": {"resources": [
        {"name": "aws_db_instance.main", "resourceType": "aws_db_instance"}
    ]}}]}"#;
    let breakdown = CostBreakdown::from_json_str(json).unwrap();
    let err = testcost::ResourceClassifier::default()
        .classify(&breakdown)
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("aws_db_instance.main"));
    assert!(msg.contains("hourlyCost"));
}

#[test]
fn test_field_count_error_names_row() {
    let input = common::csv(&["1,5,1,5,terratest,10,", "1,5,2,5,terratest"]);
    let err = MeasurementDataset::from_reader(input.as_bytes()).unwrap_err();
    assert!(matches!(err, TestcostError::Schema { .. }));
    assert!(err.to_string().contains("row 2"));
}
