//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const HEADER: &str =
    "build,defect_category,test_case,test_approach,test_tool,runtime(seconds),costs($)";

/// Breakdown with 0.36/h fine granular and 0.1/h hourly interval rates
pub const BREAKDOWN_JSON: &str = r#"{
  "version": "0.2",
  "currency": "USD",
  "projects": [
    {
      "name": "modules/eks",
      "breakdown": {
        "resources": [
          {"name": "aws_eks_cluster.this", "resourceType": "aws_eks_cluster", "hourlyCost": "0.1"},
          {"name": "aws_eks_node_group.this", "resourceType": "aws_eks_node_group", "hourlyCost": "0.26"},
          {"name": "aws_kms_key.this", "resourceType": "aws_kms_key", "hourlyCost": "0.1"},
          {"name": "aws_cloudwatch_log_group.this", "resourceType": "aws_cloudwatch_log_group", "hourlyCost": null},
          {"name": "aws_iam_role.this", "resourceType": "aws_iam_role"}
        ]
      }
    }
  ]
}"#;

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn write_breakdown(dir: &Path) -> PathBuf {
    write_file(dir, "infracost.json", BREAKDOWN_JSON)
}

/// CSV text with the expected header followed by `rows`
pub fn csv(rows: &[&str]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}
