//! testcost library
//!
//! Attributes cloud cost to infrastructure test runs. A cost breakdown
//! produced by Infracost is classified by billing model, and the resulting
//! hourly rates are applied to the measured runtime of each dynamic test,
//! sharing deployment time across the tests run between one `terraform apply`
//! and the following `terraform destroy`.

pub mod augment;
pub mod breakdown;
pub mod calculator;
pub mod classifier;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod measurements;
pub mod report;
pub mod validation;

// Re-export commonly used types
pub use augment::{augment, augment_dataset, AugmentOptions, AugmentReport, Bracket};
pub use breakdown::{CostBreakdown, ResourceCostEntry};
pub use calculator::{compute_cost, compute_cost_detailed, CostComputation};
pub use classifier::{BillingCategory, ClassificationPolicy, ClassifiedSums, ResourceClassifier};
pub use error::{Result, TestcostError};
pub use measurements::{MeasurementDataset, MeasurementRow};
