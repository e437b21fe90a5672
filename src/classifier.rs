//! Resource classification by billing model
//!
//! Cloud resources are billed either proportionally to the seconds they exist
//! (`FineGranular`), per started hour (`HourlyInterval`), or by usage
//! (`TrafficBased`, which has no flat rate and is left out of runtime costs).
//! The known types live in a fixed table; how types missing from it are treated
//! is decided by [`ClassificationPolicy`].

use crate::breakdown::{CostBreakdown, ResourceCostEntry};
use crate::error::{Result, TestcostError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Billing model of a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingCategory {
    FineGranular,
    HourlyInterval,
    TrafficBased,
    Unknown,
}

impl fmt::Display for BillingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BillingCategory::FineGranular => "fine granular",
            BillingCategory::HourlyInterval => "hourly interval",
            BillingCategory::TrafficBased => "traffic based",
            BillingCategory::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Treatment of resource types that are not in the billing table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationPolicy {
    /// Unknown types with a rate are billed per started hour, without a rate they are skipped
    #[default]
    Lenient,
    /// Unknown types fail classification
    Strict,
}

/// Known resource types and their billing model
#[derive(Debug, Clone, Copy)]
pub struct BillingTable {
    pub fine_granular: &'static [&'static str],
    pub hourly_interval: &'static [&'static str],
    pub traffic_based: &'static [&'static str],
}

/// Billing models of the AWS resource types seen in the tested Terraform modules
pub const AWS_BILLING_TABLE: BillingTable = BillingTable {
    fine_granular: &["aws_db_instance", "aws_eks_cluster", "aws_eks_node_group"],
    hourly_interval: &["aws_vpc_endpoint", "aws_kms_key"],
    traffic_based: &["aws_cloudwatch_log_group"],
};

impl BillingTable {
    /// Category from the table alone, `Unknown` for unlisted types
    pub fn category_of(&self, resource_type: &str) -> BillingCategory {
        if self.fine_granular.contains(&resource_type) {
            BillingCategory::FineGranular
        } else if self.hourly_interval.contains(&resource_type) {
            BillingCategory::HourlyInterval
        } else if self.traffic_based.contains(&resource_type) {
            BillingCategory::TrafficBased
        } else {
            BillingCategory::Unknown
        }
    }

    fn unknown_type_error(&self, resource_type: &str) -> TestcostError {
        TestcostError::UnknownResourceType {
            resource_type: resource_type.to_string(),
            known_fine_granular: self.fine_granular.join(", "),
            known_hourly_interval: self.hourly_interval.join(", "),
            known_traffic_based: self.traffic_based.join(", "),
        }
    }
}

/// Hourly rates summed per billable category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassifiedSums {
    pub fine_granular_rate_per_hour: Decimal,
    pub hourly_interval_rate_per_hour: Decimal,
}

impl ClassifiedSums {
    pub fn new(fine_granular_rate_per_hour: Decimal, hourly_interval_rate_per_hour: Decimal) -> Self {
        Self {
            fine_granular_rate_per_hour,
            hourly_interval_rate_per_hour,
        }
    }
}

/// How one resource entered the sums
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedResource {
    pub name: Option<String>,
    pub resource_type: String,
    /// Category the resource was billed under
    pub category: BillingCategory,
    /// Whether the category came from the billing table or the lenient fallback
    pub from_table: bool,
    pub hourly_rate: Option<Decimal>,
    /// Rate actually added to a category sum
    pub contributed: Option<Decimal>,
}

/// Full classification result, used for inspection output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub resources: Vec<ClassifiedResource>,
    pub sums: ClassifiedSums,
}

/// Classifies breakdown entries against a fixed billing table
#[derive(Debug, Clone, Copy)]
pub struct ResourceClassifier {
    table: &'static BillingTable,
    policy: ClassificationPolicy,
}

impl Default for ResourceClassifier {
    fn default() -> Self {
        Self::new(ClassificationPolicy::default())
    }
}

impl ResourceClassifier {
    pub fn new(policy: ClassificationPolicy) -> Self {
        Self {
            table: &AWS_BILLING_TABLE,
            policy,
        }
    }

    pub fn table(&self) -> &'static BillingTable {
        self.table
    }

    /// Sum hourly rates per billing category
    pub fn classify(&self, breakdown: &CostBreakdown) -> Result<ClassifiedSums> {
        Ok(self.classify_detailed(breakdown)?.sums)
    }

    /// Classify every resource, keeping the per-resource decisions
    pub fn classify_detailed(&self, breakdown: &CostBreakdown) -> Result<Classification> {
        let mut sums = ClassifiedSums::default();
        let mut resources = Vec::with_capacity(breakdown.resources.len());

        for entry in &breakdown.resources {
            let classified = self.classify_entry(entry)?;
            if let Some(rate) = classified.contributed {
                match classified.category {
                    BillingCategory::FineGranular => sums.fine_granular_rate_per_hour += rate,
                    BillingCategory::HourlyInterval => sums.hourly_interval_rate_per_hour += rate,
                    BillingCategory::TrafficBased | BillingCategory::Unknown => {}
                }
            }
            resources.push(classified);
        }

        debug!(
            "Classified {} resources: fine granular {}/h, hourly interval {}/h",
            resources.len(),
            sums.fine_granular_rate_per_hour,
            sums.hourly_interval_rate_per_hour
        );

        Ok(Classification { resources, sums })
    }

    fn classify_entry(&self, entry: &ResourceCostEntry) -> Result<ClassifiedResource> {
        let known = self.table.category_of(&entry.resource_type);
        let (category, from_table, contributed) = match known {
            BillingCategory::TrafficBased => (known, true, None),
            BillingCategory::FineGranular | BillingCategory::HourlyInterval => {
                let rate = entry.hourly_rate.ok_or_else(|| TestcostError::MissingField {
                    field: "hourlyCost".to_string(),
                    resource: entry.label().to_string(),
                    resource_type: entry.resource_type.clone(),
                })?;
                (known, true, Some(rate))
            }
            BillingCategory::Unknown => match self.policy {
                ClassificationPolicy::Strict => {
                    return Err(self.table.unknown_type_error(&entry.resource_type));
                }
                ClassificationPolicy::Lenient => match entry.hourly_rate {
                    Some(rate) => {
                        warn!(
                            "Resource type '{}' ({}) is not in the billing table, billing it per started hour",
                            entry.resource_type,
                            entry.label()
                        );
                        (BillingCategory::HourlyInterval, false, Some(rate))
                    }
                    None => {
                        debug!(
                            "Skipping unclassified resource '{}' without hourly rate",
                            entry.label()
                        );
                        (BillingCategory::Unknown, false, None)
                    }
                },
            },
        };

        Ok(ClassifiedResource {
            name: entry.name.clone(),
            resource_type: entry.resource_type.clone(),
            category,
            from_table,
            hourly_rate: entry.hourly_rate,
            contributed,
        })
    }
}
