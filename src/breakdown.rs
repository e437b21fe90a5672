//! Infracost cost breakdown loading
//!
//! Reads the JSON produced by `infracost breakdown --format json` and reduces
//! it to the single project's resource list. Only the fields the cost
//! attribution needs are modeled; everything else in the document is ignored.

use crate::error::{Result, TestcostError};
use crate::validation::{input_open_error, validate_input_file};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// One priced resource from the breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceCostEntry {
    pub name: Option<String>,
    pub resource_type: String,
    pub hourly_rate: Option<Decimal>,
}

impl ResourceCostEntry {
    pub fn new(resource_type: impl Into<String>, hourly_rate: Option<Decimal>) -> Self {
        Self {
            name: None,
            resource_type: resource_type.into(),
            hourly_rate,
        }
    }

    /// Resource name when Infracost reported one, otherwise the type
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.resource_type)
    }
}

/// The resources of exactly one Infracost project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub resources: Vec<ResourceCostEntry>,
}

#[derive(Debug, Deserialize)]
struct InfracostDocument {
    #[serde(default)]
    projects: Option<Vec<InfracostProject>>,
}

#[derive(Debug, Deserialize)]
struct InfracostProject {
    #[serde(default)]
    breakdown: Option<InfracostBreakdown>,
}

#[derive(Debug, Deserialize)]
struct InfracostBreakdown {
    #[serde(default)]
    resources: Vec<InfracostResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InfracostResource {
    #[serde(default)]
    name: Option<String>,
    resource_type: String,
    #[serde(default)]
    hourly_cost: Option<RawRate>,
}

/// Infracost emits rates as strings, but hand-written fixtures often use numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRate {
    Text(String),
    Number(serde_json::Number),
}

impl CostBreakdown {
    /// Load and validate a breakdown file
    pub fn load(path: &Path) -> Result<Self> {
        validate_input_file(path, "Infracost JSON")?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| input_open_error(e, path, "Infracost JSON"))?;

        let document: InfracostDocument =
            serde_json::from_str(&content).map_err(|source| TestcostError::InvalidJson {
                path: path.to_path_buf(),
                source,
            })?;

        let breakdown = Self::from_document(document, &path.display().to_string())?;
        debug!(
            "Loaded {} resources from {}",
            breakdown.resources.len(),
            path.display()
        );
        Ok(breakdown)
    }

    /// Parse a breakdown from JSON text already in memory
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: InfracostDocument =
            serde_json::from_str(json).map_err(|source| TestcostError::InvalidJson {
                path: "<memory>".into(),
                source,
            })?;
        Self::from_document(document, "<memory>")
    }

    fn from_document(document: InfracostDocument, origin: &str) -> Result<Self> {
        let mut projects = document.projects.unwrap_or_default();
        if projects.len() != 1 {
            return Err(TestcostError::schema(
                origin,
                format!(
                    "the JSON does not contain exactly one 'projects' entry (found {})",
                    projects.len()
                ),
            ));
        }

        let project = projects.remove(0);
        let breakdown = project.breakdown.ok_or_else(|| {
            TestcostError::schema(origin, "the project has no 'breakdown' section")
        })?;

        let resources = breakdown
            .resources
            .into_iter()
            .map(|resource| {
                let hourly_rate = match resource.hourly_cost {
                    None => None,
                    Some(raw) => Some(parse_rate(&raw).ok_or_else(|| {
                        TestcostError::schema(
                            format!(
                                "resource {} of type {}",
                                resource.name.as_deref().unwrap_or("<unnamed>"),
                                resource.resource_type
                            ),
                            format!("hourlyCost {:?} is not a decimal number", raw),
                        )
                    })?),
                };
                Ok(ResourceCostEntry {
                    name: resource.name,
                    resource_type: resource.resource_type,
                    hourly_rate,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { resources })
    }
}

fn parse_rate(raw: &RawRate) -> Option<Decimal> {
    let text = match raw {
        RawRate::Text(s) => s.trim().to_string(),
        RawRate::Number(n) => n.to_string(),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
