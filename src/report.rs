//! Rendering of command results as text or JSON

use crate::augment::AugmentReport;
use crate::calculator::{round_cost, CostComputation};
use crate::classifier::{BillingCategory, Classification};
use crate::error::Result;
use comfy_table::{Cell, Color, Table};
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

/// Output format selected with `--output`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (expected text or json)", other)),
        }
    }
}

pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// The cost alone in text mode, the full computation in JSON mode
pub fn render_cost(computation: &CostComputation, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(computation.cost.to_string()),
        OutputFormat::Json => render_json(computation),
    }
}

pub fn render_classification(classification: &Classification, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return render_json(classification);
    }

    let mut table = Table::new();
    table.set_header(vec!["Resource", "Type", "Category", "Hourly rate", "Contributes"]);

    for resource in &classification.resources {
        let category = if resource.from_table {
            resource.category.to_string()
        } else {
            format!("{} (fallback)", resource.category)
        };
        let category_cell = match resource.category {
            BillingCategory::FineGranular => Cell::new(category).fg(Color::Green),
            BillingCategory::HourlyInterval if resource.from_table => Cell::new(category).fg(Color::Cyan),
            BillingCategory::HourlyInterval => Cell::new(category).fg(Color::Yellow),
            BillingCategory::TrafficBased | BillingCategory::Unknown => Cell::new(category),
        };
        let rate = resource
            .hourly_rate
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let contributes = if resource.contributed.is_some() { "yes" } else { "no" };

        table.add_row(vec![
            Cell::new(resource.name.as_deref().unwrap_or("-")),
            Cell::new(&resource.resource_type),
            category_cell,
            Cell::new(rate),
            Cell::new(contributes),
        ]);
    }

    let mut out = table.to_string();
    let _ = write!(
        out,
        "\n\nFine granular rate:   {}/h\nHourly interval rate: {}/h",
        classification.sums.fine_granular_rate_per_hour,
        classification.sums.hourly_interval_rate_per_hour
    );
    Ok(out)
}

pub fn render_augment_report(report: &AugmentReport, dry_run: bool, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        #[derive(Serialize)]
        struct Json<'a> {
            dry_run: bool,
            #[serde(flatten)]
            report: &'a AugmentReport,
        }
        return render_json(&Json { dry_run, report });
    }

    let mut out = String::new();
    if dry_run {
        out.push_str("Dry run: dataset not written\n");
    }
    let _ = writeln!(out, "Rows scanned:      {}", report.rows);
    let _ = writeln!(out, "Brackets closed:   {}", report.brackets.len());
    let _ = writeln!(out, "Boundary rows (NA): {}", report.boundary_rows);
    let _ = writeln!(out, "Rows costed:       {}", report.costed_rows);
    let _ = write!(out, "Total cost:        {}", round_cost(report.total_cost)?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakdown::{CostBreakdown, ResourceCostEntry};
    use crate::calculator::compute_cost_detailed;
    use crate::classifier::{ClassifiedSums, ResourceClassifier};
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_cost_text_is_bare_decimal() {
        let computation =
            compute_cost_detailed(&ClassifiedSums::new(dec("1.0"), Decimal::ZERO), 3600, 1).unwrap();
        assert_eq!(render_cost(&computation, OutputFormat::Text).unwrap(), "1.00000");
    }

    #[test]
    fn test_render_cost_json() {
        let computation =
            compute_cost_detailed(&ClassifiedSums::new(Decimal::ZERO, dec("2")), 3600, 1).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render_cost(&computation, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["cost"], "4.00000");
        assert_eq!(json["split_by"], 1);
        assert_eq!(json["runtime_seconds"], 3600);
    }

    #[test]
    fn test_render_classification_table() {
        let breakdown = CostBreakdown {
            resources: vec![
                ResourceCostEntry::new("aws_eks_cluster", Some(dec("0.1"))),
                ResourceCostEntry::new("aws_nat_gateway", Some(dec("0.045"))),
            ],
        };
        let classification = ResourceClassifier::default()
            .classify_detailed(&breakdown)
            .unwrap();
        let text = render_classification(&classification, OutputFormat::Text).unwrap();
        assert!(text.contains("aws_eks_cluster"));
        assert!(text.contains("(fallback)"));
        assert!(text.contains("Hourly interval rate: 0.045/h"));
    }

    #[test]
    fn test_render_augment_report_json_flattens() {
        let report = AugmentReport {
            rows: 3,
            costed_rows: 1,
            ..Default::default()
        };
        let json: serde_json::Value =
            serde_json::from_str(&render_augment_report(&report, true, OutputFormat::Json).unwrap())
                .unwrap();
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["rows"], 3);
        assert_eq!(json["costed_rows"], 1);
    }
}
