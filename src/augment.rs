//! Cost attribution for measurement datasets
//!
//! Rows are scanned once, left to right. A `terraform apply` row opens a
//! bracket and the next `terraform destroy` row closes it; the rows in between
//! ran against the same deployment and share its setup and teardown time.
//!
//! For a bracket spanning rows `start..=end`:
//!
//! - `split_by = end - start` (interior row count plus one)
//! - `shared_runtime = (runtime[start] + runtime[end]) / split_by`, rounded down
//! - each interior dynamic row is costed for `runtime + shared_runtime`,
//!   with its hourly interval component divided by `split_by`
//! - the apply and destroy rows get the cost `NA`
//!
//! Dynamic rows outside any bracket are costed on their own runtime with no split.
//! All other rows keep their cost untouched.

use crate::breakdown::CostBreakdown;
use crate::calculator::compute_cost;
use crate::classifier::{ClassifiedSums, ResourceClassifier};
use crate::error::{Result, TestcostError};
use crate::measurements::{MeasurementDataset, MeasurementRow, NOT_APPLICABLE};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

/// Which rows get a computed cost
#[derive(Debug, Clone)]
pub struct AugmentOptions {
    pub dynamic_approaches: Vec<String>,
}

impl Default for AugmentOptions {
    fn default() -> Self {
        Self {
            dynamic_approaches: vec!["5".to_string(), "6".to_string()],
        }
    }
}

impl AugmentOptions {
    fn is_dynamic(&self, row: &MeasurementRow) -> bool {
        self.dynamic_approaches
            .iter()
            .any(|approach| *approach == row.test_approach)
    }
}

/// A closed apply/destroy span, indices into the row sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub start: usize,
    pub end: usize,
    pub split_by: i64,
    pub shared_runtime: u64,
}

/// What a run changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AugmentReport {
    pub rows: usize,
    pub brackets: Vec<Bracket>,
    pub boundary_rows: usize,
    pub costed_rows: usize,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Scanning,
    InBracket { start: usize },
}

/// Attribute costs to every dynamic row of `rows`
///
/// Returns the rewritten rows; the input is left untouched so a failure midway
/// never yields a partially costed sequence.
pub fn augment(
    rows: &[MeasurementRow],
    breakdown: &CostBreakdown,
    classifier: &ResourceClassifier,
    options: &AugmentOptions,
) -> Result<(Vec<MeasurementRow>, AugmentReport)> {
    let sums = classifier.classify(breakdown)?;
    augment_with_sums(rows, &sums, options)
}

/// Same as [`augment`] with already classified rates
pub fn augment_with_sums(
    rows: &[MeasurementRow],
    sums: &ClassifiedSums,
    options: &AugmentOptions,
) -> Result<(Vec<MeasurementRow>, AugmentReport)> {
    let mut out = rows.to_vec();
    let mut report = AugmentReport {
        rows: rows.len(),
        ..Default::default()
    };
    let mut state = ScanState::Scanning;

    for i in 0..out.len() {
        match state {
            ScanState::Scanning => {
                if out[i].is_apply() {
                    debug!("Bracket opened at row {}", row_number(i));
                    state = ScanState::InBracket { start: i };
                } else if options.is_dynamic(&out[i]) {
                    let runtime = out[i].runtime(row_number(i))?;
                    let cost = compute_cost(sums, runtime, 1)?;
                    set_cost(&mut out[i], cost, i, &mut report)?;
                }
            }
            ScanState::InBracket { start } => {
                if out[i].is_apply() {
                    return Err(TestcostError::UnterminatedBracket {
                        apply_row: row_number(start),
                        reason: format!(
                            "is followed by another 'terraform apply' at row {} before any 'terraform destroy'",
                            row_number(i)
                        ),
                    });
                }
                if out[i].is_destroy() {
                    let bracket = close_bracket(&mut out, start, i, sums, options, &mut report)?;
                    report.brackets.push(bracket);
                    state = ScanState::Scanning;
                }
            }
        }
    }

    if let ScanState::InBracket { start } = state {
        return Err(TestcostError::UnterminatedBracket {
            apply_row: row_number(start),
            reason: "has no matching 'terraform destroy' row".to_string(),
        });
    }

    info!(
        "Attributed {} to {} rows across {} brackets",
        report.total_cost,
        report.costed_rows,
        report.brackets.len()
    );
    Ok((out, report))
}

/// Augment a whole dataset, keeping its header
pub fn augment_dataset(
    dataset: &MeasurementDataset,
    breakdown: &CostBreakdown,
    classifier: &ResourceClassifier,
    options: &AugmentOptions,
) -> Result<(MeasurementDataset, AugmentReport)> {
    let (rows, report) = augment(&dataset.rows, breakdown, classifier, options)?;
    Ok((
        MeasurementDataset {
            header: dataset.header.clone(),
            rows,
        },
        report,
    ))
}

fn close_bracket(
    rows: &mut [MeasurementRow],
    start: usize,
    end: usize,
    sums: &ClassifiedSums,
    options: &AugmentOptions,
    report: &mut AugmentReport,
) -> Result<Bracket> {
    // end > start, so the divisor is at least 1
    let split_by = (end - start) as i64;
    let setup = rows[start].runtime(row_number(start))?;
    let teardown = rows[end].runtime(row_number(end))?;
    let shared_runtime = setup
        .checked_add(teardown)
        .map(|total| total / split_by as u64)
        .ok_or_else(|| runtime_overflow(start, "apply and destroy runtimes"))?;

    debug!(
        "Bracket rows {}..={}: split by {}, shared runtime {}s",
        row_number(start),
        row_number(end),
        split_by,
        shared_runtime
    );

    rows[start].cost = NOT_APPLICABLE.to_string();
    rows[end].cost = NOT_APPLICABLE.to_string();
    report.boundary_rows += 2;

    for j in start + 1..end {
        if !options.is_dynamic(&rows[j]) {
            continue;
        }
        let runtime = rows[j]
            .runtime(row_number(j))?
            .checked_add(shared_runtime)
            .ok_or_else(|| runtime_overflow(j, "runtime plus shared runtime"))?;
        let cost = compute_cost(sums, runtime, split_by)?;
        set_cost(&mut rows[j], cost, j, report)?;
    }

    Ok(Bracket {
        start,
        end,
        split_by,
        shared_runtime,
    })
}

fn set_cost(
    row: &mut MeasurementRow,
    cost: Decimal,
    index: usize,
    report: &mut AugmentReport,
) -> Result<()> {
    debug!("Row {} ({}): cost {}", row_number(index), row.describe(), cost);
    report.total_cost = report
        .total_cost
        .checked_add(cost)
        .ok_or_else(|| TestcostError::InvalidRuntime {
            context: format!("row {}", row_number(index)),
            value: cost.to_string(),
            reason: "overflows the total cost of the dataset".to_string(),
        })?;
    row.cost = cost.to_string();
    report.costed_rows += 1;
    Ok(())
}

fn runtime_overflow(index: usize, what: &str) -> TestcostError {
    TestcostError::InvalidRuntime {
        context: format!("row {}", row_number(index)),
        value: what.to_string(),
        reason: "exceeds the supported range of seconds".to_string(),
    }
}

/// Data rows are numbered from 1, the header being row 0
fn row_number(index: usize) -> usize {
    index + 1
}
