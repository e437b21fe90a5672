//! Measurement dataset I/O
//!
//! The dataset is a CSV file with one row per test execution. Only the cost
//! column is ever changed; every other field is written back exactly as read.
//! Writes go to a temporary file in the same directory which then replaces the
//! original, so a failed run never leaves a half-written dataset behind.

use crate::error::{Result, TestcostError};
use crate::validation::{input_open_error, parse_runtime, validate_input_file};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Column names the dataset header must carry, in order (compared case-insensitively)
pub const EXPECTED_HEADER: [&str; 7] = [
    "build",
    "defect_category",
    "test_case",
    "test_approach",
    "test_tool",
    "runtime(seconds)",
    "costs($)",
];

pub const APPLY_TOOL: &str = "terraform apply";
pub const DESTROY_TOOL: &str = "terraform destroy";

/// Cost value of lifecycle boundary rows
pub const NOT_APPLICABLE: &str = "NA";

/// One test execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasurementRow {
    pub build: String,
    pub defect_category: String,
    pub test_case: String,
    pub test_approach: String,
    pub test_tool: String,
    pub runtime_seconds: String,
    pub cost: String,
}

impl MeasurementRow {
    pub fn is_apply(&self) -> bool {
        self.test_tool == APPLY_TOOL
    }

    pub fn is_destroy(&self) -> bool {
        self.test_tool == DESTROY_TOOL
    }

    /// Runtime parsed as whole seconds; `row_number` is used in the error message
    pub fn runtime(&self, row_number: usize) -> Result<u64> {
        parse_runtime(
            &self.runtime_seconds,
            &format!("row {} ({})", row_number, self.describe()),
        )
    }

    /// Short identity for log and error messages
    pub fn describe(&self) -> String {
        format!(
            "build {}, test case {}, tool {}",
            self.build, self.test_case, self.test_tool
        )
    }

    fn from_record(record: &csv::StringRecord, row_number: usize) -> Result<Self> {
        if record.len() != EXPECTED_HEADER.len() {
            return Err(TestcostError::schema(
                format!("row {}", row_number),
                format!(
                    "expected {} fields, found {}",
                    EXPECTED_HEADER.len(),
                    record.len()
                ),
            ));
        }
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        Ok(Self {
            build: field(0),
            defect_category: field(1),
            test_case: field(2),
            test_approach: field(3),
            test_tool: field(4),
            runtime_seconds: field(5),
            cost: field(6),
        })
    }

    fn to_record(&self) -> [&str; 7] {
        [
            self.build.as_str(),
            self.defect_category.as_str(),
            self.test_case.as_str(),
            self.test_approach.as_str(),
            self.test_tool.as_str(),
            self.runtime_seconds.as_str(),
            self.cost.as_str(),
        ]
    }
}

/// Header plus rows of a measurement file
///
/// Rows are numbered from 1 for the first data row, the header is row 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementDataset {
    pub header: Vec<String>,
    pub rows: Vec<MeasurementRow>,
}

impl MeasurementDataset {
    /// Read a dataset file, validating the header before any row
    pub fn load(path: &Path) -> Result<Self> {
        validate_input_file(path, "measurements CSV")?;
        let file = std::fs::File::open(path)
            .map_err(|e| input_open_error(e, path, "measurements CSV"))?;
        let dataset = Self::from_reader(file)?;
        debug!("Read {} measurement rows from {}", dataset.rows.len(), path.display());
        Ok(dataset)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut records = reader.records();

        let header = match records.next() {
            Some(record) => record?,
            None => return Err(TestcostError::schema("header", "the dataset is empty")),
        };
        validate_header(&header)?;

        let rows = records
            .enumerate()
            .map(|(i, record)| MeasurementRow::from_record(&record?, i + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            header: header.iter().map(str::to_string).collect(),
            rows,
        })
    }

    pub fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row.to_record())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Replace the file at `path` with this dataset, atomically
    pub fn persist(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Atomic write: write to temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(dir)?;
        self.to_writer(&mut tmp)?;
        if let Ok(metadata) = std::fs::metadata(path) {
            tmp.as_file().set_permissions(metadata.permissions())?;
        }
        tmp.as_file_mut().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        debug!("Wrote {} measurement rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        buf.flush()?;
        String::from_utf8(buf).map_err(|e| {
            TestcostError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

/// Fields are compared one by one, so a quoted field holding commas never matches
fn validate_header(header: &csv::StringRecord) -> Result<()> {
    let matches = header.len() == EXPECTED_HEADER.len()
        && header
            .iter()
            .zip(EXPECTED_HEADER.iter())
            .all(|(actual, expected)| actual.trim().eq_ignore_ascii_case(expected));
    if !matches {
        return Err(TestcostError::schema(
            "header",
            format!(
                "found {:?}, expected '{}'",
                header.iter().collect::<Vec<_>>(),
                EXPECTED_HEADER.join(",")
            ),
        ));
    }
    Ok(())
}
