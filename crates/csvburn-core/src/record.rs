use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{CsvBurnError, ReadMethod, StrategySummary};

/// Prefix of the metadata argument shared between benchmark implementations.
pub const METADATA_PREFIX: &str = "METADATA:";

/// Column names of the results log, in order.
pub const LOG_HEADER: [&str; 9] = [
    "language",
    "method",
    "filename",
    "rows",
    "columns",
    "file_size_mb",
    "duration_ms",
    "memory_mb",
    "cpu_percent",
];

/// Properties of a data file, identical for every record that names it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub rows: u64,
    pub columns: u64,
    pub file_size_mb: f64,
}

impl FileMetadata {
    /// Renders the `METADATA:rows,columns,size` line consumed by other implementations.
    pub fn to_metadata_line(&self) -> String {
        format!(
            "{}{},{},{:.2}",
            METADATA_PREFIX, self.rows, self.columns, self.file_size_mb
        )
    }
}

impl FromStr for FileMetadata {
    type Err = CsvBurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix(METADATA_PREFIX)
            .ok_or_else(|| CsvBurnError::InvalidMetadata(format!("missing {METADATA_PREFIX} prefix in {s:?}")))?;

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let [rows, columns, size] = parts.as_slice() else {
            return Err(CsvBurnError::InvalidMetadata(format!(
                "expected rows,columns,file_size_mb but got {body:?}"
            )));
        };

        Ok(Self {
            rows: parse_count(rows, "rows")?,
            columns: parse_count(columns, "columns")?,
            file_size_mb: parse_number(size, "file_size_mb")?,
        })
    }
}

// Other implementations may print counts as floats ("1000.0").
fn parse_count(value: &str, field: &str) -> Result<u64, CsvBurnError> {
    if let Ok(n) = value.parse::<u64>() {
        return Ok(n);
    }
    let n = parse_number(value, field)?;
    Ok(n.trunc() as u64)
}

fn parse_number(value: &str, field: &str) -> Result<f64, CsvBurnError> {
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(n),
        _ => Err(CsvBurnError::InvalidMetadata(format!(
            "{field} must be a non-negative number, got {value:?}"
        ))),
    }
}

/// One row of the results log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub language: String,
    pub method: ReadMethod,
    pub filename: String,
    pub rows: u64,
    pub columns: u64,
    pub file_size_mb: f64,
    pub duration_ms: f64,
    pub memory_mb: f64,
    pub cpu_percent: f64,
}

impl ResultRecord {
    pub fn from_summary(
        language: &str,
        filename: &str,
        metadata: &FileMetadata,
        summary: &StrategySummary,
    ) -> Self {
        Self {
            language: language.to_string(),
            method: summary.method,
            filename: filename.to_string(),
            rows: metadata.rows,
            columns: metadata.columns,
            file_size_mb: metadata.file_size_mb,
            duration_ms: summary.avg_duration_ms,
            memory_mb: summary.avg_memory_mb,
            cpu_percent: summary.avg_cpu_percent,
        }
    }

    /// Fields as written to the log, with fixed decimal precision.
    pub fn to_row(&self) -> [String; 9] {
        [
            self.language.clone(),
            self.method.as_str().to_string(),
            self.filename.clone(),
            self.rows.to_string(),
            self.columns.to_string(),
            format!("{:.2}", self.file_size_mb),
            format!("{:.2}", self.duration_ms),
            format!("{:.2}", self.memory_mb),
            format!("{:.1}", self.cpu_percent),
        ]
    }

    pub fn metadata(&self) -> FileMetadata {
        FileMetadata {
            rows: self.rows,
            columns: self.columns,
            file_size_mb: self.file_size_mb,
        }
    }
}
