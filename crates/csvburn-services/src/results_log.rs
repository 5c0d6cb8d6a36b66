//! The shared, append-only results log.

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use csvburn_core::record::LOG_HEADER;
use csvburn_core::{CsvBurnError, ResultRecord, Result};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How the existing log ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    Empty,
    Terminated,
    Unterminated,
}

/// A log row that could not be turned into a [`ResultRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MalformedRow {
    pub line: u64,
    pub reason: String,
}

impl MalformedRow {
    pub fn to_error(&self) -> CsvBurnError {
        CsvBurnError::MalformedRecord {
            line: self.line,
            reason: self.reason.clone(),
        }
    }
}

/// Every parseable record in log order, plus the rows that were skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadedLog {
    pub records: Vec<ResultRecord>,
    pub malformed: Vec<MalformedRow>,
}

pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `records` in a single write. The header row is written first
    /// when the log is missing or empty; existing content is never touched,
    /// but an unterminated last row gets its newline before the new rows.
    pub fn append(&self, records: &[ResultRecord]) -> Result<()> {
        let tail = self.tail()?;

        let mut prefix = Vec::new();
        if tail == Tail::Unterminated {
            prefix.push(b'\n');
        }
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(prefix);
        if tail == Tail::Empty {
            writer.write_record(LOG_HEADER)?;
        }
        for record in records {
            writer.write_record(record.to_row())?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| io::Error::new(e.error().kind(), e.error().to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&bytes)?;
        file.flush()?;

        debug!(path = ?self.path, rows = records.len(), "Appended results");
        Ok(())
    }

    fn tail(&self) -> Result<Tail> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Tail::Empty),
            Err(e) => return Err(e.into()),
        };
        if file.metadata()?.len() == 0 {
            return Ok(Tail::Empty);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(if last[0] == b'\n' {
            Tail::Terminated
        } else {
            Tail::Unterminated
        })
    }

    /// Reads the whole log. Rows that fail to parse are collected in
    /// [`LoadedLog::malformed`] instead of failing the load.
    pub fn load(&self) -> Result<LoadedLog> {
        if !self.path.is_file() {
            return Err(CsvBurnError::MissingLog(self.path.clone()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let mut loaded = LoadedLog::default();
        for row in reader.records() {
            match row {
                Ok(row) => match parse_row(&row, &headers) {
                    Ok(record) => loaded.records.push(record),
                    Err(reason) => loaded.malformed.push(malformed(row_line(&row), reason)),
                },
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    loaded.malformed.push(malformed(line, e.to_string()));
                }
            }
        }

        debug!(
            path = ?self.path,
            records = loaded.records.len(),
            malformed = loaded.malformed.len(),
            "Loaded results log"
        );
        Ok(loaded)
    }
}

fn malformed(line: u64, reason: String) -> MalformedRow {
    let row = MalformedRow { line, reason };
    warn!("Skipping row: {}", row.to_error());
    row
}

fn row_line(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_row(row: &StringRecord, headers: &StringRecord) -> std::result::Result<ResultRecord, String> {
    let record: ResultRecord = row.deserialize(Some(headers)).map_err(|e| e.to_string())?;

    let numbers = [
        ("file_size_mb", record.file_size_mb),
        ("duration_ms", record.duration_ms),
        ("memory_mb", record.memory_mb),
        ("cpu_percent", record.cpu_percent),
    ];
    for (field, value) in numbers {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{field} must be a finite non-negative number, got {value}"));
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use csvburn_core::{FileMetadata, ReadMethod, StrategySummary};

    fn record(language: &str, method: ReadMethod, duration_ms: f64) -> ResultRecord {
        let meta = FileMetadata {
            rows: 1000,
            columns: 10,
            file_size_mb: 0.33,
        };
        let summary = StrategySummary {
            method,
            avg_duration_ms: duration_ms,
            avg_memory_mb: 1.234,
            avg_cpu_percent: 87.65,
            runs: 3,
        };
        ResultRecord::from_summary(language, "test.csv", &meta, &summary)
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultsLog::new(dir.path().join("results.csv"));

        log.append(&[record("Rust", ReadMethod::EntireFile, 10.0)]).unwrap();
        log.append(&[record("Rust", ReadMethod::LineByLine, 12.0)]).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "language,method,filename,rows,columns,file_size_mb,duration_ms,memory_mb,cpu_percent",
                "Rust,entire_file,test.csv,1000,10,0.33,10.00,1.23,87.7",
                "Rust,line_by_line,test.csv,1000,10,0.33,12.00,1.23,87.7",
            ]
        );
    }

    #[test]
    fn test_append_preserves_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let existing = "language,method,filename,rows,columns,file_size_mb,duration_ms,memory_mb,cpu_percent\n\
                        Go 1.22,entire_file,test.csv,1000,10,0.33,5.00,0.50,99.0\n";
        fs::write(&path, existing).unwrap();

        ResultsLog::new(&path)
            .append(&[record("Rust", ReadMethod::EntireFile, 10.0)])
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(existing));
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_append_terminates_unfinished_last_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let existing = "language,method,filename,rows,columns,file_size_mb,duration_ms,memory_mb,cpu_percent\n\
                        Go 1.22,entire_file,test.csv,1000,10,0.33,5.00,0.50,99.0";
        fs::write(&path, existing).unwrap();

        let log = ResultsLog::new(&path);
        log.append(&[record("Rust", ReadMethod::EntireFile, 10.0)])
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(&format!("{existing}\n")));
        assert_eq!(contents.lines().count(), 3);

        let loaded = log.load().unwrap();
        assert!(loaded.malformed.is_empty());
        let languages: Vec<_> = loaded.records.iter().map(|r| r.language.as_str()).collect();
        assert_eq!(languages, ["Go 1.22", "Rust"]);
    }

    #[test]
    fn test_round_trip_to_declared_precision() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultsLog::new(dir.path().join("results.csv"));
        let written = record("Rust", ReadMethod::LineByLine, 123.456);

        log.append(&[written.clone()]).unwrap();
        let loaded = log.load().unwrap();

        assert!(loaded.malformed.is_empty());
        let read = &loaded.records[0];
        assert_eq!(read.language, written.language);
        assert_eq!(read.method, written.method);
        assert_eq!(read.rows, written.rows);
        assert_eq!(read.columns, written.columns);
        assert_eq!(read.duration_ms, 123.46);
        assert_eq!(read.memory_mb, 1.23);
        assert_eq!(read.file_size_mb, 0.33);
        assert_eq!(read.cpu_percent, 87.7);
    }

    #[test]
    fn test_load_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResultsLog::new(dir.path().join("nope.csv")).load().unwrap_err();
        assert!(matches!(err, CsvBurnError::MissingLog(_)));
    }

    #[test]
    fn test_load_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(&path, format!("{}\n", LOG_HEADER.join(","))).unwrap();

        let loaded = ResultsLog::new(&path).load().unwrap();

        assert!(loaded.records.is_empty());
        assert!(loaded.malformed.is_empty());
    }

    #[test]
    fn test_malformed_rows_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let contents = "language,method,filename,rows,columns,file_size_mb,duration_ms,memory_mb,cpu_percent\n\
                        Ruby 3.3.0,entire_file,test.csv,1000,10,0.33,fast,1.00,90.0\n\
                        Go 1.22,entire_file,test.csv,1000,10,0.33,5.00,0.50,99.0\n\
                        Go 1.22,sideways,test.csv,1000,10,0.33,5.00,0.50,99.0\n\
                        Go 1.22,line_by_line,test.csv,1000,10,0.33,NaN,0.50,99.0\n";
        fs::write(&path, contents).unwrap();

        let loaded = ResultsLog::new(&path).load().unwrap();

        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].language, "Go 1.22");
        let lines: Vec<u64> = loaded.malformed.iter().map(|m| m.line).collect();
        assert_eq!(lines, vec![2, 4, 5]);
        assert!(matches!(
            loaded.malformed[0].to_error(),
            CsvBurnError::MalformedRecord { line: 2, .. }
        ));
    }
}
