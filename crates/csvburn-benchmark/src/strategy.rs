//! The two competing ways of consuming a tabular file.

use csv::{ByteRecord, ReaderBuilder};
use csvburn_core::{CsvBurnError, ReadMethod, Result};
use std::fs::File;
use std::hint::black_box;
use std::path::Path;

/// What a strategy saw; only used to keep the work observable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOutcome {
    pub records: u64,
    pub bytes: u64,
}

pub trait ReadStrategy {
    fn method(&self) -> ReadMethod;

    fn read(&self, path: &Path) -> Result<ReadOutcome>;
}

/// Loads every record into memory, then walks and discards them.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntireFile;

/// Holds at most one record at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineByLine;

impl ReadStrategy for EntireFile {
    fn method(&self) -> ReadMethod {
        ReadMethod::EntireFile
    }

    fn read(&self, path: &Path) -> Result<ReadOutcome> {
        let mut reader = open_reader(path)?;
        let records = reader
            .byte_records()
            .collect::<std::result::Result<Vec<ByteRecord>, _>>()?;

        let bytes = records.iter().map(stringify).sum();
        let outcome = ReadOutcome {
            records: records.len() as u64,
            bytes,
        };
        drop(black_box(records));

        Ok(outcome)
    }
}

impl ReadStrategy for LineByLine {
    fn method(&self) -> ReadMethod {
        ReadMethod::LineByLine
    }

    fn read(&self, path: &Path) -> Result<ReadOutcome> {
        let mut reader = open_reader(path)?;
        let mut record = ByteRecord::new();
        let mut outcome = ReadOutcome::default();

        while reader.read_byte_record(&mut record)? {
            outcome.records += 1;
            outcome.bytes += stringify(&record);
        }

        Ok(outcome)
    }
}

pub fn for_method(method: ReadMethod) -> Box<dyn ReadStrategy> {
    match method {
        ReadMethod::EntireFile => Box::new(EntireFile),
        ReadMethod::LineByLine => Box::new(LineByLine),
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| CsvBurnError::file_access(path, e))?;
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file))
}

// Per-field work shared by both strategies. Invalid UTF-8 is replaced,
// not rejected, so any file that opens can be benchmarked.
fn stringify(record: &ByteRecord) -> u64 {
    record
        .iter()
        .map(|field| black_box(String::from_utf8_lossy(field).into_owned()).len() as u64)
        .sum()
}
