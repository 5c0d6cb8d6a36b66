//! File-level properties recorded alongside every result.

use csv::{ByteRecord, ReaderBuilder};
use csvburn_core::{CsvBurnError, FileMetadata, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Fails with `FileAccess` unless `path` is a readable regular file.
pub fn ensure_readable(path: &Path) -> Result<()> {
    let file = File::open(path).map_err(|e| CsvBurnError::file_access(path, e))?;
    let meta = file
        .metadata()
        .map_err(|e| CsvBurnError::file_access(path, e))?;

    if !meta.is_file() {
        return Err(CsvBurnError::file_access(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    Ok(())
}

/// Trusts caller-supplied metadata verbatim, otherwise computes it from the file.
pub fn resolve_metadata(path: &Path, supplied: Option<FileMetadata>) -> Result<FileMetadata> {
    match supplied {
        Some(metadata) => {
            debug!(?metadata, "Using supplied file metadata");
            Ok(metadata)
        }
        None => compute_metadata(path),
    }
}

/// Size from the open handle, then one pass over the lines: rows counts every
/// line (header included), columns come from the first one.
pub fn compute_metadata(path: &Path) -> Result<FileMetadata> {
    let access = |e: io::Error| CsvBurnError::file_access(path, e);

    let file = File::open(path).map_err(access)?;
    let size = file.metadata().map_err(access)?.len();

    let mut rows = 0u64;
    let mut columns = 0u64;
    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(access)?;
        if rows == 0 {
            columns = count_columns(&line)?;
        }
        rows += 1;
    }

    let metadata = FileMetadata {
        rows,
        columns,
        file_size_mb: size as f64 / BYTES_PER_MB,
    };
    debug!(?metadata, "Computed file metadata");
    Ok(metadata)
}

fn count_columns(line: &[u8]) -> Result<u64> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line);
    let mut record = ByteRecord::new();
    Ok(if reader.read_byte_record(&mut record)? {
        record.len() as u64
    } else {
        0
    })
}
