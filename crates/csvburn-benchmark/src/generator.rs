//! Writes synthetic data files for benchmarking.

use csv::WriterBuilder;
use csvburn_core::{CsvBurnError, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Writes a header `1,2,..,columns` followed by `rows - 1` rows of random
/// 32-character hex tokens.
pub fn generate(path: &Path, rows: u64, columns: u64) -> Result<()> {
    if columns == 0 {
        return Err(CsvBurnError::Config("columns must be at least 1".to_string()));
    }

    let file = File::create(path).map_err(|e| CsvBurnError::file_access(path, e))?;
    let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));

    writer.write_record((1..=columns).map(|c| c.to_string()))?;
    for _ in 1..rows {
        writer.write_record((0..columns).map(|_| random_token()))?;
    }
    writer.flush()?;

    info!(?path, rows, columns, "Generated data file");
    Ok(())
}

fn random_token() -> String {
    Uuid::new_v4().simple().to_string()
}
