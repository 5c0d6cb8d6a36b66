//! Column-aligned console rendering of a [`Report`].

use std::fmt;

use crate::analyzer::{FileReport, MethodComparison, Rank, Report};

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Fastest => f.write_str("Fastest"),
            Rank::Slower { percent: Some(percent) } => write!(f, "{percent:.1}% slower"),
            Rank::Slower { percent: None } => f.write_str("slower (fastest is 0.00ms)"),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            writeln!(f, "No benchmark results found.")?;
        }

        for file in &self.files {
            write_file_statistics(f, file)?;
            write_performance_comparison(f, &file.comparisons)?;
        }

        if !self.malformed.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped {} malformed row(s):", self.malformed.len())?;
            for row in &self.malformed {
                writeln!(f, "  line {}: {}", row.line, row.reason)?;
            }
        }
        Ok(())
    }
}

fn write_file_statistics(f: &mut fmt::Formatter<'_>, file: &FileReport) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "===== Overall Statistics =======")?;
    writeln!(f)?;
    writeln!(f, "File: {}", file.filename)?;
    writeln!(f, "Size: {:.2}MB", file.metadata.file_size_mb)?;
    writeln!(f, "Rows: {}", file.metadata.rows)?;
    writeln!(f, "Columns: {}", file.metadata.columns)?;

    write_results_table(f, &file.comparisons)?;

    for stats in &file.languages {
        writeln!(f)?;
        writeln!(f, "{} Statistics:", stats.language)?;
        for record in &stats.records {
            writeln!(f, "  {}:", record.method)?;
            writeln!(f, "    Duration: {:.2}ms", record.duration_ms)?;
            writeln!(f, "    Memory: {:.2}MB", record.memory_mb)?;
            writeln!(f, "    CPU: {:.1}%", record.cpu_percent)?;
        }
    }
    Ok(())
}

fn write_results_table(f: &mut fmt::Formatter<'_>, comparisons: &[MethodComparison]) -> fmt::Result {
    let lang_width = comparisons
        .iter()
        .flat_map(|c| &c.standings)
        .map(|s| s.record.language.len())
        .chain(std::iter::once("Language".len()))
        .max()
        .unwrap_or_default();
    let width = 2 + 14 + 1 + lang_width + 1 + 14 + 1 + 12 + 1 + 8;

    writeln!(f)?;
    writeln!(
        f,
        "  {:<14} {:<lang_width$} {:>14} {:>12} {:>8}",
        "Method", "Language", "Duration (ms)", "Memory (MB)", "CPU (%)"
    )?;
    for comparison in comparisons {
        writeln!(f, "{:-<width$}", "")?;
        for standing in &comparison.standings {
            let record = &standing.record;
            writeln!(
                f,
                "  {:<14} {:<lang_width$} {:>14.2} {:>12.2} {:>8.1}",
                record.method.as_str(),
                record.language,
                record.duration_ms,
                record.memory_mb,
                record.cpu_percent
            )?;
        }
    }
    writeln!(f, "{:-<width$}", "")
}

fn write_performance_comparison(
    f: &mut fmt::Formatter<'_>,
    comparisons: &[MethodComparison],
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "==== Performance Comparison ====")?;

    for comparison in comparisons {
        writeln!(f)?;
        writeln!(f, "{}:", comparison.method.label())?;
        for standing in &comparison.standings {
            let record = &standing.record;
            writeln!(
                f,
                "  {}: {:.2}ms ({})",
                record.language, record.duration_ms, standing.rank
            )?;
            writeln!(f, "    Memory: {:.2}MB", record.memory_mb)?;
            writeln!(f, "    CPU: {:.1}%", record.cpu_percent)?;
        }
    }
    Ok(())
}
