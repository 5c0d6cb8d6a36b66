use csvburn_core::{
    BenchmarkConfig, CsvBurnError, FileMetadata, ReadMethod, Result, ResultRecord, Sample,
    StrategySummary,
};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::measure::Measurer;
use crate::metadata::{ensure_readable, resolve_metadata};
use crate::probe::{ProcessProbe, ResourceProbe};
use crate::strategy::{self, ReadStrategy};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BenchmarkEvent {
    RunStarted { method: ReadMethod, run: u32, total: u32 },
    StrategyComplete { summary: StrategySummary },
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub filename: String,
    pub metadata: FileMetadata,
    pub entire_file: StrategySummary,
    pub line_by_line: StrategySummary,
}

impl BenchmarkResult {
    /// The two log rows for this run, entire file first.
    pub fn records(&self, language: &str) -> [ResultRecord; 2] {
        [&self.entire_file, &self.line_by_line]
            .map(|summary| ResultRecord::from_summary(language, &self.filename, &self.metadata, summary))
    }
}

pub struct BenchmarkRunner<P = ProcessProbe> {
    measurer: Measurer<P>,
    runs: u32,
}

impl BenchmarkRunner<ProcessProbe> {
    pub fn new(config: &BenchmarkConfig) -> Result<Self> {
        Self::with_probe(ProcessProbe, config)
    }
}

impl<P: ResourceProbe> BenchmarkRunner<P> {
    pub fn with_probe(probe: P, config: &BenchmarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            measurer: Measurer::new(probe, config.quiescence()),
            runs: config.runs,
        })
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn run(&self, path: &Path, metadata: Option<FileMetadata>) -> Result<BenchmarkResult> {
        self.run_with_events(path, metadata, |_| {})
    }

    /// Runs every entire-file repetition, then every line-by-line repetition.
    /// Nothing is measured unless the file is readable.
    #[instrument(skip(self, metadata, on_event), fields(runs = self.runs))]
    pub fn run_with_events(
        &self,
        path: &Path,
        metadata: Option<FileMetadata>,
        mut on_event: impl FnMut(BenchmarkEvent),
    ) -> Result<BenchmarkResult> {
        ensure_readable(path)?;
        let metadata = resolve_metadata(path, metadata)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        info!("Starting benchmark for file: {}", filename);

        let entire_file = self.run_strategy(&*strategy::for_method(ReadMethod::EntireFile), path, &mut on_event)?;
        let line_by_line = self.run_strategy(&*strategy::for_method(ReadMethod::LineByLine), path, &mut on_event)?;

        Ok(BenchmarkResult {
            filename,
            metadata,
            entire_file,
            line_by_line,
        })
    }

    fn run_strategy(
        &self,
        strategy: &dyn ReadStrategy,
        path: &Path,
        on_event: &mut impl FnMut(BenchmarkEvent),
    ) -> Result<StrategySummary> {
        let method = strategy.method();
        let mut samples = Vec::with_capacity(self.runs as usize);

        for run in 1..=self.runs {
            info!("{} run {}/{}", method.label(), run, self.runs);
            on_event(BenchmarkEvent::RunStarted {
                method,
                run,
                total: self.runs,
            });

            let measured = self.measurer.measure(|| strategy.read(path))?;
            let outcome = measured.result?;
            tracing::debug!(records = outcome.records, bytes = outcome.bytes, "Read complete");

            samples.push(measured.sample);
        }

        let summary = calculate_summary(method, &samples)?;
        on_event(BenchmarkEvent::StrategyComplete {
            summary: summary.clone(),
        });
        Ok(summary)
    }
}

/// Means over the run set. CPU percent is mean CPU time over mean wall time,
/// not a mean of per-run ratios.
pub fn calculate_summary(method: ReadMethod, samples: &[Sample]) -> Result<StrategySummary> {
    if samples.is_empty() {
        return Err(CsvBurnError::MeasurementUnavailable(format!(
            "no samples recorded for {method}"
        )));
    }
    let n = samples.len() as f64;

    let avg_duration_ms = samples.iter().map(|s| s.wall_time_ms).sum::<f64>() / n;
    let avg_memory_mb = samples.iter().map(|s| s.memory_delta_mb).sum::<f64>() / n;
    let avg_cpu_s = samples.iter().map(|s| s.cpu_time_s).sum::<f64>() / n;
    let avg_wall_s = avg_duration_ms / 1000.0;

    let avg_cpu_percent = if avg_wall_s > 0.0 {
        avg_cpu_s / avg_wall_s * 100.0
    } else {
        warn!("Mean wall time for {} is zero, reporting 0% CPU", method);
        0.0
    };

    Ok(StrategySummary {
        method,
        avg_duration_ms,
        avg_memory_mb,
        avg_cpu_percent,
        runs: samples.len() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::testing::ScriptedProbe;
    use std::io::Write;

    fn config(runs: u32) -> BenchmarkConfig {
        BenchmarkConfig {
            runs,
            quiescence_ms: 0,
            ..BenchmarkConfig::default()
        }
    }

    fn fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_summary_is_arithmetic_mean() {
        let samples = [
            Sample::new(100.0, 0.05, 10.0, 12.0),
            Sample::new(200.0, 0.10, 10.0, 14.0),
            Sample::new(300.0, 0.15, 10.0, 10.0),
        ];

        let summary = calculate_summary(ReadMethod::EntireFile, &samples).unwrap();

        assert!((summary.avg_duration_ms - 200.0).abs() < 1e-9);
        assert!((summary.avg_memory_mb - 2.0).abs() < 1e-9);
        assert!((summary.avg_cpu_percent - 50.0).abs() < 1e-9);
        assert_eq!(summary.runs, 3);
    }

    #[test]
    fn test_cpu_percent_uses_ratio_of_means() {
        // Per-run ratios would be 1000% and 10%.
        let samples = [Sample::new(1.0, 0.01, 0.0, 0.0), Sample::new(1000.0, 0.1, 0.0, 0.0)];

        let summary = calculate_summary(ReadMethod::LineByLine, &samples).unwrap();

        let expected = (0.11 / 2.0) / (1001.0 / 2.0 / 1000.0) * 100.0;
        assert!((summary.avg_cpu_percent - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_wall_time_gives_zero_cpu() {
        let samples = [Sample::new(0.0, 0.0, 0.0, 0.0)];
        let summary = calculate_summary(ReadMethod::EntireFile, &samples).unwrap();
        assert_eq!(summary.avg_cpu_percent, 0.0);
    }

    #[test]
    fn test_empty_samples_rejected() {
        assert!(calculate_summary(ReadMethod::EntireFile, &[]).is_err());
    }

    #[test]
    fn test_runs_strategies_in_sequence() {
        let file = fixture("1,2\na,b\nc,d\n");
        // Three readings per measured run, two runs per strategy.
        let probe = ScriptedProbe::new(std::iter::repeat((0.0, 10.0)).take(12));
        let runner = BenchmarkRunner::with_probe(probe, &config(2)).unwrap();

        let mut events = Vec::new();
        let result = runner
            .run_with_events(file.path(), None, |event| events.push(event))
            .unwrap();

        let started: Vec<(ReadMethod, u32)> = events
            .iter()
            .filter_map(|event| match event {
                BenchmarkEvent::RunStarted { method, run, .. } => Some((*method, *run)),
                _ => None,
            })
            .collect();
        assert_eq!(
            started,
            vec![
                (ReadMethod::EntireFile, 1),
                (ReadMethod::EntireFile, 2),
                (ReadMethod::LineByLine, 1),
                (ReadMethod::LineByLine, 2),
            ]
        );
        assert_eq!(runner.measurer.probe().remaining(), 0);
        assert_eq!(result.metadata.rows, 3);
        assert_eq!(result.metadata.columns, 2);
        assert_eq!(result.entire_file.method, ReadMethod::EntireFile);
        assert_eq!(result.line_by_line.method, ReadMethod::LineByLine);
    }

    #[test]
    fn test_missing_file_aborts_before_measuring() {
        let probe = ScriptedProbe::new(std::iter::repeat((0.0, 10.0)).take(6));
        let runner = BenchmarkRunner::with_probe(probe, &config(1)).unwrap();

        let err = runner.run(Path::new("/nonexistent/data.csv"), None).unwrap_err();

        assert!(matches!(err, CsvBurnError::FileAccess { .. }));
        assert_eq!(runner.measurer.probe().remaining(), 6);
    }

    #[test]
    fn test_records_share_file_metadata() {
        let file = fixture("1,2,3\n");
        let probe = ScriptedProbe::new(std::iter::repeat((0.0, 1.0)).take(6));
        let runner = BenchmarkRunner::with_probe(probe, &config(1)).unwrap();
        let supplied = FileMetadata {
            rows: 10,
            columns: 3,
            file_size_mb: 1.5,
        };

        let result = runner.run(file.path(), Some(supplied)).unwrap();
        let [entire, lines] = result.records("Rust");

        assert_eq!(entire.method, ReadMethod::EntireFile);
        assert_eq!(lines.method, ReadMethod::LineByLine);
        assert_eq!(entire.metadata(), supplied);
        assert_eq!(lines.metadata(), supplied);
        assert_eq!(entire.filename, lines.filename);
        assert!(!entire.filename.contains('/'));
    }

    #[test]
    fn test_zero_runs_rejected() {
        let probe = ScriptedProbe::new(std::iter::empty());
        assert!(BenchmarkRunner::with_probe(probe, &config(0)).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_process_probe_end_to_end() {
        let file = fixture("1,2\nx,y\n");
        let runner = BenchmarkRunner::new(&config(1)).unwrap();

        let result = runner.run(file.path(), None).unwrap();

        assert!(result.entire_file.avg_duration_ms >= 0.0);
        assert!(result.line_by_line.avg_memory_mb >= 0.0);
    }
}
