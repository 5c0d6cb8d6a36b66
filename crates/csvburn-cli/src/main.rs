use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use csvburn_benchmark::metadata::ensure_readable;
use csvburn_benchmark::{generate, resolve_metadata, BenchmarkEvent, BenchmarkResult, BenchmarkRunner};
use csvburn_core::{BenchmarkConfig, FileMetadata};
use csvburn_services::{analyze, ResultsLog};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const BENCH_USAGE: &str = "csvburn bench <data_file> [METADATA:rows,columns,file_size_mb] <results_log>";

#[derive(Parser)]
#[command(name = "csvburn")]
#[command(about = "CsvBurn - CSV read strategy benchmarks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark reading a file whole vs line by line and append to the results log
    Bench {
        /// <data_file> [METADATA:rows,columns,file_size_mb] <results_log>
        #[arg(value_name = "ARGS", num_args = 0..)]
        args: Vec<String>,

        /// Runs per strategy (default: 3, or CSVBURN_RUNS)
        #[arg(short, long)]
        runs: Option<u32>,

        /// Pause after each reclamation point in ms (default: 100, or CSVBURN_QUIESCENCE_MS)
        #[arg(long)]
        quiescence_ms: Option<u64>,

        /// Label for the language column (default: Rust, or CSVBURN_LANGUAGE)
        #[arg(short, long)]
        language: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Compare every implementation recorded in a results log
    Analyze {
        /// Results log to read
        results_log: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Write a synthetic data file
    Generate {
        file: PathBuf,
        rows: u64,
        columns: u64,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Bench {
            args,
            runs,
            quiescence_ms,
            language,
            output,
        }) => cmd_bench(&args, runs, quiescence_ms, language, output)?,
        Some(Commands::Analyze {
            results_log,
            format,
        }) => cmd_analyze(&results_log, format)?,
        Some(Commands::Generate {
            file,
            rows,
            columns,
        }) => cmd_generate(&file, rows, columns)?,
        None => {
            display_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn display_usage() {
    println!("Usage:");
    println!("  {}", BENCH_USAGE);
    println!("  csvburn analyze <results_log>");
    println!("  csvburn generate <file> <rows> <columns>");
}

fn cmd_bench(
    args: &[String],
    runs: Option<u32>,
    quiescence_ms: Option<u64>,
    language: Option<String>,
    output: OutputFormat,
) -> Result<()> {
    let (data_file, supplied, results_log) = match args {
        [data_file, results_log] => (data_file, None, results_log),
        [data_file, metadata, results_log] => {
            (data_file, Some(metadata.parse::<FileMetadata>()?), results_log)
        }
        _ => {
            println!("Usage: {}", BENCH_USAGE);
            std::process::exit(1);
        }
    };

    let mut config = BenchmarkConfig::from_env()?;
    if let Some(runs) = runs {
        config.runs = runs;
    }
    if let Some(ms) = quiescence_ms {
        config.quiescence_ms = ms;
    }
    if let Some(language) = language {
        config.language = language;
    }
    let runner = BenchmarkRunner::new(&config)?;

    let data_path = Path::new(data_file);
    ensure_readable(data_path)?;
    let metadata = resolve_metadata(data_path, supplied)?;

    let table = output == OutputFormat::Table;
    if table {
        println!("{}", metadata.to_metadata_line());
        println!();
        println!("Running benchmarks ({} runs)...", runner.runs());
    }

    let result = runner.run_with_events(data_path, Some(metadata), |event| {
        if let (true, BenchmarkEvent::RunStarted { method, run, total }) = (table, &event) {
            println!("  {} run {}/{}", method.label(), run, total);
        }
    })?;

    let log = ResultsLog::new(results_log);
    log.append(&result.records(&config.language))?;
    tracing::info!("Recorded results for {} in {}", result.filename, log.path().display());

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => display_result(&config.language, &result),
    }

    Ok(())
}

fn display_result(language: &str, result: &BenchmarkResult) {
    println!();
    println!("{} CSV Benchmarks:", language);
    println!("File: {}", result.filename);
    println!("File size: {:.2} MB", result.metadata.file_size_mb);
    println!("Row count: {}", result.metadata.rows);
    println!("Column count: {}", result.metadata.columns);
    for summary in [&result.entire_file, &result.line_by_line] {
        println!(
            "Reading {}: {:.2} ms (Memory: {:.2} MB, CPU: {:.1}%)",
            summary.method.label().to_lowercase(),
            summary.avg_duration_ms,
            summary.avg_memory_mb,
            summary.avg_cpu_percent
        );
    }
    println!();
}

fn cmd_analyze(results_log: &Path, format: OutputFormat) -> Result<()> {
    let report = analyze(results_log)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print!("{}", report),
    }

    Ok(())
}

fn cmd_generate(file: &Path, rows: u64, columns: u64) -> Result<()> {
    generate(file, rows, columns)?;
    println!("Wrote {} ({} rows, {} columns)", file.display(), rows, columns);
    Ok(())
}
