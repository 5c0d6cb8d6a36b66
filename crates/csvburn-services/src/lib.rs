mod analyzer;
mod report;
mod results_log;

pub use analyzer::{
    analyze, build_report, slowdown_percent, FileReport, LanguageStats, MethodComparison, Rank,
    Report, Standing,
};
pub use results_log::{LoadedLog, MalformedRow, ResultsLog};
