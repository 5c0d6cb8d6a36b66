//! Groups the accumulated log by file and method and ranks the results.

use csvburn_core::{FileMetadata, ReadMethod, Result, ResultRecord};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument};

use crate::results_log::{LoadedLog, MalformedRow, ResultsLog};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub files: Vec<FileReport>,
    pub malformed: Vec<MalformedRow>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Everything the log holds for one data file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub metadata: FileMetadata,
    pub languages: Vec<LanguageStats>,
    pub comparisons: Vec<MethodComparison>,
}

/// One language's records for a file, in log order.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageStats {
    pub language: String,
    pub records: Vec<ResultRecord>,
}

/// All records for one method on one file, fastest first.
#[derive(Debug, Clone, Serialize)]
pub struct MethodComparison {
    pub method: ReadMethod,
    pub standings: Vec<Standing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Standing {
    pub record: ResultRecord,
    pub rank: Rank,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rank {
    Fastest,
    /// `percent` is `None` when the fastest duration is zero.
    Slower { percent: Option<f64> },
}

#[instrument]
pub fn analyze(log_path: &Path) -> Result<Report> {
    let loaded = ResultsLog::new(log_path).load()?;
    let report = build_report(loaded);
    info!(
        files = report.files.len(),
        malformed = report.malformed.len(),
        "Analyzed results log"
    );
    Ok(report)
}

pub fn build_report(loaded: LoadedLog) -> Report {
    let LoadedLog { records, malformed } = loaded;

    let mut languages: Vec<String> = Vec::new();
    for record in &records {
        if !languages.contains(&record.language) {
            languages.push(record.language.clone());
        }
    }

    let files = group_by(records, |r| r.filename.clone())
        .into_iter()
        .map(|(filename, group)| file_report(filename, group, &languages))
        .collect();

    Report { files, malformed }
}

fn file_report(filename: String, group: Vec<ResultRecord>, languages: &[String]) -> FileReport {
    // rows/columns/size are per-file, so any member will do
    let metadata = group[0].metadata();

    let languages = languages
        .iter()
        .filter_map(|language| {
            let records: Vec<ResultRecord> = group
                .iter()
                .filter(|r| &r.language == language)
                .cloned()
                .collect();
            (!records.is_empty()).then(|| LanguageStats {
                language: language.clone(),
                records,
            })
        })
        .collect();

    let comparisons = group_by(group, |r| r.method)
        .into_iter()
        .map(|(method, records)| rank_method(method, records))
        .collect();

    FileReport {
        filename,
        metadata,
        languages,
        comparisons,
    }
}

fn rank_method(method: ReadMethod, mut records: Vec<ResultRecord>) -> MethodComparison {
    // stable: equally fast records keep their log order
    records.sort_by(|a, b| a.duration_ms.total_cmp(&b.duration_ms));
    let fastest = records.first().map(|r| r.duration_ms).unwrap_or_default();

    let standings = records
        .into_iter()
        .map(|record| {
            let rank = if record.duration_ms == fastest {
                Rank::Fastest
            } else {
                Rank::Slower {
                    percent: slowdown_percent(record.duration_ms, fastest),
                }
            };
            Standing { record, rank }
        })
        .collect();

    MethodComparison { method, standings }
}

/// `(duration - fastest) / fastest * 100`, rounded to one decimal.
pub fn slowdown_percent(duration_ms: f64, fastest_ms: f64) -> Option<f64> {
    if fastest_ms <= 0.0 {
        return None;
    }
    let percent = (duration_ms - fastest_ms) / fastest_ms * 100.0;
    Some((percent * 10.0).round() / 10.0)
}

/// Groups by key, keeping groups in order of first appearance.
fn group_by<K: PartialEq, T>(items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<(K, Vec<T>)> {
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let k = key(&item);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(item),
            None => groups.push((k, vec![item])),
        }
    }
    groups
}
