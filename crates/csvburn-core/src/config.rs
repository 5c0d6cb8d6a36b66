use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{CsvBurnError, Result};

pub const RUNS_ENV: &str = "CSVBURN_RUNS";
pub const QUIESCENCE_ENV: &str = "CSVBURN_QUIESCENCE_MS";
pub const LANGUAGE_ENV: &str = "CSVBURN_LANGUAGE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Repetitions per strategy.
    pub runs: u32,
    /// Pause after each reclamation point, before memory is sampled.
    pub quiescence_ms: u64,
    /// Label written to the `language` column.
    pub language: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            runs: 3,
            quiescence_ms: 100,
            language: "Rust".to_string(),
        }
    }
}

impl BenchmarkConfig {
    /// Defaults overridden by `CSVBURN_*` environment variables. Not validated,
    /// so CLI flags can still be layered on top.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(runs) = lookup(RUNS_ENV) {
            config.runs = runs
                .trim()
                .parse()
                .map_err(|_| CsvBurnError::Config(format!("{RUNS_ENV} must be an integer, got {runs:?}")))?;
        }
        if let Some(ms) = lookup(QUIESCENCE_ENV) {
            config.quiescence_ms = ms
                .trim()
                .parse()
                .map_err(|_| CsvBurnError::Config(format!("{QUIESCENCE_ENV} must be an integer, got {ms:?}")))?;
        }
        if let Some(language) = lookup(LANGUAGE_ENV) {
            config.language = language;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(CsvBurnError::Config("runs must be at least 1".to_string()));
        }
        if self.language.trim().is_empty() {
            return Err(CsvBurnError::Config("language label must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}
