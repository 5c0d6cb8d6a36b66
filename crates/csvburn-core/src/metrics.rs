use serde::{Deserialize, Serialize};

use crate::ReadMethod;

/// One measured execution of a strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub wall_time_ms: f64,
    pub cpu_time_s: f64,
    /// Never negative; see [`Sample::new`].
    pub memory_delta_mb: f64,
}

impl Sample {
    /// Builds a sample from raw readings. A resident-memory figure that went
    /// down between the two readings is floored to zero.
    pub fn new(wall_time_ms: f64, cpu_time_s: f64, memory_before_mb: f64, memory_after_mb: f64) -> Self {
        Self {
            wall_time_ms,
            cpu_time_s,
            memory_delta_mb: (memory_after_mb - memory_before_mb).max(0.0),
        }
    }

    pub fn wall_time_s(&self) -> f64 {
        self.wall_time_ms / 1000.0
    }
}

/// Averaged samples for one strategy on one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub method: ReadMethod,
    pub avg_duration_ms: f64,
    pub avg_memory_mb: f64,
    /// Percentage of a single core.
    pub avg_cpu_percent: f64,
    pub runs: u32,
}
