//! Point-in-time readings of the current process's CPU time and resident memory.

use csvburn_core::{CsvBurnError, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResourceReading {
    /// Accumulated user + system CPU time.
    pub cpu_time_s: f64,
    /// Current resident set size.
    pub memory_mb: f64,
}

pub trait ResourceProbe {
    fn probe(&self) -> Result<ResourceReading>;
}

/// Reads counters of the running process from the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessProbe;

impl ResourceProbe for ProcessProbe {
    fn probe(&self) -> Result<ResourceReading> {
        let reading = ResourceReading {
            cpu_time_s: cpu_time_s()?,
            memory_mb: resident_memory_mb()?,
        };
        debug!(
            cpu_time_s = reading.cpu_time_s,
            memory_mb = reading.memory_mb,
            "Process probe"
        );
        Ok(reading)
    }
}

#[cfg(unix)]
fn cpu_time_s() -> Result<f64> {
    // SAFETY: rusage is plain old data and getrusage only writes into it.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return Err(CsvBurnError::MeasurementUnavailable(format!(
            "getrusage failed: {}",
            std::io::Error::last_os_error()
        )));
    }
    Ok(timeval_secs(usage.ru_utime) + timeval_secs(usage.ru_stime))
}

#[cfg(unix)]
fn timeval_secs(tv: libc::timeval) -> f64 {
    tv.tv_sec as f64 + tv.tv_usec as f64 / 1_000_000.0
}

#[cfg(not(unix))]
fn cpu_time_s() -> Result<f64> {
    Err(CsvBurnError::MeasurementUnavailable(
        "CPU time is only available on Unix platforms".to_string(),
    ))
}

#[cfg(target_os = "linux")]
fn resident_memory_mb() -> Result<f64> {
    let status = std::fs::read_to_string("/proc/self/status").map_err(|e| {
        CsvBurnError::MeasurementUnavailable(format!("cannot read /proc/self/status: {e}"))
    })?;
    let kb = parse_vm_rss_kb(&status).ok_or_else(|| {
        CsvBurnError::MeasurementUnavailable("VmRSS missing from /proc/self/status".to_string())
    })?;
    Ok(kb as f64 / 1024.0)
}

#[cfg(not(target_os = "linux"))]
fn resident_memory_mb() -> Result<f64> {
    Err(CsvBurnError::MeasurementUnavailable(
        "resident memory is only available on Linux".to_string(),
    ))
}

/// Extracts the `VmRSS` figure (in kB) from the contents of `/proc/<pid>/status`.
pub fn parse_vm_rss_kb(status: &str) -> Option<u64> {
    status
        .lines()
        .find(|line| line.starts_with("VmRSS:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Hands out pre-recorded readings in order.
    pub struct ScriptedProbe {
        readings: RefCell<VecDeque<ResourceReading>>,
    }

    impl ScriptedProbe {
        pub fn new(readings: impl IntoIterator<Item = (f64, f64)>) -> Self {
            Self {
                readings: RefCell::new(
                    readings
                        .into_iter()
                        .map(|(cpu_time_s, memory_mb)| ResourceReading { cpu_time_s, memory_mb })
                        .collect(),
                ),
            }
        }

        pub fn remaining(&self) -> usize {
            self.readings.borrow().len()
        }
    }

    impl ResourceProbe for ScriptedProbe {
        fn probe(&self) -> Result<ResourceReading> {
            self.readings.borrow_mut().pop_front().ok_or_else(|| {
                CsvBurnError::MeasurementUnavailable("scripted probe exhausted".to_string())
            })
        }
    }
}
