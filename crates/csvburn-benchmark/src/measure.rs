//! Wraps a unit of work with symmetric noise suppression and resource readings.

use csvburn_core::{Result, Sample};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::probe::ResourceProbe;

#[derive(Debug, Clone)]
pub struct Measured<R> {
    pub result: R,
    pub sample: Sample,
}

/// Every strategy is measured through the same [`Measurer::measure`], so both
/// sides of a comparison get identical pre/post handling.
pub struct Measurer<P> {
    probe: P,
    quiescence: Duration,
}

impl<P: ResourceProbe> Measurer<P> {
    pub fn new(probe: P, quiescence: Duration) -> Self {
        Self { probe, quiescence }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Runs `work` once and reports wall time, CPU time and resident-memory delta.
    ///
    /// Wall time covers only `work`, including dropping whatever it allocated.
    /// CPU time spans the whole window, reclamation points included.
    pub fn measure<R>(&self, work: impl FnOnce() -> R) -> Result<Measured<R>> {
        let cpu_before = self.probe.probe()?.cpu_time_s;

        self.quiesce();
        let memory_before = self.probe.probe()?.memory_mb;

        let start = Instant::now();
        let result = work();
        let wall_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        self.quiesce();
        let after = self.probe.probe()?;

        let sample = Sample::new(
            wall_time_ms,
            after.cpu_time_s - cpu_before,
            memory_before,
            after.memory_mb,
        );
        debug!(
            wall_time_ms = sample.wall_time_ms,
            cpu_time_s = sample.cpu_time_s,
            memory_delta_mb = sample.memory_delta_mb,
            "Measured unit of work"
        );

        Ok(Measured { result, sample })
    }

    fn quiesce(&self) {
        reclaim();
        if !self.quiescence.is_zero() {
            thread::sleep(self.quiescence);
        }
    }
}

/// Returns freed heap pages to the OS so the resident figure settles.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn reclaim() {
    // SAFETY: malloc_trim only releases memory already freed by the allocator.
    unsafe {
        libc::malloc_trim(0);
    }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn reclaim() {}
