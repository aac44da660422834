#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Metric sampling system that answers sampling ticks with fresh readings.
//!
//! Readings come from a [`MetricsSource`]. A failing read never surfaces as an
//! error: the sampler re-publishes the previous sample so the overlay keeps a
//! continuous display.

use std::time::Instant;

use neuropulse_core::{Command, Event, MetricSample};
use sysinfo::System;
use thiserror::Error;
use tracing::{debug, warn};

/// Raw utilisation percentages read from the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Readings {
    /// Global CPU utilisation in percent.
    pub cpu_percent: f32,
    /// System memory utilisation in percent.
    pub mem_percent: f32,
}

/// Reasons a metrics read may fail.
#[derive(Debug, Error)]
pub enum SamplingError {
    /// The host did not expose the counters required for a reading.
    #[error("metrics unavailable: {0}")]
    Unavailable(String),
}

/// Source of CPU and memory utilisation readings.
pub trait MetricsSource {
    /// Reads the current utilisation counters.
    fn read(&mut self) -> Result<Readings, SamplingError>;
}

/// [`MetricsSource`] backed by the operating system counters exposed by `sysinfo`.
#[derive(Debug)]
pub struct SystemMetricsSource {
    system: System,
}

impl Default for SystemMetricsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetricsSource {
    /// Creates a source and primes the CPU counters so the first read has a baseline.
    #[must_use]
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self { system }
    }
}

impl MetricsSource for SystemMetricsSource {
    fn read(&mut self) -> Result<Readings, SamplingError> {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let total = self.system.total_memory();
        if total == 0 {
            return Err(SamplingError::Unavailable(
                "total memory reported as zero".to_owned(),
            ));
        }
        let used = self.system.used_memory();

        Ok(Readings {
            cpu_percent: self.system.global_cpu_usage(),
            mem_percent: (used as f64 / total as f64 * 100.0) as f32,
        })
    }
}

/// Sampling system that converts `SampleDue` ticks into published samples.
#[derive(Debug)]
pub struct Sampler<S> {
    source: S,
    started: Instant,
    last: Option<MetricSample>,
}

impl<S: MetricsSource> Sampler<S> {
    /// Creates a sampler reading from `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            started: Instant::now(),
            last: None,
        }
    }

    /// Captures a sample, falling back to the previous one when the read fails.
    ///
    /// Before the first successful read the fallback is a zeroed sample.
    pub fn sample(&mut self) -> MetricSample {
        let timestamp = self.started.elapsed();
        let sample = match self.source.read() {
            Ok(readings) => MetricSample::new(readings.cpu_percent, readings.mem_percent, timestamp),
            Err(error) => {
                let fallback = self.last.unwrap_or(MetricSample::zeroed(timestamp));
                warn!(%error, "metric sampling failed; re-publishing previous sample");
                fallback
            }
        };
        self.last = Some(sample);
        sample
    }

    /// Most recently published sample.
    #[must_use]
    pub const fn last(&self) -> Option<MetricSample> {
        self.last
    }

    /// Emits one `Command::PublishSample` when the batch contains a sampling tick.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let due = events
            .iter()
            .filter(|event| matches!(event, Event::SampleDue))
            .count();
        if due == 0 {
            return;
        }
        if due > 1 {
            debug!(due, "coalescing overdue sampling ticks");
        }

        let sample = self.sample();
        out.push(Command::PublishSample { sample });
    }
}
