#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Best-effort memory reclaim for the overlay process.
//!
//! A reclaim pass measures resident memory, asks the allocator to give back
//! what it can, and, where the operating system offers it, trims the working
//! set before measuring again. Platform specifics live behind
//! [`MemoryPlatform`] so the controller logic is identical on every target.
//! Failures are reported through [`ReclaimStatus`] and never propagate.

mod platform;
mod worker;

pub use platform::NativePlatform;
pub use worker::ReclaimWorker;

use std::io;

use neuropulse_core::{Command, Event, ReclaimResult, ReclaimStatus};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised by the platform seam.
#[derive(Debug, Error)]
pub enum ReclaimError {
    /// The resident memory of the current process could not be read.
    #[error("resident memory of the current process is unavailable")]
    ResidentMemoryUnavailable,
    /// The operating system rejected the working-set trim.
    #[error("working-set trim failed")]
    Trim(#[source] io::Error),
    /// The background reclaim thread could not be started.
    #[error("failed to spawn the reclaim worker")]
    WorkerSpawn(#[source] io::Error),
}

/// Outcome of asking the platform to trim the working set.
#[derive(Debug)]
pub enum TrimOutcome {
    /// The working set was trimmed.
    Trimmed,
    /// The platform offers a trim but the call failed.
    Failed(ReclaimError),
    /// The platform offers no working-set trim.
    Unsupported,
}

/// Platform capabilities required by a reclaim pass.
pub trait MemoryPlatform {
    /// Resident memory of the current process in MiB.
    fn resident_mb(&mut self) -> Result<f64, ReclaimError>;

    /// Returns freed allocations to the operating system where supported.
    fn request_collection(&mut self);

    /// Trims the working set of the current process.
    fn trim_working_set(&mut self) -> TrimOutcome;
}

impl<P: MemoryPlatform + ?Sized> MemoryPlatform for &mut P {
    fn resident_mb(&mut self) -> Result<f64, ReclaimError> {
        (**self).resident_mb()
    }

    fn request_collection(&mut self) {
        (**self).request_collection();
    }

    fn trim_working_set(&mut self) -> TrimOutcome {
        (**self).trim_working_set()
    }
}

/// Controller executing reclaim passes against a [`MemoryPlatform`].
#[derive(Debug)]
pub struct ReclaimController<P> {
    platform: P,
}

impl<P: MemoryPlatform> ReclaimController<P> {
    /// Creates a controller backed by `platform`.
    #[must_use]
    pub const fn new(platform: P) -> Self {
        Self { platform }
    }

    /// Runs one reclaim pass.
    pub fn optimize(&mut self) -> ReclaimResult {
        let before_mb = match self.platform.resident_mb() {
            Ok(before_mb) => before_mb,
            Err(error) => {
                warn!(%error, "unable to measure resident memory before reclaim");
                self.platform.request_collection();
                return report(ReclaimResult::failed(0.0));
            }
        };

        self.platform.request_collection();

        let result = match self.platform.trim_working_set() {
            TrimOutcome::Unsupported => ReclaimResult::unsupported(before_mb),
            TrimOutcome::Failed(error) => {
                warn!(?error, "working-set trim failed");
                ReclaimResult::failed(before_mb)
            }
            TrimOutcome::Trimmed => match self.platform.resident_mb() {
                Ok(after_mb) => ReclaimResult::optimized(before_mb, after_mb),
                Err(error) => {
                    warn!(%error, "unable to measure resident memory after reclaim");
                    ReclaimResult::failed(before_mb)
                }
            },
        };
        report(result)
    }

    /// Answers every `Event::OptimizeRequested` with a `Command::PublishReclaim`.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if matches!(event, Event::OptimizeRequested) {
                let result = self.optimize();
                out.push(Command::PublishReclaim { result });
            }
        }
    }
}

fn report(result: ReclaimResult) -> ReclaimResult {
    match result.status() {
        ReclaimStatus::Optimized => info!(
            before_mb = result.before_mb(),
            after_mb = ?result.after_mb(),
            saved_mb = ?result.saved_mb(),
            "memory reclaimed"
        ),
        ReclaimStatus::Unsupported => info!(
            before_mb = result.before_mb(),
            "allocator release only; working-set trim unsupported on this platform"
        ),
        ReclaimStatus::Failed => info!(before_mb = result.before_mb(), "memory reclaim failed"),
    }
    result
}
