#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the NeuroPulse overlay.
//!
//! This crate defines the message surface that connects the shell adapters,
//! the authoritative overlay state, and the pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the overlay executes those
//! commands via its `apply` entry point and broadcasts [`Event`] values, and
//! systems react to those events by advancing their own state or answering
//! with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Title used by shells when presenting the overlay window.
pub const WINDOW_TITLE: &str = "NeuroPulse";

/// Period of the shared animation clock.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(30);

/// Period between two metric samples.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(1500);

/// Period between two icon wave triggers.
pub const WAVE_INTERVAL: Duration = Duration::from_millis(5000);

/// Time a reclaim acknowledgement stays on the panel before reverting.
pub const ACKNOWLEDGEMENT_DURATION: Duration = Duration::from_millis(1500);

/// Time the close control stays visible after being revealed.
pub const CLOSE_CONTROL_DURATION: Duration = Duration::from_millis(3000);

const BYTES_PER_MEBIBYTE: f64 = 1024.0 * 1024.0;

/// Commands that express all permissible overlay mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the overlay clock by the provided wall-clock delta.
    Tick {
        /// Duration that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports that the pointer entered or left the reclaim control.
    SetFocus {
        /// Whether the pointer currently hovers the reclaim control.
        focused: bool,
    },
    /// Requests a one-shot memory reclaim pass.
    RequestOptimize,
    /// Publishes a freshly captured metric sample.
    PublishSample {
        /// Sample replacing the previously published one.
        sample: MetricSample,
    },
    /// Publishes the outcome of a reclaim pass.
    PublishReclaim {
        /// Result reported by the reclaim controller.
        result: ReclaimResult,
    },
    /// Reveals the close control for a limited time.
    RevealCloseControl,
    /// Shows or hides the overlay window.
    SetVisibility {
        /// Whether the overlay should be presented.
        visible: bool,
    },
}

/// Events broadcast by the overlay after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the wall clock advanced.
    TimeAdvanced {
        /// Duration of wall-clock time that elapsed in the tick.
        dt: Duration,
    },
    /// One fixed-period animation tick elapsed.
    FrameTick {
        /// Fixed period of the animation clock.
        dt: Duration,
    },
    /// The sampling cadence elapsed and a new metric sample is due.
    SampleDue,
    /// The wave cadence elapsed and a new icon wave should start.
    WaveDue,
    /// The pointer entered or left the reclaim control.
    FocusChanged {
        /// Whether the reclaim control is now focused.
        focused: bool,
    },
    /// A reclaim pass was accepted and should be executed.
    OptimizeRequested,
    /// A metric sample replaced the status line.
    MetricsPublished {
        /// Sample now displayed.
        sample: MetricSample,
    },
    /// A reclaim outcome replaced the status line and started an acknowledgement.
    ReclaimReported {
        /// Result now displayed.
        result: ReclaimResult,
    },
    /// The transient reclaim acknowledgement ran out.
    AcknowledgementExpired,
    /// The close control was hidden after its display window elapsed.
    CloseControlHidden,
    /// The overlay window was shown or hidden.
    VisibilityChanged {
        /// Whether the overlay is now presented.
        visible: bool,
    },
}

/// Latest CPU and memory utilisation readings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    cpu_percent: f32,
    mem_percent: f32,
    timestamp: Duration,
}

impl MetricSample {
    /// Creates a sample, clamping both utilisation values into `0.0..=100.0`.
    ///
    /// Non-finite readings collapse to zero.
    #[must_use]
    pub fn new(cpu_percent: f32, mem_percent: f32, timestamp: Duration) -> Self {
        Self {
            cpu_percent: clamp_percent(cpu_percent),
            mem_percent: clamp_percent(mem_percent),
            timestamp,
        }
    }

    /// Sample reporting zero utilisation at the provided instant.
    #[must_use]
    pub const fn zeroed(timestamp: Duration) -> Self {
        Self {
            cpu_percent: 0.0,
            mem_percent: 0.0,
            timestamp,
        }
    }

    /// Global CPU utilisation in percent.
    #[must_use]
    pub const fn cpu_percent(&self) -> f32 {
        self.cpu_percent
    }

    /// System memory utilisation in percent.
    #[must_use]
    pub const fn mem_percent(&self) -> f32 {
        self.mem_percent
    }

    /// Time elapsed since the sampler started when the sample was captured.
    #[must_use]
    pub const fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Formats the CPU reading with exactly one decimal place.
    #[must_use]
    pub fn cpu_label(&self) -> String {
        format!("CPU: {:.1}%", self.cpu_percent)
    }

    /// Formats the memory reading with exactly one decimal place.
    #[must_use]
    pub fn mem_label(&self) -> String {
        format!("MEM: {:.1}%", self.mem_percent)
    }
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Outcome category of a reclaim pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReclaimStatus {
    /// The working set was trimmed and resident memory measured again.
    Optimized,
    /// The platform offers no working-set trim; only the collection step ran.
    Unsupported,
    /// The platform call failed; no after-measurement exists.
    Failed,
}

/// Result of a single reclaim pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReclaimResult {
    before_mb: f64,
    after_mb: Option<f64>,
    status: ReclaimStatus,
}

impl ReclaimResult {
    /// Result of a successful trim measured before and after.
    #[must_use]
    pub const fn optimized(before_mb: f64, after_mb: f64) -> Self {
        Self {
            before_mb,
            after_mb: Some(after_mb),
            status: ReclaimStatus::Optimized,
        }
    }

    /// Result of a pass on a platform without a working-set trim.
    #[must_use]
    pub const fn unsupported(before_mb: f64) -> Self {
        Self {
            before_mb,
            after_mb: None,
            status: ReclaimStatus::Unsupported,
        }
    }

    /// Result of a pass whose platform call failed.
    #[must_use]
    pub const fn failed(before_mb: f64) -> Self {
        Self {
            before_mb,
            after_mb: None,
            status: ReclaimStatus::Failed,
        }
    }

    /// Resident memory of the process before the pass, in MiB.
    #[must_use]
    pub const fn before_mb(&self) -> f64 {
        self.before_mb
    }

    /// Resident memory after a successful trim, in MiB.
    #[must_use]
    pub const fn after_mb(&self) -> Option<f64> {
        self.after_mb
    }

    /// Memory released by the trim, in MiB. Negative when resident memory grew.
    #[must_use]
    pub fn saved_mb(&self) -> Option<f64> {
        self.after_mb.map(|after| self.before_mb - after)
    }

    /// Outcome category of the pass.
    #[must_use]
    pub const fn status(&self) -> ReclaimStatus {
        self.status
    }

    /// Status line shown to the user after the pass.
    #[must_use]
    pub fn message(&self) -> String {
        match (self.status, self.saved_mb()) {
            (ReclaimStatus::Optimized, Some(saved)) => format!("✔ Optimized\n↓ {saved:.1} MB"),
            (ReclaimStatus::Optimized, None) => "✔ Optimized".to_owned(),
            (ReclaimStatus::Unsupported, _) => "✔ GC run\n(Memory trim N/A)".to_owned(),
            (ReclaimStatus::Failed, _) => "Memory optimization failed".to_owned(),
        }
    }
}

/// Converts a byte count into mebibytes.
#[must_use]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MEBIBYTE
}

/// Opaque 8-bit RGB color produced by the animation systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Converts an HSV triple into RGB.
    ///
    /// `hue` is expressed in degrees and wraps at 360; `saturation` and `value`
    /// span `0..=255`.
    #[must_use]
    pub fn from_hsv(hue: u16, saturation: u8, value: u8) -> Self {
        let hue = f32::from(hue % 360);
        let value = f32::from(value) / 255.0;
        let chroma = value * (f32::from(saturation) / 255.0);
        let x = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
        let m = value - chroma;

        let (r, g, b) = match (hue / 60.0) as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        Self {
            red: to_channel(r + m),
            green: to_channel(g + m),
            blue: to_channel(b + m),
        }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

fn to_channel(unit: f32) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}
