#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative overlay state management for NeuroPulse.
//!
//! The overlay owns everything the shell renders that is not an animation
//! parameter: the status line, the transient reclaim acknowledgement, focus,
//! visibility, and the fixed-cadence clock that drives every system.

mod schedule;

pub use schedule::Cadence;

use std::time::Duration;

use neuropulse_core::{
    Command, Event, MetricSample, ReclaimResult, ReclaimStatus, ACKNOWLEDGEMENT_DURATION,
    CLOSE_CONTROL_DURATION, FRAME_INTERVAL, SAMPLE_INTERVAL, WAVE_INTERVAL,
};
use tracing::debug;

use self::schedule::Countdown;

const MAX_FRAME_CATCH_UP: u32 = 8;

/// Timing parameters of the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Period of the animation clock.
    pub frame_interval: Duration,
    /// Period between metric samples.
    pub sample_interval: Duration,
    /// Period between icon waves.
    pub wave_interval: Duration,
    /// Lifetime of a reclaim acknowledgement.
    pub acknowledgement: Duration,
    /// Lifetime of a revealed close control.
    pub close_control: Duration,
    /// Maximum animation ticks replayed after a slow frame.
    pub max_frame_catch_up: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_interval: FRAME_INTERVAL,
            sample_interval: SAMPLE_INTERVAL,
            wave_interval: WAVE_INTERVAL,
            acknowledgement: ACKNOWLEDGEMENT_DURATION,
            close_control: CLOSE_CONTROL_DURATION,
            max_frame_catch_up: MAX_FRAME_CATCH_UP,
        }
    }
}

/// Text currently occupying the overlay's status area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatusLine {
    /// Nothing has been published yet.
    Empty,
    /// The latest metric sample.
    Metrics(MetricSample),
    /// The outcome of the latest reclaim pass.
    Reclaim(ReclaimResult),
}

impl StatusLine {
    /// Lines of text to render, top to bottom.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Empty => Vec::new(),
            Self::Metrics(sample) => vec![sample.cpu_label(), sample.mem_label()],
            Self::Reclaim(result) => result.message().lines().map(str::to_owned).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Acknowledgement {
    status: ReclaimStatus,
    countdown: Countdown,
}

#[derive(Debug)]
struct Schedule {
    frame: Cadence,
    sample: Cadence,
    wave: Cadence,
}

/// Represents the authoritative overlay state.
#[derive(Debug)]
pub struct Overlay {
    config: Config,
    schedule: Schedule,
    status: StatusLine,
    acknowledgement: Option<Acknowledgement>,
    close_control: Option<Countdown>,
    focused: bool,
    visible: bool,
    reclaim_in_flight: bool,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Overlay {
    /// Creates a visible overlay whose first tick requests a metric sample.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            schedule: Schedule {
                frame: Cadence::new(config.frame_interval, config.max_frame_catch_up),
                sample: Cadence::primed(config.sample_interval, 1),
                wave: Cadence::new(config.wave_interval, 1),
            },
            config,
            status: StatusLine::Empty,
            acknowledgement: None,
            close_control: None,
            focused: false,
            visible: true,
            reclaim_in_flight: false,
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });

        let frames = self.schedule.frame.advance(dt);
        let frame_dt = self.schedule.frame.interval();
        out_events.extend((0..frames).map(|_| Event::FrameTick { dt: frame_dt }));

        if self.schedule.sample.advance(dt) > 0 {
            out_events.push(Event::SampleDue);
        }
        if self.schedule.wave.advance(dt) > 0 {
            out_events.push(Event::WaveDue);
        }

        if let Some(acknowledgement) = self.acknowledgement.as_mut() {
            if acknowledgement.countdown.advance(dt) {
                debug!(status = ?acknowledgement.status, "reclaim acknowledgement expired");
                self.acknowledgement = None;
                out_events.push(Event::AcknowledgementExpired);
            }
        }

        if let Some(countdown) = self.close_control.as_mut() {
            if countdown.advance(dt) {
                self.close_control = None;
                out_events.push(Event::CloseControlHidden);
            }
        }
    }
}

/// Applies the provided command to the overlay, mutating state deterministically.
pub fn apply(overlay: &mut Overlay, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => overlay.advance(dt, out_events),
        Command::SetFocus { focused } => {
            if overlay.focused != focused {
                overlay.focused = focused;
                out_events.push(Event::FocusChanged { focused });
            }
        }
        Command::RequestOptimize => {
            if overlay.reclaim_in_flight {
                debug!("optimize requested while a reclaim is in flight; ignored");
                return;
            }
            overlay.reclaim_in_flight = true;
            out_events.push(Event::OptimizeRequested);
        }
        Command::PublishSample { sample } => {
            overlay.status = StatusLine::Metrics(sample);
            out_events.push(Event::MetricsPublished { sample });
        }
        Command::PublishReclaim { result } => {
            overlay.reclaim_in_flight = false;
            overlay.status = StatusLine::Reclaim(result);
            overlay.acknowledgement = Some(Acknowledgement {
                status: result.status(),
                countdown: Countdown::new(overlay.config.acknowledgement),
            });
            out_events.push(Event::ReclaimReported { result });
        }
        Command::RevealCloseControl => {
            overlay.close_control = Some(Countdown::new(overlay.config.close_control));
        }
        Command::SetVisibility { visible } => {
            if overlay.visible != visible {
                overlay.visible = visible;
                out_events.push(Event::VisibilityChanged { visible });
            }
        }
    }
}

/// Query functions that provide read-only access to the overlay state.
pub mod query {
    use neuropulse_core::ReclaimStatus;

    use super::{Overlay, StatusLine};

    /// Text currently occupying the status area.
    #[must_use]
    pub fn status(overlay: &Overlay) -> &StatusLine {
        &overlay.status
    }

    /// Status of the reclaim acknowledgement still on display, if any.
    #[must_use]
    pub fn acknowledgement(overlay: &Overlay) -> Option<ReclaimStatus> {
        overlay
            .acknowledgement
            .as_ref()
            .map(|acknowledgement| acknowledgement.status)
    }

    /// Whether the pointer hovers the reclaim control.
    #[must_use]
    pub fn is_focused(overlay: &Overlay) -> bool {
        overlay.focused
    }

    /// Whether the overlay window is presented.
    #[must_use]
    pub fn is_visible(overlay: &Overlay) -> bool {
        overlay.visible
    }

    /// Whether the close control is currently revealed.
    #[must_use]
    pub fn close_control_visible(overlay: &Overlay) -> bool {
        overlay.close_control.is_some()
    }

    /// Whether a reclaim pass was requested and has not reported back.
    #[must_use]
    pub fn reclaim_in_flight(overlay: &Overlay) -> bool {
        overlay.reclaim_in_flight
    }
}
