#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cosmetic animation engine for the NeuroPulse overlay.
//!
//! The engine owns three independent sub-machines that share one fixed-period
//! clock: the reclaim glyph [`Pulse`], the [`Neon`] border sweep, and the icon
//! [`Wave`]. Every sub-machine is a pure `next(state) -> state` transition
//! wrapped in a small owner, so the effects never observe each other and can
//! be exercised without a live event loop.

mod neon;
mod pulse;
mod wave;

pub use neon::{HueDirection, Neon, NeonConfig, NeonState};
pub use pulse::{Pulse, PulseConfig, PulseState};
pub use wave::{Wave, WaveConfig, WaveState};

use std::time::Duration;

use neuropulse_core::{Event, Rgb};
use tracing::debug;

/// Configuration parameters required to construct the animation engine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Config {
    /// Reclaim glyph pulse bounds.
    pub pulse: PulseConfig,
    /// Neon border hue band.
    pub neon: NeonConfig,
    /// Icon wave shape.
    pub wave: WaveConfig,
}

/// Renderable parameters produced by the engine for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationFrame {
    /// Point size of the reclaim glyph.
    pub pulse_size: f32,
    /// Decorative border color.
    pub border: Rgb,
    /// Vertical displacement of the lightning icon from its rest position.
    pub lightning_offset: i32,
    /// Vertical displacement of the brain icon from its rest position.
    pub brain_offset: i32,
}

/// Animation system advancing every cosmetic effect from overlay events.
#[derive(Debug)]
pub struct AnimationEngine {
    pulse: Pulse,
    neon: Neon,
    wave: Wave,
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AnimationEngine {
    /// Creates a new engine using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            pulse: Pulse::new(config.pulse),
            neon: Neon::new(config.neon),
            wave: Wave::new(config.wave),
        }
    }

    /// Consumes overlay events in order, advancing the affected sub-machines.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::FrameTick { dt } => self.tick(*dt),
                Event::WaveDue => {
                    if self.wave.start() {
                        debug!("icon wave started");
                    }
                }
                Event::FocusChanged { focused: true } => self.pulse.focus_enter(),
                Event::FocusChanged { focused: false } => self.pulse.focus_leave(),
                _ => {}
            }
        }
    }

    /// Advances every running sub-machine by one fixed tick of length `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.pulse.tick();
        self.neon.tick();
        let was_active = self.wave.state().is_active();
        self.wave.tick(dt);
        if was_active && !self.wave.state().is_active() {
            debug!("icon wave settled");
        }
    }

    /// Pulse sub-machine.
    #[must_use]
    pub const fn pulse(&self) -> &Pulse {
        &self.pulse
    }

    /// Neon sub-machine.
    #[must_use]
    pub const fn neon(&self) -> &Neon {
        &self.neon
    }

    /// Wave sub-machine.
    #[must_use]
    pub const fn wave(&self) -> &Wave {
        &self.wave
    }

    /// Captures the renderable parameters of every effect.
    #[must_use]
    pub fn frame(&self) -> AnimationFrame {
        let wave = self.wave.state();
        AnimationFrame {
            pulse_size: self.pulse.state().current_size(),
            border: self.neon.state().color(),
            lightning_offset: wave.lightning_offset(),
            brain_offset: wave.brain_offset(),
        }
    }
}
