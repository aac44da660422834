//! Seesaw wave displacing the paired status icons.

use std::{f32::consts::TAU, time::Duration};

/// Length and amplitude of a single icon wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveConfig {
    /// Time a wave takes from start to rest.
    pub duration: Duration,
    /// Peak icon displacement in pixels.
    pub amplitude: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1000),
            amplitude: 6.0,
        }
    }
}

/// Progress of the current icon wave, if any.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveState {
    elapsed_ms: u32,
    duration_ms: u32,
    amplitude: f32,
    active: bool,
    offset: i32,
}

impl WaveState {
    /// Creates a dormant wave.
    #[must_use]
    pub fn dormant(config: WaveConfig) -> Self {
        Self {
            elapsed_ms: 0,
            duration_ms: duration_to_ms(config.duration),
            amplitude: config.amplitude,
            active: false,
            offset: 0,
        }
    }

    /// Activates the wave from the beginning. No-op while a wave is running.
    #[must_use]
    pub fn start(self) -> Self {
        if self.active {
            return self;
        }
        Self {
            elapsed_ms: 0,
            active: true,
            offset: 0,
            ..self
        }
    }

    /// Advances an active wave by `dt`.
    ///
    /// Once the elapsed time reaches the duration the wave goes dormant with
    /// both icons back at rest.
    #[must_use]
    pub fn next(self, dt: Duration) -> Self {
        if !self.active {
            return self;
        }

        let elapsed_ms = self.elapsed_ms.saturating_add(duration_to_ms(dt));
        if elapsed_ms >= self.duration_ms {
            return Self {
                elapsed_ms,
                active: false,
                offset: 0,
                ..self
            };
        }

        let progress = elapsed_ms as f32 / self.duration_ms as f32;
        let offset = (self.amplitude * (progress * TAU).sin()).round() as i32;
        Self {
            elapsed_ms,
            offset,
            ..self
        }
    }

    /// Whether a wave is currently running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Milliseconds elapsed since the wave started.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Fraction of the wave completed, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms as f32 / self.duration_ms as f32).min(1.0)
    }

    /// Vertical displacement of the lightning icon.
    #[must_use]
    pub const fn lightning_offset(&self) -> i32 {
        self.offset
    }

    /// Vertical displacement of the brain icon, mirroring the lightning icon.
    #[must_use]
    pub const fn brain_offset(&self) -> i32 {
        -self.offset
    }
}

fn duration_to_ms(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// Wave sub-machine started by its own periodic trigger.
#[derive(Clone, Copy, Debug)]
pub struct Wave {
    state: WaveState,
}

impl Wave {
    /// Creates a dormant wave sub-machine.
    #[must_use]
    pub fn new(config: WaveConfig) -> Self {
        Self {
            state: WaveState::dormant(config),
        }
    }

    /// Starts a wave unless one is already running. Returns whether it started.
    pub fn start(&mut self) -> bool {
        if self.state.is_active() {
            return false;
        }
        self.state = self.state.start();
        true
    }

    /// Advances the running wave by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.state = self.state.next(dt);
    }

    /// Snapshot of the wave state.
    #[must_use]
    pub const fn state(&self) -> WaveState {
        self.state
    }
}
