//! Glyph pulse that oscillates while the reclaim control is focused.

/// Bounds and increment of the pulse oscillation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseConfig {
    /// Smallest glyph size reached by the pulse.
    pub min: f32,
    /// Largest glyph size reached by the pulse.
    pub max: f32,
    /// Size change applied on every tick.
    pub step: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            min: 12.0,
            max: 14.0,
            step: 0.2,
        }
    }
}

/// Glyph size oscillating between two inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseState {
    current_size: f32,
    min: f32,
    max: f32,
    step: f32,
    growing: bool,
}

impl PulseState {
    /// Creates a pulse resting at its lower bound and about to grow.
    ///
    /// Reversed bounds are swapped and the step is made positive so that the
    /// `min <= current_size <= max` invariant holds for every configuration.
    #[must_use]
    pub fn at_rest(config: PulseConfig) -> Self {
        let (min, max) = if config.min <= config.max {
            (config.min, config.max)
        } else {
            (config.max, config.min)
        };
        Self {
            current_size: min,
            min,
            max,
            step: config.step.abs(),
            growing: true,
        }
    }

    /// Advances the pulse by a single tick.
    ///
    /// The size is clamped onto the bound it reaches and the direction flips on
    /// that same tick.
    #[must_use]
    pub fn next(self) -> Self {
        let mut next = self;
        if next.growing {
            next.current_size += next.step;
            if next.current_size >= next.max {
                next.current_size = next.max;
                next.growing = false;
            }
        } else {
            next.current_size -= next.step;
            if next.current_size <= next.min {
                next.current_size = next.min;
                next.growing = true;
            }
        }
        next
    }

    /// Returns the pulse to its lower bound, growing.
    #[must_use]
    pub fn reset(self) -> Self {
        Self {
            current_size: self.min,
            growing: true,
            ..self
        }
    }

    /// Current glyph size.
    #[must_use]
    pub const fn current_size(&self) -> f32 {
        self.current_size
    }

    /// Lower bound of the oscillation.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound of the oscillation.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Whether the next tick increases the size.
    #[must_use]
    pub const fn is_growing(&self) -> bool {
        self.growing
    }
}

/// Pulse sub-machine activated and deactivated by focus changes.
#[derive(Clone, Copy, Debug)]
pub struct Pulse {
    state: PulseState,
    running: bool,
}

impl Pulse {
    /// Creates an idle pulse.
    #[must_use]
    pub fn new(config: PulseConfig) -> Self {
        Self {
            state: PulseState::at_rest(config),
            running: false,
        }
    }

    /// Starts ticking from the current size.
    pub fn focus_enter(&mut self) {
        self.running = true;
    }

    /// Stops ticking and snaps back to the lower bound.
    pub fn focus_leave(&mut self) {
        self.running = false;
        self.state = self.state.reset();
    }

    /// Advances one tick when focused; ignored otherwise.
    pub fn tick(&mut self) {
        if self.running {
            self.state = self.state.next();
        }
    }

    /// Whether focus currently drives the pulse.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Snapshot of the pulse state.
    #[must_use]
    pub const fn state(&self) -> PulseState {
        self.state
    }
}
