//! Border hue sweeping back and forth across the neon band.

use neuropulse_core::Rgb;

const SATURATION: u8 = 255;
const VALUE: u8 = 255;

/// Hue band and sweep speed of the neon border.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeonConfig {
    /// Lower hue bound in degrees.
    pub low: f32,
    /// Upper hue bound in degrees.
    pub high: f32,
    /// Hue change applied on every tick, in degrees.
    pub step: f32,
}

impl Default for NeonConfig {
    fn default() -> Self {
        Self {
            low: 180.0,
            high: 330.0,
            step: 0.5,
        }
    }
}

/// Direction of travel across the hue band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HueDirection {
    /// Hue increases towards the upper bound.
    Rising,
    /// Hue decreases towards the lower bound.
    Falling,
}

impl HueDirection {
    /// Sign applied to the step: `+1.0` or `-1.0`.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Rising => 1.0,
            Self::Falling => -1.0,
        }
    }
}

/// Triangle wave over hue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeonState {
    hue: f32,
    direction: HueDirection,
    low: f32,
    high: f32,
    step: f32,
}

impl NeonState {
    /// Starts at the lower bound, rising.
    #[must_use]
    pub fn new(config: NeonConfig) -> Self {
        let (low, high) = if config.low <= config.high {
            (config.low, config.high)
        } else {
            (config.high, config.low)
        };
        Self {
            hue: low,
            direction: HueDirection::Rising,
            low,
            high,
            step: config.step.abs(),
        }
    }

    /// Advances the hue by one tick, reversing on the bound it reaches.
    #[must_use]
    pub fn next(self) -> Self {
        let mut next = self;
        next.hue += next.direction.sign() * next.step;
        if next.hue >= next.high {
            next.hue = next.high;
            next.direction = HueDirection::Falling;
        } else if next.hue <= next.low {
            next.hue = next.low;
            next.direction = HueDirection::Rising;
        }
        next
    }

    /// Current hue in degrees.
    #[must_use]
    pub const fn hue(&self) -> f32 {
        self.hue
    }

    /// Current direction of travel.
    #[must_use]
    pub const fn direction(&self) -> HueDirection {
        self.direction
    }

    /// Border color for the current hue at full saturation and value.
    #[must_use]
    pub fn color(&self) -> Rgb {
        Rgb::from_hsv(self.hue as u16, SATURATION, VALUE)
    }
}

/// Free-running neon sub-machine.
#[derive(Clone, Copy, Debug)]
pub struct Neon {
    state: NeonState,
}

impl Neon {
    /// Creates a neon border at the start of its sweep.
    #[must_use]
    pub fn new(config: NeonConfig) -> Self {
        Self {
            state: NeonState::new(config),
        }
    }

    /// Advances one tick.
    pub fn tick(&mut self) {
        self.state = self.state.next();
    }

    /// Snapshot of the neon state.
    #[must_use]
    pub const fn state(&self) -> NeonState {
        self.state
    }
}
