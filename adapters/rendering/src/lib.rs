#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for NeuroPulse adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use neuropulse_core::{ReclaimStatus, Rgb};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba_u8(red, green, blue, 255)
    }

    /// Creates a color from byte RGBA values.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }

    /// Returns the same color with its alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb_u8(rgb.red(), rgb.green(), rgb.blue())
    }
}

/// Axis-aligned rectangle expressed in window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Bounds {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Reports whether `point` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.origin + self.size;
        point.x >= self.origin.x && point.y >= self.origin.y && point.x <= max.x && point.y <= max.y
    }
}

/// Fixed window geometry of the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayLayout {
    width: f32,
    height: f32,
}

impl OverlayLayout {
    /// Default window width in pixels.
    pub const DEFAULT_WIDTH: f32 = 240.0;
    /// Default window height in pixels.
    pub const DEFAULT_HEIGHT: f32 = 100.0;
    /// Edge length of both square controls.
    pub const CONTROL_SIZE: f32 = 20.0;
    /// Edge length of the decorative icons.
    pub const ICON_SIZE: f32 = 32.0;

    const TEXT_ORIGIN: Vec2 = Vec2::new(60.0, 25.0);
    const LIGHTNING_REST: Vec2 = Vec2::new(15.0, 15.0);
    const BRAIN_REST: Vec2 = Vec2::new(14.0, 44.0);
    const CLOSE_INSET: Vec2 = Vec2::new(26.0, 6.0);
    const RECLAIM_INSET_X: f32 = 40.0;

    /// Creates a layout for a window of the provided size.
    ///
    /// The window must be large enough to hold both controls inside its bounds.
    pub fn new(width: f32, height: f32) -> Result<Self, RenderingError> {
        let fits = width.is_finite()
            && height.is_finite()
            && width >= Self::RECLAIM_INSET_X
            && height >= Self::CLOSE_INSET.y + Self::CONTROL_SIZE;
        if !fits {
            return Err(RenderingError::InvalidWindowSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Window width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Window height in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Top-left corner of the status text.
    #[must_use]
    pub const fn text_origin(&self) -> Vec2 {
        Self::TEXT_ORIGIN
    }

    /// Rest position of the lightning icon.
    #[must_use]
    pub const fn lightning_rest(&self) -> Vec2 {
        Self::LIGHTNING_REST
    }

    /// Rest position of the brain icon.
    #[must_use]
    pub const fn brain_rest(&self) -> Vec2 {
        Self::BRAIN_REST
    }

    /// Bounds of the lightning icon displaced vertically by `offset` pixels.
    #[must_use]
    pub fn lightning_icon(&self, offset: f32) -> Bounds {
        icon_bounds(Self::LIGHTNING_REST, offset)
    }

    /// Bounds of the brain icon displaced vertically by `offset` pixels.
    #[must_use]
    pub fn brain_icon(&self, offset: f32) -> Bounds {
        icon_bounds(Self::BRAIN_REST, offset)
    }

    /// Bounds of the close control in the top-right corner.
    #[must_use]
    pub fn close_control(&self) -> Bounds {
        Bounds::new(
            Vec2::new(self.width - Self::CLOSE_INSET.x, Self::CLOSE_INSET.y),
            Vec2::splat(Self::CONTROL_SIZE),
        )
    }

    /// Bounds of the reclaim control, vertically centred on the right edge.
    #[must_use]
    pub fn reclaim_control(&self) -> Bounds {
        Bounds::new(
            Vec2::new(
                self.width - Self::RECLAIM_INSET_X,
                ((self.height - Self::CONTROL_SIZE) / 2.0).floor(),
            ),
            Vec2::splat(Self::CONTROL_SIZE),
        )
    }

    /// Reports whether `point` hovers the reclaim control.
    #[must_use]
    pub fn reclaim_control_contains(&self, point: Vec2) -> bool {
        self.reclaim_control().contains(point)
    }

    /// Reports whether `point` hovers the close control.
    #[must_use]
    pub fn close_control_contains(&self, point: Vec2) -> bool {
        self.close_control().contains(point)
    }
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }
}

fn icon_bounds(rest: Vec2, offset: f32) -> Bounds {
    Bounds::new(
        rest + Vec2::new(0.0, offset),
        Vec2::splat(OverlayLayout::ICON_SIZE),
    )
}

/// Background and border colors of the overlay panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelPalette {
    /// Fill color of the rounded panel.
    pub background: Color,
    /// Color of the panel outline.
    pub border: Color,
}

impl PanelPalette {
    /// Palette used while no acknowledgement is on display.
    #[must_use]
    pub const fn idle(border: Color) -> Self {
        Self {
            background: Color::from_rgba_u8(10, 10, 30, 180),
            border,
        }
    }

    /// Palette flashed after a reclaim pass reported `status`.
    #[must_use]
    pub const fn acknowledgement(status: ReclaimStatus) -> Self {
        match status {
            ReclaimStatus::Optimized => Self {
                background: Color::from_rgba_u8(10, 30, 10, 220),
                border: Color::from_rgb_u8(0x00, 0xFF, 0x88),
            },
            ReclaimStatus::Unsupported => Self {
                background: Color::from_rgba_u8(10, 25, 30, 220),
                border: Color::from_rgb_u8(0x00, 0xFF, 0xFF),
            },
            ReclaimStatus::Failed => Self {
                background: Color::from_rgba_u8(30, 5, 10, 220),
                border: Color::from_rgb_u8(0xFF, 0x00, 0x55),
            },
        }
    }

    /// Selects the acknowledgement palette when one is active, the idle palette otherwise.
    #[must_use]
    pub const fn resolve(acknowledgement: Option<ReclaimStatus>, neon: Color) -> Self {
        match acknowledgement {
            Some(status) => Self::acknowledgement(status),
            None => Self::idle(neon),
        }
    }
}

impl Default for PanelPalette {
    fn default() -> Self {
        Self::idle(Color::from_rgb_u8(0x00, 0xFF, 0xFF))
    }
}

/// Describes the full overlay state that should be rendered for a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Window geometry the scene is drawn into.
    pub layout: OverlayLayout,
    /// Whether the overlay panel is presented.
    pub visible: bool,
    /// Panel colors for this frame.
    pub panel: PanelPalette,
    /// Status text, one entry per rendered line.
    pub status_lines: Vec<String>,
    /// Point size of the reclaim glyph.
    pub reclaim_glyph_size: f32,
    /// Whether the pointer hovers the reclaim control.
    pub reclaim_hovered: bool,
    /// Vertical displacement of the lightning icon.
    pub lightning_offset: f32,
    /// Vertical displacement of the brain icon.
    pub brain_offset: f32,
    /// Whether the close control is revealed.
    pub close_control_visible: bool,
}

impl Scene {
    /// Creates an idle scene for the provided layout.
    #[must_use]
    pub fn new(layout: OverlayLayout, reclaim_glyph_size: f32) -> Self {
        Self {
            layout,
            visible: true,
            panel: PanelPalette::default(),
            status_lines: Vec::new(),
            reclaim_glyph_size,
            reclaim_hovered: false,
            lightning_offset: 0.0,
            brain_offset: 0.0,
            close_control_visible: false,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Pointer position in window pixels, if the pointer is over the window.
    pub pointer: Option<Vec2>,
    /// Whether the primary button was pressed on this frame.
    pub primary_click: bool,
    /// Whether the secondary button was pressed on this frame.
    pub secondary_click: bool,
    /// Whether the adapter detected a request to present the overlay again.
    pub show_requested: bool,
    /// Whether the adapter detected a keyboard request for a reclaim pass.
    pub optimize_requested: bool,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting the NeuroPulse overlay.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the wall-clock frame delta
    /// and the input captured by the adapter, and repopulates the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The window cannot hold the overlay controls.
    InvalidWindowSize {
        /// Requested width in pixels.
        width: f32,
        /// Requested height in pixels.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWindowSize { width, height } => {
                write!(
                    f,
                    "window of {width}x{height} pixels cannot hold the overlay controls"
                )
            }
        }
    }
}

impl Error for RenderingError {}
