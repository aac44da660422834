#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed overlay shell for NeuroPulse.
//!
//! The overlay is silent, so macroquad is built without its `audio` feature.
//!
//! Macroquad offers no tray icon and no borderless window dragging, so the
//! tray menu is mirrored by keyboard shortcuts: `O` runs a reclaim pass, `S`
//! shows the overlay again and `Escape` exits.

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use macroquad::math::Vec2 as MacroquadVec2;
use neuropulse_rendering::{
    Bounds, Color, FrameInput, Presentation, RenderingBackend, Scene,
};
use std::time::Duration;
use tracing::{debug, info};

const TEXT_COLOR: Color = Color::from_rgb_u8(0x00, 0xFF, 0xFF);
const RECLAIM_COLOR: Color = Color::from_rgb_u8(0x00, 0xFF, 0x88);
const RECLAIM_FILL: Color = Color::from_rgba_u8(0, 30, 0, 180);
const RECLAIM_HOVER_FILL: Color = Color::from_rgba_u8(0, 255, 140, 200);
const CLOSE_COLOR: Color = Color::from_rgb_u8(0xFF, 0x00, 0x55);
const CLOSE_FILL: Color = Color::from_rgba_u8(30, 0, 0, 200);
const CLOSE_HOVER_FILL: Color = Color::from_rgba_u8(255, 0, 80, 220);
const BORDER_THICKNESS: f32 = 2.0;
const TEXT_FONT_SIZE: f32 = 16.0;
const TEXT_LINE_HEIGHT: f32 = 18.0;
const HIDDEN_HINT: [&str; 2] = ["NeuroPulse is hidden", "press S or click to show"];

/// Tracks click-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlayInputState {
    show_latched: bool,
}

impl OverlayInputState {
    /// Returns whether the hidden placeholder was clicked and clears the latch
    /// so the action fires only once.
    pub fn take_show(&mut self) -> bool {
        let latched = self.show_latched;
        self.show_latched = false;
        latched
    }

    /// Records that the hidden placeholder was clicked this frame.
    pub fn register_show(&mut self) {
        self.show_latched = true;
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` exits the overlay.
    exit_requested: bool,
    /// `S` presents a hidden overlay again.
    show_requested: bool,
    /// `O` runs a reclaim pass.
    optimize_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            exit_requested: is_key_pressed(KeyCode::Escape),
            show_requested: is_key_pressed(KeyCode::S),
            optimize_requested: is_key_pressed(KeyCode::O),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Creates a backend with platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the swap interval requested from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Enables or disables vertical synchronisation.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Logs the measured frame rate once per second when enabled.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the average rate once a second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.layout.width().round() as i32,
            window_height: scene.layout.height().round() as i32,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut overlay_input = OverlayInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.exit_requested {
                    info!("exit requested");
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let (cursor_x, cursor_y) = mouse_position();
                let frame_input = gather_frame_input_from_observations(
                    Vec2::new(cursor_x, cursor_y),
                    Vec2::new(scene.layout.width(), scene.layout.height()),
                    is_mouse_button_pressed(MouseButton::Left),
                    is_mouse_button_pressed(MouseButton::Right),
                    keyboard,
                    overlay_input.take_show(),
                );
                let placeholder_clicked = !scene.visible && frame_input.primary_click;

                update_scene(frame_dt, frame_input, &mut scene);

                if scene.visible {
                    draw_overlay(&scene);
                } else {
                    draw_hidden_placeholder(&scene);
                    if placeholder_clicked {
                        overlay_input.register_show();
                    }
                }

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        info!(fps = per_second, "frame rate");
                    } else {
                        debug!(fps = per_second, "frame rate");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn gather_frame_input_from_observations(
    cursor_position: Vec2,
    window_size: Vec2,
    primary_click: bool,
    secondary_click: bool,
    keyboard: KeyboardShortcuts,
    show_latched: bool,
) -> FrameInput {
    let inside = cursor_position.x >= 0.0
        && cursor_position.y >= 0.0
        && cursor_position.x < window_size.x
        && cursor_position.y < window_size.y;

    FrameInput {
        pointer: inside.then_some(cursor_position),
        primary_click: inside && primary_click,
        secondary_click: inside && secondary_click,
        show_requested: keyboard.show_requested || show_latched,
        optimize_requested: keyboard.optimize_requested,
    }
}

fn draw_overlay(scene: &Scene) {
    let layout = scene.layout;
    macroquad::shapes::draw_rectangle(
        0.0,
        0.0,
        layout.width(),
        layout.height(),
        to_macroquad_color(scene.panel.background),
    );
    macroquad::shapes::draw_rectangle_lines(
        0.0,
        0.0,
        layout.width(),
        layout.height(),
        BORDER_THICKNESS * 2.0,
        to_macroquad_color(scene.panel.border),
    );

    draw_lightning(layout.lightning_icon(scene.lightning_offset));
    draw_brain(layout.brain_icon(scene.brain_offset));
    draw_status_lines(&scene.status_lines, layout.text_origin(), TEXT_COLOR);
    draw_reclaim_control(scene);
    if scene.close_control_visible {
        draw_close_control(layout.close_control());
    }
}

fn draw_hidden_placeholder(scene: &Scene) {
    let hint: Vec<String> = HIDDEN_HINT.iter().map(|line| (*line).to_owned()).collect();
    draw_status_lines(
        &hint,
        scene.layout.text_origin() - Vec2::new(40.0, 0.0),
        TEXT_COLOR.with_alpha(0.4),
    );
}

fn draw_status_lines(lines: &[String], origin: Vec2, color: Color) {
    let color = to_macroquad_color(color);
    for (index, line) in lines.iter().enumerate() {
        let baseline = origin.y + TEXT_FONT_SIZE - 2.0 + index as f32 * TEXT_LINE_HEIGHT;
        let _ = macroquad::text::draw_text(line, origin.x, baseline, TEXT_FONT_SIZE, color);
    }
}

fn draw_lightning(bounds: Bounds) {
    let color = to_macroquad_color(TEXT_COLOR);
    let Vec2 { x, y } = bounds.origin;
    let size = bounds.size;
    let point = |fx: f32, fy: f32| MacroquadVec2::new(x + size.x * fx, y + size.y * fy);

    macroquad::shapes::draw_triangle(point(0.62, 0.1), point(0.3, 0.56), point(0.52, 0.56), color);
    macroquad::shapes::draw_triangle(point(0.48, 0.44), point(0.7, 0.44), point(0.38, 0.9), color);
}

fn draw_brain(bounds: Bounds) {
    let color = to_macroquad_color(TEXT_COLOR);
    let center = bounds.center();
    let radius = bounds.size.x * 0.22;
    let lobe = radius * 0.7;

    macroquad::shapes::draw_circle_lines(center.x - lobe, center.y, radius, 1.5, color);
    macroquad::shapes::draw_circle_lines(center.x + lobe, center.y, radius, 1.5, color);
    macroquad::shapes::draw_line(
        center.x,
        center.y - radius,
        center.x,
        center.y + radius,
        1.5,
        color,
    );
}

fn draw_reclaim_control(scene: &Scene) {
    let bounds = scene.layout.reclaim_control();
    let fill = if scene.reclaim_hovered {
        RECLAIM_HOVER_FILL
    } else {
        RECLAIM_FILL
    };
    macroquad::shapes::draw_rectangle(
        bounds.origin.x,
        bounds.origin.y,
        bounds.size.x,
        bounds.size.y,
        to_macroquad_color(fill),
    );

    let center = bounds.center();
    let radius = glyph_radius(scene.reclaim_glyph_size);
    let color = to_macroquad_color(RECLAIM_COLOR);
    macroquad::shapes::draw_poly_lines(center.x, center.y, 8, radius, 0.0, 2.0, color);
    macroquad::shapes::draw_circle(center.x, center.y, radius * 0.35, color);
}

fn draw_close_control(bounds: Bounds) {
    let hovered = bounds.contains({
        let (x, y) = mouse_position();
        Vec2::new(x, y)
    });
    let fill = if hovered { CLOSE_HOVER_FILL } else { CLOSE_FILL };
    macroquad::shapes::draw_rectangle(
        bounds.origin.x,
        bounds.origin.y,
        bounds.size.x,
        bounds.size.y,
        to_macroquad_color(fill),
    );

    let color = to_macroquad_color(CLOSE_COLOR);
    let inset = bounds.size * 0.3;
    let start = bounds.origin + inset;
    let end = bounds.origin + bounds.size - inset;
    macroquad::shapes::draw_line(start.x, start.y, end.x, end.y, 2.0, color);
    macroquad::shapes::draw_line(start.x, end.y, end.x, start.y, 2.0, color);
}

/// Converts a glyph point size into a drawn radius in pixels.
fn glyph_radius(point_size: f32) -> f32 {
    point_size * 0.5
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Vec2 = Vec2::new(240.0, 100.0);

    #[test]
    fn clicks_outside_the_window_are_ignored() {
        let input = gather_frame_input_from_observations(
            Vec2::new(-5.0, 10.0),
            WINDOW,
            true,
            true,
            KeyboardShortcuts::default(),
            false,
        );

        assert_eq!(input.pointer, None);
        assert!(!input.primary_click);
        assert!(!input.secondary_click);
    }

    #[test]
    fn pointer_inside_window_is_forwarded_with_clicks() {
        let input = gather_frame_input_from_observations(
            Vec2::new(210.0, 50.0),
            WINDOW,
            true,
            false,
            KeyboardShortcuts::default(),
            false,
        );

        assert_eq!(input.pointer, Some(Vec2::new(210.0, 50.0)));
        assert!(input.primary_click);
        assert!(!input.secondary_click);
    }

    #[test]
    fn show_request_merges_keyboard_and_latched_click() {
        let keyboard = KeyboardShortcuts {
            show_requested: true,
            ..KeyboardShortcuts::default()
        };
        let from_key =
            gather_frame_input_from_observations(Vec2::ZERO, WINDOW, false, false, keyboard, false);
        let from_click = gather_frame_input_from_observations(
            Vec2::ZERO,
            WINDOW,
            false,
            false,
            KeyboardShortcuts::default(),
            true,
        );

        assert!(from_key.show_requested);
        assert!(from_click.show_requested);
    }

    #[test]
    fn optimize_shortcut_is_forwarded() {
        let keyboard = KeyboardShortcuts {
            optimize_requested: true,
            ..KeyboardShortcuts::default()
        };
        let input = gather_frame_input_from_observations(
            Vec2::new(500.0, 500.0),
            WINDOW,
            false,
            false,
            keyboard,
            false,
        );

        assert!(input.optimize_requested);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        for _ in 0..59 {
            assert_eq!(counter.record_frame(Duration::from_millis(16)), None);
        }
        let rate = counter
            .record_frame(Duration::from_millis(60))
            .expect("one second elapsed");

        assert!((rate - 60.0).abs() < 0.5);
    }

    #[test]
    fn glyph_radius_tracks_the_pulse() {
        assert_eq!(glyph_radius(12.0), 6.0);
        assert_eq!(glyph_radius(14.0), 7.0);
    }
}
