#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that launches the NeuroPulse overlay.

mod simulation;
mod tracing_setup;

use anyhow::Result;
use clap::Parser;
use neuropulse_core::WINDOW_TITLE;
use neuropulse_rendering::{Color, OverlayLayout, Presentation, RenderingBackend};
use neuropulse_rendering_macroquad::MacroquadBackend;
use neuropulse_system_reclaim::NativePlatform;
use neuropulse_system_sampler::{Sampler, SystemMetricsSource};
use tracing::info;

use self::{
    simulation::{Reclaimer, Simulation},
    tracing_setup::Verbosity,
};

/// Always-on-top CPU and memory overlay with a one-click memory trim.
#[derive(Debug, Parser)]
#[command(name = "neuropulse", version, about)]
struct CliArgs {
    /// Emit debug-level logs.
    #[arg(short, long)]
    verbose: bool,
    /// Only emit errors.
    #[arg(short, long)]
    quiet: bool,
    /// Disable vertical synchronisation.
    #[arg(long)]
    no_vsync: bool,
    /// Log the measured frame rate once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the NeuroPulse command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    tracing_setup::init_subscriber(Verbosity::from_flags(args.verbose, args.quiet))?;

    let layout = OverlayLayout::default();
    let mut simulation = Simulation::new(
        layout,
        Sampler::new(SystemMetricsSource::new()),
        Reclaimer::start(NativePlatform::new),
    );
    let presentation = Presentation::new(
        WINDOW_TITLE,
        Color::from_rgb_u8(5, 5, 15),
        simulation.scene(),
    );

    info!(
        width = layout.width(),
        height = layout.height(),
        "starting overlay"
    );
    MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps)
        .run(presentation, move |dt, input, scene| {
            simulation.advance(dt, &input);
            simulation.populate_scene(scene);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn flags_default_to_off() {
        let args = CliArgs::parse_from(["neuropulse"]);

        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(!args.no_vsync);
        assert!(!args.show_fps);
    }

    #[test]
    fn ambient_flags_parse() {
        let args = CliArgs::parse_from(["neuropulse", "-v", "--no-vsync", "--show-fps"]);

        assert!(args.verbose);
        assert!(args.no_vsync);
        assert!(args.show_fps);
    }
}
