//! Frame-driven wiring of the overlay state and its systems.

use std::time::Duration;

use neuropulse_core::{Command, Event};
use neuropulse_overlay::{self as overlay, query, Overlay};
use neuropulse_rendering::{Color, FrameInput, OverlayLayout, PanelPalette, Scene};
use neuropulse_system_animation::AnimationEngine;
use neuropulse_system_reclaim::{MemoryPlatform, ReclaimController, ReclaimWorker};
use neuropulse_system_sampler::{MetricsSource, Sampler};
use tracing::{debug, warn};

/// Upper bound on command/event rounds applied per frame.
const MAX_DISPATCH_ROUNDS: usize = 4;

/// Executes reclaim passes either on a worker thread or inline on the frame.
#[derive(Debug)]
pub(crate) enum Reclaimer<P> {
    Background(ReclaimWorker),
    Inline(ReclaimController<P>),
}

impl<P> Reclaimer<P>
where
    P: MemoryPlatform + Send + 'static,
{
    /// Starts the worker thread, running passes inline if the thread cannot be spawned.
    pub(crate) fn start(mut platform: impl FnMut() -> P) -> Self {
        match ReclaimWorker::spawn(ReclaimController::new(platform())) {
            Ok(worker) => Self::Background(worker),
            Err(error) => {
                warn!(%error, "running reclaim passes on the frame thread");
                Self::Inline(ReclaimController::new(platform()))
            }
        }
    }

    fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        match self {
            Self::Background(worker) => worker.handle(events, out),
            Self::Inline(controller) => controller.handle(events, out),
        }
    }
}

/// Owns the overlay and every system, advancing them once per rendered frame.
#[derive(Debug)]
pub(crate) struct Simulation<S, P> {
    layout: OverlayLayout,
    overlay: Overlay,
    animation: AnimationEngine,
    sampler: Sampler<S>,
    reclaimer: Reclaimer<P>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl<S, P> Simulation<S, P>
where
    S: MetricsSource,
    P: MemoryPlatform + Send + 'static,
{
    pub(crate) fn new(layout: OverlayLayout, sampler: Sampler<S>, reclaimer: Reclaimer<P>) -> Self {
        Self {
            layout,
            overlay: Overlay::default(),
            animation: AnimationEngine::default(),
            sampler,
            reclaimer,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Translates the frame input into commands and advances every system by `dt`.
    pub(crate) fn advance(&mut self, dt: Duration, input: &FrameInput) {
        let mut pending = self.input_commands(input);
        pending.push(Command::Tick { dt });

        for round in 0..MAX_DISPATCH_ROUNDS {
            if pending.is_empty() {
                return;
            }

            self.events.clear();
            for command in pending.drain(..) {
                overlay::apply(&mut self.overlay, command, &mut self.events);
            }

            self.animation.handle(&self.events);
            self.sampler.handle(&self.events, &mut self.commands);
            self.reclaimer.handle(&self.events, &mut self.commands);
            pending.append(&mut self.commands);

            if round + 1 == MAX_DISPATCH_ROUNDS && !pending.is_empty() {
                debug!(
                    dropped = pending.len(),
                    "dispatch round limit reached; dropping commands"
                );
            }
        }
    }

    fn input_commands(&self, input: &FrameInput) -> Vec<Command> {
        let mut commands = Vec::new();
        let visible = query::is_visible(&self.overlay);
        let pointer = input.pointer.filter(|_| visible);

        let hovered = pointer.is_some_and(|point| self.layout.reclaim_control_contains(point));
        commands.push(Command::SetFocus { focused: hovered });

        if let Some(point) = pointer {
            if input.primary_click {
                if query::close_control_visible(&self.overlay)
                    && self.layout.close_control_contains(point)
                {
                    commands.push(Command::SetVisibility { visible: false });
                    commands.push(Command::SetFocus { focused: false });
                } else if hovered {
                    commands.push(Command::RequestOptimize);
                }
            }
            if input.secondary_click {
                commands.push(Command::RevealCloseControl);
            }
        }

        if input.optimize_requested {
            commands.push(Command::RequestOptimize);
        }
        if input.show_requested {
            commands.push(Command::SetVisibility { visible: true });
        }
        commands
    }

    /// Writes the current overlay and animation state into `scene`.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let frame = self.animation.frame();

        scene.layout = self.layout;
        scene.visible = query::is_visible(&self.overlay);
        scene.panel = PanelPalette::resolve(
            query::acknowledgement(&self.overlay),
            Color::from(frame.border),
        );
        scene.status_lines = query::status(&self.overlay).lines();
        scene.reclaim_glyph_size = frame.pulse_size;
        scene.reclaim_hovered = query::is_focused(&self.overlay);
        scene.lightning_offset = frame.lightning_offset as f32;
        scene.brain_offset = frame.brain_offset as f32;
        scene.close_control_visible = query::close_control_visible(&self.overlay);
    }

    /// Creates a scene reflecting the current state.
    pub(crate) fn scene(&self) -> Scene {
        let mut scene = Scene::new(self.layout, self.animation.frame().pulse_size);
        self.populate_scene(&mut scene);
        scene
    }
}
