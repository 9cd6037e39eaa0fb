//! Frame loop glue between the backend, the controller and the world.

use std::{path::PathBuf, time::Duration};

use gridforge_catalog::save_blueprint;
use gridforge_core::{Command, Event};
use gridforge_rendering::{FrameInput, HudLayout, Scene};
use gridforge_system_camera::Viewport;
use gridforge_system_controller::{ControllerInput, GridController};
use gridforge_world::{apply, World};

use crate::scene;

/// Zoom delta produced by one wheel notch.
const WHEEL_ZOOM_PER_NOTCH: f32 = 0.5;

/// Owns the world and controller for the lifetime of the window.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    controller: GridController,
    hud: HudLayout,
    blueprint_dir: PathBuf,
    pending: Vec<Event>,
    commands: Vec<Command>,
}

impl Session {
    pub(crate) fn new(
        world: World,
        controller: GridController,
        hud: HudLayout,
        blueprint_dir: PathBuf,
    ) -> Self {
        Self {
            world,
            controller,
            hud,
            blueprint_dir,
            pending: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Runs one frame: input, commands, world events, then the scene.
    ///
    /// Events produced by the world reach the controller on the next frame.
    pub(crate) fn frame(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        let controller_input = self.controller_input(dt, &input);
        let events = std::mem::take(&mut self.pending);
        self.controller
            .handle(&events, &controller_input, &mut self.commands);

        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.pending);
        }
        self.observe();

        scene::populate(
            scene,
            &self.world,
            &self.controller,
            input.pointer,
            input.screen,
        );
    }

    fn controller_input(&self, dt: Duration, input: &FrameInput) -> ControllerInput {
        let palette_len = self.controller.active_palette().entries().len();
        let select = if input.primary_pressed {
            self.hud.palette_hit(input.screen, palette_len, input.pointer)
        } else {
            None
        };

        ControllerInput {
            dt,
            pointer: input.pointer,
            place: input.primary_pressed && select.is_none(),
            remove: input.secondary_pressed,
            pan_held: input.pan_held,
            wheel: input.wheel * WHEEL_ZOOM_PER_NOTCH,
            scroll: input.scroll,
            toggle_mode: input.mode_toggle,
            extract: input.extract,
            rotate: input.rotate,
            flip_horizontal: input.flip_horizontal,
            flip_vertical: input.flip_vertical,
            cancel: input.cancel,
            select,
            viewport: Viewport::new(input.screen.x, input.screen.y)
                .with_offsets(self.hud.top_height(), self.hud.bottom_height()),
        }
    }

    fn observe(&self) {
        for event in &self.pending {
            match event {
                Event::PlayModeChanged { mode } => {
                    tracing::info!(mode = mode.label(), "mode switched");
                }
                Event::PlacementRejected {
                    mode,
                    origin,
                    reason,
                } => {
                    tracing::info!(
                        mode = mode.label(),
                        x = origin.x(),
                        y = origin.y(),
                        %reason,
                        "cannot place"
                    );
                }
                Event::RemovalRejected { at, reason, .. } => {
                    tracing::debug!(x = at.x(), y = at.y(), %reason, "nothing removed");
                }
                Event::BlueprintExtracted { blueprint } => {
                    if let Err(error) = save_blueprint(&self.blueprint_dir, blueprint) {
                        tracing::error!(%error, "failed to save blueprint");
                    }
                }
                Event::ExtractionRejected { name } => {
                    tracing::warn!(name = name.as_str(), "build grid is empty; nothing extracted");
                }
                Event::RecipeCompleted { instance, recipe } => {
                    tracing::debug!(instance = instance.get(), recipe = recipe.as_str(), "cycle done");
                }
                _ => {}
            }
        }
    }
}
