#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interaction system that turns per-frame input into camera motion and
//! world commands for whichever grid is active.

use std::time::Duration;

use glam::Vec2;
use gridforge_core::{Blueprint, Command, Event, GridPoint, GridSize, Placeable, PlayMode, Preview};
use gridforge_system_camera::{Camera, CameraConfig, Viewport};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerInput {
    /// Frame delta time.
    pub dt: Duration,
    /// Pointer position in window pixels.
    pub pointer: Vec2,
    /// Primary click on the grid view this frame.
    pub place: bool,
    /// Secondary click on the grid view this frame.
    pub remove: bool,
    /// Whether the pan button is held.
    pub pan_held: bool,
    /// Wheel movement this frame; positive zooms in.
    pub wheel: f32,
    /// Directional scroll input in `[-1, 1]` per axis.
    pub scroll: Vec2,
    /// Toggle between world and build mode.
    pub toggle_mode: bool,
    /// Capture the build grid as a blueprint.
    pub extract: bool,
    /// Rotate the selected blueprint.
    pub rotate: bool,
    /// Mirror the selected blueprint left to right.
    pub flip_horizontal: bool,
    /// Mirror the selected blueprint top to bottom.
    pub flip_vertical: bool,
    /// Clear the current selection.
    pub cancel: bool,
    /// Palette entry clicked this frame.
    pub select: Option<usize>,
    /// Current window layout.
    pub viewport: Viewport,
}

impl Default for ControllerInput {
    fn default() -> Self {
        Self {
            dt: Duration::ZERO,
            pointer: Vec2::ZERO,
            place: false,
            remove: false,
            pan_held: false,
            wheel: 0.0,
            scroll: Vec2::ZERO,
            toggle_mode: false,
            extract: false,
            rotate: false,
            flip_horizontal: false,
            flip_vertical: false,
            cancel: false,
            select: None,
            viewport: Viewport::new(0.0, 0.0),
        }
    }
}

/// Ordered list of placeables offered in one mode, plus the selection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Palette {
    entries: Vec<Placeable>,
    selected: Option<usize>,
}

impl Palette {
    /// Creates a palette with nothing selected.
    #[must_use]
    pub fn new(entries: Vec<Placeable>) -> Self {
        Self {
            entries,
            selected: None,
        }
    }

    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[Placeable] {
        &self.entries
    }

    /// Index of the selected entry.
    #[must_use]
    pub const fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The selected entry.
    #[must_use]
    pub fn selected(&self) -> Option<&Placeable> {
        self.selected.and_then(|index| self.entries.get(index))
    }

    /// Selects the entry at `index`; out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.entries.len() {
            self.selected = Some(index);
        }
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Appends an entry.
    pub fn push(&mut self, placeable: Placeable) {
        self.entries.push(placeable);
    }

    fn selected_blueprint_mut(&mut self) -> Option<&mut Blueprint> {
        let index = self.selected?;
        self.entries
            .get_mut(index)
            .and_then(Placeable::as_blueprint_mut)
    }
}

#[derive(Clone, Debug)]
struct ModeView {
    camera: Camera,
    palette: Palette,
}

/// Per-mode interactive surface over the world and build grids.
#[derive(Clone, Debug)]
pub struct GridController {
    mode: PlayMode,
    world: ModeView,
    build: ModeView,
    drag_anchor: Option<Vec2>,
    extracted: u32,
}

impl GridController {
    /// Creates a controller in world mode.
    ///
    /// The world palette usually holds blueprints and the build palette holds
    /// individual components.
    #[must_use]
    pub fn new(
        camera: CameraConfig,
        grid: GridSize,
        viewport: Viewport,
        world_palette: Vec<Placeable>,
        build_palette: Vec<Placeable>,
    ) -> Self {
        Self {
            mode: PlayMode::World,
            world: ModeView {
                camera: Camera::new(camera.clone(), grid, viewport),
                palette: Palette::new(world_palette),
            },
            build: ModeView {
                camera: Camera::new(camera, grid, viewport),
                palette: Palette::new(build_palette),
            },
            drag_anchor: None,
            extracted: 0,
        }
    }

    /// Mode the controller believes the world is in.
    #[must_use]
    pub const fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Camera used for `mode`.
    #[must_use]
    pub fn camera(&self, mode: PlayMode) -> &Camera {
        &self.view(mode).camera
    }

    /// Palette offered in `mode`.
    #[must_use]
    pub fn palette(&self, mode: PlayMode) -> &Palette {
        &self.view(mode).palette
    }

    /// Camera of the active mode.
    #[must_use]
    pub fn active_camera(&self) -> &Camera {
        self.camera(self.mode)
    }

    /// Palette of the active mode.
    #[must_use]
    pub fn active_palette(&self) -> &Palette {
        self.palette(self.mode)
    }

    /// Grid tile under `pointer`, if the pointer is over the grid view.
    #[must_use]
    pub fn hovered(&self, pointer: Vec2) -> Option<GridPoint> {
        let camera = self.active_camera();
        camera
            .in_view(pointer)
            .then(|| camera.screen_to_grid(pointer))
    }

    fn view(&self, mode: PlayMode) -> &ModeView {
        match mode {
            PlayMode::World => &self.world,
            PlayMode::Build => &self.build,
        }
    }

    fn active_view_mut(&mut self) -> &mut ModeView {
        match self.mode {
            PlayMode::World => &mut self.world,
            PlayMode::Build => &mut self.build,
        }
    }

    /// Consumes world events and frame input to emit world commands.
    ///
    /// Work happens in frame order: mode and selection input, camera motion,
    /// the simulation tick, highlight refresh and finally placement.
    pub fn handle(&mut self, events: &[Event], input: &ControllerInput, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::PlayModeChanged { mode } => {
                    self.mode = *mode;
                    self.drag_anchor = None;
                }
                Event::BlueprintExtracted { blueprint } => {
                    self.world.palette.push(Placeable::Blueprint(blueprint.clone()));
                }
                _ => {}
            }
        }

        if input.toggle_mode {
            out.push(Command::SetPlayMode {
                mode: self.mode.toggled(),
            });
        }

        if input.extract && self.mode == PlayMode::Build {
            let name = self.next_blueprint_name();
            out.push(Command::ExtractBlueprint { name });
        }

        self.update_selection(input);
        self.update_camera(input);

        if self.mode.runs_machines() {
            out.push(Command::Tick { dt: input.dt });
        }

        let hover = self.hovered(input.pointer);
        let selected = self.active_palette().selected().cloned();
        out.push(Command::RefreshHighlights {
            mode: self.mode,
            hover,
            preview: hover.zip(selected.clone()).map(|(origin, placeable)| Preview {
                placeable,
                origin,
            }),
        });

        let Some(at) = hover else {
            return;
        };
        if input.place {
            if let Some(placeable) = selected {
                out.push(Command::Place {
                    mode: self.mode,
                    placeable,
                    origin: at,
                });
            }
        }
        if input.remove {
            out.push(Command::Remove {
                mode: self.mode,
                at,
            });
        }
    }

    /// Next "Blueprint N" name not already offered in the world palette.
    ///
    /// Names loaded from disk count as taken, so a new session never reuses
    /// the name of a blueprint saved by an earlier one.
    fn next_blueprint_name(&mut self) -> String {
        loop {
            self.extracted = self.extracted.saturating_add(1);
            let name = format!("Blueprint {}", self.extracted);
            let taken = self
                .world
                .palette
                .entries()
                .iter()
                .any(|entry| entry.name().eq_ignore_ascii_case(&name));
            if !taken || self.extracted == u32::MAX {
                return name;
            }
        }
    }

    fn update_selection(&mut self, input: &ControllerInput) {
        let palette = &mut self.active_view_mut().palette;
        if let Some(index) = input.select {
            palette.select(index);
        }
        if input.cancel {
            palette.clear_selection();
        }
        if let Some(blueprint) = palette.selected_blueprint_mut() {
            if input.rotate {
                blueprint.rotate_90();
            }
            if input.flip_horizontal {
                blueprint.flip_horizontal();
            }
            if input.flip_vertical {
                blueprint.flip_vertical();
            }
        }
    }

    fn update_camera(&mut self, input: &ControllerInput) {
        let drag_from = if input.pan_held {
            self.drag_anchor.replace(input.pointer)
        } else {
            self.drag_anchor = None;
            None
        };

        let camera = &mut self.active_view_mut().camera;
        if camera.viewport() != input.viewport {
            camera.set_viewport(input.viewport);
        }
        camera.accelerate(input.scroll);
        if let Some(previous) = drag_from {
            camera.pan(previous - input.pointer);
        }
        if input.wheel != 0.0 && camera.in_view(input.pointer) {
            let _ = camera.adjust_zoom(input.wheel, input.pointer);
        }
        camera.tick(input.dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridforge_core::{BlueprintPart, ComponentSpec, Footprint, Rgb};

    fn blueprint() -> Placeable {
        Placeable::Blueprint(Blueprint::new(
            "line",
            vec![
                BlueprintPart::new("Belt", GridPoint::new(0, 0)),
                BlueprintPart::new("Belt", GridPoint::new(1, 0)),
            ],
        ))
    }

    #[test]
    fn palette_ignores_out_of_range_selection() {
        let mut palette = Palette::new(vec![Placeable::Component(ComponentSpec::new(
            "Belt",
            Rgb::new(1, 1, 1),
            Footprint::UNIT,
        ))]);
        palette.select(3);
        assert_eq!(palette.selected_index(), None);
        palette.select(0);
        assert_eq!(palette.selected_index(), Some(0));
    }

    #[test]
    fn rotate_applies_to_selected_blueprint_only() {
        let mut controller = GridController::new(
            CameraConfig::default(),
            GridSize::new(10, 10),
            Viewport::new(320.0, 320.0),
            vec![blueprint()],
            Vec::new(),
        );
        let mut out = Vec::new();
        let input = ControllerInput {
            rotate: true,
            viewport: Viewport::new(320.0, 320.0),
            ..ControllerInput::default()
        };

        controller.handle(&[], &input, &mut out);
        assert_eq!(controller.active_palette().entries()[0], blueprint());

        controller.handle(
            &[],
            &ControllerInput {
                select: Some(0),
                ..input
            },
            &mut out,
        );
        let Some(Placeable::Blueprint(rotated)) = controller.active_palette().selected() else {
            panic!("blueprint selected");
        };
        let offsets: Vec<GridPoint> = rotated.parts().iter().map(|part| part.offset).collect();
        assert_eq!(offsets, vec![GridPoint::new(0, 0), GridPoint::new(0, 1)]);
    }
}
