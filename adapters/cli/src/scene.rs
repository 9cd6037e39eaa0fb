//! Per-frame translation of world and controller state into a [`Scene`].

use glam::Vec2;
use gridforge_core::{Catalog, ComponentSpec, GridPoint, Placeable, Rgb};
use gridforge_rendering::{
    occupant_inset, tile_fill, Color, GhostPresentation, OccupantPresentation,
    PaletteEntryPresentation, Scene, TilePresentation,
};
use gridforge_system_controller::GridController;
use gridforge_world::{placement, query, World};

/// Number of lines shown in the top bar.
pub(crate) const DEBUG_LINE_COUNT: usize = 6;

/// Rebuilds `scene` from the current world and controller state.
pub(crate) fn populate(
    scene: &mut Scene,
    world: &World,
    controller: &GridController,
    pointer: Vec2,
    screen: Vec2,
) {
    scene.clear();
    scene.play_mode = controller.mode();

    let mode = controller.mode();
    let camera = controller.active_camera();
    let grid = query::grid(world, mode);
    let inset = occupant_inset(camera.zoom());

    for coord in camera.visible_tiles().iter() {
        let Some(tile) = grid.tile(coord) else {
            continue;
        };
        let rect = camera.tile_screen_rect(GridPoint::from(coord));
        let occupant = tile
            .occupant()
            .and_then(|id| grid.instance(id))
            .map(|instance| OccupantPresentation {
                rect: rect.inset(inset),
                color: Color::from(instance.color()),
            });
        scene.tiles.push(TilePresentation {
            rect,
            fill: Color::from(tile_fill(tile.terrain(), tile.is_occupied(), tile.highlight())),
            occupant,
        });
    }

    let catalog = query::catalog(world);
    let palette = controller.active_palette();
    let hovered = controller.hovered(pointer);
    if let Some((origin, placeable)) = hovered.zip(palette.selected()) {
        push_ghosts(scene, world, controller, placeable, origin);
    }

    for (index, placeable) in palette.entries().iter().enumerate() {
        scene.palette.push(PaletteEntryPresentation {
            label: placeable.name().to_owned(),
            color: Color::from(swatch(catalog, placeable)),
            rect: scene.hud.palette_button(screen, index),
            selected: palette.selected_index() == Some(index),
        });
    }

    let tile_description = hovered
        .and_then(|point| query::tile_at(world, mode, point).map(|tile| (point, tile)))
        .map_or_else(
            || "-".to_owned(),
            |(point, tile)| match query::occupant_at(world, mode, point) {
                Some(instance) => format!("{} [{}]", tile.terrain().describe(), instance.name()),
                None => tile.terrain().describe(),
            },
        );
    let grid_pointer = hovered.map_or_else(
        || "-".to_owned(),
        |point| format!("({}, {})", point.x(), point.y()),
    );
    let position = camera.position();

    scene.debug_lines.extend([
        format!("Mode: {}  Tick: {}", mode.label(), query::tick_index(world)),
        format!("Zoom: {:.2}x", camera.zoom()),
        format!("Screen: ({:.0}, {:.0})", pointer.x, pointer.y),
        format!("Grid: {grid_pointer}"),
        format!("Tile: {tile_description}"),
        format!("Camera: ({:.0}, {:.0})", position.x, position.y),
    ]);
}

fn push_ghosts(
    scene: &mut Scene,
    world: &World,
    controller: &GridController,
    placeable: &Placeable,
    origin: GridPoint,
) {
    let mode = controller.mode();
    let camera = controller.active_camera();
    let catalog = query::catalog(world);
    let Ok(verdicts) = placement::preview(
        query::grid(world, mode),
        catalog,
        mode,
        placeable,
        origin,
    ) else {
        return;
    };

    let parts: Vec<(Rgb, GridPoint, GridPoint)> = match placeable {
        Placeable::Component(spec) => vec![(spec.color(), origin, footprint_end(origin, spec))],
        Placeable::Blueprint(blueprint) => blueprint
            .parts()
            .iter()
            .map(|part| {
                let spec = catalog.component_or_fallback(&part.component);
                let anchor = origin.offset(part.offset);
                (spec.color(), anchor, footprint_end(anchor, &spec))
            })
            .collect(),
    };

    for verdict in verdicts {
        let color = parts
            .iter()
            .find(|(_, start, end)| within(verdict.point, *start, *end))
            .map_or(Rgb::new(100, 100, 100), |(color, _, _)| *color);
        scene.ghosts.push(GhostPresentation {
            rect: camera.tile_screen_rect(verdict.point),
            color: Color::from(color),
            valid: verdict.rejection.is_none(),
        });
    }
}

/// Exclusive lower-right corner of a component anchored at `anchor`.
fn footprint_end(anchor: GridPoint, spec: &ComponentSpec) -> GridPoint {
    let footprint = spec.footprint();
    GridPoint::new(
        anchor.x().saturating_add_unsigned(footprint.width()),
        anchor.y().saturating_add_unsigned(footprint.height()),
    )
}

fn within(point: GridPoint, start: GridPoint, end: GridPoint) -> bool {
    (start.x()..end.x()).contains(&point.x()) && (start.y()..end.y()).contains(&point.y())
}

/// Palette swatch: the component color, or the first part's for blueprints.
fn swatch(catalog: &Catalog, placeable: &Placeable) -> Rgb {
    match placeable {
        Placeable::Component(spec) => spec.color(),
        Placeable::Blueprint(blueprint) => blueprint
            .parts()
            .first()
            .map_or(Rgb::new(100, 100, 100), |part| {
                catalog.component_or_fallback(&part.component).color()
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridforge_core::{
        Blueprint, BlueprintPart, Command, Footprint, GridSize, PlayMode,
    };
    use gridforge_rendering::{HudLayout, BUILDABLE_FILL, OCCUPIED_FILL};
    use gridforge_system_camera::{CameraConfig, Viewport};
    use gridforge_world::{apply, ResourceLayout, WorldConfig};
    use std::sync::Arc;

    const SCREEN: Vec2 = Vec2::new(320.0, 400.0);

    fn drill() -> ComponentSpec {
        ComponentSpec::new("Drill", Rgb::new(200, 50, 50), Footprint::UNIT)
    }

    fn fixture() -> (World, GridController, Scene) {
        let catalog = Arc::new(Catalog::new(vec![drill()], Vec::new()));
        let config = WorldConfig {
            grid: GridSize::new(20, 20),
            resources: ResourceLayout {
                deposits: Vec::new(),
                scatter: None,
            },
        };
        let world = World::new(&config, catalog);
        let hud = HudLayout::for_debug_lines(DEBUG_LINE_COUNT);
        let viewport = Viewport::new(SCREEN.x, SCREEN.y)
            .with_offsets(hud.top_height(), hud.bottom_height());
        let pair = Blueprint::new(
            "Pair",
            vec![
                BlueprintPart::new("Drill", GridPoint::new(0, 0)),
                BlueprintPart::new("Mystery", GridPoint::new(1, 0)),
            ],
        );
        let controller = GridController::new(
            CameraConfig::default(),
            config.grid,
            viewport,
            vec![Placeable::Blueprint(pair)],
            vec![Placeable::Component(drill())],
        );
        (world, controller, Scene::new(PlayMode::World, hud))
    }

    fn pointer_at(scene: &Scene, x: i32, y: i32) -> Vec2 {
        Vec2::new(
            x as f32 * 32.0 + 3.0,
            y as f32 * 32.0 + scene.hud.top_height() + 3.0,
        )
    }

    #[test]
    fn visible_tiles_cover_the_grid_view() {
        let (world, controller, mut scene) = fixture();
        populate(&mut scene, &world, &controller, Vec2::ZERO, SCREEN);

        // 320 px wide, 400 - 130 - 120 = 150 px tall at 32 px per tile.
        assert_eq!(scene.tiles.len(), 10 * 5);
        assert_eq!(scene.tiles[0].rect.y, scene.hud.top_height());
        assert_eq!(scene.debug_lines.len(), DEBUG_LINE_COUNT);
        assert_eq!(scene.debug_lines[0], "Mode: WORLD  Tick: 0");
        assert_eq!(scene.debug_lines[3], "Grid: -", "pointer over the HUD");
    }

    #[test]
    fn occupants_are_inset_by_zoom() {
        let (mut world, controller, mut scene) = fixture();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Place {
                mode: PlayMode::World,
                placeable: Placeable::Component(ComponentSpec::new(
                    "Belt",
                    Rgb::new(90, 90, 90),
                    Footprint::UNIT,
                )),
                origin: GridPoint::new(0, 0),
            },
            &mut events,
        );

        let pointer = pointer_at(&scene, 0, 0);
        populate(&mut scene, &world, &controller, pointer, SCREEN);

        let tile = scene.tiles[0];
        assert_eq!(tile.fill, Color::from(OCCUPIED_FILL));
        let occupant = tile.occupant.expect("placed belt is drawn");
        assert_eq!(occupant.rect, tile.rect.inset(4.0));
        assert_eq!(occupant.color, Color::from(Rgb::new(90, 90, 90)));
        assert_eq!(scene.debug_lines[4], "Tile: basic [Belt]");
    }

    #[test]
    fn selection_produces_ghosts_and_palette_state() {
        let (mut world, mut controller, mut scene) = fixture();
        let mut commands = Vec::new();
        let pointer = pointer_at(&scene, 2, 1);
        controller.handle(
            &[],
            &gridforge_system_controller::ControllerInput {
                select: Some(0),
                pointer,
                viewport: controller.active_camera().viewport(),
                ..Default::default()
            },
            &mut commands,
        );
        let mut events = Vec::new();
        for command in commands {
            apply(&mut world, command, &mut events);
        }

        populate(&mut scene, &world, &controller, pointer, SCREEN);

        assert_eq!(scene.ghosts.len(), 2);
        assert_eq!(scene.ghosts[0].color, Color::from(Rgb::new(200, 50, 50)));
        assert_eq!(
            scene.ghosts[1].color,
            Color::from(Rgb::new(100, 100, 100)),
            "unknown components render with the fallback color",
        );
        assert!(scene.ghosts.iter().all(|ghost| ghost.valid));

        assert_eq!(scene.palette.len(), 1);
        assert!(scene.palette[0].selected);
        assert_eq!(scene.palette[0].label, "Pair");

        let highlighted = scene
            .tiles
            .iter()
            .filter(|tile| tile.fill == Color::from(BUILDABLE_FILL))
            .count();
        assert_eq!(highlighted, 2, "preview highlights reach the scene");
    }
}
