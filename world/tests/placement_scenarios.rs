use std::sync::Arc;

use gridforge_core::{
    Blueprint, BlueprintPart, Catalog, Command, ComponentSpec, Event, Footprint, GridPoint,
    GridSize, Placeable, PlacementError, PlayMode, Rgb, TileClass,
};
use gridforge_world::{apply, placement, query, Grid, ResourceLayout, World, WorldConfig};

fn catalog() -> Catalog {
    Catalog::new(
        [
            ComponentSpec::new("Drill", Rgb::new(200, 60, 60), Footprint::UNIT),
            ComponentSpec::new("Block", Rgb::new(60, 200, 60), Footprint::new(2, 2)),
            ComponentSpec::new("Miner", Rgb::new(60, 60, 200), Footprint::UNIT)
                .with_accepted_classes([TileClass::Resource])
                .with_accepted_subtypes(["iron"]),
        ],
        [],
    )
}

fn world() -> World {
    World::new(
        &WorldConfig {
            grid: GridSize::new(20, 20),
            resources: ResourceLayout::default(),
        },
        Arc::new(catalog()),
    )
}

fn component(name: &str) -> Placeable {
    Placeable::Component(
        catalog()
            .component(name)
            .expect("component is defined")
            .clone(),
    )
}

fn blueprint(name: &str, parts: &[(&str, i32, i32)]) -> Placeable {
    Placeable::Blueprint(Blueprint::new(
        name,
        parts
            .iter()
            .map(|(component, x, y)| BlueprintPart::new(*component, GridPoint::new(*x, *y)))
            .collect(),
    ))
}

fn occupancy(grid: &Grid) -> Vec<bool> {
    grid.tiles().map(|(_, tile)| tile.is_occupied()).collect()
}

#[test]
fn drill_occupies_clear_basic_tile() {
    let mut world = world();
    let drill = component("Drill");
    let origin = GridPoint::new(5, 5);

    // (5,5) carries iron by default; use the build grid for a basic tile.
    assert!(query::can_place(&world, PlayMode::Build, &drill, origin));

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::Place {
            mode: PlayMode::Build,
            placeable: drill,
            origin,
        },
        &mut events,
    );

    assert!(matches!(events.as_slice(), [Event::Placed { .. }]), "{events:?}");
    let tile = query::tile_at(&world, PlayMode::Build, origin).expect("in bounds");
    assert!(tile.is_occupied());
    let occupant = query::occupant_at(&world, PlayMode::Build, origin).expect("occupied");
    assert_eq!(occupant.name(), "Drill");
}

#[test]
fn second_drill_on_same_tile_is_rejected() {
    let mut world = world();
    let origin = GridPoint::new(2, 3);
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::Place {
            mode: PlayMode::World,
            placeable: component("Drill"),
            origin,
        },
        &mut events,
    );
    let before = occupancy(query::grid(&world, PlayMode::World));

    assert!(!query::can_place(
        &world,
        PlayMode::World,
        &component("Drill"),
        origin
    ));
    events.clear();
    apply(
        &mut world,
        Command::Place {
            mode: PlayMode::World,
            placeable: component("Drill"),
            origin,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::PlacementRejected {
            mode: PlayMode::World,
            origin,
            reason: PlacementError::Occupied,
        }]
    );
    assert_eq!(occupancy(query::grid(&world, PlayMode::World)), before);
}

#[test]
fn blueprint_blocked_by_one_tile_changes_nothing() {
    let mut world = world();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::Place {
            mode: PlayMode::World,
            placeable: component("Drill"),
            origin: GridPoint::new(11, 11),
        },
        &mut events,
    );
    let square = blueprint(
        "square",
        &[("Drill", 0, 0), ("Drill", 1, 0), ("Drill", 0, 1), ("Drill", 1, 1)],
    );
    let before = occupancy(query::grid(&world, PlayMode::World));

    events.clear();
    apply(
        &mut world,
        Command::Place {
            mode: PlayMode::World,
            placeable: square,
            origin: GridPoint::new(10, 10),
        },
        &mut events,
    );

    assert!(matches!(
        events.as_slice(),
        [Event::PlacementRejected {
            reason: PlacementError::Occupied,
            ..
        }]
    ));
    for (x, y) in [(10, 10), (11, 10), (10, 11)] {
        let tile = query::tile_at(&world, PlayMode::World, GridPoint::new(x, y)).expect("in bounds");
        assert!(tile.is_clear(), "tile ({x},{y}) must stay clear");
    }
    assert_eq!(occupancy(query::grid(&world, PlayMode::World)), before);
}

#[test]
fn blueprint_with_one_part_on_wrong_terrain_changes_nothing() {
    let mut world = world();
    // Miner (0,0) lands on iron at (5,5); Miner (1,0) lands on basic (6,5).
    let mining_row = blueprint(
        "mining row",
        &[("Miner", 0, 0), ("Drill", 0, 1), ("Miner", 1, 0)],
    );
    let origin = GridPoint::new(5, 5);
    assert!(!query::can_place(&world, PlayMode::World, &mining_row, origin));
    let before = occupancy(query::grid(&world, PlayMode::World));

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::Place {
            mode: PlayMode::World,
            placeable: mining_row,
            origin,
        },
        &mut events,
    );

    assert!(
        matches!(
            events.as_slice(),
            [Event::PlacementRejected {
                reason: PlacementError::UnacceptedTerrain,
                ..
            }]
        ),
        "{events:?}"
    );
    for (x, y) in [(5, 5), (5, 6), (6, 5)] {
        let tile = query::tile_at(&world, PlayMode::World, GridPoint::new(x, y)).expect("in bounds");
        assert!(tile.is_clear(), "tile ({x},{y}) must stay clear");
    }
    assert_eq!(occupancy(query::grid(&world, PlayMode::World)), before);
    assert_eq!(query::grid(&world, PlayMode::World).instances().count(), 0);
}

#[test]
fn removing_any_tile_of_a_blueprint_clears_the_whole_group() {
    let layout = blueprint(
        "three-by-two",
        &[
            ("Drill", 0, 0),
            ("Drill", 1, 0),
            ("Drill", 2, 0),
            ("Drill", 0, 1),
            ("Drill", 1, 1),
            ("Drill", 2, 1),
        ],
    );

    for (dx, dy) in [(0, 0), (2, 0), (1, 1), (2, 1)] {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Place {
                mode: PlayMode::World,
                placeable: component("Drill"),
                origin: GridPoint::new(0, 0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Place {
                mode: PlayMode::World,
                placeable: layout.clone(),
                origin: GridPoint::new(8, 12),
            },
            &mut events,
        );
        assert_eq!(query::grid(&world, PlayMode::World).occupied_tile_count(), 7);

        events.clear();
        apply(
            &mut world,
            Command::Remove {
                mode: PlayMode::World,
                at: GridPoint::new(8 + dx, 12 + dy),
            },
            &mut events,
        );

        match events.as_slice() {
            [Event::Removed {
                instances, tiles, ..
            }] => {
                assert_eq!(instances.len(), 6);
                assert_eq!(tiles.len(), 6);
            }
            other => panic!("unexpected events {other:?}"),
        }
        let grid = query::grid(&world, PlayMode::World);
        assert_eq!(grid.occupied_tile_count(), 1, "only the lone drill remains");
        assert!(grid.tile_at(GridPoint::new(0, 0)).is_some_and(|t| t.is_occupied()));
    }
}

#[test]
fn multi_tile_component_is_removed_from_any_covered_tile() {
    let mut world = world();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::Place {
            mode: PlayMode::Build,
            placeable: component("Block"),
            origin: GridPoint::new(4, 4),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::Remove {
            mode: PlayMode::Build,
            at: GridPoint::new(4, 4),
        },
        &mut events,
    );

    assert_eq!(query::grid(&world, PlayMode::Build).occupied_tile_count(), 0);
}

#[test]
fn world_terrain_is_strict_while_build_grid_is_not() {
    let world = world();
    let miner = component("Miner");

    assert!(query::can_place(&world, PlayMode::World, &miner, GridPoint::new(5, 5)));
    assert!(!query::can_place(&world, PlayMode::World, &miner, GridPoint::new(7, 6)));
    assert!(!query::can_place(&world, PlayMode::World, &miner, GridPoint::new(0, 0)));
    assert!(query::can_place(&world, PlayMode::Build, &miner, GridPoint::new(0, 0)));
}

#[test]
fn placing_the_same_template_twice_yields_independent_instances() {
    let catalog = catalog();
    let mut grid = Grid::new(GridSize::new(6, 6));
    let drill = component("Drill");

    let first = placement::place(&mut grid, &catalog, PlayMode::Build, &drill, GridPoint::new(0, 0))
        .expect("first fits");
    let second = placement::place(&mut grid, &catalog, PlayMode::Build, &drill, GridPoint::new(1, 0))
        .expect("second fits");
    assert_ne!(first.instances, second.instances);

    let _ = placement::remove(&mut grid, GridPoint::new(0, 0)).expect("occupied");
    assert!(grid.occupant_at(GridPoint::new(1, 0)).is_some());
    assert!(grid.occupant_at(GridPoint::new(0, 0)).is_none());
}

#[test]
fn extraction_is_relative_to_the_first_component() {
    let catalog = catalog();
    let mut grid = Grid::new(GridSize::new(10, 10));
    for (x, y) in [(3, 4), (5, 4), (3, 6)] {
        let _ = placement::place(
            &mut grid,
            &catalog,
            PlayMode::Build,
            &component("Drill"),
            GridPoint::new(x, y),
        )
        .expect("drill fits");
    }

    let extracted = placement::extract_blueprint(&grid, "triple").expect("non-empty");
    let offsets: Vec<GridPoint> = extracted.parts().iter().map(|part| part.offset).collect();
    assert_eq!(
        offsets,
        vec![
            GridPoint::new(0, 0),
            GridPoint::new(2, 0),
            GridPoint::new(0, 2)
        ]
    );
}
