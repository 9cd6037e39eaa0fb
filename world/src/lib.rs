#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Gridforge.
//!
//! The world owns two grids, the resource-bearing world grid and the free-form
//! build grid, together with the shared catalog. Every mutation goes through
//! [`apply`]; adapters and systems observe state through [`query`].

mod generation;
mod grid;
mod machine;
pub mod placement;
mod tile;

use std::{sync::Arc, time::Duration};

use gridforge_core::{
    Catalog, Command, Event, GridPoint, GridSize, Highlight, InstanceId, PlayMode, Preview,
    StockError, WELCOME_BANNER,
};
use serde::Deserialize;

pub use generation::{Deposit, ResourceLayout, Scatter};
pub use grid::{Grid, PlacedInstance};
pub use machine::{Inventory, Machine};
pub use tile::Tile;

const DEFAULT_GRID_COLUMNS: u32 = 100;
const DEFAULT_GRID_ROWS: u32 = 100;

/// Parameters used to generate a fresh world.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Dimensions shared by the world and build grids.
    pub grid: GridSize,
    /// Resource deposits applied to the world grid.
    pub resources: ResourceLayout,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS),
            resources: ResourceLayout::default(),
        }
    }
}

/// Represents the authoritative Gridforge world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    mode: PlayMode,
    world_grid: Grid,
    build_grid: Grid,
    catalog: Arc<Catalog>,
    tick_index: u64,
}

impl World {
    /// Creates a world in world mode with freshly generated grids.
    #[must_use]
    pub fn new(config: &WorldConfig, catalog: Arc<Catalog>) -> Self {
        Self {
            banner: WELCOME_BANNER,
            mode: PlayMode::World,
            world_grid: config.resources.generate(config.grid),
            build_grid: Grid::new(config.grid),
            catalog,
            tick_index: 0,
        }
    }

    fn grid(&self, mode: PlayMode) -> &Grid {
        match mode {
            PlayMode::World => &self.world_grid,
            PlayMode::Build => &self.build_grid,
        }
    }

    fn grid_mut(&mut self, mode: PlayMode) -> &mut Grid {
        match mode {
            PlayMode::World => &mut self.world_grid,
            PlayMode::Build => &mut self.build_grid,
        }
    }

    fn refresh_highlights(
        &mut self,
        mode: PlayMode,
        hover: Option<GridPoint>,
        preview: Option<Preview>,
    ) {
        let cells = preview.and_then(|preview| {
            placement::preview(
                self.grid(mode),
                &self.catalog,
                mode,
                &preview.placeable,
                preview.origin,
            )
            .ok()
        });

        let grid = self.grid_mut(mode);
        grid.clear_highlights();

        if let Some(coord) = hover.and_then(|point| grid.resolve(point)) {
            grid.set_highlight(coord, Highlight::Hover);
        }

        for cell in cells.into_iter().flatten() {
            let Some(coord) = grid.resolve(cell.point) else {
                continue;
            };
            let highlight = if cell.rejection.is_none() {
                Highlight::Buildable
            } else {
                Highlight::Invalid
            };
            grid.set_highlight(coord, highlight);
        }
    }

    fn run_machines(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for instance in self.world_grid.instances_mut() {
            let id = instance.id();
            let Some(machine) = instance.machine_mut() else {
                continue;
            };
            if machine.update(dt) {
                tracing::debug!(instance = id.get(), recipe = machine.recipe_name(), "recipe completed");
                out_events.push(Event::RecipeCompleted {
                    instance: id,
                    recipe: machine.recipe_name().to_owned(),
                });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetPlayMode { mode } => {
            if world.mode != mode {
                world.mode = mode;
                tracing::debug!(mode = mode.label(), "play mode changed");
                out_events.push(Event::PlayModeChanged { mode });
            }
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.run_machines(dt, out_events);
        }
        Command::Place {
            mode,
            placeable,
            origin,
        } => {
            let catalog = Arc::clone(&world.catalog);
            match placement::place(world.grid_mut(mode), &catalog, mode, &placeable, origin) {
                Ok(placement) => {
                    tracing::debug!(
                        mode = mode.label(),
                        name = placeable.name(),
                        instances = placement.instances.len(),
                        "placed"
                    );
                    out_events.push(Event::Placed { mode, placement });
                }
                Err(reason) => {
                    tracing::debug!(mode = mode.label(), name = placeable.name(), %reason, "placement rejected");
                    out_events.push(Event::PlacementRejected {
                        mode,
                        origin,
                        reason,
                    });
                }
            }
        }
        Command::Remove { mode, at } => match placement::remove(world.grid_mut(mode), at) {
            Ok(removal) => out_events.push(Event::Removed {
                mode,
                instances: removal.instances,
                tiles: removal.tiles,
            }),
            Err(reason) => out_events.push(Event::RemovalRejected { mode, at, reason }),
        },
        Command::RefreshHighlights {
            mode,
            hover,
            preview,
        } => world.refresh_highlights(mode, hover, preview),
        Command::Stock { at, item, amount } => {
            let outcome = stock(&mut world.world_grid, at, &item, amount);
            match outcome {
                Ok(instance) => out_events.push(Event::Stocked {
                    instance,
                    item,
                    amount,
                }),
                Err(reason) => out_events.push(Event::StockRejected { at, reason }),
            }
        }
        Command::ExtractBlueprint { name } => {
            match placement::extract_blueprint(&world.build_grid, &name) {
                Some(blueprint) => {
                    tracing::info!(
                        name = blueprint.name(),
                        parts = blueprint.parts().len(),
                        "blueprint extracted"
                    );
                    out_events.push(Event::BlueprintExtracted { blueprint });
                }
                None => out_events.push(Event::ExtractionRejected { name }),
            }
        }
        Command::ClearBuildGrid => {
            let instances = placement::clear(&mut world.build_grid);
            out_events.push(Event::BuildGridCleared { instances });
        }
    }
}

fn stock(
    grid: &mut Grid,
    at: GridPoint,
    item: &str,
    amount: u32,
) -> Result<InstanceId, StockError> {
    let coord = grid.resolve(at).ok_or(StockError::OutOfBounds)?;
    let id = grid
        .tile(coord)
        .and_then(Tile::occupant)
        .ok_or(StockError::Vacant)?;
    let machine = grid
        .instance_mut(id)
        .and_then(PlacedInstance::machine_mut)
        .ok_or(StockError::NoMachine)?;
    machine.stock(item, amount);
    Ok(id)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gridforge_core::{Catalog, GridPoint, Placeable, PlayMode};

    use super::{placement, Grid, PlacedInstance, Tile, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Mode the world is currently in.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.mode
    }

    /// Grid that backs the provided mode.
    #[must_use]
    pub fn grid(world: &World, mode: PlayMode) -> &Grid {
        world.grid(mode)
    }

    /// Shared component and recipe catalog.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Tile at `point` on the mode's grid.
    #[must_use]
    pub fn tile_at(world: &World, mode: PlayMode, point: GridPoint) -> Option<&Tile> {
        world.grid(mode).tile_at(point)
    }

    /// Instance occupying `point` on the mode's grid.
    #[must_use]
    pub fn occupant_at(world: &World, mode: PlayMode, point: GridPoint) -> Option<&PlacedInstance> {
        world.grid(mode).occupant_at(point)
    }

    /// Whether `placeable` would fit at `origin` on the mode's grid.
    #[must_use]
    pub fn can_place(world: &World, mode: PlayMode, placeable: &Placeable, origin: GridPoint) -> bool {
        placement::can_place(world.grid(mode), &world.catalog, mode, placeable, origin)
    }
}
