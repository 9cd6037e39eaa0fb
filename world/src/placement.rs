//! Placement engine: validation, instantiation, removal and extraction.
//!
//! Every operation takes the grid it works on and the play mode whose
//! capabilities apply, so the world grid and the build grid share one
//! implementation. Placement is all-or-nothing: the whole footprint is
//! validated before a single tile is touched.

use std::{borrow::Cow, collections::BTreeSet};

use gridforge_core::{
    Blueprint, BlueprintPart, Catalog, ComponentSpec, GridPoint, InstanceId, Placeable, Placement,
    PlacementError, PlayMode, RemovalError, TileCoord,
};

use crate::{
    grid::{Grid, InstanceDraft},
    machine::Machine,
};

/// One component of a placement resolved against the catalog.
#[derive(Clone, Debug)]
struct PlannedPart<'a> {
    spec: Cow<'a, ComponentSpec>,
    anchor: GridPoint,
}

impl PlannedPart<'_> {
    fn cells(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.spec
            .footprint()
            .offsets()
            .map(move |offset| self.anchor.offset(offset))
    }
}

/// Result of evaluating a single footprint cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellVerdict {
    /// Grid point covered by the footprint.
    pub point: GridPoint,
    /// Why the cell blocks placement, `None` when it is fine.
    pub rejection: Option<PlacementError>,
}

/// Removal summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Removal {
    /// Instances that were destroyed.
    pub instances: Vec<InstanceId>,
    /// Tiles that became clear.
    pub tiles: Vec<TileCoord>,
}

fn plan<'a>(
    catalog: &'a Catalog,
    mode: PlayMode,
    placeable: &'a Placeable,
    origin: GridPoint,
) -> Result<Vec<PlannedPart<'a>>, PlacementError> {
    match placeable {
        Placeable::Component(spec) => Ok(vec![PlannedPart {
            spec: Cow::Borrowed(spec),
            anchor: origin,
        }]),
        Placeable::Blueprint(blueprint) => {
            if !mode.accepts_blueprints() {
                return Err(PlacementError::UnsupportedInMode);
            }
            if blueprint.is_empty() {
                return Err(PlacementError::EmptyBlueprint);
            }
            Ok(blueprint
                .parts()
                .iter()
                .map(|part| PlannedPart {
                    spec: catalog.component_or_fallback(&part.component),
                    anchor: origin.offset(part.offset),
                })
                .collect())
        }
    }
}

fn verdict(
    grid: &Grid,
    mode: PlayMode,
    spec: &ComponentSpec,
    point: GridPoint,
    claimed: &mut BTreeSet<TileCoord>,
) -> Option<PlacementError> {
    let Some((coord, tile)) = grid
        .resolve(point)
        .and_then(|coord| grid.tile(coord).map(|tile| (coord, tile)))
    else {
        return Some(PlacementError::OutOfBounds);
    };
    if !tile.is_clear() {
        return Some(PlacementError::Occupied);
    }
    if !tile.is_placeable_by(spec, mode.strict_terrain()) {
        return Some(PlacementError::UnacceptedTerrain);
    }
    if !claimed.insert(coord) {
        return Some(PlacementError::Overlapping);
    }
    None
}

/// Evaluates every footprint cell of a placement without mutating the grid.
///
/// Used for preview highlighting; cells are reported in part order.
pub fn preview(
    grid: &Grid,
    catalog: &Catalog,
    mode: PlayMode,
    placeable: &Placeable,
    origin: GridPoint,
) -> Result<Vec<CellVerdict>, PlacementError> {
    let parts = plan(catalog, mode, placeable, origin)?;
    let mut claimed = BTreeSet::new();
    Ok(parts
        .iter()
        .flat_map(|part| part.cells().map(move |point| (part, point)))
        .map(|(part, point)| CellVerdict {
            point,
            rejection: verdict(grid, mode, &part.spec, point, &mut claimed),
        })
        .collect())
}

/// Validates a placement, reporting the first blocking reason.
pub fn check(
    grid: &Grid,
    catalog: &Catalog,
    mode: PlayMode,
    placeable: &Placeable,
    origin: GridPoint,
) -> Result<(), PlacementError> {
    let parts = plan(catalog, mode, placeable, origin)?;
    let mut claimed = BTreeSet::new();
    for part in &parts {
        for point in part.cells() {
            if let Some(reason) = verdict(grid, mode, &part.spec, point, &mut claimed) {
                return Err(reason);
            }
        }
    }
    Ok(())
}

/// Whether `placeable` fits at `origin`.
#[must_use]
pub fn can_place(
    grid: &Grid,
    catalog: &Catalog,
    mode: PlayMode,
    placeable: &Placeable,
    origin: GridPoint,
) -> bool {
    check(grid, catalog, mode, placeable, origin).is_ok()
}

/// Places `placeable` at `origin`, creating fresh instances.
///
/// Blueprints create one instance per part, all sharing a new group id. In
/// modes that run machines, instances whose name has a recipe get one.
pub fn place(
    grid: &mut Grid,
    catalog: &Catalog,
    mode: PlayMode,
    placeable: &Placeable,
    origin: GridPoint,
) -> Result<Placement, PlacementError> {
    check(grid, catalog, mode, placeable, origin)?;
    let parts = plan(catalog, mode, placeable, origin)?;

    let group = matches!(placeable, Placeable::Blueprint(_)).then(|| grid.allocate_group());
    let mut placement = Placement {
        group,
        instances: Vec::with_capacity(parts.len()),
        tiles: Vec::new(),
    };

    for part in &parts {
        let tiles: Vec<TileCoord> = part
            .cells()
            .filter_map(|point| grid.resolve(point))
            .collect();
        let Some(anchor) = grid.resolve(part.anchor) else {
            continue;
        };
        let machine = mode
            .runs_machines()
            .then(|| catalog.recipe(part.spec.name()))
            .flatten()
            .map(|recipe| Machine::new(part.spec.name(), recipe.clone()));

        let draft = InstanceDraft {
            name: part.spec.name().to_owned(),
            color: part.spec.color(),
            footprint: part.spec.footprint(),
            anchor,
            group,
            machine,
        };
        placement.instances.push(grid.insert(draft, &tiles));
        placement.tiles.extend(tiles);
    }

    Ok(placement)
}

/// Removes whatever occupies `at`, including every member of its blueprint group.
pub fn remove(grid: &mut Grid, at: GridPoint) -> Result<Removal, RemovalError> {
    let coord = grid.resolve(at).ok_or(RemovalError::OutOfBounds)?;
    let occupant = grid
        .tile(coord)
        .and_then(|tile| tile.occupant())
        .ok_or(RemovalError::Vacant)?;

    let instances: Vec<InstanceId> = match grid.instance(occupant).and_then(|i| i.group()) {
        Some(group) => grid
            .instances()
            .filter(|instance| instance.group() == Some(group))
            .map(|instance| instance.id())
            .collect(),
        None => vec![occupant],
    };

    let tiles = grid.evict(&instances);
    Ok(Removal { instances, tiles })
}

/// Removes every instance from the grid.
pub fn clear(grid: &mut Grid) -> Vec<InstanceId> {
    let instances: Vec<InstanceId> = grid.instances().map(|instance| instance.id()).collect();
    let _ = grid.evict(&instances);
    instances
}

/// Captures the grid's instances as a blueprint.
///
/// Each instance contributes one part at its anchor tile, in row-major order
/// of first appearance, and the result is normalized to the first part.
/// Returns `None` when the grid is empty.
#[must_use]
pub fn extract_blueprint(grid: &Grid, name: &str) -> Option<Blueprint> {
    let mut seen = BTreeSet::new();
    let mut parts = Vec::new();
    for (_, tile) in grid.tiles() {
        let Some(id) = tile.occupant() else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        if let Some(instance) = grid.instance(id) {
            parts.push(BlueprintPart::new(
                instance.name(),
                GridPoint::from(instance.anchor()),
            ));
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(Blueprint::new(name, parts).normalized())
}
