//! Tile storage plus the registry of instances placed on it.

use std::collections::BTreeMap;

use gridforge_core::{
    Footprint, GridPoint, GridSize, GroupId, Highlight, InstanceId, Rgb, Terrain, TileCoord,
};

use crate::{machine::Machine, tile::Tile};

/// A building or component that has been placed onto a grid.
///
/// Instances are owned by the grid's registry and referenced from tiles by id;
/// removing an instance clears every tile that references it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedInstance {
    id: InstanceId,
    name: String,
    color: Rgb,
    footprint: Footprint,
    anchor: TileCoord,
    group: Option<GroupId>,
    machine: Option<Machine>,
}

impl PlacedInstance {
    /// Identifier allocated by the grid.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Name of the template the instance was created from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fill color of the instance.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Size of the instance in tiles.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// Upper-left tile of the instance.
    #[must_use]
    pub const fn anchor(&self) -> TileCoord {
        self.anchor
    }

    /// Blueprint placement this instance belongs to, if any.
    #[must_use]
    pub const fn group(&self) -> Option<GroupId> {
        self.group
    }

    /// Recipe runtime, present for world buildings with a known recipe.
    #[must_use]
    pub fn machine(&self) -> Option<&Machine> {
        self.machine.as_ref()
    }

    pub(crate) fn machine_mut(&mut self) -> Option<&mut Machine> {
        self.machine.as_mut()
    }
}

/// Everything needed to register a new instance.
#[derive(Debug)]
pub(crate) struct InstanceDraft {
    pub(crate) name: String,
    pub(crate) color: Rgb,
    pub(crate) footprint: Footprint,
    pub(crate) anchor: TileCoord,
    pub(crate) group: Option<GroupId>,
    pub(crate) machine: Option<Machine>,
}

/// Fixed-size tile array with its instance registry.
#[derive(Clone, Debug)]
pub struct Grid {
    size: GridSize,
    tiles: Vec<Tile>,
    instances: BTreeMap<InstanceId, PlacedInstance>,
    next_instance_id: InstanceId,
    next_group_id: GroupId,
}

impl Grid {
    /// Creates a grid of plain basic tiles.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self::with_terrain(size, |_| Terrain::basic())
    }

    /// Creates a grid whose terrain is produced by `terrain_at` for every coordinate.
    #[must_use]
    pub fn with_terrain<F>(size: GridSize, mut terrain_at: F) -> Self
    where
        F: FnMut(TileCoord) -> Terrain,
    {
        let tiles = size.coords().map(|coord| Tile::new(terrain_at(coord))).collect();
        Self {
            size,
            tiles,
            instances: BTreeMap::new(),
            next_instance_id: InstanceId::new(0),
            next_group_id: GroupId::new(0),
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Validates a signed point against the grid bounds.
    #[must_use]
    pub fn resolve(&self, point: GridPoint) -> Option<TileCoord> {
        self.size.contains(point)
    }

    /// Tile at a validated coordinate.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.size.index(coord).and_then(|index| self.tiles.get(index))
    }

    /// Tile at a signed point, `None` when out of bounds.
    #[must_use]
    pub fn tile_at(&self, point: GridPoint) -> Option<&Tile> {
        self.resolve(point).and_then(|coord| self.tile(coord))
    }

    /// Iterates every tile with its coordinate in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &Tile)> {
        self.size.coords().zip(self.tiles.iter())
    }

    /// Looks up a placed instance.
    #[must_use]
    pub fn instance(&self, id: InstanceId) -> Option<&PlacedInstance> {
        self.instances.get(&id)
    }

    /// Instance occupying the tile at `point`, if any.
    #[must_use]
    pub fn occupant_at(&self, point: GridPoint) -> Option<&PlacedInstance> {
        self.tile_at(point)
            .and_then(Tile::occupant)
            .and_then(|id| self.instance(id))
    }

    /// Iterates placed instances in identifier order.
    pub fn instances(&self) -> impl Iterator<Item = &PlacedInstance> {
        self.instances.values()
    }

    /// Number of occupied tiles.
    #[must_use]
    pub fn occupied_tile_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_occupied()).count()
    }

    pub(crate) fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.size
            .index(coord)
            .and_then(|index| self.tiles.get_mut(index))
    }

    pub(crate) fn instance_mut(&mut self, id: InstanceId) -> Option<&mut PlacedInstance> {
        self.instances.get_mut(&id)
    }

    pub(crate) fn instances_mut(&mut self) -> impl Iterator<Item = &mut PlacedInstance> {
        self.instances.values_mut()
    }

    pub(crate) fn clear_highlights(&mut self) {
        for tile in &mut self.tiles {
            tile.set_highlight(Highlight::None);
        }
    }

    pub(crate) fn set_highlight(&mut self, coord: TileCoord, highlight: Highlight) {
        if let Some(tile) = self.tile_mut(coord) {
            tile.set_highlight(highlight);
        }
    }

    pub(crate) fn allocate_group(&mut self) -> GroupId {
        let group = self.next_group_id;
        self.next_group_id = GroupId::new(group.get().wrapping_add(1));
        group
    }

    /// Registers an instance and marks the provided tiles as occupied by it.
    pub(crate) fn insert(&mut self, draft: InstanceDraft, tiles: &[TileCoord]) -> InstanceId {
        let id = self.next_instance_id;
        self.next_instance_id = InstanceId::new(id.get().wrapping_add(1));

        for coord in tiles {
            if let Some(tile) = self.tile_mut(*coord) {
                tile.occupy(id);
            }
        }

        let instance = PlacedInstance {
            id,
            name: draft.name,
            color: draft.color,
            footprint: draft.footprint,
            anchor: draft.anchor,
            group: draft.group,
            machine: draft.machine,
        };
        let _ = self.instances.insert(id, instance);
        id
    }

    /// Destroys the provided instances, clearing every tile that references them.
    ///
    /// Returns the cleared tiles in row-major order.
    pub(crate) fn evict(&mut self, ids: &[InstanceId]) -> Vec<TileCoord> {
        for id in ids {
            let _ = self.instances.remove(id);
        }

        let coords: Vec<TileCoord> = self.size.coords().collect();
        let mut cleared = Vec::new();
        for (coord, tile) in coords.into_iter().zip(self.tiles.iter_mut()) {
            if tile.occupant().is_some_and(|occupant| ids.contains(&occupant)) {
                tile.vacate();
                cleared.push(coord);
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(anchor: TileCoord) -> InstanceDraft {
        InstanceDraft {
            name: "Drill".to_owned(),
            color: Rgb::new(10, 20, 30),
            footprint: Footprint::UNIT,
            anchor,
            group: None,
            machine: None,
        }
    }

    #[test]
    fn out_of_bounds_lookups_return_none() {
        let grid = Grid::new(GridSize::new(3, 2));
        assert!(grid.tile_at(GridPoint::new(-1, 0)).is_none());
        assert!(grid.tile_at(GridPoint::new(3, 0)).is_none());
        assert!(grid.tile_at(GridPoint::new(0, 2)).is_none());
        assert!(grid.tile_at(GridPoint::new(2, 1)).is_some());
        assert!(grid.tile(TileCoord::new(9, 9)).is_none());
    }

    #[test]
    fn instance_identifiers_are_unique() {
        let mut grid = Grid::new(GridSize::new(3, 3));
        let first = grid.insert(draft(TileCoord::new(0, 0)), &[TileCoord::new(0, 0)]);
        let second = grid.insert(draft(TileCoord::new(1, 0)), &[TileCoord::new(1, 0)]);
        assert_ne!(first, second);
        assert_eq!(grid.instances().count(), 2);
    }

    #[test]
    fn eviction_clears_only_matching_tiles() {
        let mut grid = Grid::new(GridSize::new(4, 4));
        let kept = grid.insert(draft(TileCoord::new(0, 0)), &[TileCoord::new(0, 0)]);
        let evicted = grid.insert(
            draft(TileCoord::new(1, 1)),
            &[TileCoord::new(1, 1), TileCoord::new(2, 1)],
        );

        let cleared = grid.evict(&[evicted]);

        assert_eq!(cleared, vec![TileCoord::new(1, 1), TileCoord::new(2, 1)]);
        assert!(grid.instance(evicted).is_none());
        assert!(grid.instance(kept).is_some());
        assert_eq!(grid.occupied_tile_count(), 1);
    }

    #[test]
    fn terrain_generator_sees_every_coordinate() {
        let grid = Grid::with_terrain(GridSize::new(2, 2), |coord| {
            if coord == TileCoord::new(1, 1) {
                Terrain::resource("coal")
            } else {
                Terrain::basic()
            }
        });
        let resources = grid
            .tiles()
            .filter(|(_, tile)| tile.terrain().subtype().is_some())
            .count();
        assert_eq!(resources, 1);
    }
}
