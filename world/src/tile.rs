//! Single grid cell state.

use gridforge_core::{ComponentSpec, Highlight, InstanceId, Terrain};

/// One grid cell: terrain, occupant and transient highlight.
///
/// Occupancy is derived from the occupant so the two can never disagree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    terrain: Terrain,
    occupant: Option<InstanceId>,
    highlight: Highlight,
}

impl Tile {
    /// Creates a clear tile carrying the provided terrain.
    #[must_use]
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            occupant: None,
            highlight: Highlight::None,
        }
    }

    /// Terrain classification of the tile.
    #[must_use]
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Instance occupying the tile, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<InstanceId> {
        self.occupant
    }

    /// Whether an instance occupies the tile.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Whether the tile is free for placement.
    #[must_use]
    pub const fn is_clear(&self) -> bool {
        self.occupant.is_none()
    }

    /// Highlight applied during the current frame.
    #[must_use]
    pub const fn highlight(&self) -> Highlight {
        self.highlight
    }

    /// Whether the component may be placed here. Terrain is only checked when `strict`.
    #[must_use]
    pub fn is_placeable_by(&self, spec: &ComponentSpec, strict: bool) -> bool {
        self.is_clear() && (!strict || spec.accepts(&self.terrain))
    }

    pub(crate) fn occupy(&mut self, instance: InstanceId) {
        self.occupant = Some(instance);
    }

    pub(crate) fn vacate(&mut self) {
        self.occupant = None;
    }

    pub(crate) fn set_highlight(&mut self, highlight: Highlight) {
        self.highlight = highlight;
    }
}
