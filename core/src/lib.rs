#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridforge engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems and adapters react to. Everything in here is plain data: the
//! tile coordinate types, terrain and highlight states, the placeable
//! templates (components and blueprints) and the static catalog.

mod blueprint;
mod catalog;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use blueprint::{Blueprint, BlueprintPart};
pub use catalog::{Catalog, ComponentSpec, Recipe};

/// Window title and banner used when the experience boots.
pub const WELCOME_BANNER: &str = "Gridforge";

/// Describes the active interaction mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayMode {
    /// Resource tiles, running buildings and blueprint placement.
    World,
    /// Component-design surface used to author new blueprints.
    Build,
}

impl PlayMode {
    /// Returns the opposite mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::World => Self::Build,
            Self::Build => Self::World,
        }
    }

    /// Whether placements must match the component's accepted terrain.
    #[must_use]
    pub const fn strict_terrain(self) -> bool {
        matches!(self, Self::World)
    }

    /// Whether multi-component blueprints may be placed in this mode.
    #[must_use]
    pub const fn accepts_blueprints(self) -> bool {
        matches!(self, Self::World)
    }

    /// Whether placed instances run their recipes on each tick.
    #[must_use]
    pub const fn runs_machines(self) -> bool {
        matches!(self, Self::World)
    }

    /// Short uppercase label used by debug overlays.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::World => "WORLD",
            Self::Build => "BUILD",
        }
    }
}

/// Signed grid coordinate that may lie outside any grid.
///
/// Screen conversions and blueprint offsets produce these values; they only
/// become indexable once a grid validates them into a [`TileCoord`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct GridPoint {
    x: i32,
    y: i32,
}

impl GridPoint {
    /// Creates a new grid point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column component.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row component.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Translates the point by the provided offset, saturating at the integer bounds.
    #[must_use]
    pub const fn offset(self, other: GridPoint) -> Self {
        Self {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }

    /// Difference between two points.
    #[must_use]
    pub const fn relative_to(self, origin: GridPoint) -> Self {
        Self {
            x: self.x.saturating_sub(origin.x),
            y: self.y.saturating_sub(origin.y),
        }
    }
}

impl From<[i32; 2]> for GridPoint {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<GridPoint> for [i32; 2] {
    fn from(point: GridPoint) -> Self {
        [point.x, point.y]
    }
}

impl From<TileCoord> for GridPoint {
    fn from(coord: TileCoord) -> Self {
        Self::new(
            i32::try_from(coord.column()).unwrap_or(i32::MAX),
            i32::try_from(coord.row()).unwrap_or(i32::MAX),
        )
    }
}

/// Location of a tile that has been validated against a grid's bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Fixed dimensions of a grid measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
}

impl GridSize {
    /// Creates a new grid size.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Total number of tiles contained in the grid.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(0)
    }

    /// Validates a signed point against the grid bounds.
    #[must_use]
    pub fn contains(&self, point: GridPoint) -> Option<TileCoord> {
        let column = u32::try_from(point.x()).ok()?;
        let row = u32::try_from(point.y()).ok()?;
        (column < self.columns && row < self.rows).then(|| TileCoord::new(column, row))
    }

    /// Row-major index of an in-bounds coordinate.
    #[must_use]
    pub fn index(&self, coord: TileCoord) -> Option<usize> {
        if coord.column() < self.columns && coord.row() < self.rows {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    /// Iterates every coordinate of the grid in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| TileCoord::new(column, row)))
    }
}

/// Size of a component measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    width: u32,
    height: u32,
}

impl Footprint {
    /// Single-tile footprint.
    pub const UNIT: Self = Self::new(1, 1);

    /// Creates a new footprint. Zero extents are widened to one tile.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width: if width == 0 { 1 } else { width },
            height: if height == 0 { 1 } else { height },
        }
    }

    /// Width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Offsets covered by the footprint relative to its anchor, row-major.
    pub fn offsets(&self) -> impl Iterator<Item = GridPoint> {
        let width = i32::try_from(self.width).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height).unwrap_or(i32::MAX);
        (0..height).flat_map(move |dy| (0..width).map(move |dx| GridPoint::new(dx, dy)))
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Opaque RGB color attached to components and terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Brightens every channel by `amount`, saturating at full intensity.
    #[must_use]
    pub const fn brightened(self, amount: u8) -> Self {
        Self {
            red: self.red.saturating_add(amount),
            green: self.green.saturating_add(amount),
            blue: self.blue.saturating_add(amount),
        }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::new(red, green, blue)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        [color.red, color.green, color.blue]
    }
}

/// Coarse terrain classification of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileClass {
    /// Plain buildable ground.
    Basic,
    /// Ground carrying a resource deposit.
    Resource,
}

/// Terrain carried by a tile: a classification plus an optional resource subtype.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Terrain {
    class: TileClass,
    subtype: Option<String>,
}

impl Terrain {
    /// Plain ground without a subtype.
    #[must_use]
    pub const fn basic() -> Self {
        Self {
            class: TileClass::Basic,
            subtype: None,
        }
    }

    /// Resource deposit of the provided subtype (e.g. `iron`).
    #[must_use]
    pub fn resource(subtype: impl Into<String>) -> Self {
        Self {
            class: TileClass::Resource,
            subtype: Some(subtype.into()),
        }
    }

    /// Classification of the terrain.
    #[must_use]
    pub const fn class(&self) -> TileClass {
        self.class
    }

    /// Resource subtype, only present on resource tiles.
    #[must_use]
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// Human readable description such as `basic` or `resource:coal`.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.class, self.subtype()) {
            (TileClass::Basic, _) => "basic".to_owned(),
            (TileClass::Resource, Some(subtype)) => format!("resource:{subtype}"),
            (TileClass::Resource, None) => "resource".to_owned(),
        }
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Self::basic()
    }
}

/// Transient per-frame highlight state of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// No highlight applied.
    #[default]
    None,
    /// Tile currently under the pointer.
    Hover,
    /// Tile covered by a valid placement preview.
    Buildable,
    /// Tile covered by a rejected placement preview.
    Invalid,
}

/// Unique identifier assigned to a placed instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(u32);

impl InstanceId {
    /// Creates a new instance identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier shared by every instance created from one blueprint placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(u32);

impl GroupId {
    /// Creates a new group identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Template that can be put onto a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placeable {
    /// A single component occupying its own footprint.
    Component(ComponentSpec),
    /// A rigid arrangement of components placed as one unit.
    Blueprint(Blueprint),
}

impl Placeable {
    /// Name of the underlying template.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Component(spec) => spec.name(),
            Self::Blueprint(blueprint) => blueprint.name(),
        }
    }

    /// Returns the blueprint when this placeable is one.
    #[must_use]
    pub fn as_blueprint_mut(&mut self) -> Option<&mut Blueprint> {
        match self {
            Self::Blueprint(blueprint) => Some(blueprint),
            Self::Component(_) => None,
        }
    }
}

/// Placement preview evaluated while refreshing highlights.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preview {
    /// Template being previewed.
    pub placeable: Placeable,
    /// Grid point the template would be anchored at.
    pub origin: GridPoint,
}

/// Summary of a successful placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Group shared by the created instances, present for blueprints.
    pub group: Option<GroupId>,
    /// Instances created by the placement, one per component.
    pub instances: Vec<InstanceId>,
    /// Every tile that became occupied.
    pub tiles: Vec<TileCoord>,
}

/// Reasons a placement request may be rejected.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum PlacementError {
    /// A covered tile lies outside the grid.
    #[error("footprint extends beyond the grid")]
    OutOfBounds,
    /// A covered tile already holds an occupant.
    #[error("footprint overlaps an occupied tile")]
    Occupied,
    /// A covered tile's terrain is not accepted by the component.
    #[error("terrain is not accepted by the component")]
    UnacceptedTerrain,
    /// Two components of the same blueprint cover the same tile.
    #[error("blueprint components overlap each other")]
    Overlapping,
    /// The active mode does not support this kind of placeable.
    #[error("placeable is not supported in this mode")]
    UnsupportedInMode,
    /// The blueprint has no components.
    #[error("blueprint has no components")]
    EmptyBlueprint,
}

/// Reasons a removal request may be rejected.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum RemovalError {
    /// The targeted point lies outside the grid.
    #[error("point lies outside the grid")]
    OutOfBounds,
    /// The targeted tile holds no occupant.
    #[error("tile is already clear")]
    Vacant,
}

/// Reasons an item delivery may be rejected.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum StockError {
    /// The targeted point lies outside the grid.
    #[error("point lies outside the grid")]
    OutOfBounds,
    /// The targeted tile holds no occupant.
    #[error("tile holds no building")]
    Vacant,
    /// The occupant does not run a recipe.
    #[error("building has no recipe")]
    NoMachine,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a template anchored at the provided grid point.
    Place {
        /// Grid the placement targets.
        mode: PlayMode,
        /// Template to instantiate.
        placeable: Placeable,
        /// Anchor of the template.
        origin: GridPoint,
    },
    /// Requests removal of whatever occupies the provided grid point.
    Remove {
        /// Grid the removal targets.
        mode: PlayMode,
        /// Point whose occupant should be removed.
        at: GridPoint,
    },
    /// Clears and recomputes every highlight of one grid.
    RefreshHighlights {
        /// Grid whose highlights are recomputed.
        mode: PlayMode,
        /// Tile under the pointer, if any.
        hover: Option<GridPoint>,
        /// Placement preview for the current selection, if any.
        preview: Option<Preview>,
    },
    /// Delivers items into the input store of a world building.
    Stock {
        /// Tile occupied by the receiving building.
        at: GridPoint,
        /// Item name.
        item: String,
        /// Number of items delivered.
        amount: u32,
    },
    /// Captures the build grid as a new blueprint.
    ExtractBlueprint {
        /// Name assigned to the extracted blueprint.
        name: String,
    },
    /// Removes every instance from the build grid.
    ClearBuildGrid,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the world entered a new play mode.
    PlayModeChanged {
        /// Mode that became active.
        mode: PlayMode,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a template was placed.
    Placed {
        /// Grid that received the placement.
        mode: PlayMode,
        /// Instances and tiles created by the placement.
        placement: Placement,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Grid the placement targeted.
        mode: PlayMode,
        /// Anchor provided in the request.
        origin: GridPoint,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that one or more instances were removed.
    Removed {
        /// Grid the instances were removed from.
        mode: PlayMode,
        /// Instances that were destroyed.
        instances: Vec<InstanceId>,
        /// Tiles that became clear.
        tiles: Vec<TileCoord>,
    },
    /// Reports that a removal request was rejected.
    RemovalRejected {
        /// Grid the removal targeted.
        mode: PlayMode,
        /// Point provided in the request.
        at: GridPoint,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Reports that a building finished one recipe cycle.
    RecipeCompleted {
        /// Building that completed the cycle.
        instance: InstanceId,
        /// Name of the recipe that ran.
        recipe: String,
    },
    /// Confirms that items were delivered to a building.
    Stocked {
        /// Building that received the items.
        instance: InstanceId,
        /// Item name.
        item: String,
        /// Number of items delivered.
        amount: u32,
    },
    /// Reports that an item delivery was rejected.
    StockRejected {
        /// Point provided in the request.
        at: GridPoint,
        /// Specific reason the delivery failed.
        reason: StockError,
    },
    /// Carries a blueprint captured from the build grid.
    BlueprintExtracted {
        /// Extracted blueprint, normalized to its first component.
        blueprint: Blueprint,
    },
    /// Reports that extraction found nothing to capture.
    ExtractionRejected {
        /// Name requested for the blueprint.
        name: String,
    },
    /// Confirms that the build grid was wiped.
    BuildGridCleared {
        /// Instances that were destroyed.
        instances: Vec<InstanceId>,
    },
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl ScreenRect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside the rectangle (left/top edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Shrinks the rectangle by `inset` on every side, never below zero extent.
    #[must_use]
    pub fn inset(&self, inset: f32) -> Self {
        Self {
            x: self.x + inset,
            y: self.y + inset,
            width: (self.width - 2.0 * inset).max(0.0),
            height: (self.height - 2.0 * inset).max(0.0),
        }
    }
}
