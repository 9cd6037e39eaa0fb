//! Deterministic resource layout for the world grid.

use gridforge_core::{GridPoint, GridSize, Terrain, TileCoord};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::grid::Grid;

/// A single resource tile placed at a fixed position.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Deposit {
    /// Resource subtype, e.g. `iron`.
    pub subtype: String,
    /// Tile the deposit occupies.
    pub at: GridPoint,
}

impl Deposit {
    /// Creates a deposit of `subtype` at `at`.
    #[must_use]
    pub fn new(subtype: impl Into<String>, at: GridPoint) -> Self {
        Self {
            subtype: subtype.into(),
            at,
        }
    }
}

/// Seeded random sprinkling of resource tiles.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Scatter {
    /// Seed fed to the generator.
    pub seed: u64,
    /// Probability that a basic tile becomes a resource, clamped to `[0, 1]`.
    pub density: f64,
    /// Subtypes chosen uniformly for scattered tiles.
    pub subtypes: Vec<String>,
}

impl Default for Scatter {
    fn default() -> Self {
        Self {
            seed: 0x5eed_f0e5_0000_0001,
            density: 0.02,
            subtypes: vec!["iron".to_owned(), "coal".to_owned(), "limestone".to_owned()],
        }
    }
}

/// Resource layout applied on top of a basic world grid.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResourceLayout {
    /// Fixed deposits, applied after the scatter so they always win.
    pub deposits: Vec<Deposit>,
    /// Optional random scatter.
    pub scatter: Option<Scatter>,
}

impl Default for ResourceLayout {
    fn default() -> Self {
        Self {
            deposits: vec![
                Deposit::new("iron", GridPoint::new(5, 5)),
                Deposit::new("coal", GridPoint::new(7, 6)),
                Deposit::new("limestone", GridPoint::new(6, 4)),
            ],
            scatter: None,
        }
    }
}

impl ResourceLayout {
    /// Builds a world grid of `size` carrying this layout.
    ///
    /// Deposits outside the grid are ignored.
    #[must_use]
    pub fn generate(&self, size: GridSize) -> Grid {
        let mut scattered = self.scatter.as_ref().map(|scatter| {
            let rng = ChaCha8Rng::seed_from_u64(scatter.seed);
            (rng, scatter)
        });

        Grid::with_terrain(size, |coord| {
            let sampled = scattered
                .as_mut()
                .and_then(|(rng, scatter)| scatter.sample(rng));
            match self.deposit_at(coord) {
                Some(subtype) => Terrain::resource(subtype),
                None => sampled.map_or_else(Terrain::basic, Terrain::resource),
            }
        })
    }

    fn deposit_at(&self, coord: TileCoord) -> Option<&str> {
        self.deposits
            .iter()
            .rev()
            .find(|deposit| GridPoint::from(coord) == deposit.at)
            .map(|deposit| deposit.subtype.as_str())
    }
}

impl Scatter {
    fn sample(&self, rng: &mut ChaCha8Rng) -> Option<String> {
        // Draw for every tile so deposits do not shift the sequence.
        let density = if self.density.is_nan() {
            0.0
        } else {
            self.density.clamp(0.0, 1.0)
        };
        let hit = rng.gen_bool(density);
        let subtype = self.subtypes.choose(rng).cloned();
        subtype.filter(|_| hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subtype_at(grid: &Grid, x: i32, y: i32) -> Option<String> {
        grid.tile_at(GridPoint::new(x, y))
            .and_then(|tile| tile.terrain().subtype().map(str::to_owned))
    }

    #[test]
    fn default_layout_places_three_deposits() {
        let grid = ResourceLayout::default().generate(GridSize::new(10, 10));

        assert_eq!(subtype_at(&grid, 5, 5).as_deref(), Some("iron"));
        assert_eq!(subtype_at(&grid, 7, 6).as_deref(), Some("coal"));
        assert_eq!(subtype_at(&grid, 6, 4).as_deref(), Some("limestone"));
        let resources = grid
            .tiles()
            .filter(|(_, tile)| tile.terrain().subtype().is_some())
            .count();
        assert_eq!(resources, 3);
    }

    #[test]
    fn deposits_outside_small_grids_are_ignored() {
        let grid = ResourceLayout::default().generate(GridSize::new(6, 6));
        assert_eq!(subtype_at(&grid, 5, 5).as_deref(), Some("iron"));
        assert_eq!(grid.tiles().count(), 36);
    }

    #[test]
    fn scatter_is_deterministic_for_a_seed() {
        let layout = ResourceLayout {
            deposits: Vec::new(),
            scatter: Some(Scatter {
                seed: 7,
                density: 0.3,
                subtypes: vec!["coal".to_owned()],
            }),
        };

        let first = layout.generate(GridSize::new(20, 20));
        let second = layout.generate(GridSize::new(20, 20));

        let collect = |grid: &Grid| -> Vec<bool> {
            grid.tiles()
                .map(|(_, tile)| tile.terrain().subtype().is_some())
                .collect()
        };
        assert_eq!(collect(&first), collect(&second));
        assert!(collect(&first).iter().any(|resource| *resource));
    }

    #[test]
    fn zero_density_scatter_leaves_basic_tiles() {
        let layout = ResourceLayout {
            deposits: Vec::new(),
            scatter: Some(Scatter {
                density: 0.0,
                ..Scatter::default()
            }),
        };
        let grid = layout.generate(GridSize::new(8, 8));
        assert!(grid
            .tiles()
            .all(|(_, tile)| tile.terrain().subtype().is_none()));
    }
}
