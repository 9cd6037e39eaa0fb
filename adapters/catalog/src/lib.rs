#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! File-backed data for Gridforge: the component and recipe catalogs, the
//! blueprint directory and single-line blueprint share codes.

mod blueprints;
mod share;

use std::{
    collections::BTreeMap,
    fs,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use gridforge_core::{Catalog, ComponentSpec, Footprint, Recipe, Rgb, TileClass};
use serde::Deserialize;

pub use blueprints::{load_blueprint, load_blueprints, save_blueprint, slug};
pub use share::{decode_share_code, encode_share_code, ShareCodeError, SHARE_CODE_HEADER};

/// File holding component definitions inside the data directory.
pub const COMPONENTS_FILE: &str = "components.json";
/// File holding building recipes inside the data directory.
pub const RECIPES_FILE: &str = "buildings.json";
/// Directory holding saved blueprints inside the data directory.
pub const BLUEPRINTS_DIR: &str = "blueprints";

/// Errors raised while reading or writing catalog data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A file could not be read or written.
    #[error("could not access {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A file did not contain the expected JSON structure.
    #[error("could not parse {}: {source}", .path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// A recipe declared a negative or non-finite processing time.
    #[error("recipe '{building}' has invalid process_time {value}")]
    InvalidProcessTime {
        /// Building the recipe belongs to.
        building: String,
        /// Offending value in milliseconds.
        value: f64,
    },
    /// A blueprint without components cannot be saved.
    #[error("blueprint '{name}' has no components")]
    EmptyBlueprint {
        /// Name of the rejected blueprint.
        name: String,
    },
    /// Saving would replace a blueprint file that is already on disk.
    #[error("blueprint file {} already exists", .path.display())]
    AlreadyExists {
        /// Existing file.
        path: PathBuf,
    },
    /// A blueprint could not be serialised.
    #[error("could not serialise blueprint '{name}': {source}")]
    Serialize {
        /// Name of the blueprint.
        name: String,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ComponentRecord {
    color: Rgb,
    #[serde(default = "unit_size")]
    size: [u32; 2],
    #[serde(default)]
    valid_tile_types: Vec<TileClass>,
    #[serde(default)]
    valid_subtypes: Vec<String>,
}

const fn unit_size() -> [u32; 2] {
    [1, 1]
}

#[derive(Debug, Deserialize)]
struct RecipeRecord {
    #[serde(default)]
    inputs: BTreeMap<String, u32>,
    #[serde(default)]
    outputs: BTreeMap<String, u32>,
    process_time: f64,
}

/// Parses a component catalog document.
pub fn parse_components(json: &str) -> Result<Vec<ComponentSpec>, serde_json::Error> {
    let records: BTreeMap<String, ComponentRecord> = serde_json::from_str(json)?;
    Ok(records
        .into_iter()
        .map(|(name, record)| {
            let [width, height] = record.size;
            ComponentSpec::new(name, record.color, Footprint::new(width, height))
                .with_accepted_classes(record.valid_tile_types)
                .with_accepted_subtypes(record.valid_subtypes)
        })
        .collect())
}

/// Parses a recipe catalog document; `process_time` is in milliseconds.
pub fn parse_recipes(path: &Path, json: &str) -> Result<Vec<(String, Recipe)>, CatalogError> {
    let records: BTreeMap<String, RecipeRecord> =
        serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    records
        .into_iter()
        .map(|(building, record)| {
            let millis = record.process_time;
            if !millis.is_finite() || millis < 0.0 {
                return Err(CatalogError::InvalidProcessTime {
                    building,
                    value: millis,
                });
            }
            let recipe = Recipe {
                inputs: record.inputs,
                outputs: record.outputs,
                process_time: Duration::from_secs_f64(millis / 1_000.0),
            };
            Ok((building, recipe))
        })
        .collect()
}

fn read(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the component and recipe catalogs from `data_dir`.
///
/// The component file is required; a missing recipe file yields a catalog
/// without recipes.
pub fn load_catalog(data_dir: &Path) -> Result<Catalog, CatalogError> {
    let components_path = data_dir.join(COMPONENTS_FILE);
    let components =
        parse_components(&read(&components_path)?).map_err(|source| CatalogError::Parse {
            path: components_path.clone(),
            source,
        })?;

    let recipes_path = data_dir.join(RECIPES_FILE);
    let recipes = if recipes_path.exists() {
        parse_recipes(&recipes_path, &read(&recipes_path)?)?
    } else {
        tracing::warn!(path = %recipes_path.display(), "recipe file missing; buildings will not run");
        Vec::new()
    };

    let catalog = Catalog::new(components, recipes);
    tracing::info!(
        components = catalog.components().count(),
        recipes = catalog.recipe_count(),
        "catalog loaded"
    );
    Ok(catalog)
}
