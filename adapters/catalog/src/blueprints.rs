use std::{
    collections::BTreeSet,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use gridforge_core::{Blueprint, BlueprintPart, Catalog};
use serde::Deserialize;

use crate::CatalogError;

const BLUEPRINT_EXTENSION: &str = "json";

/// Converts a blueprint name into a file stem made of `[a-z0-9-]`.
#[must_use]
pub fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        let _ = slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("blueprint");
    }
    slug
}

/// Loads every blueprint file in `dir`, in file-name order.
///
/// Files without a `name` take their file stem as the name. Empty and
/// malformed files are skipped and logged; a missing directory yields no
/// blueprints. Parts naming components absent from `catalog` are kept and
/// reported once per component name.
#[must_use]
pub fn load_blueprints(dir: &Path, catalog: &Catalog) -> Vec<Blueprint> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::info!(dir = %dir.display(), %error, "no blueprint directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|extension| extension == BLUEPRINT_EXTENSION)
        })
        .collect();
    paths.sort();

    let mut unknown = BTreeSet::new();
    let mut blueprints = Vec::with_capacity(paths.len());
    for path in paths {
        let blueprint = match load_blueprint(&path) {
            Ok(blueprint) => blueprint,
            Err(error) => {
                tracing::error!(%error, "skipping blueprint");
                continue;
            }
        };
        if blueprint.is_empty() {
            tracing::warn!(path = %path.display(), name = blueprint.name(), "skipping empty blueprint");
            continue;
        }
        for part in blueprint.parts() {
            if catalog.component(&part.component).is_none() && unknown.insert(part.component.clone())
            {
                tracing::warn!(
                    component = part.component.as_str(),
                    blueprint = blueprint.name(),
                    "unknown component; using default appearance"
                );
            }
        }
        blueprints.push(blueprint);
    }

    tracing::info!(count = blueprints.len(), dir = %dir.display(), "blueprints loaded");
    blueprints
}

/// On-disk blueprint; the name falls back to the file stem.
#[derive(Debug, Deserialize)]
struct BlueprintRecord {
    name: Option<String>,
    #[serde(default)]
    components: Vec<BlueprintPart>,
}

/// Reads a single blueprint file.
pub fn load_blueprint(path: &Path) -> Result<Blueprint, CatalogError> {
    let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record: BlueprintRecord =
        serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let name = record.name.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    Ok(Blueprint::new(name, record.components))
}

/// Writes `blueprint` to `<dir>/<slug>.json`, normalized to its first part.
///
/// Creates `dir` when needed and returns the written path. An existing file
/// is never replaced.
pub fn save_blueprint(dir: &Path, blueprint: &Blueprint) -> Result<PathBuf, CatalogError> {
    if blueprint.is_empty() {
        return Err(CatalogError::EmptyBlueprint {
            name: blueprint.name().to_owned(),
        });
    }

    let normalized = blueprint.clone().normalized();
    let json =
        serde_json::to_string_pretty(&normalized).map_err(|source| CatalogError::Serialize {
            name: normalized.name().to_owned(),
            source,
        })?;

    fs::create_dir_all(dir).map_err(|source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir
        .join(slug(normalized.name()))
        .with_extension(BLUEPRINT_EXTENSION);
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|source| match source.kind() {
            io::ErrorKind::AlreadyExists => CatalogError::AlreadyExists { path: path.clone() },
            _ => CatalogError::Io {
                path: path.clone(),
                source,
            },
        })?;
    file.write_all(json.as_bytes())
        .map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), name = normalized.name(), "blueprint saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slug("Iron Smelter  #2"), "iron-smelter-2");
        assert_eq!(slug("--Belt--"), "belt");
        assert_eq!(slug("!!!"), "blueprint");
    }
}
