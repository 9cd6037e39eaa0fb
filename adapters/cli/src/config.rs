//! TOML configuration for the `gridforge` binary.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use gridforge_core::GridSize;
use gridforge_system_camera::{CameraConfig, ZoomModel};
use gridforge_world::{ResourceLayout, WorldConfig};
use serde::Deserialize;

/// Failure to read or validate a configuration file.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Window settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct WindowConfig {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Gridforge".to_owned(),
            width: 1024,
            height: 920,
        }
    }
}

/// Everything the binary can be configured with.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) window: WindowConfig,
    pub(crate) grid: GridSize,
    pub(crate) camera: CameraConfig,
    pub(crate) world: ResourceLayout,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            grid: WorldConfig::default().grid,
            camera: CameraConfig::default(),
            world: ResourceLayout::default(),
        }
    }
}

impl AppConfig {
    /// Reads and validates `path`.
    pub(crate) fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub(crate) fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: source_path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.window.width == 0 || self.window.height == 0 {
            errors.push(format!(
                "window must be at least 1x1, got {}x{}. Example: width = 1024",
                self.window.width, self.window.height
            ));
        }
        if self.grid.columns == 0 || self.grid.rows == 0 {
            errors.push(format!(
                "grid must be at least 1x1, got {}x{}. Example: columns = 100",
                self.grid.columns, self.grid.rows
            ));
        }
        if !self.camera.tile_size.is_finite() || self.camera.tile_size <= 0.0 {
            errors.push(format!(
                "camera.tile_size must be > 0, got {}. Example: tile_size = 32.0",
                self.camera.tile_size
            ));
        }
        if !(0.0..=1.0).contains(&self.camera.friction) {
            errors.push(format!(
                "camera.friction must be within 0.0-1.0, got {}. Example: friction = 0.85",
                self.camera.friction
            ));
        }
        if self.camera.max_speed < 0.0 || self.camera.acceleration < 0.0 {
            errors.push("camera speeds must not be negative".to_owned());
        }
        validate_zoom(&self.camera.zoom, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// World generation parameters derived from the grid and resource sections.
    pub(crate) fn world_config(&self) -> WorldConfig {
        WorldConfig {
            grid: self.grid,
            resources: self.world.clone(),
        }
    }
}

fn validate_zoom(zoom: &ZoomModel, errors: &mut Vec<String>) {
    match zoom {
        ZoomModel::Discrete { levels, step } => {
            if levels.is_empty() {
                errors.push(
                    "camera.zoom.levels must not be empty. Example: levels = [0.5, 1.0, 1.5, 2.0]"
                        .to_owned(),
                );
            }
            if levels.iter().any(|level| !level.is_finite() || *level <= 0.0) {
                errors.push(format!(
                    "camera.zoom.levels must all be > 0, got {levels:?}"
                ));
            }
            if levels.windows(2).any(|pair| pair[0] >= pair[1]) {
                errors.push(format!(
                    "camera.zoom.levels must be strictly ascending, got {levels:?}"
                ));
            }
            if !step.is_finite() || *step <= 0.0 {
                errors.push(format!(
                    "camera.zoom.step must be > 0, got {step}. Example: step = 0.5"
                ));
            }
        }
        ZoomModel::Continuous { min, max, .. } => {
            if !min.is_finite() || !max.is_finite() || *min <= 0.0 || min > max {
                errors.push(format!(
                    "camera.zoom needs 0 < min <= max, got min = {min}, max = {max}"
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridforge_core::GridPoint;
    use std::io::Write as _;

    fn parse(content: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::from_toml_str(content, Path::new("gridforge.toml"))
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").expect("empty config is valid");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 920);
        assert_eq!(config.grid, GridSize::new(100, 100));
        assert_eq!(config.camera.tile_size, 32.0);
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse(
            r#"
            [window]
            width = 800

            [grid]
            columns = 40
            rows = 30

            [camera]
            max_speed = 900.0

            [camera.zoom]
            kind = "continuous"
            min = 0.25
            max = 4.0
            wheel_step = 0.1

            [world]
            deposits = [{ subtype = "iron", at = [1, 2] }]
            "#,
        )
        .expect("valid config");

        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 920, "untouched keys keep defaults");
        assert_eq!(config.world_config().grid, GridSize::new(40, 30));
        assert_eq!(config.camera.max_speed, 900.0);
        assert_eq!(config.camera.friction, 0.85);
        assert_eq!(
            config.camera.zoom,
            ZoomModel::Continuous {
                min: 0.25,
                max: 4.0,
                wheel_step: 0.1
            }
        );
        assert_eq!(config.world.deposits.len(), 1);
        assert_eq!(config.world.deposits[0].at, GridPoint::new(1, 2));
    }

    #[test]
    fn invalid_values_are_all_reported() {
        let error = parse(
            r#"
            [grid]
            columns = 0
            rows = 10

            [camera]
            friction = 1.5
            "#,
        )
        .expect_err("invalid config");

        match error {
            ConfigError::Invalid(problems) => assert_eq!(problems.len(), 2, "{problems:?}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    fn problem_count(content: &str) -> usize {
        match parse(content) {
            Err(ConfigError::Invalid(problems)) => problems.len(),
            Ok(_) => 0,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zoom_models_are_validated() {
        assert_eq!(
            problem_count("[camera.zoom]\nkind = \"discrete\"\nlevels = []\nstep = 0.5"),
            1,
            "empty levels disable zoom"
        );
        assert_eq!(
            problem_count("[camera.zoom]\nkind = \"discrete\"\nlevels = [1.0, 0.5, 2.0]\nstep = 0.5"),
            1,
            "unordered levels step the wrong way"
        );
        assert_eq!(
            problem_count("[camera.zoom]\nkind = \"discrete\"\nlevels = [0.0, 1.0]\nstep = 0.0"),
            2,
            "non-positive level and step"
        );
        assert_eq!(
            problem_count(
                "[camera.zoom]\nkind = \"continuous\"\nmin = 2.0\nmax = 1.0\nwheel_step = 0.1"
            ),
            1
        );
        assert_eq!(
            problem_count(
                "[camera.zoom]\nkind = \"continuous\"\nmin = 0.0\nmax = 1.0\nwheel_step = 0.1"
            ),
            1
        );
        assert_eq!(
            problem_count("[camera.zoom]\nkind = \"discrete\"\nlevels = [0.25, 1.0, 4.0]\nstep = 0.5"),
            0
        );
    }

    #[test]
    fn syntax_errors_name_the_file() {
        let error = parse("[grid\ncolumns = ").expect_err("malformed toml");
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert!(error.to_string().starts_with("gridforge.toml"));
    }

    #[test]
    fn files_are_read_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temporary file");
        writeln!(file, "[window]\ntitle = \"Factory\"").expect("write config");

        let config = AppConfig::from_file(file.path()).expect("config loads");
        assert_eq!(config.window.title, "Factory");

        let missing = AppConfig::from_file(Path::new("/nonexistent/gridforge.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
