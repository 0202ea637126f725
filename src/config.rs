//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dtviz/dtviz.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `DTVIZ_*` prefix, `__` separates nesting levels

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::services::AnimationConfig;
use crate::application::ApplicationError;
use crate::domain::{GridConfig, LayoutConfig};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DTVIZ";

/// Spacing policy of the tree layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    /// Vertical gap below the root level
    pub base_vertical: f64,
    /// Extra vertical gap per level
    pub level_growth: f64,
    /// Lower bound of the horizontal child offset
    pub min_spacing: f64,
    /// Y coordinate of the root
    pub top_y: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let defaults = LayoutConfig::default();
        Self {
            base_vertical: defaults.base_vertical,
            level_growth: defaults.level_growth,
            min_spacing: defaults.min_spacing,
            top_y: defaults.top_y,
        }
    }
}

/// Packing grid inside a leaf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridSettings {
    pub columns: usize,
    pub cell_size: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        let defaults = GridConfig::default();
        Self {
            columns: defaults.columns,
            cell_size: defaults.cell_size,
        }
    }
}

/// Motion timing of points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnimationSettings {
    /// Duration of one path segment in milliseconds
    pub segment_duration_ms: u64,
    /// Frame period in milliseconds
    pub frame_interval_ms: u64,
    /// Edge length of a point box
    pub point_size: u32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            segment_duration_ms: 15,
            frame_interval_ms: 16,
            point_size: 20,
        }
    }
}

/// Unified configuration for dtviz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Tree document (JSON)
    pub tree_path: PathBuf,
    /// Records document (JSON)
    pub records_path: PathBuf,
    /// Points per batch
    pub batch_size: usize,
    /// Width of the layout viewport
    pub viewport_width: f64,
    pub layout: LayoutSettings,
    pub grid: GridSettings,
    pub animation: AnimationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tree_path: PathBuf::from("nba_tree.json"),
            records_path: PathBuf::from("test_data.json"),
            batch_size: 20,
            viewport_width: 1200.0,
            layout: LayoutSettings::default(),
            grid: GridSettings::default(),
            animation: AnimationSettings::default(),
        }
    }
}

/// Get the XDG config directory for dtviz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dtviz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dtviz.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file; unlike the global file it must exist
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), local, ENV_PREFIX)
    }

    /// Load settings from explicit layers.
    ///
    /// Later layers replace individual keys of earlier ones.
    pub fn load_layers(
        global: Option<&Path>,
        local: Option<&Path>,
        env_prefix: &str,
    ) -> Result<Self, ApplicationError> {
        let defaults = Config::try_from(&Settings::default()).map_err(config_err)?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(global_path) = global {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(local_path) = local {
            debug!("load: local config {}", local_path.display());
            builder = builder.add_source(File::from(local_path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in document paths.
    fn expand_paths(&mut self) {
        self.tree_path = expand_path(&self.tree_path);
        self.records_path = expand_path(&self.records_path);
    }

    /// Reject settings the layout and scheduler cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.batch_size == 0 {
            return Err(ApplicationError::Config {
                message: "batch_size must be at least 1".to_string(),
            });
        }
        if !(self.viewport_width.is_finite() && self.viewport_width > 0.0) {
            return Err(ApplicationError::Config {
                message: format!("viewport_width must be positive: {}", self.viewport_width),
            });
        }
        if self.grid.columns == 0 || self.grid.cell_size <= 0.0 {
            return Err(ApplicationError::Config {
                message: "grid needs at least one column and a positive cell size".to_string(),
            });
        }
        Ok(())
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            base_vertical: self.layout.base_vertical,
            level_growth: self.layout.level_growth,
            min_spacing: self.layout.min_spacing,
            top_y: self.layout.top_y,
        }
    }

    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            columns: self.grid.columns,
            cell_size: self.grid.cell_size,
        }
    }

    pub fn animation_config(&self) -> AnimationConfig {
        AnimationConfig {
            segment_duration: Duration::from_millis(self.animation.segment_duration_ms),
            point_size: f64::from(self.animation.point_size),
            batch_size: self.batch_size,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.animation.frame_interval_ms)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# dtviz configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/dtviz/dtviz.toml   (your baseline)
#   Local:  file passed with --config    (per-run additions)
#   Env:    DTVIZ_* environment variables (explicit overrides,
#           nested keys use "__", e.g. DTVIZ_LAYOUT__MIN_SPACING=120)

# Decision tree document
# tree_path = "nba_tree.json"

# Records to route through the tree
# records_path = "test_data.json"

# Points animated per "run" request
# batch_size = 20

# Width of the layout viewport
# viewport_width = 1200.0

[layout]
# base_vertical = 80.0
# level_growth = 60.0
# min_spacing = 140.0
# top_y = 50.0

[grid]
# columns = 3
# cell_size = 20.0

[animation]
# segment_duration_ms = 15
# frame_interval_ms = 16
# point_size = 20
"#
        .to_string()
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(raw.as_ref()) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_files_when_loading_then_uses_defaults() {
        let settings = Settings::load_layers(None, None, "DTVIZ_UNIT_DEFAULTS").expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.batch_size, 20);
        assert_eq!(settings.layout_config(), LayoutConfig::default());
        assert_eq!(settings.grid_config(), GridConfig::default());
    }

    #[test]
    fn given_tilde_in_tree_path_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            tree_path: PathBuf::from("~/data/tree.json"),
            records_path: PathBuf::from("$HOME/data/records.json"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(
            settings.tree_path.to_string_lossy().starts_with(&home),
            "tree_path should start with home dir: {}",
            settings.tree_path.display()
        );
        assert!(
            settings.records_path.to_string_lossy().starts_with(&home),
            "records_path should expand $HOME"
        );
    }

    #[test]
    fn given_zero_batch_size_when_validating_then_rejects() {
        let settings = Settings {
            batch_size: 0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_animation_settings_when_converting_then_uses_milliseconds() {
        let settings = Settings::default();
        let animation = settings.animation_config();
        assert_eq!(animation.segment_duration, Duration::from_millis(15));
        assert_eq!(animation.point_size, 20.0);
        assert_eq!(settings.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let parsed: Result<toml::Value, _> = toml::from_str(&Settings::template());
        assert!(parsed.is_ok(), "template should parse: {:?}", parsed.err());
    }
}
