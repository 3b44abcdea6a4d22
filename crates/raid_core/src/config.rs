use std::io::ErrorKind;

use cap_std::fs_utf8::Dir;
use miette::{Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;

pub const VIEWER_CONFIG_FILE_NAME: &str = "viewer.toml";

/// Pixel size of the map images. Every floor of a map shares the same size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapDimensions {
    pub width: f64,
    pub height: f64,
}

impl Default for MapDimensions {
    fn default() -> Self {
        Self {
            width: 4078.0,
            height: 2158.0,
        }
    }
}

/// Where `<map name>.json` documents are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapSourceConfig {
    Http { base_url: Url },
    /// relative paths are resolved inside the data directory
    Directory { path: String },
}

impl Default for MapSourceConfig {
    fn default() -> Self {
        Self::Directory {
            path: "maps".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub default_map: String,
    pub flip_y: bool,
    /// Horizontal shift in game pixels applied before projecting into the viewport.
    pub horizontal_offset: f64,
    pub grid_size: u32,
    /// names tried when building the map catalog
    pub candidate_maps: Vec<String>,
    // tables last, toml wants plain values first
    pub map_dimensions: MapDimensions,
    pub map_source: MapSourceConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_map: "armory".to_string(),
            flip_y: true,
            horizontal_offset: 0.0,
            grid_size: 100,
            candidate_maps: [
                "armory",
                "arena-breakout",
                "valley",
                "northridge",
                "tvstation",
                "farm",
                "warehouse",
                "factory",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            map_dimensions: Default::default(),
            map_source: Default::default(),
        }
    }
}

impl ViewerConfig {
    /// Reads `viewer.toml` from the data dir.
    /// A missing file is replaced by the defaults, a broken one is logged and ignored.
    pub fn load_or_default(root_dir: &Dir) -> Self {
        match root_dir.read_to_string(VIEWER_CONFIG_FILE_NAME) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    error!(?e, "failed to parse viewer configuration, using defaults");
                    Self::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no viewer configuration found, writing defaults");
                let config = Self::default();
                if let Err(e) = config.save(root_dir) {
                    error!(?e, "failed to save default viewer configuration");
                }
                config
            }
            Err(e) => {
                error!(?e, "failed to read viewer configuration, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, root_dir: &Dir) -> Result<()> {
        let serialized = toml::to_string_pretty(self)
            .into_diagnostic()
            .wrap_err("failed to serialize viewer configuration")?;
        root_dir
            .write(VIEWER_CONFIG_FILE_NAME, serialized.as_bytes())
            .into_diagnostic()
            .wrap_err("failed to write viewer configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_std::ambient_authority;
    use cap_std::fs_utf8::camino::Utf8Path;
    use similar_asserts::assert_eq;

    fn temp_root() -> (tempfile::TempDir, Dir) {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(tmp.path()).unwrap();
        let root = Dir::open_ambient_dir(path, ambient_authority()).unwrap();
        (tmp, root)
    }

    #[test]
    fn missing_config_is_written_back() {
        let (_tmp, root) = temp_root();
        let config = ViewerConfig::load_or_default(&root);
        assert_eq!(config, ViewerConfig::default());
        assert!(root.exists(VIEWER_CONFIG_FILE_NAME));
        assert_eq!(ViewerConfig::load_or_default(&root), config);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let (_tmp, root) = temp_root();
        root.write(
            VIEWER_CONFIG_FILE_NAME,
            "horizontal_offset = 240.0\n\n[map_source]\nkind = \"http\"\nbase_url = \"https://example.com/maps/\"\n",
        )
        .unwrap();
        let config = ViewerConfig::load_or_default(&root);
        assert_eq!(config.horizontal_offset, 240.0);
        assert_eq!(
            config.map_source,
            MapSourceConfig::Http {
                base_url: Url::parse("https://example.com/maps/").unwrap()
            }
        );
        assert_eq!(config.grid_size, 100);
        assert_eq!(config.map_dimensions, MapDimensions::default());
    }

    #[test]
    fn broken_config_falls_back_to_defaults() {
        let (_tmp, root) = temp_root();
        root.write(VIEWER_CONFIG_FILE_NAME, "grid_size = \"wide\"").unwrap();
        assert_eq!(ViewerConfig::load_or_default(&root), ViewerConfig::default());
    }
}
