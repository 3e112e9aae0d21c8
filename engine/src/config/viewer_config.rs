//! Viewer Configuration
//!
//! Window, asset and data locations for the desktop viewer. Loaded from an
//! optional JSON file; any field missing from the file keeps its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GlobeError, GlobeResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    /// Cap frame rate to the display refresh
    pub vsync: bool,
    /// Trip collection JSON
    pub trips_path: PathBuf,
    /// Root that relative image URLs in the trip file resolve against
    pub asset_root: PathBuf,
    /// Directory holding the globe color/specular maps
    pub globe_texture_dir: PathBuf,
    /// Largest texture edge uploaded to the GPU; bigger images are downscaled
    pub max_texture_size: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            trips_path: PathBuf::from("assets/images/photos/trips.json"),
            asset_root: PathBuf::from("."),
            globe_texture_dir: PathBuf::from("assets/images/earth"),
            max_texture_size: 8192,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> GlobeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GlobeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| GlobeError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve an image URL from the trip file to a local path.
    pub fn resolve_asset(&self, url: &str) -> PathBuf {
        let trimmed = url.trim_start_matches('/');
        self.asset_root.join(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: ViewerConfig = serde_json::from_str(r#"{ "width": 800 }"#).unwrap();
        assert_eq!(cfg.width, 800);
        assert_eq!(cfg.height, 720);
        assert_eq!(cfg.trips_path, PathBuf::from("assets/images/photos/trips.json"));
    }

    #[test]
    fn test_resolve_asset_strips_leading_slash() {
        let cfg = ViewerConfig {
            asset_root: PathBuf::from("/srv/site"),
            ..Default::default()
        };
        assert_eq!(
            cfg.resolve_asset("/assets/a.jpg"),
            PathBuf::from("/srv/site/assets/a.jpg")
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ViewerConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, GlobeError::Io { .. }));
    }
}
