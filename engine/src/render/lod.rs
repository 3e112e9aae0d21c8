//! Globe texture level of detail.
//!
//! The globe starts on the 4k colour map. Once the camera comes closer than
//! the switch distance the 10k map takes over, if it was found on disk.

use std::path::{Path, PathBuf};

/// Globe colour map resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlobeLod {
    #[default]
    Standard,
    Detailed,
}

/// The globe textures, by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobeMap {
    Color(GlobeLod),
    Specular,
}

impl GlobeMap {
    pub const ALL: [GlobeMap; 3] = [
        GlobeMap::Color(GlobeLod::Standard),
        GlobeMap::Color(GlobeLod::Detailed),
        GlobeMap::Specular,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            GlobeMap::Color(GlobeLod::Standard) => "earth_texture_4k.jpg",
            GlobeMap::Color(GlobeLod::Detailed) => "earth_texture_10k.jpg",
            GlobeMap::Specular => "earth_specular_4k.jpg",
        }
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// Colour map to draw at `distance`.
pub fn select_lod(distance: f64, switch_distance: f64, detailed_available: bool) -> GlobeLod {
    if detailed_available && distance < switch_distance {
        GlobeLod::Detailed
    } else {
        GlobeLod::Standard
    }
}
