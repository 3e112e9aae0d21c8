//! Trip records as delivered by the trip data file.

use serde::{Deserialize, Serialize};

use crate::world::GeoCoord;

/// Identifier of a trip, and of the folder that represents it on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub u32);

impl std::fmt::Display for TripId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinates> for GeoCoord {
    fn from(c: Coordinates) -> Self {
        GeoCoord::new(c.lat, c.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    /// ISO date, e.g. `2023-07-14`
    pub date: String,
    pub location: String,
    pub coords: Coordinates,
    /// Photos stacked in the folder on the globe, front first
    #[serde(default)]
    pub preview_images: Vec<String>,
    /// Full gallery shown once the trip is selected
    #[serde(default)]
    pub images: Vec<String>,
}
