//! Trip Sources
//!
//! The globe does not fetch trips itself. A `TripSource` hands over the
//! whole collection once, at load time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::info;

use super::model::{Trip, TripId};
use crate::error::{GlobeError, GlobeResult};

pub trait TripSource {
    fn load_trips(&self) -> GlobeResult<Vec<Trip>>;
}

/// Reads the trip list from a JSON file.
pub struct JsonTripSource {
    path: PathBuf,
}

impl JsonTripSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TripSource for JsonTripSource {
    fn load_trips(&self) -> GlobeResult<Vec<Trip>> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| GlobeError::Io {
            path: self.path.clone(),
            source,
        })?;
        let trips: Vec<Trip> = serde_json::from_str(&text).map_err(|source| GlobeError::Json {
            path: self.path.clone(),
            source,
        })?;
        info!(count = trips.len(), path = %self.path.display(), "loaded trips");
        Ok(trips)
    }
}

/// In-memory trip list, for tests and embedding.
impl TripSource for Vec<Trip> {
    fn load_trips(&self) -> GlobeResult<Vec<Trip>> {
        Ok(self.clone())
    }
}

/// The loaded trips, in file order, with lookup by id.
#[derive(Debug, Clone, Default)]
pub struct TripCollection {
    trips: Vec<Trip>,
    by_id: HashMap<TripId, usize>,
}

impl TripCollection {
    pub fn new(trips: Vec<Trip>) -> Self {
        let mut by_id = HashMap::with_capacity(trips.len());
        for (idx, trip) in trips.iter().enumerate() {
            by_id.entry(trip.id).or_insert(idx);
        }
        Self { trips, by_id }
    }

    pub fn load(source: &dyn TripSource) -> GlobeResult<Self> {
        Ok(Self::new(source.load_trips()?))
    }

    pub fn get(&self, id: TripId) -> Option<&Trip> {
        self.by_id.get(&id).map(|&idx| &self.trips[idx])
    }

    pub fn all(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trips::model::Coordinates;

    fn trip(id: u32) -> Trip {
        Trip {
            id: TripId(id),
            date: "2021-05-01".into(),
            location: format!("Place {id}"),
            coords: Coordinates { lat: 0.0, lon: 0.0 },
            preview_images: vec![],
            images: vec![],
        }
    }

    #[test]
    fn test_collection_lookup_by_id() {
        let collection = TripCollection::load(&vec![trip(7), trip(2)]).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(TripId(2)).unwrap().location, "Place 2");
        assert!(collection.get(TripId(99)).is_none());
        assert_eq!(collection.all()[0].id, TripId(7));
    }

    #[test]
    fn test_duplicate_id_resolves_to_first_record() {
        let mut first = trip(1);
        first.location = "First".into();
        let mut second = trip(1);
        second.location = "Second".into();
        second.coords = Coordinates { lat: 40.0, lon: 40.0 };

        let collection = TripCollection::new(vec![first, second]);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(TripId(1)).unwrap().location, "First");
    }

    #[test]
    fn test_json_source_reads_file() {
        let dir = std::env::temp_dir().join(format!("trip_globe_src_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("trips.json");
        std::fs::write(&path, serde_json::to_string(&vec![trip(1)]).unwrap()).unwrap();

        let trips = JsonTripSource::new(&path).load_trips().unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].id, TripId(1));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_json_source_reports_bad_json() {
        let dir = std::env::temp_dir().join(format!("trip_globe_bad_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("trips.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonTripSource::new(&path).load_trips().unwrap_err();
        assert!(matches!(err, GlobeError::Json { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }
}
