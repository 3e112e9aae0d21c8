//! Trip Folders
//!
//! Builds the globe scene: one folder per trip, each hung from the globe
//! root by a pivot (its coordinates) and an anchor (its altitude). Photo
//! planes join a folder later, as their images finish decoding.
//!
//! Folder-local frame: x east, y north, z away from the globe centre.

use std::collections::HashMap;

use glam::{DMat4, DVec3};
use tracing::{debug, warn};

use super::graph::{NodeId, NodeKind, SceneGraph};
use crate::config::GlobeConfig;
use crate::trips::{DateFormatter, FolderLabel, Trip, TripCollection, TripId};
use crate::world::{GeoCoord, Orientation};

/// What the globe keeps of a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TripFolder {
    pub id: TripId,
    pub coords: GeoCoord,
    pub label: FolderLabel,
    pub preview_images: Vec<String>,
}

impl TripFolder {
    pub fn from_trip(trip: &Trip, dates: &dyn DateFormatter) -> Self {
        Self {
            id: trip.id,
            coords: trip.coords.into(),
            label: FolderLabel::new(&trip.location, &trip.date, dates),
            preview_images: trip.preview_images.clone(),
        }
    }
}

/// A folder and the nodes that belong to it.
#[derive(Debug, Clone)]
pub struct FolderEntry {
    pub folder: TripFolder,
    pub node: NodeId,
    pub label: NodeId,
    /// Attached photo planes, in attach order
    pub planes: Vec<NodeId>,
}

/// Placement constants for folders and their contents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FolderLayout {
    pub folder_size: f64,
    pub photo_spacing: f64,
    pub photo_stagger: f64,
    pub altitude: f64,
    pub label_drop: f64,
}

impl From<&GlobeConfig> for FolderLayout {
    fn from(config: &GlobeConfig) -> Self {
        Self {
            folder_size: config.folder_size,
            photo_spacing: config.photo_spacing,
            photo_stagger: config.photo_stagger,
            altitude: config.folder_altitude,
            label_drop: config.label_drop,
        }
    }
}

impl FolderLayout {
    /// Offset of the `index`-th photo inside its folder; later photos sit
    /// lower-right and further out.
    pub fn plane_offset(&self, index: usize) -> DVec3 {
        let i = index as f64;
        DVec3::new(
            i * self.photo_stagger,
            -i * self.photo_stagger,
            i * self.photo_spacing,
        )
    }

    pub fn label_offset(&self) -> DVec3 {
        DVec3::new(0.0, -self.folder_size * self.label_drop, 0.0)
    }
}

/// Rotation that turns `(lat, lon)` on the globe to face +Z.
pub fn orientation_rotation(orientation: Orientation) -> DMat4 {
    DMat4::from_rotation_x(orientation.latitude().to_radians())
        * DMat4::from_rotation_y(-orientation.longitude().to_radians())
}

/// Rotation that carries +Z to the surface point of `(lat, lon)`, keeping
/// north up.
pub fn pivot_rotation(coords: GeoCoord) -> DMat4 {
    DMat4::from_rotation_y(coords.lon.to_radians()) * DMat4::from_rotation_x(-coords.lat.to_radians())
}

#[derive(Debug, Clone)]
pub struct GlobeScene {
    graph: SceneGraph,
    layout: FolderLayout,
    folders: HashMap<TripId, FolderEntry>,
    /// Trip ids in load order
    order: Vec<TripId>,
}

impl GlobeScene {
    pub fn empty(config: &GlobeConfig) -> Self {
        Self {
            graph: SceneGraph::new(),
            layout: FolderLayout::from(config),
            folders: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// One folder per trip. A repeated trip id keeps the first record.
    pub fn build(trips: &TripCollection, config: &GlobeConfig, dates: &dyn DateFormatter) -> Self {
        let mut scene = Self::empty(config);
        for trip in trips.all() {
            scene.add_folder(TripFolder::from_trip(trip, dates));
        }
        debug!(folders = scene.order.len(), nodes = scene.graph.len(), "globe scene built");
        scene
    }

    pub fn add_folder(&mut self, folder: TripFolder) -> Option<NodeId> {
        if self.folders.contains_key(&folder.id) {
            warn!(trip = %folder.id, "duplicate trip id, folder skipped");
            return None;
        }

        let id = folder.id;
        let root = self.graph.root();
        let pivot = self
            .graph
            .add_node(root, NodeKind::Pivot, pivot_rotation(folder.coords), Some(id));
        let anchor = self.graph.add_node(
            pivot,
            NodeKind::Anchor,
            DMat4::from_translation(DVec3::new(0.0, 0.0, self.layout.altitude)),
            None,
        );
        let node = self
            .graph
            .add_node(anchor, NodeKind::Folder, DMat4::IDENTITY, None);
        let label = self.graph.add_node(
            node,
            NodeKind::Label,
            DMat4::from_translation(self.layout.label_offset()),
            None,
        );

        self.order.push(id);
        self.folders.insert(
            id,
            FolderEntry {
                folder,
                node,
                label,
                planes: Vec::new(),
            },
        );
        Some(node)
    }

    /// Hang a decoded photo on its folder. The plane is `folder_size` wide
    /// and keeps the image aspect.
    ///
    /// Returns `None` for unknown folders and empty images.
    pub fn attach_image_plane(
        &mut self,
        folder: TripId,
        index: usize,
        pixel_width: u32,
        pixel_height: u32,
    ) -> Option<NodeId> {
        if pixel_width == 0 || pixel_height == 0 {
            warn!(trip = %folder, index, "empty image, no plane attached");
            return None;
        }
        let entry = self.folders.get(&folder)?;
        let folder_node = entry.node;

        let aspect = pixel_width as f64 / pixel_height as f64;
        let width = self.layout.folder_size;
        let height = width / aspect;
        let plane = self.graph.add_node(
            folder_node,
            NodeKind::ImagePlane { index, width, height },
            DMat4::from_translation(self.layout.plane_offset(index)),
            None,
        );

        if let Some(entry) = self.folders.get_mut(&folder) {
            entry.planes.push(plane);
        }
        debug!(trip = %folder, index, "image plane attached");
        Some(plane)
    }

    /// Point the globe so `orientation` faces the camera.
    pub fn apply_orientation(&mut self, orientation: Orientation) {
        self.graph.set_root_rotation(orientation_rotation(orientation));
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn layout(&self) -> &FolderLayout {
        &self.layout
    }

    pub fn folder(&self, id: TripId) -> Option<&FolderEntry> {
        self.folders.get(&id)
    }

    /// Folders in load order.
    pub fn folders(&self) -> impl Iterator<Item = &FolderEntry> + '_ {
        self.order.iter().filter_map(|id| self.folders.get(id))
    }

    pub fn folder_count(&self) -> usize {
        self.order.len()
    }

    /// World position of a folder's label anchor.
    pub fn label_position(&self, id: TripId) -> Option<DVec3> {
        let entry = self.folders.get(&id)?;
        self.graph.world_position(entry.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trips::{Coordinates, EnglishDates};
    use crate::world::to_surface_point;

    fn trip(id: u32, lat: f64, lon: f64) -> Trip {
        Trip {
            id: TripId(id),
            date: "2023-07-14".into(),
            location: format!("Place {id}"),
            coords: Coordinates { lat, lon },
            preview_images: vec!["a.jpg".into(), "b.jpg".into()],
            images: Vec::new(),
        }
    }

    fn scene(trips: Vec<Trip>) -> GlobeScene {
        GlobeScene::build(&TripCollection::new(trips), &GlobeConfig::default(), &EnglishDates)
    }

    #[test]
    fn test_folder_sits_above_its_coordinates() {
        let scene = scene(vec![trip(1, 48.85, 2.35)]);
        let entry = scene.folder(TripId(1)).unwrap();
        let pos = scene.graph().world_position(entry.node).unwrap();
        let expected = to_surface_point(48.85, 2.35) * 1.05;
        assert!((pos - expected).length() < 1e-9);
    }

    #[test]
    fn test_folder_copies_trip_fields() {
        let scene = scene(vec![trip(1, 10.0, 20.0)]);
        let folder = &scene.folder(TripId(1)).unwrap().folder;
        assert_eq!(folder.coords, GeoCoord::new(10.0, 20.0));
        assert_eq!(folder.label.title, "Place 1");
        assert_eq!(folder.label.subtitle, "July 2023");
        assert_eq!(folder.preview_images.len(), 2);
    }

    #[test]
    fn test_orientation_brings_folder_to_front() {
        let mut scene = scene(vec![trip(1, -33.9, 151.2)]);
        scene.apply_orientation(Orientation::new(-33.9, 151.2));
        let entry = scene.folder(TripId(1)).unwrap();
        let pos = scene.graph().world_position(entry.node).unwrap();
        assert!((pos - DVec3::new(0.0, 0.0, 1.05)).length() < 1e-9);
    }

    #[test]
    fn test_label_hangs_below_folder() {
        let mut scene = scene(vec![trip(1, 0.0, 0.0)]);
        scene.apply_orientation(Orientation::new(0.0, 0.0));
        let label = scene.label_position(TripId(1)).unwrap();
        assert!((label - DVec3::new(0.0, -0.15, 1.05)).length() < 1e-9);
    }

    #[test]
    fn test_plane_size_and_offset() {
        let mut scene = scene(vec![trip(1, 0.0, 0.0)]);
        let plane = scene.attach_image_plane(TripId(1), 2, 400, 200).unwrap();
        let node = scene.graph().node(plane).unwrap();
        assert_eq!(
            node.kind,
            NodeKind::ImagePlane { index: 2, width: 0.25, height: 0.125 }
        );
        assert_eq!(node.folder, Some(TripId(1)));
        let pos = scene.graph().world_position(plane).unwrap();
        assert!((pos - DVec3::new(0.02, -0.02, 1.09)).length() < 1e-9);
        assert_eq!(scene.folder(TripId(1)).unwrap().planes, vec![plane]);
    }

    #[test]
    fn test_attach_rejects_unknown_folder_and_empty_image() {
        let mut scene = scene(vec![trip(1, 0.0, 0.0)]);
        assert!(scene.attach_image_plane(TripId(7), 0, 10, 10).is_none());
        assert!(scene.attach_image_plane(TripId(1), 0, 0, 10).is_none());
    }

    #[test]
    fn test_duplicate_trip_ids_keep_first() {
        let scene = scene(vec![trip(1, 0.0, 0.0), trip(1, 5.0, 5.0)]);
        assert_eq!(scene.folder_count(), 1);
        assert_eq!(scene.folder(TripId(1)).unwrap().folder.coords, GeoCoord::new(0.0, 0.0));
    }

    #[test]
    fn test_folders_in_load_order() {
        let scene = scene(vec![trip(5, 0.0, 0.0), trip(2, 1.0, 1.0), trip(9, 2.0, 2.0)]);
        let ids: Vec<_> = scene.folders().map(|e| e.folder.id).collect();
        assert_eq!(ids, vec![TripId(5), TripId(2), TripId(9)]);
    }
}
