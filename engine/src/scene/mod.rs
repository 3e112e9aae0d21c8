//! Scene Module
//!
//! The globe, its trip folders and their photo planes as a node arena.

pub mod folder;
pub mod graph;

pub use folder::{
    FolderEntry, FolderLayout, GlobeScene, TripFolder, orientation_rotation, pivot_rotation,
};
pub use graph::{NodeId, NodeKind, SceneGraph, SceneNode};
