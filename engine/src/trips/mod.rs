//! Trips Module
//!
//! Trip records, where they come from, and how their labels read.

pub mod label;
pub mod model;
pub mod source;

pub use label::{DateFormatter, EnglishDates, FolderLabel};
pub use model::{Coordinates, Trip, TripId};
pub use source::{JsonTripSource, TripCollection, TripSource};
