//! Focus State Machine
//!
//! Turns primary-button pointer input into globe behaviour:
//! - pressing a folder either re-centres the globe on it or, when it is
//!   already focused and centred, selects its trip
//! - pressing the bare globe (or empty space) grabs it for dragging
//! - releasing a drag lets the globe spin on with the last pointer speed
//!
//! The interaction mode itself lives in [`OrbitPhysics`]; this type keeps
//! the focus bookkeeping around it.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::camera::{AngularVelocity, InteractionMode, OrbitPhysics};
use crate::config::GlobeConfig;
use crate::input::{DragRelease, DragTracker, Position};
use crate::scene::GlobeScene;
use crate::trips::TripId;
use crate::world::{GeoCoord, Orientation, clamp_latitude, normalize_longitude};

use super::picking::PickResult;

/// Shortest movement interval used for release speed, so a burst of
/// events inside one millisecond does not fling the globe.
const MIN_SAMPLE_SECONDS: f64 = 1.0 / 240.0;

/// Events the globe reports to its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlobeEvent {
    /// A focused, centred folder was clicked again
    TripSelected { trip_id: TripId },
    /// Secondary click on the globe surface
    LocationPicked(GeoCoord),
}

#[derive(Debug)]
pub struct FocusStateMachine {
    focused: Option<TripId>,
    /// Set while a re-centering started here is in flight
    is_focusing: Rc<Cell<bool>>,
    drag: DragTracker,
    rotate_sensitivity: f64,
    centering_threshold: f64,
    release_window: Duration,
    max_spin_speed: f64,
}

impl FocusStateMachine {
    pub fn new(config: &GlobeConfig) -> Self {
        Self {
            focused: None,
            is_focusing: Rc::new(Cell::new(false)),
            drag: DragTracker::new(),
            rotate_sensitivity: config.rotate_sensitivity,
            centering_threshold: config.centering_threshold,
            release_window: Duration::from_secs_f64(config.release_window.max(0.0)),
            max_spin_speed: config.max_spin_speed,
        }
    }

    pub fn focused(&self) -> Option<TripId> {
        self.focused
    }

    pub fn is_focusing(&self) -> bool {
        self.is_focusing.get()
    }

    /// Whether `coords` is within the centering threshold of the view
    /// centre, on each axis separately.
    pub fn is_centered(&self, orientation: Orientation, coords: GeoCoord) -> bool {
        let lat_diff = (orientation.latitude() - clamp_latitude(coords.lat)).abs();
        let lon_diff = (orientation.longitude() - normalize_longitude(coords.lon)).abs();
        lat_diff < self.centering_threshold && lon_diff < self.centering_threshold
    }

    /// Primary button pressed over `hit`.
    pub fn pointer_down(
        &mut self,
        hit: PickResult,
        position: Position,
        now: Instant,
        scene: &GlobeScene,
        orbit: &mut OrbitPhysics,
    ) -> Option<GlobeEvent> {
        match hit {
            PickResult::Folder { trip_id, .. } => {
                let coords = scene.folder(trip_id)?.folder.coords;
                self.folder_pressed(trip_id, coords, orbit)
            }
            PickResult::Globe { .. } | PickResult::Miss => {
                orbit.grab();
                self.drag.press(position, now);
                None
            }
        }
    }

    fn folder_pressed(
        &mut self,
        trip_id: TripId,
        coords: GeoCoord,
        orbit: &mut OrbitPhysics,
    ) -> Option<GlobeEvent> {
        let centered = self.is_centered(orbit.orientation(), coords);
        if self.focused == Some(trip_id) && centered && !self.is_focusing.get() {
            info!(trip = %trip_id, "trip selected");
            return Some(GlobeEvent::TripSelected { trip_id });
        }

        self.focused = Some(trip_id);
        self.is_focusing.set(true);
        let flag = Rc::clone(&self.is_focusing);
        orbit.set_target(coords.lat, coords.lon, Box::new(move || flag.set(false)));
        debug!(trip = %trip_id, lat = coords.lat, lon = coords.lon, "focusing folder");
        None
    }

    /// Pointer moved. Rotates the globe while it is held.
    ///
    /// The first movement cancels any convergence, and its callback with it.
    pub fn pointer_move(&mut self, position: Position, now: Instant, orbit: &mut OrbitPhysics) {
        let Some(sample) = self.drag.move_to(position, now) else {
            return;
        };
        if sample.dx == 0.0 && sample.dy == 0.0 {
            return;
        }
        self.is_focusing.set(false);
        orbit.apply_drag(
            sample.dy * self.rotate_sensitivity,
            -sample.dx * self.rotate_sensitivity,
        );
    }

    /// Primary button released. A drag turns into a free spin.
    pub fn pointer_up(&mut self, now: Instant, orbit: &mut OrbitPhysics) {
        let Some(release) = self.drag.release(now) else {
            return;
        };
        if orbit.mode() == InteractionMode::Dragging {
            let velocity = self.release_velocity(&release);
            debug!(
                lat_speed = velocity.lat_speed,
                lon_speed = velocity.lon_speed,
                "drag released"
            );
            orbit.release_drag(velocity);
        }
    }

    /// Drop an unfinished drag without spinning.
    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Spin velocity for a release, from the last movement sample.
    pub fn release_velocity(&self, release: &DragRelease) -> AngularVelocity {
        let Some(sample) = release.sample else {
            return AngularVelocity::ZERO;
        };
        if release.idle > self.release_window {
            return AngularVelocity::ZERO;
        }

        let dt = sample.dt.as_secs_f64().max(MIN_SAMPLE_SECONDS);
        let velocity = AngularVelocity::new(
            sample.dy * self.rotate_sensitivity / dt,
            -sample.dx * self.rotate_sensitivity / dt,
        );
        let speed = velocity.magnitude();
        if speed > self.max_spin_speed {
            let scale = self.max_spin_speed / speed;
            AngularVelocity::new(velocity.lat_speed * scale, velocity.lon_speed * scale)
        } else {
            velocity
        }
    }
}
