//! Orbit Physics
//!
//! Drives the globe orientation: direct drag, damped free spin after a
//! release, and eased convergence toward a focus target.
//!
//! Convergence covers a fixed fraction of the remaining distance every tick,
//! regardless of the frame time. The animation therefore runs faster on
//! faster displays; the viewer has always behaved this way.

use tracing::debug;

use crate::config::GlobeConfig;
use crate::world::{Orientation, clamp_latitude, normalize_longitude};

/// Invoked once when a convergence reaches its target.
pub type ArrivalCallback = Box<dyn FnOnce()>;

/// What the globe is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging,
    FreeSpinning,
    Converging,
}

/// Spin rate in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngularVelocity {
    pub lat_speed: f64,
    pub lon_speed: f64,
}

impl AngularVelocity {
    pub const ZERO: Self = Self { lat_speed: 0.0, lon_speed: 0.0 };

    pub fn new(lat_speed: f64, lon_speed: f64) -> Self {
        Self { lat_speed, lon_speed }
    }

    pub fn magnitude(&self) -> f64 {
        self.lat_speed.hypot(self.lon_speed)
    }
}

/// An in-flight re-centering animation.
pub struct FocusTarget {
    pub latitude: f64,
    pub longitude: f64,
    on_arrive: Option<ArrivalCallback>,
}

impl std::fmt::Debug for FocusTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusTarget")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("has_callback", &self.on_arrive.is_some())
            .finish()
    }
}

/// Result of one physics tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitTick {
    /// Nothing moved on its own
    Still,
    Spinning,
    Converging,
    /// The focus target was reached this tick
    Arrived,
}

#[derive(Debug)]
pub struct OrbitPhysics {
    orientation: Orientation,
    velocity: AngularVelocity,
    target: Option<FocusTarget>,
    mode: InteractionMode,
    /// Mode to fall back to once a convergence ends
    resume_mode: InteractionMode,
    damping: f64,
    lerp_speed: f64,
    arrival_threshold: f64,
    rest_speed: f64,
}

impl OrbitPhysics {
    pub fn new(config: &GlobeConfig) -> Self {
        Self {
            orientation: Orientation::default(),
            velocity: AngularVelocity::ZERO,
            target: None,
            mode: InteractionMode::Idle,
            resume_mode: InteractionMode::Idle,
            damping: config.damping,
            lerp_speed: config.lerp_speed,
            arrival_threshold: config.arrival_threshold,
            rest_speed: config.rest_speed,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn velocity(&self) -> AngularVelocity {
        self.velocity
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn target(&self) -> Option<&FocusTarget> {
        self.target.as_ref()
    }

    pub fn is_converging(&self) -> bool {
        self.target.is_some()
    }

    /// Jump straight to an orientation, dropping any motion.
    pub fn set_orientation(&mut self, latitude: f64, longitude: f64) {
        self.orientation.set(latitude, longitude);
    }

    /// Take hold of the globe: stop any spin. A convergence in flight keeps
    /// running until the first drag movement cancels it.
    pub fn grab(&mut self) {
        self.velocity = AngularVelocity::ZERO;
        if self.target.is_none() {
            self.mode = InteractionMode::Dragging;
        }
    }

    /// Start dragging: stop spinning and cancel any convergence.
    ///
    /// A cancelled target's callback is dropped without being called.
    pub fn begin_drag(&mut self) {
        if self.target.take().is_some() {
            debug!("convergence cancelled by drag");
        }
        self.velocity = AngularVelocity::ZERO;
        self.mode = InteractionMode::Dragging;
    }

    /// Rotate directly by the given degrees.
    pub fn apply_drag(&mut self, d_lat: f64, d_lon: f64) {
        self.begin_drag();
        self.orientation.offset(d_lat, d_lon);
    }

    /// Let go of the globe; it keeps turning at `velocity` and slows down.
    pub fn release_drag(&mut self, velocity: AngularVelocity) {
        self.velocity = velocity;
        self.mode = InteractionMode::FreeSpinning;
    }

    /// Start easing toward `(latitude, longitude)`.
    ///
    /// The target is clamped/wrapped like any orientation so the animation
    /// always has a reachable end point.
    pub fn set_target(&mut self, latitude: f64, longitude: f64, on_arrive: ArrivalCallback) {
        if self.mode != InteractionMode::Converging {
            self.resume_mode = match self.mode {
                InteractionMode::FreeSpinning => InteractionMode::FreeSpinning,
                _ => InteractionMode::Idle,
            };
        }
        self.target = Some(FocusTarget {
            latitude: clamp_latitude(latitude),
            longitude: normalize_longitude(longitude),
            on_arrive: Some(on_arrive),
        });
        self.velocity = AngularVelocity::ZERO;
        self.mode = InteractionMode::Converging;
        debug!(latitude, longitude, "convergence started");
    }

    /// Advance one frame. `dt` is in seconds and only affects free spin.
    pub fn tick(&mut self, dt: f64) -> OrbitTick {
        if let Some(target) = self.target.as_mut() {
            let current = self.orientation;
            let new_lat = current.latitude() + (target.latitude - current.latitude()) * self.lerp_speed;
            let new_lon =
                current.longitude() + (target.longitude - current.longitude()) * self.lerp_speed;
            self.orientation.set(new_lat, new_lon);

            let lat_left = (target.latitude - self.orientation.latitude()).abs();
            let lon_left = (target.longitude - self.orientation.longitude()).abs();
            if lat_left < self.arrival_threshold && lon_left < self.arrival_threshold {
                let callback = target.on_arrive.take();
                self.target = None;
                self.mode = self.resume_mode;
                debug!(
                    latitude = self.orientation.latitude(),
                    longitude = self.orientation.longitude(),
                    "convergence arrived"
                );
                if let Some(callback) = callback {
                    callback();
                }
                return OrbitTick::Arrived;
            }
            return OrbitTick::Converging;
        }

        if self.mode == InteractionMode::FreeSpinning {
            self.velocity.lat_speed *= self.damping;
            self.velocity.lon_speed *= self.damping;

            if self.velocity.lat_speed.abs() < self.rest_speed
                && self.velocity.lon_speed.abs() < self.rest_speed
            {
                self.velocity = AngularVelocity::ZERO;
                self.mode = InteractionMode::Idle;
                return OrbitTick::Still;
            }

            self.orientation
                .offset(self.velocity.lat_speed * dt, self.velocity.lon_speed * dt);
            return OrbitTick::Spinning;
        }

        OrbitTick::Still
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn physics() -> OrbitPhysics {
        OrbitPhysics::new(&GlobeConfig::default())
    }

    #[test]
    fn test_starts_idle_at_origin() {
        let p = physics();
        assert_eq!(p.mode(), InteractionMode::Idle);
        assert_eq!(p.orientation(), Orientation::new(0.0, 0.0));
        assert!(!p.is_converging());
    }

    #[test]
    fn test_drag_moves_and_clamps() {
        let mut p = physics();
        p.apply_drag(100.0, 190.0);
        assert_eq!(p.mode(), InteractionMode::Dragging);
        assert_eq!(p.orientation().latitude(), 85.0);
        assert!((p.orientation().longitude() - -170.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_cancels_target_without_callback() {
        let mut p = physics();
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        p.set_target(10.0, 10.0, Box::new(move || flag.set(true)));
        p.apply_drag(1.0, 1.0);
        assert!(!p.is_converging());
        for _ in 0..200 {
            p.tick(1.0 / 60.0);
        }
        assert!(!called.get());
    }

    #[test]
    fn test_grab_keeps_convergence_running() {
        let mut orbit = OrbitPhysics::new(&GlobeConfig::default());
        orbit.set_target(20.0, 0.0, Box::new(|| {}));
        orbit.grab();
        assert!(orbit.is_converging());
        assert_eq!(orbit.mode(), InteractionMode::Converging);
        orbit.tick(1.0 / 60.0);
        assert!(orbit.orientation().latitude() > 0.0);
    }

    #[test]
    fn test_grab_stops_free_spin() {
        let mut orbit = OrbitPhysics::new(&GlobeConfig::default());
        orbit.release_drag(AngularVelocity::new(10.0, 10.0));
        orbit.grab();
        assert_eq!(orbit.mode(), InteractionMode::Dragging);
        assert_eq!(orbit.velocity(), AngularVelocity::ZERO);
    }

    #[test]
    fn test_idle_and_dragging_do_not_move() {
        let mut p = physics();
        p.set_orientation(12.0, 34.0);
        assert_eq!(p.tick(0.5), OrbitTick::Still);
        p.apply_drag(0.0, 0.0);
        assert_eq!(p.tick(0.5), OrbitTick::Still);
        assert_eq!(p.orientation(), Orientation::new(12.0, 34.0));
    }

    #[test]
    fn test_free_spin_applies_damped_velocity() {
        let mut p = physics();
        p.release_drag(AngularVelocity::new(10.0, -20.0));
        assert_eq!(p.tick(0.5), OrbitTick::Spinning);
        // velocity is damped before it is applied
        assert!((p.orientation().latitude() - 4.95).abs() < 1e-9);
        assert!((p.orientation().longitude() - -9.9).abs() < 1e-9);
    }

    #[test]
    fn test_free_spin_settles_to_idle() {
        let mut p = physics();
        p.release_drag(AngularVelocity::new(1.0, 1.0));
        let mut ticks = 0;
        while p.mode() == InteractionMode::FreeSpinning {
            p.tick(1.0 / 60.0);
            ticks += 1;
            assert!(ticks < 10_000);
        }
        assert_eq!(p.mode(), InteractionMode::Idle);
        assert_eq!(p.velocity(), AngularVelocity::ZERO);
    }

    #[test]
    fn test_convergence_is_frame_coupled() {
        let mut fast = physics();
        let mut slow = physics();
        fast.set_target(20.0, 40.0, Box::new(|| {}));
        slow.set_target(20.0, 40.0, Box::new(|| {}));
        fast.tick(0.001);
        slow.tick(1.0);
        assert_eq!(fast.orientation(), slow.orientation());
        assert!((fast.orientation().latitude() - 2.0).abs() < 1e-12);
        assert!((fast.orientation().longitude() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_set_target_clears_velocity() {
        let mut p = physics();
        p.release_drag(AngularVelocity::new(30.0, 30.0));
        p.set_target(0.0, 0.0, Box::new(|| {}));
        assert_eq!(p.velocity(), AngularVelocity::ZERO);
        assert_eq!(p.mode(), InteractionMode::Converging);
    }

    #[test]
    fn test_unreachable_target_is_normalized() {
        let mut p = physics();
        p.set_target(89.0, 190.0, Box::new(|| {}));
        let target = p.target().unwrap();
        assert_eq!(target.latitude, 85.0);
        assert!((target.longitude - -170.0).abs() < 1e-9);
    }

    #[test]
    fn test_arrival_restores_free_spin_mode() {
        let mut p = physics();
        p.release_drag(AngularVelocity::new(5.0, 5.0));
        p.set_target(1.0, 1.0, Box::new(|| {}));
        while p.tick(1.0 / 60.0) != OrbitTick::Arrived {}
        assert_eq!(p.mode(), InteractionMode::FreeSpinning);
        // zero velocity means the spin settles on the next tick
        p.tick(1.0 / 60.0);
        assert_eq!(p.mode(), InteractionMode::Idle);
    }
}
