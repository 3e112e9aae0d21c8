//! Drag Tracker
//!
//! Follows the primary pointer while it is held down. Produces per-move
//! pixel deltas for direct rotation and keeps the most recent movement
//! sample so the release can be turned into a spin.

use std::time::{Duration, Instant};

use super::mouse::Position;

/// One pointer movement while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    /// Horizontal pixels, positive to the right
    pub dx: f64,
    /// Vertical pixels, positive downward
    pub dy: f64,
    /// Time covered by the movement
    pub dt: Duration,
}

/// The movement that was in progress when the pointer was released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRelease {
    /// Last movement sample, if the pointer moved at all
    pub sample: Option<DragSample>,
    /// Time between the last movement and the release
    pub idle: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    dragging: bool,
    last_position: Option<Position>,
    last_time: Option<Instant>,
    last_sample: Option<DragSample>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Start a drag at `position`.
    pub fn press(&mut self, position: Position, now: Instant) {
        self.dragging = true;
        self.last_position = Some(position);
        self.last_time = Some(now);
        self.last_sample = None;
    }

    /// Record a pointer move. Returns the pixel delta while dragging.
    pub fn move_to(&mut self, position: Position, now: Instant) -> Option<DragSample> {
        let previous = self.last_position.replace(position);
        let previous_time = self.last_time.replace(now);
        if !self.dragging {
            return None;
        }

        let last = previous?;
        let sample = DragSample {
            dx: position.x - last.x,
            dy: position.y - last.y,
            dt: previous_time.map_or(Duration::ZERO, |t| now.saturating_duration_since(t)),
        };
        self.last_sample = Some(sample);
        Some(sample)
    }

    /// End the drag. `None` when no drag was in progress.
    pub fn release(&mut self, now: Instant) -> Option<DragRelease> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        let idle = self
            .last_time
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        Some(DragRelease {
            sample: self.last_sample.take(),
            idle,
        })
    }

    /// Forget the drag without releasing it (window lost focus, viewport stopped).
    pub fn cancel(&mut self) {
        self.dragging = false;
        self.last_sample = None;
    }

    /// Last known pointer position, dragging or not.
    pub fn position(&self) -> Option<Position> {
        self.last_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_without_press_give_no_delta() {
        let mut tracker = DragTracker::new();
        let t0 = Instant::now();
        assert!(tracker.move_to(Position::new(10.0, 10.0), t0).is_none());
        assert_eq!(tracker.position(), Some(Position::new(10.0, 10.0)));
        assert!(tracker.release(t0).is_none());
    }

    #[test]
    fn test_drag_reports_deltas() {
        let mut tracker = DragTracker::new();
        let t0 = Instant::now();
        tracker.press(Position::new(100.0, 100.0), t0);
        let sample = tracker
            .move_to(Position::new(110.0, 95.0), t0 + Duration::from_millis(16))
            .unwrap();
        assert_eq!(sample.dx, 10.0);
        assert_eq!(sample.dy, -5.0);
        assert_eq!(sample.dt, Duration::from_millis(16));
    }

    #[test]
    fn test_release_keeps_last_sample_and_idle_time() {
        let mut tracker = DragTracker::new();
        let t0 = Instant::now();
        tracker.press(Position::new(0.0, 0.0), t0);
        tracker.move_to(Position::new(5.0, 0.0), t0 + Duration::from_millis(10));
        tracker.move_to(Position::new(8.0, 1.0), t0 + Duration::from_millis(20));
        let release = tracker.release(t0 + Duration::from_millis(50)).unwrap();
        let sample = release.sample.unwrap();
        assert_eq!((sample.dx, sample.dy), (3.0, 1.0));
        assert_eq!(release.idle, Duration::from_millis(30));
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn test_press_without_move_has_no_sample() {
        let mut tracker = DragTracker::new();
        let t0 = Instant::now();
        tracker.press(Position::new(0.0, 0.0), t0);
        let release = tracker.release(t0).unwrap();
        assert!(release.sample.is_none());
    }

    #[test]
    fn test_cancel_drops_drag() {
        let mut tracker = DragTracker::new();
        let t0 = Instant::now();
        tracker.press(Position::new(0.0, 0.0), t0);
        tracker.cancel();
        assert!(tracker.move_to(Position::new(1.0, 1.0), t0).is_none());
    }
}
