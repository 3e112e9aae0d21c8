//! Render Loop
//!
//! The per-frame driver. Each tick measures the frame time, then runs the
//! frame stages in a fixed order:
//! 1. advance physics by `dt`
//! 2. apply the orientation to the globe root
//! 3. draw the scene
//! 4. place and draw the labels
//!
//! The loop only runs between `start` and `stop`.

use std::time::Instant;

use tracing::{debug, trace};

use crate::error::GlobeResult;

/// Longest frame time fed to physics, in seconds.
pub const MAX_FRAME_SECONDS: f64 = 0.25;

/// The work done in one frame, in call order.
pub trait FrameStages {
    fn advance(&mut self, dt: f64);
    fn apply_orientation(&mut self);
    fn draw(&mut self) -> GlobeResult<()>;
    fn sync_labels(&mut self) -> GlobeResult<()>;
}

/// Whether the host should schedule another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Continue,
    Stopped,
}

/// Measures time between ticks.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
    frame_count: u64,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self { last: now, frame_count: 0 }
    }

    /// Seconds since the previous tick, capped at [`MAX_FRAME_SECONDS`].
    pub fn tick(&mut self, now: Instant) -> f64 {
        let dt = now.saturating_duration_since(self.last).as_secs_f64();
        self.last = now;
        self.frame_count += 1;
        dt.min(MAX_FRAME_SECONDS)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Owned by the viewport; built once the scene and camera exist.
#[derive(Debug)]
pub struct RenderLoop {
    clock: Option<FrameClock>,
}

impl RenderLoop {
    pub(crate) fn new() -> Self {
        Self { clock: None }
    }

    pub fn start(&mut self, now: Instant) {
        if self.clock.is_none() {
            debug!("render loop started");
            self.clock = Some(FrameClock::new(now));
        }
    }

    pub fn stop(&mut self) {
        if let Some(clock) = self.clock.take() {
            debug!(frames = clock.frame_count(), "render loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_some()
    }

    pub fn frame_count(&self) -> u64 {
        self.clock.map_or(0, |c| c.frame_count())
    }

    /// Run one frame. Does nothing once stopped.
    pub fn tick(&mut self, now: Instant, stages: &mut impl FrameStages) -> GlobeResult<TickStatus> {
        let Some(clock) = self.clock.as_mut() else {
            return Ok(TickStatus::Stopped);
        };
        let dt = clock.tick(now);
        trace!(dt, "frame");

        stages.advance(dt);
        stages.apply_orientation();
        stages.draw()?;
        stages.sync_labels()?;
        Ok(TickStatus::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl FrameStages for Recorder {
        fn advance(&mut self, dt: f64) {
            self.calls.push(format!("advance {dt:.3}"));
        }
        fn apply_orientation(&mut self) {
            self.calls.push("orient".into());
        }
        fn draw(&mut self) -> GlobeResult<()> {
            self.calls.push("draw".into());
            Ok(())
        }
        fn sync_labels(&mut self) -> GlobeResult<()> {
            self.calls.push("labels".into());
            Ok(())
        }
    }

    #[test]
    fn test_stages_run_in_order() {
        let t0 = Instant::now();
        let mut render_loop = RenderLoop::new();
        let mut rec = Recorder::default();
        render_loop.start(t0);
        let status = render_loop
            .tick(t0 + Duration::from_millis(16), &mut rec)
            .unwrap();
        assert_eq!(status, TickStatus::Continue);
        assert_eq!(rec.calls, vec!["advance 0.016", "orient", "draw", "labels"]);
    }

    #[test]
    fn test_no_tick_before_start_or_after_stop() {
        let t0 = Instant::now();
        let mut render_loop = RenderLoop::new();
        let mut rec = Recorder::default();
        assert_eq!(render_loop.tick(t0, &mut rec).unwrap(), TickStatus::Stopped);

        render_loop.start(t0);
        render_loop.tick(t0, &mut rec).unwrap();
        render_loop.stop();
        assert!(!render_loop.is_running());
        assert_eq!(render_loop.tick(t0, &mut rec).unwrap(), TickStatus::Stopped);
        assert_eq!(rec.calls.len(), 4);
    }

    #[test]
    fn test_long_frames_are_capped() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(t0);
        assert_eq!(clock.tick(t0 + Duration::from_secs(5)), MAX_FRAME_SECONDS);
        assert_eq!(clock.frame_count(), 1);
    }
}
