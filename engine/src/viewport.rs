//! Globe Viewport
//!
//! The top-level globe widget. It owns the camera, the orbit, the scene and
//! the render loop, turns host input into globe behaviour, and collects the
//! events the host reacts to.
//!
//! The host forwards window events and calls [`GlobeViewport::frame`] once
//! per display refresh:
//!
//! ```ignore
//! let mut viewport = GlobeViewport::new(GlobeConfig::default(), 1280, 720, &trips, sink, Instant::now())?;
//! viewport.pointer_down(MouseButton::Left, Position::new(640.0, 360.0), Instant::now());
//! viewport.frame(Instant::now())?;
//! for event in viewport.drain_events() {
//!     // open the gallery, start the "add trip" flow, ...
//! }
//! ```

use std::time::Instant;

use tracing::{debug, info};

use crate::camera::{GlobeCamera, InteractionMode, OrbitPhysics, ScreenPoint};
use crate::config::GlobeConfig;
use crate::error::GlobeResult;
use crate::input::{MouseButton, Position, ScrollDelta};
use crate::interaction::{
    FocusStateMachine, GlobeEvent, NoOverlay, OverlayProbe, pick, pick_surface,
};
use crate::render::{
    DecodedImage, FrameSink, FrameStages, FrameView, GlobeLod, GlobeMap, LabelLayer,
    LoaderEvent, RenderLoop, TextureLoader, TextureTarget, TickStatus, select_lod,
};
use crate::scene::GlobeScene;
use crate::trips::{DateFormatter, EnglishDates, TripCollection, TripId};
use crate::world::{GeoCoord, Orientation};

/// Per-frame state the render loop drives.
struct FrameState {
    camera: GlobeCamera,
    orbit: OrbitPhysics,
    scene: GlobeScene,
    labels: LabelLayer,
    sink: Box<dyn FrameSink>,
    lod_switch_distance: f64,
    detailed_available: bool,
}

impl FrameState {
    fn lod(&self) -> GlobeLod {
        select_lod(
            self.camera.distance(),
            self.lod_switch_distance,
            self.detailed_available,
        )
    }

    fn attach_image(&mut self, image: &DecodedImage) {
        match image.target {
            TextureTarget::Plane { folder, index } => {
                if self
                    .scene
                    .attach_image_plane(folder, index, image.width, image.height)
                    .is_some()
                {
                    self.sink.upload(image);
                }
            }
            TextureTarget::Globe(map) => {
                if map == GlobeMap::Color(GlobeLod::Detailed) {
                    self.detailed_available = true;
                }
                self.sink.upload(image);
            }
        }
    }
}

impl FrameStages for FrameState {
    fn advance(&mut self, dt: f64) {
        self.orbit.tick(dt);
    }

    fn apply_orientation(&mut self) {
        self.scene.apply_orientation(self.orbit.orientation());
    }

    fn draw(&mut self) -> GlobeResult<()> {
        let view = FrameView {
            camera: &self.camera,
            scene: &self.scene,
            lod: self.lod(),
        };
        self.sink.draw_scene(&view)
    }

    fn sync_labels(&mut self) -> GlobeResult<()> {
        self.labels.update(&self.scene, &self.camera);
        let mesh = self.labels.build_mesh(&self.scene);
        self.sink.draw_labels(&mesh)
    }
}

pub struct GlobeViewport {
    state: FrameState,
    render_loop: RenderLoop,
    focus: FocusStateMachine,
    overlay: Box<dyn OverlayProbe>,
    loader: Option<TextureLoader>,
    events: Vec<GlobeEvent>,
    pending_resize: Option<(u32, u32)>,
    stopped: bool,
}

impl GlobeViewport {
    /// Build the scene for `trips` and start the render loop.
    ///
    /// Fails with `ZeroSizedViewport` when either edge is zero; the loop
    /// is never started in that case.
    pub fn new(
        config: GlobeConfig,
        width: u32,
        height: u32,
        trips: &TripCollection,
        sink: Box<dyn FrameSink>,
        now: Instant,
    ) -> GlobeResult<Self> {
        Self::with_dates(config, width, height, trips, &EnglishDates, sink, now)
    }

    /// Like [`GlobeViewport::new`], with a custom label date format.
    pub fn with_dates(
        config: GlobeConfig,
        width: u32,
        height: u32,
        trips: &TripCollection,
        dates: &dyn DateFormatter,
        sink: Box<dyn FrameSink>,
        now: Instant,
    ) -> GlobeResult<Self> {
        let camera = GlobeCamera::new(&config, width, height)?;
        let scene = GlobeScene::build(trips, &config, dates);
        let state = FrameState {
            camera,
            orbit: OrbitPhysics::new(&config),
            scene,
            labels: LabelLayer::new(width, height),
            sink,
            lod_switch_distance: config.lod_switch_distance,
            detailed_available: false,
        };

        let mut render_loop = RenderLoop::new();
        render_loop.start(now);
        info!(
            folders = state.scene.folder_count(),
            width, height, "globe viewport started"
        );

        Ok(Self {
            state,
            render_loop,
            focus: FocusStateMachine::new(&config),
            overlay: Box::new(NoOverlay),
            loader: None,
            events: Vec::new(),
            pending_resize: None,
            stopped: false,
        })
    }

    /// UI drawn above the globe that may claim the wheel.
    pub fn set_overlay_probe(&mut self, probe: Box<dyn OverlayProbe>) {
        self.overlay = probe;
    }

    /// Decoded images from `loader` are attached at the start of each frame.
    pub fn set_texture_loader(&mut self, loader: TextureLoader) {
        self.loader = Some(loader);
    }

    pub fn texture_loader(&self) -> Option<&TextureLoader> {
        self.loader.as_ref()
    }

    pub fn pointer_down(&mut self, button: MouseButton, position: Position, now: Instant) {
        if self.stopped {
            return;
        }
        match button {
            MouseButton::Left => {
                let state = &mut self.state;
                let hit = pick(
                    position.x,
                    position.y,
                    &state.camera,
                    &state.scene,
                    &state.labels,
                    state.orbit.orientation(),
                );
                if let Some(event) =
                    self.focus
                        .pointer_down(hit, position, now, &state.scene, &mut state.orbit)
                {
                    self.events.push(event);
                }
            }
            MouseButton::Right => {
                self.right_click(position);
            }
            MouseButton::Middle | MouseButton::Other(_) => {}
        }
    }

    pub fn pointer_move(&mut self, position: Position, now: Instant) {
        if self.stopped {
            return;
        }
        self.focus.pointer_move(position, now, &mut self.state.orbit);
    }

    pub fn pointer_up(&mut self, button: MouseButton, now: Instant) {
        if self.stopped || !button.is_primary() {
            return;
        }
        self.focus.pointer_up(now, &mut self.state.orbit);
    }

    /// Secondary click: report the globe coordinate under the pointer.
    /// Rotation state is left alone.
    pub fn right_click(&mut self, position: Position) -> Option<GeoCoord> {
        if self.stopped {
            return None;
        }
        let coord = pick_surface(
            position.x,
            position.y,
            &self.state.camera,
            self.state.orbit.orientation(),
        )?;
        debug!(lat = coord.lat, lon = coord.lon, "location picked");
        self.events.push(GlobeEvent::LocationPicked(coord));
        Some(coord)
    }

    /// Zoom by a wheel delta unless an overlay holds the pointer.
    pub fn wheel(&mut self, delta: ScrollDelta) {
        if self.stopped || delta.is_zero() || self.overlay.overlay_hovered() {
            return;
        }
        self.state.camera.zoom(delta.y);
    }

    /// Record a new size. Applied at the start of the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
    }

    /// Run one frame: apply the pending resize, attach decoded images,
    /// then tick the render loop.
    pub fn frame(&mut self, now: Instant) -> GlobeResult<TickStatus> {
        if !self.render_loop.is_running() {
            return Ok(TickStatus::Stopped);
        }
        self.apply_pending_resize();
        self.drain_loader();
        self.render_loop.tick(now, &mut self.state)
    }

    fn apply_pending_resize(&mut self) {
        let Some((width, height)) = self.pending_resize.take() else {
            return;
        };
        let state = &mut self.state;
        if state.camera.resize(width, height) {
            state.labels.resize(width, height);
            state.sink.resize(width, height);
            debug!(width, height, "viewport resized");
        }
    }

    fn drain_loader(&mut self) {
        let Some(loader) = self.loader.as_ref() else {
            return;
        };
        for event in loader.drain() {
            match event {
                LoaderEvent::Decoded(image) => self.state.attach_image(&image),
                LoaderEvent::Failed { target, .. } => {
                    debug!(texture = ?target, "texture skipped");
                }
            }
        }
    }

    /// Attach a decoded image directly, bypassing the loader.
    pub fn attach_image(&mut self, image: &DecodedImage) {
        self.state.attach_image(image);
    }

    /// Stop the loop and ignore all further input.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.focus.cancel_drag();
        self.render_loop.stop();
        self.loader = None;
        info!("globe viewport stopped");
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn drain_events(&mut self) -> Vec<GlobeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Where a folder currently sits on screen, in pixels.
    pub fn folder_screen_position(&self, trip_id: TripId) -> Option<ScreenPoint> {
        let entry = self.state.scene.folder(trip_id)?;
        let position = self.state.scene.graph().world_position(entry.node)?;
        self.state.camera.project(position)
    }

    pub fn orientation(&self) -> Orientation {
        self.state.orbit.orientation()
    }

    pub fn mode(&self) -> InteractionMode {
        self.state.orbit.mode()
    }

    pub fn distance(&self) -> f64 {
        self.state.camera.distance()
    }

    pub fn size(&self) -> (u32, u32) {
        self.state.camera.size()
    }

    pub fn lod(&self) -> GlobeLod {
        self.state.lod()
    }

    pub fn focused(&self) -> Option<TripId> {
        self.focus.focused()
    }

    pub fn camera(&self) -> &GlobeCamera {
        &self.state.camera
    }

    pub fn scene(&self) -> &GlobeScene {
        &self.state.scene
    }

    pub fn labels(&self) -> &LabelLayer {
        &self.state.labels
    }

    pub fn frame_count(&self) -> u64 {
        self.render_loop.frame_count()
    }
}

impl Drop for GlobeViewport {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullFrameSink;
    use crate::trips::{Coordinates, Trip};
    use std::time::Duration;

    fn viewport() -> GlobeViewport {
        let trips = TripCollection::new(vec![Trip {
            id: TripId(7),
            date: "2019-08-01".into(),
            location: "Kyoto".into(),
            coords: Coordinates { lat: 35.0, lon: 135.7 },
            preview_images: vec!["k.jpg".into()],
            images: Vec::new(),
        }]);
        GlobeViewport::new(
            GlobeConfig::default(),
            800,
            600,
            &trips,
            Box::new(NullFrameSink),
            Instant::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let result = GlobeViewport::new(
            GlobeConfig::default(),
            0,
            600,
            &TripCollection::default(),
            Box::new(NullFrameSink),
            Instant::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_wheel_blocked_by_overlay() {
        let mut vp = viewport();
        vp.set_overlay_probe(Box::new(|| true));
        let before = vp.distance();
        vp.wheel(ScrollDelta::from_pixels(0.0, -400.0));
        assert_eq!(vp.distance(), before);

        vp.set_overlay_probe(Box::new(NoOverlay));
        vp.wheel(ScrollDelta::from_pixels(0.0, -400.0));
        assert!(vp.distance() > before);
    }

    #[test]
    fn test_last_resize_wins() {
        let mut vp = viewport();
        vp.resize(1024, 768);
        vp.resize(0, 0);
        vp.resize(640, 480);
        assert_eq!(vp.size(), (800, 600));
        vp.frame(Instant::now()).unwrap();
        assert_eq!(vp.size(), (640, 480));
        assert_eq!(vp.labels().size(), (640, 480));
    }

    #[test]
    fn test_stop_ignores_input_and_frames() {
        let mut vp = viewport();
        let start = Instant::now();
        vp.stop();
        vp.pointer_down(MouseButton::Left, Position::new(400.0, 300.0), start);
        vp.pointer_move(Position::new(500.0, 300.0), start + Duration::from_millis(16));
        assert_eq!(vp.mode(), InteractionMode::Idle);
        assert!(vp.right_click(Position::new(400.0, 300.0)).is_none());
        assert_eq!(vp.frame(start).unwrap(), TickStatus::Stopped);
        assert!(vp.drain_events().is_empty());
    }

    #[test]
    fn test_plane_attaches_only_for_known_folders() {
        let mut vp = viewport();
        let image = |folder| DecodedImage {
            target: TextureTarget::Plane { folder, index: 0 },
            width: 4,
            height: 3,
            rgba: vec![0; 4 * 3 * 4],
        };
        vp.attach_image(&image(TripId(7)));
        vp.attach_image(&image(TripId(99)));
        let entry = vp.scene().folder(TripId(7)).unwrap();
        assert_eq!(entry.planes.len(), 1);
    }
}
