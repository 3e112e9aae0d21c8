//! Trip Globe Viewer
//!
//! Run with: `cargo run --bin trip-globe -- --trips assets/images/photos/trips.json`
//!
//! Shows every trip as a photo folder on a rotating globe.
//!
//! Controls:
//! - Left-drag: Spin the globe
//! - Left-click folder: Centre it; click again to open the trip
//! - Right-click: Pick a location on the globe
//! - Scroll: Zoom in/out
//! - ESC: Exit
//!
//! Set `RUST_LOG=trip_globe_engine=debug` for interaction tracing.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use trip_globe_engine::render::GpuContextConfig;
use trip_globe_engine::{
    GlobeConfig, GlobeError, GlobeEvent, GlobeRenderer, GlobeResult, GlobeViewport,
    JsonTripSource, MouseButton, Position, ScrollDelta, TextureLoader, TickStatus,
    TripCollection, ViewerConfig,
};

// ============================================================================
// COMMAND LINE
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "trip-globe", about = "Browse trip photo folders on a 3D globe")]
struct Args {
    /// Viewer settings JSON; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trip collection JSON
    #[arg(long)]
    trips: Option<PathBuf>,

    /// Root that image URLs resolve against
    #[arg(long)]
    assets: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Render uncapped instead of at the display refresh rate
    #[arg(long)]
    no_vsync: bool,
}

impl Args {
    fn viewer_config(&self) -> GlobeResult<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };
        if let Some(trips) = &self.trips {
            config.trips_path = trips.clone();
        }
        if let Some(assets) = &self.assets {
            config.asset_root = assets.clone();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.no_vsync {
            config.vsync = false;
        }
        Ok(config)
    }
}

// ============================================================================
// APPLICATION
// ============================================================================

struct AppState {
    window: Arc<Window>,
    viewport: GlobeViewport,
}

impl AppState {
    fn new(window: Arc<Window>, viewer: &ViewerConfig, trips: &TripCollection) -> GlobeResult<Self> {
        let renderer = GlobeRenderer::new(
            Arc::clone(&window),
            &GpuContextConfig {
                vsync: viewer.vsync,
                high_performance: true,
            },
        )?;
        let max_texture_size = viewer.max_texture_size.min(renderer.max_texture_size());
        let (width, height) = renderer.gpu().dimensions();

        let mut viewport = GlobeViewport::new(
            GlobeConfig::default(),
            width,
            height,
            trips,
            Box::new(renderer),
            Instant::now(),
        )?;

        let loader = TextureLoader::spawn(max_texture_size)?;
        let maps = loader.request_globe_maps(&viewer.globe_texture_dir)?;
        if maps.is_empty() {
            warn!(
                dir = %viewer.globe_texture_dir.display(),
                "no globe maps found, drawing a plain globe"
            );
        }
        loader.request_previews(viewport.scene(), |url| viewer.resolve_asset(url))?;
        viewport.set_texture_loader(loader);

        Ok(Self { window, viewport })
    }
}

struct App {
    viewer: ViewerConfig,
    trips: TripCollection,
    state: Option<AppState>,
    cursor: Position,
    failure: Option<GlobeError>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: GlobeError) {
        error!(%err, "viewer stopped");
        if let Some(state) = self.state.as_mut() {
            state.viewport.stop();
        }
        self.failure = Some(err);
        event_loop.exit();
    }

    fn report(&self, events: Vec<GlobeEvent>) {
        for event in events {
            match event {
                GlobeEvent::TripSelected { trip_id } => match self.trips.get(trip_id) {
                    Some(trip) => info!(
                        trip = %trip_id,
                        location = %trip.location,
                        date = %trip.date,
                        images = ?trip.images,
                        "open trip gallery"
                    ),
                    None => warn!(trip = %trip_id, "selected trip not in collection"),
                },
                GlobeEvent::LocationPicked(coord) => {
                    info!(lat = coord.lat, lon = coord.lon, "location picked for a new trip");
                }
            }
        }
    }
}

fn to_globe_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(id) => MouseButton::Other(id),
    }
}

fn to_scroll(delta: MouseScrollDelta) -> ScrollDelta {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => ScrollDelta::from_lines(x, y),
        MouseScrollDelta::PixelDelta(pos) => ScrollDelta::from_pixels(pos.x, pos.y),
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("Trip Globe")
            .with_inner_size(PhysicalSize::new(self.viewer.width, self.viewer.height));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, GlobeError::Surface(e.to_string()));
                return;
            }
        };

        match AppState::new(Arc::clone(&window), &self.viewer, &self.trips) {
            Ok(state) => {
                info!(trips = self.trips.len(), "viewer ready");
                self.state = Some(state);
                window.request_redraw();
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let now = Instant::now();

        match event {
            WindowEvent::CloseRequested => {
                state.viewport.stop();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                    && event.state == ElementState::Pressed
                {
                    state.viewport.stop();
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(size) => {
                state.viewport.resize(size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Position::new(position.x, position.y);
                state.viewport.pointer_move(self.cursor, now);
            }
            WindowEvent::MouseInput { state: button_state, button, .. } => {
                let button = to_globe_button(button);
                match button_state {
                    ElementState::Pressed => state.viewport.pointer_down(button, self.cursor, now),
                    ElementState::Released => state.viewport.pointer_up(button, now),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                state.viewport.wheel(to_scroll(delta));
            }
            WindowEvent::RedrawRequested => match state.viewport.frame(now) {
                Ok(TickStatus::Continue) => {}
                Ok(TickStatus::Stopped) => event_loop.exit(),
                Err(err) => {
                    self.fail(event_loop, err);
                    return;
                }
            },
            _ => {}
        }

        if let Some(state) = self.state.as_mut() {
            let events = state.viewport.drain_events();
            self.report(events);
        }
    }

    fn about_to_wait(&mut self, _: &ActiveEventLoop) {
        if let Some(state) = &self.state
            && state.viewport.is_running()
        {
            state.window.request_redraw();
        }
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let viewer = match args.viewer_config() {
        Ok(viewer) => viewer,
        Err(err) => {
            error!(%err, "invalid viewer config");
            return ExitCode::FAILURE;
        }
    };

    let trips = match TripCollection::load(&JsonTripSource::new(&viewer.trips_path)) {
        Ok(trips) => trips,
        Err(err) => {
            error!(%err, "could not load trips");
            return ExitCode::FAILURE;
        }
    };
    info!(count = trips.len(), path = %viewer.trips_path.display(), "trips loaded");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!(%err, "no event loop");
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        viewer,
        trips,
        state: None,
        cursor: Position::new(0.0, 0.0),
        failure: None,
    };
    if let Err(err) = event_loop.run_app(&mut app) {
        error!(%err, "event loop failed");
        return ExitCode::FAILURE;
    }

    if app.failure.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
