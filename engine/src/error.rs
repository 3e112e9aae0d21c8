//! Error types shared across the engine.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlobeError {
    #[error("viewport has zero size ({width}x{height})")]
    ZeroSizedViewport { width: u32, height: u32 },

    #[error("failed to create rendering surface: {0}")]
    Surface(String),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),

    #[error("failed to create GPU device: {0}")]
    Device(String),

    #[error("surface frame unavailable: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode image {path}: {reason}")]
    Image { path: PathBuf, reason: String },

    #[error("failed to start texture worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("texture worker is gone")]
    WorkerDisconnected,
}

pub type GlobeResult<T> = Result<T, GlobeError>;
