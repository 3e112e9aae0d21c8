//! Texture Loader
//!
//! Decodes photos and globe maps on a worker thread. Requests go in over
//! one channel and decoded RGBA images come back over another; the viewport
//! drains the results at the start of each frame.
//!
//! Images wider or taller than the GPU limit are scaled down to fit,
//! keeping their aspect ratio.
//!
//! Dropping the loader raises a cancel flag the worker checks before every
//! decode, so queued requests are abandoned rather than worked off.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use image::imageops::FilterType;
use tracing::{debug, warn};

use super::lod::GlobeMap;
use crate::error::{GlobeError, GlobeResult};
use crate::scene::GlobeScene;
use crate::trips::TripId;

/// What a decoded image is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Plane { folder: TripId, index: usize },
    Globe(GlobeMap),
}

/// An RGBA8 image ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub target: TextureTarget,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("target", &self.target)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

enum LoaderCommand {
    Load { target: TextureTarget, path: PathBuf },
    Shutdown,
}

pub enum LoaderEvent {
    Decoded(DecodedImage),
    Failed { target: TextureTarget, error: GlobeError },
}

pub struct TextureLoader {
    tx_cmd: Sender<LoaderCommand>,
    rx_evt: Receiver<LoaderEvent>,
    cancelled: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TextureLoader {
    pub fn spawn(max_texture_size: u32) -> GlobeResult<Self> {
        let (tx_cmd, rx_cmd) = mpsc::channel::<LoaderCommand>();
        let (tx_evt, rx_evt) = mpsc::channel::<LoaderEvent>();
        let max_size = max_texture_size.max(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);

        let thread = thread::Builder::new()
            .name("texture-loader".to_string())
            .spawn(move || loader_loop(rx_cmd, tx_evt, worker_cancelled, max_size))
            .map_err(GlobeError::WorkerSpawn)?;

        Ok(Self {
            tx_cmd,
            rx_evt,
            cancelled,
            thread: Some(thread),
        })
    }

    pub fn request(&self, target: TextureTarget, path: impl Into<PathBuf>) -> GlobeResult<()> {
        self.tx_cmd
            .send(LoaderCommand::Load { target, path: path.into() })
            .map_err(|_| GlobeError::WorkerDisconnected)
    }

    /// Queue every preview photo of every folder, in folder then stack order.
    pub fn request_previews(
        &self,
        scene: &GlobeScene,
        resolve: impl Fn(&str) -> PathBuf,
    ) -> GlobeResult<usize> {
        let mut count = 0;
        for entry in scene.folders() {
            for (index, url) in entry.folder.preview_images.iter().enumerate() {
                let target = TextureTarget::Plane { folder: entry.folder.id, index };
                self.request(target, resolve(url))?;
                count += 1;
            }
        }
        debug!(count, "preview images requested");
        Ok(count)
    }

    /// Queue the globe maps found in `dir`. Missing maps are skipped.
    pub fn request_globe_maps(&self, dir: &Path) -> GlobeResult<Vec<GlobeMap>> {
        let mut requested = Vec::new();
        for map in GlobeMap::ALL {
            let path = map.path_in(dir);
            if path.is_file() {
                self.request(TextureTarget::Globe(map), path)?;
                requested.push(map);
            } else {
                debug!(path = %path.display(), "globe map not found");
            }
        }
        Ok(requested)
    }

    pub fn try_recv(&self) -> Option<LoaderEvent> {
        self.rx_evt.try_recv().ok()
    }

    /// Everything decoded since the last call.
    pub fn drain(&self) -> Vec<LoaderEvent> {
        self.rx_evt.try_iter().collect()
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        let _ = self.tx_cmd.send(LoaderCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn loader_loop(
    rx_cmd: Receiver<LoaderCommand>,
    tx_evt: Sender<LoaderEvent>,
    cancelled: Arc<AtomicBool>,
    max_size: u32,
) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(cores) = core_affinity::get_core_ids()
            && cores.len() > 1
        {
            let _ = core_affinity::set_for_current(cores[1]);
        }
    }

    while let Ok(cmd) = rx_cmd.recv() {
        if cancelled.load(Ordering::Acquire) {
            debug!("texture loader cancelled");
            break;
        }
        match cmd {
            LoaderCommand::Load { target, path } => {
                let event = match decode_image(&path, max_size) {
                    Ok((width, height, rgba)) => LoaderEvent::Decoded(DecodedImage {
                        target,
                        width,
                        height,
                        rgba,
                    }),
                    Err(error) => {
                        warn!(texture = ?target, %error, "texture not loaded");
                        LoaderEvent::Failed { target, error }
                    }
                };
                if tx_evt.send(event).is_err() {
                    break;
                }
            }
            LoaderCommand::Shutdown => break,
        }
    }
}

/// Decode `path` to RGBA8, scaled down to fit `max_size` on both edges.
pub fn decode_image(path: &Path, max_size: u32) -> GlobeResult<(u32, u32, Vec<u8>)> {
    let img = image::open(path).map_err(|e| GlobeError::Image {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let img = if img.width() > max_size || img.height() > max_size {
        debug!(
            path = %path.display(),
            width = img.width(),
            height = img.height(),
            max_size,
            "downscaling texture"
        );
        img.resize(max_size, max_size, FilterType::Triangle)
    } else {
        img
    };
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((width, height, rgba.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn temp_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "trip_globe_{}_{}_{name}.png",
            std::process::id(),
            width
        ));
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();
        path
    }

    fn wait_for(loader: &TextureLoader) -> LoaderEvent {
        let start = Instant::now();
        loop {
            if let Some(event) = loader.try_recv() {
                return event;
            }
            assert!(start.elapsed() < Duration::from_secs(10), "loader timed out");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_decode_keeps_small_images() {
        let path = temp_png("small", 4, 2);
        let (w, h, rgba) = decode_image(&path, 16).unwrap();
        assert_eq!((w, h), (4, 2));
        assert_eq!(rgba.len(), 4 * 2 * 4);
        assert_eq!(&rgba[..4], &[10, 20, 30, 255]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_decode_downscales_large_images() {
        let path = temp_png("large", 64, 32);
        let (w, h, _) = decode_image(&path, 16).unwrap();
        assert_eq!((w, h), (16, 8));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_image_error() {
        let err = decode_image(Path::new("/nonexistent/photo.jpg"), 16).unwrap_err();
        assert!(matches!(err, GlobeError::Image { .. }));
    }

    #[test]
    fn test_worker_round_trip() {
        let path = temp_png("worker", 8, 8);
        let loader = TextureLoader::spawn(1024).unwrap();
        let target = TextureTarget::Plane { folder: TripId(3), index: 1 };
        loader.request(target, &path).unwrap();
        match wait_for(&loader) {
            LoaderEvent::Decoded(image) => {
                assert_eq!(image.target, target);
                assert_eq!((image.width, image.height), (8, 8));
            }
            LoaderEvent::Failed { error, .. } => panic!("decode failed: {error}"),
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_drop_abandons_queued_decodes() {
        let path = temp_png("backlog", 1500, 1500);
        let single = Instant::now();
        decode_image(&path, 4096).unwrap();
        let one_decode = single.elapsed();

        let loader = TextureLoader::spawn(4096).unwrap();
        for index in 0..20 {
            loader
                .request(TextureTarget::Plane { folder: TripId(1), index }, &path)
                .unwrap();
        }
        let start = Instant::now();
        drop(loader);
        let elapsed = start.elapsed();
        let _ = std::fs::remove_file(path);

        // at most the decode already in flight finishes
        assert!(
            elapsed < one_decode * 4 + Duration::from_millis(50),
            "drop took {elapsed:?}, one decode takes {one_decode:?}"
        );
    }

    #[test]
    fn test_worker_reports_failures() {
        let loader = TextureLoader::spawn(1024).unwrap();
        let target = TextureTarget::Globe(GlobeMap::Specular);
        loader.request(target, "/nonexistent/map.jpg").unwrap();
        match wait_for(&loader) {
            LoaderEvent::Failed { target: t, .. } => assert_eq!(t, target),
            LoaderEvent::Decoded(_) => panic!("expected failure"),
        }
    }
}
