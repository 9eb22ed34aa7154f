//! Frames and the frame source contract.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// One decoded raster frame of a run.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Zero-based position in the run.
    pub index: u64,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(index: u64, image: RgbImage) -> Self {
        Self { index, image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Sequential producer of frames.
///
/// Implementations open their input on construction. `Ok(None)` signals
/// end of stream; an error ends the run.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Release decoder resources. Called once when the run ends.
    fn release(&mut self) {}
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Frames extracted from a video into a directory, read in file-name order.
#[derive(Debug)]
pub struct ImageSequence {
    root: PathBuf,
    paths: Vec<PathBuf>,
    cursor: usize,
}

impl ImageSequence {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();
        let entries = fs::read_dir(&root).map_err(|e| Error::source_open(&root, e.to_string()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_frame_file(&path) {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(Error::source_open(&root, "no frame images found"));
        }
        paths.sort();

        info!("Opened {} frames from {}", paths.len(), root.display());
        Ok(Self {
            root,
            paths,
            cursor: 0,
        })
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(None);
        };
        let index = self.cursor as u64;
        let image = image::open(path)
            .map_err(|source| Error::Decode { index, source })?
            .to_rgb8();
        self.cursor += 1;
        Ok(Some(Frame::new(index, image)))
    }

    fn release(&mut self) {
        debug!("Releasing frame sequence {}", self.root.display());
        self.paths.clear();
        self.cursor = 0;
    }
}
