//! Presentation surfaces for annotated frames.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::integration::frame::Frame;
use crate::integration::pipeline::RunSummary;

/// Whether the loop should read another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// User asked to stop, e.g. a quit key.
    Stop,
}

/// Receives every annotated frame together with the running count.
pub trait Presenter {
    fn present(&mut self, frame: &Frame, count: usize) -> Result<Control>;

    /// Called once after a run ends without error.
    fn finish(&mut self, _summary: &RunSummary) -> Result<()> {
        Ok(())
    }
}

/// Writes annotated frames as numbered PNG files.
#[derive(Debug)]
pub struct FrameWriter {
    dir: PathBuf,
    written: usize,
}

impl FrameWriter {
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:06}.png"))
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl Presenter for FrameWriter {
    fn present(&mut self, frame: &Frame, count: usize) -> Result<Control> {
        let path = self.frame_path(frame.index);
        frame.image.save(&path)?;
        self.written += 1;
        debug!(frame = frame.index, count, "wrote {}", path.display());
        Ok(Control::Continue)
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<()> {
        info!(
            "Wrote {} annotated frames to {} ({} counted)",
            self.written,
            self.dir.display(),
            summary.count
        );
        Ok(())
    }
}

/// Headless presenter that only reports the count.
#[derive(Debug, Default)]
pub struct CountLogger {
    last: Option<usize>,
}

impl CountLogger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for CountLogger {
    fn present(&mut self, frame: &Frame, count: usize) -> Result<Control> {
        if self.last != Some(count) {
            info!(frame = frame.index, "Count: {count}");
            self.last = Some(count);
        } else {
            debug!(frame = frame.index, "Count: {count}");
        }
        Ok(Control::Continue)
    }
}
