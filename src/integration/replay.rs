//! Replays per-frame output recorded from an external tracker.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::counting::Detection;
use crate::error::{Error, Result};
use crate::integration::detector::{IntoDetections, TrackingDetector};
use crate::integration::frame::Frame;

#[derive(Debug, Deserialize)]
struct FrameRecord {
    frame: u64,
    #[serde(default)]
    detections: Option<Vec<Detection>>,
}

/// Serves recorded tracker output keyed by frame index.
///
/// The recording is JSON Lines, one object per frame:
///
/// ```text
/// {"frame": 0, "detections": [{"label": "car", "confidence": 0.91, "bbox": [12, 40, 96, 88], "track_id": 5}]}
/// ```
///
/// Frames without a record, or with `"detections": null`, have no
/// detections.
#[derive(Debug, Default)]
pub struct ReplayTracker {
    frames: HashMap<u64, Vec<Detection>>,
}

impl ReplayTracker {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::source_open(path, e.to_string()))?;
        let tracker = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded tracker recording for {} frames from {}",
            tracker.frames.len(),
            path.display()
        );
        Ok(tracker)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut frames: HashMap<u64, Vec<Detection>> = HashMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: FrameRecord = serde_json::from_str(&line)
                .map_err(|source| Error::Replay { line: idx + 1, source })?;
            frames
                .entry(record.frame)
                .or_default()
                .extend(record.detections.into_detections());
        }
        Ok(Self { frames })
    }

    pub fn from_jsonl(contents: &str) -> Result<Self> {
        Self::from_reader(contents.as_bytes())
    }

    /// Number of frames with a record.
    pub fn recorded_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn detections_for(&self, index: u64) -> &[Detection] {
        self.frames.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl TrackingDetector for ReplayTracker {
    type Error = Infallible;

    fn track(&mut self, frame: &Frame) -> std::result::Result<Vec<Detection>, Self::Error> {
        Ok(self.detections_for(frame.index).to_vec())
    }
}
