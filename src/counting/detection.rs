use serde::{Deserialize, Serialize};

use crate::counting::rect::Rect;

/// One class-labelled observation reported by the tracker for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class name as reported by the model, e.g. `"car"`.
    pub label: String,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
    /// Bounding box, serialized as TLBR.
    pub bbox: Rect,
    /// Tracker identity. `None` while tracking is not established for the
    /// object on this frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u64>,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: Rect) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
            track_id: None,
        }
    }

    pub fn with_track_id(mut self, track_id: u64) -> Self {
        self.track_id = Some(track_id);
        self
    }

    pub fn is_tracked(&self) -> bool {
        self.track_id.is_some()
    }
}
