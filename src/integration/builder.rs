//! Builder for creating Detection objects from various model output formats.

use crate::counting::{Detection, Rect};

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    confidence: f32,
    label: String,
    track_id: Option<u64>,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - w / 2.0;
        self.y1 = cy - h / 2.0;
        self.x2 = cx + w / 2.0;
        self.y2 = cy + h / 2.0;
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, l: f32, t: f32, w: f32, h: f32) -> Self {
        self.x1 = l;
        self.y1 = t;
        self.x2 = l + w;
        self.y2 = t + h;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Resolve a numeric class id through the model's class-name table.
    /// Unknown ids keep the numeric form.
    pub fn class_id(mut self, class_id: usize, names: &[&str]) -> Self {
        self.label = names
            .get(class_id)
            .map(|name| name.to_string())
            .unwrap_or_else(|| class_id.to_string());
        self
    }

    /// Set the confidence score.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn track_id(mut self, track_id: Option<u64>) -> Self {
        self.track_id = track_id;
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection {
            label: self.label,
            confidence: self.confidence,
            bbox: Rect::from_tlbr(self.x1, self.y1, self.x2, self.y2),
            track_id: self.track_id,
        }
    }
}
