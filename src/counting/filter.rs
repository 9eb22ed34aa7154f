use crate::counting::detection::Detection;

/// Class counted when nothing else is configured.
pub const DEFAULT_TARGET_CLASS: &str = "car";

/// Confidence a detection must exceed to be counted.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// Predicate deciding which detections are vehicles of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct CountFilter {
    pub target_class: String,
    /// Exclusive lower bound on confidence.
    pub min_confidence: f32,
}

impl Default for CountFilter {
    fn default() -> Self {
        Self {
            target_class: DEFAULT_TARGET_CLASS.to_string(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl CountFilter {
    pub fn new(target_class: impl Into<String>, min_confidence: f32) -> Self {
        Self {
            target_class: target_class.into(),
            min_confidence,
        }
    }

    /// Label matches the target class and confidence is strictly above the
    /// threshold. Used to decide what gets drawn.
    pub fn accepts(&self, detection: &Detection) -> bool {
        detection.label == self.target_class && detection.confidence > self.min_confidence
    }

    /// `accepts` plus a tracker identity. Only these detections can count.
    pub fn counts(&self, detection: &Detection) -> bool {
        self.accepts(detection) && detection.is_tracked()
    }
}
