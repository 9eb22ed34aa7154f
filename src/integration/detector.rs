//! Trait for the external detector/tracker.

use crate::counting::Detection;
use crate::integration::frame::Frame;

/// A detection model combined with a multi-object tracker.
///
/// Implement this trait to connect any detection-and-tracking backend to
/// the counting pipeline. `track` is called once per frame in order and
/// the implementation keeps its tracking state across calls, so identities
/// stay stable for as long as the backend can follow an object.
///
/// # Example
///
/// ```ignore
/// use vehicle_counter::{Detection, Frame, TrackingDetector};
///
/// struct MyTracker {
///     // Your model and tracker here
/// }
///
/// impl TrackingDetector for MyTracker {
///     type Error = std::io::Error;
///
///     fn track(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference + association and return tracked detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait TrackingDetector {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Detect and track objects in one frame.
    ///
    /// An empty vector is a valid result. Detections may lack a track id
    /// when the tracker has not yet locked onto the object.
    fn track(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
///
/// Implement this for your model's output format to enable easy conversion.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// A missing detections structure is an empty frame, not a skipped one.
impl<T: IntoDetections> IntoDetections for Option<T> {
    fn into_detections(self) -> Vec<Detection> {
        self.map(IntoDetections::into_detections).unwrap_or_default()
    }
}
