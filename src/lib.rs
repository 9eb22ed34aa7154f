//! Counts distinct vehicles in video.
//!
//! Detection and tracking come from an external [`TrackingDetector`]. This
//! crate filters its output to one class above a confidence threshold and
//! counts each tracker identity once, drawing annotations as it goes.
//!
//! ```ignore
//! use vehicle_counter::{CounterConfig, CountingPipeline, CountLogger, ImageSequence, ReplayTracker};
//!
//! let source = ImageSequence::open("frames/")?;
//! let tracker = ReplayTracker::load("tracks.jsonl")?;
//! let mut pipeline = CountingPipeline::new(source, tracker, CountLogger::new(), &CounterConfig::default());
//! let summary = pipeline.run()?;
//! println!("Total number of cars detected: {}", summary.count);
//! ```

pub mod config;
pub mod counting;
pub mod error;
pub mod integration;

pub use config::{AppConfig, CounterConfig, OverlayConfig, Preset};
pub use counting::{CountFilter, Detection, Rect, UniqueCounter};
pub use error::{Error, Result};
pub use integration::{
    Control, CountLogger, CountingPipeline, DetectionBuilder, Frame, FrameSource, FrameWriter,
    ImageSequence, IntoDetections, Overlay, Presenter, ReplayTracker, RunOutcome, RunSummary,
    StopHandle, TrackingDetector, VIDEO_EXTENSIONS, check_video_path,
};
#[cfg(feature = "video")]
pub use integration::VideoFile;
