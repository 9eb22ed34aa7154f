//! Integration module for connecting frame sources, detection/tracking
//! backends and presentation surfaces to the unique counter.
//!
//! This module provides the collaborator traits, ready-made adapters for
//! frame directories and recorded tracker output, overlay drawing, and the
//! per-frame counting loop.

mod builder;
mod detector;
mod frame;
mod overlay;
mod pipeline;
mod presenter;
mod replay;
mod video;

pub use builder::DetectionBuilder;
pub use detector::{IntoDetections, TrackingDetector};
pub use frame::{Frame, FrameSource, ImageSequence};
pub use overlay::{Overlay, banner_text};
pub use pipeline::{CountingPipeline, RunOutcome, RunSummary, StopHandle};
pub use presenter::{Control, CountLogger, FrameWriter, Presenter};
pub use replay::ReplayTracker;
#[cfg(feature = "video")]
pub use video::VideoFile;
pub use video::{VIDEO_EXTENSIONS, check_video_path};
