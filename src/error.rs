//! Error types for a counting run.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end a counting run.
///
/// An empty detection set is never an error. Everything listed here is
/// terminal for the run that produced it.
#[derive(Debug, Error)]
pub enum Error {
    /// The frame source could not begin decoding.
    #[error("could not open input {path}: {reason}")]
    SourceOpen { path: PathBuf, reason: String },

    /// A frame could not be decoded mid-run.
    #[error("failed to decode frame {index}")]
    Decode {
        index: u64,
        #[source]
        source: image::ImageError,
    },

    /// A decoded frame buffer did not match its reported dimensions.
    #[error("frame {index} does not fit {width}x{height} RGB")]
    FrameShape { index: u64, width: u32, height: u32 },

    /// The video decoder failed mid-run.
    #[cfg(feature = "video")]
    #[error("video decoder error: {0}")]
    Video(#[from] opencv::Error),

    /// The external detector/tracker failed.
    #[error("detector failed: {0}")]
    Detector(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A line of a replay recording is malformed.
    #[error("invalid replay record on line {line}")]
    Replay {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The pipeline already ran and its frame source has been released.
    #[error("pipeline already ran; its frame source is released")]
    AlreadyRun,

    #[error("font error: {0}")]
    Font(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    pub fn source_open<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::SourceOpen {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn detector<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Detector(Box::new(err))
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
