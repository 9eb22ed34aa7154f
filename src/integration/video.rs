//! Video container input.
//!
//! Path checks are always available; decoding needs the `video` feature,
//! which links OpenCV.

use std::path::Path;

use crate::error::{Error, Result};

/// Container extensions accepted as video input, compared case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Check that `path` names an existing file with a video extension.
pub fn check_video_path(path: &Path) -> Result<()> {
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !supported {
        return Err(Error::source_open(
            path,
            format!("unsupported video container, expected one of {VIDEO_EXTENSIONS:?}"),
        ));
    }
    if !path.is_file() {
        return Err(Error::source_open(path, "no such file"));
    }
    Ok(())
}

#[cfg(feature = "video")]
pub use backend::VideoFile;

#[cfg(feature = "video")]
mod backend {
    use std::path::{Path, PathBuf};

    use image::RgbImage;
    use opencv::{
        core::Mat,
        imgproc,
        prelude::*,
        videoio::{self, VideoCapture, VideoCaptureTrait, VideoCaptureTraitConst},
    };
    use tracing::{debug, info};

    use super::check_video_path;
    use crate::error::{Error, Result};
    use crate::integration::frame::{Frame, FrameSource};

    /// Frames decoded from an MP4/AVI/MOV/MKV file through OpenCV.
    pub struct VideoFile {
        path: PathBuf,
        cap: VideoCapture,
        next_index: u64,
    }

    impl VideoFile {
        pub fn open(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref().to_path_buf();
            check_video_path(&path)?;
            let name = path
                .to_str()
                .ok_or_else(|| Error::source_open(&path, "path is not valid UTF-8"))?;

            let cap = VideoCapture::from_file(name, videoio::CAP_ANY)
                .map_err(|e| Error::source_open(&path, e.to_string()))?;
            let opened = cap
                .is_opened()
                .map_err(|e| Error::source_open(&path, e.to_string()))?;
            if !opened {
                return Err(Error::source_open(&path, "decoder could not open the file"));
            }

            let fps = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FPS).unwrap_or(0.0);
            let total = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_COUNT)
                .unwrap_or(0.0) as u64;
            info!("Opened video {} ({total} frames @ {fps:.1} FPS)", path.display());

            Ok(Self {
                path,
                cap,
                next_index: 0,
            })
        }
    }

    impl FrameSource for VideoFile {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            let mut mat = Mat::default();
            if !VideoCaptureTrait::read(&mut self.cap, &mut mat)? || mat.empty() {
                return Ok(None);
            }

            let mut rgb = Mat::default();
            imgproc::cvt_color(&mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
            let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
            let image = RgbImage::from_raw(width, height, rgb.data_bytes()?.to_vec())
                .ok_or(Error::FrameShape {
                    index: self.next_index,
                    width,
                    height,
                })?;

            let frame = Frame::new(self.next_index, image);
            self.next_index += 1;
            Ok(Some(frame))
        }

        fn release(&mut self) {
            debug!("Releasing video {}", self.path.display());
            if let Err(e) = VideoCaptureTrait::release(&mut self.cap) {
                debug!("Video release failed: {e}");
            }
        }
    }
}
