//! CountingPipeline for combining a frame source, a tracker and a presenter.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::CounterConfig;
use crate::counting::UniqueCounter;
use crate::error::{Error, Result};
use crate::integration::detector::TrackingDetector;
use crate::integration::frame::FrameSource;
use crate::integration::overlay::Overlay;
use crate::integration::presenter::{Control, Presenter};

/// Cloneable flag asking a running pipeline to stop before its next frame.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// The frame source reached end of stream.
    Completed,
    /// A stop was requested by the presenter, the stop handle or the frame limit.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub target_class: String,
    pub frames: u64,
    pub count: usize,
    pub outcome: RunOutcome,
}

/// Sequential per-frame loop: read, track, count, annotate, present.
///
/// A run consumes the frame source: [`run`](Self::run) may be called once,
/// later calls fail with [`Error::AlreadyRun`].
pub struct CountingPipeline<S, D, P>
where
    S: FrameSource,
    D: TrackingDetector,
    P: Presenter,
{
    source: S,
    detector: D,
    presenter: P,
    overlay: Overlay,
    counter: UniqueCounter,
    stop: StopHandle,
    frame_limit: Option<u64>,
    ran: bool,
}

impl<S, D, P> CountingPipeline<S, D, P>
where
    S: FrameSource,
    D: TrackingDetector,
    P: Presenter,
{
    /// Create a pipeline that draws boxes and anchors but no text.
    pub fn new(source: S, detector: D, presenter: P, config: &CounterConfig) -> Self {
        Self {
            source,
            detector,
            presenter,
            overlay: Overlay::without_text(),
            counter: UniqueCounter::new(config.filter()),
            stop: StopHandle::new(),
            frame_limit: None,
            ran: false,
        }
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Stop after this many frames have been processed.
    pub fn with_frame_limit(mut self, limit: Option<u64>) -> Self {
        self.frame_limit = limit;
        self
    }

    /// Process frames until end of stream, a stop request, or the first error.
    ///
    /// The frame source is released on every exit path. A detector failure
    /// is returned as [`Error::Detector`].
    pub fn run(&mut self) -> Result<RunSummary> {
        if self.ran {
            return Err(Error::AlreadyRun);
        }
        self.ran = true;

        let result = self.run_frames();
        self.source.release();
        let (frames, outcome) = result?;

        let summary = RunSummary {
            target_class: self.counter.filter().target_class.clone(),
            frames,
            count: self.counter.count(),
            outcome,
        };
        self.presenter.finish(&summary)?;

        info!(
            frames = summary.frames,
            outcome = ?summary.outcome,
            "Total number of {}s detected: {}",
            summary.target_class,
            summary.count
        );
        Ok(summary)
    }

    fn run_frames(&mut self) -> Result<(u64, RunOutcome)> {
        let mut frames = 0u64;
        loop {
            if self.stop.is_stopped() {
                info!("Stop requested after {frames} frames");
                return Ok((frames, RunOutcome::Stopped));
            }
            if self.frame_limit.is_some_and(|limit| frames >= limit) {
                info!("Frame limit reached after {frames} frames");
                return Ok((frames, RunOutcome::Stopped));
            }

            let Some(mut frame) = self.source.next_frame()? else {
                return Ok((frames, RunOutcome::Completed));
            };
            let detections = self.detector.track(&frame).map_err(Error::detector)?;
            frames += 1;

            for detection in &detections {
                self.counter.observe(detection);
                if self.counter.filter().accepts(detection) {
                    self.overlay.annotate(&mut frame.image, detection);
                }
            }

            let count = self.counter.count();
            self.overlay
                .draw_count(&mut frame.image, &self.counter.filter().target_class, count);
            debug!(
                frame = frame.index,
                detections = detections.len(),
                count,
                "processed frame"
            );

            if self.presenter.present(&frame, count)? == Control::Stop {
                info!("Presenter stopped the run at frame {}", frame.index);
                return Ok((frames, RunOutcome::Stopped));
            }
        }
    }

    pub fn counter(&self) -> &UniqueCounter {
        &self.counter
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Get a reference to the underlying frame source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the presenter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }
}
