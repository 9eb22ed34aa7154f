use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use vehicle_counter::{
    Control, CounterConfig, CountLogger, CountingPipeline, Detection, Error, Frame, FrameSource,
    FrameWriter, ImageSequence, Presenter, Rect, ReplayTracker, RunOutcome, StopHandle,
    TrackingDetector,
};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vehicle-counter-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_frames(dir: &Path, count: usize) {
    for i in 0..count {
        RgbImage::from_pixel(64, 48, Rgb([40, 40, 40]))
            .save(dir.join(format!("{i:04}.png")))
            .unwrap();
    }
}

/// Source over in-memory frames that records whether it was released.
struct VecSource {
    frames: Vec<Frame>,
    released: bool,
}

impl VecSource {
    fn blank(count: u64) -> Self {
        Self {
            frames: (0..count)
                .rev()
                .map(|i| Frame::new(i, RgbImage::new(32, 32)))
                .collect(),
            released: false,
        }
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> vehicle_counter::Result<Option<Frame>> {
        Ok(self.frames.pop())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Returns a scripted detection list per frame index.
struct ScriptedTracker {
    script: Vec<Vec<Detection>>,
}

impl TrackingDetector for ScriptedTracker {
    type Error = std::convert::Infallible;

    fn track(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
        Ok(self.script.get(frame.index as usize).cloned().unwrap_or_default())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("model crashed")]
struct ModelCrash;

struct FailingTracker {
    fail_at: u64,
}

impl TrackingDetector for FailingTracker {
    type Error = ModelCrash;

    fn track(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
        if frame.index == self.fail_at {
            Err(ModelCrash)
        } else {
            Ok(vec![])
        }
    }
}

#[derive(Default)]
struct Recorder {
    counts: Vec<usize>,
    stop_after: Option<usize>,
    finished: bool,
}

impl Presenter for Recorder {
    fn present(&mut self, _frame: &Frame, count: usize) -> vehicle_counter::Result<Control> {
        self.counts.push(count);
        if self.stop_after == Some(self.counts.len()) {
            return Ok(Control::Stop);
        }
        Ok(Control::Continue)
    }

    fn finish(&mut self, _summary: &vehicle_counter::RunSummary) -> vehicle_counter::Result<()> {
        self.finished = true;
        Ok(())
    }
}

fn car(track_id: u64) -> Detection {
    Detection::new("car", 0.9, Rect::from_tlbr(4.0, 4.0, 20.0, 16.0)).with_track_id(track_id)
}

#[test]
fn test_scripted_ids_counted_once() {
    let tracker = ScriptedTracker {
        script: vec![vec![car(5)], vec![car(5)], vec![car(7)]],
    };
    let mut pipeline = CountingPipeline::new(
        VecSource::blank(3),
        tracker,
        Recorder::default(),
        &CounterConfig::default(),
    );
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.count, 2);
    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(pipeline.presenter().counts, vec![1, 1, 2]);
    assert!(pipeline.presenter().finished);
    assert!(pipeline.source().released);
}

#[test]
fn test_frames_without_detections_still_presented() {
    let mut pipeline = CountingPipeline::new(
        VecSource::blank(5),
        ScriptedTracker { script: vec![] },
        Recorder::default(),
        &CounterConfig::default(),
    );
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.count, 0);
    assert_eq!(summary.frames, 5);
    assert_eq!(pipeline.presenter().counts, vec![0; 5]);
}

#[test]
fn test_presenter_stop_ends_run() {
    let presenter = Recorder {
        stop_after: Some(2),
        ..Recorder::default()
    };
    let tracker = ScriptedTracker {
        script: vec![vec![car(1)], vec![car(2)], vec![car(3)]],
    };
    let mut pipeline =
        CountingPipeline::new(VecSource::blank(3), tracker, presenter, &CounterConfig::default());
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.outcome, RunOutcome::Stopped);
    assert_eq!(summary.frames, 2);
    assert_eq!(summary.count, 2);
    assert!(pipeline.source().released);
}

#[test]
fn test_stop_handle_before_run_reads_nothing() {
    let stop = StopHandle::new();
    let mut pipeline = CountingPipeline::new(
        VecSource::blank(3),
        ScriptedTracker { script: vec![] },
        Recorder::default(),
        &CounterConfig::default(),
    )
    .with_stop_handle(stop.clone());
    stop.stop();
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.frames, 0);
    assert_eq!(summary.outcome, RunOutcome::Stopped);
    assert!(pipeline.presenter().counts.is_empty());
    assert_eq!(pipeline.source().frames.len(), 3);
}

/// Triggers a shared stop handle after a number of frames, the way a
/// signal handler does from outside the loop.
struct Interrupter {
    stop: StopHandle,
    after: usize,
    seen: usize,
    summary: Option<vehicle_counter::RunSummary>,
}

impl Presenter for Interrupter {
    fn present(&mut self, _frame: &Frame, _count: usize) -> vehicle_counter::Result<Control> {
        self.seen += 1;
        if self.seen == self.after {
            self.stop.stop();
        }
        Ok(Control::Continue)
    }

    fn finish(&mut self, summary: &vehicle_counter::RunSummary) -> vehicle_counter::Result<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}

#[test]
fn test_interrupt_mid_run_releases_and_summarises() {
    let stop = StopHandle::new();
    let presenter = Interrupter {
        stop: stop.clone(),
        after: 2,
        seen: 0,
        summary: None,
    };
    let tracker = ScriptedTracker {
        script: vec![vec![car(1)], vec![car(2)], vec![car(3)], vec![car(4)]],
    };
    let mut pipeline =
        CountingPipeline::new(VecSource::blank(4), tracker, presenter, &CounterConfig::default())
            .with_stop_handle(stop);
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.outcome, RunOutcome::Stopped);
    assert_eq!(summary.frames, 2);
    assert_eq!(summary.count, 2);
    assert_eq!(pipeline.presenter().summary.as_ref(), Some(&summary));
    assert!(pipeline.stop_handle().is_stopped());
    assert!(pipeline.source().released);
    assert_eq!(pipeline.source().frames.len(), 2);
}

#[test]
fn test_repeat_run_is_an_error() {
    let mut pipeline = CountingPipeline::new(
        VecSource::blank(2),
        ScriptedTracker {
            script: vec![vec![car(1)], vec![car(2)]],
        },
        Recorder::default(),
        &CounterConfig::default(),
    );
    assert_eq!(pipeline.run().unwrap().count, 2);
    assert!(matches!(pipeline.run(), Err(Error::AlreadyRun)));
    assert_eq!(pipeline.presenter().counts, vec![1, 2]);
}

#[test]
fn test_detector_failure_is_fatal() {
    let mut pipeline = CountingPipeline::new(
        VecSource::blank(4),
        FailingTracker { fail_at: 2 },
        Recorder::default(),
        &CounterConfig::default(),
    );
    let err = pipeline.run().unwrap_err();

    assert!(matches!(err, Error::Detector(_)));
    assert_eq!(pipeline.presenter().counts.len(), 2);
    assert!(!pipeline.presenter().finished);
    assert!(pipeline.source().released);
}

#[test]
fn test_end_to_end_from_disk() {
    let frames = scratch_dir("e2e-frames");
    let output = scratch_dir("e2e-output");
    write_frames(&frames, 4);

    let recording = [
        r#"{"frame": 0, "detections": [{"label": "car", "confidence": 0.9, "bbox": [2, 2, 20, 14], "track_id": 1}]}"#,
        r#"{"frame": 1, "detections": null}"#,
        r#"{"frame": 2, "detections": [{"label": "car", "confidence": 0.9, "bbox": [4, 2, 22, 14], "track_id": 1}, {"label": "truck", "confidence": 0.9, "bbox": [30, 10, 60, 40], "track_id": 2}]}"#,
        r#"{"frame": 3, "detections": [{"label": "car", "confidence": 0.8, "bbox": [30, 20, 50, 40], "track_id": 3}, {"label": "car", "confidence": 0.3, "bbox": [0, 30, 10, 40], "track_id": 4}]}"#,
    ]
    .join("\n");
    let detections = frames.join("tracks.jsonl");
    fs::write(&detections, recording).unwrap();

    let source = ImageSequence::open(&frames).unwrap();
    let tracker = ReplayTracker::load(&detections).unwrap();
    let writer = FrameWriter::create(&output).unwrap();

    let mut pipeline = CountingPipeline::new(source, tracker, writer, &CounterConfig::default());
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.frames, 4);
    assert_eq!(summary.count, 2);
    assert_eq!(pipeline.presenter().written(), 4);

    // Frame 0 carries the box for id 1 in green.
    let annotated = image::open(output.join("frame_000000.png")).unwrap().to_rgb8();
    assert_eq!(*annotated.get_pixel(10, 2), Rgb([0, 255, 0]));
    // Frame 1 had no detections and is written unchanged.
    let plain = image::open(output.join("frame_000001.png")).unwrap().to_rgb8();
    assert_eq!(*plain.get_pixel(10, 2), Rgb([40, 40, 40]));

    let _ = fs::remove_dir_all(&frames);
    let _ = fs::remove_dir_all(&output);
}

#[test]
fn test_empty_frame_directory_is_unopenable() {
    let dir = scratch_dir("empty-frames");
    fs::write(dir.join("readme.txt"), "not a frame").unwrap();

    let err = ImageSequence::open(&dir).unwrap_err();
    assert!(matches!(err, Error::SourceOpen { .. }));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_corrupt_frame_ends_run() {
    let dir = scratch_dir("corrupt-frames");
    write_frames(&dir, 1);
    fs::write(dir.join("0001.png"), b"definitely not a png").unwrap();

    let source = ImageSequence::open(&dir).unwrap();
    let mut pipeline = CountingPipeline::new(
        source,
        ScriptedTracker { script: vec![] },
        CountLogger::new(),
        &CounterConfig::default(),
    );
    let err = pipeline.run().unwrap_err();
    assert!(matches!(err, Error::Decode { index: 1, .. }));
    let _ = fs::remove_dir_all(&dir);
}
