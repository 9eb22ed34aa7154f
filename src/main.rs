use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vehicle_counter::{
    AppConfig, CountLogger, CountingPipeline, FrameSource, FrameWriter, ImageSequence, Overlay,
    Presenter, Preset, ReplayTracker, RunSummary, StopHandle, check_video_path,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    Standard,
    Dashboard,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Standard => Preset::Standard,
            PresetArg::Dashboard => Preset::Dashboard,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "vehicle-counter", about = "Count distinct vehicles in a tracked video")]
struct Args {
    /// Video file (mp4/avi/mov/mkv) or directory of decoded frames
    /// (png/jpg/bmp, read in file-name order)
    #[arg(long, alias = "frames", value_name = "PATH")]
    input: PathBuf,
    /// Tracker output recorded as JSON Lines
    #[arg(long, value_name = "FILE")]
    detections: PathBuf,
    /// YAML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Threshold preset, applied on top of the config file
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,
    /// Class to count
    #[arg(long = "class", value_name = "NAME")]
    target_class: Option<String>,
    /// Confidence a detection must exceed
    #[arg(long)]
    min_confidence: Option<f32>,
    /// TrueType font for id labels and the count banner
    #[arg(long, value_name = "TTF")]
    font: Option<PathBuf>,
    /// Write annotated frames here instead of running headless
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,
    /// Write the run summary as JSON
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vehicle_counter=info")),
        )
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    info!(
        "Counting '{}' above confidence {:.2}",
        config.counter.target_class, config.counter.min_confidence
    );

    let stop = StopHandle::new();
    let on_interrupt = stop.clone();
    ctrlc::set_handler(move || {
        warn!("Interrupted, stopping after the current frame");
        on_interrupt.stop();
    })
    .context("installing Ctrl-C handler")?;

    let summary = match &args.output {
        Some(dir) => {
            let writer = FrameWriter::create(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
            run(&args, &config, writer, stop)?
        }
        None => run(&args, &config, CountLogger::new(), stop)?,
    };

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json).with_context(|| format!("writing summary {}", path.display()))?;
    }

    println!(
        "Total number of {}s detected: {}",
        summary.target_class, summary.count
    );
    Ok(())
}

fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(preset) = args.preset {
        config.counter.min_confidence = Preset::from(preset).min_confidence();
    }
    if let Some(threshold) = args.min_confidence {
        config.counter.min_confidence = threshold;
    }
    if let Some(class) = &args.target_class {
        config.counter.target_class = class.clone();
    }
    if let Some(font) = &args.font {
        config.overlay.font = Some(font.clone());
    }
    config.counter.validate()?;
    Ok(config)
}

fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        return Ok(Box::new(ImageSequence::open(path)?));
    }
    check_video_path(path)?;
    open_video(path)
}

#[cfg(feature = "video")]
fn open_video(path: &Path) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(vehicle_counter::VideoFile::open(path)?))
}

#[cfg(not(feature = "video"))]
fn open_video(path: &Path) -> Result<Box<dyn FrameSource>> {
    anyhow::bail!(
        "{} is a video file, but this binary was built without the `video` feature; \
         rebuild with `--features video` or pass a frame directory",
        path.display()
    )
}

fn run<P: Presenter>(
    args: &Args,
    config: &AppConfig,
    presenter: P,
    stop: StopHandle,
) -> Result<RunSummary> {
    let source = open_source(&args.input).context("video could not be loaded")?;
    let tracker = ReplayTracker::load(&args.detections)?;
    let overlay = Overlay::new(&config.overlay)?;

    let mut pipeline = CountingPipeline::new(source, tracker, presenter, &config.counter)
        .with_overlay(overlay)
        .with_stop_handle(stop)
        .with_frame_limit(args.max_frames);
    Ok(pipeline.run()?)
}
