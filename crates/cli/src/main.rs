use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::Ordering;

use clap::{Args, Parser, Subcommand, ValueEnum};

use landmark_demos_core::apps::domain::finger_counter::FingerCounter;
use landmark_demos_core::apps::domain::landmark_overlay::{
    LandmarkOverlay, HAND_DEMO_CONNECTIONS, HAND_DEMO_HIGHLIGHTS,
};
use landmark_demos_core::apps::domain::trainer::{TrainerOverlay, LEFT_ARM};
use landmark_demos_core::apps::domain::virtual_painter::VirtualPainter;
use landmark_demos_core::apps::domain::volume_control::VolumeControl;
use landmark_demos_core::apps::infrastructure::overlay_images::load_overlay_images;
use landmark_demos_core::config::AppConfig;
use landmark_demos_core::landmarks::domain::detector_kind::DetectorKind;
use landmark_demos_core::landmarks::domain::landmark_detector::{CoordinateSpace, DetectorOptions};
use landmark_demos_core::landmarks::infrastructure::onnx_landmark_detector::OnnxLandmarkDetector;
use landmark_demos_core::pipeline::frame_processor::FrameProcessor;
use landmark_demos_core::pipeline::frame_stage::{FrameAnnotator, FrameStage, HorizontalFlip, Rescale};
use landmark_demos_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use landmark_demos_core::pipeline::process_image_use_case::ProcessImageUseCase;
use landmark_demos_core::pipeline::process_video_use_case::{ProcessVideoUseCase, RunControl};
use landmark_demos_core::rendering::domain::frame_renderer::FrameRenderer;
use landmark_demos_core::rendering::infrastructure::imageproc_renderer::ImageprocRenderer;
use landmark_demos_core::shared::file_type::{classify, require_supported, MediaKind};
use landmark_demos_core::shared::output_layout::OutputLayout;
use landmark_demos_core::video::domain::video_reader::VideoReader;
use landmark_demos_core::video::infrastructure::camera_reader::CameraReader;
use landmark_demos_core::video::infrastructure::ffmpeg_audio_muxer::FfmpegAudioMuxer;
use landmark_demos_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use landmark_demos_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use landmark_demos_core::video::infrastructure::image_file_reader::ImageFileReader;
use landmark_demos_core::video::infrastructure::image_file_writer::ImageFileWriter;

const PROGRESS_THROTTLE_FRAMES: usize = 30;
const TRAINER_CATEGORY: &str = "AITrainer";
const FINGERS_CATEGORY: &str = "fingers";
const VOLUME_CATEGORY: &str = "volume";
const PAINTER_CATEGORY: &str = "painter";

/// Landmark-detection demos on images, videos and cameras.
#[derive(Parser)]
#[command(name = "landmark-demos", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Face boxes with confidence labels.
    Face(AnnotateArgs),
    /// Dense face mesh points.
    FaceMesh(AnnotateArgs),
    /// Hand skeletons with thumb and index tips highlighted and joined.
    Hands(AnnotateArgs),
    /// Body pose skeletons.
    Pose(AnnotateArgs),
    /// Curl trainer: elbow angle, completion bar and rep count.
    Trainer {
        #[command(flatten)]
        args: AnnotateArgs,

        /// Track the left arm instead of the right.
        #[arg(long)]
        left_arm: bool,
    },
    /// Count raised fingers of the first hand.
    Fingers {
        #[command(flatten)]
        args: AnnotateArgs,

        /// Directory of images shown per finger count, sorted by name.
        #[arg(long)]
        overlay_dir: Option<PathBuf>,
    },
    /// Thumb-index pinch mapped to a volume level.
    Volume(AnnotateArgs),
    /// Draw with the index finger; raise two fingers to pick a colour.
    Painter {
        #[command(flatten)]
        args: AnnotateArgs,

        /// Directory of header images, one per palette entry, sorted by name.
        #[arg(long)]
        header_dir: Option<PathBuf>,
    },
    /// Mirror an image or video horizontally, keeping the audio.
    Flip {
        input: PathBuf,

        /// Output file (default: overwrite the input).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Rescale an image by a percentage.
    Resize {
        input: PathBuf,

        /// Scale in percent (50 halves each side).
        percent: f64,

        /// Output file (default: overwrite the input).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct AnnotateArgs {
    /// Input image or video file.
    #[arg(required_unless_present = "camera", conflicts_with = "camera")]
    input: Option<PathBuf>,

    /// Read from the camera with this index instead of a file.
    #[arg(long)]
    camera: Option<u32>,

    /// ONNX landmark model for this demo.
    #[arg(long)]
    model: PathBuf,

    /// JSON config file (default: the per-user config, if any).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root directory for outputs.
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Frame rate for sources that do not report one.
    #[arg(long)]
    fps: Option<f64>,

    /// Font for text labels. Labels are skipped without one.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Minimum subject confidence (0.0-1.0).
    #[arg(long, default_value = "0.5")]
    min_confidence: f32,

    /// Maximum subjects per frame (default depends on the detector).
    #[arg(long)]
    max_subjects: Option<usize>,

    /// Units of the model's landmark output.
    #[arg(long, value_enum, default_value = "normalized")]
    coordinate_space: Space,

    /// Requested camera capture width.
    #[arg(long)]
    camera_width: Option<u32>,

    /// Requested camera capture height.
    #[arg(long)]
    camera_height: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Space {
    Normalized,
    InputPixels,
}

impl From<Space> for CoordinateSpace {
    fn from(space: Space) -> Self {
        match space {
            Space::Normalized => CoordinateSpace::Normalized,
            Space::InputPixels => CoordinateSpace::InputPixels,
        }
    }
}

/// Which overlay runs on top of detection.
enum Demo {
    Landmarks(DetectorKind),
    Trainer { left_arm: bool },
    Fingers { overlay_dir: Option<PathBuf> },
    Volume,
    Painter { header_dir: Option<PathBuf> },
}

impl Demo {
    fn kind(&self) -> DetectorKind {
        match self {
            Demo::Landmarks(kind) => *kind,
            Demo::Trainer { .. } => DetectorKind::Pose,
            Demo::Fingers { .. } | Demo::Volume | Demo::Painter { .. } => DetectorKind::Hand,
        }
    }

    fn category(&self) -> &'static str {
        match self {
            Demo::Landmarks(kind) => kind.category(),
            Demo::Trainer { .. } => TRAINER_CATEGORY,
            Demo::Fingers { .. } => FINGERS_CATEGORY,
            Demo::Volume => VOLUME_CATEGORY,
            Demo::Painter { .. } => PAINTER_CATEGORY,
        }
    }

    fn processor(
        self,
        config: &AppConfig,
    ) -> Result<Box<dyn FrameProcessor>, Box<dyn std::error::Error>> {
        let style = config.style_for(self.kind());
        Ok(match self {
            Demo::Landmarks(kind) => {
                let overlay = LandmarkOverlay::new(kind, style);
                if kind == DetectorKind::Hand {
                    Box::new(
                        overlay
                            .with_connections(HAND_DEMO_CONNECTIONS)
                            .with_highlights(HAND_DEMO_HIGHLIGHTS),
                    )
                } else {
                    Box::new(overlay)
                }
            }
            Demo::Trainer { left_arm } => {
                let mut settings = config.trainer.clone();
                if left_arm {
                    settings.joints = LEFT_ARM;
                }
                Box::new(TrainerOverlay::new(settings, style))
            }
            Demo::Fingers { overlay_dir } => {
                let overlays = match overlay_dir {
                    Some(dir) => load_overlay_images(&dir)?,
                    None => Vec::new(),
                };
                Box::new(FingerCounter::new(config.fingers.clone(), style).with_overlays(overlays))
            }
            Demo::Volume => Box::new(VolumeControl::new(config.volume.clone(), style)),
            Demo::Painter { header_dir } => {
                let headers = match header_dir {
                    Some(dir) => load_overlay_images(&dir)?,
                    None => Vec::new(),
                };
                Box::new(VirtualPainter::new(config.painter.clone()).with_headers(headers))
            }
        })
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Face(args) => annotate(args, Demo::Landmarks(DetectorKind::Face)),
        Command::FaceMesh(args) => annotate(args, Demo::Landmarks(DetectorKind::FaceMesh)),
        Command::Hands(args) => annotate(args, Demo::Landmarks(DetectorKind::Hand)),
        Command::Pose(args) => annotate(args, Demo::Landmarks(DetectorKind::Pose)),
        Command::Trainer { args, left_arm } => annotate(args, Demo::Trainer { left_arm }),
        Command::Fingers { args, overlay_dir } => annotate(args, Demo::Fingers { overlay_dir }),
        Command::Volume(args) => annotate(args, Demo::Volume),
        Command::Painter { args, header_dir } => annotate(args, Demo::Painter { header_dir }),
        Command::Flip { input, output } => {
            let output = output.unwrap_or_else(|| input.clone());
            transform(&input, &output, Box::new(HorizontalFlip))
        }
        Command::Resize {
            input,
            percent,
            output,
        } => {
            if require_supported(&input)? != MediaKind::Image {
                return Err(format!("Resize supports images only, got {}", input.display()).into());
            }
            let output = output.unwrap_or_else(|| input.clone());
            transform(&input, &output, Box::new(Rescale::new(percent)?))
        }
    }
}

fn annotate(args: AnnotateArgs, demo: Demo) -> Result<(), Box<dyn std::error::Error>> {
    validate(&args)?;
    let config = resolve_config(&args)?;
    let kind = demo.kind();

    let mut options = DetectorOptions::for_kind(kind);
    options.min_confidence = args.min_confidence;
    if let Some(max) = args.max_subjects {
        options.max_subjects = max;
    }
    options.coordinate_space = args.coordinate_space.into();
    let detector = OnnxLandmarkDetector::new(&args.model, kind, options)?;

    let layout = OutputLayout::new(&config.output_root);
    let category = demo.category();
    let stage = FrameAnnotator::new(
        Box::new(detector),
        demo.processor(&config)?,
        build_renderer(config.font_path.as_deref())?,
    );
    let control = RunControl {
        max_frames: args.max_frames,
        default_fps: config.default_fps,
        ..RunControl::default()
    };

    if let Some(index) = args.camera {
        let mut reader = CameraReader::new(config.camera_width, config.camera_height);
        if let Some(fps) = args.fps {
            reader = reader.with_framerate(fps.round() as u32);
        }
        let output = layout.output_for_camera(category, index);
        return run_video(
            Box::new(reader),
            &CameraReader::device_path(index),
            &output,
            Box::new(stage),
            control,
        );
    }

    let input = args.input.as_deref().ok_or("Either an input file or --camera is required")?;
    let output = layout.output_for(category, input);
    if classify(input) == MediaKind::Image {
        run_image(input, &output, Box::new(stage))
    } else {
        run_video(Box::new(FfmpegReader::new()), input, &output, Box::new(stage), control)
    }
}

/// Flip and resize: no detector, output defaults to the input path.
fn transform(
    input: &Path,
    output: &Path,
    stage: Box<dyn FrameStage>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    if require_supported(input)? == MediaKind::Image {
        return run_image(input, output, stage);
    }
    let control = RunControl {
        default_fps: AppConfig::load().default_fps,
        ..RunControl::default()
    };
    run_video(Box::new(FfmpegReader::new()), input, output, stage, control)
}

fn run_image(
    input: &Path,
    output: &Path,
    stage: Box<dyn FrameStage>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut use_case = ProcessImageUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        stage,
        Box::new(StdoutPipelineLogger::new(PROGRESS_THROTTLE_FRAMES)),
    );
    use_case.execute(input, output)
}

fn run_video(
    reader: Box<dyn VideoReader>,
    input: &Path,
    output: &Path,
    stage: Box<dyn FrameStage>,
    control: RunControl,
) -> Result<(), Box<dyn std::error::Error>> {
    let stop = control.stop.clone();
    if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed)) {
        log::warn!("Cannot install Ctrl-C handler: {e}");
    }

    let mut use_case = ProcessVideoUseCase::new(
        reader,
        Box::new(FfmpegWriter::new()),
        Box::new(FfmpegAudioMuxer::new()),
        stage,
        Box::new(StdoutPipelineLogger::new(PROGRESS_THROTTLE_FRAMES)),
        control,
    );
    use_case.execute(input, output)?;
    Ok(())
}

fn resolve_config(args: &AnnotateArgs) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    if let Some(root) = &args.output_root {
        config.output_root = root.clone();
    }
    if let Some(font) = &args.font {
        config.font_path = Some(font.clone());
    }
    if let Some(fps) = args.fps {
        config.default_fps = fps;
    }
    if let Some(width) = args.camera_width {
        config.camera_width = width;
    }
    if let Some(height) = args.camera_height {
        config.camera_height = height;
    }
    Ok(config)
}

fn build_renderer(font: Option<&Path>) -> Result<Box<dyn FrameRenderer>, Box<dyn std::error::Error>> {
    match font {
        Some(path) => Ok(Box::new(ImageprocRenderer::with_font_file(path)?)),
        None => {
            log::info!("No font configured, text labels will be skipped");
            Ok(Box::new(ImageprocRenderer::new()))
        }
    }
}

/// Argument checks that need no model or media session.
fn validate(args: &AnnotateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(input) = &args.input {
        if !input.exists() {
            return Err(format!("Input file not found: {}", input.display()).into());
        }
        require_supported(input)?;
    }
    if !args.model.exists() {
        return Err(format!("Model file not found: {}", args.model.display()).into());
    }
    if !(0.0..=1.0).contains(&args.min_confidence) {
        return Err(format!(
            "Minimum confidence must be between 0.0 and 1.0, got {}",
            args.min_confidence
        )
        .into());
    }
    if args.max_subjects == Some(0) {
        return Err("Maximum subjects must be at least 1".into());
    }
    if let Some(fps) = args.fps {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(format!("Frame rate must be positive, got {fps}").into());
        }
    }
    if args.max_frames == Some(0) {
        return Err("Maximum frames must be at least 1".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use landmark_demos_core::shared::error::PipelineError;

    fn hands_args(argv: &[&str]) -> AnnotateArgs {
        let mut full = vec!["landmark-demos", "hands"];
        full.extend_from_slice(argv);
        let cli = Cli::try_parse_from(full).unwrap();
        match cli.command {
            Command::Hands(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_unsupported_input_reported_before_model() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "not media").unwrap();
        let model = dir.path().join("missing.onnx");

        let args = hands_args(&[input.to_str().unwrap(), "--model", model.to_str().unwrap()]);
        let err = validate(&args).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnsupportedFileType(path)) if *path == input
        ));
    }

    #[test]
    fn test_supported_input_then_checks_model() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hand.png");
        std::fs::write(&input, b"").unwrap();
        let model = dir.path().join("missing.onnx");

        let args = hands_args(&[input.to_str().unwrap(), "--model", model.to_str().unwrap()]);
        let err = validate(&args).unwrap_err();

        assert!(err.to_string().starts_with("Model file not found"));
    }

    #[test]
    fn test_camera_and_input_conflict() {
        let parsed = Cli::try_parse_from([
            "landmark-demos",
            "hands",
            "clip.mp4",
            "--camera",
            "0",
            "--model",
            "hand.onnx",
        ]);
        assert!(parsed.is_err());
    }
}
