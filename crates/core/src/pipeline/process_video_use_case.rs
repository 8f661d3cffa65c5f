use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::shared::constants::DEFAULT_FPS;
use crate::shared::error::PipelineError;
use crate::shared::output_layout::buffer_path_for;
use crate::shared::video_metadata::{SourceKind, VideoMetadata};
use crate::video::domain::audio_muxer::AudioMuxer;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::frame_stage::FrameStage;
use super::muxed_output::{finalize_output, BufferGuard, FinalOutput};
use super::pipeline_logger::PipelineLogger;

const STAGING_PREFIX: &str = "staging-";

/// When a run stops pulling frames, besides the end of the source.
#[derive(Clone, Debug)]
pub struct RunControl {
    /// Polled between frames; set it (e.g. from a Ctrl-C handler) to stop a
    /// live source.
    pub stop: Arc<AtomicBool>,
    pub max_frames: Option<usize>,
    /// Encoder frame rate for sources that do not report one.
    pub default_fps: f64,
}

impl Default for RunControl {
    fn default() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            max_frames: None,
            default_fps: DEFAULT_FPS,
        }
    }
}

/// Video and camera pipeline: read → stage → encode to a buffer file →
/// re-attach the source's audio into the final output.
///
/// Strictly sequential; each frame is written before the next one is read.
/// Reader and writer are closed on every exit path, and the buffer file
/// never outlives the run.
pub struct ProcessVideoUseCase {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    muxer: Box<dyn AudioMuxer>,
    stage: Box<dyn FrameStage>,
    logger: Box<dyn PipelineLogger>,
    control: RunControl,
}

impl ProcessVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        muxer: Box<dyn AudioMuxer>,
        stage: Box<dyn FrameStage>,
        logger: Box<dyn PipelineLogger>,
        control: RunControl,
    ) -> Self {
        Self {
            reader,
            writer,
            muxer,
            stage,
            logger,
            control,
        }
    }

    /// Runs the pipeline from `input` (a file or capture device) into
    /// `output`. Writing over the input file is staged through a sibling
    /// file and renamed into place at the end.
    pub fn execute(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> Result<FinalOutput, Box<dyn std::error::Error>> {
        let mut metadata = self.reader.open(input)?;
        if metadata.fps.is_none() {
            metadata.fps = Some(metadata.fps_or(self.control.default_fps));
        }

        let in_place = is_same_file(input, output);
        let destination = if in_place {
            sibling_with_prefix(output, STAGING_PREFIX)
        } else {
            output.to_path_buf()
        };
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                self.reader.close();
                return Err(e.into());
            }
        }

        let buffer = BufferGuard::new(buffer_path_for(&destination));
        let encoded = self.encode(&metadata, buffer.path());
        self.reader.close();
        let frames = encoded?;
        if frames == 0 {
            return Err(PipelineError::NoFrames.into());
        }

        let audio_source = match metadata.source_kind {
            SourceKind::Video => metadata.source_path.as_deref(),
            SourceKind::Image | SourceKind::Camera => None,
        };
        let result = finalize_output(self.muxer.as_ref(), buffer, audio_source, &destination)?;
        if in_place {
            std::fs::rename(&destination, output)?;
        }

        self.logger.info(&format!(
            "Output written to {} ({frames} frames{})",
            output.display(),
            match result {
                FinalOutput::WithAudio => ", with audio",
                FinalOutput::VideoOnly => "",
            }
        ));
        self.logger.summary();
        Ok(result)
    }

    /// Encodes frames into `buffer` and returns how many were written.
    fn encode(
        &mut self,
        metadata: &VideoMetadata,
        buffer: &Path,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        self.writer.open(buffer, metadata)?;
        let pumped = self.pump(metadata);
        let closed = self.writer.close();
        let frames = pumped?;
        closed?;
        Ok(frames)
    }

    fn pump(&mut self, metadata: &VideoMetadata) -> Result<usize, Box<dyn std::error::Error>> {
        let total = match self.control.max_frames {
            Some(max) if metadata.total_frames == 0 || max < metadata.total_frames => max,
            _ => metadata.total_frames,
        };
        let mut written = 0;
        let mut frames = self.reader.frames();

        loop {
            if self.control.stop.load(Ordering::Relaxed) {
                self.logger.info("Stop requested, finishing output");
                break;
            }
            if self.control.max_frames.is_some_and(|max| written >= max) {
                break;
            }
            let mut frame = match frames.next() {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => {
                    log::warn!("Frame read failed after {written} frames, ending stream: {e}");
                    break;
                }
                None => break,
            };

            self.stage.apply(&mut frame, self.logger.as_mut())?;

            let t0 = Instant::now();
            self.writer.write(&frame)?;
            self.logger
                .timing("encode", t0.elapsed().as_secs_f64() * 1000.0);

            written += 1;
            self.logger.progress(written, total);
        }
        Ok(written)
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn sibling_with_prefix(path: &Path, prefix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{prefix}{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::domain::landmark_overlay::{LandmarkOverlay, HAND_DEMO_HIGHLIGHTS};
    use crate::landmarks::domain::detection::SubjectLandmarks;
    use crate::landmarks::domain::detector_kind::DetectorKind;
    use crate::pipeline::frame_stage::tests::{FailingDetector, FixedDetector};
    use crate::pipeline::frame_stage::{FrameAnnotator, HorizontalFlip};
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::rendering::infrastructure::imageproc_renderer::ImageprocRenderer;
    use crate::shared::frame::Frame;
    use crate::video::domain::audio_muxer::MuxOutcome;
    use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
    use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;
    use crate::video::infrastructure::test_support::{create_test_video, stream_counts};
    use std::sync::Mutex;

    // --- Stubs ---

    struct StubReader {
        frames: Vec<Result<Frame, String>>,
        metadata: VideoMetadata,
        closed: Arc<Mutex<bool>>,
    }

    impl StubReader {
        fn new(frames: Vec<Frame>, metadata: VideoMetadata) -> Self {
            Self::with_results(frames.into_iter().map(Ok).collect(), metadata)
        }

        fn with_results(frames: Vec<Result<Frame, String>>, metadata: VideoMetadata) -> Self {
            Self {
                frames,
                metadata,
                closed: Arc::new(Mutex::new(false)),
            }
        }
    }

    impl VideoReader for StubReader {
        fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(self.metadata.clone())
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new(self.frames.drain(..).map(|r| r.map_err(Into::into)))
        }

        fn close(&mut self) {
            *self.closed.lock().unwrap() = true;
        }
    }

    /// Collects frames and writes a marker file at the buffer path.
    struct StubWriter {
        path: Option<PathBuf>,
        written: Arc<Mutex<Vec<Frame>>>,
        closed: Arc<Mutex<bool>>,
        fail_open: bool,
    }

    impl StubWriter {
        fn new() -> Self {
            Self {
                path: None,
                written: Arc::new(Mutex::new(Vec::new())),
                closed: Arc::new(Mutex::new(false)),
                fail_open: false,
            }
        }
    }

    impl VideoWriter for StubWriter {
        fn open(
            &mut self,
            path: &Path,
            _metadata: &VideoMetadata,
        ) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail_open {
                return Err(PipelineError::Encode("no encoder".into()).into());
            }
            std::fs::write(path, b"")?;
            self.path = Some(path.to_path_buf());
            Ok(())
        }

        fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.written.lock().unwrap().push(frame.clone());
            Ok(())
        }

        fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            *self.closed.lock().unwrap() = true;
            if let Some(path) = self.path.take() {
                let count = self.written.lock().unwrap().len();
                std::fs::write(path, format!("video-only:{count}"))?;
            }
            Ok(())
        }
    }

    struct StubMuxer {
        outcome: Option<MuxOutcome>,
    }

    impl StubMuxer {
        fn failing() -> Self {
            Self { outcome: None }
        }

        fn returning(outcome: MuxOutcome) -> Self {
            Self {
                outcome: Some(outcome),
            }
        }
    }

    impl AudioMuxer for StubMuxer {
        fn mux(
            &self,
            _video_only: &Path,
            _audio_source: &Path,
            destination: &Path,
        ) -> Result<MuxOutcome, Box<dyn std::error::Error>> {
            match self.outcome {
                Some(MuxOutcome::Muxed) => {
                    std::fs::write(destination, b"with-audio")?;
                    Ok(MuxOutcome::Muxed)
                }
                Some(MuxOutcome::NoAudio) => Ok(MuxOutcome::NoAudio),
                None => Err(PipelineError::Mux("deterministic failure".into()).into()),
            }
        }
    }

    // --- Helpers ---

    fn metadata(kind: SourceKind, fps: Option<f64>, total: usize) -> VideoMetadata {
        VideoMetadata {
            width: 640,
            height: 480,
            fps,
            total_frames: total,
            codec: "mpeg4".to_string(),
            source_path: Some(PathBuf::from("assets/clip.mp4")),
            source_kind: kind,
        }
    }

    fn black_frames(n: usize) -> Vec<Frame> {
        (0..n).map(|i| Frame::filled(640, 480, [0; 3], i)).collect()
    }

    fn hand_stage(subjects: Vec<SubjectLandmarks>) -> Box<FrameAnnotator> {
        let kind = DetectorKind::Hand;
        Box::new(FrameAnnotator::new(
            Box::new(FixedDetector { kind, subjects }),
            Box::new(
                LandmarkOverlay::new(kind, kind.default_style()).with_highlights(HAND_DEMO_HIGHLIGHTS),
            ),
            Box::new(ImageprocRenderer::new()),
        ))
    }

    fn centred_hand() -> Vec<SubjectLandmarks> {
        vec![SubjectLandmarks::from_fractions(&[(0.5, 0.5); 21], Some(0.9))]
    }

    fn use_case(
        reader: StubReader,
        writer: StubWriter,
        muxer: StubMuxer,
        stage: Box<dyn FrameStage>,
        control: RunControl,
    ) -> ProcessVideoUseCase {
        ProcessVideoUseCase::new(
            Box::new(reader),
            Box::new(writer),
            Box::new(muxer),
            stage,
            Box::new(NullPipelineLogger),
            control,
        )
    }

    // --- Tests ---

    #[test]
    fn test_every_frame_annotated_at_landmark() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("hands").join("clip.mp4");
        let writer = StubWriter::new();
        let written = writer.written.clone();

        let mut uc = use_case(
            StubReader::new(black_frames(10), metadata(SourceKind::Video, Some(30.0), 10)),
            writer,
            StubMuxer::returning(MuxOutcome::Muxed),
            hand_stage(centred_hand()),
            RunControl::default(),
        );
        let result = uc.execute(Path::new("assets/clip.mp4"), &output).unwrap();

        assert_eq!(result, FinalOutput::WithAudio);
        let frames = written.lock().unwrap();
        assert_eq!(frames.len(), 10);
        let emphasis = DetectorKind::Hand.default_style().emphasis_color.rgb();
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
            assert_eq!(frame.pixel(320, 240), Some(emphasis), "frame {i}");
            assert_eq!(frame.pixel(5, 5), Some([0, 0, 0]));
        }
        assert_eq!(std::fs::read(&output).unwrap(), b"with-audio");
        assert!(!buffer_path_for(&output).exists());
    }

    #[test]
    fn test_failed_mux_keeps_video_only_and_removes_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("pose").join("clip.mp4");
        let reader = StubReader::new(black_frames(4), metadata(SourceKind::Video, Some(30.0), 4));
        let reader_closed = reader.closed.clone();
        let writer = StubWriter::new();
        let writer_closed = writer.closed.clone();

        let mut uc = use_case(
            reader,
            writer,
            StubMuxer::failing(),
            hand_stage(Vec::new()),
            RunControl::default(),
        );
        let result = uc.execute(Path::new("assets/clip.mp4"), &output).unwrap();

        assert_eq!(result, FinalOutput::VideoOnly);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "video-only:4");
        assert!(!buffer_path_for(&output).exists());
        assert!(*reader_closed.lock().unwrap());
        assert!(*writer_closed.lock().unwrap());
    }

    #[test]
    fn test_failed_mux_with_real_encoder_leaves_playable_video() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.mp4");
        let output = dir.path().join("out").join("face").join("source.mp4");
        create_test_video(&source, 6, 160, 120, 25, false);

        let mut uc = ProcessVideoUseCase::new(
            Box::new(FfmpegReader::new()),
            Box::new(FfmpegWriter::new()),
            Box::new(StubMuxer::failing()),
            Box::new(HorizontalFlip),
            Box::new(NullPipelineLogger),
            RunControl::default(),
        );
        let result = uc.execute(&source, &output).unwrap();

        assert_eq!(result, FinalOutput::VideoOnly);
        assert_eq!(stream_counts(&output), (1, 0));
        assert!(!buffer_path_for(&output).exists());

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&output).unwrap();
        assert_eq!((meta.width, meta.height), (160, 120));
        assert_eq!(reader.frames().filter(|f| f.is_ok()).count(), 6);
    }

    #[test]
    fn test_camera_skips_muxer_and_honours_max_frames() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("fingers").join("camera-0.mp4");
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let control = RunControl {
            max_frames: Some(3),
            ..RunControl::default()
        };

        let mut uc = ProcessVideoUseCase::new(
            Box::new(StubReader::new(black_frames(50), metadata(SourceKind::Camera, None, 0))),
            Box::new(writer),
            Box::new(StubMuxer::returning(MuxOutcome::Muxed)),
            hand_stage(Vec::new()),
            Box::new(NullPipelineLogger),
            control,
        );
        let result = uc.execute(Path::new("/dev/video0"), &output).unwrap();

        assert_eq!(result, FinalOutput::VideoOnly);
        assert_eq!(written.lock().unwrap().len(), 3);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "video-only:3");
    }

    #[test]
    fn test_stop_flag_ends_run() {
        let dir = tempfile::tempdir().unwrap();
        let control = RunControl::default();
        control.stop.store(true, Ordering::Relaxed);

        let mut uc = use_case(
            StubReader::new(black_frames(5), metadata(SourceKind::Camera, None, 0)),
            StubWriter::new(),
            StubMuxer::failing(),
            hand_stage(Vec::new()),
            control,
        );
        let output = dir.path().join("camera-0.mp4");
        let err = uc.execute(Path::new("/dev/video0"), &output).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NoFrames)
        ));
        assert!(!output.exists());
        assert!(!buffer_path_for(&output).exists());
    }

    #[test]
    fn test_detector_failures_do_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let stage = FrameAnnotator::new(
            Box::new(FailingDetector),
            Box::new(LandmarkOverlay::new(DetectorKind::Hand, DetectorKind::Hand.default_style())),
            Box::new(ImageprocRenderer::new()),
        );

        let mut uc = use_case(
            StubReader::new(black_frames(5), metadata(SourceKind::Video, Some(30.0), 5)),
            writer,
            StubMuxer::returning(MuxOutcome::NoAudio),
            Box::new(stage),
            RunControl::default(),
        );
        uc.execute(Path::new("assets/clip.mp4"), &dir.path().join("clip.mp4"))
            .unwrap();

        let frames = written.lock().unwrap();
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|f| f.data().iter().all(|&b| b == 0)));
    }

    #[test]
    fn test_read_error_ends_stream_keeping_earlier_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut frames: Vec<Result<Frame, String>> = black_frames(3).into_iter().map(Ok).collect();
        frames.push(Err("device unplugged".to_string()));
        frames.push(Ok(Frame::filled(640, 480, [0; 3], 99)));
        let writer = StubWriter::new();
        let written = writer.written.clone();

        let mut uc = use_case(
            StubReader::with_results(frames, metadata(SourceKind::Video, Some(30.0), 5)),
            writer,
            StubMuxer::returning(MuxOutcome::NoAudio),
            hand_stage(Vec::new()),
            RunControl::default(),
        );
        uc.execute(Path::new("assets/clip.mp4"), &dir.path().join("clip.mp4"))
            .unwrap();

        assert_eq!(written.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_writer_open_failure_closes_reader() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("clip.mp4");
        let reader = StubReader::new(black_frames(2), metadata(SourceKind::Video, Some(30.0), 2));
        let closed = reader.closed.clone();
        let mut writer = StubWriter::new();
        writer.fail_open = true;

        let mut uc = use_case(
            reader,
            writer,
            StubMuxer::failing(),
            hand_stage(Vec::new()),
            RunControl::default(),
        );
        let err = uc.execute(Path::new("assets/clip.mp4"), &output).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Encode(_))
        ));
        assert!(*closed.lock().unwrap());
        assert!(!output.exists());
    }

    #[test]
    fn test_landmark_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let kind = DetectorKind::Hand;
        // Only five points: highlighting the index tip (8) must fail loudly
        let stage = FrameAnnotator::new(
            Box::new(FixedDetector {
                kind,
                subjects: vec![SubjectLandmarks::from_fractions(&[(0.5, 0.5); 5], None)],
            }),
            Box::new(LandmarkOverlay::new(kind, kind.default_style()).with_highlights(&[8])),
            Box::new(ImageprocRenderer::new()),
        );
        let writer = StubWriter::new();
        let writer_closed = writer.closed.clone();
        let output = dir.path().join("clip.mp4");

        let mut uc = use_case(
            StubReader::new(black_frames(2), metadata(SourceKind::Video, Some(30.0), 2)),
            writer,
            StubMuxer::failing(),
            Box::new(stage),
            RunControl::default(),
        );
        let err = uc.execute(Path::new("assets/clip.mp4"), &output).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidLandmarkReference { id: 8, available: 5 })
        ));
        assert!(*writer_closed.lock().unwrap());
        assert!(!output.exists());
        assert!(!buffer_path_for(&output).exists());
    }

    #[test]
    fn test_overwriting_input_is_staged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"original").unwrap();
        let muxer = StubMuxer::returning(MuxOutcome::NoAudio);

        let mut uc = use_case(
            StubReader::new(black_frames(2), metadata(SourceKind::Video, Some(30.0), 2)),
            StubWriter::new(),
            muxer,
            Box::new(HorizontalFlip),
            RunControl::default(),
        );
        uc.execute(&path, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "video-only:2");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("clip.mp4")]);
    }

    #[test]
    fn test_unknown_fps_uses_configured_default() {
        struct FpsProbe(Arc<Mutex<Option<f64>>>);

        impl VideoWriter for FpsProbe {
            fn open(
                &mut self,
                path: &Path,
                metadata: &VideoMetadata,
            ) -> Result<(), Box<dyn std::error::Error>> {
                *self.0.lock().unwrap() = metadata.fps;
                std::fs::write(path, b"x")?;
                Ok(())
            }

            fn write(&mut self, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
                Ok(())
            }

            fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(Mutex::new(None));
        let control = RunControl {
            default_fps: 15.0,
            ..RunControl::default()
        };
        let mut uc = ProcessVideoUseCase::new(
            Box::new(StubReader::new(black_frames(1), metadata(SourceKind::Camera, None, 0))),
            Box::new(FpsProbe(seen.clone())),
            Box::new(StubMuxer::failing()),
            Box::new(HorizontalFlip),
            Box::new(NullPipelineLogger),
            control,
        );
        uc.execute(Path::new("/dev/video0"), &dir.path().join("camera-0.mp4"))
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), Some(15.0));
    }
}
