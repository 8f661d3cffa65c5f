use std::time::Instant;

use crate::landmarks::domain::detection::Detection;
use crate::landmarks::domain::landmark_detector::LandmarkDetector;
use crate::rendering::domain::frame_renderer::FrameRenderer;
use crate::shared::frame::Frame;

use super::frame_processor::FrameProcessor;
use super::pipeline_logger::PipelineLogger;

/// One in-place transformation applied to every frame between reader and
/// writer.
pub trait FrameStage {
    fn apply(
        &mut self,
        frame: &mut Frame,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), Box<dyn std::error::Error>>;
}

/// Detect, convert to pixels, then hand the detection to a processor.
///
/// A detector failure on one frame is logged and treated as an empty
/// detection; processing continues with the next frame.
pub struct FrameAnnotator {
    detector: Box<dyn LandmarkDetector>,
    processor: Box<dyn FrameProcessor>,
    renderer: Box<dyn FrameRenderer>,
}

impl FrameAnnotator {
    pub fn new(
        detector: Box<dyn LandmarkDetector>,
        processor: Box<dyn FrameProcessor>,
        renderer: Box<dyn FrameRenderer>,
    ) -> Self {
        Self {
            detector,
            processor,
            renderer,
        }
    }

    fn detect(&mut self, frame: &Frame) -> Detection {
        match self.detector.detect(frame) {
            Ok(raw) => Detection::from_landmarks(&raw, frame.width(), frame.height()),
            Err(e) => {
                log::warn!(
                    "{} detection failed on frame {}: {e}",
                    self.detector.kind(),
                    frame.index()
                );
                Detection::empty()
            }
        }
    }
}

impl FrameStage for FrameAnnotator {
    fn apply(
        &mut self,
        frame: &mut Frame,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let t0 = Instant::now();
        let detection = self.detect(frame);
        logger.timing("detect", t0.elapsed().as_secs_f64() * 1000.0);
        logger.metric("subjects", detection.len() as f64);

        let t1 = Instant::now();
        self.processor
            .process(frame, &detection, self.renderer.as_ref(), logger)?;
        logger.timing("render", t1.elapsed().as_secs_f64() * 1000.0);
        Ok(())
    }
}

/// Mirrors every frame around its vertical axis.
pub struct HorizontalFlip;

impl FrameStage for HorizontalFlip {
    fn apply(
        &mut self,
        frame: &mut Frame,
        _logger: &mut dyn PipelineLogger,
    ) -> Result<(), Box<dyn std::error::Error>> {
        frame.flip_horizontal();
        Ok(())
    }
}

/// Scales frames by a percentage of their size. Dimensions are truncated
/// and never drop below one pixel.
pub struct Rescale {
    percent: f64,
}

impl Rescale {
    pub fn new(percent: f64) -> Result<Self, Box<dyn std::error::Error>> {
        if !percent.is_finite() || percent <= 0.0 {
            return Err(format!("scale must be a positive percentage, got {percent}").into());
        }
        Ok(Self { percent })
    }

    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        let scale = |v: u32| ((v as f64 * self.percent / 100.0) as u32).max(1);
        (scale(width), scale(height))
    }
}

impl FrameStage for Rescale {
    fn apply(
        &mut self,
        frame: &mut Frame,
        _logger: &mut dyn PipelineLogger,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (width, height) = self.target_size(frame.width(), frame.height());
        if (width, height) != (frame.width(), frame.height()) {
            *frame = frame.resized(width, height);
        }
        Ok(())
    }
}
