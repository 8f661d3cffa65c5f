use crate::landmarks::domain::detection::Detection;
use crate::rendering::domain::frame_renderer::FrameRenderer;
use crate::shared::frame::Frame;

use super::pipeline_logger::PipelineLogger;

/// App logic run on every frame once its landmarks are in pixel space:
/// geometry on the detection, then drawing onto the frame.
///
/// Implementations may keep state across frames (rep counts, canvases).
/// An `InvalidLandmarkReference` from a lookup is returned, not skipped.
pub trait FrameProcessor: Send {
    fn process(
        &mut self,
        frame: &mut Frame,
        detection: &Detection,
        renderer: &dyn FrameRenderer,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
