use crate::landmarks::domain::detection::Detection;
use crate::landmarks::domain::detector_kind::DetectorKind;
use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::rendering::domain::annotation_style::AnnotationStyle;
use crate::rendering::domain::frame_renderer::FrameRenderer;
use crate::rendering::domain::overlay::{
    connect_landmarks, draw_face_box, draw_skeleton, highlight_landmark,
};
use crate::shared::frame::Frame;

/// Landmark ids the hands demo emphasises: thumb tip and index tip.
pub const HAND_DEMO_HIGHLIGHTS: &[usize] = &[4, 8];
/// Pinch line between the thumb tip and index tip.
pub const HAND_DEMO_CONNECTIONS: &[(usize, usize)] = &[(4, 8)];

/// Default drawing for a detector kind: a scored box for faces, the
/// skeleton (or bare points for the face mesh) for everything else.
pub struct LandmarkOverlay {
    kind: DetectorKind,
    style: AnnotationStyle,
    highlights: Vec<usize>,
    connections: Vec<(usize, usize)>,
}

impl LandmarkOverlay {
    pub fn new(kind: DetectorKind, style: AnnotationStyle) -> Self {
        Self {
            kind,
            style,
            highlights: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Landmarks drawn with the emphasis colour on every subject.
    pub fn with_highlights(mut self, ids: &[usize]) -> Self {
        self.highlights = ids.to_vec();
        self
    }

    /// Landmark pairs joined by an emphasis line on every subject.
    pub fn with_connections(mut self, pairs: &[(usize, usize)]) -> Self {
        self.connections = pairs.to_vec();
        self
    }
}

impl FrameProcessor for LandmarkOverlay {
    fn process(
        &mut self,
        frame: &mut Frame,
        detection: &Detection,
        renderer: &dyn FrameRenderer,
        _logger: &mut dyn PipelineLogger,
    ) -> Result<(), Box<dyn std::error::Error>> {
        for subject in detection.subjects() {
            match self.kind {
                DetectorKind::Face => draw_face_box(renderer, frame, subject, &self.style),
                _ => draw_skeleton(renderer, frame, subject, self.kind.connections(), &self.style),
            }
        }
        for &(a, b) in &self.connections {
            connect_landmarks(renderer, frame, detection, a, b, &self.style)?;
        }
        for &id in &self.highlights {
            highlight_landmark(renderer, frame, detection, id, &self.style)?;
        }
        Ok(())
    }
}
