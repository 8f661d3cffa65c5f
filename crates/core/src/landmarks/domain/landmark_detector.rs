use serde::{Deserialize, Serialize};

use crate::shared::frame::Frame;

use super::detection::SubjectLandmarks;
use super::detector_kind::DetectorKind;

/// Domain interface for landmark detection.
///
/// Implementations may keep state between frames (tracking, smoothing),
/// hence `&mut self`. Subjects come back as frame fractions; converting
/// to pixels is the caller's job.
pub trait LandmarkDetector: Send {
    fn kind(&self) -> DetectorKind;

    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<SubjectLandmarks>, Box<dyn std::error::Error>>;
}

/// Units of the coordinates a model emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// Already fractions of the input image.
    #[default]
    Normalized,
    /// Pixels of the model's input tensor.
    InputPixels,
}

/// Filtering applied to raw detector output.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorOptions {
    pub min_confidence: f32,
    pub max_subjects: usize,
    pub coordinate_space: CoordinateSpace,
}

impl DetectorOptions {
    pub fn for_kind(kind: DetectorKind) -> Self {
        Self {
            min_confidence: 0.5,
            max_subjects: kind.default_max_subjects(),
            coordinate_space: CoordinateSpace::Normalized,
        }
    }
}
