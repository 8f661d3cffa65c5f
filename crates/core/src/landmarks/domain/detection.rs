use crate::shared::error::PipelineError;

use super::landmark::{Landmark, PixelPoint};

/// One detected subject as reported by a detector, in frame fractions.
#[derive(Clone, Debug, PartialEq)]
pub struct SubjectLandmarks {
    pub landmarks: Vec<Landmark>,
    pub score: Option<f32>,
}

impl SubjectLandmarks {
    pub fn new(landmarks: Vec<Landmark>, score: Option<f32>) -> Self {
        Self { landmarks, score }
    }

    /// Builds a subject from `(x, y)` fractions, numbering ids by position.
    pub fn from_fractions(points: &[(f64, f64)], score: Option<f32>) -> Self {
        let landmarks = points
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| Landmark::new(id, x, y))
            .collect();
        Self::new(landmarks, score)
    }
}

/// One subject (face, hand, pose) resolved to pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Subject {
    points: Vec<PixelPoint>,
    score: Option<f32>,
}

impl Subject {
    pub fn new(points: Vec<PixelPoint>, score: Option<f32>) -> Self {
        Self { points, score }
    }

    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    pub fn score(&self) -> Option<f32> {
        self.score
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Looks up a landmark by id.
    ///
    /// A missing id means the detector returned fewer points than the
    /// caller's schema assumes, which is reported rather than skipped.
    pub fn point(&self, id: usize) -> Result<PixelPoint, PipelineError> {
        // Ids are positional for every schema we ship, so try the fast path first.
        if let Some(p) = self.points.get(id).filter(|p| p.id == id) {
            return Ok(*p);
        }
        self.points
            .iter()
            .find(|p| p.id == id)
            .copied()
            .ok_or(PipelineError::InvalidLandmarkReference {
                id,
                available: self.points.len(),
            })
    }

    /// Axis-aligned box `(x, y, width, height)` around all points.
    pub fn bounding_box(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.points.first()?;
        let (mut x1, mut y1, mut x2, mut y2) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            x1 = x1.min(p.x);
            y1 = y1.min(p.y);
            x2 = x2.max(p.x);
            y2 = y2.max(p.y);
        }
        Some((x1, y1, x2 - x1, y2 - y1))
    }
}

/// All subjects found in one frame. Created per frame, never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Detection {
    subjects: Vec<Subject>,
}

impl Detection {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolves detector output for a `width` x `height` frame.
    pub fn from_landmarks(raw: &[SubjectLandmarks], width: u32, height: u32) -> Self {
        let subjects = raw
            .iter()
            .map(|s| {
                let points = s
                    .landmarks
                    .iter()
                    .map(|lm| lm.to_pixel(width, height))
                    .collect();
                Subject::new(points, s.score)
            })
            .collect();
        Self { subjects }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn first(&self) -> Option<&Subject> {
        self.subjects.first()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
