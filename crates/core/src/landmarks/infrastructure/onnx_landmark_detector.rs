/// Landmark detector using ONNX Runtime via `ort`.
///
/// Works with single-stage landmark models: the whole frame is resized to
/// the model input, and output 0 carries `K` points of `C >= 2` values
/// (x, y first) per subject. An optional output 1 carries per-subject
/// scores.
use std::path::Path;

use crate::landmarks::domain::detection::SubjectLandmarks;
use crate::landmarks::domain::detector_kind::DetectorKind;
use crate::landmarks::domain::landmark::Landmark;
use crate::landmarks::domain::landmark_detector::{
    CoordinateSpace, DetectorOptions, LandmarkDetector,
};
use crate::shared::frame::Frame;

/// Fallback input resolution when the model declares dynamic dimensions.
const DEFAULT_INPUT_SIZE: u32 = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TensorLayout {
    Nchw,
    Nhwc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct InputSpec {
    layout: TensorLayout,
    width: u32,
    height: u32,
}

impl InputSpec {
    /// Reads layout and size from a declared input shape. Channel position
    /// decides the layout; non-positive dimensions fall back to the default.
    fn from_shape(shape: &[i64]) -> Self {
        let dim = |v: i64| if v > 0 { v as u32 } else { DEFAULT_INPUT_SIZE };
        if shape.len() == 4 && shape[3] == 3 && shape[1] != 3 {
            Self {
                layout: TensorLayout::Nhwc,
                height: dim(shape[1]),
                width: dim(shape[2]),
            }
        } else if shape.len() == 4 {
            Self {
                layout: TensorLayout::Nchw,
                height: dim(shape[2]),
                width: dim(shape[3]),
            }
        } else {
            Self {
                layout: TensorLayout::Nchw,
                height: DEFAULT_INPUT_SIZE,
                width: DEFAULT_INPUT_SIZE,
            }
        }
    }
}

/// Landmark detector backed by an ONNX Runtime session.
pub struct OnnxLandmarkDetector {
    session: ort::session::Session,
    kind: DetectorKind,
    input: InputSpec,
    options: DetectorOptions,
}

impl OnnxLandmarkDetector {
    /// Load a landmark model and prepare for inference.
    pub fn new(
        model_path: &Path,
        kind: DetectorKind,
        options: DetectorOptions,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        let input = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    Some(InputSpec::from_shape(&shape[..]))
                } else {
                    None
                }
            })
            .unwrap_or(InputSpec::from_shape(&[]));

        log::info!(
            "Loaded {} landmark model {} ({}x{}, {:?})",
            kind,
            model_path.display(),
            input.width,
            input.height,
            input.layout
        );

        Ok(Self {
            session,
            kind,
            input,
            options,
        })
    }
}

impl LandmarkDetector for OnnxLandmarkDetector {
    fn kind(&self) -> DetectorKind {
        self.kind
    }

    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<SubjectLandmarks>, Box<dyn std::error::Error>> {
        let input_tensor = resize_to_tensor(frame, self.input);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("landmark model produced no outputs".into());
        }

        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;
        let subjects = split_subjects(data, &shape, self.kind.landmark_count())?;

        let scores = if outputs.len() > 1 {
            let scores = outputs[1].try_extract_array::<f32>()?;
            scores.as_slice().map(|s| s.to_vec())
        } else {
            None
        };

        Ok(to_subject_landmarks(
            subjects,
            scores.as_deref(),
            &self.options,
            self.input,
        ))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Stretch-resize a frame to the model input and scale to `[0, 1]`.
///
/// No letterboxing, so output fractions map straight back onto the frame.
fn resize_to_tensor(frame: &Frame, spec: InputSpec) -> ndarray::Array4<f32> {
    let (tw, th) = (spec.width as usize, spec.height as usize);
    let mut tensor = match spec.layout {
        TensorLayout::Nchw => ndarray::Array4::<f32>::zeros((1, 3, th, tw)),
        TensorLayout::Nhwc => ndarray::Array4::<f32>::zeros((1, th, tw, 3)),
    };

    let src = frame.as_ndarray(); // [H, W, C] u8
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    if src_h == 0 || src_w == 0 {
        return tensor;
    }

    // Nearest-neighbor sampling
    for y in 0..th {
        let src_y = (y * src_h / th).min(src_h - 1);
        for x in 0..tw {
            let src_x = (x * src_w / tw).min(src_w - 1);
            for c in 0..3 {
                let v = src[[src_y, src_x, c]] as f32 / 255.0;
                match spec.layout {
                    TensorLayout::Nchw => tensor[[0, c, y, x]] = v,
                    TensorLayout::Nhwc => tensor[[0, y, x, c]] = v,
                }
            }
        }
    }
    tensor
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

/// Split a flat output tensor into per-subject `(x, y)` lists.
///
/// Rank >= 3 reads `[.., K, C]`. Rank <= 2 is a flattened `K * C` row per
/// subject, with `K` taken from the detector's schema.
fn split_subjects(
    data: &[f32],
    shape: &[usize],
    landmark_count: usize,
) -> Result<Vec<Vec<(f32, f32)>>, String> {
    let (points, channels) = match shape.len() {
        0 => return Err("landmark output is a scalar".to_string()),
        1 | 2 => {
            let row = shape[shape.len() - 1];
            if landmark_count == 0 || row % landmark_count != 0 {
                return Err(format!(
                    "landmark output {shape:?} does not hold {landmark_count} points"
                ));
            }
            (landmark_count, row / landmark_count)
        }
        n => (shape[n - 2], shape[n - 1]),
    };
    if channels < 2 {
        return Err(format!("landmark output {shape:?} has fewer than 2 values per point"));
    }

    let stride = points * channels;
    if stride == 0 {
        return Ok(Vec::new());
    }
    let subjects = data
        .chunks_exact(stride)
        .map(|chunk| {
            chunk
                .chunks_exact(channels)
                .map(|p| (p[0], p[1]))
                .collect()
        })
        .collect();
    Ok(subjects)
}

fn to_subject_landmarks(
    subjects: Vec<Vec<(f32, f32)>>,
    scores: Option<&[f32]>,
    options: &DetectorOptions,
    input: InputSpec,
) -> Vec<SubjectLandmarks> {
    let (sx, sy) = match options.coordinate_space {
        CoordinateSpace::Normalized => (1.0, 1.0),
        CoordinateSpace::InputPixels => (input.width as f64, input.height as f64),
    };

    subjects
        .into_iter()
        .enumerate()
        .filter_map(|(i, points)| {
            let score = scores.and_then(|s| s.get(i).copied());
            if score.is_some_and(|s| s < options.min_confidence) {
                return None;
            }
            let landmarks = points
                .into_iter()
                .enumerate()
                .map(|(id, (x, y))| Landmark::new(id, x as f64 / sx, y as f64 / sy))
                .collect();
            Some(SubjectLandmarks::new(landmarks, score))
        })
        .take(options.max_subjects)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
