use std::path::PathBuf;

/// Where a session's frames come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Image,
    Video,
    Camera,
}

/// Properties of an opened media session.
///
/// `fps` is `None` when the source does not announce a rate (still images,
/// some camera drivers). `total_frames` is 0 when unknown or unbounded.
/// `source_path` doubles as the audio handle used for re-muxing.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: Option<f64>,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
    pub source_kind: SourceKind,
}

impl VideoMetadata {
    /// Frame rate, or `default` when the source did not report a usable one.
    pub fn fps_or(&self, default: f64) -> f64 {
        match self.fps {
            Some(fps) if fps.is_finite() && fps > 0.0 => fps,
            _ => default,
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.source_kind != SourceKind::Camera
    }
}
