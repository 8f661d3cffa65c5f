use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy of the frame pipeline.
///
/// `Encode` and `Mux` are recovered during output finalization and only
/// surface when there is no video-only result to fall back to.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot open {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(PathBuf),
    #[error("encoding failed: {0}")]
    Encode(String),
    #[error("audio muxing failed: {0}")]
    Mux(String),
    #[error("landmark {id} is not present in the detection ({available} landmarks available)")]
    InvalidLandmarkReference { id: usize, available: usize },
    #[error("source produced no frames")]
    NoFrames,
}

impl PipelineError {
    pub fn source_unavailable(
        source_name: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}
