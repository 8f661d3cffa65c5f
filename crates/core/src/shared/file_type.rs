use std::path::Path;

use super::constants::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use super::error::PipelineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

/// Classifies a file by its suffix alone. No content sniffing.
pub fn classify(path: &Path) -> MediaKind {
    let Some(ext) = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
    else {
        return MediaKind::Unsupported;
    };

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Video
    } else {
        MediaKind::Unsupported
    }
}

/// Like [`classify`], but rejects unsupported files up front.
pub fn require_supported(path: &Path) -> Result<MediaKind, PipelineError> {
    match classify(path) {
        MediaKind::Unsupported => Err(PipelineError::UnsupportedFileType(path.to_path_buf())),
        kind => Ok(kind),
    }
}
