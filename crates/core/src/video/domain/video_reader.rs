use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// A source of frames: a still image, a video file or a live camera.
///
/// Frames are produced lazily in capture order. A source is not
/// restartable; reading again requires a fresh `open`.
pub trait VideoReader: Send {
    /// Opens a file or capture device and returns the session's metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over the remaining frames.
    ///
    /// File sources end at the physical end of stream. Live sources never
    /// end on their own; the caller stops pulling. An `Err` item ends the
    /// stream.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases the file handle or device. Safe to call more than once.
    fn close(&mut self);
}
