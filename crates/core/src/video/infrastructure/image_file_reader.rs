use std::path::Path;

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::{SourceKind, VideoMetadata};
use crate::video::domain::video_reader::VideoReader;

/// Adapts a single image file to the [`VideoReader`] interface.
///
/// The image is a one-frame source with no frame rate, so stills and
/// videos go through the same loop.
pub struct ImageFileReader {
    frame: Option<Frame>,
    opened: bool,
}

impl ImageFileReader {
    pub fn new() -> Self {
        Self {
            frame: None,
            opened: false,
        }
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for ImageFileReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let image = image::open(path)
            .map_err(|e| PipelineError::source_unavailable(path.display().to_string(), e))?
            .to_rgb8();
        let (width, height) = image.dimensions();

        self.frame = Some(Frame::from_image(image, 0));
        self.opened = true;

        Ok(VideoMetadata {
            width,
            height,
            fps: None,
            total_frames: 1,
            codec: String::new(),
            source_path: Some(path.to_path_buf()),
            source_kind: SourceKind::Image,
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        if !self.opened {
            return Box::new(std::iter::once(Err("ImageFileReader: not opened".into())));
        }
        Box::new(self.frame.take().into_iter().map(Ok))
    }

    fn close(&mut self) {
        self.frame = None;
        self.opened = false;
    }
}
