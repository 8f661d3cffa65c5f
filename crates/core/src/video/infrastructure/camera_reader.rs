use std::path::{Path, PathBuf};

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::{SourceKind, VideoMetadata};
use crate::video::domain::video_reader::VideoReader;

use super::ffmpeg_reader::DecodeStream;

#[cfg(target_os = "linux")]
const CAPTURE_FORMAT: &str = "video4linux2";
#[cfg(target_os = "macos")]
const CAPTURE_FORMAT: &str = "avfoundation";
#[cfg(target_os = "windows")]
const CAPTURE_FORMAT: &str = "vfwcap";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const CAPTURE_FORMAT: &str = "";

/// Reads a live camera through libavdevice.
///
/// The stream never ends on its own; the caller decides when to stop
/// pulling frames. Width and height are requests the driver may ignore.
pub struct CameraReader {
    width: u32,
    height: u32,
    framerate: Option<u32>,
    stream: Option<DecodeStream>,
}

// Safety: CameraReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for CameraReader {}

impl CameraReader {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            framerate: None,
            stream: None,
        }
    }

    pub fn with_framerate(mut self, framerate: u32) -> Self {
        self.framerate = Some(framerate);
        self
    }

    /// Platform device locator for a camera index, to pass to `open`.
    pub fn device_path(index: u32) -> PathBuf {
        if cfg!(target_os = "linux") {
            PathBuf::from(format!("/dev/video{index}"))
        } else if cfg!(target_os = "macos") {
            PathBuf::from(format!("{index}:none"))
        } else {
            PathBuf::from(index.to_string())
        }
    }

    fn options(&self) -> ffmpeg_next::Dictionary<'static> {
        let mut options = ffmpeg_next::Dictionary::new();
        options.set("video_size", &format!("{}x{}", self.width, self.height));
        if let Some(fps) = self.framerate {
            options.set("framerate", &fps.to_string());
        }
        options
    }
}

impl VideoReader for CameraReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();

        let name = path.display().to_string();
        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name().split(',').any(|n| n == CAPTURE_FORMAT))
            .ok_or_else(|| {
                PipelineError::source_unavailable(
                    &name,
                    format!("capture format {CAPTURE_FORMAT:?} is not available"),
                )
            })?;

        let ctx = ffmpeg_next::format::open_with(
            path,
            &ffmpeg_next::format::format::Format::Input(format),
            self.options(),
        )
        .map_err(|e| PipelineError::source_unavailable(&name, e))?;
        let ictx = match ctx {
            ffmpeg_next::format::context::Context::Input(ictx) => ictx,
            ffmpeg_next::format::context::Context::Output(_) => {
                return Err(PipelineError::source_unavailable(&name, "not a capture device").into())
            }
        };

        let stream =
            DecodeStream::new(ictx).map_err(|e| PipelineError::source_unavailable(&name, e))?;
        let metadata = stream.metadata(path, SourceKind::Camera);
        log::info!(
            "Opened camera {name} at {}x{} ({})",
            metadata.width,
            metadata.height,
            metadata
                .fps
                .map(|f| format!("{f:.1} fps"))
                .unwrap_or_else(|| "fps unknown".to_string())
        );

        self.stream = Some(stream);
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.stream.as_mut() {
            Some(stream) => Box::new(stream.iter()),
            None => Box::new(std::iter::once(Err("CameraReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}
