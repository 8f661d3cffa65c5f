use std::path::Path;

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::{SourceKind, VideoMetadata};
use crate::video::domain::video_reader::VideoReader;

/// Decodes video files via ffmpeg-next (libavformat + libavcodec).
///
/// Converts each decoded frame to RGB24 and wraps it in a [`Frame`].
pub struct FfmpegReader {
    stream: Option<DecodeStream>,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self { stream: None }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let name = path.display().to_string();
        let ictx = ffmpeg_next::format::input(path)
            .map_err(|e| PipelineError::source_unavailable(&name, e))?;
        let stream = DecodeStream::new(ictx).map_err(|e| PipelineError::source_unavailable(&name, e))?;

        let metadata = stream.metadata(path, SourceKind::Video);
        self.stream = Some(stream);
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.stream.as_mut() {
            Some(stream) => Box::new(stream.iter()),
            None => Box::new(std::iter::once(Err("FfmpegReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

/// An opened input with its video decoder and RGB scaler.
///
/// Shared by file and capture-device readers.
pub(crate) struct DecodeStream {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    video_stream_index: usize,
    fps: Option<f64>,
    total_frames: usize,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl DecodeStream {
    pub(crate) fn new(
        ictx: ffmpeg_next::format::context::Input,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.avg_frame_rate();
        let rate = if rate.denominator() != 0 && rate.numerator() > 0 {
            rate
        } else {
            stream.rate()
        };
        let fps = (rate.denominator() != 0 && rate.numerator() > 0)
            .then(|| rate.numerator() as f64 / rate.denominator() as f64);
        let total_frames = stream.frames().max(0) as usize;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            ictx,
            decoder,
            scaler,
            video_stream_index,
            fps,
            total_frames,
            frame_index: 0,
            flushing: false,
            done: false,
        })
    }

    pub(crate) fn metadata(&self, path: &Path, kind: SourceKind) -> VideoMetadata {
        VideoMetadata {
            width: self.decoder.width(),
            height: self.decoder.height(),
            fps: self.fps,
            total_frames: if kind == SourceKind::Camera {
                0
            } else {
                self.total_frames
            },
            codec: self
                .decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
            source_kind: kind,
        }
    }

    pub(crate) fn iter(&mut self) -> DecodeIter<'_> {
        DecodeIter { stream: self }
    }

    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb_frame) {
            return Some(Err(Box::new(e)));
        }

        let (width, height) = (self.decoder.width(), self.decoder.height());
        let pixels = extract_rgb_pixels(&rgb_frame, width, height);
        let frame = Frame::new(pixels, width, height, self.frame_index);
        self.frame_index += 1;
        Some(Ok(frame))
    }
}

/// Lazy iterator that decodes one frame per call.
pub(crate) struct DecodeIter<'a> {
    stream: &'a mut DecodeStream,
}

impl Iterator for DecodeIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        let s = &mut *self.stream;
        if s.done {
            return None;
        }

        if let Some(result) = s.try_receive() {
            return Some(result);
        }

        if s.flushing {
            s.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = s.ictx.packets().next() else {
                let _ = s.decoder.send_eof();
                s.flushing = true;
                if let Some(result) = s.try_receive() {
                    return Some(result);
                }
                s.done = true;
                return None;
            };

            if stream.index() != s.video_stream_index {
                continue;
            }

            if s.decoder.send_packet(&packet).is_err() {
                continue;
            }

            if let Some(result) = s.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may pad each row (stride > width*3); the padding is dropped.
pub(crate) fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::test_support::create_test_video;
    use std::path::PathBuf;

    fn test_video_path(dir: &Path) -> PathBuf {
        dir.join("test.mp4")
    }

    #[test]
    fn test_open_returns_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120, 30, false);

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&path).unwrap();
        assert_eq!(meta.width, 160);
        assert_eq!(meta.height, 120);
        assert!(meta.fps_or(0.0) > 0.0);
        assert_eq!(meta.source_kind, SourceKind::Video);
        assert_eq!(meta.source_path, Some(path));
    }

    #[test]
    fn test_open_nonexistent_is_source_unavailable() {
        let mut reader = FfmpegReader::new();
        let err = reader.open(Path::new("/nonexistent/test.mp4")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_frames_yields_every_frame_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120, 30, false);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();

        let frames: Vec<_> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 5);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
            assert_eq!(frame.data().len(), 160 * 120 * 3);
        }
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = FfmpegReader::new();
        let result = reader.frames().next().unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 1, 160, 120, 30, false);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        reader.close();
        reader.close();
        assert!(reader.frames().next().unwrap().is_err());
    }
}
