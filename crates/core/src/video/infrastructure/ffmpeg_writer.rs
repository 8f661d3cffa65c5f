use std::path::Path;

use crate::shared::constants::DEFAULT_FPS;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes frames to a video-only file via ffmpeg-next (MPEG-4 Part 2).
pub struct FfmpegWriter {
    session: Option<EncodeSession>,
}

struct EncodeSession {
    octx: ffmpeg_next::format::context::Output,
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    time_base: ffmpeg_next::Rational,
    stream_time_base: ffmpeg_next::Rational,
    frame_count: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self { session: None }
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Integral frame rate for the encoder time base.
fn encoder_fps(metadata: &VideoMetadata) -> i32 {
    let fps = metadata.fps_or(DEFAULT_FPS).round() as i32;
    if fps <= 0 {
        DEFAULT_FPS as i32
    } else {
        fps
    }
}

impl EncodeSession {
    fn open(path: &Path, metadata: &VideoMetadata) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        // Use MPEG4 as a widely compatible encoder
        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;

        let mut ost = octx.add_stream(Some(codec))?;
        let stream_index = ost.index();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        let fps = encoder_fps(metadata);
        let time_base = ffmpeg_next::Rational(1, fps);
        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;
        let stream_time_base = octx
            .stream(stream_index)
            .ok_or("output stream missing after header")?
            .time_base();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            octx,
            encoder,
            scaler,
            width: metadata.width,
            height: metadata.height,
            time_base,
            stream_time_base,
            frame_count: 0,
        })
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(format!(
                "frame is {}x{}, stream is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let stride = rgb_frame.stride(0);
        let data = rgb_frame.data_mut(0);
        let src = frame.data();
        let row_len = self.width as usize * 3;

        // Copy pixel data, respecting stride
        for row in 0..self.height as usize {
            let src_start = row * row_len;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_len].copy_from_slice(&src[src_start..src_start + row_len]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        self.encoder.send_frame(&yuv_frame)?;
        self.drain()?;

        self.frame_count += 1;
        Ok(())
    }

    fn drain(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut encoded = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(self.time_base, self.stream_time_base);
            encoded.write_interleaved(&mut self.octx)?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.encoder.send_eof()?;
        self.drain()?;
        self.octx.write_trailer()?;
        Ok(())
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let session = EncodeSession::open(path, metadata)
            .map_err(|e| PipelineError::Encode(format!("{}: {e}", path.display())))?;
        self.session = Some(session);
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let session = self.session.as_mut().ok_or("FfmpegWriter: not opened")?;
        session
            .write(frame)
            .map_err(|e| PipelineError::Encode(e.to_string()).into())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        match self.session.take() {
            Some(session) => session
                .finish()
                .map_err(|e| PipelineError::Encode(e.to_string()).into()),
            None => Ok(()),
        }
    }
}
