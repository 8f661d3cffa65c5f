//! Synthesized media for ffmpeg-backed tests.

use std::path::Path;

const AUDIO_RATE: i32 = 44_100;

pub(crate) fn aac_available() -> bool {
    ffmpeg_next::init().unwrap();
    ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::AAC).is_some()
}

/// Writes an MPEG-4 video of flat grey frames whose brightness steps per
/// frame, optionally with one second of silent AAC audio.
pub(crate) fn create_test_video(
    path: &Path,
    num_frames: usize,
    width: u32,
    height: u32,
    fps: i32,
    with_audio: bool,
) {
    ffmpeg_next::init().unwrap();

    let mut octx = ffmpeg_next::format::output(path).unwrap();
    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
    let mut ost = octx.add_stream(Some(codec)).unwrap();
    let video_index = ost.index();

    let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .unwrap();
    encoder_ctx.set_width(width);
    encoder_ctx.set_height(height);
    encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
    encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
    encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));
    if global_header {
        encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
    }
    let mut encoder = encoder_ctx
        .open_with(ffmpeg_next::Dictionary::new())
        .unwrap();
    ost.set_parameters(&encoder);

    let audio = with_audio.then(|| {
        let aac = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::AAC).unwrap();
        let mut ost_audio = octx.add_stream(Some(aac)).unwrap();
        let audio_index = ost_audio.index();
        let mut audio_ctx = ffmpeg_next::codec::context::Context::new_with_codec(aac)
            .encoder()
            .audio()
            .unwrap();
        audio_ctx.set_rate(AUDIO_RATE);
        audio_ctx.set_channel_layout(ffmpeg_next::ChannelLayout::MONO);
        audio_ctx.set_format(ffmpeg_next::format::Sample::F32(
            ffmpeg_next::format::sample::Type::Planar,
        ));
        if global_header {
            audio_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }
        let audio_encoder = audio_ctx.open_as(aac).unwrap();
        ost_audio.set_parameters(&audio_encoder);
        (audio_encoder, audio_index)
    });

    octx.write_header().unwrap();

    let video_tb = octx.stream(video_index).unwrap().time_base();
    let mut scaler = ffmpeg_next::software::scaling::Context::get(
        ffmpeg_next::format::Pixel::RGB24,
        width,
        height,
        ffmpeg_next::format::Pixel::YUV420P,
        width,
        height,
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )
    .unwrap();

    let drain_video = |encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
                           octx: &mut ffmpeg_next::format::context::Output| {
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(video_index);
            encoded.rescale_ts(ffmpeg_next::Rational(1, fps), video_tb);
            encoded.write_interleaved(octx).unwrap();
        }
    };

    for i in 0..num_frames {
        let mut rgb_frame =
            ffmpeg_next::util::frame::video::Video::new(ffmpeg_next::format::Pixel::RGB24, width, height);
        let stride = rgb_frame.stride(0);
        let data = rgb_frame.data_mut(0);
        let value = ((i * 40) % 256) as u8;
        for row in 0..height as usize {
            data[row * stride..row * stride + width as usize * 3].fill(value);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
        yuv_frame.set_pts(Some(i as i64));
        encoder.send_frame(&yuv_frame).unwrap();
        drain_video(&mut encoder, &mut octx);
    }
    encoder.send_eof().unwrap();
    drain_video(&mut encoder, &mut octx);

    if let Some((mut audio_encoder, audio_index)) = audio {
        let audio_tb = octx.stream(audio_index).unwrap().time_base();
        let enc_tb = audio_encoder.time_base();
        let frame_size = match audio_encoder.frame_size() {
            0 => 1024,
            n => n as usize,
        };

        let drain_audio = |octx: &mut ffmpeg_next::format::context::Output,
                               audio_encoder: &mut ffmpeg_next::codec::encoder::audio::Encoder| {
            let mut encoded = ffmpeg_next::Packet::empty();
            while audio_encoder.receive_packet(&mut encoded).is_ok() {
                encoded.set_stream(audio_index);
                encoded.rescale_ts(enc_tb, audio_tb);
                encoded.write_interleaved(octx).unwrap();
            }
        };

        let mut pts = 0i64;
        while pts < AUDIO_RATE as i64 {
            let mut frame = ffmpeg_next::util::frame::audio::Audio::new(
                ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
                frame_size,
                ffmpeg_next::ChannelLayout::MONO,
            );
            frame.set_rate(AUDIO_RATE as u32);
            frame.set_pts(Some(pts));
            frame.data_mut(0).fill(0);
            audio_encoder.send_frame(&frame).unwrap();
            drain_audio(&mut octx, &mut audio_encoder);
            pts += frame_size as i64;
        }
        audio_encoder.send_eof().unwrap();
        drain_audio(&mut octx, &mut audio_encoder);
    }

    octx.write_trailer().unwrap();
}

/// Number of streams of each kind in a media file: `(video, audio)`.
pub(crate) fn stream_counts(path: &Path) -> (usize, usize) {
    ffmpeg_next::init().unwrap();
    let ictx = ffmpeg_next::format::input(path).unwrap();
    let count = |medium: ffmpeg_next::media::Type| {
        ictx.streams()
            .filter(|s| s.parameters().medium() == medium)
            .count()
    };
    (
        count(ffmpeg_next::media::Type::Video),
        count(ffmpeg_next::media::Type::Audio),
    )
}
