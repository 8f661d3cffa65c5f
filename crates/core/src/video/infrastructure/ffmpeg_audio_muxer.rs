use std::path::Path;

use crate::shared::error::PipelineError;
use crate::video::domain::audio_muxer::{AudioMuxer, MuxOutcome};

/// Remuxes without re-encoding: video packets from the silent file and
/// audio packets from the source are copied into a new container.
pub struct FfmpegAudioMuxer;

impl FfmpegAudioMuxer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegAudioMuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioMuxer for FfmpegAudioMuxer {
    fn mux(
        &self,
        video_only: &Path,
        audio_source: &Path,
        destination: &Path,
    ) -> Result<MuxOutcome, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        remux(video_only, audio_source, destination)
            .map_err(|e| PipelineError::Mux(e.to_string()).into())
    }
}

fn remux(
    video_only: &Path,
    audio_source: &Path,
    destination: &Path,
) -> Result<MuxOutcome, Box<dyn std::error::Error>> {
    let mut ictx_source = ffmpeg_next::format::input(audio_source)?;

    let has_audio = ictx_source
        .streams()
        .best(ffmpeg_next::media::Type::Audio)
        .is_some();
    if !has_audio {
        return Ok(MuxOutcome::NoAudio);
    }

    let mut ictx_video = ffmpeg_next::format::input(video_only)?;
    let mut octx = ffmpeg_next::format::output(destination)?;

    // Input stream index -> output stream index, per input
    let mut video_stream_map: Vec<Option<usize>> = vec![None; ictx_video.nb_streams() as usize];
    let mut audio_stream_map: Vec<Option<usize>> = vec![None; ictx_source.nb_streams() as usize];

    for (idx, stream) in ictx_video.streams().enumerate() {
        if stream.parameters().medium() == ffmpeg_next::media::Type::Video {
            video_stream_map[idx] = Some(copy_stream(&mut octx, &stream)?);
        }
    }
    for (idx, stream) in ictx_source.streams().enumerate() {
        if stream.parameters().medium() == ffmpeg_next::media::Type::Audio {
            audio_stream_map[idx] = Some(copy_stream(&mut octx, &stream)?);
        }
    }

    octx.write_header()?;

    copy_packets(&mut ictx_video, &video_stream_map, &mut octx)?;
    copy_packets(&mut ictx_source, &audio_stream_map, &mut octx)?;

    octx.write_trailer()?;
    Ok(MuxOutcome::Muxed)
}

/// Adds an output stream with the same codec parameters as `stream`.
fn copy_stream(
    octx: &mut ffmpeg_next::format::context::Output,
    stream: &ffmpeg_next::format::stream::Stream,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut ost = octx.add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?;
    ost.set_parameters(stream.parameters());
    // Let the output container pick its own tag
    unsafe {
        (*ost.parameters().as_mut_ptr()).codec_tag = 0;
    }
    Ok(ost.index())
}

fn copy_packets(
    ictx: &mut ffmpeg_next::format::context::Input,
    stream_map: &[Option<usize>],
    octx: &mut ffmpeg_next::format::context::Output,
) -> Result<(), Box<dyn std::error::Error>> {
    let in_time_bases: Vec<_> = ictx.streams().map(|s| s.time_base()).collect();
    let out_time_bases: Vec<_> = octx.streams().map(|s| s.time_base()).collect();

    for (stream, mut packet) in ictx.packets() {
        let ist_idx = stream.index();
        let Some(ost_idx) = stream_map.get(ist_idx).copied().flatten() else {
            continue;
        };
        packet.rescale_ts(in_time_bases[ist_idx], out_time_bases[ost_idx]);
        packet.set_position(-1);
        packet.set_stream(ost_idx);
        packet.write_interleaved(octx)?;
    }
    Ok(())
}
