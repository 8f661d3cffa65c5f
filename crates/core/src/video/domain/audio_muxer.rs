use std::path::Path;

/// What a mux attempt produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MuxOutcome {
    /// `destination` holds the video with the source's audio.
    Muxed,
    /// The source has no audio track; nothing was written.
    NoAudio,
}

/// Combines a silent video with the audio track of another file.
pub trait AudioMuxer {
    fn mux(
        &self,
        video_only: &Path,
        audio_source: &Path,
        destination: &Path,
    ) -> Result<MuxOutcome, Box<dyn std::error::Error>>;
}
