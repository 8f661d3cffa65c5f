use std::path::{Path, PathBuf};

use crate::video::domain::audio_muxer::{AudioMuxer, MuxOutcome};

/// Owns the silent buffer video and deletes it when dropped, on every exit
/// path of the run that produced it.
pub struct BufferGuard {
    path: PathBuf,
}

impl BufferGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BufferGuard {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!("Could not remove buffer {}: {e}", self.path.display());
        }
    }
}

/// How the final output was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalOutput {
    WithAudio,
    VideoOnly,
}

/// Turns the buffer into the final output at `destination`.
///
/// With an `audio_source` the muxer is tried first. A mux failure is logged
/// and, like a source without audio, falls back to promoting the buffer
/// as-is. The buffer is removed in every case. Only a failure to promote
/// the buffer is returned as an error.
pub fn finalize_output(
    muxer: &dyn AudioMuxer,
    buffer: BufferGuard,
    audio_source: Option<&Path>,
    destination: &Path,
) -> Result<FinalOutput, Box<dyn std::error::Error>> {
    if let Some(source) = audio_source {
        match muxer.mux(buffer.path(), source, destination) {
            Ok(MuxOutcome::Muxed) => return Ok(FinalOutput::WithAudio),
            Ok(MuxOutcome::NoAudio) => {
                log::info!("{} has no audio track, keeping video only", source.display());
            }
            Err(e) => {
                log::warn!("Audio mux failed, keeping video only: {e}");
            }
        }
    }

    std::fs::copy(buffer.path(), destination).map_err(|e| {
        format!(
            "cannot move {} to {}: {e}",
            buffer.path().display(),
            destination.display()
        )
    })?;
    Ok(FinalOutput::VideoOnly)
}
