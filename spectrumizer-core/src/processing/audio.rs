//! Audio track detection and extraction.
//!
//! Audio is optional: a source without an audio track (or one that ffprobe
//! cannot read) still produces a silent output video.

use std::path::Path;

use crate::error::CoreResult;
use crate::external::{CommandRunner, OutputMode, ffmpeg};

/// Returns true when ffprobe lists at least one audio stream in `input`.
///
/// The probe runs quietly. A failing probe is not fatal: it is logged as a
/// warning and the input is treated as silent.
pub fn probe_audio(runner: &dyn CommandRunner, ffprobe: &str, input: &Path) -> bool {
    let invocation = ffmpeg::probe_streams(ffprobe, input);
    match runner.run(&invocation, OutputMode::Quiet) {
        Ok(output) => output.combined.contains("audio"),
        Err(e) => {
            log::warn!("Audio probe failed, continuing without audio: {e}");
            false
        }
    }
}

/// Writes the audio track of `input` to `output` as 16-bit stereo PCM.
pub fn extract_audio(
    runner: &dyn CommandRunner,
    ffmpeg_path: &str,
    input: &Path,
    output: &Path,
    mode: OutputMode,
) -> CoreResult<()> {
    let invocation = ffmpeg::extract_audio(ffmpeg_path, input, output);
    runner.run(&invocation, mode)?;
    log::debug!("Audio track written to {}", output.display());
    Ok(())
}
