//! Sequential video stages: letterbox resize, frame extraction and the
//! final re-encode of the converted frames.

use std::path::Path;

use crate::error::CoreResult;
use crate::external::{CommandRunner, EncodeParams, OutputMode, ffmpeg};

/// Scales `input` into a `width`x`height` frame, padding with black bars.
/// The audio stream is copied unchanged.
pub fn resize_video(
    runner: &dyn CommandRunner,
    ffmpeg_path: &str,
    input: &Path,
    output: &Path,
    (width, height): (u32, u32),
    mode: OutputMode,
) -> CoreResult<()> {
    let invocation = ffmpeg::resize(ffmpeg_path, input, output, width, height);
    runner.run(&invocation, mode)?;
    log::debug!("Resized video written to {}", output.display());
    Ok(())
}

/// Samples `input` at `framerate` into numbered PNGs in `frames_dir`.
pub fn extract_frames(
    runner: &dyn CommandRunner,
    ffmpeg_path: &str,
    input: &Path,
    frames_dir: &Path,
    framerate: f64,
    mode: OutputMode,
) -> CoreResult<()> {
    let pattern = ffmpeg::image_sequence_pattern(frames_dir, "%06d.png");
    let invocation = ffmpeg::extract_frames(ffmpeg_path, input, &pattern, framerate);
    runner.run(&invocation, mode)?;
    Ok(())
}

/// Reassembles the converted frames into the output video.
pub fn encode_video(
    runner: &dyn CommandRunner,
    ffmpeg_path: &str,
    params: &EncodeParams,
    mode: OutputMode,
) -> CoreResult<()> {
    log::debug!(
        "Encoding {} with {} encoder ({})",
        params.output.display(),
        params.encoder,
        if params.audio.is_some() { "with audio" } else { "silent" }
    );
    let invocation = ffmpeg::encode(ffmpeg_path, params);
    runner.run(&invocation, mode)?;
    Ok(())
}
