//! ffmpeg / ffprobe argument templates for each pipeline stage.
//!
//! These builders only assemble [`Invocation`]s; running them is the job of
//! the stage functions in `processing`. The templates are fixed so that a
//! failed command line from the logs can be rerun by hand unchanged.

use std::path::{Path, PathBuf};

use super::command::Invocation;
use crate::config::EncoderKind;

/// Sample format of the intermediate audio track.
const AUDIO_CODEC: &str = "pcm_s16le";
const AUDIO_SAMPLE_RATE: &str = "44100";
const AUDIO_CHANNELS: &str = "2";

/// Quality used by all three video profiles.
const VIDEO_QUALITY: &str = "17";

/// Parameters for the final encode.
#[derive(Debug, Clone)]
pub struct EncodeParams {
    /// printf-style pattern of the converted frames
    pub frames_pattern: String,
    /// Intermediate audio track, when the source had one
    pub audio: Option<PathBuf>,
    pub output: PathBuf,
    pub framerate: f64,
    pub scale_factor: u32,
    pub audio_bitrate: String,
    pub encoder: EncoderKind,
}

/// Joins `dir` and an image2 pattern, always with forward slashes.
///
/// ffmpeg's image2 muxer/demuxer wants `/` even on Windows.
#[must_use]
pub fn image_sequence_pattern(dir: &Path, pattern: &str) -> String {
    dir.join(pattern).to_string_lossy().replace('\\', "/")
}

/// Stream listing used to detect an audio track.
pub fn probe_streams(ffprobe: &str, input: &Path) -> Invocation {
    Invocation::new(ffprobe)
        .arg("-i")
        .arg(input)
        .args(["-show_entries", "stream=codec_type", "-of", "csv=p=0"])
        .args(["-loglevel", "error"])
}

/// Decodes the audio track to 16-bit stereo PCM at 44.1 kHz.
pub fn extract_audio(ffmpeg: &str, input: &Path, output: &Path) -> Invocation {
    Invocation::new(ffmpeg)
        .args(["-loglevel", "error"])
        .arg("-i")
        .arg(input)
        .arg("-vn")
        .args(["-acodec", AUDIO_CODEC])
        .args(["-ar", AUDIO_SAMPLE_RATE])
        .args(["-ac", AUDIO_CHANNELS])
        .arg("-y")
        .arg(output)
}

/// Filter that scales into `width`x`height` keeping aspect ratio and pads
/// the remainder with black.
#[must_use]
pub fn letterbox_filter(width: u32, height: u32) -> String {
    format!(
        "scale=w={width}:h={height}:force_original_aspect_ratio=decrease, \
         pad={width}:{height}:({width}-iw)/2:({height}-ih)/2:color=black"
    )
}

pub fn resize(ffmpeg: &str, input: &Path, output: &Path, width: u32, height: u32) -> Invocation {
    Invocation::new(ffmpeg)
        .args(["-loglevel", "error"])
        .arg("-i")
        .arg(input)
        .arg("-vf")
        .arg(letterbox_filter(width, height))
        .args(["-c:a", "copy"])
        .arg("-y")
        .arg(output)
}

/// Samples `input` at `framerate` into `frames_pattern`.
pub fn extract_frames(ffmpeg: &str, input: &Path, frames_pattern: &str, framerate: f64) -> Invocation {
    Invocation::new(ffmpeg)
        .args(["-loglevel", "error"])
        .arg("-i")
        .arg(input)
        .arg("-vf")
        .arg(format!("fps={framerate}"))
        .arg("-y")
        .arg(frames_pattern)
}

/// Reassembles the converted frames, upscales them with nearest-neighbour
/// sampling and muxes the audio track if there is one.
pub fn encode(ffmpeg: &str, params: &EncodeParams) -> Invocation {
    let mut inv = Invocation::new(ffmpeg);

    // Audio goes first so it is input 0.
    if let Some(audio) = &params.audio {
        inv = inv.arg("-i").arg(audio);
    }

    let scale = params.scale_factor;
    inv = inv
        .args(["-loglevel", "panic", "-y"])
        .arg("-framerate")
        .arg(format!("{:.2}", params.framerate))
        .arg("-i")
        .arg(&params.frames_pattern)
        .arg("-vf")
        .arg(format!("scale=iw*{scale}:ih*{scale}"))
        .args(["-sws_flags", "neighbor", "-sws_dither", "none"]);

    inv = if params.audio.is_some() {
        inv.args(["-c:a", "aac"])
            .arg("-b:a")
            .arg(&params.audio_bitrate)
            .args(["-profile:a", "aac_low"])
    } else {
        inv.arg("-an")
    };

    inv.args(["-movflags", "+faststart", "-flags", "+cgop"])
        .args(video_profile(params.encoder))
        .arg(&params.output)
}

/// Codec arguments for each encoder profile.
#[must_use]
pub fn video_profile(encoder: EncoderKind) -> &'static [&'static str] {
    match encoder {
        EncoderKind::Nvidia => &[
            "-c:v", "hevc_nvenc",
            "-profile:v", "main10",
            "-pix_fmt", "yuv420p",
            "-preset", "fast",
            "-rc", "constqp",
            "-qp", VIDEO_QUALITY,
            "-init_qpB", "2",
        ],
        EncoderKind::Amd => &[
            "-c:v", "hevc_amf",
            "-rc", "cqp",
            "-qp_p", VIDEO_QUALITY,
            "-qp_i", VIDEO_QUALITY,
            "-pix_fmt", "yuv420p",
        ],
        EncoderKind::Cpu => &[
            "-c:v", "libx264",
            "-crf", VIDEO_QUALITY,
            "-pix_fmt", "yuv420p",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(audio: Option<&str>, encoder: EncoderKind) -> EncodeParams {
        EncodeParams {
            frames_pattern: "/tmp/work/processed/s%06d.png".to_string(),
            audio: audio.map(PathBuf::from),
            output: PathBuf::from("/tmp/out.mp4"),
            framerate: 25.0,
            scale_factor: 8,
            audio_bitrate: "384k".to_string(),
            encoder,
        }
    }

    #[test]
    fn test_image_sequence_pattern_uses_forward_slashes() {
        let pattern = image_sequence_pattern(Path::new("work/frames"), "%06d.png");
        assert_eq!(pattern, "work/frames/%06d.png");
        assert!(!pattern.contains('\\'));
    }

    #[test]
    fn test_probe_template() {
        let inv = probe_streams("ffprobe", Path::new("in.mp4"));
        assert_eq!(
            inv.args,
            vec!["-i", "in.mp4", "-show_entries", "stream=codec_type", "-of", "csv=p=0", "-loglevel", "error"]
        );
    }

    #[test]
    fn test_extract_audio_template() {
        let inv = extract_audio("ffmpeg", Path::new("in.mp4"), Path::new("t/sound.wav"));
        assert_eq!(
            inv.command_line(),
            "ffmpeg -loglevel error -i in.mp4 -vn -acodec pcm_s16le -ar 44100 -ac 2 -y t/sound.wav"
        );
    }

    #[test]
    fn test_letterbox_filter() {
        assert_eq!(
            letterbox_filter(256, 192),
            "scale=w=256:h=192:force_original_aspect_ratio=decrease, pad=256:192:(256-iw)/2:(192-ih)/2:color=black"
        );
    }

    #[test]
    fn test_extract_frames_formats_fps() {
        let inv = extract_frames("ffmpeg", Path::new("r.mp4"), "f/%06d.png", 25.0);
        assert!(inv.has_arg("fps=25"));
        let inv = extract_frames("ffmpeg", Path::new("r.mp4"), "f/%06d.png", 12.5);
        assert!(inv.has_arg("fps=12.5"));
    }

    #[test]
    fn test_encode_with_audio_puts_audio_first() {
        let inv = encode("ffmpeg", &params(Some("/tmp/work/sound.wav"), EncoderKind::Cpu));
        assert_eq!(&inv.args[..2], &["-i", "/tmp/work/sound.wav"]);
        assert!(inv.has_arg("aac"));
        assert!(inv.has_arg("384k"));
        assert!(!inv.has_arg("-an"));
        assert!(inv.has_arg("25.00"));
        assert!(inv.has_arg("scale=iw*8:ih*8"));
        assert_eq!(inv.args.last().map(String::as_str), Some("/tmp/out.mp4"));
    }

    #[test]
    fn test_encode_without_audio_adds_no_audio_flag() {
        let inv = encode("ffmpeg", &params(None, EncoderKind::Cpu));
        assert_eq!(inv.args[0], "-loglevel");
        assert!(inv.has_arg("-an"));
        assert!(!inv.has_arg("aac"));
        assert!(!inv.args.iter().any(|a| a.ends_with("sound.wav")));
    }

    #[test]
    fn test_encoder_profiles() {
        let nvidia = encode("ffmpeg", &params(None, EncoderKind::Nvidia));
        assert!(nvidia.has_arg("hevc_nvenc"));
        assert!(nvidia.has_arg("constqp"));

        let amd = encode("ffmpeg", &params(None, EncoderKind::Amd));
        assert!(amd.has_arg("hevc_amf"));
        assert!(amd.has_arg("-qp_i"));

        let cpu = encode("ffmpeg", &params(None, EncoderKind::Cpu));
        assert!(cpu.has_arg("libx264"));
        assert!(cpu.has_arg("-crf"));
    }
}
