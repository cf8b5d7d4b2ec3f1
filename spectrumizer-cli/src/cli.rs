// spectrumizer-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use spectrumizer_core::config::{ConfigOverrides, DEFAULT_CONFIG_FILE, EncoderKind};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Spectrumizer: turn videos into retro computer footage",
    long_about = "Splits a video into frames, runs every frame through an external \
                  image converter in parallel and reassembles the result with ffmpeg."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging and mirrored ffmpeg output
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts a video through the frame converter
    Convert(ConvertArgs),
    /// Checks that the input, the converter, ffmpeg and ffprobe can be found
    Check(CheckArgs),
}

/// Options shared by every subcommand that needs a configuration.
#[derive(Parser, Debug, Clone)]
pub struct ToolArgs {
    /// TOML config file; a missing file is not an error
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Frame converter executable
    #[arg(long, value_name = "PATH", env = "SPECTRUMIZER_CONVERTER")]
    pub converter: Option<PathBuf>,

    /// ffmpeg executable
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<String>,

    /// ffprobe executable
    #[arg(long, value_name = "PATH")]
    pub ffprobe: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ConvertArgs {
    /// Source video
    #[arg(short = 'i', long = "input", value_name = "VIDEO")]
    pub input: Option<PathBuf>,

    /// Output video (default: <input>_smzd.<ext> next to the input)
    #[arg(short = 'o', long = "output", value_name = "VIDEO")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub tools: ToolArgs,

    /// Working directory for intermediate files
    #[arg(long, value_name = "DIR")]
    pub temp: Option<PathBuf>,

    /// Frames per second, for extraction and the final encode
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f64>,

    /// Nearest-neighbour upscale factor of the final video
    #[arg(long, value_name = "FACTOR", value_parser = clap::value_parser!(u32).range(1..))]
    pub scale: Option<u32>,

    /// Audio bitrate of the final video (e.g. 384k)
    #[arg(long, value_name = "RATE")]
    pub audio_bitrate: Option<String>,

    /// Video encoder: cpu, nvidia or amd
    #[arg(long, value_name = "ENCODER", value_parser = parse_encoder)]
    pub encoder: Option<EncoderKind>,

    /// Converter settings file
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Remove the working directory when done
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub cleanup: Option<bool>,

    /// Wait for Enter before converting frames
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub pause: Option<bool>,

    /// Parallel frame conversions (0 = number of CPUs)
    #[arg(long, value_name = "N", env = "SPECTRUMIZER_THREADS")]
    pub threads: Option<usize>,

    /// Width of the letterboxed intermediate video
    #[arg(long, value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Height of the letterboxed intermediate video
    #[arg(long, value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Show conversion progress
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub progress: Option<bool>,

    /// Also keep .scr screens (requires --cleanup false)
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub scr: Option<bool>,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Source video to check as well
    #[arg(short = 'i', long = "input", value_name = "VIDEO")]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub tools: ToolArgs,
}

fn parse_encoder(value: &str) -> Result<EncoderKind, String> {
    value.parse::<EncoderKind>().map_err(|e| e.to_string())
}

impl ToolArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            converter: self.converter.clone(),
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
            ..Default::default()
        }
    }
}

impl ConvertArgs {
    /// The flags that were given, as a config layer.
    pub fn overrides(&self, verbose: bool) -> ConfigOverrides {
        ConfigOverrides {
            input: self.input.clone(),
            output: self.output.clone(),
            temp: self.temp.clone(),
            fps: self.fps,
            scale: self.scale,
            audio_bitrate: self.audio_bitrate.clone(),
            encoder: self.encoder,
            settings: self.settings.clone(),
            cleanup: self.cleanup,
            pause: self.pause,
            threads: self.threads,
            width: self.width,
            height: self.height,
            verbose: verbose.then_some(true),
            progress: self.progress,
            scr: self.scr,
            ..self.tools.overrides()
        }
    }
}

impl CheckArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input: self.input.clone(),
            ..self.tools.overrides()
        }
    }
}
