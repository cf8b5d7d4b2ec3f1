//! Configuration structures and constants for the spectrumizer pipeline.
//!
//! A [`PipelineConfig`] is assembled once at startup (defaults, then the
//! optional TOML config file, then command-line overrides), validated, and
//! passed read-only to every stage.

mod builder;
mod file;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::{CoreError, CoreResult, invalid_setting};

pub use builder::PipelineConfigBuilder;
pub use file::{ConfigOverrides, load_config_file};

// Default constants

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "spectrumizer.toml";

/// Frame rate used both for frame extraction and the final encode.
pub const DEFAULT_FRAMERATE: f64 = 25.0;

/// Nearest-neighbour upscale factor applied by the final encode.
pub const DEFAULT_SCALE_FACTOR: u32 = 8;

/// Size of the letterboxed intermediate video (ZX Spectrum screen).
pub const DEFAULT_RESIZE_WIDTH: u32 = 256;
pub const DEFAULT_RESIZE_HEIGHT: u32 = 192;

pub const DEFAULT_AUDIO_BITRATE: &str = "384k";
pub const DEFAULT_TEMP_DIR: &str = "temp";
pub const DEFAULT_CONVERTER: &str = "img2spectrum.exe";
pub const DEFAULT_CONVERTER_SETTINGS: &str = "conv.isw";
pub const DEFAULT_FFMPEG: &str = "ffmpeg";
pub const DEFAULT_FFPROBE: &str = "ffprobe";

/// Suffix appended to the input file stem when no output path is given.
pub const OUTPUT_SUFFIX: &str = "_smzd";

/// Video encoder profile used by the final encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncoderKind {
    /// Software libx264, constant quality
    Cpu,
    /// NVENC HEVC, constant QP
    #[default]
    Nvidia,
    /// AMF HEVC, constant QP
    Amd,
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderKind::Cpu => write!(f, "cpu"),
            EncoderKind::Nvidia => write!(f, "nvidia"),
            EncoderKind::Amd => write!(f, "amd"),
        }
    }
}

impl FromStr for EncoderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(EncoderKind::Cpu),
            "nvidia" => Ok(EncoderKind::Nvidia),
            "amd" => Ok(EncoderKind::Amd),
            other => Err(invalid_setting(
                "encoder",
                format!("unknown encoder '{other}' (expected cpu, nvidia or amd)"),
            )),
        }
    }
}

// Config files accept the same spellings as `--encoder`.
impl<'de> Deserialize<'de> for EncoderKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Main configuration structure for a pipeline run.
///
/// All fields have defaults matching the classic `img2spectrum` workflow, so
/// only `input` has to be provided.
///
/// # Examples
///
/// ```rust,no_run
/// use spectrumizer_core::config::{EncoderKind, PipelineConfigBuilder};
///
/// let config = PipelineConfigBuilder::new()
///     .input("clip.mp4")
///     .encoder(EncoderKind::Cpu)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    // ---- Paths ----
    /// Source video
    pub input: PathBuf,

    /// Destination video; derived from `input` when `None`
    pub output: Option<PathBuf>,

    /// Root of the working directory tree
    pub temp_dir: PathBuf,

    /// External frame converter executable
    pub converter: PathBuf,

    /// Settings file handed to the converter on every primary conversion
    pub converter_settings: PathBuf,

    /// ffmpeg executable name or path
    pub ffmpeg: String,

    /// ffprobe executable name or path
    pub ffprobe: String,

    // ---- Video parameters ----
    pub framerate: f64,
    pub scale_factor: u32,
    pub resize_width: u32,
    pub resize_height: u32,
    pub encoder: EncoderKind,
    pub audio_bitrate: String,

    /// Maximum number of frame conversions in flight (0 = logical CPUs)
    pub concurrency: usize,

    // ---- Behaviour flags ----
    /// Wait for the operator before bulk conversion
    pub pause_before_convert: bool,

    /// Remove the working directory tree when the run completes
    pub cleanup: bool,

    /// Mirror ffmpeg output to the console
    pub verbose: bool,

    pub show_progress: bool,

    /// Also write `.scr` screens (only honoured when `cleanup` is off)
    pub save_scr: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            converter: PathBuf::from(DEFAULT_CONVERTER),
            converter_settings: PathBuf::from(DEFAULT_CONVERTER_SETTINGS),
            ffmpeg: DEFAULT_FFMPEG.to_string(),
            ffprobe: DEFAULT_FFPROBE.to_string(),
            framerate: DEFAULT_FRAMERATE,
            scale_factor: DEFAULT_SCALE_FACTOR,
            resize_width: DEFAULT_RESIZE_WIDTH,
            resize_height: DEFAULT_RESIZE_HEIGHT,
            encoder: EncoderKind::default(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            concurrency: num_cpus::get(),
            pause_before_convert: true,
            cleanup: true,
            verbose: false,
            show_progress: true,
            save_scr: false,
        }
    }
}

impl PipelineConfig {
    /// Whether the secondary `.scr` conversion runs for each frame.
    ///
    /// Screens are skipped when cleanup is on because they would be deleted
    /// together with the working directory.
    #[must_use]
    pub fn writes_scr(&self) -> bool {
        self.save_scr && !self.cleanup
    }

    /// Output path, falling back to `<input-stem>_smzd.<ext>` next to the input.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => default_output_path(&self.input),
        }
    }

    /// Fills in the derived output path and makes all paths absolute.
    pub fn resolve_paths(&mut self) -> CoreResult<()> {
        if self.output.is_none() && !self.input.as_os_str().is_empty() {
            self.output = Some(default_output_path(&self.input));
        }

        self.input = absolutize(&self.input)?;
        if let Some(output) = &self.output {
            self.output = Some(absolutize(output)?);
        }
        self.temp_dir = absolutize(&self.temp_dir)?;
        self.converter = absolutize(&self.converter)?;
        self.converter_settings = absolutize(&self.converter_settings)?;
        Ok(())
    }

    /// Checks value ranges and corrects a zero concurrency limit.
    pub fn validate(&mut self) -> CoreResult<()> {
        if self.input.as_os_str().is_empty() {
            return Err(CoreError::MissingInput);
        }
        if !(self.framerate.is_finite() && self.framerate > 0.0) {
            return Err(invalid_setting(
                "fps",
                format!("framerate must be positive, got {}", self.framerate),
            ));
        }
        if self.scale_factor == 0 {
            return Err(invalid_setting("scale", "scale factor must be at least 1"));
        }
        if self.resize_width == 0 || self.resize_height == 0 {
            return Err(invalid_setting(
                if self.resize_width == 0 { "width" } else { "height" },
                format!(
                    "resize dimensions must be non-zero, got {}x{}",
                    self.resize_width, self.resize_height
                ),
            ));
        }
        if self.audio_bitrate.trim().is_empty() {
            return Err(invalid_setting("audio-bitrate", "audio bitrate must not be empty"));
        }
        if self.concurrency == 0 {
            self.concurrency = num_cpus::get().max(1);
            log::debug!("Concurrency limit defaulted to {}", self.concurrency);
        }
        Ok(())
    }

    /// Applies every field present in `overrides`.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = &overrides.input {
            self.input = v.clone();
        }
        if let Some(v) = &overrides.output {
            self.output = Some(v.clone());
        }
        if let Some(v) = &overrides.temp {
            self.temp_dir = v.clone();
        }
        if let Some(v) = &overrides.converter {
            self.converter = v.clone();
        }
        if let Some(v) = &overrides.settings {
            self.converter_settings = v.clone();
        }
        if let Some(v) = &overrides.ffmpeg {
            self.ffmpeg = v.clone();
        }
        if let Some(v) = &overrides.ffprobe {
            self.ffprobe = v.clone();
        }
        if let Some(v) = overrides.fps {
            self.framerate = v;
        }
        if let Some(v) = overrides.scale {
            self.scale_factor = v;
        }
        if let Some(v) = overrides.width {
            self.resize_width = v;
        }
        if let Some(v) = overrides.height {
            self.resize_height = v;
        }
        if let Some(v) = overrides.encoder {
            self.encoder = v;
        }
        if let Some(v) = &overrides.audio_bitrate {
            self.audio_bitrate = v.clone();
        }
        if let Some(v) = overrides.threads {
            self.concurrency = v;
        }
        if let Some(v) = overrides.pause {
            self.pause_before_convert = v;
        }
        if let Some(v) = overrides.cleanup {
            self.cleanup = v;
        }
        if let Some(v) = overrides.verbose {
            self.verbose = v;
        }
        if let Some(v) = overrides.progress {
            self.show_progress = v;
        }
        if let Some(v) = overrides.scr {
            self.save_scr = v;
        }
    }
}

/// Builds `<dir>/<stem>_smzd.<ext>` for an input path.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}{OUTPUT_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{OUTPUT_SUFFIX}"),
    };
    input.with_file_name(file_name)
}

fn absolutize(path: &Path) -> CoreResult<PathBuf> {
    if path.as_os_str().is_empty() {
        return Ok(PathBuf::new());
    }
    std::path::absolute(path).map_err(|e| {
        CoreError::PathError(format!("Failed to resolve path '{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_workflow() {
        let config = PipelineConfig::default();
        assert_eq!(config.framerate, 25.0);
        assert_eq!(config.scale_factor, 8);
        assert_eq!((config.resize_width, config.resize_height), (256, 192));
        assert_eq!(config.audio_bitrate, "384k");
        assert_eq!(config.encoder, EncoderKind::Nvidia);
        assert!(config.cleanup);
        assert!(config.pause_before_convert);
        assert!(config.show_progress);
        assert!(!config.save_scr);
        assert!(config.concurrency >= 1);
    }

    #[test]
    fn test_writes_scr_requires_cleanup_disabled() {
        let mut config = PipelineConfig {
            save_scr: true,
            cleanup: true,
            ..Default::default()
        };
        assert!(!config.writes_scr());

        config.cleanup = false;
        assert!(config.writes_scr());

        config.save_scr = false;
        assert!(!config.writes_scr());
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/videos/intro.mp4")),
            PathBuf::from("/videos/intro_smzd.mp4")
        );
        assert_eq!(
            default_output_path(Path::new("clip")),
            PathBuf::from("clip_smzd")
        );
    }

    #[test]
    fn test_validate_corrects_zero_concurrency() {
        let mut config = PipelineConfig {
            input: PathBuf::from("in.mp4"),
            concurrency: 0,
            ..Default::default()
        };
        config.validate().unwrap();
        assert!(config.concurrency >= 1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        assert!(matches!(config.validate(), Err(CoreError::MissingInput)));

        let mut config = PipelineConfig {
            input: PathBuf::from("in.mp4"),
            framerate: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidSetting { key: "fps", .. })));

        let mut config = PipelineConfig {
            input: PathBuf::from("in.mp4"),
            scale_factor: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidSetting { key: "scale", .. })));

        let mut config = PipelineConfig {
            input: PathBuf::from("in.mp4"),
            resize_height: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidSetting { key: "height", .. })));
    }

    #[test]
    fn test_encoder_from_str() {
        assert_eq!("CPU".parse::<EncoderKind>().unwrap(), EncoderKind::Cpu);
        assert_eq!("amd".parse::<EncoderKind>().unwrap(), EncoderKind::Amd);
        assert!("quicksync".parse::<EncoderKind>().is_err());
    }

    #[test]
    fn test_resolve_paths_derives_output() {
        let mut config = PipelineConfig {
            input: PathBuf::from("movie.mkv"),
            ..Default::default()
        };
        config.resolve_paths().unwrap();
        assert!(config.input.is_absolute());
        let output = config.output.clone().unwrap();
        assert!(output.is_absolute());
        assert!(output.ends_with("movie_smzd.mkv"));
        assert!(config.temp_dir.is_absolute());
    }
}
