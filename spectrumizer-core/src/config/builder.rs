// ============================================================================
// spectrumizer-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for PipelineConfig
//
// Fluent construction of PipelineConfig for library consumers and tests.
// Starts from PipelineConfig::default() and validates on build().

use std::path::PathBuf;

use super::{EncoderKind, PipelineConfig};
use crate::error::CoreResult;

/// Builder for creating [`PipelineConfig`] instances.
///
/// # Examples
///
/// ```rust
/// use spectrumizer_core::config::PipelineConfigBuilder;
///
/// let config = PipelineConfigBuilder::new()
///     .input("clip.mp4")
///     .framerate(12.5)
///     .cleanup(false)
///     .save_scr(true)
///     .build()
///     .unwrap();
/// assert!(config.writes_scr());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Creates a builder seeded with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.config.input = input.into();
        self
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.config.output = Some(output.into());
        self
    }

    pub fn temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = temp_dir.into();
        self
    }

    pub fn converter(mut self, converter: impl Into<PathBuf>) -> Self {
        self.config.converter = converter.into();
        self
    }

    pub fn converter_settings(mut self, settings: impl Into<PathBuf>) -> Self {
        self.config.converter_settings = settings.into();
        self
    }

    pub fn ffmpeg(mut self, ffmpeg: &str) -> Self {
        self.config.ffmpeg = ffmpeg.to_string();
        self
    }

    pub fn ffprobe(mut self, ffprobe: &str) -> Self {
        self.config.ffprobe = ffprobe.to_string();
        self
    }

    pub fn framerate(mut self, fps: f64) -> Self {
        self.config.framerate = fps;
        self
    }

    pub fn scale_factor(mut self, scale: u32) -> Self {
        self.config.scale_factor = scale;
        self
    }

    /// Sets the letterboxed frame size produced by the resize stage.
    pub fn resize(mut self, width: u32, height: u32) -> Self {
        self.config.resize_width = width;
        self.config.resize_height = height;
        self
    }

    pub fn encoder(mut self, encoder: EncoderKind) -> Self {
        self.config.encoder = encoder;
        self
    }

    pub fn audio_bitrate(mut self, bitrate: &str) -> Self {
        self.config.audio_bitrate = bitrate.to_string();
        self
    }

    /// Sets the concurrency limit. Zero selects the number of logical CPUs.
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.config.concurrency = limit;
        self
    }

    pub fn pause_before_convert(mut self, pause: bool) -> Self {
        self.config.pause_before_convert = pause;
        self
    }

    pub fn cleanup(mut self, cleanup: bool) -> Self {
        self.config.cleanup = cleanup;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    pub fn save_scr(mut self, save: bool) -> Self {
        self.config.save_scr = save;
        self
    }

    /// Validates and returns the configuration.
    ///
    /// Paths are left as given; call [`PipelineConfig::resolve_paths`] to
    /// make them absolute.
    pub fn build(self) -> CoreResult<PipelineConfig> {
        let mut config = self.config;
        config.validate()?;
        Ok(config)
    }
}
