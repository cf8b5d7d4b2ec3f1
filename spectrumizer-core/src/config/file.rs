//! Config file loading.
//!
//! The config file is TOML with kebab-case keys. Every key is optional; keys
//! that are present override the built-in defaults, and command-line flags
//! override the file in turn. The same [`ConfigOverrides`] type carries both
//! layers.
//!
//! ```toml
//! input = "intro.mp4"
//! fps = 12.5
//! encoder = "cpu"
//! threads = 6
//! cleanup = false
//! scr = true
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::EncoderKind;
use crate::error::{CoreError, CoreResult};

/// Partial configuration: `None` means "keep the value from the layer below".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub temp: Option<PathBuf>,
    pub fps: Option<f64>,
    pub scale: Option<u32>,
    pub audio_bitrate: Option<String>,
    pub encoder: Option<EncoderKind>,
    /// Converter settings file
    pub settings: Option<PathBuf>,
    pub converter: Option<PathBuf>,
    pub cleanup: Option<bool>,
    pub pause: Option<bool>,
    pub threads: Option<usize>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub verbose: Option<bool>,
    pub progress: Option<bool>,
    pub scr: Option<bool>,
    pub ffmpeg: Option<String>,
    pub ffprobe: Option<String>,
}

impl ConfigOverrides {
    /// Parses overrides from TOML text.
    pub fn from_toml_str(text: &str, origin: &Path) -> CoreResult<Self> {
        toml::from_str(text).map_err(|source| CoreError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }
}

/// Reads the config file at `path`.
///
/// A missing file is not an error: it yields `Ok(None)` so callers can warn
/// and continue with defaults. Unreadable or malformed files are errors.
pub fn load_config_file(path: &Path) -> CoreResult<Option<ConfigOverrides>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CoreError::Io(e)),
    };
    log::debug!("Loaded config file {}", path.display());
    ConfigOverrides::from_toml_str(&text, path).map(Some)
}
