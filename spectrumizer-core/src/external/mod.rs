// ============================================================================
// spectrumizer-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg, ffprobe and the frame converter
//
// This module encapsulates everything that leaves the process: the command
// runner seam, the ffmpeg/ffprobe argument templates, and the preflight checks
// that make sure the tools exist before any stage runs.
//
// KEY COMPONENTS:
// - CommandRunner trait and the SystemRunner implementation
// - ffmpeg/ffprobe argument builders
// - Dependency checking (PATH lookup through `which`)
// - ScriptedRunner for tests and library consumers

use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::{CoreError, CoreResult};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Process invocation and the runner trait
pub mod command;

/// ffmpeg/ffprobe argument templates
pub mod ffmpeg;

/// Scripted runner used by tests
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use command::{CommandOutput, CommandRunner, Invocation, OutputMode, SystemRunner};
pub use ffmpeg::EncodeParams;

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Resolves an external program through `PATH` (or as a direct path).
pub fn check_dependency(cmd_name: &str) -> CoreResult<PathBuf> {
    match which::which(cmd_name) {
        Ok(path) => {
            log::debug!("Found dependency {} at {}", cmd_name, path.display());
            Ok(path)
        }
        Err(e) => {
            log::warn!("Dependency '{cmd_name}' not found: {e}");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
    }
}

/// One line of the preflight report.
#[derive(Debug)]
pub struct DependencyStatus {
    pub name: String,
    pub result: CoreResult<PathBuf>,
}

/// Checks every external requirement of a run without stopping at the first
/// problem.
pub fn dependency_report(config: &PipelineConfig) -> Vec<DependencyStatus> {
    vec![
        DependencyStatus {
            name: "input".to_string(),
            result: require_file(&config.input, CoreError::InputNotFound(config.input.clone())),
        },
        DependencyStatus {
            name: "converter".to_string(),
            result: require_file(
                &config.converter,
                CoreError::DependencyNotFound(config.converter.display().to_string()),
            ),
        },
        DependencyStatus {
            name: "ffmpeg".to_string(),
            result: check_dependency(&config.ffmpeg),
        },
        DependencyStatus {
            name: "ffprobe".to_string(),
            result: check_dependency(&config.ffprobe),
        },
    ]
}

/// Fails with the first missing requirement: the input file, the converter,
/// ffmpeg or ffprobe.
pub fn preflight(config: &PipelineConfig) -> CoreResult<()> {
    for status in dependency_report(config) {
        status.result?;
    }
    Ok(())
}

fn require_file(path: &Path, missing: CoreError) -> CoreResult<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(missing)
    }
}
