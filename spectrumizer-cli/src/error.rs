// ============================================================================
// spectrumizer-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses CoreError. This module adds the short hints printed under a
// fatal error.

use spectrumizer_core::{CoreError, CoreResult, PipelineStage};

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// A one-line hint for the operator, where there is an obvious fix.
pub fn suggestion_for(error: &CoreError) -> Option<String> {
    let hint = match error {
        CoreError::MissingInput => "Pass --input or set `input` in the config file".to_string(),
        CoreError::InvalidSetting { key, .. } => {
            format!("Fix `{key}` in the config file or pass --{key} with a valid value")
        }
        CoreError::ConfigParse { .. } => {
            "Fix the config file or point --config elsewhere".to_string()
        }
        CoreError::InputNotFound(_) => "Check the --input path".to_string(),
        CoreError::DependencyNotFound(_) => {
            "Install the tool or pass its location with --converter, --ffmpeg or --ffprobe"
                .to_string()
        }
        CoreError::Stage {
            stage: PipelineStage::Prepare,
            ..
        } => "Check that the --temp directory is writable".to_string(),
        CoreError::Stage {
            stage: PipelineStage::ExtractFrames | PipelineStage::ConvertFrames,
            source,
        } if matches!(**source, CoreError::NoFramesFound(_)) => {
            "Check that the input decodes with ffmpeg and --fps is sensible".to_string()
        }
        CoreError::Stage {
            stage: PipelineStage::Encode,
            ..
        } => "Try another --encoder; nvidia and amd need hardware support".to_string(),
        _ => return None,
    };
    Some(hint)
}
