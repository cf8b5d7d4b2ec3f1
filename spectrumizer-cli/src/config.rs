// spectrumizer-cli/src/config.rs
//
// Assembles the run configuration: built-in defaults, then the config file,
// then the flags given on the command line.

use std::path::Path;

use log::{debug, warn};
use spectrumizer_core::PipelineConfig;
use spectrumizer_core::config::{ConfigOverrides, load_config_file};

use crate::error::CliResult;

/// Merges the three configuration layers without validating the result.
pub fn merge_config(config_file: &Path, cli: &ConfigOverrides) -> CliResult<PipelineConfig> {
    let mut config = PipelineConfig::default();

    match load_config_file(config_file)? {
        Some(file) => {
            debug!("Applying config file {}", config_file.display());
            config.apply(&file);
        }
        None => warn!(
            "Config file {} not found, using defaults",
            config_file.display()
        ),
    }

    config.apply(cli);
    Ok(config)
}

/// Merges, validates and resolves the configuration for a conversion run.
pub fn load_run_config(config_file: &Path, cli: &ConfigOverrides) -> CliResult<PipelineConfig> {
    let mut config = merge_config(config_file, cli)?;
    config.validate()?;
    config.resolve_paths()?;
    Ok(config)
}
