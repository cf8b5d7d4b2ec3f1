//! Implementation of the 'convert' subcommand.
//!
//! Builds the run configuration, checks the external tools, runs the
//! pipeline and prints the summary block.

use crate::cli::ConvertArgs;
use crate::config::load_run_config;
use crate::error::CliResult;

use spectrumizer_core::external::{SystemRunner, preflight};
use spectrumizer_core::terminal;
use spectrumizer_core::{Pipeline, PipelineConfig, PipelineSummary, format_duration, format_rate};

use log::{debug, info};

/// Runs the conversion described by `args` and the config file.
pub fn run_convert(args: ConvertArgs, verbose: bool) -> CliResult<PipelineSummary> {
    let config = load_run_config(&args.tools.config, &args.overrides(verbose))?;
    debug!("Effective configuration: {config:?}");

    print_configuration(&config);
    preflight(&config)?;

    let summary = Pipeline::new(&config, &SystemRunner).run()?;
    print_summary(&summary);
    Ok(summary)
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn print_configuration(config: &PipelineConfig) {
    terminal::print_section("Configuration");
    terminal::print_status("Input", &config.input.display().to_string(), false);
    terminal::print_status("Output", &config.output_path().display().to_string(), false);
    terminal::print_status("Converter", &config.converter.display().to_string(), false);
    terminal::print_status("Settings", &config.converter_settings.display().to_string(), false);
    terminal::print_status(
        "Frame size",
        &format!("{}x{}", config.resize_width, config.resize_height),
        false,
    );
    terminal::print_status("Frame rate", &format!("{} fps", config.framerate), false);
    terminal::print_status("Upscale", &format!("x{}", config.scale_factor), false);
    terminal::print_status("Encoder", &config.encoder.to_string(), false);
    terminal::print_status("Workers", &config.concurrency.to_string(), false);
    terminal::print_status("Cleanup", on_off(config.cleanup), false);
    if config.save_scr && !config.writes_scr() {
        terminal::print_warning("SCR output is ignored while cleanup is on");
    }
}

fn print_summary(summary: &PipelineSummary) {
    terminal::print_section("Summary");
    terminal::print_status("Audio", if summary.has_audio { "yes" } else { "none" }, false);
    terminal::print_status("Frames", &summary.frames.to_string(), false);
    terminal::print_status("Converted", &summary.completed.to_string(), false);
    terminal::print_status("Failed", &summary.failed.to_string(), false);
    terminal::print_status("Peak workers", &summary.peak_in_flight.to_string(), false);
    terminal::print_status("Conversion time", &format_duration(summary.conversion_time.as_secs_f64()), false);
    terminal::print_status("Throughput", &format_rate(summary.conversion_rate()), false);
    terminal::print_status("Total time", &format_duration(summary.total_time.as_secs_f64()), false);
    terminal::print_status("Output", &summary.output.display().to_string(), true);
    if let Some(scr_dir) = &summary.scr_dir {
        terminal::print_status("SCR files", &scr_dir.display().to_string(), false);
    }
    if let Some(work_dir) = &summary.work_dir {
        terminal::print_status("Working files", &work_dir.display().to_string(), false);
    }

    if summary.failures.is_empty() {
        terminal::print_success("Conversion complete");
    } else {
        terminal::print_warning(&format!(
            "{} conversion step(s) failed, see the warnings above",
            summary.failures.len()
        ));
        info!("The output was encoded from the frames that did convert");
    }
}
