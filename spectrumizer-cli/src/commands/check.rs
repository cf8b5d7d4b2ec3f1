//! Implementation of the 'check' subcommand.

use crate::cli::CheckArgs;
use crate::config::merge_config;
use crate::error::CliResult;

use spectrumizer_core::external::dependency_report;
use spectrumizer_core::terminal;

/// Reports every requirement of a run and fails if any of them is missing.
///
/// The input is only checked when one is configured.
pub fn run_check(args: CheckArgs) -> CliResult<()> {
    let config = merge_config(&args.tools.config, &args.overrides())?;
    let check_input = !config.input.as_os_str().is_empty();

    terminal::print_section("Dependencies");
    let mut first_missing = None;
    for status in dependency_report(&config) {
        if status.name == "input" && !check_input {
            continue;
        }
        match status.result {
            Ok(path) => terminal::print_status(&status.name, &path.display().to_string(), false),
            Err(e) => {
                terminal::print_status(&status.name, "missing", true);
                terminal::print_sub_item(&e.to_string());
                first_missing.get_or_insert(e);
            }
        }
    }

    match first_missing {
        Some(e) => Err(e),
        None => {
            terminal::print_success("Everything needed for a run was found");
            Ok(())
        }
    }
}

