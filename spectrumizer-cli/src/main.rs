// spectrumizer-cli/src/main.rs
//
// Entry point for the spectrumizer binary.
//
// Responsibilities include:
// - Parsing command-line arguments.
// - Setting up logging.
// - Dispatching to the subcommand implementations.
// - Printing fatal errors and managing the process exit code.

use clap::Parser;
use spectrumizer_cli::error::suggestion_for;
use spectrumizer_cli::logging::init_logging;
use spectrumizer_cli::{Cli, Commands, run_check, run_convert};
use spectrumizer_core::terminal;

use log::{debug, info};
use std::process;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("Spectrumizer v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {cli:?}");

    let result = match cli.command {
        Commands::Convert(args) => run_convert(args, cli.verbose).map(|_| ()),
        Commands::Check(args) => run_check(args),
    };

    if let Err(e) = result {
        terminal::print_error("Error", &e.to_string(), suggestion_for(&e).as_deref());
        process::exit(1);
    }
}
