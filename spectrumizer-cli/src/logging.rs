// ============================================================================
// spectrumizer-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger initialization for the spectrumizer binary
//
// Everything the pipeline reports goes through the `log` macros. Info lines
// are printed bare because the terminal module already styles them; other
// levels get a level prefix.
//
// USAGE:
// - default: info
// - `--verbose`: debug
// - RUST_LOG overrides both, e.g. RUST_LOG=spectrumizer_core=trace

use std::io::Write;

use log::{Level, LevelFilter};

/// Log level for the given verbosity.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger. Safe to call more than once; later calls are
/// ignored.
pub fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| match record.level() {
            Level::Info => writeln!(buf, "{}", record.args()),
            level => {
                let style = buf.default_level_style(level);
                writeln!(buf, "{style}{level}{style:#} {}", record.args())
            }
        })
        .filter_level(level_for(verbose))
        .parse_default_env();

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
