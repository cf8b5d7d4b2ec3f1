//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Dependency and input checks without running the pipeline.
pub mod check;

/// Module containing the implementation of the `convert` command.
/// This command runs the whole video-to-retro pipeline.
pub mod convert;
