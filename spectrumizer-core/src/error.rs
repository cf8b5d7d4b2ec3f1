// ============================================================================
// spectrumizer-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for spectrumizer-core
//
// This module defines the error type used throughout the pipeline. External
// process failures keep the full command line and the captured output so the
// operator can reproduce them by hand.
//
// KEY COMPONENTS:
// - CoreError: Enum of all error kinds the library can produce
// - CoreResult: Result alias used by every fallible function
// - Helper constructors for command-related errors

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Stages of the pipeline that can abort a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Prepare,
    ExtractAudio,
    Resize,
    ExtractFrames,
    OperatorPause,
    ConvertFrames,
    Encode,
    Cleanup,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Prepare => "working directory setup",
            PipelineStage::ExtractAudio => "audio extraction",
            PipelineStage::Resize => "video resize",
            PipelineStage::ExtractFrames => "frame extraction",
            PipelineStage::OperatorPause => "operator pause",
            PipelineStage::ConvertFrames => "frame conversion",
            PipelineStage::Encode => "final encode",
            PipelineStage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: no input file specified")]
    MissingInput,

    /// A setting has a value the pipeline cannot use. `key` is the config
    /// file key, which is also the name of the command-line flag.
    #[error("Invalid configuration: {message}")]
    InvalidSetting { key: &'static str, message: String },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Required external tool '{0}' was not found")]
    DependencyNotFound(String),

    #[error("Failed to start command '{command}': {source}")]
    CommandStart {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for command '{command}': {source}")]
    CommandWait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command '{command}' failed ({status}){}", format_output(.output))]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("No frames found to convert in {0}")]
    NoFramesFound(PathBuf),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

pub(crate) fn invalid_setting(key: &'static str, message: impl Into<String>) -> CoreError {
    CoreError::InvalidSetting {
        key,
        message: message.into(),
    }
}

impl CoreError {
    /// Wraps an error with the pipeline stage it aborted.
    pub fn in_stage(self, stage: PipelineStage) -> Self {
        CoreError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the captured process output if this is (or wraps) a command failure.
    pub fn command_output(&self) -> Option<&str> {
        match self {
            CoreError::CommandFailed { output, .. } => Some(output.as_str()),
            CoreError::Stage { source, .. } => source.command_output(),
            _ => None,
        }
    }
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}")
    }
}

/// Renders a program and its arguments as a single shell-like line.
pub fn format_command_line<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut line = String::from(program);
    for arg in args {
        let arg = arg.as_ref();
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

pub fn command_start_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandStart {
        command: command.into(),
        source,
    }
}

pub fn command_wait_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandWait {
        command: command.into(),
        source,
    }
}

pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    output: impl Into<String>,
) -> CoreError {
    let status = match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    };
    CoreError::CommandFailed {
        command: command.into(),
        status,
        output: output.into(),
    }
}
