// ============================================================================
// spectrumizer-core/src/external/command.rs
// ============================================================================
//
// PROCESS INVOKER: Running External Programs
//
// Every stage of the pipeline talks to the outside world through the
// CommandRunner trait defined here. The production implementation spawns the
// program, waits for it, and turns a spawn error or non-zero exit into a
// CoreError that carries the full command line and the captured output.
//
// KEY COMPONENTS:
// - Invocation: program + argument list
// - OutputMode: Quiet (capture only) or Verbose (log, mirror and capture)
// - CommandRunner: trait used by stages, mocked in tests
// - SystemRunner: std::process based implementation

use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, error, info};

use crate::error::{
    CoreResult, command_failed_error, command_start_error, command_wait_error,
    format_command_line,
};

/// How a child's output is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Output is captured for diagnostics but not shown.
    Quiet,
    /// The command line is logged first and output is mirrored to the console
    /// while still being captured.
    Verbose,
}

impl OutputMode {
    #[must_use]
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            OutputMode::Verbose
        } else {
            OutputMode::Quiet
        }
    }
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_string_lossy().into_owned(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string_lossy().into_owned()));
        self
    }

    /// The invocation rendered as one line, suitable for pasting into a shell.
    #[must_use]
    pub fn command_line(&self) -> String {
        format_command_line(&self.program, &self.args)
    }

    /// True when any argument equals `needle`.
    #[must_use]
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }
}

/// Output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// stdout followed by stderr
    pub combined: String,
}

/// Something that can run an [`Invocation`] to completion.
///
/// Implementations must be usable from many fan-out worker threads at once.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation, mode: OutputMode) -> CoreResult<CommandOutput>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, mode: OutputMode) -> CoreResult<CommandOutput> {
        let command_line = invocation.command_line();
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::null());

        match mode {
            OutputMode::Quiet => run_quiet(&mut cmd, &command_line),
            OutputMode::Verbose => {
                info!("Running: {command_line}");
                run_mirrored(&mut cmd, &command_line)
            }
        }
    }
}

fn run_quiet(cmd: &mut Command, command_line: &str) -> CoreResult<CommandOutput> {
    debug!("Running: {command_line}");
    let output = cmd
        .output()
        .map_err(|e| command_start_error(command_line, e))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        debug!("Command failed with {}: {}", output.status, command_line);
        return Err(command_failed_error(command_line, output.status, combined));
    }
    Ok(CommandOutput { combined })
}

fn run_mirrored(cmd: &mut Command, command_line: &str) -> CoreResult<CommandOutput> {
    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            error!("Failed to spawn command: {e}");
            command_start_error(command_line, e)
        })?;

    let stdout_handle = child
        .stdout
        .take()
        .map(|stdout| thread::spawn(move || mirror_lines(stdout, false)));
    let stderr_handle = child
        .stderr
        .take()
        .map(|stderr| thread::spawn(move || mirror_lines(stderr, true)));

    let status = child
        .wait()
        .map_err(|e| command_wait_error(command_line, e))?;

    let mut combined = String::new();
    for handle in [stdout_handle, stderr_handle].into_iter().flatten() {
        let lines = handle.join().unwrap_or_default();
        for line in lines {
            combined.push_str(&line);
            combined.push('\n');
        }
    }

    if !status.success() {
        return Err(command_failed_error(command_line, status, combined));
    }
    Ok(CommandOutput { combined })
}

/// Mirrors and collects every line until EOF. Bytes that are not UTF-8 are
/// replaced, never treated as the end of the stream.
fn mirror_lines<R: Read>(stream: R, to_stderr: bool) -> Vec<String> {
    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("Stopped reading child output: {e}");
                break;
            }
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        if to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
        lines.push(line);
    }
    lines
}
