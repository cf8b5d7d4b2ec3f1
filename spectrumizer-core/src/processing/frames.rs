// ============================================================================
// spectrumizer-core/src/processing/frames.rs
// ============================================================================
//
// FRAME CONVERSION: Per-Frame Fan-Out Through the External Converter
//
// Every extracted frame is an independent task. The primary conversion turns
// `frames/<name>` into `processed/s<name>`; when screens are kept, a
// secondary conversion turns that primary output into `scr/<stem>.scr`.
// A failing frame never stops the others: its failure is recorded and the
// run continues.
//
// KEY COMPONENTS:
// - FrameTask: source frame and its output paths
// - FrameConverter: converter program + settings, builds both invocations
// - FrameFailure: which frame, which step, and the error with captured output
// - convert_frames: runs all tasks through the FanOutScheduler

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::external::{CommandRunner, Invocation, OutputMode};
use crate::progress::ProgressState;
use crate::temp_files::WorkDir;
use crate::util::{FanOutReport, FanOutScheduler, TaskOutcome};
use crate::utils::get_file_stem_safe;

/// Prefix the converter output carries in `processed/`.
pub const PROCESSED_PREFIX: &str = "s";

/// printf-style pattern matching the primary outputs, used by the encode.
pub const PROCESSED_PATTERN: &str = "s%06d.png";

/// One frame and where its converted versions go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTask {
    pub source: PathBuf,
    pub primary_output: PathBuf,
    /// Set only when `.scr` screens are written
    pub scr_output: Option<PathBuf>,
}

impl FrameTask {
    pub fn for_frame(source: &Path, processed_dir: &Path, scr_dir: Option<&Path>) -> CoreResult<Self> {
        let stem = get_file_stem_safe(source)?;
        let scr_output = scr_dir.map(|dir| dir.join(format!("{stem}.scr")));
        Ok(Self {
            source: source.to_path_buf(),
            // Always lowercase `.png` so the encode pattern finds it.
            primary_output: processed_dir.join(format!("{PROCESSED_PREFIX}{stem}.png")),
            scr_output,
        })
    }
}

/// Builds one task per frame in `frames`, in order.
pub fn build_frame_tasks(frames: &[PathBuf], work: &WorkDir, with_scr: bool) -> CoreResult<Vec<FrameTask>> {
    let processed_dir = work.processed_dir();
    let scr_dir = with_scr.then(|| work.scr_dir());
    frames
        .iter()
        .map(|frame| FrameTask::for_frame(frame, &processed_dir, scr_dir.as_deref()))
        .collect()
}

/// The conversion a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStep {
    Primary,
    Secondary,
}

impl fmt::Display for ConversionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStep::Primary => write!(f, "conversion"),
            ConversionStep::Secondary => write!(f, "scr conversion"),
        }
    }
}

/// A task-local failure.
#[derive(Debug)]
pub struct FrameFailure {
    /// Source frame of the task
    pub frame: PathBuf,
    pub step: ConversionStep,
    pub error: CoreError,
}

impl fmt::Display for FrameFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} failed: {}", self.frame.display(), self.step, self.error)
    }
}

/// The external single-image converter.
#[derive(Debug, Clone)]
pub struct FrameConverter {
    program: PathBuf,
    settings: PathBuf,
}

impl FrameConverter {
    pub fn new(program: impl Into<PathBuf>, settings: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            settings: settings.into(),
        }
    }

    /// `<converter> <source> <settings> -p <processed>/s<name>`
    pub fn primary_invocation(&self, task: &FrameTask) -> Invocation {
        Invocation::new(&self.program)
            .arg(&task.source)
            .arg(&self.settings)
            .arg("-p")
            .arg(&task.primary_output)
    }

    /// `<converter> <processed>/s<name> -s <scr>/<stem>.scr`
    pub fn secondary_invocation(&self, primary_output: &Path, scr_output: &Path) -> Invocation {
        Invocation::new(&self.program)
            .arg(primary_output)
            .arg("-s")
            .arg(scr_output)
    }

    /// Runs one task. Converter output is always captured, never mirrored.
    pub fn convert(&self, runner: &dyn CommandRunner, task: &FrameTask) -> TaskOutcome<FrameFailure> {
        if let Err(error) = runner.run(&self.primary_invocation(task), OutputMode::Quiet) {
            return TaskOutcome::Failed(FrameFailure {
                frame: task.source.clone(),
                step: ConversionStep::Primary,
                error,
            });
        }

        let Some(scr_output) = &task.scr_output else {
            return TaskOutcome::Completed;
        };

        let secondary = self.secondary_invocation(&task.primary_output, scr_output);
        match runner.run(&secondary, OutputMode::Quiet) {
            Ok(_) => TaskOutcome::Completed,
            Err(error) => TaskOutcome::Degraded(FrameFailure {
                frame: task.source.clone(),
                step: ConversionStep::Secondary,
                error,
            }),
        }
    }
}

/// Converts every task with at most `concurrency` conversions in flight.
///
/// Only an inability to run the fan-out at all is an error; individual frame
/// failures are returned in the report.
pub fn convert_frames(
    runner: &dyn CommandRunner,
    converter: &FrameConverter,
    tasks: &[FrameTask],
    concurrency: usize,
    progress: &ProgressState,
) -> CoreResult<FanOutReport<FrameFailure>> {
    FanOutScheduler::new(concurrency).run(tasks, progress, |task| converter.convert(runner, task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::ScriptedRunner;

    fn task(with_scr: bool) -> FrameTask {
        let work = WorkDir::new("/w");
        let scr_dir = work.scr_dir();
        FrameTask::for_frame(
            Path::new("/w/frames/000007.png"),
            &work.processed_dir(),
            with_scr.then_some(scr_dir.as_path()),
        )
        .unwrap()
    }

    #[test]
    fn test_task_paths() {
        let t = task(true);
        assert_eq!(t.primary_output, PathBuf::from("/w/processed/s000007.png"));
        assert_eq!(t.scr_output, Some(PathBuf::from("/w/scr/000007.scr")));
        assert_eq!(task(false).scr_output, None);
    }

    #[test]
    fn test_uppercase_frame_matches_encode_pattern() {
        let work = WorkDir::new("/w");
        let t = FrameTask::for_frame(Path::new("/w/frames/000002.PNG"), &work.processed_dir(), None)
            .unwrap();
        assert_eq!(t.primary_output, PathBuf::from("/w/processed/s000002.png"));
    }

    #[test]
    fn test_primary_invocation_template() {
        let converter = FrameConverter::new("/opt/conv", "/opt/conv.isw");
        let inv = converter.primary_invocation(&task(false));
        assert_eq!(
            inv.command_line(),
            "/opt/conv /w/frames/000007.png /opt/conv.isw -p /w/processed/s000007.png"
        );
    }

    #[test]
    fn test_secondary_reads_primary_output() {
        let runner = ScriptedRunner::new();
        let converter = FrameConverter::new("conv", "conv.isw");

        let outcome = converter.convert(&runner, &task(true));
        assert!(matches!(outcome, TaskOutcome::Completed));

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1].args,
            vec!["/w/processed/s000007.png", "-s", "/w/scr/000007.scr"]
        );
    }

    #[test]
    fn test_primary_failure_skips_secondary() {
        let runner = ScriptedRunner::new();
        runner.fail_with(" -p ", "cannot open image");
        let converter = FrameConverter::new("conv", "conv.isw");

        match converter.convert(&runner, &task(true)) {
            TaskOutcome::Failed(failure) => {
                assert_eq!(failure.step, ConversionStep::Primary);
                assert_eq!(failure.error.command_output(), Some("cannot open image"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_secondary_failure_is_degraded() {
        let runner = ScriptedRunner::new();
        runner.fail_with(" -s ", "scr write error");
        let converter = FrameConverter::new("conv", "conv.isw");

        match converter.convert(&runner, &task(true)) {
            TaskOutcome::Degraded(failure) => {
                assert_eq!(failure.step, ConversionStep::Secondary);
                assert!(failure.to_string().contains("scr conversion failed"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
