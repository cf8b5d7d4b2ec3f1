// ============================================================================
// spectrumizer-core/src/processing/pipeline.rs
// ============================================================================
//
// PIPELINE DRIVER: Sequencing the Stages of a Run
//
// The driver walks a fixed sequence of stages on the calling thread:
//
//   audio probe -> [extract audio] -> resize -> extract frames ->
//   [operator pause] -> convert frames (fan-out) -> encode -> [cleanup]
//
// Any sequential stage failing aborts the run with CoreError::Stage and
// leaves the working directory in place for inspection. Frame conversion
// failures are task-local: they are reported in the summary and the encode
// still runs with whatever frames converted.
//
// KEY COMPONENTS:
// - Pipeline: the driver, configured with a runner, prompt and progress sink
// - OperatorPrompt: blocking "press Enter" seam (StdinPrompt in production)
// - PipelineSummary: what happened, returned to the caller

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::audio::{extract_audio, probe_audio};
use super::frames::{FrameConverter, FrameFailure, PROCESSED_PATTERN, build_frame_tasks, convert_frames};
use super::video::{encode_video, extract_frames, resize_video};
use crate::config::PipelineConfig;
use crate::discovery::find_frame_files;
use crate::error::{CoreResult, PipelineStage};
use crate::external::{CommandRunner, EncodeParams, OutputMode, ffmpeg};
use crate::progress::{DEFAULT_PROGRESS_INTERVAL, ProgressReporter, ProgressSink, ProgressState};
use crate::temp_files::WorkDir;
use crate::terminal;

/// Blocks until the operator allows the run to continue.
pub trait OperatorPrompt {
    fn wait_for_operator(&mut self, message: &str) -> CoreResult<()>;
}

/// Waits for one line on standard input.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl OperatorPrompt for StdinPrompt {
    fn wait_for_operator(&mut self, message: &str) -> CoreResult<()> {
        terminal::print_warning(message);
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

type SinkFactory<'a> = Box<dyn FnOnce(usize) -> Box<dyn ProgressSink> + 'a>;

/// Outcome of a completed run.
#[derive(Debug)]
pub struct PipelineSummary {
    pub has_audio: bool,
    /// Size of the frame set
    pub frames: usize,
    /// Frames whose primary conversion succeeded
    pub completed: usize,
    /// Frames whose primary conversion failed
    pub failed: usize,
    /// Every task-local failure, primary and secondary
    pub failures: Vec<FrameFailure>,
    pub peak_in_flight: usize,
    pub output: PathBuf,
    /// Directory holding `.scr` screens, when they were written and kept
    pub scr_dir: Option<PathBuf>,
    /// Working directory, when it was kept
    pub work_dir: Option<PathBuf>,
    pub conversion_time: Duration,
    pub total_time: Duration,
}

impl PipelineSummary {
    /// Converted frames per second during the fan-out.
    pub fn conversion_rate(&self) -> f64 {
        let secs = self.conversion_time.as_secs_f64();
        if secs > 0.0 {
            self.completed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives one run of the pipeline.
///
/// # Examples
///
/// ```rust,no_run
/// use spectrumizer_core::config::PipelineConfigBuilder;
/// use spectrumizer_core::external::SystemRunner;
/// use spectrumizer_core::processing::Pipeline;
///
/// let mut config = PipelineConfigBuilder::new()
///     .input("clip.mp4")
///     .pause_before_convert(false)
///     .build()
///     .unwrap();
/// config.resolve_paths().unwrap();
///
/// let summary = Pipeline::new(&config, &SystemRunner).run().unwrap();
/// println!("{} of {} frames converted", summary.completed, summary.frames);
/// ```
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    runner: &'a dyn CommandRunner,
    prompt: Box<dyn OperatorPrompt + 'a>,
    sink_factory: SinkFactory<'a>,
    progress_interval: Duration,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig, runner: &'a dyn CommandRunner) -> Self {
        Self {
            config,
            runner,
            prompt: Box::new(StdinPrompt),
            sink_factory: Box::new(terminal::progress_sink_for),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Replaces the stdin prompt used by the operator pause.
    pub fn with_prompt(mut self, prompt: impl OperatorPrompt + 'a) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Replaces the progress sink. The factory receives the frame count.
    pub fn with_progress_sink<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(usize) -> Box<dyn ProgressSink> + 'a,
    {
        self.sink_factory = Box::new(factory);
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Runs every stage in order.
    pub fn run(self) -> CoreResult<PipelineSummary> {
        let Pipeline {
            config,
            runner,
            mut prompt,
            sink_factory,
            progress_interval,
        } = self;
        let started = Instant::now();
        let mode = OutputMode::from_verbose(config.verbose);
        let work = WorkDir::new(&config.temp_dir);
        let output = config.output_path();

        work.create(config.writes_scr())
            .map_err(|e| e.in_stage(PipelineStage::Prepare))?;

        // ---- Audio ----
        terminal::print_processing("Checking for an audio track");
        let has_audio = probe_audio(runner, &config.ffprobe, &config.input);
        if has_audio {
            terminal::print_processing("Extracting audio");
            extract_audio(runner, &config.ffmpeg, &config.input, &work.sound_path(), mode)
                .map_err(|e| e.in_stage(PipelineStage::ExtractAudio))?;
        } else {
            terminal::print_warning("No audio track found, the output will be silent");
        }

        // ---- Resize and frame extraction ----
        terminal::print_processing("Resizing video");
        resize_video(
            runner,
            &config.ffmpeg,
            &config.input,
            &work.resized_path(),
            (config.resize_width, config.resize_height),
            mode,
        )
        .map_err(|e| e.in_stage(PipelineStage::Resize))?;

        terminal::print_processing("Extracting frames");
        extract_frames(
            runner,
            &config.ffmpeg,
            &work.resized_path(),
            &work.frames_dir(),
            config.framerate,
            mode,
        )
        .map_err(|e| e.in_stage(PipelineStage::ExtractFrames))?;

        if config.pause_before_convert {
            prompt
                .wait_for_operator("Paused to adjust the converter. Press Enter to continue...")
                .map_err(|e| e.in_stage(PipelineStage::OperatorPause))?;
        }

        // ---- Fan-out ----
        let frames = find_frame_files(&work.frames_dir())
            .map_err(|e| e.in_stage(PipelineStage::ConvertFrames))?;
        let tasks = build_frame_tasks(&frames, &work, config.writes_scr())
            .map_err(|e| e.in_stage(PipelineStage::ConvertFrames))?;

        terminal::print_processing(&format!("Converting {} frames", tasks.len()));
        terminal::print_status("Workers", &config.concurrency.to_string(), false);
        if config.writes_scr() {
            terminal::print_status("SCR files", &work.scr_dir().display().to_string(), false);
        }

        let converter = FrameConverter::new(&config.converter, &config.converter_settings);
        let progress = Arc::new(ProgressState::new(tasks.len()));
        let reporter = config.show_progress.then(|| {
            ProgressReporter::start(
                Arc::clone(&progress),
                progress_interval,
                sink_factory(tasks.len()),
            )
        });

        let report = convert_frames(runner, &converter, &tasks, config.concurrency, &progress);
        if let Some(reporter) = reporter {
            reporter.finish();
        }
        let report = report.map_err(|e| e.in_stage(PipelineStage::ConvertFrames))?;

        for failure in &report.failures {
            warn!("{failure}");
        }
        debug!(
            "Fan-out finished: {} completed, {} failed, peak {} in flight",
            report.completed, report.failed, report.peak_in_flight
        );

        // ---- Encode ----
        terminal::print_processing("Encoding output video");
        let params = EncodeParams {
            frames_pattern: ffmpeg::image_sequence_pattern(&work.processed_dir(), PROCESSED_PATTERN),
            audio: has_audio.then(|| work.sound_path()),
            output: output.clone(),
            framerate: config.framerate,
            scale_factor: config.scale_factor,
            audio_bitrate: config.audio_bitrate.clone(),
            encoder: config.encoder,
        };
        encode_video(runner, &config.ffmpeg, &params, mode)
            .map_err(|e| e.in_stage(PipelineStage::Encode))?;

        // ---- Cleanup ----
        let work_dir = if config.cleanup {
            terminal::print_processing("Removing temporary files");
            work.remove()
                .map_err(|e| e.in_stage(PipelineStage::Cleanup))?;
            None
        } else {
            Some(work.root().to_path_buf())
        };

        Ok(PipelineSummary {
            has_audio,
            frames: report.total,
            completed: report.completed,
            failed: report.failed,
            failures: report.failures,
            peak_in_flight: report.peak_in_flight,
            output,
            scr_dir: (config.writes_scr() && work_dir.is_some()).then(|| work.scr_dir()),
            work_dir,
            conversion_time: report.elapsed,
            total_time: started.elapsed(),
        })
    }
}
