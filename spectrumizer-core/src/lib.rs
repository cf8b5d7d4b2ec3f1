//! Core library for turning a video into "retro computer" style footage.
//!
//! The pipeline letterboxes the source to a small frame, samples it into PNG
//! frames with ffmpeg, pushes every frame through an external single-image
//! converter with bounded parallelism, and re-encodes the converted frames
//! (nearest-neighbour upscaled) together with the original audio.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use spectrumizer_core::config::PipelineConfigBuilder;
//! use spectrumizer_core::external::{SystemRunner, preflight};
//! use spectrumizer_core::processing::Pipeline;
//!
//! let mut config = PipelineConfigBuilder::new()
//!     .input("intro.mp4")
//!     .converter("/opt/img2spectrum/img2spectrum")
//!     .concurrency(8)
//!     .build()
//!     .unwrap();
//! config.resolve_paths().unwrap();
//! preflight(&config).unwrap();
//!
//! let summary = Pipeline::new(&config, &SystemRunner).run().unwrap();
//! for failure in &summary.failures {
//!     eprintln!("{failure}");
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod processing;
pub mod progress;
pub mod temp_files;
pub mod terminal;
pub mod util;
pub mod utils;

// Re-exports for public API
pub use config::{EncoderKind, PipelineConfig, PipelineConfigBuilder};
pub use discovery::find_frame_files;
pub use error::{CoreError, CoreResult, PipelineStage};
pub use external::{CommandRunner, SystemRunner, preflight};
pub use processing::{Pipeline, PipelineSummary};
pub use progress::{ProgressReporter, ProgressSink, ProgressSnapshot, ProgressState};
pub use temp_files::WorkDir;
pub use util::{FanOutReport, FanOutScheduler, TaskOutcome};
pub use utils::{format_duration, format_rate};
