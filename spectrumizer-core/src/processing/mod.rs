//! Pipeline stages and the driver that sequences them.
//!
//! Each stage is a plain function taking a [`CommandRunner`] so it can be
//! driven by a scripted runner in tests. [`Pipeline`] runs them in order.
//!
//! [`CommandRunner`]: crate::external::CommandRunner

/// Audio probe and extraction
pub mod audio;

/// Per-frame conversion fan-out
pub mod frames;

/// Stage sequencing
pub mod pipeline;

/// Resize, frame extraction and final encode
pub mod video;

pub use audio::{extract_audio, probe_audio};
pub use frames::{ConversionStep, FrameConverter, FrameFailure, FrameTask, build_frame_tasks, convert_frames};
pub use pipeline::{OperatorPrompt, Pipeline, PipelineSummary, StdinPrompt};
pub use video::{encode_video, extract_frames, resize_video};
