//! Utility functions for formatting and path handling.
//!
//! General-purpose helpers shared by the progress reporter, the pipeline
//! summary and the frame task builder.

use std::path::Path;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats a throughput as "12.3 frames/s".
#[must_use]
pub fn format_rate(frames_per_second: f64) -> String {
    if !frames_per_second.is_finite() || frames_per_second < 0.0 {
        return "-- frames/s".to_string();
    }
    format!("{frames_per_second:.1} frames/s")
}

/// File stem as a String, or an error if the path has none.
pub fn get_file_stem_safe(path: &Path) -> crate::CoreResult<String> {
    Ok(path
        .file_stem()
        .ok_or_else(|| {
            crate::CoreError::PathError(format!("Failed to get file stem for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}
