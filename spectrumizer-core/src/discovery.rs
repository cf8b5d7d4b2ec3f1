//! Frame discovery.
//!
//! The frame set is whatever `*.png` files the extraction stage left in the
//! frames directory. It is listed right before the fan-out and never cached,
//! so files added or removed by hand between runs are picked up.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Lists the `.png` files (case-insensitive) at the top level of `frames_dir`,
/// sorted by path.
///
/// # Errors
///
/// * `CoreError::Io` - if the directory cannot be read
/// * `CoreError::NoFramesFound` - if it contains no frames
///
/// # Examples
///
/// ```rust,no_run
/// use spectrumizer_core::find_frame_files;
/// use std::path::Path;
///
/// let frames = find_frame_files(Path::new("temp/frames")).unwrap();
/// println!("{} frames to convert", frames.len());
/// ```
pub fn find_frame_files(frames_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(frames_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();

            if !path.is_file() {
                return None;
            }

            path.extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext_str| ext_str.eq_ignore_ascii_case("png"))
                .map(|_| path.clone())
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFramesFound(frames_dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}
