//! Working directory management.
//!
//! Every intermediate artifact of a run lives under one root directory so it
//! can be inspected after a failed run or removed in one step after a
//! successful one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::CoreResult;

/// Layout of the working directory tree.
///
/// ```text
/// <root>/
///   frames/       extracted frames, %06d.png
///   processed/    converted frames, s%06d.png
///   scr/          .scr screens (only when kept)
///   sound.wav     extracted audio track
///   resized.mp4   letterboxed intermediate video
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("frames")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("processed")
    }

    pub fn scr_dir(&self) -> PathBuf {
        self.root.join("scr")
    }

    pub fn sound_path(&self) -> PathBuf {
        self.root.join("sound.wav")
    }

    pub fn resized_path(&self) -> PathBuf {
        self.root.join("resized.mp4")
    }

    /// Creates the tree for a fresh run.
    ///
    /// `frames/`, `processed/` and `scr/` are emptied so frames left by an
    /// earlier run with cleanup off never reach the next encode. Other files
    /// under the root are kept.
    pub fn create(&self, with_scr: bool) -> CoreResult<()> {
        fs::create_dir_all(&self.root)?;
        reset_dir(&self.frames_dir())?;
        reset_dir(&self.processed_dir())?;
        remove_dir_if_present(&self.scr_dir())?;
        if with_scr {
            fs::create_dir_all(self.scr_dir())?;
        }
        log::debug!("Working directory ready at {}", self.root.display());
        Ok(())
    }

    /// Removes the whole tree. Removing a tree that is already gone succeeds.
    pub fn remove(&self) -> CoreResult<()> {
        remove_dir_if_present(&self.root)
    }
}

fn remove_dir_if_present(dir: &Path) -> CoreResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn reset_dir(dir: &Path) -> CoreResult<()> {
    remove_dir_if_present(dir)?;
    fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let work = WorkDir::new("/tmp/run");
        assert_eq!(work.frames_dir(), PathBuf::from("/tmp/run/frames"));
        assert_eq!(work.processed_dir(), PathBuf::from("/tmp/run/processed"));
        assert_eq!(work.scr_dir(), PathBuf::from("/tmp/run/scr"));
        assert_eq!(work.sound_path(), PathBuf::from("/tmp/run/sound.wav"));
        assert_eq!(work.resized_path(), PathBuf::from("/tmp/run/resized.mp4"));
    }

    #[test]
    fn test_create_and_remove() -> Result<(), Box<dyn std::error::Error>> {
        let base = tempfile::tempdir()?;
        let work = WorkDir::new(base.path().join("temp"));

        work.create(false)?;
        assert!(work.frames_dir().is_dir());
        assert!(work.processed_dir().is_dir());
        assert!(!work.scr_dir().exists());

        work.create(true)?;
        assert!(work.scr_dir().is_dir());

        work.remove()?;
        assert!(!work.root().exists());
        work.remove()?;
        Ok(())
    }

    #[test]
    fn test_create_drops_previous_frames() -> Result<(), Box<dyn std::error::Error>> {
        let base = tempfile::tempdir()?;
        let work = WorkDir::new(base.path().join("temp"));

        work.create(true)?;
        fs::write(work.frames_dir().join("000009.png"), b"old")?;
        fs::write(work.processed_dir().join("s000009.png"), b"old")?;
        fs::write(work.scr_dir().join("000009.scr"), b"old")?;
        fs::write(work.sound_path(), b"wav")?;

        work.create(false)?;
        assert_eq!(fs::read_dir(work.frames_dir())?.count(), 0);
        assert_eq!(fs::read_dir(work.processed_dir())?.count(), 0);
        assert!(!work.scr_dir().exists());
        assert!(work.sound_path().is_file());
        Ok(())
    }
}
