#![cfg(unix)]

// Frame conversion against a real child process: a small shell script stands
// in for the converter and copies its input to the requested output.

use spectrumizer_core::external::SystemRunner;
use spectrumizer_core::processing::{ConversionStep, FrameConverter, build_frame_tasks, convert_frames};
use spectrumizer_core::progress::ProgressState;
use spectrumizer_core::{CoreError, WorkDir, find_frame_files};

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

type TestResult = Result<(), Box<dyn std::error::Error>>;

const FAKE_CONVERTER: &str = r#"#!/bin/sh
# primary:   <src> <settings> -p <dst>
# secondary: <src> -s <dst>
if [ "$2" = "-s" ]; then
    case "$1" in *000003*) echo "cannot write screen" >&2; exit 4 ;; esac
    cp "$1" "$3"
    exit 0
fi
case "$1" in *000002*) echo "unsupported image: $1" >&2; exit 2 ;; esac
[ -f "$2" ] || { echo "missing settings $2" >&2; exit 3; }
cp "$1" "$4"
"#;

fn write_converter(dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.join("fake-converter.sh");
    fs::write(&path, FAKE_CONVERTER)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

fn seed_frames(work: &WorkDir, count: usize) -> TestResult {
    for i in 1..=count {
        fs::write(work.frames_dir().join(format!("{i:06}.png")), format!("frame {i}"))?;
    }
    Ok(())
}

#[test]
fn test_real_converter_fan_out() -> TestResult {
    let dir = tempfile::tempdir()?;
    let converter_path = write_converter(dir.path())?;
    let settings = dir.path().join("conv.isw");
    fs::write(&settings, "")?;

    let work = WorkDir::new(dir.path().join("temp"));
    work.create(false)?;
    seed_frames(&work, 5)?;

    let frames = find_frame_files(&work.frames_dir())?;
    let tasks = build_frame_tasks(&frames, &work, false)?;
    let converter = FrameConverter::new(&converter_path, &settings);
    let progress = ProgressState::new(tasks.len());

    let report = convert_frames(&SystemRunner, &converter, &tasks, 3, &progress)?;

    assert_eq!(report.completed, 4);
    assert_eq!(report.failed, 1);
    assert!(report.peak_in_flight <= 3);

    let failure = &report.failures[0];
    assert!(failure.frame.ends_with("000002.png"));
    assert_eq!(failure.step, ConversionStep::Primary);
    match &failure.error {
        CoreError::CommandFailed { command, status, output } => {
            assert!(command.contains("000002.png"));
            assert_eq!(status, "exit code 2");
            assert!(output.contains("unsupported image"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(fs::read_to_string(work.processed_dir().join("s000001.png"))?, "frame 1");
    assert!(!work.processed_dir().join("s000002.png").exists());
    assert!(work.processed_dir().join("s000005.png").is_file());
    Ok(())
}

#[test]
fn test_real_converter_writes_screens_from_primary_output() -> TestResult {
    let dir = tempfile::tempdir()?;
    let converter_path = write_converter(dir.path())?;
    let settings = dir.path().join("conv.isw");
    fs::write(&settings, "")?;

    let work = WorkDir::new(dir.path().join("temp"));
    work.create(true)?;
    seed_frames(&work, 4)?;

    let frames = find_frame_files(&work.frames_dir())?;
    let tasks = build_frame_tasks(&frames, &work, true)?;
    let converter = FrameConverter::new(&converter_path, &settings);
    let progress = ProgressState::new(tasks.len());

    let report = convert_frames(&SystemRunner, &converter, &tasks, 2, &progress)?;

    // Frame 2 fails its primary conversion, frame 3 only its screen.
    assert_eq!(report.completed, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures.len(), 2);
    assert!(
        report
            .failures
            .iter()
            .any(|f| f.step == ConversionStep::Secondary && f.frame.ends_with("000003.png"))
    );

    assert_eq!(fs::read_to_string(work.scr_dir().join("000001.scr"))?, "frame 1");
    assert!(!work.scr_dir().join("000002.scr").exists());
    assert!(!work.scr_dir().join("000003.scr").exists());
    assert!(work.scr_dir().join("000004.scr").is_file());
    Ok(())
}

#[test]
fn test_missing_settings_fails_every_frame() -> TestResult {
    let dir = tempfile::tempdir()?;
    let converter_path = write_converter(dir.path())?;

    let work = WorkDir::new(dir.path().join("temp"));
    work.create(false)?;
    seed_frames(&work, 3)?;

    let frames = find_frame_files(&work.frames_dir())?;
    let tasks = build_frame_tasks(&frames, &work, false)?;
    let converter = FrameConverter::new(&converter_path, dir.path().join("absent.isw"));
    let progress = ProgressState::new(tasks.len());

    let report = convert_frames(&SystemRunner, &converter, &tasks, 4, &progress)?;

    assert_eq!(report.completed, 0);
    assert_eq!(report.failed, 3);
    assert_eq!(progress.failed(), 3);
    Ok(())
}
