use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn spectrumizer_cmd() -> Command {
    let mut cmd = Command::cargo_bin("spectrumizer").expect("Failed to find spectrumizer binary");
    cmd.env_remove("SPECTRUMIZER_CONVERTER")
        .env_remove("SPECTRUMIZER_THREADS")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_subcommands() -> Result<(), Box<dyn Error>> {
    spectrumizer_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("convert"))
        .stdout(contains("check"));
    Ok(())
}

#[test]
fn test_convert_without_input_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    spectrumizer_cmd()
        .current_dir(dir.path())
        .arg("convert")
        .assert()
        .failure()
        .stderr(contains("not found, using defaults"))
        .stderr(contains("no input file specified"));
    Ok(())
}

#[test]
fn test_invalid_setting_hint_names_the_flag() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    spectrumizer_cmd()
        .current_dir(dir.path())
        .args(["convert", "--input", "clip.mp4", "--fps=0"])
        .assert()
        .failure()
        .stderr(contains("framerate must be positive"))
        .stderr(contains("pass --fps"))
        .stderr(contains("Pass --input").not());
    Ok(())
}

#[test]
fn test_config_file_encoder_is_case_insensitive() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("spectrumizer.toml");
    fs::write(&config, "encoder = \"CPU\"\n")?;

    spectrumizer_cmd()
        .current_dir(dir.path())
        .args(["convert", "--input", "absent.mp4"])
        .assert()
        .failure()
        .stderr(contains("Failed to parse config file").not())
        .stderr(contains("Input file not found"));
    Ok(())
}

#[test]
fn test_convert_non_existent_input() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    spectrumizer_cmd()
        .current_dir(dir.path())
        .args(["convert", "--input", "surely/this/does/not/exist/input.mp4"])
        .assert()
        .failure()
        .stderr(contains("Input file not found"));
    Ok(())
}

#[test]
fn test_malformed_config_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("broken.toml");
    fs::write(&config, "threads = \"many\"\n")?;

    spectrumizer_cmd()
        .current_dir(dir.path())
        .args(["convert", "--input", "clip.mp4", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_invalid_encoder_is_rejected() -> Result<(), Box<dyn Error>> {
    spectrumizer_cmd()
        .args(["convert", "--input", "clip.mp4", "--encoder", "quicksync"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("quicksync"));
    Ok(())
}

#[test]
fn test_check_reports_missing_converter() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    spectrumizer_cmd()
        .current_dir(dir.path())
        .args(["check", "--converter", "no-such-converter"])
        .assert()
        .failure()
        .stderr(contains("converter"))
        .stderr(contains("missing"));
    Ok(())
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    // Writes its last argument; frame extraction writes three PNGs instead.
    const FAKE_FFMPEG: &str = r#"#!/bin/sh
for last; do :; done
case "$*" in
    *fps=*) dir=$(dirname "$last"); for i in 000001 000002 000003; do echo "frame $i" > "$dir/$i.png"; done ;;
    *) echo "media" > "$last" ;;
esac
"#;

    const FAKE_FFPROBE: &str = "#!/bin/sh\necho video\n";

    // <src> <settings> -p <dst>
    const FAKE_CONVERTER: &str = r#"#!/bin/sh
case "$1" in *000002*) echo "bad frame" >&2; exit 1 ;; esac
cp "$1" "$4"
"#;

    fn script(dir: &Path, name: &str, body: &str) -> Result<PathBuf, Box<dyn Error>> {
        let path = dir.join(name);
        fs::write(&path, body)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    #[test]
    fn test_convert_end_to_end() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let ffmpeg = script(dir.path(), "ffmpeg", FAKE_FFMPEG)?;
        let ffprobe = script(dir.path(), "ffprobe", FAKE_FFPROBE)?;
        let converter = script(dir.path(), "converter", FAKE_CONVERTER)?;
        let input = dir.path().join("clip.mp4");
        fs::write(&input, "video")?;
        let work = dir.path().join("work");

        spectrumizer_cmd()
            .current_dir(dir.path())
            .args(["convert", "--input"])
            .arg(&input)
            .arg("--ffmpeg")
            .arg(&ffmpeg)
            .arg("--ffprobe")
            .arg(&ffprobe)
            .arg("--converter")
            .arg(&converter)
            .arg("--temp")
            .arg(&work)
            .args(["--pause", "false", "--progress", "false", "--threads", "2", "--encoder", "cpu"])
            .assert()
            .success()
            .stderr(contains("No audio track found"))
            .stderr(contains("bad frame"))
            .stderr(contains("Converted:"));

        assert!(dir.path().join("clip_smzd.mp4").is_file());
        assert!(!work.exists());
        Ok(())
    }

    #[test]
    fn test_check_with_all_tools_present() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let ffmpeg = script(dir.path(), "ffmpeg", FAKE_FFMPEG)?;
        let ffprobe = script(dir.path(), "ffprobe", FAKE_FFPROBE)?;
        let converter = script(dir.path(), "converter", FAKE_CONVERTER)?;

        spectrumizer_cmd()
            .current_dir(dir.path())
            .arg("check")
            .arg("--ffmpeg")
            .arg(&ffmpeg)
            .arg("--ffprobe")
            .arg(&ffprobe)
            .arg("--converter")
            .arg(&converter)
            .assert()
            .success()
            .stderr(contains("Everything needed for a run was found"));
        Ok(())
    }
}
