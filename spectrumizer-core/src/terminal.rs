//! Terminal UI components and styling for spectrumizer.
//!
//! This module provides consistent terminal output styling using a hierarchical
//! system with minimal symbols and consistent spacing. All text goes through the
//! `log` facade so it ends up wherever the binary's logger writes; the progress
//! bar is drawn with `indicatif` directly on stderr.

use std::io::IsTerminal;
use std::time::Duration;

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use owo_colors::OwoColorize;
use unicode_width::UnicodeWidthStr;

use crate::progress::{LogProgressSink, ProgressSink, ProgressSnapshot};

/// Represents the visual hierarchy levels in the CLI output
#[derive(Debug, Clone, Copy)]
pub enum OutputLevel {
    /// Level 1: Main sections (===== SECTION =====)
    Section,
    /// Level 2: Subsections and stages (» Stage)
    Subsection,
    /// Level 3: Progress items and sub-operations
    Progress,
    /// Level 4: Key-value status information
    Status,
}

impl OutputLevel {
    /// Get the indentation for this output level
    fn indent(&self) -> &'static str {
        match self {
            OutputLevel::Section => "",
            OutputLevel::Subsection => "  ",
            OutputLevel::Progress => "    ",
            OutputLevel::Status => "      ",
        }
    }
}

/// Check if color should be used (respects NO_COLOR environment variable)
fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print an item at the specified hierarchy level
pub fn print_item(level: OutputLevel, symbol: Option<&str>, text: &str, bold: bool) {
    let indent = level.indent();
    let output = match symbol {
        Some(sym) if should_use_color() && bold => format!("{indent}{sym} {}", style(text).bold()),
        Some(sym) => format!("{indent}{sym} {text}"),
        None if should_use_color() && bold => format!("{indent}{}", style(text).bold()),
        None => format!("{indent}{text}"),
    };

    info!("{output}");
}

/// Print a pipeline stage heading
pub fn print_processing(message: &str) {
    info!("");
    print_item(OutputLevel::Subsection, Some("»"), message, true);
}

/// Print a sub-item under a processing step
pub fn print_sub_item(message: &str) {
    print_item(OutputLevel::Progress, None, message, false);
}

/// Print a success message
pub fn print_success(message: &str) {
    info!("");
    if should_use_color() {
        info!("  ✓ {}", message.green());
    } else {
        info!("  ✓ {message}");
    }
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let label_width = 15;
    let padding = if label.width() < label_width {
        label_width - label.width()
    } else {
        1
    };
    let indent = OutputLevel::Status.indent();

    if !should_use_color() {
        info!("{indent}{label}:{} {value}", " ".repeat(padding));
        return;
    }

    let colored_value = match () {
        () if label.contains("Failed") && value != "0" => value.yellow().to_string(),
        () if label.contains("Audio") && value == "none" => value.yellow().to_string(),
        () if highlight => value.bold().to_string(),
        () => value.to_string(),
    };
    info!("{indent}{label}:{} {colored_value}", " ".repeat(padding));
}

/// Print an error message
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    if should_use_color() {
        info!("✗ {}", title.red().bold());
    } else {
        info!("✗ {title}");
    }

    info!("");
    info!("  Message:  {message}");

    if let Some(suggestion_text) = suggestion {
        info!("");
        info!("  Suggestion: {suggestion_text}");
    }

    info!("");
}

/// Print a warning message
pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("  ⚠ {}", message.yellow());
    } else {
        info!("  ⚠ {message}");
    }
}

// ============================================================================
// PROGRESS BAR
// ============================================================================

/// In-place `indicatif` bar for the frame fan-out.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new(total: usize) -> Self {
        Self {
            bar: init_progress_bar(total as u64),
        }
    }
}

impl ProgressSink for TerminalProgress {
    fn update(&mut self, snapshot: &ProgressSnapshot) {
        self.bar
            .set_position((snapshot.completed + snapshot.failed) as u64);
        self.bar.set_message(snapshot.to_string());
    }

    fn finish(&mut self, snapshot: &ProgressSnapshot) {
        self.update(snapshot);
        self.bar.finish();
    }
}

/// Picks the bar when stderr is a terminal and plain log lines otherwise.
pub fn progress_sink_for(total: usize) -> Box<dyn ProgressSink> {
    if std::io::stderr().is_terminal() {
        Box::new(TerminalProgress::new(total))
    } else {
        Box::new(LogProgressSink)
    }
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##.")
}

/// Initialize a progress bar with indicatif
fn init_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);

    let term_width = Term::stderr().size().1 as usize;
    let style = if term_width >= 100 {
        bar_style("  ⧖ Converting [{bar:30}] {msg}")
    } else if term_width >= 60 {
        bar_style("  ⧖ [{bar:20}] {msg}")
    } else {
        bar_style("  ⧖ {pos}/{len}")
    };
    pb.set_style(style);

    if !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb.enable_steady_tick(Duration::from_millis(250));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_progress_tracks_finished_tasks() {
        let mut sink = TerminalProgress::new(4);
        let snapshot = ProgressSnapshot {
            completed: 2,
            failed: 1,
            total: 4,
            elapsed: Duration::from_secs(1),
        };
        sink.update(&snapshot);
        assert_eq!(sink.bar.position(), 3);
        assert!(sink.bar.message().contains("1 failed"));
        sink.finish(&snapshot);
        assert!(sink.bar.is_finished());
    }
}
