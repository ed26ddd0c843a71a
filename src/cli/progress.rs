use indicatif::{ProgressBar, ProgressStyle};
use music_tidy::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Validation scan: bar over the folders listed up front
/// - Tag/move phase: bar over the good artist folders
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn start_bar(&self, total: usize, label: &str) {
        let pb = ProgressBar::new(total as u64);
        let template = format!(
            "  {{spinner:.cyan}} {} [{{bar:30.cyan/dim}}] {{pos}}/{{len}} {{wide_msg}}",
            label
        );
        if let Ok(style) = ProgressStyle::with_template(&template) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));

        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn advance(&self, done: usize, current_path: &str) {
        let Ok(guard) = self.bar.lock() else {
            return;
        };
        if let Some(pb) = guard.as_ref() {
            pb.set_position(done as u64);
            pb.set_message(current_path.to_string());
        }
    }

    fn finish_bar(&self) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self, total_folders: usize) {
        self.start_bar(total_folders, "Validating");
    }

    fn on_folder_done(&self, folders_done: usize, current_path: &str) {
        self.advance(folders_done, current_path);
    }

    fn on_scan_complete(&self, good: usize, bad: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Validation complete: {} good, {} bad in {:.2}s",
            good, bad, duration_secs
        );
    }

    fn on_action_start(&self, total_units: usize) {
        self.start_bar(total_units, "Processing");
    }

    fn on_action_progress(&self, units_done: usize, current_path: &str) {
        self.advance(units_done, current_path);
    }

    fn on_action_complete(&self, succeeded: usize, failed: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Done: {} succeeded, {} failed in {:.2}s",
            succeeded, failed, duration_secs
        );
    }
}
