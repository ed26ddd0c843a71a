/// Trait for reporting scan progress.
///
/// CLI implements with indicatif; library callers and tests use `SilentReporter`.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self, _total_folders: usize) {}
    fn on_folder_done(&self, _folders_done: usize, _current_path: &str) {}
    fn on_scan_complete(&self, _good: usize, _bad: usize, _duration_secs: f64) {}
    fn on_action_start(&self, _total_units: usize) {}
    fn on_action_progress(&self, _units_done: usize, _current_path: &str) {}
    fn on_action_complete(&self, _succeeded: usize, _failed: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
