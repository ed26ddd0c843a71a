//! Re-run tagging or moving over the folders a previous validation run
//! logged as good. Each folder is validated again before anything touches
//! it, so a stale log can never act on a folder that has since gone bad.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, warn};

use crate::classify::validate::Validator;
use crate::error::Error;
use crate::journal::{good_paths, read_entries, Journal, LogEntry};
use crate::ops::relocate::move_unit;
use crate::ops::tagger::{tag_unit, TagOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayAction {
    Tag(TagOptions),
    Move { destination: PathBuf, dry_run: bool },
}

impl ReplayAction {
    fn name(&self) -> &'static str {
        match self {
            ReplayAction::Tag(_) => "tag",
            ReplayAction::Move { .. } => "move",
        }
    }
}

/// Action names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayKind {
    Tag,
    Move,
}

impl FromStr for ReplayKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tag" => Ok(ReplayKind::Tag),
            "move" => Ok(ReplayKind::Move),
            other => Err(format!("unknown replay action '{}' (expected tag or move)", other)),
        }
    }
}

impl fmt::Display for ReplayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayKind::Tag => write!(f, "tag"),
            ReplayKind::Move => write!(f, "move"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub candidates: usize,
    pub replayed: usize,
    /// Logged as good, but no longer good on re-validation.
    pub refused: usize,
    pub failed: usize,
}

pub fn replay(
    validator: &Validator<'_>,
    log_path: &Path,
    action: &ReplayAction,
    mut journal: Option<&mut Journal>,
) -> Result<ReplayReport, Error> {
    if let ReplayAction::Move { destination, .. } = action {
        if destination.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("destination path is empty".to_string()));
        }
    }

    let entries = read_entries(log_path)?;
    let paths = good_paths(&entries);
    info!(
        "Replaying '{}' over {} good folders from {}",
        action.name(),
        paths.len(),
        log_path.display()
    );

    let reporter = validator.reporter();
    let started = Instant::now();
    reporter.on_action_start(paths.len());

    let mut report = ReplayReport {
        candidates: paths.len(),
        ..Default::default()
    };

    for (index, path) in paths.iter().enumerate() {
        let outcome = match validator.require_good(path) {
            Ok(_) => perform(validator, path, action),
            Err(e) => {
                warn!("Refusing to {} {}: {}", action.name(), path.display(), e);
                report.refused += 1;
                record(journal.as_deref_mut(), path, action, "Bad", e.to_string());
                reporter.on_action_progress(index + 1, &path.to_string_lossy());
                continue;
            }
        };

        match outcome {
            Ok(details) => {
                report.replayed += 1;
                record(journal.as_deref_mut(), path, action, "Good", details);
            }
            Err(e) => {
                warn!("Failed to {} {}: {}", action.name(), path.display(), e);
                report.failed += 1;
                record(journal.as_deref_mut(), path, action, "Error", e.to_string());
            }
        }
        reporter.on_action_progress(index + 1, &path.to_string_lossy());
    }

    reporter.on_action_complete(
        report.replayed,
        report.refused + report.failed,
        started.elapsed().as_secs_f64(),
    );
    Ok(report)
}

fn perform(validator: &Validator<'_>, path: &Path, action: &ReplayAction) -> Result<String, Error> {
    match action {
        ReplayAction::Tag(options) => {
            let tagged = tag_unit(validator, path, options);
            if tagged.failed > 0 {
                return Err(Error::tag(
                    path,
                    format!("{} of {} files failed", tagged.failed, tagged.tagged + tagged.failed),
                ));
            }
            Ok(format!("{} tagged, {} skipped", tagged.tagged, tagged.skipped))
        }
        ReplayAction::Move {
            destination,
            dry_run,
        } => move_unit(path, destination, *dry_run).map(|outcome| format!("{:?}", outcome)),
    }
}

fn record(
    journal: Option<&mut Journal>,
    path: &Path,
    action: &ReplayAction,
    status: &str,
    details: String,
) {
    let Some(journal) = journal else {
        return;
    };
    let entry = LogEntry::new(status, path, action.name(), "Replay").with_details(details);
    if let Err(e) = journal.append(&entry) {
        warn!("Failed to log replay of {}: {}", path.display(), e);
    }
}
