use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::classify::validate::{project_paths, Validator, Validity};
use crate::error::Error;
use crate::journal::{Journal, LogEntry};
use crate::ops::fsops::{merge_folders, move_path, MergeReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(PathBuf),
    Merged(PathBuf, MergeReport),
    AlreadyInPlace,
    WouldMove(PathBuf),
    WouldMerge(PathBuf, MergeReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub moved: usize,
    pub merged: usize,
    pub in_place: usize,
    pub failed: usize,
}

impl MoveReport {
    fn count(&mut self, outcome: &MoveOutcome) {
        match outcome {
            MoveOutcome::Moved(_) | MoveOutcome::WouldMove(_) => self.moved += 1,
            MoveOutcome::Merged(_, report) | MoveOutcome::WouldMerge(_, report) => {
                self.merged += 1;
                if report.failed > 0 {
                    self.failed += 1;
                }
            }
            MoveOutcome::AlreadyInPlace => self.in_place += 1,
        }
    }
}

/// Validate `start` and relocate every good artist folder to
/// `destination/<artist>`, merging into an existing artist folder there.
pub fn move_library(
    validator: &Validator<'_>,
    start: &Path,
    destination: &Path,
    dry_run: bool,
    mut journal: Option<&mut Journal>,
) -> Result<MoveReport, Error> {
    if destination.as_os_str().is_empty() {
        return Err(Error::InvalidArgument("destination path is empty".to_string()));
    }

    let results = validator.validate_detailed(start, journal.as_deref_mut())?;
    let units = project_paths(&results, Validity::Good);
    info!(
        "Moving {} artist folders from {} to {}",
        units.len(),
        start.display(),
        destination.display()
    );

    let reporter = validator.reporter();
    let started = Instant::now();
    reporter.on_action_start(units.len());

    let mut report = MoveReport::default();
    for (index, unit) in units.iter().enumerate() {
        match move_unit(unit, destination, dry_run) {
            Ok(outcome) => {
                log_outcome(journal.as_deref_mut(), unit, &outcome);
                report.count(&outcome);
            }
            Err(e) => {
                error!("Failed to move {}: {}", unit.display(), e);
                log_failure(journal.as_deref_mut(), unit, &e);
                report.failed += 1;
            }
        }
        reporter.on_action_progress(index + 1, &unit.to_string_lossy());
    }

    reporter.on_action_complete(
        report.moved + report.merged,
        report.failed,
        started.elapsed().as_secs_f64(),
    );
    Ok(report)
}

/// Move one artist folder under `destination`, keeping its name.
pub fn move_unit(unit: &Path, destination: &Path, dry_run: bool) -> Result<MoveOutcome, Error> {
    let name = unit.file_name().ok_or_else(|| {
        Error::InvalidArgument(format!("cannot move root folder {}", unit.display()))
    })?;
    let target = destination.join(name);

    if target == unit {
        return Ok(MoveOutcome::AlreadyInPlace);
    }
    if target.starts_with(unit) {
        return Err(Error::InvalidArgument(format!(
            "destination {} is inside {}",
            destination.display(),
            unit.display()
        )));
    }

    if target.exists() {
        let merge = merge_folders(unit, &target, dry_run)?;
        return Ok(if dry_run {
            MoveOutcome::WouldMerge(target, merge)
        } else {
            info!("Merged {} into {}", unit.display(), target.display());
            MoveOutcome::Merged(target, merge)
        });
    }

    if dry_run {
        info!("Would move {} -> {}", unit.display(), target.display());
        return Ok(MoveOutcome::WouldMove(target));
    }

    move_path(unit, &target)?;
    info!("Moved {} -> {}", unit.display(), target.display());
    Ok(MoveOutcome::Moved(target))
}

fn log_outcome(journal: Option<&mut Journal>, unit: &Path, outcome: &MoveOutcome) {
    let Some(journal) = journal else {
        return;
    };
    let (status, details) = match outcome {
        MoveOutcome::Moved(target) => ("Good", format!("Moved to {}", target.display())),
        MoveOutcome::WouldMove(target) => {
            ("Good", format!("Would move to {} (dry run)", target.display()))
        }
        MoveOutcome::Merged(target, merge) | MoveOutcome::WouldMerge(target, merge) => (
            if merge.failed > 0 { "Bad" } else { "Good" },
            format!(
                "Merged into {}: {} moved, {} renamed, {} failed{}",
                target.display(),
                merge.moved,
                merge.renamed,
                merge.failed,
                if matches!(outcome, MoveOutcome::WouldMerge(..)) {
                    " (dry run)"
                } else {
                    ""
                }
            ),
        ),
        MoveOutcome::AlreadyInPlace => ("Good", "Already at destination".to_string()),
    };
    let entry = LogEntry::new(status, unit, "move", "Artist").with_details(details);
    if let Err(e) = journal.append(&entry) {
        warn!("Failed to log move of {}: {}", unit.display(), e);
    }
}

fn log_failure(journal: Option<&mut Journal>, unit: &Path, err: &Error) {
    let Some(journal) = journal else {
        return;
    };
    let entry = LogEntry::new("Error", unit, "move", "Artist").with_details(err.to_string());
    if let Err(e) = journal.append(&entry) {
        warn!("Failed to log move of {}: {}", unit.display(), e);
    }
}
