use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::classify::layout::{match_layout, LayoutMatch};
use crate::classify::validate::{project_paths, Validator, Validity};
use crate::error::Error;
use crate::journal::{Journal, LogEntry};
use crate::scanner::audio_files_recursive;
use crate::tags::TrackTags;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOptions {
    pub dry_run: bool,
    pub genre: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagReport {
    pub folders: usize,
    pub tagged: usize,
    /// Audio files whose path does not follow a known layout.
    pub skipped: usize,
    pub failed: usize,
}

impl TagReport {
    fn absorb(&mut self, other: &TagReport) {
        self.folders += other.folders;
        self.tagged += other.tagged;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Tag values implied by a track's location in the library.
pub fn tags_from_layout(matched: &LayoutMatch, options: &TagOptions) -> TrackTags {
    TrackTags {
        title: Some(matched.title.clone()),
        performers: vec![matched.artist.clone()],
        album_artists: vec![matched.artist.clone()],
        album: Some(matched.album.clone()),
        year: Some(matched.year),
        track: Some(matched.track),
        disc: matched.disc,
        genres: options.genre.iter().cloned().collect(),
        comment: options.comment.clone(),
        composers: Vec::new(),
    }
}

/// Validate `start`, then rewrite tags for every good artist folder found.
pub fn tag_library(
    validator: &Validator<'_>,
    start: &Path,
    options: &TagOptions,
    mut journal: Option<&mut Journal>,
) -> Result<TagReport, Error> {
    let results = validator.validate_detailed(start, journal.as_deref_mut())?;
    let units = project_paths(&results, Validity::Good);
    info!("Tagging {} artist folders under {}", units.len(), start.display());

    let reporter = validator.reporter();
    let started = Instant::now();
    reporter.on_action_start(units.len());

    let mut report = TagReport::default();
    for (index, unit) in units.iter().enumerate() {
        let unit_report = tag_unit(validator, unit, options);
        log_unit(journal.as_deref_mut(), unit, &unit_report, options.dry_run);
        report.absorb(&unit_report);
        reporter.on_action_progress(index + 1, &unit.to_string_lossy());
    }

    reporter.on_action_complete(
        report.tagged,
        report.failed,
        started.elapsed().as_secs_f64(),
    );
    Ok(report)
}

/// Tag every audio file beneath an already validated folder. Failures on
/// single files are counted, never propagated.
pub fn tag_unit(validator: &Validator<'_>, unit: &Path, options: &TagOptions) -> TagReport {
    let extensions = &validator.options().audio_extensions;
    let mut report = TagReport {
        folders: 1,
        ..Default::default()
    };

    for file in audio_files_recursive(unit, extensions) {
        if let Some(parent) = file.parent() {
            if validator.options().skip.excluded(parent).is_some() {
                continue;
            }
        }

        let Some(matched) = match_layout(&file) else {
            debug!("No layout match for {}, leaving tags alone", file.display());
            report.skipped += 1;
            continue;
        };
        let tags = tags_from_layout(&matched, options);

        if options.dry_run {
            info!("Would tag {} as {:?}", file.display(), tags);
            report.tagged += 1;
            continue;
        }

        match validator.tags().write(&file, &tags) {
            Ok(()) => report.tagged += 1,
            Err(e) => {
                warn!("Failed to tag {}: {}", file.display(), e);
                report.failed += 1;
            }
        }
    }

    report
}

fn log_unit(journal: Option<&mut Journal>, unit: &Path, report: &TagReport, dry_run: bool) {
    let Some(journal) = journal else {
        return;
    };
    let status = if report.failed > 0 { "Bad" } else { "Good" };
    let mut details = format!(
        "{} tagged, {} skipped, {} failed",
        report.tagged, report.skipped, report.failed
    );
    if dry_run {
        details.push_str(" (dry run)");
    }
    let entry = LogEntry::new(status, unit, "tag", "Artist").with_details(details);
    if let Err(e) = journal.append(&entry) {
        warn!("Failed to log tagging of {}: {}", unit.display(), e);
    }
}
