//! Per-folder validation: decides whether a folder is a good, taggable,
//! movable part of the library. Every destructive operation is gated on the
//! `Status::Good` this produces.

use ahash::AHashSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, warn};

use crate::classify::layout::{self, Layout};
use crate::config::AppConfig;
use crate::error::Error;
use crate::journal::{Journal, LogEntry};
use crate::progress::{ProgressReporter, SilentReporter};
use crate::scanner::{first_audio_file, list_directories, read_children, SkipFilter};
use crate::tags::TagLibrary;

lazy_static::lazy_static! {
    pub(crate) static ref ALBUM_FOLDER: Regex = Regex::new(r"^\d{4} - .+$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    Unknown,
    Skipped,
    NotFound,
    Empty,
    NoMusicFiles,
    CorruptedFile,
    BadStructure,
    Valid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Unknown,
    Skipped,
    Error,
    Bad,
    Good,
}

impl Reason {
    pub fn status(self) -> Status {
        match self {
            Reason::Unknown => Status::Unknown,
            Reason::Skipped => Status::Skipped,
            Reason::NotFound => Status::Error,
            Reason::Valid => Status::Good,
            Reason::Empty
            | Reason::NoMusicFiles
            | Reason::CorruptedFile
            | Reason::BadStructure => Status::Bad,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Unknown => "Unknown",
            Reason::Skipped => "Skipped",
            Reason::NotFound => "NotFound",
            Reason::Empty => "Empty",
            Reason::NoMusicFiles => "NoMusicFiles",
            Reason::CorruptedFile => "CorruptedFile",
            Reason::BadStructure => "BadStructure",
            Reason::Valid => "Valid",
        }
    }
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unknown => "Unknown",
            Status::Skipped => "Skipped",
            Status::Error => "Error",
            Status::Bad => "Bad",
            Status::Good => "Good",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one scanned folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// The folder that was examined.
    pub path: PathBuf,
    /// The folder this outcome is logged against: the artist folder for a
    /// good result, the offending file's folder for a bad structure,
    /// otherwise `path`.
    pub unit_path: PathBuf,
    pub is_valid: bool,
    pub reason: Reason,
    pub details: String,
    pub status: Status,
}

impl ValidationResult {
    fn new(path: &Path, unit_path: PathBuf, reason: Reason, details: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            unit_path,
            is_valid: reason == Reason::Valid,
            reason,
            details: details.into(),
            status: reason.status(),
        }
    }

    fn of_folder(path: &Path, reason: Reason, details: impl Into<String>) -> Self {
        Self::new(path, path.to_path_buf(), reason, details)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Good,
    Bad,
}

impl Validity {
    fn admits(self, status: Status) -> bool {
        match self {
            Validity::Good => status == Status::Good,
            Validity::Bad => status == Status::Bad,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub skip: SkipFilter,
    pub audio_extensions: Vec<String>,
}

impl ValidateOptions {
    pub fn new(skip_paths: &[String], audio_extensions: &[String]) -> Result<Self, Error> {
        Ok(Self {
            skip: SkipFilter::new(skip_paths, &[])?,
            audio_extensions: audio_extensions.to_vec(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Ok(Self {
            skip: SkipFilter::new(&config.skip_paths, &config.blacklist_patterns)?,
            audio_extensions: config.audio_extensions.clone(),
        })
    }
}

/// Per-invocation log state. A unit path is logged at most once as good and
/// at most once as bad within one run.
struct ScanLog<'j> {
    journal: Option<&'j mut Journal>,
    logged_good: AHashSet<PathBuf>,
    logged_bad: AHashSet<PathBuf>,
}

impl<'j> ScanLog<'j> {
    fn new(journal: Option<&'j mut Journal>) -> Self {
        Self {
            journal,
            logged_good: AHashSet::new(),
            logged_bad: AHashSet::new(),
        }
    }

    fn record(&mut self, result: &ValidationResult) {
        let Some(journal) = self.journal.as_deref_mut() else {
            return;
        };

        let first_time = match result.status {
            Status::Good => self.logged_good.insert(result.unit_path.clone()),
            Status::Bad | Status::Error => self.logged_bad.insert(result.unit_path.clone()),
            Status::Skipped | Status::Unknown => false,
        };
        if !first_time {
            return;
        }

        if let Err(e) = journal.append(&LogEntry::validation(result, "validate")) {
            error!("Failed to log result for {}: {}", result.unit_path.display(), e);
        }
    }
}

pub struct Validator<'a> {
    tags: &'a dyn TagLibrary,
    options: &'a ValidateOptions,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> Validator<'a> {
    pub fn new(tags: &'a dyn TagLibrary, options: &'a ValidateOptions) -> Self {
        Self {
            tags,
            options,
            reporter: &SilentReporter,
        }
    }

    pub fn with_reporter(mut self, reporter: &'a dyn ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn tags(&self) -> &'a dyn TagLibrary {
        self.tags
    }

    pub fn options(&self) -> &'a ValidateOptions {
        self.options
    }

    pub fn reporter(&self) -> &'a dyn ProgressReporter {
        self.reporter
    }

    /// Validate a single folder and refuse anything that is not good.
    pub fn require_good(&self, folder: &Path) -> Result<ValidationResult, Error> {
        let result = self.validate_folder(folder);
        if result.status == Status::Good {
            Ok(result)
        } else {
            Err(Error::NotGood {
                path: folder.to_path_buf(),
                reason: format!("{} ({})", result.reason, result.details),
            })
        }
    }

    /// Classify `start` and every folder beneath it.
    ///
    /// Fails only when `start` itself is unusable; every per-folder problem
    /// becomes a result.
    pub fn validate_detailed(
        &self,
        start: &Path,
        journal: Option<&mut Journal>,
    ) -> Result<Vec<ValidationResult>, Error> {
        let folders = list_directories(start)?;
        let scan_start = Instant::now();
        self.reporter.on_scan_start(folders.len());

        let mut log = ScanLog::new(journal);
        let mut results = Vec::with_capacity(folders.len());
        let (mut good, mut bad) = (0, 0);

        for (index, folder) in folders.iter().enumerate() {
            let result = self.validate_folder(folder);
            debug!(
                "{} [{}] {}",
                folder.display(),
                result.status,
                result.details
            );
            match result.status {
                Status::Good => good += 1,
                Status::Bad | Status::Error => bad += 1,
                _ => {}
            }
            log.record(&result);
            self.reporter
                .on_folder_done(index + 1, &folder.to_string_lossy());
            results.push(result);
        }

        self.reporter
            .on_scan_complete(good, bad, scan_start.elapsed().as_secs_f64());
        Ok(results)
    }

    /// Legacy projection: distinct unit paths of only good or only bad
    /// results, in scan order.
    pub fn validate_simple(
        &self,
        start: &Path,
        validity: Validity,
        journal: Option<&mut Journal>,
    ) -> Result<Vec<PathBuf>, Error> {
        let results = self.validate_detailed(start, journal)?;
        Ok(project_paths(&results, validity))
    }

    pub fn validate_folder(&self, folder: &Path) -> ValidationResult {
        if let Some(details) = self.options.skip.excluded(folder) {
            return ValidationResult::of_folder(folder, Reason::Skipped, details);
        }

        if !folder.is_dir() {
            return ValidationResult::of_folder(
                folder,
                Reason::NotFound,
                "Folder no longer exists",
            );
        }

        let (subfolders, files) = match read_children(folder) {
            Ok(children) => children,
            Err(e) => {
                warn!("Unable to read {}: {}", folder.display(), e);
                return ValidationResult::of_folder(
                    folder,
                    Reason::NotFound,
                    format!("Unable to read folder: {}", e),
                );
            }
        };

        if subfolders.is_empty() && files.is_empty() {
            return ValidationResult::of_folder(folder, Reason::Empty, "Folder has no entries");
        }

        let album_folders: Vec<&PathBuf> = subfolders
            .iter()
            .filter(|dir| is_album_folder(dir) && self.options.skip.excluded(dir).is_none())
            .collect();

        let representative = if album_folders.is_empty() {
            match first_audio_file(&files, &self.options.audio_extensions) {
                Some(file) => file.clone(),
                None => {
                    return ValidationResult::of_folder(
                        folder,
                        Reason::NoMusicFiles,
                        format!("No audio files among {} files", files.len()),
                    );
                }
            }
        } else {
            match album_folders
                .iter()
                .find_map(|album| self.audio_in_album(album))
            {
                Some(file) => file,
                None => {
                    return ValidationResult::of_folder(
                        folder,
                        Reason::NoMusicFiles,
                        format!(
                            "None of the {} album folders contain audio files",
                            album_folders.len()
                        ),
                    );
                }
            }
        };

        if let Err(e) = self.tags.probe(&representative) {
            return ValidationResult::of_folder(
                folder,
                Reason::CorruptedFile,
                format!("Unable to open {}: {}", representative.display(), e),
            );
        }

        match layout::match_layout(&representative) {
            Some(matched) => {
                let layout_name = match matched.layout {
                    Layout::Flat => "album",
                    Layout::Disc => "multi-disc album",
                };
                ValidationResult::new(
                    folder,
                    matched.artist_dir.clone(),
                    Reason::Valid,
                    format!(
                        "Matches {} layout for artist '{}'",
                        layout_name, matched.artist
                    ),
                )
            }
            None => {
                let unit = representative
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| folder.to_path_buf());
                ValidationResult::new(
                    folder,
                    unit,
                    Reason::BadStructure,
                    format!(
                        "'{}' does not follow Artist/YYYY - Album/NN - Title",
                        representative.display()
                    ),
                )
            }
        }
    }

    /// First audio file stored directly in an album folder.
    fn audio_in_album(&self, album: &Path) -> Option<PathBuf> {
        let (_, files) = match read_children(album) {
            Ok(children) => children,
            Err(e) => {
                warn!("Unable to read {}: {}", album.display(), e);
                return None;
            }
        };
        first_audio_file(&files, &self.options.audio_extensions).cloned()
    }
}

pub fn is_album_folder(path: &Path) -> bool {
    path.file_name()
        .map(|name| ALBUM_FOLDER.is_match(&name.to_string_lossy()))
        .unwrap_or(false)
}

pub fn project_paths(results: &[ValidationResult], validity: Validity) -> Vec<PathBuf> {
    let mut seen = AHashSet::new();
    results
        .iter()
        .filter(|r| validity.admits(r.status))
        .filter(|r| seen.insert(r.unit_path.clone()))
        .map(|r| r.unit_path.clone())
        .collect()
}
