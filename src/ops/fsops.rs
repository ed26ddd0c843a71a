use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Error;

/// First free variant of `path`: the path itself, then `name (2)`,
/// `name (3)`, ... with any extension kept after the suffix.
pub fn unique_destination(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let is_dir = path.is_dir();
    let (stem, ext) = match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) if !is_dir => (
            stem.to_string_lossy().into_owned(),
            Some(ext.to_string_lossy().into_owned()),
        ),
        _ => (
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            None,
        ),
    };

    let mut n = 2;
    loop {
        let name = match &ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Rename `from` to `to`, creating `to`'s parent first.
pub fn move_path(from: &Path, to: &Path) -> Result<(), Error> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(from, to)?;
    debug!("Moved {} -> {}", from.display(), to.display());
    Ok(())
}

/// Remove `dir` if it has no entries left. Returns whether it was removed.
pub fn remove_if_empty(dir: &Path) -> Result<bool, Error> {
    if !dir.is_dir() {
        return Ok(false);
    }
    if fs::read_dir(dir)?.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir(dir)?;
    info!("Removed empty folder {}", dir.display());
    Ok(true)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub moved: usize,
    /// Entries that landed under a numbered name because of a collision.
    pub renamed: usize,
    pub failed: usize,
    pub source_removed: bool,
}

impl MergeReport {
    fn absorb(&mut self, other: MergeReport) {
        self.moved += other.moved;
        self.renamed += other.renamed;
        self.failed += other.failed;
    }
}

/// Move every entry of `src` into `dst`. Colliding folders are merged
/// recursively, colliding files are kept under a numbered name. `src` is
/// removed once it is empty.
pub fn merge_folders(src: &Path, dst: &Path, dry_run: bool) -> Result<MergeReport, Error> {
    if !src.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "merge source is not a folder: {}",
            src.display()
        )));
    }
    if dst.starts_with(src) {
        return Err(Error::InvalidArgument(format!(
            "cannot merge {} into its own subfolder {}",
            src.display(),
            dst.display()
        )));
    }

    let mut report = MergeReport::default();
    if !dry_run {
        fs::create_dir_all(dst)?;
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(src)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();

    for entry in entries {
        let Some(name) = entry.file_name() else {
            continue;
        };
        let target = dst.join(name);

        if target.is_dir() && entry.is_dir() {
            match merge_folders(&entry, &target, dry_run) {
                Ok(inner) => report.absorb(inner),
                Err(e) => {
                    warn!("Failed to merge {}: {}", entry.display(), e);
                    report.failed += 1;
                }
            }
            continue;
        }

        let destination = unique_destination(&target);
        if destination != target {
            report.renamed += 1;
        }

        if dry_run {
            info!("Would move {} -> {}", entry.display(), destination.display());
            report.moved += 1;
            continue;
        }

        match move_path(&entry, &destination) {
            Ok(()) => report.moved += 1,
            Err(e) => {
                warn!("Failed to move {}: {}", entry.display(), e);
                report.failed += 1;
            }
        }
    }

    if !dry_run {
        report.source_removed = remove_if_empty(src)?;
    }
    Ok(report)
}
