use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

use crate::error::Error;

/// Eagerly list the starting folder and every folder beneath it, parents
/// before children, siblings in name order. Entries that cannot be read are
/// logged and left out; only an unusable starting path is an error.
pub fn list_directories(start: &Path) -> Result<Vec<PathBuf>, Error> {
    if start.as_os_str().is_empty() {
        return Err(Error::InvalidArgument("starting path is empty".to_string()));
    }
    if !start.is_dir() {
        return Err(Error::StartPathNotFound(start.to_path_buf()));
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(start).follow_links(false).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => dirs.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                error!("Error walking directory {}: {}", path, err);
            }
        }
    }

    debug!("Enumerated {} folders under {}", dirs.len(), start.display());
    Ok(dirs)
}

/// Immediate children of a folder, split into (subfolders, files), each in
/// name order.
pub fn read_children(dir: &Path) -> io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut folders = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            folders.push(path);
        } else {
            files.push(path);
        }
    }

    folders.sort();
    files.sort();
    Ok((folders, files))
}

pub fn has_audio_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
}

/// First audio file among `files`, scanning extension by extension so that
/// the configured order decides which file represents the folder.
pub fn first_audio_file<'a>(files: &'a [PathBuf], extensions: &[String]) -> Option<&'a PathBuf> {
    extensions.iter().find_map(|ext| {
        files.iter().find(|file| {
            file.extension()
                .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        })
    })
}

/// Audio files anywhere beneath `dir`, in walk order.
pub fn audio_files_recursive(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_audio_extension(p, extensions))
        .collect()
}

pub fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
