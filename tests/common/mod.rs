#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use music_tidy::classify::ValidateOptions;
use music_tidy::{AppConfig, Error, TagLibrary, TrackTags};

/// Tag library over fake audio: any file opens unless its content starts
/// with `CORRUPT`, writes fail for content starting with `READONLY`.
#[derive(Default)]
pub struct FakeTags {
    pub probed: Mutex<Vec<PathBuf>>,
    pub written: Mutex<Vec<(PathBuf, TrackTags)>>,
}

impl FakeTags {
    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }

    pub fn written(&self) -> Vec<(PathBuf, TrackTags)> {
        self.written.lock().unwrap().clone()
    }
}

impl TagLibrary for FakeTags {
    fn probe(&self, path: &Path) -> Result<(), Error> {
        self.probed.lock().unwrap().push(path.to_path_buf());
        if fs::read(path)?.starts_with(b"CORRUPT") {
            return Err(Error::tag(path, "no valid frames"));
        }
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<TrackTags, Error> {
        fs::metadata(path)?;
        Ok(TrackTags::default())
    }

    fn write(&self, path: &Path, tags: &TrackTags) -> Result<(), Error> {
        if fs::read(path)?.starts_with(b"READONLY") {
            return Err(Error::tag(path, "file is read only"));
        }
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), tags.clone()));
        Ok(())
    }
}

/// Write `contents` to `path`, creating parent folders.
pub fn touch(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

pub fn default_options() -> ValidateOptions {
    ValidateOptions::from_config(&AppConfig::default()).unwrap()
}

pub fn exts() -> Vec<String> {
    AppConfig::default().audio_extensions
}
