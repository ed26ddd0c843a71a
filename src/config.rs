use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::journal::LogFormat;

/// Extension order matters: the first extension with a match wins when
/// picking a folder's representative file.
pub const DEFAULT_AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "wav", "flac", "aac", "ogg", "wma"];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub library_root: Option<String>,
    pub destination_root: Option<String>,
    pub skip_paths: Vec<String>,
    pub blacklist_patterns: Vec<String>,
    pub audio_extensions: Vec<String>,
    pub journal_path: String,
    pub journal_format: LogFormat,
    pub quiet: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library_root: None,
            destination_root: None,
            skip_paths: Vec::new(),
            blacklist_patterns: Vec::new(),
            audio_extensions: DEFAULT_AUDIO_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            journal_path: "music-tidy.jsonl".to_string(),
            journal_format: LogFormat::Json,
            quiet: false,
        }
    }
}

/// Load `Config.toml` (optional) from the working directory, then apply
/// `MUSIC_TIDY_*` environment overrides.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("MUSIC_TIDY"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Load configuration from an explicit file instead of the working directory.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::from(path).required(true))
        .add_source(Environment::with_prefix("MUSIC_TIDY"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Remove directories that are subdirectories of other directories in the list.
pub fn non_overlapping_directories(dirs: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for dir in dirs {
        let dir_path = Path::new(&dir);
        if result.iter().any(|kept| dir_path.starts_with(kept)) {
            continue;
        }
        result.retain(|kept| !Path::new(kept).starts_with(dir_path));
        result.push(dir);
    }

    result
}
