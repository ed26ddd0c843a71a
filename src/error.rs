use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Tag error on {path}: {message}")]
    Tag { path: PathBuf, message: String },

    #[error("Journal error: {0}")]
    Journal(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid blacklist pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Starting path does not exist: {0}")]
    StartPathNotFound(PathBuf),

    #[error("Folder {path} did not validate as good: {reason}")]
    NotGood { path: PathBuf, reason: String },
}

impl Error {
    pub fn tag(path: &std::path::Path, message: impl Into<String>) -> Self {
        Error::Tag {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
