pub mod classify;
pub mod config;
pub mod error;
pub mod journal;
pub mod ops;
pub mod progress;
pub mod scanner;
pub mod tags;

pub use config::AppConfig;
pub use error::Error;
pub use journal::{Journal, LogEntry, LogFormat};
pub use progress::{ProgressReporter, SilentReporter};
pub use tags::{LoftyTags, TagLibrary, TrackTags};
