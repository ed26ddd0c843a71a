pub mod filter;
pub mod walk;

pub use filter::SkipFilter;
pub use walk::{audio_files_recursive, first_audio_file, list_directories, read_children};
