pub mod fsops;
pub mod relocate;
pub mod replay;
pub mod tagger;

pub use fsops::{merge_folders, unique_destination, MergeReport};
pub use relocate::{move_library, move_unit, MoveOutcome, MoveReport};
pub use replay::{replay, ReplayAction, ReplayKind, ReplayReport};
pub use tagger::{tag_library, tag_unit, TagOptions, TagReport};
