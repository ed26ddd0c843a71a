pub mod analyze;
pub mod layout;
pub mod validate;

pub use analyze::{analyze, analyze_tree, Confidence, StructureAnalysis, StructureType};
pub use layout::{match_layout, LayoutMatch};
pub use validate::{Reason, Status, ValidateOptions, ValidationResult, Validator, Validity};
