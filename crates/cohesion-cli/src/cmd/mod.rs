pub mod analyze;
pub mod bin;
pub mod completions;
