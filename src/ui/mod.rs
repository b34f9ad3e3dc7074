//! Terminal front end: prompts, statistics reports and the raw-data pager.

pub mod console;
pub mod pager;
pub mod prompt;
pub mod report;

/// Separator printed after each completed section.
pub const RULE: &str = "----------------------------------------";
