//! Output formatting for command results

pub mod console;
pub mod formatter;
pub mod json;
mod table;

pub use console::ConsoleFormatter;
pub use formatter::{OutputFormatter, formatter_for};
pub use json::JsonFormatter;
