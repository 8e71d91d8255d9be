//! Infrastructure adapters for the clipboard, configuration, and logging.

pub mod clipboard;
pub mod config;
pub mod logging;
