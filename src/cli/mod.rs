//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, configuration
//! commands, and the study command runners.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod practice;
pub mod presenter;

// Re-export commonly used types
pub use app::{run, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction};
pub use presenter::Presenter;
