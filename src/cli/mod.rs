//! Command-line surface: one handler per subcommand plus console output.

pub mod commands;
pub mod ui;

pub use ui::Output;
