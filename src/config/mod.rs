//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (platform config dir)
//! 3. Project config (.documate/config.toml)
//! 4. Environment variables (DOCUMATE_*, plus provider selection variables)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
