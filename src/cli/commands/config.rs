//! Config Command
//!
//! Manage Documate configuration.
//!
//! Usage:
//!   documate config show [-g] [-f toml|json|yaml]
//!   documate config path
//!   documate config init [-g] [--force]

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

pub fn show(global: bool, format: &str) -> Result<()> {
    if !global {
        return ConfigLoader::show_config(format);
    }

    let out = Output::new();
    match ConfigLoader::global_config_path() {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(&path)?;
            if format != "toml" {
                out.info(&format!("Global config: {}", path.display()));
            }
            out.body(&content);
        }
        Some(_) => {
            out.warning("No global config found.");
            out.info("Run 'documate config init --global' to create one.");
        }
        None => out.error("Cannot determine global config directory."),
    }
    Ok(())
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let out = Output::new();
    if global {
        let dir = ConfigLoader::init_global(force)?;
        out.success("Initialized global configuration");
        out.field("Directory", &dir.display().to_string());
    } else {
        let dir = ConfigLoader::init_project(force)?;
        out.success("Initialized project configuration");
        out.field("Directory", &dir.display().to_string());
        out.field(
            "Config",
            &ConfigLoader::project_config_path().display().to_string(),
        );
    }
    Ok(())
}
