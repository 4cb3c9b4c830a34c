//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (<config dir>/documate/config.toml)
//! 3. Project config (.documate/config.toml)
//! 4. Environment variables (DOCUMATE_* prefix, `__` separates sections)
//! 5. Provider selection variables (CHAT_PROVIDER, EMBEDDING_PROVIDER, ...)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{DocumateError, Result};

/// Plain environment variables honoured for compatibility, mapped to their
/// config keys
const ENV_ALIASES: &[(&str, &str)] = &[
    ("CHAT_PROVIDER", "llm.provider"),
    ("EMBEDDING_PROVIDER", "embedding.provider"),
    ("CLONE_PATH", "paths.clone_root"),
    ("VECTOR_DB_PATH", "paths.vector_root"),
    ("WIKI_PATH", "paths.wiki_root"),
];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// .env → defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(DocumateError::Config(format!("Failed to read .env: {}", e)));
            }
        }

        let config: Config = Self::figment(Self::global_config_path(), &Self::project_config_path())
            .extract()
            .map_err(|e| DocumateError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Build the layered figment without extracting it
    pub fn figment(global: Option<PathBuf>, project: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // DOCUMATE_LLM__MODEL -> llm.model
        figment = figment.merge(Env::prefixed("DOCUMATE_").split("__"));

        for (var, key) in ENV_ALIASES {
            let key: &'static str = key;
            figment = figment.merge(Env::raw().only(&[*var]).map(move |_| key.into()));
        }

        figment
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| DocumateError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (platform config dir + documate)
    pub fn global_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "documate").map(|d| d.config_dir().to_path_buf())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".documate")
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Print the effective configuration as toml, json or yaml
    pub fn show_config(format: &str) -> Result<()> {
        let config = Self::load()?;

        let rendered = match format {
            "json" => serde_json::to_string_pretty(&config)?,
            "yaml" => serde_yaml::to_string(&config)?,
            _ => toml::to_string_pretty(&config).map_err(|e| DocumateError::Config(e.to_string()))?,
        };
        println!("{}", rendered);
        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a project config and a default file filter document
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        fs::create_dir_all(&project_dir)?;

        let config_path = Self::project_config_path();
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created project config: {}", config_path.display());
        } else {
            info!("Project config exists: {}", config_path.display());
        }

        let filters_path = Config::default().paths.filters_file;
        if !filters_path.exists() || force {
            if let Some(parent) = filters_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&filters_path, Self::default_filters())?;
            info!("Created file filters: {}", filters_path.display());
        }

        Ok(project_dir)
    }

    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            DocumateError::Config("Cannot determine global config directory".to_string())
        })?;
        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created global config: {}", config_path.display());
        }
        Ok(global_dir)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn default_project_config() -> String {
        r#"# Documate Configuration
# Provider API keys are read from the environment (GOOGLE_API_KEY, OPENAI_API_KEY,
# AZURE_TENANT_ID / AZURE_CLIENT_ID / AZURE_CERTIFICATE_PATH).

version = "1.0"

[paths]
clone_root = "cloned_repos"
vector_root = "vector_stores"
wiki_root = "wikis"
filters_file = "configs/file_filters.json"

[llm]
provider = "google"
temperature = 0.1

[embedding]
provider = "google"

[indexing]
chunk_size = 2000
chunk_overlap = 200
"#
        .to_string()
    }

    fn default_filters() -> String {
        r#"{
  "allowed_extensions": [".py", ".rs", ".js", ".ts", ".tsx", ".go", ".java", ".md", ".toml", ".json", ".yaml", ".yml"],
  "excluded_patterns": ["*/node_modules/*", "*/.git/*", "*/target/*", "*/dist/*", "*/__pycache__/*", "*/.venv/*"]
}
"#
        .to_string()
    }
}
