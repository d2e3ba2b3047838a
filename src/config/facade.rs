//! Config loading entry point

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::PlanCacheConfig;
use config::{ConfigError, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Loads [`PlanCacheConfig`] from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): built-in defaults, global file,
    /// `config/config.toml`, `config/{PLANCACHE_ENV}.toml`, `PLANCACHE__*`
    /// environment variables.
    pub fn load(workspace_root: &Path) -> Result<PlanCacheConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = builder.add_source(
            Environment::with_prefix("PLANCACHE")
                .separator("__")
                .try_parsing(true),
        );
        builder.build()?.try_deserialize()
    }

    /// Load configuration from a single file on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<PlanCacheConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only
    pub fn default() -> PlanCacheConfig {
        PlanCacheConfig::default()
    }

    /// Path of the global configuration file, if a home directory is known
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}

/// Build an in-memory configuration from TOML text
pub fn from_toml_str(text: &str) -> Result<PlanCacheConfig, ConfigError> {
    merge_policy::builder_with_defaults()?
        .add_source(File::from_str(text, FileFormat::Toml))
        .build()?
        .try_deserialize()
}
