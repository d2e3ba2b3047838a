//! Planner configuration files inside a workspace
//!
//! `config/config.toml` is the base layer; `config/{PLANCACHE_ENV}.toml`
//! overrides it for one deployment (robot cell, simulation, ...).

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_VAR: &str = "PLANCACHE_ENV";
pub const DEFAULT_ENV: &str = "development";

/// Active environment name; unset or blank means [`DEFAULT_ENV`]
pub fn environment_name() -> String {
    std::env::var(ENV_VAR)
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_ENV.to_string())
}

/// Workspace files in precedence order, lowest first
pub fn layer_paths(workspace_root: &Path) -> Vec<PathBuf> {
    let config_dir = workspace_root.join("config");
    vec![
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", environment_name())),
    ]
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder;
    for path in layer_paths(workspace_root) {
        if !path.is_file() {
            debug!(path = %path.display(), "Workspace config layer not present");
            continue;
        }
        debug!(path = %path.display(), "Adding workspace config layer");
        builder = builder.add_source(File::from(path).format(FileFormat::Toml));
    }
    Ok(builder)
}
