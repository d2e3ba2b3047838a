//! CLI: parse, route and presentation for the `plancache` binary.
//!
//! The binary only inspects configuration; it never plans.

use crate::config::{ConfigLoader, PlanCacheConfig, PlannerConfiguration};
use crate::context::{
    KEY_ENFORCE_CONSTRAINED_STATE_SPACE, KEY_ENFORCE_JOINT_MODEL_STATE_SPACE, KEY_PLANNER_TYPE,
};
use crate::error::ContextError;
use crate::manager::resolve_configuration;
use crate::params::parse_flag;
use crate::planner::allocator::KEY_MULTI_QUERY_PLANNING_ENABLED;
use crate::planner::DEFAULT_PLANNER_ID;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;
use std::path::PathBuf;

/// Plancache CLI - inspect planning context configuration
#[derive(Parser)]
#[command(name = "plancache")]
#[command(about = "Inspect and validate planning context configuration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate the configuration
    Check,
    /// List named planner configurations
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show which named configuration a request would use
    Resolve {
        /// Joint model group of the request
        #[arg(long)]
        group: String,
        /// Planner id of the request
        #[arg(long, default_value = "")]
        planner_id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Loaded configuration the commands run against
pub struct RunContext {
    config: PlanCacheConfig,
}

impl RunContext {
    pub fn new(workspace: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ContextError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(&path)?,
            None => ConfigLoader::load(&workspace)?,
        };
        Ok(Self { config })
    }

    pub fn from_config(config: PlanCacheConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanCacheConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ContextError> {
        match command {
            Commands::Check => self.check(),
            Commands::List { format } => match format.as_str() {
                "json" => Ok(format_list_json(&self.config)),
                "text" => Ok(format_list_text(&self.config)),
                other => Err(invalid_format(other)),
            },
            Commands::Resolve {
                group,
                planner_id,
                format,
            } => self.resolve(group, planner_id, format),
        }
    }

    fn check(&self) -> Result<String, ContextError> {
        match self.config.validate() {
            Ok(()) => Ok(format!(
                "Configuration is valid: {} planner configuration(s)",
                self.config.planner_configs.len()
            )),
            Err(errors) => {
                let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
                Err(ContextError::Config(format!(
                    "Configuration validation failed:\n{}",
                    lines.join("\n")
                )))
            }
        }
    }

    fn resolve(&self, group: &str, planner_id: &str, format: &str) -> Result<String, ContextError> {
        if group.is_empty() {
            return Err(ContextError::InvalidGroupName);
        }
        let configs = self.config.planner_configurations();
        let resolved = resolve_configuration(&configs, group, planner_id)?;
        let pc = resolved.configuration;
        match format {
            "json" => {
                let out = json!({
                    "name": pc.name,
                    "group": pc.group,
                    "planner": planner_type(pc),
                    "fell_back": resolved.fell_back,
                    "config": pc.config,
                });
                Ok(serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string()))
            }
            "text" => {
                let mut output = format!("Configuration: {}\n", pc.name);
                output.push_str(&format!("Group: {}\n", pc.group));
                output.push_str(&format!("Planner: {}\n", planner_type(pc)));
                if resolved.fell_back {
                    output.push_str(&format!(
                        "Note: no configuration for planner '{}', using the group default\n",
                        planner_id
                    ));
                }
                Ok(output)
            }
            other => Err(invalid_format(other)),
        }
    }
}

fn invalid_format(format: &str) -> ContextError {
    ContextError::Config(format!(
        "Invalid output format: {} (must be 'text' or 'json')",
        format
    ))
}

fn planner_type(pc: &PlannerConfiguration) -> &str {
    pc.config
        .get(KEY_PLANNER_TYPE)
        .map(String::as_str)
        .unwrap_or(DEFAULT_PLANNER_ID)
}

fn flag_column(pc: &PlannerConfiguration, key: &str) -> &'static str {
    match pc.config.get(key).map(|v| parse_flag(v)) {
        Some(Some(true)) => "yes",
        Some(None) => "invalid",
        _ => "",
    }
}

fn space_column(pc: &PlannerConfiguration) -> &'static str {
    if flag_column(pc, KEY_ENFORCE_CONSTRAINED_STATE_SPACE) == "yes" {
        "constrained"
    } else if flag_column(pc, KEY_ENFORCE_JOINT_MODEL_STATE_SPACE) == "yes" {
        "joint"
    } else {
        "auto"
    }
}

pub fn format_list_text(config: &PlanCacheConfig) -> String {
    let configs = config.planner_configurations();
    if configs.is_empty() {
        return "No planner configurations found.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Group", "Planner", "Multi-query", "State space"]);
    for pc in configs.values() {
        table.add_row(vec![
            pc.name.as_str(),
            pc.group.as_str(),
            planner_type(pc),
            flag_column(pc, KEY_MULTI_QUERY_PLANNING_ENABLED),
            space_column(pc),
        ]);
    }
    format!("{}\n\nTotal: {} configuration(s)", table, configs.len())
}

pub fn format_list_json(config: &PlanCacheConfig) -> String {
    let configs = config.planner_configurations();
    let list: Vec<_> = configs
        .values()
        .map(|pc| {
            json!({
                "name": pc.name,
                "group": pc.group,
                "planner": planner_type(pc),
                "config": pc.config,
            })
        })
        .collect();
    let out = json!({ "planner_configs": list, "total": configs.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}
