//! Configuration System
//!
//! Named planner configurations, process-wide tuning, planner-data storage and
//! logging settings, loaded from layered TOML files and environment variables.

use crate::context::TuningParameters;
use crate::logging::{validate_logging_config, LoggingConfig};
use crate::params::{parse_flag, PlannerParams};
use crate::planner::allocator::{
    KEY_LOAD_PLANNER_DATA, KEY_MULTI_QUERY_PLANNING_ENABLED, KEY_PLANNER_DATA_PATH,
    KEY_STORE_PLANNER_DATA,
};
use crate::context::{
    KEY_ENFORCE_CONSTRAINED_STATE_SPACE, KEY_ENFORCE_JOINT_MODEL_STATE_SPACE,
    KEY_LONGEST_VALID_SEGMENT_FRACTION,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::{from_toml_str, ConfigLoader};

/// Boolean-valued keys understood by the allocator and the orchestrator
const FLAG_KEYS: &[&str] = &[
    KEY_MULTI_QUERY_PLANNING_ENABLED,
    KEY_LOAD_PLANNER_DATA,
    KEY_STORE_PLANNER_DATA,
    KEY_ENFORCE_JOINT_MODEL_STATE_SPACE,
    KEY_ENFORCE_CONSTRAINED_STATE_SPACE,
];

/// A named, reusable planning setup such as `arm[RRTConnect]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfiguration {
    pub name: String,

    /// Joint model group the configuration plans for
    pub group: String,

    /// Planner type, allocator directives and planner parameters
    #[serde(default)]
    pub config: PlannerParams,
}

impl PlannerConfiguration {
    pub fn new(name: &str, group: &str) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            config: PlannerParams::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.config.insert(key.to_string(), value.to_string());
        self
    }

    /// Validate a single configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.group.trim().is_empty() {
            return Err("group cannot be empty".to_string());
        }

        for key in FLAG_KEYS {
            if let Some(value) = self.config.get(*key) {
                if parse_flag(value).is_none() {
                    return Err(format!("'{}' must be a boolean, got '{}'", key, value));
                }
            }
        }

        let flag_set = |key: &str| {
            self.config
                .get(key)
                .and_then(|v| parse_flag(v))
                .unwrap_or(false)
        };
        let has_path = self
            .config
            .get(KEY_PLANNER_DATA_PATH)
            .map_or(false, |p| !p.trim().is_empty());
        for key in [KEY_LOAD_PLANNER_DATA, KEY_STORE_PLANNER_DATA] {
            if flag_set(key) && !has_path {
                return Err(format!("'{}' requires '{}'", key, KEY_PLANNER_DATA_PATH));
            }
        }

        if let Some(value) = self.config.get(KEY_LONGEST_VALID_SEGMENT_FRACTION) {
            match value.trim().parse::<f64>() {
                Ok(fraction) if fraction > 0.0 && fraction <= 1.0 => {}
                _ => {
                    return Err(format!(
                        "'{}' must be a number in (0, 1], got '{}'",
                        KEY_LONGEST_VALID_SEGMENT_FRACTION, value
                    ))
                }
            }
        }

        Ok(())
    }
}

/// Configurations by name
pub type PlannerConfigurationMap = BTreeMap<String, PlannerConfiguration>;

/// Planner-data storage settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory relative `planner_data_path` values are resolved against
    #[serde(default)]
    pub default_planner_data_dir: Option<PathBuf>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanCacheConfig {
    #[serde(default)]
    pub planner_configs: Vec<PlannerConfiguration>,

    /// Process-wide tuning applied to every context
    #[serde(default)]
    pub tuning: TuningParameters,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    PlannerConfig(String, String),
    Tuning(String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::PlannerConfig(name, msg) => {
                write!(f, "Planner configuration '{}': {}", name, msg)
            }
            ValidationError::Tuning(msg) => write!(f, "Tuning: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PlanCacheConfig {
    /// Named configurations keyed by name. A later entry with the same name wins.
    pub fn planner_configurations(&self) -> PlannerConfigurationMap {
        self.planner_configs
            .iter()
            .map(|pc| (pc.name.clone(), pc.clone()))
            .collect()
    }

    /// Validate the entire configuration, reporting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for pc in &self.planner_configs {
            if pc.name.trim().is_empty() {
                errors.push(ValidationError::PlannerConfig(
                    pc.name.clone(),
                    "name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(pc.name.as_str()) {
                errors.push(ValidationError::PlannerConfig(
                    pc.name.clone(),
                    "defined more than once".to_string(),
                ));
            }
            if let Err(e) = pc.validate() {
                errors.push(ValidationError::PlannerConfig(pc.name.clone(), e));
            }
        }

        if let Err(e) = self.tuning.validate() {
            errors.push(ValidationError::Tuning(e));
        }

        if let Some(dir) = &self.storage.default_planner_data_dir {
            if dir.as_os_str().is_empty() {
                errors.push(ValidationError::Storage(
                    "default_planner_data_dir cannot be empty".to_string(),
                ));
            }
        }

        if let Err(e) = validate_logging_config(&self.logging) {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
