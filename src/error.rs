//! Error types for planning context management.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status reported back for a context request.
///
/// Every failure path of the orchestrator collapses onto exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    Success,
    /// Generic failure (library-level configuration errors, unknown planner or space type)
    Failure,
    InvalidGroupName,
    NoPlanningScene,
    NoPlannerConfiguration,
    NoRepresentation,
    InvalidPathConstraints,
    InvalidGoalConstraints,
}

impl ErrorCode {
    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorCode::Success => "SUCCESS",
            ErrorCode::Failure => "FAILURE",
            ErrorCode::InvalidGroupName => "INVALID_GROUP_NAME",
            ErrorCode::NoPlanningScene => "NO_PLANNING_SCENE",
            ErrorCode::NoPlannerConfiguration => "NO_PLANNER_CONFIGURATION",
            ErrorCode::NoRepresentation => "NO_REPRESENTATION",
            ErrorCode::InvalidPathConstraints => "INVALID_PATH_CONSTRAINTS",
            ErrorCode::InvalidGoalConstraints => "INVALID_GOAL_CONSTRAINTS",
        };
        f.write_str(label)
    }
}

/// Planner data persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No planner data path configured")]
    MissingPath,

    #[error("Planner data not found at {0}")]
    NotFound(std::path::PathBuf),

    #[error("Unsupported planner data format version {found} (expected {expected})")]
    FormatVersion { expected: u32, found: u32 },

    #[error("Failed to encode planner data: {0}")]
    Encode(String),

    #[error("Failed to decode planner data: {0}")]
    Decode(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised by an algorithm instance or while building one
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Unknown parameter '{name}' for planner '{planner}'")]
    UnknownParameter { planner: String, name: String },

    #[error("Invalid value '{value}' for parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid value '{value}' for allocator directive '{key}' (expected a boolean)")]
    InvalidDirective { key: String, value: String },

    #[error("Planner setup failed: {0}")]
    Setup(String),
}

/// Context orchestration errors
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("No group specified to plan for")]
    InvalidGroupName,

    #[error("No planning scene supplied as input")]
    NoPlanningScene,

    #[error("Cannot find planning configuration for group '{0}'")]
    NoPlannerConfiguration(String),

    #[error("Unknown planner: '{0}'")]
    UnknownPlanner(String),

    #[error("State space factory of type '{0}' was not found")]
    UnknownStateSpace(String),

    #[error("There are no known state spaces that can represent the given planning problem for group '{0}'")]
    NoRepresentation(String),

    #[error("Invalid path constraints: {0}")]
    InvalidPathConstraints(String),

    #[error("Invalid goal constraints: {0}")]
    InvalidGoalConstraints(String),

    #[error("Planner configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ContextError {
    /// Status code reported for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            ContextError::InvalidGroupName => ErrorCode::InvalidGroupName,
            ContextError::NoPlanningScene => ErrorCode::NoPlanningScene,
            ContextError::NoPlannerConfiguration(_) => ErrorCode::NoPlannerConfiguration,
            ContextError::NoRepresentation(_) => ErrorCode::NoRepresentation,
            ContextError::InvalidPathConstraints(_) => ErrorCode::InvalidPathConstraints,
            ContextError::InvalidGoalConstraints(_) => ErrorCode::InvalidGoalConstraints,
            ContextError::UnknownPlanner(_)
            | ContextError::UnknownStateSpace(_)
            | ContextError::ConfigurationFailed(_)
            | ContextError::Planner(_)
            | ContextError::Config(_) => ErrorCode::Failure,
        }
    }
}

impl From<config::ConfigError> for ContextError {
    fn from(err: config::ConfigError) -> Self {
        ContextError::Config(err.to_string())
    }
}
