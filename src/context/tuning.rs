//! Process-wide tuning applied to every context handed out.

use serde::{Deserialize, Serialize};

/// Segment lengths at or below this are treated as "not configured"
pub const SEGMENT_LENGTH_EPSILON: f64 = f64::EPSILON;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningParameters {
    /// Maximum number of goal states sampled
    #[serde(default = "default_max_goal_samples")]
    pub max_goal_samples: u32,

    /// Attempts to sample a valid state before giving up
    #[serde(default = "default_max_state_sampling_attempts")]
    pub max_state_sampling_attempts: u32,

    /// Attempts to sample a valid goal before giving up
    #[serde(default = "default_max_goal_sampling_attempts")]
    pub max_goal_sampling_attempts: u32,

    #[serde(default = "default_max_planning_threads")]
    pub max_planning_threads: u32,

    /// Only applied when greater than [`SEGMENT_LENGTH_EPSILON`]
    #[serde(default)]
    pub max_solution_segment_length: f64,

    #[serde(default = "default_minimum_waypoint_count")]
    pub minimum_waypoint_count: u32,
}

fn default_max_goal_samples() -> u32 {
    10
}

fn default_max_state_sampling_attempts() -> u32 {
    4
}

fn default_max_goal_sampling_attempts() -> u32 {
    1000
}

fn default_max_planning_threads() -> u32 {
    4
}

fn default_minimum_waypoint_count() -> u32 {
    2
}

impl Default for TuningParameters {
    fn default() -> Self {
        Self {
            max_goal_samples: default_max_goal_samples(),
            max_state_sampling_attempts: default_max_state_sampling_attempts(),
            max_goal_sampling_attempts: default_max_goal_sampling_attempts(),
            max_planning_threads: default_max_planning_threads(),
            max_solution_segment_length: 0.0,
            minimum_waypoint_count: default_minimum_waypoint_count(),
        }
    }
}

impl TuningParameters {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_planning_threads == 0 {
            return Err("max_planning_threads must be at least 1".to_string());
        }
        if self.max_solution_segment_length < 0.0 {
            return Err("max_solution_segment_length cannot be negative".to_string());
        }
        Ok(())
    }

    pub fn has_solution_segment_length(&self) -> bool {
        self.max_solution_segment_length > SEGMENT_LENGTH_EPSILON
    }
}
