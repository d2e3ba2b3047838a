//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources override earlier ones key by key. Arrays such as
//! `planner_configs` are replaced as a whole by the highest source defining them.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("tuning.max_goal_samples", 10)?
        .set_default("tuning.max_state_sampling_attempts", 4)?
        .set_default("tuning.max_goal_sampling_attempts", 1000)?
        .set_default("tuning.max_planning_threads", 4)?
        .set_default("tuning.max_solution_segment_length", 0.0)?
        .set_default("tuning.minimum_waypoint_count", 2)
}
