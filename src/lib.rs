//! Plancache: planning context management
//!
//! Resolves named planner configurations for motion-planning requests, picks
//! the state-space representation that fits a request, reuses planning
//! contexts across requests and keeps the roadmaps of multi-query planners
//! alive between calls and across runs.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod manager;
pub mod params;
pub mod planner;
pub mod space;
pub mod types;

pub use context::{ContextCheckout, PlanningContext};
pub use error::{ContextError, ErrorCode};
pub use manager::PlanningContextManager;
