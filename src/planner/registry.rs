//! Algorithm registry: planner name to configured allocator.

use crate::error::{ContextError, PlannerError};
use crate::params::PlannerParams;
use crate::planner::PlannerHandle;
use crate::space::SearchSpace;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// Builds a named, parameterized planner over a search space
pub type ConfiguredPlannerAllocator = Arc<
    dyn Fn(&SearchSpace, &str, &PlannerParams) -> Result<PlannerHandle, PlannerError>
        + Send
        + Sync,
>;

/// Resolves a planner name to its allocator
pub type PlannerSelector =
    Arc<dyn Fn(&str) -> Result<ConfiguredPlannerAllocator, ContextError> + Send + Sync>;

/// Known planners
#[derive(Default, Clone)]
pub struct PlannerRegistry {
    known: HashMap<String, ConfiguredPlannerAllocator>,
}

impl PlannerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an allocator; an existing entry of the same name is replaced
    pub fn register(&mut self, name: &str, allocator: ConfiguredPlannerAllocator) {
        self.known.insert(name.to_string(), allocator);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.known.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.known.keys().cloned().collect();
        names.sort();
        names
    }

    /// Exact lookup. Misses are logged and reported as `UnknownPlanner`.
    pub fn resolve(&self, name: &str) -> Result<ConfiguredPlannerAllocator, ContextError> {
        match self.known.get(name) {
            Some(allocator) => Ok(Arc::clone(allocator)),
            None => {
                error!("Unknown planner: '{}'", name);
                Err(ContextError::UnknownPlanner(name.to_string()))
            }
        }
    }
}
