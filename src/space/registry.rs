//! State-space factory registry.

use super::{
    ConstrainedPlanningStateSpaceFactory, JointModelStateSpaceFactory, PoseModelStateSpaceFactory,
    StateSpaceFactory,
};
use crate::error::ContextError;
use crate::types::{MotionPlanRequest, RobotModel};
use std::sync::Arc;
use tracing::{debug, error};

/// Factories keyed by representation type, kept in registration order
#[derive(Default)]
pub struct StateSpaceRegistry {
    factories: Vec<Arc<dyn StateSpaceFactory>>,
}

impl StateSpaceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the joint, pose and constrained factories, in that order
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JointModelStateSpaceFactory::new()));
        registry.register(Arc::new(PoseModelStateSpaceFactory::new()));
        registry.register(Arc::new(ConstrainedPlanningStateSpaceFactory::new()));
        registry
    }

    /// Register a factory. A factory of an already known type replaces the
    /// old one but keeps its position in the registration order.
    pub fn register(&mut self, factory: Arc<dyn StateSpaceFactory>) {
        let existing = self
            .factories
            .iter_mut()
            .find(|f| f.parameterization_type() == factory.parameterization_type());
        match existing {
            Some(slot) => *slot = factory,
            None => self.factories.push(factory),
        }
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered representation types in registration order
    pub fn types(&self) -> Vec<String> {
        self.factories
            .iter()
            .map(|f| f.parameterization_type().to_string())
            .collect()
    }

    /// Exact lookup by type; an empty type means the first registered factory
    pub fn lookup(&self, factory_type: &str) -> Result<Arc<dyn StateSpaceFactory>, ContextError> {
        let found = if factory_type.is_empty() {
            self.factories.first()
        } else {
            self.factories
                .iter()
                .find(|f| f.parameterization_type() == factory_type)
        };

        match found {
            Some(factory) => {
                debug!(
                    parameterization = factory.parameterization_type(),
                    "Using parameterization for solving problem"
                );
                Ok(Arc::clone(factory))
            }
            None => {
                error!("Factory of type '{}' was not found", factory_type);
                Err(ContextError::UnknownStateSpace(factory_type.to_string()))
            }
        }
    }

    /// Highest-scoring factory for the request. Ties keep the earlier
    /// registration; scores of zero or below never win.
    pub fn select(
        &self,
        group: &str,
        req: &MotionPlanRequest,
        model: &dyn RobotModel,
    ) -> Result<Arc<dyn StateSpaceFactory>, ContextError> {
        let mut best: Option<&Arc<dyn StateSpaceFactory>> = None;
        let mut best_priority = 0;
        for factory in &self.factories {
            let priority = factory.can_represent_problem(group, req, model);
            if priority > best_priority {
                best = Some(factory);
                best_priority = priority;
            }
        }

        match best {
            Some(factory) => {
                debug!(
                    parameterization = factory.parameterization_type(),
                    priority = best_priority,
                    "Using parameterization for solving problem"
                );
                Ok(Arc::clone(factory))
            }
            None => {
                error!(group, "There are no known state spaces that can represent the given planning problem");
                Err(ContextError::NoRepresentation(group.to_string()))
            }
        }
    }
}
