//! Constrained representation
//!
//! Joint-space sampling projected onto the manifold defined by the request's
//! path constraints. Never picked by priority; only when a configuration
//! enforces it and the request carries a pose path constraint.

use super::{StateSpace, StateSpaceFactory, StateSpaceSpecification};
use crate::error::ContextError;
use crate::types::{Constraints, MotionPlanRequest, OrientationConstraint, PositionConstraint, RobotModel};
use std::sync::Arc;
use tracing::{error, warn};

pub const CONSTRAINED_PARAMETERIZATION_TYPE: &str = "ConstrainedPlanningJointModel";

#[derive(Debug, Clone)]
pub struct ConstrainedPlanningStateSpace {
    group: String,
    joint_names: Vec<String>,
}

impl ConstrainedPlanningStateSpace {
    pub const PARAMETERIZATION_TYPE: &'static str = CONSTRAINED_PARAMETERIZATION_TYPE;

    pub fn new(group: &str, joint_names: Vec<String>) -> Self {
        Self {
            group: group.to_string(),
            joint_names,
        }
    }
}

impl StateSpace for ConstrainedPlanningStateSpace {
    fn parameterization_type(&self) -> &str {
        Self::PARAMETERIZATION_TYPE
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn dimension(&self) -> usize {
        self.joint_names.len()
    }
}

#[derive(Debug, Default)]
pub struct ConstrainedPlanningStateSpaceFactory;

impl ConstrainedPlanningStateSpaceFactory {
    pub fn new() -> Self {
        Self
    }
}

impl StateSpaceFactory for ConstrainedPlanningStateSpaceFactory {
    fn parameterization_type(&self) -> &str {
        ConstrainedPlanningStateSpace::PARAMETERIZATION_TYPE
    }

    fn can_represent_problem(
        &self,
        _group: &str,
        _req: &MotionPlanRequest,
        _model: &dyn RobotModel,
    ) -> i32 {
        -2
    }

    fn new_state_space(
        &self,
        spec: &StateSpaceSpecification,
    ) -> Result<Arc<dyn StateSpace>, ContextError> {
        let joints = spec.joint_names()?;
        Ok(Arc::new(ConstrainedPlanningStateSpace::new(&spec.group, joints)))
    }
}

/// Constraint a constrained search space projects onto
#[derive(Debug, Clone, PartialEq)]
pub enum PathConstraint {
    /// Keep a link inside a box
    Box(PositionConstraint),
    /// Keep a link's orientation within tolerance
    Orientation(OrientationConstraint),
    /// Both at once
    Pose {
        position: PositionConstraint,
        orientation: OrientationConstraint,
    },
}

impl PathConstraint {
    /// Number of equations the constraint imposes on the ambient space
    pub fn co_dimension(&self) -> usize {
        match self {
            PathConstraint::Box(_) | PathConstraint::Orientation(_) => 3,
            PathConstraint::Pose { .. } => 6,
        }
    }

    pub fn link_name(&self) -> &str {
        match self {
            PathConstraint::Box(c) => &c.link_name,
            PathConstraint::Orientation(c) => &c.link_name,
            PathConstraint::Pose { position, .. } => &position.link_name,
        }
    }
}

/// Derive the manifold constraint from a request's path constraints
pub fn create_path_constraint(
    model: &dyn RobotModel,
    group: &str,
    constraints: &Constraints,
) -> Result<PathConstraint, ContextError> {
    if !constraints.joint_constraints.is_empty() {
        warn!(group, "Joint path constraints are ignored by the constrained state space");
    }
    if constraints.position_constraints.len() > 1 {
        warn!(group, "Only a single position constraint is supported. Using the first one.");
    }
    if constraints.orientation_constraints.len() > 1 {
        warn!(group, "Only a single orientation constraint is supported. Using the first one.");
    }

    let constraint = match (
        constraints.position_constraints.first(),
        constraints.orientation_constraints.first(),
    ) {
        (Some(position), Some(orientation)) => PathConstraint::Pose {
            position: position.clone(),
            orientation: orientation.clone(),
        },
        (Some(position), None) => PathConstraint::Box(position.clone()),
        (None, Some(orientation)) => PathConstraint::Orientation(orientation.clone()),
        (None, None) => {
            error!(group, "No path constraints found in planning request");
            return Err(ContextError::InvalidPathConstraints(
                "constrained planning requires a position or orientation path constraint"
                    .to_string(),
            ));
        }
    };

    for link in constraints.link_names() {
        if !model.has_link(link) {
            error!(group, link, "Path constraint refers to an unknown link");
            return Err(ContextError::InvalidPathConstraints(format!(
                "unknown link '{}'",
                link
            )));
        }
    }

    Ok(constraint)
}

/// Adapter projecting samples of an ambient space onto a constraint manifold
#[derive(Debug, Clone)]
pub struct ProjectedStateSpace {
    ambient: Arc<dyn StateSpace>,
    constraint: PathConstraint,
}

impl ProjectedStateSpace {
    pub fn new(ambient: Arc<dyn StateSpace>, constraint: PathConstraint) -> Self {
        Self {
            ambient,
            constraint,
        }
    }

    pub fn ambient_space(&self) -> Arc<dyn StateSpace> {
        Arc::clone(&self.ambient)
    }

    pub fn constraint(&self) -> &PathConstraint {
        &self.constraint
    }

    pub fn manifold_dimension(&self) -> usize {
        self.ambient
            .dimension()
            .saturating_sub(self.constraint.co_dimension())
    }
}
