//! State spaces
//!
//! A state space is the representation a planner samples in. Factories build
//! them for a joint model group and score how well they fit a request; the
//! [`StateSpaceRegistry`] picks among the registered factories.

pub mod constrained;
pub mod joint;
pub mod pose;
pub mod registry;

pub use constrained::{
    create_path_constraint, ConstrainedPlanningStateSpace, ConstrainedPlanningStateSpaceFactory,
    PathConstraint, ProjectedStateSpace, CONSTRAINED_PARAMETERIZATION_TYPE,
};
pub use joint::{JointModelStateSpace, JointModelStateSpaceFactory, JOINT_PARAMETERIZATION_TYPE};
pub use pose::{PoseModelStateSpace, PoseModelStateSpaceFactory, POSE_PARAMETERIZATION_TYPE};
pub use registry::StateSpaceRegistry;

use crate::error::ContextError;
use crate::types::{MotionPlanRequest, RobotModel, WorkspaceParameters};
use std::sync::Arc;

/// Default fraction of the space extent used as the collision-checking resolution
pub const DEFAULT_LONGEST_VALID_SEGMENT_FRACTION: f64 = 0.01;

/// Problem representation for a joint model group
pub trait StateSpace: Send + Sync + std::fmt::Debug {
    /// Tag identifying the representation (e.g. "JointModel")
    fn parameterization_type(&self) -> &str;

    fn group(&self) -> &str;

    fn dimension(&self) -> usize;
}

/// Input for building a state space
#[derive(Clone)]
pub struct StateSpaceSpecification {
    pub robot_model: Arc<dyn RobotModel>,
    pub group: String,
}

impl StateSpaceSpecification {
    pub fn new(robot_model: Arc<dyn RobotModel>, group: &str) -> Self {
        Self {
            robot_model,
            group: group.to_string(),
        }
    }

    /// Active joints of the group, or `InvalidGroupName` if the model does not know it
    pub fn joint_names(&self) -> Result<Vec<String>, ContextError> {
        self.robot_model
            .group_joint_names(&self.group)
            .ok_or_else(|| {
                tracing::error!(
                    group = %self.group,
                    model = %self.robot_model.name(),
                    "Joint model group not found in robot model"
                );
                ContextError::InvalidGroupName
            })
    }
}

/// Builds state spaces of one representation type and scores requests
pub trait StateSpaceFactory: Send + Sync {
    fn parameterization_type(&self) -> &str;

    /// Suitability of this representation for `req`; values <= 0 mean "cannot represent"
    fn can_represent_problem(
        &self,
        group: &str,
        req: &MotionPlanRequest,
        model: &dyn RobotModel,
    ) -> i32;

    fn new_state_space(
        &self,
        spec: &StateSpaceSpecification,
    ) -> Result<Arc<dyn StateSpace>, ContextError>;
}

/// Space a planner searches: the state space, optionally projected onto a
/// constraint manifold, plus validity-checking settings.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    state_space: Arc<dyn StateSpace>,
    projection: Option<Arc<ProjectedStateSpace>>,
    longest_valid_segment_fraction: f64,
    planning_volume: Option<WorkspaceParameters>,
}

impl SearchSpace {
    pub fn new(state_space: Arc<dyn StateSpace>) -> Self {
        Self {
            state_space,
            projection: None,
            longest_valid_segment_fraction: DEFAULT_LONGEST_VALID_SEGMENT_FRACTION,
            planning_volume: None,
        }
    }

    /// Search space whose samples are projected onto the constraint manifold
    pub fn constrained(projection: ProjectedStateSpace) -> Self {
        let state_space = projection.ambient_space();
        Self {
            state_space,
            projection: Some(Arc::new(projection)),
            longest_valid_segment_fraction: DEFAULT_LONGEST_VALID_SEGMENT_FRACTION,
            planning_volume: None,
        }
    }

    pub fn state_space(&self) -> &Arc<dyn StateSpace> {
        &self.state_space
    }

    pub fn projection(&self) -> Option<&ProjectedStateSpace> {
        self.projection.as_deref()
    }

    pub fn is_constrained(&self) -> bool {
        self.projection.is_some()
    }

    /// Dimension samples actually live in
    pub fn sampling_dimension(&self) -> usize {
        match &self.projection {
            Some(projection) => projection.manifold_dimension(),
            None => self.state_space.dimension(),
        }
    }

    pub fn longest_valid_segment_fraction(&self) -> f64 {
        self.longest_valid_segment_fraction
    }

    pub fn set_longest_valid_segment_fraction(&mut self, fraction: f64) {
        self.longest_valid_segment_fraction = fraction;
    }

    pub fn planning_volume(&self) -> Option<&WorkspaceParameters> {
        self.planning_volume.as_ref()
    }

    pub fn set_planning_volume(&mut self, volume: Option<WorkspaceParameters>) {
        self.planning_volume = volume;
    }
}
