//! Work-space representation: samples end-effector poses and recovers joint
//! values through the group's IK solver.

use super::{StateSpace, StateSpaceFactory, StateSpaceSpecification};
use crate::error::ContextError;
use crate::types::{MotionPlanRequest, RobotModel};
use std::sync::Arc;

pub const POSE_PARAMETERIZATION_TYPE: &str = "PoseModel";

// Position (3) plus orientation (3) of the end effector.
const POSE_DIMENSION: usize = 6;

#[derive(Debug, Clone)]
pub struct PoseModelStateSpace {
    group: String,
    joint_names: Vec<String>,
}

impl PoseModelStateSpace {
    pub const PARAMETERIZATION_TYPE: &'static str = POSE_PARAMETERIZATION_TYPE;

    pub fn new(group: &str, joint_names: Vec<String>) -> Self {
        Self {
            group: group.to_string(),
            joint_names,
        }
    }

    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }
}

impl StateSpace for PoseModelStateSpace {
    fn parameterization_type(&self) -> &str {
        Self::PARAMETERIZATION_TYPE
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn dimension(&self) -> usize {
        POSE_DIMENSION
    }
}

#[derive(Debug, Default)]
pub struct PoseModelStateSpaceFactory;

impl PoseModelStateSpaceFactory {
    pub fn new() -> Self {
        Self
    }
}

impl StateSpaceFactory for PoseModelStateSpaceFactory {
    fn parameterization_type(&self) -> &str {
        PoseModelStateSpace::PARAMETERIZATION_TYPE
    }

    /// Preferred over joint space only when the path constraints restrict the
    /// end-effector pose and IK is available to project samples back.
    fn can_represent_problem(
        &self,
        group: &str,
        req: &MotionPlanRequest,
        model: &dyn RobotModel,
    ) -> i32 {
        if !model.has_group(group) || !model.has_ik_solver(group) {
            return -1;
        }
        let path = &req.path_constraints;
        if !path.position_constraints.is_empty() || !path.orientation_constraints.is_empty() {
            200
        } else {
            50
        }
    }

    fn new_state_space(
        &self,
        spec: &StateSpaceSpecification,
    ) -> Result<Arc<dyn StateSpace>, ContextError> {
        if !spec.robot_model.has_ik_solver(&spec.group) {
            return Err(ContextError::NoRepresentation(spec.group.clone()));
        }
        let joints = spec.joint_names()?;
        Ok(Arc::new(PoseModelStateSpace::new(&spec.group, joints)))
    }
}
