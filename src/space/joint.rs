//! Joint-space representation: samples raw joint values of the group.

use super::{StateSpace, StateSpaceFactory, StateSpaceSpecification};
use crate::error::ContextError;
use crate::types::{MotionPlanRequest, RobotModel};
use std::sync::Arc;

pub const JOINT_PARAMETERIZATION_TYPE: &str = "JointModel";

const JOINT_DEFAULT_PRIORITY: i32 = 100;

#[derive(Debug, Clone)]
pub struct JointModelStateSpace {
    group: String,
    joint_names: Vec<String>,
}

impl JointModelStateSpace {
    pub const PARAMETERIZATION_TYPE: &'static str = JOINT_PARAMETERIZATION_TYPE;

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

impl StateSpace for JointModelStateSpace {
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
pub struct JointModelStateSpaceFactory;

impl JointModelStateSpaceFactory {
    pub fn new() -> Self {
        Self
    }
}

impl StateSpaceFactory for JointModelStateSpaceFactory {
    fn parameterization_type(&self) -> &str {
        JointModelStateSpace::PARAMETERIZATION_TYPE
    }

    fn can_represent_problem(
        &self,
        group: &str,
        _req: &MotionPlanRequest,
        model: &dyn RobotModel,
    ) -> i32 {
        if model.has_group(group) {
            JOINT_DEFAULT_PRIORITY
        } else {
            -1
        }
    }

    fn new_state_space(
        &self,
        spec: &StateSpaceSpecification,
    ) -> Result<Arc<dyn StateSpace>, ContextError> {
        let joints = spec.joint_names()?;
        Ok(Arc::new(JointModelStateSpace::new(&spec.group, joints)))
    }
}
