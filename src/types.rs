//! Request, constraint and collaborator types shared across the crate.
//!
//! The robot model, planning scene and constraint samplers are owned elsewhere;
//! this crate only consumes them through the traits below.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Joint positions keyed by joint name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub positions: BTreeMap<String, f64>,
}

impl RobotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, joint: &str, value: f64) -> Self {
        self.positions.insert(joint.to_string(), value);
        self
    }

    pub fn position(&self, joint: &str) -> Option<f64> {
        self.positions.get(joint).copied()
    }

    /// Overwrite the joints present in `other`, keeping every other joint as is
    pub fn update_from(&mut self, other: &RobotState) {
        for (joint, value) in &other.positions {
            self.positions.insert(joint.clone(), *value);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointConstraint {
    pub joint_name: String,
    pub position: f64,
    pub tolerance_above: f64,
    pub tolerance_below: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionConstraint {
    pub link_name: String,
    /// Box center in the planning frame
    pub center: [f64; 3],
    /// Box dimensions along each axis
    pub dimensions: [f64; 3],
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationConstraint {
    pub link_name: String,
    /// Target orientation as a quaternion (x, y, z, w)
    pub orientation: [f64; 4],
    pub absolute_tolerance: [f64; 3],
    pub weight: f64,
}

/// A named set of kinematic constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub joint_constraints: Vec<JointConstraint>,
    #[serde(default)]
    pub position_constraints: Vec<PositionConstraint>,
    #[serde(default)]
    pub orientation_constraints: Vec<OrientationConstraint>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.joint_constraints.is_empty()
            && self.position_constraints.is_empty()
            && self.orientation_constraints.is_empty()
    }

    /// Union of two constraint sets
    pub fn merged(&self, other: &Constraints) -> Constraints {
        let name = match (self.name.is_empty(), other.name.is_empty()) {
            (false, false) => format!("{}+{}", self.name, other.name),
            (false, true) => self.name.clone(),
            _ => other.name.clone(),
        };
        Constraints {
            name,
            joint_constraints: self
                .joint_constraints
                .iter()
                .chain(&other.joint_constraints)
                .cloned()
                .collect(),
            position_constraints: self
                .position_constraints
                .iter()
                .chain(&other.position_constraints)
                .cloned()
                .collect(),
            orientation_constraints: self
                .orientation_constraints
                .iter()
                .chain(&other.orientation_constraints)
                .cloned()
                .collect(),
        }
    }

    /// Link names referenced by position and orientation constraints
    pub fn link_names(&self) -> impl Iterator<Item = &str> {
        self.position_constraints
            .iter()
            .map(|c| c.link_name.as_str())
            .chain(self.orientation_constraints.iter().map(|c| c.link_name.as_str()))
    }
}

/// Axis-aligned workspace volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceParameters {
    #[serde(default)]
    pub frame_id: String,
    pub min_corner: [f64; 3],
    pub max_corner: [f64; 3],
}

impl WorkspaceParameters {
    pub fn new(min_corner: [f64; 3], max_corner: [f64; 3]) -> Self {
        Self {
            frame_id: String::new(),
            min_corner,
            max_corner,
        }
    }

    /// True when no bounds were supplied at all
    pub fn is_unset(&self) -> bool {
        self.min_corner.iter().chain(&self.max_corner).all(|v| *v == 0.0)
    }
}

/// Incoming motion plan request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionPlanRequest {
    pub group_name: String,
    #[serde(default)]
    pub planner_id: String,
    #[serde(default)]
    pub path_constraints: Constraints,
    #[serde(default)]
    pub goal_constraints: Vec<Constraints>,
    #[serde(default)]
    pub workspace_parameters: WorkspaceParameters,
    /// Joint values that override the scene's current state
    #[serde(default)]
    pub start_state: Option<RobotState>,
}

impl MotionPlanRequest {
    pub fn new(group_name: &str) -> Self {
        Self {
            group_name: group_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_planner_id(mut self, planner_id: &str) -> Self {
        self.planner_id = planner_id.to_string();
        self
    }

    pub fn with_goal(mut self, goal: Constraints) -> Self {
        self.goal_constraints.push(goal);
        self
    }

    pub fn with_path_constraints(mut self, path: Constraints) -> Self {
        self.path_constraints = path;
        self
    }
}

/// Kinematic model of the robot
pub trait RobotModel: Send + Sync {
    fn name(&self) -> &str;

    /// Whether a joint model group with this name exists
    fn has_group(&self, group: &str) -> bool;

    fn has_link(&self, link: &str) -> bool;

    /// Active joint names of a group, in model order
    fn group_joint_names(&self, group: &str) -> Option<Vec<String>>;

    /// Whether an inverse-kinematics solver is available for the group
    fn has_ik_solver(&self, group: &str) -> bool;
}

/// Collision context and current robot state for planning
pub trait PlanningScene: Send + Sync {
    fn name(&self) -> &str;

    fn current_state(&self) -> RobotState;

    /// Current state with the request's start-state override applied on top
    fn current_state_updated(&self, update: Option<&RobotState>) -> RobotState {
        let mut state = self.current_state();
        if let Some(update) = update {
            state.update_from(update);
        }
        state
    }
}

/// Constraint sampling capability handed through to planning contexts
pub trait ConstraintSamplerManager: Send + Sync {
    /// Whether a sampler can produce states satisfying `constraints` for `group`
    fn can_sample(&self, group: &str, constraints: &Constraints) -> bool;
}
