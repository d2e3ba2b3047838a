//! Planning contexts
//!
//! A context binds a named configuration to a state space and, once
//! configured, to a planner instance. It also carries the per-request inputs
//! (scene, request, start state, constraints). Contexts are reused across
//! requests through the [`ContextCache`].

pub mod cache;
pub mod tuning;

pub use cache::{ContextCache, ContextCheckout};
pub use tuning::TuningParameters;

use crate::error::ContextError;
use crate::params::{flag, PlannerParams};
use crate::planner::allocator::KEY_MULTI_QUERY_PLANNING_ENABLED;
use crate::planner::{PlannerHandle, PlannerSelector, DEFAULT_PLANNER_ID};
use crate::space::{SearchSpace, StateSpace};
use crate::types::{
    ConstraintSamplerManager, Constraints, MotionPlanRequest, PlanningScene, RobotModel, RobotState,
    WorkspaceParameters,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const KEY_PLANNER_TYPE: &str = "type";
pub const KEY_ENFORCE_JOINT_MODEL_STATE_SPACE: &str = "enforce_joint_model_state_space";
pub const KEY_ENFORCE_CONSTRAINED_STATE_SPACE: &str = "enforce_constrained_state_space";
pub const KEY_LONGEST_VALID_SEGMENT_FRACTION: &str = "longest_valid_segment_fraction";
pub const KEY_PROJECTION_EVALUATOR: &str = "projection_evaluator";
pub const KEY_OPTIMIZATION_OBJECTIVE: &str = "optimization_objective";

/// Identity of a context instance, stable across reuse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        ContextId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Everything needed to build a context
#[derive(Clone)]
pub struct ContextSpecification {
    pub config: PlannerParams,
    pub planner_selector: PlannerSelector,
    pub constraint_sampler_manager: Option<Arc<dyn ConstraintSamplerManager>>,
    pub robot_model: Arc<dyn RobotModel>,
    pub state_space: Arc<dyn StateSpace>,
    pub search_space: SearchSpace,
}

pub struct PlanningContext {
    id: ContextId,
    name: String,
    spec: ContextSpecification,
    tuning: TuningParameters,
    multi_query: bool,
    optimization_objective: Option<String>,

    scene: Option<Arc<dyn PlanningScene>>,
    request: Option<MotionPlanRequest>,
    start_state: Option<RobotState>,
    path_constraints: Option<Constraints>,
    goal_constraints: Vec<Constraints>,
    planner: Option<PlannerHandle>,
    configured: bool,
}

impl PlanningContext {
    pub fn new(name: &str, spec: ContextSpecification) -> Self {
        let multi_query = multi_query_enabled(&spec.config);
        Self {
            id: ContextId::next(),
            name: name.to_string(),
            spec,
            tuning: TuningParameters::default(),
            multi_query,
            optimization_objective: None,
            scene: None,
            request: None,
            start_state: None,
            path_constraints: None,
            goal_constraints: Vec::new(),
            planner: None,
            configured: false,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        self.spec.state_space.group()
    }

    pub fn state_space(&self) -> &Arc<dyn StateSpace> {
        &self.spec.state_space
    }

    pub fn search_space(&self) -> &SearchSpace {
        &self.spec.search_space
    }

    pub fn specification_config(&self) -> &PlannerParams {
        &self.spec.config
    }

    pub fn constraint_sampler_manager(&self) -> Option<&Arc<dyn ConstraintSamplerManager>> {
        self.spec.constraint_sampler_manager.as_ref()
    }

    pub fn tuning(&self) -> &TuningParameters {
        &self.tuning
    }

    pub fn is_multi_query(&self) -> bool {
        self.multi_query
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn planner(&self) -> Option<&PlannerHandle> {
        self.planner.as_ref()
    }

    pub fn planning_scene(&self) -> Option<&Arc<dyn PlanningScene>> {
        self.scene.as_ref()
    }

    pub fn motion_plan_request(&self) -> Option<&MotionPlanRequest> {
        self.request.as_ref()
    }

    pub fn start_state(&self) -> Option<&RobotState> {
        self.start_state.as_ref()
    }

    pub fn path_constraints(&self) -> Option<&Constraints> {
        self.path_constraints.as_ref()
    }

    pub fn goal_constraints(&self) -> &[Constraints] {
        &self.goal_constraints
    }

    pub fn optimization_objective(&self) -> Option<&str> {
        self.optimization_objective.as_deref()
    }

    pub fn set_maximum_planning_threads(&mut self, threads: u32) {
        self.tuning.max_planning_threads = threads;
    }

    pub fn set_maximum_goal_samples(&mut self, samples: u32) {
        self.tuning.max_goal_samples = samples;
    }

    pub fn set_maximum_state_sampling_attempts(&mut self, attempts: u32) {
        self.tuning.max_state_sampling_attempts = attempts;
    }

    pub fn set_maximum_goal_sampling_attempts(&mut self, attempts: u32) {
        self.tuning.max_goal_sampling_attempts = attempts;
    }

    pub fn set_maximum_solution_segment_length(&mut self, length: f64) {
        self.tuning.max_solution_segment_length = length;
    }

    pub fn set_minimum_waypoint_count(&mut self, count: u32) {
        self.tuning.minimum_waypoint_count = count;
    }

    /// Apply process-wide tuning. The segment length only overrides the
    /// current value when one is configured.
    pub fn apply_tuning(&mut self, tuning: &TuningParameters) {
        self.set_maximum_planning_threads(tuning.max_planning_threads);
        self.set_maximum_goal_samples(tuning.max_goal_samples);
        self.set_maximum_state_sampling_attempts(tuning.max_state_sampling_attempts);
        self.set_maximum_goal_sampling_attempts(tuning.max_goal_sampling_attempts);
        if tuning.has_solution_segment_length() {
            self.set_maximum_solution_segment_length(tuning.max_solution_segment_length);
        }
        self.set_minimum_waypoint_count(tuning.minimum_waypoint_count);
    }

    pub fn set_specification_config(&mut self, config: PlannerParams) {
        self.multi_query = multi_query_enabled(&config);
        self.spec.config = config;
    }

    /// Forget per-request state. Multi-query planners keep their roadmap.
    pub fn clear(&mut self) {
        if let Some(planner) = &self.planner {
            if !self.multi_query {
                planner.lock().clear();
            }
        }
        self.scene = None;
        self.request = None;
        self.start_state = None;
        self.path_constraints = None;
        self.goal_constraints.clear();
        self.configured = false;
    }

    pub fn set_planning_scene(&mut self, scene: Arc<dyn PlanningScene>) {
        self.scene = Some(scene);
    }

    pub fn set_motion_plan_request(&mut self, request: MotionPlanRequest) {
        self.request = Some(request);
    }

    pub fn set_complete_initial_state(&mut self, state: RobotState) {
        self.start_state = Some(state);
    }

    pub fn set_planning_volume(&mut self, volume: &WorkspaceParameters) {
        if volume.is_unset() {
            debug!(
                context = %self.name,
                "It looks like the planning volume was not specified"
            );
            self.spec.search_space.set_planning_volume(None);
        } else {
            debug!(
                context = %self.name,
                min = ?volume.min_corner,
                max = ?volume.max_corner,
                "Setting planning volume"
            );
            self.spec.search_space.set_planning_volume(Some(volume.clone()));
        }
    }

    pub fn set_path_constraints(&mut self, path: &Constraints) -> Result<(), ContextError> {
        if let Some(link) = self.unknown_link(path) {
            error!(context = %self.name, link, "Path constraint refers to an unknown link");
            return Err(ContextError::InvalidPathConstraints(format!(
                "unknown link '{}'",
                link
            )));
        }
        self.path_constraints = Some(path.clone());
        Ok(())
    }

    /// Merge every goal set with the path constraints and keep the non-empty
    /// results. At least one must remain.
    pub fn set_goal_constraints(
        &mut self,
        goals: &[Constraints],
        path: &Constraints,
    ) -> Result<(), ContextError> {
        let merged: Vec<Constraints> = goals
            .iter()
            .map(|goal| goal.merged(path))
            .filter(|goal| !goal.is_empty())
            .collect();

        if merged.is_empty() {
            error!(
                context = %self.name,
                "No goal constraints specified. There is no problem to solve."
            );
            return Err(ContextError::InvalidGoalConstraints(
                "no goal constraints specified".to_string(),
            ));
        }

        for goal in &merged {
            if let Some(link) = self.unknown_link(goal) {
                error!(context = %self.name, link, "Goal constraint refers to an unknown link");
                return Err(ContextError::InvalidGoalConstraints(format!(
                    "unknown link '{}'",
                    link
                )));
            }
        }

        if let Some(samplers) = &self.spec.constraint_sampler_manager {
            let group = self.spec.state_space.group();
            for goal in &merged {
                if !samplers.can_sample(group, goal) {
                    debug!(
                        context = %self.name,
                        goal = %goal.name,
                        "No constraint sampler for goal; goal states will be found by rejection sampling"
                    );
                }
            }
        }

        self.goal_constraints = merged;
        Ok(())
    }

    /// Resolve the planner named by the configuration, allocate it over the
    /// search space and run its setup step.
    pub fn configure(&mut self) -> Result<(), ContextError> {
        if self.scene.is_none() {
            return Err(ContextError::NoPlanningScene);
        }
        if self.start_state.is_none() {
            return Err(ContextError::ConfigurationFailed(
                "no start state set".to_string(),
            ));
        }

        let mut cfg = self.spec.config.clone();
        cfg.remove(KEY_ENFORCE_JOINT_MODEL_STATE_SPACE);
        cfg.remove(KEY_ENFORCE_CONSTRAINED_STATE_SPACE);
        if let Some(evaluator) = cfg.remove(KEY_PROJECTION_EVALUATOR) {
            debug!(context = %self.name, evaluator = %evaluator, "Projection evaluator is handled by the planner library");
        }

        if let Some(fraction) = cfg.remove(KEY_LONGEST_VALID_SEGMENT_FRACTION) {
            let value = fraction.trim().parse::<f64>().map_err(|e| {
                ContextError::ConfigurationFailed(format!(
                    "invalid {} '{}': {}",
                    KEY_LONGEST_VALID_SEGMENT_FRACTION, fraction, e
                ))
            })?;
            self.spec
                .search_space
                .set_longest_valid_segment_fraction(value);
        }

        self.optimization_objective = cfg.remove(KEY_OPTIMIZATION_OBJECTIVE);

        let planner_id = match cfg.remove(KEY_PLANNER_TYPE) {
            Some(id) => id,
            None => {
                debug!(
                    context = %self.name,
                    planner = DEFAULT_PLANNER_ID,
                    "No planner specified. Using default."
                );
                DEFAULT_PLANNER_ID.to_string()
            }
        };

        let allocator = (self.spec.planner_selector)(&planner_id)?;
        let instance_name = format!("{}/{}", self.group(), self.name);
        let planner = allocator(&self.spec.search_space, &instance_name, &cfg)?;
        planner.lock().setup()?;

        self.planner = Some(planner);
        self.configured = true;
        Ok(())
    }

    fn unknown_link<'a>(&self, constraints: &'a Constraints) -> Option<&'a str> {
        constraints
            .link_names()
            .find(|link| !self.spec.robot_model.has_link(link))
    }
}

fn multi_query_enabled(config: &PlannerParams) -> bool {
    match flag(config, KEY_MULTI_QUERY_PLANNING_ENABLED) {
        Ok(enabled) => enabled,
        Err(e) => {
            warn!("{}; treating multi-query planning as disabled", e);
            false
        }
    }
}
