//! Planning context manager
//!
//! Entry point for planning requests. For each request it resolves the named
//! configuration, chooses the state-space representation, checks a context
//! out of the [`ContextCache`] (building one when none is idle) and loads the
//! request into it.

use crate::config::{PlanCacheConfig, PlannerConfiguration, PlannerConfigurationMap};
use crate::context::{
    ContextCache, ContextCheckout, ContextSpecification, PlanningContext, TuningParameters,
    KEY_ENFORCE_CONSTRAINED_STATE_SPACE, KEY_ENFORCE_JOINT_MODEL_STATE_SPACE,
};
use crate::error::ContextError;
use crate::params::flag;
use crate::planner::allocator::configured_allocator;
use crate::planner::{
    allows_graph_seeding, ConfiguredPlannerAllocator, FilePlannerDataStorage,
    MultiQueryPlannerAllocator, PlannerLibrary, PlannerRegistry, PlannerSelector, PlannerType,
    DEFAULT_PLANNER_IDS,
};
use crate::space::{
    create_path_constraint, ProjectedStateSpace, SearchSpace, StateSpaceFactory,
    StateSpaceRegistry, StateSpaceSpecification, CONSTRAINED_PARAMETERIZATION_TYPE,
    JOINT_PARAMETERIZATION_TYPE,
};
use crate::types::{ConstraintSamplerManager, MotionPlanRequest, PlanningScene, RobotModel};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of looking up the configuration for a request
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfiguration<'a> {
    pub configuration: &'a PlannerConfiguration,
    /// The planner-specific name was requested but missing; the group default was used
    pub fell_back: bool,
}

/// Find the configuration for `group` and an optional planner id.
///
/// A planner id that already mentions the group is looked up as-is, otherwise
/// as `group[planner_id]`. A miss falls back to the configuration named after
/// the group.
pub fn resolve_configuration<'a>(
    configs: &'a PlannerConfigurationMap,
    group: &str,
    planner_id: &str,
) -> Result<ResolvedConfiguration<'a>, ContextError> {
    let mut fell_back = false;
    if !planner_id.is_empty() {
        let name = if planner_id.contains(group) {
            planner_id.to_string()
        } else {
            format!("{}[{}]", group, planner_id)
        };
        if let Some(configuration) = configs.get(&name) {
            return Ok(ResolvedConfiguration {
                configuration,
                fell_back,
            });
        }
        warn!(
            group,
            planner_id,
            "Cannot find planning configuration for group '{}' using planner '{}'. Will use defaults instead.",
            group,
            planner_id
        );
        fell_back = true;
    }

    match configs.get(group) {
        Some(configuration) => Ok(ResolvedConfiguration {
            configuration,
            fell_back,
        }),
        None => {
            error!("Cannot find planning configuration for group '{}'", group);
            Err(ContextError::NoPlannerConfiguration(group.to_string()))
        }
    }
}

pub struct PlanningContextManager {
    robot_model: Arc<dyn RobotModel>,
    constraint_sampler_manager: Option<Arc<dyn ConstraintSamplerManager>>,
    planners: Arc<RwLock<PlannerRegistry>>,
    state_spaces: StateSpaceRegistry,
    allocator: Arc<Mutex<MultiQueryPlannerAllocator>>,
    planner_configs: PlannerConfigurationMap,
    tuning: TuningParameters,
    cache: ContextCache,
}

impl PlanningContextManager {
    /// Manager with the default state spaces, file-backed planner-data
    /// storage and no planners registered.
    pub fn new(robot_model: Arc<dyn RobotModel>) -> Self {
        let allocator = MultiQueryPlannerAllocator::new(Arc::new(FilePlannerDataStorage::new()));
        Self::with_registries(
            robot_model,
            PlannerRegistry::new(),
            StateSpaceRegistry::with_defaults(),
            allocator,
        )
    }

    pub fn with_registries(
        robot_model: Arc<dyn RobotModel>,
        planners: PlannerRegistry,
        state_spaces: StateSpaceRegistry,
        allocator: MultiQueryPlannerAllocator,
    ) -> Self {
        Self {
            robot_model,
            constraint_sampler_manager: None,
            planners: Arc::new(RwLock::new(planners)),
            state_spaces,
            allocator: Arc::new(Mutex::new(allocator)),
            planner_configs: PlannerConfigurationMap::new(),
            tuning: TuningParameters::default(),
            cache: ContextCache::new(),
        }
    }

    /// Manager set up from a loaded configuration
    pub fn from_config(robot_model: Arc<dyn RobotModel>, config: &PlanCacheConfig) -> Self {
        let mut allocator = MultiQueryPlannerAllocator::new(Arc::new(FilePlannerDataStorage::new()));
        if let Some(dir) = &config.storage.default_planner_data_dir {
            allocator = allocator.with_data_dir(dir);
        }
        let mut manager = Self::with_registries(
            robot_model,
            PlannerRegistry::new(),
            StateSpaceRegistry::with_defaults(),
            allocator,
        );
        manager.set_planner_configurations(config.planner_configurations());
        manager.set_tuning(config.tuning.clone());
        manager
    }

    pub fn with_constraint_sampler_manager(
        mut self,
        samplers: Arc<dyn ConstraintSamplerManager>,
    ) -> Self {
        self.constraint_sampler_manager = Some(samplers);
        self
    }

    pub fn robot_model(&self) -> &Arc<dyn RobotModel> {
        &self.robot_model
    }

    pub fn register_planner_allocator(&self, name: &str, allocator: ConfiguredPlannerAllocator) {
        self.planners.write().register(name, allocator);
    }

    /// Register an algorithm family, routed through the multi-query allocator
    pub fn register_planner_type(&self, planner_type: PlannerType) {
        let id = planner_type.id().to_string();
        let allocator = configured_allocator(planner_type, Arc::clone(&self.allocator));
        self.register_planner_allocator(&id, allocator);
    }

    /// Register every default planner id the library provides. Graph-seeded
    /// construction is kept only for the roadmap families. Returns how many
    /// were registered.
    pub fn register_default_planners(&self, library: &dyn PlannerLibrary) -> usize {
        let mut registered = 0;
        for id in DEFAULT_PLANNER_IDS {
            let Some(mut planner_type) = library.planner_type(id) else {
                debug!(planner = id, "Planner not provided by the algorithm library");
                continue;
            };
            if planner_type.supports_graph_seeding() && !allows_graph_seeding(id) {
                planner_type = planner_type.without_persistence();
            }
            self.register_planner_type(planner_type);
            registered += 1;
        }
        info!(registered, "Registered default planners");
        registered
    }

    pub fn registered_planners(&self) -> Vec<String> {
        self.planners.read().names()
    }

    pub fn register_state_space_factory(&mut self, factory: Arc<dyn StateSpaceFactory>) {
        self.state_spaces.register(factory);
    }

    pub fn registered_state_space_types(&self) -> Vec<String> {
        self.state_spaces.types()
    }

    /// Resolver over the planner registry, including later registrations
    pub fn planner_selector(&self) -> PlannerSelector {
        let planners = Arc::clone(&self.planners);
        Arc::new(move |name: &str| planners.read().resolve(name))
    }

    pub fn set_planner_configurations(&mut self, configs: PlannerConfigurationMap) {
        self.planner_configs = configs;
    }

    pub fn planner_configurations(&self) -> &PlannerConfigurationMap {
        &self.planner_configs
    }

    pub fn tuning(&self) -> &TuningParameters {
        &self.tuning
    }

    pub fn set_tuning(&mut self, tuning: TuningParameters) {
        self.tuning = tuning;
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

    pub fn set_maximum_planning_threads(&mut self, threads: u32) {
        self.tuning.max_planning_threads = threads;
    }

    pub fn set_maximum_solution_segment_length(&mut self, length: f64) {
        self.tuning.max_solution_segment_length = length;
    }

    pub fn set_minimum_waypoint_count(&mut self, count: u32) {
        self.tuning.minimum_waypoint_count = count;
    }

    pub fn state_space_factory(
        &self,
        factory_type: &str,
    ) -> Result<Arc<dyn StateSpaceFactory>, ContextError> {
        self.state_spaces.lookup(factory_type)
    }

    pub fn select_state_space_factory(
        &self,
        group: &str,
        req: &MotionPlanRequest,
    ) -> Result<Arc<dyn StateSpaceFactory>, ContextError> {
        self.state_spaces.select(group, req, self.robot_model.as_ref())
    }

    /// Pooled contexts for a configuration and representation
    pub fn cached_context_count(&self, config_name: &str, space_type: &str) -> usize {
        self.cache.cached_count(config_name, space_type)
    }

    pub fn allocator(&self) -> &Arc<Mutex<MultiQueryPlannerAllocator>> {
        &self.allocator
    }

    /// Check out a context for `req`, loaded with the scene and the request
    /// and configured.
    pub fn get_planning_context(
        &self,
        scene: Option<Arc<dyn PlanningScene>>,
        req: &MotionPlanRequest,
    ) -> Result<ContextCheckout, ContextError> {
        if req.group_name.is_empty() {
            error!("No group specified to plan for");
            return Err(ContextError::InvalidGroupName);
        }
        let Some(scene) = scene else {
            error!("No planning scene supplied as input");
            return Err(ContextError::NoPlanningScene);
        };

        let resolved = resolve_configuration(&self.planner_configs, &req.group_name, &req.planner_id)?;
        let config = resolved.configuration;

        let factory = self.choose_state_space_factory(config, req)?;
        let space_type = factory.parameterization_type().to_string();

        let mut context = self.cache.get_or_create(
            &config.name,
            &space_type,
            &config.config,
            &self.tuning,
            || self.create_planning_context(config, factory.as_ref(), req),
        )?;

        context.clear();

        let start_state = scene.current_state_updated(req.start_state.as_ref());
        context.set_planning_scene(scene);
        context.set_motion_plan_request(req.clone());
        context.set_complete_initial_state(start_state);
        context.set_planning_volume(&req.workspace_parameters);
        context.set_path_constraints(&req.path_constraints)?;
        context.set_goal_constraints(&req.goal_constraints, &req.path_constraints)?;

        if let Err(e) = context.configure() {
            error!(
                context = %config.name,
                error = %e,
                "Planner library failed while configuring the planning context"
            );
            return Err(e);
        }

        debug!(
            context = %config.name,
            context_id = context.id().as_u64(),
            space_type,
            "Planning context is ready"
        );
        Ok(context)
    }

    /// Representation precedence: enforced constrained space (when the path
    /// constraints carry a single position or orientation constraint), then
    /// enforced joint space, then priority selection.
    fn choose_state_space_factory(
        &self,
        config: &PlannerConfiguration,
        req: &MotionPlanRequest,
    ) -> Result<Arc<dyn StateSpaceFactory>, ContextError> {
        let enforce_constrained = flag(&config.config, KEY_ENFORCE_CONSTRAINED_STATE_SPACE)?;
        let enforce_joint = flag(&config.config, KEY_ENFORCE_JOINT_MODEL_STATE_SPACE)?;
        let path = &req.path_constraints;

        if enforce_constrained
            && (path.position_constraints.len() == 1 || path.orientation_constraints.len() == 1)
        {
            debug!(context = %config.name, "Constrained state space is enforced");
            self.state_spaces.lookup(CONSTRAINED_PARAMETERIZATION_TYPE)
        } else if enforce_joint {
            debug!(context = %config.name, "Joint model state space is enforced");
            self.state_spaces.lookup(JOINT_PARAMETERIZATION_TYPE)
        } else {
            self.state_spaces
                .select(&config.group, req, self.robot_model.as_ref())
        }
    }

    fn create_planning_context(
        &self,
        config: &PlannerConfiguration,
        factory: &dyn StateSpaceFactory,
        req: &MotionPlanRequest,
    ) -> Result<PlanningContext, ContextError> {
        let spec = StateSpaceSpecification::new(Arc::clone(&self.robot_model), &config.group);
        let state_space = factory.new_state_space(&spec)?;

        let search_space = if factory.parameterization_type() == CONSTRAINED_PARAMETERIZATION_TYPE {
            let constraint = create_path_constraint(
                self.robot_model.as_ref(),
                &config.group,
                &req.path_constraints,
            )?;
            SearchSpace::constrained(ProjectedStateSpace::new(
                Arc::clone(&state_space),
                constraint,
            ))
        } else {
            SearchSpace::new(Arc::clone(&state_space))
        };

        let context_spec = ContextSpecification {
            config: config.config.clone(),
            planner_selector: self.planner_selector(),
            constraint_sampler_manager: self.constraint_sampler_manager.clone(),
            robot_model: Arc::clone(&self.robot_model),
            state_space,
            search_space,
        };
        Ok(PlanningContext::new(&config.name, context_spec))
    }
}
