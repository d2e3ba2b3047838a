//! Planning algorithms as seen by the context manager
//!
//! Algorithms themselves live in an external library; here they are only
//! constructible, nameable, parameterizable objects that can hand out their
//! search graph. [`PlannerType`] is one row of the capability table: how to
//! build a fresh instance and, for multi-query families, how to build one
//! seeded from an existing graph.

pub mod allocator;
pub mod data;
pub mod registry;
pub mod storage;

pub use allocator::MultiQueryPlannerAllocator;
pub use data::{PlannerData, PlannerDataEdge, PlannerDataVertex};
pub use registry::{ConfiguredPlannerAllocator, PlannerRegistry, PlannerSelector};
pub use storage::{FilePlannerDataStorage, PlannerDataStorage};

use crate::error::PlannerError;
use crate::params::ParamSet;
use crate::space::SearchSpace;
use parking_lot::Mutex;
use std::sync::Arc;

/// Planner ids registered by default, when the algorithm library provides them
pub const DEFAULT_PLANNER_IDS: &[&str] = &[
    "geometric::AnytimePathShortening",
    "geometric::BFMT",
    "geometric::BiEST",
    "geometric::BiTRRT",
    "geometric::BKPIECE",
    "geometric::EST",
    "geometric::FMT",
    "geometric::KPIECE",
    "geometric::LazyPRM",
    "geometric::LazyPRMstar",
    "geometric::LazyRRT",
    "geometric::LBKPIECE",
    "geometric::LBTRRT",
    "geometric::PDST",
    "geometric::PRM",
    "geometric::PRMstar",
    "geometric::ProjEST",
    "geometric::RRT",
    "geometric::RRTConnect",
    "geometric::RRTstar",
    "geometric::SBL",
    "geometric::SPARS",
    "geometric::SPARStwo",
    "geometric::STRIDE",
    "geometric::TRRT",
    "geometric::PRMcustom",
];

/// Families whose instances can be constructed from an existing roadmap
pub const GRAPH_SEEDED_PLANNER_IDS: &[&str] = &[
    "geometric::PRM",
    "geometric::PRMstar",
    "geometric::LazyPRM",
    "geometric::LazyPRMstar",
    "geometric::PRMcustom",
];

/// Planner used when a configuration does not name one
pub const DEFAULT_PLANNER_ID: &str = "geometric::RRTConnect";

/// A configured sampling-based planning engine
pub trait Planner: Send {
    fn name(&self) -> &str;

    fn set_name(&mut self, name: &str);

    fn params(&self) -> &ParamSet;

    fn params_mut(&mut self) -> &mut ParamSet;

    /// Snapshot of the current search graph
    fn planner_data(&self) -> PlannerData;

    /// Prepare for solving; failures raised by the library surface here
    fn setup(&mut self) -> Result<(), PlannerError>;

    /// Forget everything computed so far
    fn clear(&mut self);
}

/// Planner instance shared between a context and the multi-query allocator
pub type PlannerHandle = Arc<Mutex<Box<dyn Planner>>>;

pub type PlannerConstructor = Arc<dyn Fn(&SearchSpace) -> Box<dyn Planner> + Send + Sync>;

pub type SeededPlannerConstructor =
    Arc<dyn Fn(&SearchSpace, PlannerData) -> Box<dyn Planner> + Send + Sync>;

/// Construction capabilities of one algorithm family
#[derive(Clone)]
pub struct PlannerType {
    id: String,
    construct: PlannerConstructor,
    construct_seeded: Option<SeededPlannerConstructor>,
}

impl PlannerType {
    pub fn new<F>(id: &str, construct: F) -> Self
    where
        F: Fn(&SearchSpace) -> Box<dyn Planner> + Send + Sync + 'static,
    {
        Self {
            id: id.to_string(),
            construct: Arc::new(construct),
            construct_seeded: None,
        }
    }

    /// Declare that instances can be rebuilt from a stored or extracted graph
    pub fn with_persistence<F>(mut self, construct_seeded: F) -> Self
    where
        F: Fn(&SearchSpace, PlannerData) -> Box<dyn Planner> + Send + Sync + 'static,
    {
        self.construct_seeded = Some(Arc::new(construct_seeded));
        self
    }

    pub fn without_persistence(mut self) -> Self {
        self.construct_seeded = None;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn supports_graph_seeding(&self) -> bool {
        self.construct_seeded.is_some()
    }

    pub fn construct(&self, si: &SearchSpace) -> Box<dyn Planner> {
        (self.construct)(si)
    }

    /// Build an instance seeded from `data`, or `None` if the family cannot
    pub fn construct_seeded(&self, si: &SearchSpace, data: PlannerData) -> Option<Box<dyn Planner>> {
        self.construct_seeded.as_ref().map(|f| f(si, data))
    }
}

impl std::fmt::Debug for PlannerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannerType")
            .field("id", &self.id)
            .field("graph_seeding", &self.supports_graph_seeding())
            .finish()
    }
}

/// External algorithm library
pub trait PlannerLibrary {
    /// Construction capabilities for `id`, if the library provides it
    fn planner_type(&self, id: &str) -> Option<PlannerType>;
}

/// Whether the capability table allows graph-seeded construction for `id`
pub fn allows_graph_seeding(id: &str) -> bool {
    GRAPH_SEEDED_PLANNER_IDS.contains(&id)
}
