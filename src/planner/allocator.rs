//! Multi-query planner allocator
//!
//! Planners such as PRM build a roadmap that stays useful across requests.
//! When a configuration enables multi-query planning, the allocator keeps
//! the latest instance per name and seeds every new instance with the
//! previous one's graph. The live instance itself is never handed out twice:
//! resuming the same object is not known to be safe, so a new one is built
//! from the extracted graph each time.
//!
//! Instances flagged with `store_planner_data` have their roadmap written to
//! `planner_data_path` when the allocator is dropped.

use crate::error::PlannerError;
use crate::params::{take_flag, PlannerParams};
use crate::planner::registry::ConfiguredPlannerAllocator;
use crate::planner::{Planner, PlannerData, PlannerDataStorage, PlannerHandle, PlannerType};
use crate::space::SearchSpace;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const KEY_MULTI_QUERY_PLANNING_ENABLED: &str = "multi_query_planning_enabled";
pub const KEY_LOAD_PLANNER_DATA: &str = "load_planner_data";
pub const KEY_STORE_PLANNER_DATA: &str = "store_planner_data";
pub const KEY_PLANNER_DATA_PATH: &str = "planner_data_path";

/// Keys consumed by the allocator; they never reach a planner's parameters
pub const ALLOCATOR_DIRECTIVE_KEYS: &[&str] = &[
    KEY_MULTI_QUERY_PLANNING_ENABLED,
    KEY_LOAD_PLANNER_DATA,
    KEY_STORE_PLANNER_DATA,
    KEY_PLANNER_DATA_PATH,
];

#[derive(Debug, Clone, Default, PartialEq)]
struct AllocatorDirectives {
    multi_query: bool,
    load: bool,
    store: bool,
    path: Option<PathBuf>,
}

impl AllocatorDirectives {
    /// Strip the allocator keys out of `cfg`
    fn take(cfg: &mut PlannerParams) -> Result<Self, PlannerError> {
        let multi_query = take_flag(cfg, KEY_MULTI_QUERY_PLANNING_ENABLED)?;
        let load = take_flag(cfg, KEY_LOAD_PLANNER_DATA)?;
        let store = take_flag(cfg, KEY_STORE_PLANNER_DATA)?;
        let path = cfg
            .remove(KEY_PLANNER_DATA_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            multi_query,
            load,
            store,
            path,
        })
    }
}

/// Keeps multi-query planner instances and their persistence settings
pub struct MultiQueryPlannerAllocator {
    planners: HashMap<String, PlannerHandle>,
    storage_paths: HashMap<String, PathBuf>,
    storage: Arc<dyn PlannerDataStorage>,
    data_dir: Option<PathBuf>,
}

impl MultiQueryPlannerAllocator {
    pub fn new(storage: Arc<dyn PlannerDataStorage>) -> Self {
        Self {
            planners: HashMap::new(),
            storage_paths: HashMap::new(),
            storage,
            data_dir: None,
        }
    }

    /// Resolve relative `planner_data_path` values against `dir`
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Number of managed multi-query instances
    pub fn len(&self) -> usize {
        self.planners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planners.is_empty()
    }

    /// Current managed instance for `name`
    pub fn planner(&self, name: &str) -> Option<PlannerHandle> {
        self.planners.get(name).cloned()
    }

    /// Path the roadmap of `name` will be written to on drop
    pub fn storage_path(&self, name: &str) -> Option<&Path> {
        self.storage_paths.get(name).map(PathBuf::as_path)
    }

    /// Build a planner of `planner_type` named `new_name`.
    ///
    /// The allocator directives are removed from `config`; what remains is
    /// applied to the planner's parameter set, strictly.
    pub fn allocate(
        &mut self,
        planner_type: &PlannerType,
        si: &SearchSpace,
        new_name: &str,
        config: &PlannerParams,
    ) -> Result<PlannerHandle, PlannerError> {
        let mut cfg = config.clone();
        let directives = AllocatorDirectives::take(&mut cfg)?;

        if !directives.multi_query {
            let planner = build_planner(planner_type, si, new_name, &cfg, None)?;
            return Ok(Arc::new(Mutex::new(planner)));
        }

        if let Some(existing) = self.planners.get(new_name) {
            let data = existing.lock().planner_data();
            info!(
                planner = new_name,
                num_edges = data.num_edges(),
                num_vertices = data.num_vertices(),
                "Reusing planner data"
            );
            let planner = build_planner(planner_type, si, new_name, &cfg, Some(data))?;
            let handle: PlannerHandle = Arc::new(Mutex::new(planner));
            self.planners
                .insert(new_name.to_string(), Arc::clone(&handle));
            return Ok(handle);
        }

        let path = directives.path.as_deref().map(|p| self.resolve_path(p));

        let seed = if directives.load {
            self.load_seed(planner_type, new_name, path.as_deref())
        } else {
            None
        };

        let planner = build_planner(planner_type, si, new_name, &cfg, seed)?;
        let handle: PlannerHandle = Arc::new(Mutex::new(planner));

        if directives.store {
            match path {
                Some(path) => {
                    self.storage_paths.insert(new_name.to_string(), path);
                }
                None => warn!(
                    planner = new_name,
                    "store_planner_data is set but no planner_data_path was given; roadmap will not be stored"
                ),
            }
        }

        self.planners
            .insert(new_name.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Write the roadmap of every instance flagged for storage. Failures are
    /// logged and do not stop the remaining writes. Returns how many were stored.
    pub fn store_planner_data(&self) -> usize {
        let mut stored = 0;
        for (name, path) in &self.storage_paths {
            let Some(planner) = self.planners.get(name) else {
                continue;
            };
            let data = planner.lock().planner_data();
            info!(
                planner = %name,
                num_edges = data.num_edges(),
                num_vertices = data.num_vertices(),
                path = %path.display(),
                "Storing planner data"
            );
            match self.storage.store(&data, path) {
                Ok(()) => stored += 1,
                Err(e) => error!(
                    planner = %name,
                    path = %path.display(),
                    "Failed to store planner data: {}",
                    e
                ),
            }
        }
        stored
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.data_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn load_seed(
        &self,
        planner_type: &PlannerType,
        name: &str,
        path: Option<&Path>,
    ) -> Option<PlannerData> {
        if !planner_type.supports_graph_seeding() {
            warn!(
                planner = name,
                planner_type = planner_type.id(),
                "Creating a planner from persistent data is not supported. Going to create a new instance."
            );
            return None;
        }
        let Some(path) = path else {
            warn!(
                planner = name,
                "load_planner_data is set but no planner_data_path was given; creating a new instance"
            );
            return None;
        };
        match self.storage.load(path) {
            Ok(data) => {
                info!(
                    planner = name,
                    num_edges = data.num_edges(),
                    num_vertices = data.num_vertices(),
                    path = %path.display(),
                    "Loading planner data"
                );
                Some(data)
            }
            Err(e) => {
                error!(
                    planner = name,
                    path = %path.display(),
                    "Failed to load planner data, creating a new instance: {}",
                    e
                );
                None
            }
        }
    }
}

impl Drop for MultiQueryPlannerAllocator {
    fn drop(&mut self) {
        if !self.storage_paths.is_empty() {
            let stored = self.store_planner_data();
            debug!(stored, "Planner allocator released");
        }
    }
}

/// Construct, name and parameterize one instance
fn build_planner(
    planner_type: &PlannerType,
    si: &SearchSpace,
    new_name: &str,
    cfg: &PlannerParams,
    seed: Option<PlannerData>,
) -> Result<Box<dyn Planner>, PlannerError> {
    let mut planner = match seed {
        Some(data) => match planner_type.construct_seeded(si, data) {
            Some(planner) => planner,
            None => {
                warn!(
                    planner = new_name,
                    planner_type = planner_type.id(),
                    "Creating a planner from persistent data is not supported. Going to create a new instance."
                );
                planner_type.construct(si)
            }
        },
        None => planner_type.construct(si),
    };

    if !new_name.is_empty() {
        planner.set_name(new_name);
    }

    let owner = planner.name().to_string();
    planner.params_mut().set_params(&owner, cfg)?;
    Ok(planner)
}

/// Wrap `planner_type` into a registry allocator routed through `allocator`
pub fn configured_allocator(
    planner_type: PlannerType,
    allocator: Arc<Mutex<MultiQueryPlannerAllocator>>,
) -> ConfiguredPlannerAllocator {
    Arc::new(
        move |si: &SearchSpace, new_name: &str, cfg: &PlannerParams| {
            allocator.lock().allocate(&planner_type, si, new_name, cfg)
        },
    )
}
