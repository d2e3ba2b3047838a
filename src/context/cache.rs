//! Context cache
//!
//! Contexts are pooled per `(configuration name, state-space type)`. Each
//! pooled context sits behind its own mutex; a checkout holds that lock for
//! as long as the caller keeps the [`ContextCheckout`], so a context is
//! offered again exactly when no checkout for it is outstanding.

use crate::context::{PlanningContext, TuningParameters};
use crate::error::ContextError;
use crate::params::PlannerParams;
use crate::space::CONSTRAINED_PARAMETERIZATION_TYPE;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::debug;

type CacheKey = (String, String);
type ContextSlot = Arc<Mutex<PlanningContext>>;

/// Exclusive lease on a planning context
pub struct ContextCheckout {
    guard: ArcMutexGuard<RawMutex, PlanningContext>,
    cached: bool,
}

impl ContextCheckout {
    fn new(guard: ArcMutexGuard<RawMutex, PlanningContext>, cached: bool) -> Self {
        Self { guard, cached }
    }

    /// Whether the context returns to the pool when this checkout is dropped
    pub fn is_cached(&self) -> bool {
        self.cached
    }
}

impl Deref for ContextCheckout {
    type Target = PlanningContext;

    fn deref(&self) -> &PlanningContext {
        &self.guard
    }
}

impl DerefMut for ContextCheckout {
    fn deref_mut(&mut self) -> &mut PlanningContext {
        &mut self.guard
    }
}

impl std::fmt::Debug for ContextCheckout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCheckout")
            .field("context", &self.guard.name())
            .field("id", &self.guard.id())
            .field("cached", &self.cached)
            .finish()
    }
}

#[derive(Default)]
pub struct ContextCache {
    entries: Mutex<HashMap<CacheKey, Vec<ContextSlot>>>,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check out an idle context for the key, or build one with `build`.
    ///
    /// The map lock is held only while scanning and inserting; `build` runs
    /// without it. Contexts over the constrained representation are never
    /// pooled. Tuning and the configuration's parameters are applied to the
    /// returned context either way.
    pub fn get_or_create<F>(
        &self,
        config_name: &str,
        space_type: &str,
        config: &PlannerParams,
        tuning: &TuningParameters,
        build: F,
    ) -> Result<ContextCheckout, ContextError>
    where
        F: FnOnce() -> Result<PlanningContext, ContextError>,
    {
        let key = (config_name.to_string(), space_type.to_string());

        let reused = {
            let entries = self.entries.lock();
            entries
                .get(&key)
                .and_then(|slots| slots.iter().find_map(|slot| slot.try_lock_arc()))
        };

        let mut checkout = match reused {
            Some(guard) => {
                debug!(
                    config = config_name,
                    space_type,
                    context_id = guard.id().as_u64(),
                    "Reusing cached planning context"
                );
                ContextCheckout::new(guard, true)
            }
            None => {
                let context = build()?;
                let slot: ContextSlot = Arc::new(Mutex::new(context));
                let guard = slot.lock_arc();
                let cached = space_type != CONSTRAINED_PARAMETERIZATION_TYPE;
                if cached {
                    self.entries
                        .lock()
                        .entry(key)
                        .or_default()
                        .push(Arc::clone(&slot));
                }
                debug!(
                    config = config_name,
                    space_type,
                    context_id = guard.id().as_u64(),
                    cached,
                    "Creating new planning context"
                );
                ContextCheckout::new(guard, cached)
            }
        };

        checkout.set_specification_config(config.clone());
        checkout.apply_tuning(tuning);
        Ok(checkout)
    }

    /// Pooled contexts for the key, checked out or idle
    pub fn cached_count(&self, config_name: &str, space_type: &str) -> usize {
        let key = (config_name.to_string(), space_type.to_string());
        self.entries.lock().get(&key).map_or(0, Vec::len)
    }

    /// Pooled contexts across all keys
    pub fn len(&self) -> usize {
        self.entries.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every pooled context. Outstanding checkouts stay valid.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
