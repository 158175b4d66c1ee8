//! Registry of named pools and the `acquire` entry point

use crate::config::{PoolConfiguration, PoolSpec};
use crate::errors::{PoolError, PoolResult};
use crate::health::HealthStatus;
use crate::metrics::{MetricsExporter, PoolMetrics};
use crate::pool::{ObjectHandle, Pool};
use crate::scheduler::DeactivationScheduler;
use crate::transform::{Quaternion, Transform, Vector3};

use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, trace};

/// Owner of every named pool
///
/// Build one per scene and hand a reference (or an `Arc`) to the systems that
/// spawn objects. Pools are fixed at construction: they never grow, shrink or
/// destroy their objects.
///
/// # Examples
///
/// ```
/// use prefab_pool::{FrameScheduler, PoolManager, PoolSpec, Quaternion, Vector3};
/// use std::sync::Arc;
///
/// let manager = PoolManager::new(
///     vec![PoolSpec::new("bullet", "bullet_prefab", 3)],
///     Arc::new(FrameScheduler::new()),
/// ).unwrap();
///
/// let first = manager.acquire("bullet", Vector3::new(0.0, 1.0, 0.0), Quaternion::IDENTITY).unwrap();
/// assert!(first.is_active());
/// assert_eq!(first.position().y, 1.0);
///
/// assert!(manager.acquire("rocket", Vector3::ZERO, Quaternion::IDENTITY).is_err());
/// ```
pub struct PoolManager<T> {
    pools: DashMap<String, Arc<Pool<T>>>,
    order: Vec<String>,
    config: PoolConfiguration<T>,
    scheduler: Arc<dyn DeactivationScheduler>,
    pool_not_found: AtomicUsize,
}

impl<T: Clone + Send + 'static> PoolManager<T> {
    /// Register pools with the default configuration
    pub fn new(
        specs: Vec<PoolSpec<T>>,
        scheduler: Arc<dyn DeactivationScheduler>,
    ) -> PoolResult<Self> {
        Self::with_configuration(specs, PoolConfiguration::default(), scheduler)
    }

    /// Register pools in the given order
    ///
    /// Every spec is validated before any object is cloned, so a rejected
    /// registration leaves nothing behind.
    pub fn with_configuration(
        specs: Vec<PoolSpec<T>>,
        config: PoolConfiguration<T>,
        scheduler: Arc<dyn DeactivationScheduler>,
    ) -> PoolResult<Self> {
        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(PoolError::DuplicatePoolName(spec.name.clone()));
            }
        }

        let pools = DashMap::with_capacity(specs.len());
        let mut order = Vec::with_capacity(specs.len());
        for spec in specs {
            let pool = Pool::new(spec, config.on_deactivate)?;
            debug!(
                pool = pool.name(),
                size = pool.len(),
                time_to_deactivate = pool.time_to_deactivate(),
                "registered pool"
            );
            order.push(pool.name().to_string());
            pools.insert(pool.name().to_string(), Arc::new(pool));
        }

        Ok(Self {
            pools,
            order,
            config,
            scheduler,
            pool_not_found: AtomicUsize::new(0),
        })
    }

    /// Take the next object of a pool, place it and activate it
    ///
    /// The object moves to the back of its pool's queue. When the pool has a
    /// positive `time_to_deactivate`, a timer deactivates the object after
    /// that delay unless it has been acquired or deactivated again meanwhile.
    ///
    /// With [`RecyclePolicy::RoundRobin`](crate::RecyclePolicy::RoundRobin)
    /// the returned object may still be in use by an earlier caller; size
    /// pools above peak concurrent demand.
    pub fn acquire(
        &self,
        name: &str,
        position: Vector3,
        rotation: Quaternion,
    ) -> PoolResult<ObjectHandle<T>> {
        let Some(pool) = self.pools.get(name).map(|entry| Arc::clone(entry.value())) else {
            self.pool_not_found.fetch_add(1, Ordering::Relaxed);
            error!(pool = name, "no pool with this name exists; check spelling and capitalization");
            return Err(PoolError::PoolNotFound(name.to_string()));
        };

        let handle = match pool.next(self.config.recycle_policy) {
            Ok(handle) => handle,
            Err(e) => {
                pool.metrics.exhausted_events.fetch_add(1, Ordering::Relaxed);
                debug!(pool = name, "every object is active, refusing acquire");
                return Err(e);
            }
        };

        let (generation, was_active) =
            handle.activate(Transform::new(position, rotation), self.config.on_activate);
        pool.metrics.total_acquired.fetch_add(1, Ordering::Relaxed);

        if was_active {
            pool.metrics.premature_reuses.fetch_add(1, Ordering::Relaxed);
            debug!(pool = name, id = handle.id(), "reusing an object that is still active");
        }

        if let Some(delay) = pool.deactivate_after() {
            pool.metrics.deactivations_scheduled.fetch_add(1, Ordering::Relaxed);
            let target = handle.clone();
            let owner = Arc::clone(&pool);
            self.scheduler.schedule(
                delay,
                Box::new(move || {
                    if target.expire(generation) {
                        owner.metrics.deactivations_fired.fetch_add(1, Ordering::Relaxed);
                        trace!(pool = owner.name(), id = target.id(), "timed deactivation");
                    } else {
                        owner.metrics.stale_deactivations.fetch_add(1, Ordering::Relaxed);
                        trace!(pool = owner.name(), id = target.id(), "skipping stale deactivation");
                    }
                }),
            );
        }

        Ok(handle)
    }

    /// Acquire without an error value
    pub fn try_acquire(
        &self,
        name: &str,
        position: Vector3,
        rotation: Quaternion,
    ) -> Option<ObjectHandle<T>> {
        self.acquire(name, position, rotation).ok()
    }
}

impl<T> PoolManager<T> {
    fn pool(&self, name: &str) -> PoolResult<Arc<Pool<T>>> {
        self.pools
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| PoolError::PoolNotFound(name.to_string()))
    }

    /// Deactivate every object of a pool; returns how many were active
    pub fn deactivate_all(&self, name: &str) -> PoolResult<usize> {
        let pool = self.pool(name)?;
        Ok(pool.handles().iter().filter(|h| h.deactivate()).count())
    }

    /// Pool names in registration order
    pub fn pool_names(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pools.contains_key(name)
    }

    /// Number of objects owned by a pool
    pub fn handle_count(&self, name: &str) -> PoolResult<usize> {
        Ok(self.pool(name)?.len())
    }

    /// Number of currently active objects in a pool
    pub fn active_count(&self, name: &str) -> PoolResult<usize> {
        Ok(self.pool(name)?.active_count())
    }

    /// Every object of a pool, ordered by id
    pub fn handles(&self, name: &str) -> PoolResult<Vec<ObjectHandle<T>>> {
        Ok(self.pool(name)?.handles().to_vec())
    }

    /// Configured auto-deactivation delay of a pool in seconds
    pub fn time_to_deactivate(&self, name: &str) -> PoolResult<f32> {
        Ok(self.pool(name)?.time_to_deactivate())
    }

    /// Acquires that named an unknown pool
    pub fn pool_not_found_count(&self) -> usize {
        self.pool_not_found.load(Ordering::Relaxed)
    }

    /// Get pool metrics
    pub fn get_metrics(&self, name: &str) -> PoolResult<PoolMetrics> {
        let pool = self.pool(name)?;
        Ok(pool.metrics.get_metrics(pool.active_count(), pool.len()))
    }

    /// Get health status
    pub fn get_health_status(&self, name: &str) -> PoolResult<HealthStatus> {
        let pool = self.pool(name)?;
        Ok(HealthStatus::new(
            pool.active_count(),
            pool.len(),
            pool.metrics.premature_reuses.load(Ordering::Relaxed),
        ))
    }

    /// Export metrics of one pool
    pub fn export_metrics(&self, name: &str) -> PoolResult<HashMap<String, String>> {
        Ok(self.get_metrics(name)?.export())
    }

    /// Export metrics of every pool in Prometheus format
    pub fn export_metrics_prometheus(&self, tags: Option<&HashMap<String, String>>) -> String {
        let metrics: Vec<_> = self
            .order
            .iter()
            .filter_map(|name| Some((name.clone(), self.get_metrics(name).ok()?)))
            .collect();
        MetricsExporter::export_prometheus(&metrics, self.pool_not_found_count(), tags)
    }
}
