//! # prefab_pool
//!
//! Named, pre-allocated object pools for game objects. Each pool clones a
//! template a fixed number of times up front, keeps the clones inactive and
//! hands them out in round-robin order, so spawning never allocates.
//!
//! ## Features
//!
//! - One manager owning any number of named pools, no global state
//! - O(1) acquire that places, activates and recycles an object
//! - Optional timed deactivation with stale-timer protection
//! - Recycle policies that avoid or refuse reusing live objects
//! - Tokio-backed or frame-driven timers
//! - Metrics, health reporting and Prometheus export
//! - Pool specs loadable from JSON (`serde` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use prefab_pool::{FrameScheduler, PoolManager, PoolSpec, Quaternion, Vector3};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let timers = Arc::new(FrameScheduler::new());
//! let manager = PoolManager::new(
//!     vec![
//!         PoolSpec::new("bullet", "bullet_prefab", 3),
//!         PoolSpec::new("muzzle_flash", "flash_prefab", 1).with_time_to_deactivate(0.5),
//!     ],
//!     timers.clone(),
//! ).unwrap();
//!
//! let flash = manager.acquire("muzzle_flash", Vector3::ZERO, Quaternion::IDENTITY).unwrap();
//! assert!(flash.is_active());
//!
//! timers.advance(Duration::from_millis(500));
//! assert!(!flash.is_active());
//! ```

mod config;
mod errors;
mod health;
mod manager;
mod metrics;
mod pool;
mod scheduler;
mod transform;

#[cfg(feature = "serde")]
pub use config::specs_from_json;
pub use config::{PoolConfiguration, PoolSpec, RecyclePolicy};
pub use errors::{PoolError, PoolResult};
pub use health::HealthStatus;
pub use manager::PoolManager;
pub use metrics::{MetricsExporter, PoolMetrics};
pub use pool::ObjectHandle;
pub use scheduler::{DeactivationScheduler, DeferredTask, FrameScheduler, TokioScheduler};
pub use transform::{Quaternion, Transform, Vector3};
