//! Health reporting for pools

/// Health status of a single pool
///
/// A pool whose objects are all active will hand out a live object on the
/// next acquire, so saturation marks it unhealthy.
///
/// # Examples
///
/// ```
/// use prefab_pool::{FrameScheduler, PoolManager, PoolSpec, Quaternion, Vector3};
/// use std::sync::Arc;
///
/// let manager = PoolManager::new(
///     vec![PoolSpec::new("bullet", (), 2)],
///     Arc::new(FrameScheduler::new()),
/// ).unwrap();
///
/// assert!(manager.get_health_status("bullet").unwrap().is_healthy());
///
/// manager.acquire("bullet", Vector3::ZERO, Quaternion::IDENTITY).unwrap();
/// manager.acquire("bullet", Vector3::ZERO, Quaternion::IDENTITY).unwrap();
///
/// let health = manager.get_health_status("bullet").unwrap();
/// assert!(!health.is_healthy());
/// assert_eq!(health.inactive_objects, 0);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Number of warnings detected
    pub warning_count: usize,

    /// Active ratio (0.0 to 1.0)
    pub utilization: f64,

    /// Objects ready to be handed out without reuse
    pub inactive_objects: usize,

    /// Objects currently active
    pub active_objects: usize,

    /// Objects owned by the pool
    pub total_objects: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Create a new health status
    pub fn new(active: usize, total: usize, premature_reuses: usize) -> Self {
        let utilization = if total > 0 {
            active as f64 / total as f64
        } else {
            0.0
        };

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        if total > 0 && active >= total {
            warnings.push("Pool is saturated - next acquire reuses an active object".to_string());
            is_healthy = false;
        } else if utilization > 0.9 {
            warnings.push(format!("High utilization: {:.1}%", utilization * 100.0));
            is_healthy = false;
        }

        if premature_reuses > 0 {
            warnings.push(format!(
                "{} active object(s) were reused - consider a larger pool",
                premature_reuses
            ));
        }

        Self {
            is_healthy,
            warning_count: warnings.len(),
            utilization,
            inactive_objects: total.saturating_sub(active),
            active_objects: active,
            total_objects: total,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_pool_is_healthy() {
        let health = HealthStatus::new(0, 10, 0);
        assert!(health.is_healthy());
        assert_eq!(health.warning_count, 0);
        assert_eq!(health.inactive_objects, 10);
    }

    #[test]
    fn test_reuse_history_warns_without_failing() {
        let health = HealthStatus::new(3, 10, 2);
        assert!(health.is_healthy());
        assert_eq!(health.warning_count, 1);
    }

    #[test]
    fn test_high_utilization_is_unhealthy() {
        let health = HealthStatus::new(19, 20, 0);
        assert!(!health.is_healthy());
        assert!(health.warnings[0].starts_with("High utilization"));
    }
}
