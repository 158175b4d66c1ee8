//! Pool specifications and manager configuration

use crate::errors::{PoolError, PoolResult};
use crate::transform::Transform;
use std::time::Duration;

/// Description of one named pool
///
/// `time_to_deactivate` is in seconds; zero or a negative value means objects
/// from this pool are never deactivated automatically.
///
/// # Examples
///
/// ```
/// use prefab_pool::PoolSpec;
/// use std::time::Duration;
///
/// let spec = PoolSpec::new("muzzle_flash", "flash", 4).with_time_to_deactivate(0.5);
/// assert_eq!(spec.deactivate_after(), Some(Duration::from_millis(500)));
///
/// let bullets = PoolSpec::new("bullet", "bullet", 32);
/// assert_eq!(bullets.deactivate_after(), None);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolSpec<T> {
    /// Unique pool name
    pub name: String,

    /// Object every pool member is cloned from
    pub template: T,

    /// Number of clones created at registration
    pub size: i32,

    /// Seconds until an acquired object deactivates itself
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_to_deactivate: f32,
}

impl<T> PoolSpec<T> {
    /// Create a spec that never auto-deactivates
    pub fn new(name: impl Into<String>, template: T, size: i32) -> Self {
        Self {
            name: name.into(),
            template,
            size,
            time_to_deactivate: 0.0,
        }
    }

    /// Set the auto-deactivation delay in seconds
    pub fn with_time_to_deactivate(mut self, seconds: f32) -> Self {
        self.time_to_deactivate = seconds;
        self
    }

    /// Delay before an acquired object is deactivated, if any
    pub fn deactivate_after(&self) -> Option<Duration> {
        if self.time_to_deactivate > 0.0 {
            Duration::try_from_secs_f32(self.time_to_deactivate).ok()
        } else {
            None
        }
    }

    pub(crate) fn validate(&self) -> PoolResult<usize> {
        let invalid = |reason: &str| PoolError::InvalidPoolSpec {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.size <= 0 {
            return Err(invalid(&format!("size must be positive, got {}", self.size)));
        }
        if !self.time_to_deactivate.is_finite() {
            return Err(invalid("time_to_deactivate must be a finite number"));
        }
        if self.time_to_deactivate > 0.0 && self.deactivate_after().is_none() {
            return Err(invalid("time_to_deactivate is out of range"));
        }

        Ok(self.size as usize)
    }
}

/// Parse an ordered list of pool specs from a JSON array
///
/// # Examples
///
/// ```
/// use prefab_pool::specs_from_json;
///
/// let specs = specs_from_json::<String>(r#"[
///     {"name": "bullet", "template": "bullet_prefab", "size": 3},
///     {"name": "spark", "template": "spark_prefab", "size": 8, "time_to_deactivate": 0.25}
/// ]"#).unwrap();
///
/// assert_eq!(specs.len(), 2);
/// assert_eq!(specs[1].time_to_deactivate, 0.25);
/// ```
#[cfg(feature = "serde")]
pub fn specs_from_json<T>(json: &str) -> PoolResult<Vec<PoolSpec<T>>>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(json).map_err(|e| PoolError::Config(e.to_string()))
}

/// How `acquire` chooses the next object of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecyclePolicy {
    /// Always take the front of the queue, even if it is still active
    #[default]
    RoundRobin,

    /// Prefer the first inactive object; reuse the front one when all are active
    SkipActive,

    /// Prefer the first inactive object; fail with `PoolExhausted` when all are active
    Strict,
}

/// Configuration shared by every pool of a manager
///
/// # Examples
///
/// ```
/// use prefab_pool::{PoolConfiguration, RecyclePolicy};
///
/// let config = PoolConfiguration::<u32>::new()
///     .with_recycle_policy(RecyclePolicy::SkipActive)
///     .with_on_deactivate(|hits| *hits = 0);
///
/// assert_eq!(config.recycle_policy, RecyclePolicy::SkipActive);
/// assert!(config.on_deactivate.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfiguration<T> {
    /// Object selection strategy
    pub recycle_policy: RecyclePolicy,

    /// Called after an object has been positioned and activated
    pub on_activate: Option<fn(&mut T, &Transform)>,

    /// Called when an object is deactivated
    pub on_deactivate: Option<fn(&mut T)>,
}

impl<T> Default for PoolConfiguration<T> {
    fn default() -> Self {
        Self {
            recycle_policy: RecyclePolicy::RoundRobin,
            on_activate: None,
            on_deactivate: None,
        }
    }
}

impl<T> PoolConfiguration<T> {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recycle policy
    pub fn with_recycle_policy(mut self, policy: RecyclePolicy) -> Self {
        self.recycle_policy = policy;
        self
    }

    /// Set the activation hook
    pub fn with_on_activate(mut self, hook: fn(&mut T, &Transform)) -> Self {
        self.on_activate = Some(hook);
        self
    }

    /// Set the deactivation hook
    pub fn with_on_deactivate(mut self, hook: fn(&mut T)) -> Self {
        self.on_deactivate = Some(hook);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_delay_never_deactivates() {
        assert_eq!(PoolSpec::new("a", (), 1).deactivate_after(), None);
        assert_eq!(
            PoolSpec::new("a", (), 1).with_time_to_deactivate(-2.0).deactivate_after(),
            None
        );
    }

    #[test]
    fn test_validate_rejects_bad_specs() {
        assert!(matches!(
            PoolSpec::new("a", (), 0).validate(),
            Err(PoolError::InvalidPoolSpec { .. })
        ));
        assert!(matches!(
            PoolSpec::new("a", (), -3).validate(),
            Err(PoolError::InvalidPoolSpec { .. })
        ));
        assert!(matches!(
            PoolSpec::new("  ", (), 2).validate(),
            Err(PoolError::InvalidPoolSpec { .. })
        ));
        assert!(matches!(
            PoolSpec::new("a", (), 2).with_time_to_deactivate(f32::NAN).validate(),
            Err(PoolError::InvalidPoolSpec { .. })
        ));
        assert!(matches!(
            PoolSpec::new("a", (), 2).with_time_to_deactivate(f32::INFINITY).validate(),
            Err(PoolError::InvalidPoolSpec { .. })
        ));
        assert_eq!(
            PoolSpec::new("a", (), 2).with_time_to_deactivate(1e30).validate(),
            Err(PoolError::InvalidPoolSpec {
                name: "a".to_string(),
                reason: "time_to_deactivate is out of range".to_string(),
            })
        );
        assert_eq!(PoolSpec::new("a", (), 2).validate(), Ok(2));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_specs_from_json_reports_errors() {
        let err = specs_from_json::<String>("{not json").unwrap_err();
        assert!(matches!(err, PoolError::Config(_)));
    }
}
