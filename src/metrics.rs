//! Metrics collection and export for pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Snapshot of one pool's counters
///
/// # Examples
///
/// ```
/// use prefab_pool::{FrameScheduler, PoolManager, PoolSpec, Quaternion, Vector3};
/// use std::sync::Arc;
///
/// let manager = PoolManager::new(
///     vec![PoolSpec::new("bullet", (), 3)],
///     Arc::new(FrameScheduler::new()),
/// ).unwrap();
///
/// manager.acquire("bullet", Vector3::ZERO, Quaternion::IDENTITY).unwrap();
/// let metrics = manager.get_metrics("bullet").unwrap();
/// assert_eq!(metrics.total_acquired, 1);
/// assert_eq!(metrics.active_objects, 1);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Total successful acquires
    pub total_acquired: usize,

    /// Acquires that handed out an object which was still active
    pub premature_reuses: usize,

    /// Acquires refused because every object was active
    pub exhausted_events: usize,

    /// Deactivation timers started
    pub deactivations_scheduled: usize,

    /// Timers that deactivated their object
    pub deactivations_fired: usize,

    /// Timers that found their object re-acquired and did nothing
    pub stale_deactivations: usize,

    /// Currently active objects
    pub active_objects: usize,

    /// Objects owned by the pool
    pub total_objects: usize,

    /// Active ratio (0.0 to 1.0)
    pub utilization: f64,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("premature_reuses".to_string(), self.premature_reuses.to_string());
        metrics.insert("exhausted_events".to_string(), self.exhausted_events.to_string());
        metrics.insert("deactivations_scheduled".to_string(), self.deactivations_scheduled.to_string());
        metrics.insert("deactivations_fired".to_string(), self.deactivations_fired.to_string());
        metrics.insert("stale_deactivations".to_string(), self.stale_deactivations.to_string());
        metrics.insert("active_objects".to_string(), self.active_objects.to_string());
        metrics.insert("total_objects".to_string(), self.total_objects.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics of several pools in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use prefab_pool::{FrameScheduler, PoolManager, PoolSpec};
    /// use std::collections::HashMap;
    /// use std::sync::Arc;
    ///
    /// let manager = PoolManager::new(
    ///     vec![PoolSpec::new("bullet", (), 3)],
    ///     Arc::new(FrameScheduler::new()),
    /// ).unwrap();
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("scene".to_string(), "arena".to_string());
    ///
    /// let output = manager.export_metrics_prometheus(Some(&tags));
    /// assert!(output.contains("prefabpool_objects_active{pool=\"bullet\",scene=\"arena\"} 0"));
    /// assert!(output.contains("prefabpool_pool_not_found_total"));
    /// ```
    pub fn export_prometheus(
        pools: &[(String, PoolMetrics)],
        pool_not_found: usize,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();

        Self::family(&mut output, "prefabpool_objects_active", "gauge", "Current active objects", pools, tags, |m| m.active_objects.to_string());
        Self::family(&mut output, "prefabpool_objects_total", "gauge", "Objects owned by the pool", pools, tags, |m| m.total_objects.to_string());
        Self::family(&mut output, "prefabpool_utilization", "gauge", "Pool utilization ratio", pools, tags, |m| format!("{:.2}", m.utilization));
        Self::family(&mut output, "prefabpool_acquired_total", "counter", "Total objects acquired", pools, tags, |m| m.total_acquired.to_string());
        Self::family(&mut output, "prefabpool_premature_reuses_total", "counter", "Active objects handed out again", pools, tags, |m| m.premature_reuses.to_string());
        Self::family(&mut output, "prefabpool_exhausted_total", "counter", "Acquires refused on a saturated pool", pools, tags, |m| m.exhausted_events.to_string());
        Self::family(&mut output, "prefabpool_deactivations_scheduled_total", "counter", "Timed deactivations started", pools, tags, |m| m.deactivations_scheduled.to_string());
        Self::family(&mut output, "prefabpool_deactivations_fired_total", "counter", "Timed deactivations applied", pools, tags, |m| m.deactivations_fired.to_string());
        Self::family(&mut output, "prefabpool_deactivations_stale_total", "counter", "Timed deactivations skipped", pools, tags, |m| m.stale_deactivations.to_string());

        output.push_str("# HELP prefabpool_pool_not_found_total Acquires for unknown pool names\n");
        output.push_str("# TYPE prefabpool_pool_not_found_total counter\n");
        let global = Self::format_labels(None, tags);
        if global.is_empty() {
            output.push_str(&format!("prefabpool_pool_not_found_total {}\n", pool_not_found));
        } else {
            output.push_str(&format!("prefabpool_pool_not_found_total{{{}}} {}\n", global, pool_not_found));
        }

        output
    }

    fn family(
        output: &mut String,
        name: &str,
        kind: &str,
        help: &str,
        pools: &[(String, PoolMetrics)],
        tags: Option<&HashMap<String, String>>,
        value: impl Fn(&PoolMetrics) -> String,
    ) {
        output.push_str(&format!("# HELP {} {}\n", name, help));
        output.push_str(&format!("# TYPE {} {}\n", name, kind));
        for (pool_name, metrics) in pools {
            let labels = Self::format_labels(Some(pool_name.as_str()), tags);
            output.push_str(&format!("{}{{{}}} {}\n", name, labels, value(metrics)));
        }
    }

    fn format_labels(pool_name: Option<&str>, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = Vec::new();
        if let Some(pool_name) = pool_name {
            labels.push(format!("pool=\"{}\"", Self::escape_label_value(pool_name)));
        }

        if let Some(tags) = tags {
            let mut sorted: Vec<_> = tags.iter().collect();
            sorted.sort();
            for (key, value) in sorted {
                labels.push(format!("{}=\"{}\"", key, Self::escape_label_value(value)));
            }
        }

        labels.join(",")
    }

    // Backslash, double quote and line feed must be escaped in label values
    fn escape_label_value(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '"' => escaped.push_str("\\\""),
                '\n' => escaped.push_str("\\n"),
                _ => escaped.push(c),
            }
        }
        escaped
    }
}

/// Internal per-pool counters
#[derive(Default)]
pub(crate) struct MetricsTracker {
    pub total_acquired: AtomicUsize,
    pub premature_reuses: AtomicUsize,
    pub exhausted_events: AtomicUsize,
    pub deactivations_scheduled: AtomicUsize,
    pub deactivations_fired: AtomicUsize,
    pub stale_deactivations: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_metrics(&self, active: usize, total: usize) -> PoolMetrics {
        let utilization = if total > 0 {
            active as f64 / total as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_acquired: self.total_acquired.load(Ordering::Relaxed),
            premature_reuses: self.premature_reuses.load(Ordering::Relaxed),
            exhausted_events: self.exhausted_events.load(Ordering::Relaxed),
            deactivations_scheduled: self.deactivations_scheduled.load(Ordering::Relaxed),
            deactivations_fired: self.deactivations_fired.load(Ordering::Relaxed),
            stale_deactivations: self.stale_deactivations.load(Ordering::Relaxed),
            active_objects: active,
            total_objects: total,
            utilization,
        }
    }
}
