//! Pooled object handles and the per-name circular queue

use crate::config::{PoolSpec, RecyclePolicy};
use crate::errors::{PoolError, PoolResult};
use crate::metrics::MetricsTracker;
use crate::transform::{Quaternion, Transform, Vector3};

use crossbeam::queue::ArrayQueue;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

struct ObjectState {
    transform: Transform,
    active: bool,
    generation: u64,
}

// Lock order: `state` before `value`
struct HandleInner<T> {
    id: usize,
    pool: Arc<str>,
    on_deactivate: Option<fn(&mut T)>,
    state: Mutex<ObjectState>,
    value: Mutex<T>,
}

/// Shared reference to one pooled object
///
/// Handles are cheap to clone and compare equal when they refer to the same
/// pooled object. The object itself lives as long as its pool.
pub struct ObjectHandle<T> {
    inner: Arc<HandleInner<T>>,
}

impl<T> ObjectHandle<T> {
    fn new(id: usize, pool: Arc<str>, value: T, on_deactivate: Option<fn(&mut T)>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id,
                pool,
                on_deactivate,
                state: Mutex::new(ObjectState {
                    transform: Transform::default(),
                    active: false,
                    generation: 0,
                }),
                value: Mutex::new(value),
            }),
        }
    }

    /// Index of this object within its pool
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Name of the owning pool
    pub fn pool_name(&self) -> &str {
        &self.inner.pool
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.lock().active
    }

    pub fn transform(&self) -> Transform {
        self.inner.state.lock().transform
    }

    pub fn position(&self) -> Vector3 {
        self.transform().position
    }

    pub fn rotation(&self) -> Quaternion {
        self.transform().rotation
    }

    /// Counter bumped every time the object is acquired or deactivated
    pub fn generation(&self) -> u64 {
        self.inner.state.lock().generation
    }

    /// Read the pooled value
    ///
    /// Only the value is locked while `f` runs, so the closure may query the
    /// handle's position, activity or generation. Deactivating the same
    /// handle from inside `f` deadlocks when an `on_deactivate` hook is
    /// configured.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.value.lock())
    }

    /// Mutate the pooled value
    ///
    /// Same locking rules as [`with`](Self::with).
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.inner.value.lock())
    }

    /// Deactivate the object early
    ///
    /// Any pending timed deactivation for the current activation becomes a
    /// no-op. Returns `false` if the object was already inactive.
    pub fn deactivate(&self) -> bool {
        let mut state = self.inner.state.lock();
        if !state.active {
            return false;
        }
        state.generation += 1;
        self.set_inactive(&mut state);
        true
    }

    /// Position, activate and start a new generation; returns the new
    /// generation and whether the object was still active
    pub(crate) fn activate(
        &self,
        transform: Transform,
        on_activate: Option<fn(&mut T, &Transform)>,
    ) -> (u64, bool) {
        let mut state = self.inner.state.lock();
        let was_active = state.active;
        state.generation += 1;
        state.transform = transform;
        state.active = true;
        if let Some(hook) = on_activate {
            hook(&mut *self.inner.value.lock(), &transform);
        }
        (state.generation, was_active)
    }

    /// Deactivate only if no acquire happened since `generation`
    pub(crate) fn expire(&self, generation: u64) -> bool {
        let mut state = self.inner.state.lock();
        if state.generation != generation || !state.active {
            return false;
        }
        self.set_inactive(&mut state);
        true
    }

    // Caller holds `state`
    fn set_inactive(&self, state: &mut ObjectState) {
        state.active = false;
        if let Some(hook) = self.inner.on_deactivate {
            hook(&mut *self.inner.value.lock());
        }
    }
}

impl<T> Clone for ObjectHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for ObjectHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for ObjectHandle<T> {}

impl<T> fmt::Debug for ObjectHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ObjectHandle")
            .field("pool", &self.inner.pool)
            .field("id", &self.inner.id)
            .field("active", &state.active)
            .field("generation", &state.generation)
            .finish()
    }
}

/// Fixed set of clones of one template, handed out in queue order
pub(crate) struct Pool<T> {
    name: Arc<str>,
    time_to_deactivate: f32,
    deactivate_after: Option<Duration>,
    queue: ArrayQueue<ObjectHandle<T>>,
    handles: Vec<ObjectHandle<T>>,
    pub(crate) metrics: MetricsTracker,
}

impl<T: Clone> Pool<T> {
    /// Clone the template `size` times; every clone starts inactive
    pub fn new(spec: PoolSpec<T>, on_deactivate: Option<fn(&mut T)>) -> PoolResult<Self> {
        let size = spec.validate()?;
        let deactivate_after = spec.deactivate_after();
        let name: Arc<str> = Arc::from(spec.name.as_str());
        let queue = ArrayQueue::new(size);

        let handles: Vec<_> = (0..size)
            .map(|id| ObjectHandle::new(id, Arc::clone(&name), spec.template.clone(), on_deactivate))
            .collect();

        for handle in &handles {
            let _ = queue.push(handle.clone());
        }

        Ok(Self {
            name,
            time_to_deactivate: spec.time_to_deactivate,
            deactivate_after,
            queue,
            handles,
            metrics: MetricsTracker::new(),
        })
    }
}

impl<T> Pool<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_to_deactivate(&self) -> f32 {
        self.time_to_deactivate
    }

    pub fn deactivate_after(&self) -> Option<Duration> {
        self.deactivate_after
    }

    pub fn handles(&self) -> &[ObjectHandle<T>] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn active_count(&self) -> usize {
        self.handles.iter().filter(|h| h.is_active()).count()
    }

    /// Pick the next object and move it to the back of the queue
    pub fn next(&self, policy: RecyclePolicy) -> PoolResult<ObjectHandle<T>> {
        match policy {
            RecyclePolicy::RoundRobin => Ok(self.rotate()),
            RecyclePolicy::SkipActive => Ok(self.rotate_to_inactive().unwrap_or_else(|| self.rotate())),
            RecyclePolicy::Strict => self
                .rotate_to_inactive()
                .ok_or_else(|| PoolError::PoolExhausted(self.name.to_string())),
        }
    }

    // A full unsuccessful walk rotates the queue back to its original order
    fn rotate_to_inactive(&self) -> Option<ObjectHandle<T>> {
        (0..self.handles.len())
            .map(|_| self.rotate())
            .find(|handle| !handle.is_active())
    }

    fn rotate(&self) -> ObjectHandle<T> {
        let handle = self.pop_front();
        let _ = self.queue.push(handle.clone());
        handle
    }

    // Another caller may be between its pop and push; the queue is never
    // empty for longer than that.
    fn pop_front(&self) -> ObjectHandle<T> {
        loop {
            if let Some(handle) = self.queue.pop() {
                return handle;
            }
            std::hint::spin_loop();
        }
    }
}
