//! Abort handles for cancellable effects, keyed by [`EffectId`].

use haven_core::effect::EffectId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;

/// Shared registry of running cancellable effects
///
/// Cloned into every store clone so that an effect started from a feedback
/// action can be cancelled by a later action.
#[derive(Clone, Default)]
pub(crate) struct CancellationRegistry {
    inner: Arc<Mutex<HashMap<EffectId, Vec<AbortHandle>>>>,
}

impl CancellationRegistry {
    /// Register a spawned task under `id`, pruning finished ones
    pub(crate) fn register(&self, id: EffectId, handle: AbortHandle) {
        let mut tasks = self.lock();
        let handles = tasks.entry(id).or_default();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Abort every task under `id`, returning how many were still running
    pub(crate) fn cancel(&self, id: EffectId) -> usize {
        let handles = self.lock().remove(&id).unwrap_or_default();
        abort_all(handles)
    }

    /// Abort every registered task
    pub(crate) fn cancel_all(&self) -> usize {
        let handles: Vec<AbortHandle> = self.lock().drain().flat_map(|(_, h)| h).collect();
        abort_all(handles)
    }

    /// Number of tasks under `id` that have not finished
    pub(crate) fn in_flight(&self, id: EffectId) -> usize {
        self.lock()
            .get(&id)
            .map_or(0, |handles| handles.iter().filter(|h| !h.is_finished()).count())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EffectId, Vec<AbortHandle>>> {
        // The map holds no invariants a panicking holder could break
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn abort_all(handles: Vec<AbortHandle>) -> usize {
    let mut running = 0;
    for handle in handles {
        if !handle.is_finished() {
            running += 1;
        }
        handle.abort();
    }
    running
}
