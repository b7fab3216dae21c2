// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-record debounce timers.
//!
//! Each armed record owns one spawned task that sleeps for the quiet period
//! and then runs its save. Re-arming aborts the previous task. A task removes
//! its registry entry before it starts saving, so [`AutosaveScheduler::cancel`]
//! can stop a pending timer but never a save already in flight.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::AbortHandle;
use tracing::{debug, trace};

use snipvault_core::RecordId;

struct Armed {
    generation: u64,
    handle: AbortHandle,
}

/// Registry of pending autosaves keyed by record id.
pub struct AutosaveScheduler {
    quiet_period: Duration,
    entries: Arc<DashMap<RecordId, Armed>>,
    next_generation: AtomicU64,
}

impl AutosaveScheduler {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            entries: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Run `save` once `id` has been quiet for the configured period,
    /// replacing any timer already pending for `id`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&self, id: RecordId, save: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let deadline = tokio::time::Instant::now() + self.quiet_period;
        let entries = Arc::clone(&self.entries);
        let key = id.clone();

        // Holding the entry keeps the task from deregistering before it is registered.
        let slot = self.entries.entry(id);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            entries.remove_if(&key, |_, armed| armed.generation == generation);
            trace!(id = %key, generation, "autosave timer fired");
            save.await;
        })
        .abort_handle();

        let armed = Armed { generation, handle };
        match slot {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.insert(armed);
                previous.handle.abort();
                trace!(id = %occupied.key(), generation, "autosave timer re-armed");
            }
            Entry::Vacant(vacant) => {
                vacant.insert(armed);
            }
        }
    }

    /// Drop the pending timer for `id`. Returns whether one was pending.
    pub fn cancel(&self, id: &RecordId) -> bool {
        match self.entries.remove(id) {
            Some((_, armed)) => {
                armed.handle.abort();
                debug!(%id, "autosave cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        let ids: Vec<RecordId> = self.entries.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.cancel(&id);
        }
    }

    pub fn is_armed(&self, id: &RecordId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of timers still waiting to fire.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        for entry in self.entries.iter() {
            entry.handle.abort();
        }
    }
}
