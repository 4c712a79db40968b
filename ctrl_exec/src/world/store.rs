//! Lock-free holder of the latest world state

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use arc_swap::ArcSwap;
use log::trace;

use super::WorldState;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Publishes the latest [`WorldState`] from one writer to many readers.
///
/// Snapshots are replaced whole by an atomic pointer swap. A reader holding a snapshot keeps it
/// alive and unchanged however many updates happen afterwards.
#[derive(Debug)]
pub struct WorldStateStore {
    current: ArcSwap<WorldState>,

    /// Number of snapshots published since creation
    num_updates: AtomicU64,
}

// The store is shared between the vision thread and the control loop
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<WorldStateStore>();
};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WorldStateStore {
    /// Create a store holding an empty world (no ball, no robots).
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(WorldState::empty(0.0)),
            num_updates: AtomicU64::new(0),
        }
    }

    /// Replace the current snapshot.
    pub fn update(&self, next: WorldState) {
        self.update_shared(Arc::new(next));
    }

    /// Replace the current snapshot with one which is already shared.
    pub fn update_shared(&self, next: Arc<WorldState>) {
        trace!("Publishing world state at t = {:.3} s", next.t_s);
        self.current.store(next);
        self.num_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current snapshot.
    pub fn current(&self) -> Arc<WorldState> {
        self.current.load_full()
    }

    pub fn num_updates(&self) -> u64 {
        self.num_updates.load(Ordering::Relaxed)
    }
}

impl Default for WorldStateStore {
    fn default() -> Self {
        Self::new()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
