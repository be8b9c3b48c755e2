//! Instrumentation Registry - Live instance → render record mapping.
//!
//! Owned by the instrumentation subsystem and handed out as a cheap clonable
//! handle. Single-threaded: the handle is `!Send`, every mutation happens in
//! a lifecycle hook or a synchronization tick.
//!
//! Invariants:
//! - every mounted instrumented instance has exactly one record
//! - unmounted instances have none (removed in the unmount hook, never lazily)
//! - record ids come from a counter that only grows

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{trace, warn};

use crate::record::{InstanceKey, MAX_LOG_LENGTH, RecordId, RenderRecord};

// =============================================================================
// Registry State
// =============================================================================

#[derive(Debug)]
struct RegistryState {
    records: IndexMap<InstanceKey, RenderRecord>,
    next_id: u64,
    max_log_len: usize,
}

/// Handle to the process-scoped record store.
#[derive(Debug, Clone)]
pub struct Registry {
    state: Rc<RefCell<RegistryState>>,
}

/// Copy of the registry taken for one overlay render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub records: Vec<(InstanceKey, RenderRecord)>,
    /// Vertical scroll offset at the time the snapshot was taken.
    pub scroll_top: i32,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_max_log_len(MAX_LOG_LENGTH)
    }

    pub fn with_max_log_len(max_log_len: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(RegistryState {
                records: IndexMap::new(),
                next_id: 0,
                max_log_len,
            })),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a fresh record for `key` and return a copy of it.
    pub fn register(&self, key: InstanceKey) -> RenderRecord {
        let mut state = self.state.borrow_mut();
        let id = RecordId(state.next_id);
        state.next_id += 1;

        let record = RenderRecord::new(id);
        if let Some(stale) = state.records.insert(key, record.clone()) {
            warn!(?key, stale = %stale.id, "instance registered twice without unmount");
        }
        trace!(?key, id = %id, "registered");
        record
    }

    /// Remove the record for `key`. Order of the remaining records is kept.
    pub fn unregister(&self, key: InstanceKey) -> Option<RenderRecord> {
        let removed = self.state.borrow_mut().records.shift_remove(&key);
        if let Some(record) = &removed {
            trace!(?key, id = %record.id, "unregistered");
        }
        removed
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Read-modify-write a record in one step.
    ///
    /// Returns `false` if there is no record for `key`. `f` must not call
    /// back into the registry.
    pub fn update(&self, key: InstanceKey, f: impl FnOnce(&mut RenderRecord)) -> bool {
        let mut state = self.state.borrow_mut();
        match state.records.get_mut(&key) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    /// Append a log message. No-op when the instance was already removed.
    pub fn append(&self, key: InstanceKey, message: &str) -> bool {
        let mut state = self.state.borrow_mut();
        let max_len = state.max_log_len;
        match state.records.get_mut(&key) {
            Some(record) => {
                record.append(message, max_len);
                true
            }
            None => {
                trace!(?key, "append after unmount ignored");
                false
            }
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn get(&self, key: InstanceKey) -> Option<RenderRecord> {
        self.state.borrow().records.get(&key).cloned()
    }

    pub fn contains(&self, key: InstanceKey) -> bool {
        self.state.borrow().records.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().records.is_empty()
    }

    /// Keys of all live records, in insertion order.
    pub fn keys(&self) -> Vec<InstanceKey> {
        self.state.borrow().records.keys().copied().collect()
    }

    pub fn snapshot(&self, scroll_top: i32) -> Snapshot {
        let state = self.state.borrow();
        Snapshot {
            records: state
                .records
                .iter()
                .map(|(key, record)| (*key, record.clone()))
                .collect(),
            scroll_top,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
