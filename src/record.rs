//! Render Records - Per-instance render history.
//!
//! A record holds the render count, a bounded newest-first log of reasons,
//! and the badge anchor position. Records are keyed by [`InstanceKey`], an
//! identity that never owns the component it names.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::types::Position;

/// Default cap on log entries per record.
pub const MAX_LOG_LENGTH: usize = 20;

// =============================================================================
// Identity
// =============================================================================

/// Identity of a live component instance.
///
/// Carries no ownership. Keys derived from allocations may be reused by the
/// allocator after the instance is dropped, which is why records must be
/// removed in the unmount hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey(u64);

impl InstanceKey {
    /// Key for a host-assigned id (component index, node id, ...).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Key for the allocation behind an `Rc`.
    pub fn of<T: ?Sized>(instance: &Rc<T>) -> Self {
        Self(Rc::as_ptr(instance) as *const () as usize as u64)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Process-unique record id, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// RenderRecord
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRecord {
    pub id: RecordId,
    /// Render events observed, the initial mount included.
    pub count: u64,
    /// Newest first. Index 0 is the most recent render.
    pub log: VecDeque<String>,
    pub position: Position,
}

impl RenderRecord {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            count: 0,
            log: VecDeque::new(),
            position: Position::ORIGIN,
        }
    }

    /// Prepend `"<count> ) <message>"`, bump the count, drop entries past `max_len`.
    pub fn append(&mut self, message: &str, max_len: usize) {
        self.log.push_front(format!("{} ) {}", self.count, message));
        self.log.truncate(max_len);
        self.count += 1;
    }

    /// Most recent log entry.
    pub fn latest(&self) -> Option<&str> {
        self.log.front().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let record = RenderRecord::new(RecordId(7));
        assert_eq!(record.count, 0);
        assert!(record.log.is_empty());
        assert_eq!(record.position, Position::ORIGIN);
        assert_eq!(record.latest(), None);
    }

    #[test]
    fn test_append_formats_with_previous_count() {
        let mut record = RenderRecord::new(RecordId(0));
        record.append("A Initial Render", MAX_LOG_LENGTH);
        record.append("props[v] changed: '1' => '2'", MAX_LOG_LENGTH);

        assert_eq!(record.count, 2);
        assert_eq!(
            record.log,
            vec!["1 ) props[v] changed: '1' => '2'", "0 ) A Initial Render"]
        );
    }

    #[test]
    fn test_append_is_capped() {
        let mut record = RenderRecord::new(RecordId(0));
        for i in 0..50 {
            record.append(&format!("update {i}"), MAX_LOG_LENGTH);
        }

        assert_eq!(record.count, 50);
        assert_eq!(record.log.len(), MAX_LOG_LENGTH);
        assert_eq!(record.latest(), Some("49 ) update 49"));
        assert_eq!(record.log.back().map(String::as_str), Some("30 ) update 30"));
    }

    #[test]
    fn test_instance_key_from_rc() {
        let a = Rc::new(1u8);
        let b = Rc::new(1u8);

        assert_eq!(InstanceKey::of(&a), InstanceKey::of(&a.clone()));
        assert_ne!(InstanceKey::of(&a), InstanceKey::of(&b));
        assert_eq!(InstanceKey::from_raw(3).raw(), 3);
    }
}
