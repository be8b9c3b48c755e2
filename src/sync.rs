//! Overlay Synchronizer - Periodic badge position refresh.
//!
//! There is no host event for "component moved on screen", so positions are
//! polled. The host loop calls [`Synchronizer::poll`] as often as it likes;
//! a tick runs only when the fixed interval has elapsed.
//!
//! Each tick:
//! 1. Looks up every registered instance's bounding rect
//! 2. Stores `{ top: scroll_top + rect.top, left: rect.left }` for resolvable ones
//! 3. Leaves unresolvable ones untouched (picked up next tick)
//! 4. Presents the full registry snapshot

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::trace;

use crate::record::InstanceKey;
use crate::registry::{Registry, Snapshot};
use crate::types::{Position, Rect};

/// Default tick interval.
pub const SYNC_INTERVAL: Duration = Duration::from_millis(500);

// =============================================================================
// Host Interfaces
// =============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("component is not mounted")]
    Unmounted,
    #[error("component has no rendered output")]
    NotRendered,
    #[error("geometry lookup failed: {0}")]
    Host(String),
}

/// Screen geometry lookup provided by the host.
pub trait Geometry {
    /// Current on-screen bounding rectangle of an instance.
    fn bounding_rect(&self, key: InstanceKey) -> Result<Rect, GeometryError>;

    /// Vertical scroll offset of the page.
    fn scroll_top(&self) -> i32 {
        0
    }
}

/// Receives a registry snapshot after every tick.
pub trait Presenter {
    fn present(&mut self, snapshot: &Snapshot);
}

// =============================================================================
// Synchronizer
// =============================================================================

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub updated: usize,
    pub skipped: usize,
}

pub struct Synchronizer {
    registry: Registry,
    interval: Duration,
    next_due: Instant,
}

impl Synchronizer {
    /// First tick is due one interval from now.
    pub fn new(registry: Registry, interval: Duration) -> Self {
        Self::starting_at(registry, interval, Instant::now())
    }

    pub fn starting_at(registry: Registry, interval: Duration, start: Instant) -> Self {
        Self {
            registry,
            interval,
            next_due: start + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next tick (zero if overdue).
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    /// Run a tick if one is due. Returns the report of the tick, if any.
    pub fn poll(
        &mut self,
        now: Instant,
        geometry: &dyn Geometry,
        presenter: &mut dyn Presenter,
    ) -> Option<TickReport> {
        if now < self.next_due {
            return None;
        }

        self.next_due += self.interval;
        if self.next_due <= now {
            // Fell behind by more than one interval; don't replay missed ticks.
            self.next_due = now + self.interval;
        }

        Some(self.tick(geometry, presenter))
    }

    /// Refresh every position and present the result, regardless of schedule.
    pub fn tick(&self, geometry: &dyn Geometry, presenter: &mut dyn Presenter) -> TickReport {
        let scroll_top = geometry.scroll_top();
        let mut report = TickReport::default();

        for key in self.registry.keys() {
            match geometry.bounding_rect(key) {
                Ok(rect) => {
                    let position = Position::new(scroll_top.saturating_add(rect.top), rect.left);
                    if self.registry.update(key, |record| record.position = position) {
                        report.updated += 1;
                    }
                }
                Err(err) => {
                    trace!(?key, %err, "position not resolvable this tick");
                    report.skipped += 1;
                }
            }
        }

        presenter.present(&self.registry.snapshot(scroll_top));
        report
    }
}
