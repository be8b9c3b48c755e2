//! Overlay Renderer - One diagnostic badge per live render record.
//!
//! The overlay's only data source is the registry snapshot handed to
//! [`Overlay::present`]. Per-badge UI state (shown, expanded, dragged) lives
//! here and survives across snapshots, keyed by record id.
//!
//! # Behavior
//!
//! - a badge exists exactly as long as its record does
//! - it is anchored at the record position, or where it was dragged to
//!   until the next geometry update moves the record
//! - a count change forces the badge visible again
//! - click toggles expanded, double click toggles shown
//! - expanded badges paint above collapsed ones

pub mod badge;
pub mod input;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tracing::trace;

use crate::config::VisualizerConfig;
use crate::record::RecordId;
use crate::registry::Snapshot;
use crate::renderer::FrameBuffer;
use crate::sync::Presenter;
use crate::types::{Attr, Position};

pub use badge::{Badge, BadgeFlags, BadgeLayout, Highlight};
pub use input::{PointerAction, PointerEvent, convert_mouse_event};

pub struct Overlay {
    badges: IndexMap<RecordId, Badge>,
    scroll_top: i32,
    viewport_width: u16,
    max_width_ratio: f32,
    double_click: Duration,
    pressed: Option<RecordId>,
    last_click: Option<(RecordId, Instant)>,
}

impl Overlay {
    pub fn new(config: &VisualizerConfig) -> Self {
        Self {
            badges: IndexMap::new(),
            scroll_top: 0,
            viewport_width: 80,
            max_width_ratio: config.max_badge_width_ratio,
            double_click: config.double_click,
            pressed: None,
            last_click: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn badge(&self, id: RecordId) -> Option<&Badge> {
        self.badges.get(&id)
    }

    pub fn badges(&self) -> impl Iterator<Item = &Badge> {
        self.badges.values()
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }

    pub fn scroll_top(&self) -> i32 {
        self.scroll_top
    }

    pub fn set_viewport_width(&mut self, width: u16) {
        self.viewport_width = width;
    }

    /// Widest a badge may be at the current viewport width.
    pub fn max_badge_width(&self) -> u16 {
        (self.viewport_width as f32 * self.max_width_ratio) as u16
    }

    // =========================================================================
    // Toggles
    // =========================================================================

    pub fn toggle_expanded(&mut self, id: RecordId) -> bool {
        self.toggle(id, BadgeFlags::EXPANDED)
    }

    pub fn toggle_shown(&mut self, id: RecordId) -> bool {
        self.toggle(id, BadgeFlags::SHOWN)
    }

    fn toggle(&mut self, id: RecordId, flag: BadgeFlags) -> bool {
        match self.badges.get_mut(&id) {
            Some(badge) => {
                badge.flags.toggle(flag);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Layout & Paint
    // =========================================================================

    /// Layouts of visible badges, bottom-most first.
    pub fn layouts(&self) -> Vec<BadgeLayout> {
        let max_width = self.max_badge_width();
        let mut layouts: Vec<BadgeLayout> = self
            .badges
            .values()
            .filter(|badge| badge.is_shown())
            .map(|badge| badge.layout(max_width, self.scroll_top))
            .collect();
        // Stable: keeps registry order within each layer.
        layouts.sort_by_key(|layout| layout.expanded);
        layouts
    }

    /// Topmost visible badge under a screen cell.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<RecordId> {
        self.layouts()
            .iter()
            .rev()
            .find(|layout| layout.rect.contains(x as i32, y as i32))
            .map(|layout| layout.id)
    }

    /// Paint visible badges over whatever the buffer already holds.
    pub fn paint(&self, buffer: &mut FrameBuffer) {
        for layout in self.layouts() {
            let (fg, bg) = layout.colors();
            let rect = layout.rect;
            buffer.fill_rect(rect.left, rect.top, rect.width, rect.height, bg);

            let attrs = if layout.expanded { Attr::NONE } else { Attr::BOLD };
            for (row, line) in layout.lines.iter().enumerate() {
                buffer.draw_text(
                    rect.left.saturating_add(1),
                    rect.top.saturating_add(row as i32),
                    line,
                    rect.width.saturating_sub(2),
                    fg,
                    bg,
                    attrs,
                );
            }
        }
    }

    // =========================================================================
    // Pointer Input
    // =========================================================================

    /// Apply a pointer event. Returns true if a badge consumed it.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) -> bool {
        match event.action {
            PointerAction::Down => self.press(event.x, event.y),
            PointerAction::Drag | PointerAction::Move => self.drag(event.x, event.y),
            PointerAction::Up => self.release(now),
        }
    }

    fn press(&mut self, x: u16, y: u16) -> bool {
        let Some(id) = self.hit_test(x, y) else {
            return false;
        };
        let pointer = self.to_document(x, y);
        let Some(badge) = self.badges.get_mut(&id) else {
            return false;
        };

        let origin = badge.position();
        badge.grab = Some(Position::new(
            origin.top.saturating_sub(pointer.top),
            origin.left.saturating_sub(pointer.left),
        ));
        badge.moved_since_press = false;
        badge.flags.insert(BadgeFlags::DRAGGING);
        self.pressed = Some(id);
        true
    }

    fn drag(&mut self, x: u16, y: u16) -> bool {
        let Some(id) = self.pressed else {
            return false;
        };
        let pointer = self.to_document(x, y);
        let Some(badge) = self.badges.get_mut(&id) else {
            self.pressed = None;
            return false;
        };
        let Some(grab) = badge.grab else {
            return false;
        };

        let target = Position::new(
            pointer.top.saturating_add(grab.top),
            pointer.left.saturating_add(grab.left),
        );
        if target != badge.position() {
            badge.dragged_to = Some(target);
            badge.moved_since_press = true;
        }
        true
    }

    fn release(&mut self, now: Instant) -> bool {
        let Some(id) = self.pressed.take() else {
            return false;
        };
        let Some(badge) = self.badges.get_mut(&id) else {
            return false;
        };

        badge.flags.remove(BadgeFlags::DRAGGING);
        badge.grab = None;
        if !badge.moved_since_press {
            self.click(id, now);
        }
        true
    }

    fn click(&mut self, id: RecordId, now: Instant) {
        self.toggle_expanded(id);

        let is_double = matches!(
            self.last_click,
            Some((last_id, at)) if last_id == id && now.saturating_duration_since(at) <= self.double_click
        );
        if is_double {
            self.toggle_shown(id);
            self.last_click = None;
        } else {
            self.last_click = Some((id, now));
        }
    }

    fn to_document(&self, x: u16, y: u16) -> Position {
        Position::new(self.scroll_top.saturating_add(y as i32), x as i32)
    }
}

impl Presenter for Overlay {
    fn present(&mut self, snapshot: &Snapshot) {
        self.scroll_top = snapshot.scroll_top;

        let live: HashSet<RecordId> = snapshot.records.iter().map(|(_, r)| r.id).collect();
        self.badges.retain(|id, _| live.contains(id));
        if self.pressed.is_some_and(|id| !live.contains(&id)) {
            self.pressed = None;
        }

        for (key, record) in &snapshot.records {
            match self.badges.get_mut(&record.id) {
                Some(badge) => badge.sync(record.clone()),
                None => {
                    trace!(id = %record.id, "badge added");
                    self.badges
                        .insert(record.id, Badge::mounted(*key, record.clone()));
                }
            }
        }
    }
}
