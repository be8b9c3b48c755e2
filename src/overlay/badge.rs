//! Badges - Per-record overlay state and layout.

use crate::record::{InstanceKey, RecordId, RenderRecord};
use crate::renderer::{string_width, truncate_text};
use crate::types::{Position, Rect, Rgba};

// =============================================================================
// Badge Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BadgeFlags: u8 {
        const SHOWN = 1 << 0;
        const EXPANDED = 1 << 1;
        const DRAGGING = 1 << 2;
    }
}

/// One-frame flash after a mount or an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Mount,
    Update,
}

// =============================================================================
// Styling
// =============================================================================

pub(crate) const BADGE_FG: Rgba = Rgba::rgb(85, 85, 85);
pub(crate) const BADGE_BG: Rgba = Rgba::rgb(204, 204, 204);
pub(crate) const MOUNT_FG: Rgba = Rgba::rgb(255, 255, 255);
pub(crate) const MOUNT_BG: Rgba = Rgba::rgb(197, 16, 12);
pub(crate) const UPDATE_FG: Rgba = Rgba::rgb(40, 40, 40);
pub(crate) const UPDATE_BG: Rgba = Rgba::rgb(197, 203, 1);

/// Narrowest badge: one cell of content plus padding.
const MIN_WIDTH: u16 = 3;

// =============================================================================
// Badge
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub key: InstanceKey,
    /// Latest record copy received from the registry.
    pub record: RenderRecord,
    pub flags: BadgeFlags,
    pub highlight: Option<Highlight>,
    /// Position set by dragging, wins over `record.position` until it moves.
    pub dragged_to: Option<Position>,
    /// Offset from the pointer to the badge origin while dragging.
    pub(crate) grab: Option<Position>,
    pub(crate) moved_since_press: bool,
}

impl Badge {
    pub(crate) fn mounted(key: InstanceKey, record: RenderRecord) -> Self {
        Self {
            key,
            record,
            flags: BadgeFlags::SHOWN,
            highlight: Some(Highlight::Mount),
            dragged_to: None,
            grab: None,
            moved_since_press: false,
        }
    }

    pub fn id(&self) -> RecordId {
        self.record.id
    }

    pub fn is_shown(&self) -> bool {
        self.flags.contains(BadgeFlags::SHOWN)
    }

    pub fn is_expanded(&self) -> bool {
        self.flags.contains(BadgeFlags::EXPANDED)
    }

    /// Effective anchor in document coordinates.
    pub fn position(&self) -> Position {
        self.dragged_to.unwrap_or(self.record.position)
    }

    /// Take in a newer copy of the record.
    pub(crate) fn sync(&mut self, record: RenderRecord) {
        self.highlight = None;
        if record.count != self.record.count {
            self.flags.insert(BadgeFlags::SHOWN);
            self.highlight = Some(Highlight::Update);
        }
        if record.position != self.record.position {
            self.dragged_to = None;
        }
        self.record = record;
    }

    /// Collapsed badges show the count, expanded ones the whole log.
    pub fn lines(&self) -> Vec<String> {
        if self.is_expanded() && !self.record.log.is_empty() {
            self.record.log.iter().cloned().collect()
        } else {
            vec![self.record.count.to_string()]
        }
    }

    /// Screen layout with lines cut to fit `max_width` (padding included).
    pub fn layout(&self, max_width: u16, scroll_top: i32) -> BadgeLayout {
        let max_width = max_width.max(MIN_WIDTH);
        let lines: Vec<String> = self
            .lines()
            .iter()
            .map(|line| truncate_text(line, max_width - 2))
            .collect();
        let content_width = lines.iter().map(|l| string_width(l)).max().unwrap_or(0);

        let position = self.position();
        BadgeLayout {
            id: self.id(),
            rect: Rect::new(
                position.top.saturating_sub(scroll_top),
                position.left,
                (content_width + 2).max(MIN_WIDTH),
                lines.len() as u16,
            ),
            lines,
            expanded: self.is_expanded(),
            highlight: self.highlight,
        }
    }
}

/// Where and what to paint for one badge.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeLayout {
    pub id: RecordId,
    /// Screen coordinates.
    pub rect: Rect,
    pub lines: Vec<String>,
    pub expanded: bool,
    pub highlight: Option<Highlight>,
}

impl BadgeLayout {
    pub(crate) fn colors(&self) -> (Rgba, Rgba) {
        match self.highlight {
            Some(Highlight::Mount) => (MOUNT_FG, MOUNT_BG),
            Some(Highlight::Update) => (UPDATE_FG, UPDATE_BG),
            None => (BADGE_FG, BADGE_BG),
        }
    }
}
