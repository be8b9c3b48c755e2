//! Core Types - Geometry, colors, and terminal cells.
//!
//! Positions live in document coordinates (scroll-compensated), rectangles
//! come from the host in screen coordinates. Both are measured in terminal
//! cells.

// =============================================================================
// Geometry
// =============================================================================

/// Absolute document position of a badge anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    pub top: i32,
    pub left: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { top: 0, left: 0 };

    pub const fn new(top: i32, left: i32) -> Self {
        Self { top, left }
    }
}

/// On-screen bounding rectangle reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(top: i32, left: i32, width: u16, height: u16) -> Self {
        Self { top, left, width, height }
    }

    /// Check if a point is inside this rect.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left
            && x < self.left.saturating_add(self.width as i32)
            && y >= self.top
            && y < self.top.saturating_add(self.height as i32)
    }
}

// =============================================================================
// Colors
// =============================================================================

/// RGBA color. `a == 0` with all channels at 255 marks the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Use whatever the terminal is configured with.
    pub const TERMINAL_DEFAULT: Self = Self { r: 255, g: 255, b: 255, a: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub fn is_terminal_default(&self) -> bool {
        *self == Self::TERMINAL_DEFAULT
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::TERMINAL_DEFAULT
    }
}

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::UNDERLINE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const INVERSE = 1 << 4;
    }
}

// =============================================================================
// Cell
// =============================================================================

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Unicode codepoint (32 for space, 0 for the trailing half of a wide char).
    pub char: u32,
    pub fg: Rgba,
    pub bg: Rgba,
    pub attrs: Attr,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            char: b' ' as u32,
            fg: Rgba::TERMINAL_DEFAULT,
            bg: Rgba::TERMINAL_DEFAULT,
            attrs: Attr::NONE,
        }
    }
}

/// A clipping rectangle in screen cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl ClipRect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x
            && (x as u32) < self.x as u32 + self.width as u32
            && y >= self.y
            && (y as u32) < self.y as u32 + self.height as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(2, 3, 4, 2);
        assert!(rect.contains(3, 2));
        assert!(rect.contains(6, 3));
        assert!(!rect.contains(7, 3));
        assert!(!rect.contains(3, 4));
        assert!(!rect.contains(-1, 2));
    }

    #[test]
    fn test_clip_rect_edge() {
        let clip = ClipRect::new(0, 0, u16::MAX, 1);
        assert!(clip.contains(u16::MAX - 1, 0));
        assert!(!clip.contains(0, 1));
    }

    #[test]
    fn test_attr_combination() {
        let attrs = Attr::BOLD | Attr::INVERSE;
        assert!(attrs.contains(Attr::BOLD));
        assert!(!attrs.contains(Attr::DIM));
    }
}
