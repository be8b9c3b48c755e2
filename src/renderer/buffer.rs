//! FrameBuffer and drawing primitives.
//!
//! The FrameBuffer is a 2D grid of Cells representing what should be shown
//! on the terminal. Host scenes and overlay badges both draw into it.
//!
//! Drawing takes signed coordinates: badges anchored above or left of the
//! viewport are clipped rather than wrapped.

use unicode_width::UnicodeWidthChar;

use crate::types::{Attr, Cell, ClipRect, Rgba};

// =============================================================================
// FrameBuffer
// =============================================================================

/// A 2D buffer of terminal cells, row-major: `index = y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a new buffer filled with default cells.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Full buffer bounds as a ClipRect.
    #[inline]
    pub fn bounds(&self) -> ClipRect {
        ClipRect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Convert signed coordinates to cell coordinates inside [`bounds`](Self::bounds).
    #[inline]
    fn to_cell(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        let (x, y) = (u16::try_from(x).ok()?, u16::try_from(y).ok()?);
        self.bounds().contains(x, y).then_some((x, y))
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    // =========================================================================
    // Drawing Primitives
    // =========================================================================

    /// Fill a rectangle with blanks on `bg`.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u16, height: u16, bg: Rgba) {
        for row in 0..height {
            for col in 0..width {
                let (col, row) = (x.saturating_add(col as i32), y.saturating_add(row as i32));
                if let Some((cx, cy)) = self.to_cell(col, row) {
                    let idx = self.index(cx, cy);
                    self.cells[idx] = Cell {
                        char: b' ' as u32,
                        fg: Rgba::TERMINAL_DEFAULT,
                        bg,
                        attrs: Attr::NONE,
                    };
                }
            }
        }
    }

    /// Draw text starting at `(x, y)`, stopping at `max_width` cells.
    ///
    /// Wide characters occupy two cells; the second holds a `0` continuation
    /// marker. A wide character that would straddle `max_width` is dropped.
    /// Returns the number of cells consumed.
    pub fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        max_width: u16,
        fg: Rgba,
        bg: Rgba,
        attrs: Attr,
    ) -> u16 {
        let mut used: u16 = 0;

        for ch in text.chars() {
            let char_width = ch.width().unwrap_or(0) as u16;
            if char_width == 0 {
                continue;
            }
            if used + char_width > max_width {
                break;
            }

            let col = x.saturating_add(used as i32);
            for part in 0..char_width {
                if let Some((cx, cy)) = self.to_cell(col.saturating_add(part as i32), y) {
                    let idx = self.index(cx, cy);
                    self.cells[idx] = Cell {
                        char: if part == 0 { ch as u32 } else { 0 },
                        fg,
                        bg,
                        attrs,
                    };
                }
            }
            used += char_width;
        }

        used
    }

    /// Text of one row, continuation markers skipped. Mostly for tests.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter(|cell| cell.char != 0)
            .filter_map(|cell| char::from_u32(cell.char))
            .collect()
    }
}

/// Display width of a string in terminal cells.
pub fn string_width(s: &str) -> u16 {
    s.chars()
        .map(|c| c.width().unwrap_or(0) as u16)
        .fold(0u16, u16::saturating_add)
}

/// Truncate `s` to at most `max_width` cells, ending with `…` when cut.
pub fn truncate_text(s: &str, max_width: u16) -> String {
    if string_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut out = String::new();
    let mut used = 0u16;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0) as u16;
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
