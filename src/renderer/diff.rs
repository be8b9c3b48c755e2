//! Differential renderer.
//!
//! The DiffRenderer compares the current frame to the previous frame and only
//! outputs cells that have changed.
//!
//! # Algorithm
//!
//! 1. Begin a synchronized update
//! 2. For each cell in the new frame:
//!    - If previous frame exists and cell is unchanged: skip
//!    - Otherwise: move there, set colors/attributes, print
//! 3. End the synchronized update and flush once
//! 4. Store current frame as previous for next comparison

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::{
    Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{
    BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};

use super::buffer::FrameBuffer;
use crate::types::{Attr, Cell, Rgba};

/// Differential renderer writing to any `Write` sink (stdout in practice).
pub struct DiffRenderer<W: Write> {
    out: W,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> DiffRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, previous: None }
    }

    /// Render a frame, outputting only changed cells.
    ///
    /// Returns true if any cells were changed.
    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<bool> {
        let mut has_changes = false;

        queue!(self.out, BeginSynchronizedUpdate)?;

        let width = buffer.width();
        let height = buffer.height();

        for y in 0..height {
            for x in 0..width {
                let Some(cell) = buffer.get(x, y) else { continue };

                let changed = match &self.previous {
                    Some(prev) if prev.width() == width && prev.height() == height => {
                        prev.get(x, y) != Some(cell)
                    }
                    _ => true, // No previous or size changed
                };

                if changed {
                    has_changes = true;
                    self.write_cell(x, y, cell)?;
                }
            }
        }

        queue!(self.out, SetAttribute(Attribute::Reset), EndSynchronizedUpdate)?;
        self.out.flush()?;

        self.previous = Some(buffer.clone());

        Ok(has_changes)
    }

    fn write_cell(&mut self, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        // Trailing half of a wide character: the terminal already drew it.
        if cell.char == 0 {
            return Ok(());
        }
        let ch = char::from_u32(cell.char).unwrap_or(' ');

        queue!(
            self.out,
            MoveTo(x, y),
            SetAttribute(Attribute::Reset),
            SetForegroundColor(to_color(cell.fg)),
            SetBackgroundColor(to_color(cell.bg)),
        )?;
        for attribute in to_attributes(cell.attrs) {
            queue!(self.out, SetAttribute(attribute))?;
        }
        queue!(self.out, Print(ch))
    }

    /// Next render will be a full redraw.
    fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Enter fullscreen mode (alternate screen buffer).
    pub fn enter_fullscreen(&mut self) -> io::Result<()> {
        queue!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        self.out.flush()?;
        self.invalidate();
        Ok(())
    }

    /// Exit fullscreen mode.
    pub fn exit_fullscreen(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            Show,
            LeaveAlternateScreen
        )?;
        self.out.flush()
    }
}

fn to_color(color: Rgba) -> Color {
    if color.is_terminal_default() {
        Color::Reset
    } else {
        Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

fn to_attributes(attrs: Attr) -> impl Iterator<Item = Attribute> {
    [
        (Attr::BOLD, Attribute::Bold),
        (Attr::DIM, Attribute::Dim),
        (Attr::ITALIC, Attribute::Italic),
        (Attr::UNDERLINE, Attribute::Underlined),
        (Attr::INVERSE, Attribute::Reverse),
    ]
    .into_iter()
    .filter(move |(flag, _)| attrs.contains(*flag))
    .map(|(_, attribute)| attribute)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_fullscreen_resets_previous_frame() {
        let mut renderer = DiffRenderer::new(Vec::new());
        renderer.render(&FrameBuffer::new(2, 1)).unwrap();
        renderer.enter_fullscreen().unwrap();
        assert!(renderer.previous.is_none());
    }

    #[test]
    fn test_first_render_writes_everything() {
        let mut renderer = DiffRenderer::new(Vec::new());
        let mut buf = FrameBuffer::new(3, 1);
        buf.draw_text(0, 0, "abc", 3, Rgba::TERMINAL_DEFAULT, Rgba::TERMINAL_DEFAULT, Attr::NONE);

        assert!(renderer.render(&buf).unwrap());
        assert!(renderer.previous.is_some());

        let out = String::from_utf8_lossy(&renderer.out).into_owned();
        assert!(out.contains('a') && out.contains('b') && out.contains('c'));
    }

    #[test]
    fn test_unchanged_frame_writes_no_cells() {
        let mut renderer = DiffRenderer::new(Vec::new());
        let buf = FrameBuffer::new(3, 2);

        assert!(renderer.render(&buf).unwrap());
        assert!(!renderer.render(&buf).unwrap());
    }

    #[test]
    fn test_only_changed_cells_written() {
        let mut renderer = DiffRenderer::new(Vec::new());
        let mut buf = FrameBuffer::new(4, 1);
        renderer.render(&buf).unwrap();
        renderer.out.clear();

        buf.draw_text(2, 0, "z", 1, Rgba::rgb(1, 1, 1), Rgba::TERMINAL_DEFAULT, Attr::NONE);
        assert!(renderer.render(&buf).unwrap());

        let out = String::from_utf8_lossy(&renderer.out).into_owned();
        assert!(out.contains('z'));
        // Cursor moves to column 3 (1-based) for the single changed cell.
        assert!(out.contains("\x1b[1;3H"));
        assert!(!out.contains("\x1b[1;1H"));
    }

    #[test]
    fn test_invalidate_forces_redraw() {
        let mut renderer = DiffRenderer::new(Vec::new());
        let buf = FrameBuffer::new(2, 1);
        renderer.render(&buf).unwrap();
        renderer.invalidate();
        assert!(renderer.render(&buf).unwrap());
    }
}
