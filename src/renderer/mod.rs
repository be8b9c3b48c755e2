//! Terminal Renderer - Cell grid and diff output.
//!
//! ```text
//! host scene + overlay badges → FrameBuffer → DiffRenderer → terminal
//! ```

pub mod buffer;
pub mod diff;

pub use buffer::{FrameBuffer, string_width, truncate_text};
pub use diff::DiffRenderer;
