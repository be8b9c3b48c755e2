//! # spark-render-visualizer
//!
//! Render diagnostics for component trees in the terminal.
//!
//! Wrap component lifecycles with a [`Visualizer`] and every instance gets a
//! render record: how many times it rendered and why, computed from a
//! shallow diff of its props and state. A periodic [`Synchronizer`] resolves
//! each instance's on-screen position, and the [`Overlay`] paints one badge
//! per record on top of the host's frame.
//!
//! ## Architecture
//!
//! ```text
//! lifecycle hooks → Registry ← Synchronizer (every 500 ms) → Overlay → render effect
//! ```
//!
//! The registry is the single source of truth. It is an explicit handle
//! shared between the instrumentation, the synchronizer and the overlay;
//! nothing lives in process globals.
//!
//! ## Modules
//!
//! - [`types`] - Positions, rects, colors, cells
//! - [`value`] - Loosely typed prop/state values and [`Inputs`] maps
//! - [`cause`] - Re-render reason from a props/state diff
//! - [`record`] - Per-instance render record
//! - [`registry`] - Instance key → record store
//! - [`lifecycle`] - Lifecycle wrapping and instrumentation
//! - [`sync`] - Periodic position refresh
//! - [`overlay`] - Badge state, layout, pointer interaction
//! - [`renderer`] - Frame buffer and diff renderer
//! - [`mount`] - Putting it all on a terminal
//! - [`config`] / [`logging`] - Ambient setup

pub mod cause;
pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod mount;
pub mod overlay;
pub mod record;
pub mod registry;
pub mod renderer;
pub mod sync;
pub mod types;
pub mod value;

// Re-export commonly used items
pub use types::*;

pub use value::{Inputs, Value};

pub use cause::{CauseError, Scope, UNKNOWN_REASON, explain, reason_for_rerender};

pub use record::{InstanceKey, MAX_LOG_LENGTH, RecordId, RenderRecord};

pub use registry::{Registry, Snapshot};

pub use lifecycle::{
    ComponentMeta, Instance, Instrumented, Lifecycle, Visualizer, Wrapped,
    create_render_visualizer,
};

pub use sync::{
    Geometry, GeometryError, Presenter, SYNC_INTERVAL, Synchronizer, TickReport,
};

pub use overlay::{
    Badge, BadgeFlags, BadgeLayout, Highlight, Overlay, PointerAction, PointerEvent,
    convert_mouse_event,
};

pub use renderer::{DiffRenderer, FrameBuffer, string_width, truncate_text};

pub use mount::{OverlayHandle, mount};

pub use config::{ConfigError, VisualizerConfig};
