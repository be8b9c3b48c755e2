//! Mount API - Putting the overlay on a terminal.
//!
//! Sets up one render effect that repaints the host scene plus the badges
//! whenever the overlay revision changes. The host keeps its own event loop
//! and forwards events and time to the handle.
//!
//! # Example
//!
//! ```ignore
//! let handle = mount(registry.clone(), &config, move |buffer| paint_app(buffer))?;
//!
//! loop {
//!     if event::poll(handle.time_until_next_tick())? {
//!         let event = event::read()?;
//!         if !handle.handle_event(&event) {
//!             // host handles it
//!         }
//!     }
//!     handle.poll(Instant::now(), &geometry);
//! }
//!
//! handle.unmount();
//! ```

use std::cell::RefCell;
use std::io::{self, Write, stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use spark_signals::{Signal, effect, signal};
use tracing::{debug, warn};

use crate::config::VisualizerConfig;
use crate::overlay::{Overlay, convert_mouse_event};
use crate::registry::{Registry, Snapshot};
use crate::renderer::{DiffRenderer, FrameBuffer};
use crate::sync::{Geometry, Presenter, Synchronizer, TickReport};

// =============================================================================
// Presenter
// =============================================================================

/// Feeds snapshots to the overlay and bumps the render revision.
#[derive(Clone)]
struct OverlayPresenter {
    overlay: Rc<RefCell<Overlay>>,
    revision: Signal<u64>,
}

impl OverlayPresenter {
    fn bump(&self) {
        self.revision.set(self.revision.get().wrapping_add(1));
    }
}

impl Presenter for OverlayPresenter {
    fn present(&mut self, snapshot: &Snapshot) {
        self.overlay.borrow_mut().present(snapshot);
        self.bump();
    }
}

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`].
///
/// Holds:
/// - the render effect stop function
/// - the overlay presenter (overlay state + revision signal)
/// - the synchronizer driving position refresh
pub struct OverlayHandle {
    stop_effect: Option<Box<dyn FnOnce()>>,
    presenter: OverlayPresenter,
    synchronizer: Synchronizer,
    frame_size: Signal<(u16, u16)>,
    terminal_active: bool,
}

impl OverlayHandle {
    /// Forward a terminal event. Returns true if the overlay consumed it.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Mouse(mouse) => {
                let Some(pointer) = convert_mouse_event(*mouse) else {
                    return false;
                };
                let consumed = self
                    .presenter
                    .overlay
                    .borrow_mut()
                    .handle_pointer(pointer, Instant::now());
                if consumed {
                    self.presenter.bump();
                }
                consumed
            }
            Event::Resize(width, height) => {
                self.presenter.overlay.borrow_mut().set_viewport_width(*width);
                self.frame_size.set((*width, *height));
                false
            }
            _ => false,
        }
    }

    /// Run a synchronization tick if one is due at `now`.
    pub fn poll(&mut self, now: Instant, geometry: &dyn Geometry) -> Option<TickReport> {
        self.synchronizer.poll(now, geometry, &mut self.presenter)
    }

    /// How long the host loop may wait before calling [`poll`](Self::poll).
    pub fn time_until_next_tick(&self) -> Duration {
        self.synchronizer.time_until_next(Instant::now())
    }

    /// Repaint now, e.g. after the host scene changed.
    pub fn refresh(&self) {
        self.presenter.bump();
    }

    /// Read access to overlay state.
    pub fn with_overlay<R>(&self, f: impl FnOnce(&Overlay) -> R) -> R {
        f(&self.presenter.overlay.borrow())
    }

    /// Stop the render effect and restore the terminal.
    pub fn unmount(mut self) -> io::Result<()> {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
        self.leave_terminal()
    }

    fn leave_terminal(&mut self) -> io::Result<()> {
        if !self.terminal_active {
            return Ok(());
        }
        self.terminal_active = false;
        execute!(stdout(), DisableMouseCapture)?;
        DiffRenderer::stdout().exit_fullscreen()?;
        disable_raw_mode()
    }
}

impl Drop for OverlayHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
        // Best effort
        let _ = self.leave_terminal();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Mount the overlay on the terminal.
///
/// `scene` paints the host application into a fresh frame; badges are
/// painted over it. Sets up raw mode, the alternate screen, mouse capture
/// and the render effect, then performs the first render.
pub fn mount<S>(registry: Registry, config: &VisualizerConfig, scene: S) -> io::Result<OverlayHandle>
where
    S: FnMut(&mut FrameBuffer) + 'static,
{
    let size = crossterm::terminal::size()?;

    enable_raw_mode()?;
    let mut renderer = DiffRenderer::stdout();
    if let Err(err) = renderer
        .enter_fullscreen()
        .and_then(|()| execute!(stdout(), EnableMouseCapture))
    {
        let _ = disable_raw_mode();
        return Err(err);
    }

    let mut handle = attach(registry, config, size, renderer, scene);
    handle.terminal_active = true;
    Ok(handle)
}

/// Wire overlay, synchronizer and render effect to an already prepared sink.
fn attach<W, S>(
    registry: Registry,
    config: &VisualizerConfig,
    (width, height): (u16, u16),
    mut renderer: DiffRenderer<W>,
    mut scene: S,
) -> OverlayHandle
where
    W: Write + 'static,
    S: FnMut(&mut FrameBuffer) + 'static,
{
    let overlay = Rc::new(RefCell::new(Overlay::new(config)));
    overlay.borrow_mut().set_viewport_width(width);

    let presenter = OverlayPresenter {
        overlay: overlay.clone(),
        revision: signal(0u64),
    };
    let frame_size = signal((width, height));

    let revision = presenter.revision.clone();
    let size = frame_size.clone();
    let stop_fn = effect(move || {
        // Read signals (creates dependencies)
        let _ = revision.get();
        let (w, h) = size.get();

        let mut buffer = FrameBuffer::new(w, h);
        scene(&mut buffer);
        overlay.borrow().paint(&mut buffer);

        if let Err(err) = renderer.render(&buffer) {
            warn!(%err, "overlay render failed");
        }
    });
    debug!(width, height, "overlay mounted");

    OverlayHandle {
        stop_effect: Some(Box::new(stop_fn)),
        presenter,
        synchronizer: Synchronizer::new(registry, config.sync_interval),
        frame_size,
        terminal_active: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::InstanceKey;
    use crate::sync::GeometryError;
    use crate::types::Rect;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

    /// Writer shared with the test so rendered bytes can be inspected.
    #[derive(Clone, Default)]
    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn take(&self) -> Vec<u8> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    /// Every instance sits at row 2, column 4.
    struct FixedGeometry;

    impl Geometry for FixedGeometry {
        fn bounding_rect(&self, _key: InstanceKey) -> Result<Rect, GeometryError> {
            Ok(Rect::new(2, 4, 10, 1))
        }
    }

    fn press(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    /// Handle over an in-memory sink with one synced badge at (2, 4).
    fn attached() -> (OverlayHandle, Sink) {
        let registry = Registry::new();
        registry.register(InstanceKey::from_raw(1));
        registry.append(InstanceKey::from_raw(1), "A Initial Render");

        let config = VisualizerConfig::default();
        let sink = Sink::default();
        let mut handle = attach(registry, &config, (40, 10), DiffRenderer::new(sink.clone()), |_| {});

        let due = Instant::now() + config.sync_interval;
        assert!(handle.poll(due, &FixedGeometry).is_some());
        (handle, sink)
    }

    fn revision(handle: &OverlayHandle) -> u64 {
        handle.presenter.revision.get()
    }

    #[test]
    fn test_presenter_reconciles_and_bumps_revision() {
        let registry = Registry::new();
        registry.register(InstanceKey::from_raw(1));

        let mut presenter = OverlayPresenter {
            overlay: Rc::new(RefCell::new(Overlay::new(&VisualizerConfig::default()))),
            revision: signal(0u64),
        };
        presenter.present(&registry.snapshot(0));
        presenter.present(&registry.snapshot(0));

        assert_eq!(presenter.revision.get(), 2);
        assert_eq!(presenter.overlay.borrow().len(), 1);
    }

    #[test]
    fn test_tick_paints_badge_and_idle_refresh_writes_no_cells() {
        let (handle, sink) = attached();
        assert_eq!(handle.with_overlay(|overlay| overlay.len()), 1);
        // Badge text "1" lands on row 2, column 5.
        let painted = String::from_utf8(sink.take()).unwrap_or_default();
        assert!(painted.contains("\x1b[3;6H"));

        handle.refresh();
        let idle = String::from_utf8(sink.take()).unwrap_or_default();
        assert!(!idle.contains("\x1b[3;6H"));
    }

    #[test]
    fn test_click_on_badge_is_consumed() {
        let (mut handle, sink) = attached();
        let before = revision(&handle);
        sink.take();

        assert!(handle.handle_event(&press(5, 2)));
        assert_eq!(revision(&handle), before + 1);
        assert!(!sink.take().is_empty());
    }

    #[test]
    fn test_click_outside_badges_goes_to_host() {
        let (mut handle, _sink) = attached();
        let before = revision(&handle);

        assert!(!handle.handle_event(&press(30, 8)));
        assert_eq!(revision(&handle), before);
    }

    #[test]
    fn test_resize_updates_viewport_and_frame() {
        let (mut handle, _sink) = attached();
        assert_eq!(handle.with_overlay(|overlay| overlay.max_badge_width()), 28);

        assert!(!handle.handle_event(&Event::Resize(100, 30)));
        assert_eq!(handle.with_overlay(|overlay| overlay.max_badge_width()), 70);
        assert_eq!(handle.frame_size.get(), (100, 30));
    }

    #[test]
    fn test_unmount_without_terminal() {
        let (handle, sink) = attached();
        sink.take();
        assert!(handle.unmount().is_ok());
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_revision_reruns_effect() {
        let presenter = OverlayPresenter {
            overlay: Rc::new(RefCell::new(Overlay::new(&VisualizerConfig::default()))),
            revision: signal(0u64),
        };
        let runs = Rc::new(std::cell::Cell::new(0));

        let revision = presenter.revision.clone();
        let counter = runs.clone();
        let stop = effect(move || {
            let _ = revision.get();
            counter.set(counter.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        presenter.bump();
        assert_eq!(runs.get(), 2);
        stop();
    }
}
