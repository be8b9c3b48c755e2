//! Counter Example - Two instrumented counters with the render overlay.
//!
//! Keys:
//! - `1` / `2` - increment a counter (state change)
//! - `s` - change the step prop of both counters
//! - `f` - force re-render without changes
//! - `h` - unmount / remount the second counter
//! - `q` or Ctrl+C - quit
//!
//! Click a badge to expand its log, double click to hide it, drag to move it.
//!
//! Run with: cargo run --example counter

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use spark_render_visualizer::{
    Attr, FrameBuffer, Geometry, GeometryError, Inputs, Instance, InstanceKey, Lifecycle, Rect, Registry,
    Rgba, Value, VisualizerConfig, Wrapped, create_render_visualizer, logging, mount,
};

// =============================================================================
// Component
// =============================================================================

struct Counter;

struct CounterInstance {
    key: InstanceKey,
    label: &'static str,
    row: i32,
    props: Inputs,
    state: Option<Inputs>,
}

impl CounterInstance {
    fn new(key: u64, label: &'static str, row: i32) -> Self {
        Self {
            key: InstanceKey::from_raw(key),
            label,
            row,
            props: Inputs::new().with("step", 1),
            state: Some(Inputs::new().with("count", 0)),
        }
    }

    fn int(inputs: Option<&Inputs>, name: &str) -> i64 {
        match inputs.and_then(|i| i.get(name)) {
            Some(Value::Int(n)) => *n,
            _ => 0,
        }
    }

    fn count(&self) -> i64 {
        Self::int(self.state.as_ref(), "count")
    }

    fn step(&self) -> i64 {
        Self::int(Some(&self.props), "step")
    }
}

impl Instance for CounterInstance {
    fn key(&self) -> InstanceKey {
        self.key
    }

    fn props(&self) -> &Inputs {
        &self.props
    }

    fn state(&self) -> Option<&Inputs> {
        self.state.as_ref()
    }
}

impl Lifecycle for Counter {
    type Instance = CounterInstance;
    type Output = ();

    fn display_name(&self) -> Option<&str> {
        Some("Counter")
    }
}

// =============================================================================
// Host
// =============================================================================

struct App {
    component: Wrapped<Counter>,
    counters: Vec<CounterInstance>,
    hidden: Option<CounterInstance>,
}

impl App {
    /// Apply a change and run the update hook with the previous inputs.
    fn update(&mut self, index: usize, change: impl FnOnce(&mut CounterInstance)) {
        let Some(instance) = self.counters.get_mut(index) else {
            return;
        };
        let prev_props = instance.props.clone();
        let prev_state = instance.state.clone();
        change(instance);
        self.component
            .on_update(instance, &prev_props, prev_state.as_ref());
    }

    fn toggle_second(&mut self) {
        match self.hidden.take() {
            Some(mut instance) => {
                self.component.on_create(&mut instance);
                self.counters.push(instance);
            }
            None if self.counters.len() > 1 => {
                let mut instance = self.counters.remove(1);
                self.component.on_destroy(&mut instance);
                self.hidden = Some(instance);
            }
            None => {}
        }
    }

    fn paint(&self, buffer: &mut FrameBuffer) {
        let fg = Rgba::rgb(220, 220, 220);
        buffer.draw_text(2, 0, "render visualizer demo", 40, fg, Rgba::TERMINAL_DEFAULT, Attr::BOLD);
        for counter in &self.counters {
            let text = format!("{}: {} (step {})", counter.label, counter.count(), counter.step());
            buffer.draw_text(6, counter.row, &text, 40, fg, Rgba::TERMINAL_DEFAULT, Attr::NONE);
        }
        buffer.draw_text(
            2,
            10,
            "1/2 increment  s step  f force  h hide  q quit",
            60,
            Rgba::rgb(128, 128, 128),
            Rgba::TERMINAL_DEFAULT,
            Attr::DIM,
        );
    }
}

struct AppGeometry(Rc<RefCell<App>>);

impl Geometry for AppGeometry {
    fn bounding_rect(&self, key: InstanceKey) -> Result<Rect, GeometryError> {
        let app = self.0.borrow();
        app.counters
            .iter()
            .find(|c| c.key == key)
            .map(|c| Rect::new(c.row, 6, 24, 1))
            .ok_or(GeometryError::Unmounted)
    }
}

fn main() {
    let _log = match logging::init(logging::LogConfig::default()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            None
        }
    };

    let config = match VisualizerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return;
        }
    };

    let registry = Registry::with_max_log_len(config.max_log_len);
    let visualizer = create_render_visualizer(registry.clone());

    let app = Rc::new(RefCell::new(App {
        component: visualizer.wrap(Counter),
        counters: vec![CounterInstance::new(1, "first", 3), CounterInstance::new(2, "second", 6)],
        hidden: None,
    }));
    {
        let mut app = app.borrow_mut();
        let App { component, counters, .. } = &mut *app;
        for counter in counters.iter_mut() {
            component.on_create(counter);
        }
    }

    let scene_app = app.clone();
    let mut handle = match mount(registry, &config, move |buffer| scene_app.borrow().paint(buffer)) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to mount: {}", e);
            return;
        }
    };
    let geometry = AppGeometry(app.clone());

    loop {
        match event::poll(handle.time_until_next_tick()) {
            Ok(true) => match event::read() {
                Ok(input) if handle.handle_event(&input) => {}
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    // Release the borrow before the repaint reads the app
                    let outcome = on_key(&mut app.borrow_mut(), key);
                    match outcome {
                        KeyOutcome::Quit => break,
                        KeyOutcome::Changed => handle.refresh(),
                        KeyOutcome::Ignored => {}
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            },
            Ok(false) => {}
            Err(_) => break,
        }
        handle.poll(Instant::now(), &geometry);
    }

    if let Err(e) = handle.unmount() {
        eprintln!("Failed to restore terminal: {}", e);
    }
}

enum KeyOutcome {
    Quit,
    Changed,
    Ignored,
}

fn on_key(app: &mut App, key: KeyEvent) -> KeyOutcome {
    match key.code {
        KeyCode::Char('q') => return KeyOutcome::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyOutcome::Quit;
        }
        KeyCode::Char('1') => app.update(0, bump_count),
        KeyCode::Char('2') => app.update(1, bump_count),
        KeyCode::Char('s') => {
            for index in 0..app.counters.len() {
                app.update(index, |c| {
                    let step = c.step() + 1;
                    c.props = c.props.clone().with("step", step);
                });
            }
        }
        // Same inputs: logged as an unknown reason
        KeyCode::Char('f') => {
            for index in 0..app.counters.len() {
                app.update(index, |_| {});
            }
        }
        KeyCode::Char('h') => app.toggle_second(),
        _ => return KeyOutcome::Ignored,
    }
    KeyOutcome::Changed
}

fn bump_count(counter: &mut CounterInstance) {
    let next = counter.count() + counter.step();
    counter.state = Some(Inputs::new().with("count", next));
}
