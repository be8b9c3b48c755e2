//! End-to-end: lifecycle hooks → registry → synchronizer → overlay.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use spark_render_visualizer::{
    FrameBuffer, Geometry, GeometryError, Inputs, Instance, InstanceKey, Lifecycle, MAX_LOG_LENGTH,
    Overlay, Position, RecordId, Rect, Registry, Synchronizer, UNKNOWN_REASON, Value,
    Visualizer, VisualizerConfig, create_render_visualizer,
};

// =============================================================================
// Fake host
// =============================================================================

struct Node {
    identity: Rc<()>,
    props: Inputs,
    state: Option<Inputs>,
}

impl Node {
    fn new(props: Inputs) -> Self {
        Self {
            identity: Rc::new(()),
            props,
            state: None,
        }
    }

    fn stateful(props: Inputs, state: Inputs) -> Self {
        Self {
            state: Some(state),
            ..Self::new(props)
        }
    }

    /// Replace the props and run the update hook.
    fn set_props<L: Lifecycle<Instance = Node>>(&mut self, component: &L, props: Inputs) -> Option<L::Output> {
        let prev = std::mem::replace(&mut self.props, props);
        let prev_state = self.state.clone();
        component.on_update(self, &prev, prev_state.as_ref())
    }

    fn set_state<L: Lifecycle<Instance = Node>>(&mut self, component: &L, state: Inputs) -> Option<L::Output> {
        let prev_state = self.state.replace(state);
        let prev_props = self.props.clone();
        component.on_update(self, &prev_props, prev_state.as_ref())
    }
}

impl Instance for Node {
    fn key(&self) -> InstanceKey {
        InstanceKey::of(&self.identity)
    }

    fn props(&self) -> &Inputs {
        &self.props
    }

    fn state(&self) -> Option<&Inputs> {
        self.state.as_ref()
    }
}

/// Counts its own hook calls; update returns the number of calls so far.
#[derive(Default)]
struct CallCounter {
    name: Option<&'static str>,
    calls: Cell<usize>,
}

impl CallCounter {
    fn named(name: &'static str) -> Self {
        Self {
            name: Some(name),
            ..Default::default()
        }
    }
}

impl Lifecycle for CallCounter {
    type Instance = Node;
    type Output = usize;

    fn display_name(&self) -> Option<&str> {
        self.name
    }

    fn on_create(&self, _instance: &mut Node) -> Option<usize> {
        self.calls.set(self.calls.get() + 1);
        Some(self.calls.get())
    }

    fn on_update(&self, _instance: &mut Node, _prev_props: &Inputs, _prev_state: Option<&Inputs>) -> Option<usize> {
        self.calls.set(self.calls.get() + 1);
        Some(self.calls.get())
    }
}

#[derive(Default)]
struct Screen {
    rects: RefCell<HashMap<InstanceKey, Rect>>,
    scroll_top: Cell<i32>,
}

impl Screen {
    fn place(&self, key: InstanceKey, rect: Rect) {
        self.rects.borrow_mut().insert(key, rect);
    }

    fn remove(&self, key: InstanceKey) {
        self.rects.borrow_mut().remove(&key);
    }
}

impl Geometry for Screen {
    fn bounding_rect(&self, key: InstanceKey) -> Result<Rect, GeometryError> {
        self.rects
            .borrow()
            .get(&key)
            .copied()
            .ok_or(GeometryError::NotRendered)
    }

    fn scroll_top(&self) -> i32 {
        self.scroll_top.get()
    }
}

fn props(v: impl Into<Value>) -> Inputs {
    Inputs::new().with("v", v)
}

// =============================================================================
// Instrumentation
// =============================================================================

#[test]
fn test_scenario_mount_update_unmount() {
    let registry = Registry::new();
    let a = create_render_visualizer(registry.clone()).wrap(CallCounter::named("A"));
    let mut node = Node::new(props(1));
    let key = node.key();

    a.on_create(&mut node);
    assert_eq!(registry.get(key).unwrap().log, vec!["0 ) A Initial Render"]);

    node.set_props(&a, props(2));
    assert_eq!(
        registry.get(key).unwrap().log,
        vec!["1 ) props[v] changed: '1' => '2'", "0 ) A Initial Render"]
    );

    a.on_destroy(&mut node);
    assert!(!registry.contains(key));
    assert!(registry.is_empty());
}

#[test]
fn test_count_and_log_cap_after_many_updates() {
    let registry = Registry::new();
    let a = create_render_visualizer(registry.clone()).wrap(CallCounter::named("A"));
    let mut node = Node::new(props(0));
    a.on_create(&mut node);

    for n in 1..=30 {
        node.set_props(&a, props(n));

        let record = registry.get(node.key()).unwrap();
        assert_eq!(record.count, n as u64 + 1);
        assert!(record.log.len() <= MAX_LOG_LENGTH);
    }

    let record = registry.get(node.key()).unwrap();
    assert_eq!(record.log.len(), MAX_LOG_LENGTH);
    assert_eq!(record.latest(), Some("30 ) props[v] changed: '29' => '30'"));
    assert_eq!(record.log.back().map(String::as_str), Some("11 ) props[v] changed: '10' => '11'"));
}

#[test]
fn test_state_changes_win_over_props() {
    let registry = Registry::new();
    let a = create_render_visualizer(registry.clone()).wrap(CallCounter::named("A"));
    let mut node = Node::stateful(props(1), Inputs::new().with("a", 1));
    a.on_create(&mut node);

    node.set_state(&a, Inputs::new().with("a", 2));
    assert_eq!(
        registry.get(node.key()).unwrap().latest(),
        Some("1 ) state[a] changed: '1' => '2'")
    );

    node.set_state(&a, Inputs::new().with("a", Value::list(vec![])));
    assert_eq!(registry.get(node.key()).unwrap().latest(), Some("2 ) state[a] changed"));

    // Identical inputs: forced re-render
    let same = node.state.clone().unwrap_or_default();
    node.set_state(&a, same);
    assert_eq!(
        registry.get(node.key()).unwrap().latest(),
        Some(format!("3 ) {UNKNOWN_REASON}").as_str())
    );
}

#[test]
fn test_rejected_predicate_behaves_identically() {
    let registry = Registry::new();
    let visualizer = Visualizer::with_predicate(registry.clone(), |meta| meta.name() != "Hidden");

    let plain = visualizer.wrap(CallCounter::named("Hidden"));
    let bare = CallCounter::named("Hidden");
    assert!(!plain.is_instrumented());

    let mut left = Node::new(props(1));
    let mut right = Node::new(props(1));
    assert_eq!(plain.on_create(&mut left), bare.on_create(&mut right));
    assert_eq!(left.set_props(&plain, props(2)), right.set_props(&bare, props(2)));
    assert_eq!(plain.on_destroy(&mut left), bare.on_destroy(&mut right));
    assert!(registry.is_empty());

    let shown = visualizer.wrap(CallCounter::named("Shown"));
    assert!(shown.is_instrumented());
    assert_eq!(shown.on_create(&mut left), Some(1));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_record_ids_are_never_reused() {
    let registry = Registry::new();
    let a = create_render_visualizer(registry.clone()).wrap(CallCounter::named("A"));

    let mut ids = Vec::new();
    for _ in 0..3 {
        let mut node = Node::new(props(1));
        a.on_create(&mut node);
        ids.push(registry.get(node.key()).unwrap().id);
        a.on_destroy(&mut node);
    }
    assert_eq!(ids, vec![RecordId(0), RecordId(1), RecordId(2)]);
}

// =============================================================================
// Synchronization & Overlay
// =============================================================================

#[test]
fn test_overlay_tracks_registry() {
    let registry = Registry::new();
    let component = create_render_visualizer(registry.clone()).wrap(CallCounter::named("A"));
    let screen = Screen::default();
    let mut overlay = Overlay::new(&VisualizerConfig::default());

    let start = Instant::now();
    let interval = Duration::from_millis(500);
    let mut sync = Synchronizer::starting_at(registry.clone(), interval, start);

    let mut a = Node::new(props(1));
    let mut b = Node::new(props(1));
    component.on_create(&mut a);
    component.on_create(&mut b);
    screen.place(a.key(), Rect::new(2, 4, 10, 1));
    screen.place(b.key(), Rect::new(5, 1, 10, 1));

    assert!(sync.poll(start, &screen, &mut overlay).is_none());
    let report = sync.poll(start + interval, &screen, &mut overlay).unwrap();
    assert_eq!(report.updated, 2);
    assert_eq!(overlay.len(), 2);
    assert_eq!(registry.get(a.key()).unwrap().position, Position::new(2, 4));

    // B leaves the screen but stays mounted: A moves, B keeps its last position.
    screen.scroll_top.set(3);
    screen.place(a.key(), Rect::new(0, 4, 10, 1));
    screen.remove(b.key());
    let report = sync.poll(start + interval * 2, &screen, &mut overlay).unwrap();
    assert_eq!((report.updated, report.skipped), (1, 1));
    assert_eq!(registry.get(a.key()).unwrap().position, Position::new(3, 4));
    assert_eq!(registry.get(b.key()).unwrap().position, Position::new(5, 1));
    assert_eq!(overlay.len(), 2);

    // Unmount A: its badge goes away and ticks never bring the record back.
    component.on_destroy(&mut a);
    sync.poll(start + interval * 3, &screen, &mut overlay);
    assert!(!registry.contains(a.key()));
    assert_eq!(overlay.len(), 1);
    assert!(overlay.badges().all(|badge| badge.key == b.key()));
}

#[test]
fn test_update_reshows_and_paints_count() {
    let registry = Registry::new();
    let component = create_render_visualizer(registry.clone()).wrap(CallCounter::named("A"));
    let screen = Screen::default();
    let mut overlay = Overlay::new(&VisualizerConfig::default());
    let sync = Synchronizer::new(registry.clone(), Duration::from_millis(500));

    let mut node = Node::new(props(1));
    component.on_create(&mut node);
    screen.place(node.key(), Rect::new(1, 0, 10, 1));
    sync.tick(&screen, &mut overlay);

    let id = registry.get(node.key()).unwrap().id;
    overlay.toggle_shown(id);
    sync.tick(&screen, &mut overlay);
    assert!(overlay.layouts().is_empty());

    node.set_props(&component, props(2));
    sync.tick(&screen, &mut overlay);
    assert!(overlay.badge(id).unwrap().is_shown());

    let mut buffer = FrameBuffer::new(6, 3);
    overlay.paint(&mut buffer);
    assert_eq!(buffer.row_text(1), " 2    ");
}
