//! Lifecycle Interceptor - Instrumenting component types by wrapping.
//!
//! A component type exposes its lifecycle through [`Lifecycle`]. Wrapping a
//! type with [`Visualizer::wrap`] yields a [`Wrapped`] type that runs the
//! bookkeeping first and then delegates to the original hook, returning the
//! original's result untouched. Types rejected by the predicate come back as
//! [`Wrapped::Plain`], a pure pass-through.
//!
//! # Example
//!
//! ```ignore
//! let registry = Registry::new();
//! let visualizer = create_render_visualizer(registry.clone());
//! let counter = visualizer.wrap(Counter);
//!
//! counter.on_create(&mut instance);
//! // registry now holds "0 ) Counter Initial Render" for the instance
//! ```

use std::rc::Rc;

use tracing::trace;

use crate::cause;
use crate::registry::Registry;
use crate::record::InstanceKey;
use crate::value::Inputs;

// =============================================================================
// Host Interfaces
// =============================================================================

/// A live component instance as seen by the instrumentation.
pub trait Instance {
    /// Identity of this instance for the registry.
    fn key(&self) -> InstanceKey;

    /// Current props.
    fn props(&self) -> &Inputs;

    /// Current state, `None` for stateless components.
    fn state(&self) -> Option<&Inputs> {
        None
    }
}

/// Lifecycle hooks of a component type.
///
/// Each hook returns `None` when the type does not define it. The defaults
/// define nothing.
pub trait Lifecycle {
    type Instance: Instance;
    type Output;

    /// Human readable name. Falls back to the Rust type name.
    fn display_name(&self) -> Option<&str> {
        None
    }

    fn on_create(&self, _instance: &mut Self::Instance) -> Option<Self::Output> {
        None
    }

    fn on_update(
        &self,
        _instance: &mut Self::Instance,
        _prev_props: &Inputs,
        _prev_state: Option<&Inputs>,
    ) -> Option<Self::Output> {
        None
    }

    fn on_destroy(&self, _instance: &mut Self::Instance) -> Option<Self::Output> {
        None
    }
}

/// What the instrumentation predicate gets to see about a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentMeta<'a> {
    pub display_name: Option<&'a str>,
    pub type_name: &'static str,
}

impl<'a> ComponentMeta<'a> {
    pub fn of<L: Lifecycle>(component: &'a L) -> Self {
        Self {
            display_name: component.display_name(),
            type_name: std::any::type_name::<L>(),
        }
    }

    /// Display name, else the last segment of the type path, else `"Component"`.
    pub fn name(&self) -> &'a str {
        if let Some(name) = self.display_name.filter(|n| !n.is_empty()) {
            return name;
        }
        let base = self.type_name.split('<').next().unwrap_or_default();
        match base.rsplit("::").next() {
            Some(name) if !name.is_empty() => name,
            _ => "Component",
        }
    }
}

type Predicate = Rc<dyn Fn(&ComponentMeta<'_>) -> bool>;

// =============================================================================
// Factory
// =============================================================================

/// Factory for instrumented component types.
#[derive(Clone)]
pub struct Visualizer {
    registry: Registry,
    predicate: Predicate,
}

/// Instrument every component type.
pub fn create_render_visualizer(registry: Registry) -> Visualizer {
    Visualizer::new(registry)
}

impl Visualizer {
    pub fn new(registry: Registry) -> Self {
        Self::with_predicate(registry, |_| true)
    }

    /// Instrument only types for which `predicate` returns true.
    pub fn with_predicate(
        registry: Registry,
        predicate: impl Fn(&ComponentMeta<'_>) -> bool + 'static,
    ) -> Self {
        Self {
            registry,
            predicate: Rc::new(predicate),
        }
    }

    /// Wrap a component type. The original is moved in, never modified.
    pub fn wrap<L: Lifecycle>(&self, component: L) -> Wrapped<L> {
        let meta = ComponentMeta::of(&component);
        if !(self.predicate)(&meta) {
            trace!(type_name = meta.type_name, "not instrumented");
            return Wrapped::Plain(component);
        }
        let name = meta.name().to_string();
        Wrapped::Instrumented(Instrumented {
            inner: component,
            name,
            registry: self.registry.clone(),
        })
    }
}

// =============================================================================
// Wrapped Types
// =============================================================================

/// Result of [`Visualizer::wrap`].
pub enum Wrapped<L> {
    Plain(L),
    Instrumented(Instrumented<L>),
}

impl<L> Wrapped<L> {
    pub fn is_instrumented(&self) -> bool {
        matches!(self, Self::Instrumented(_))
    }

    /// The original component type.
    pub fn inner(&self) -> &L {
        match self {
            Self::Plain(inner) => inner,
            Self::Instrumented(wrapped) => &wrapped.inner,
        }
    }
}

impl<L: Lifecycle> Lifecycle for Wrapped<L> {
    type Instance = L::Instance;
    type Output = L::Output;

    fn display_name(&self) -> Option<&str> {
        self.inner().display_name()
    }

    fn on_create(&self, instance: &mut Self::Instance) -> Option<Self::Output> {
        match self {
            Self::Plain(inner) => inner.on_create(instance),
            Self::Instrumented(wrapped) => wrapped.on_create(instance),
        }
    }

    fn on_update(
        &self,
        instance: &mut Self::Instance,
        prev_props: &Inputs,
        prev_state: Option<&Inputs>,
    ) -> Option<Self::Output> {
        match self {
            Self::Plain(inner) => inner.on_update(instance, prev_props, prev_state),
            Self::Instrumented(wrapped) => wrapped.on_update(instance, prev_props, prev_state),
        }
    }

    fn on_destroy(&self, instance: &mut Self::Instance) -> Option<Self::Output> {
        match self {
            Self::Plain(inner) => inner.on_destroy(instance),
            Self::Instrumented(wrapped) => wrapped.on_destroy(instance),
        }
    }
}

/// A component type with render bookkeeping injected before each hook.
pub struct Instrumented<L> {
    inner: L,
    name: String,
    registry: Registry,
}

impl<L> Instrumented<L> {
    /// Name used in the initial render log entry.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<L: Lifecycle> Lifecycle for Instrumented<L> {
    type Instance = L::Instance;
    type Output = L::Output;

    fn display_name(&self) -> Option<&str> {
        self.inner.display_name()
    }

    fn on_create(&self, instance: &mut Self::Instance) -> Option<Self::Output> {
        let key = instance.key();
        self.registry.register(key);
        self.registry
            .append(key, &format!("{} Initial Render", self.name));

        self.inner.on_create(instance)
    }

    fn on_update(
        &self,
        instance: &mut Self::Instance,
        prev_props: &Inputs,
        prev_state: Option<&Inputs>,
    ) -> Option<Self::Output> {
        let reason = cause::explain(prev_props, prev_state, instance.props(), instance.state());
        self.registry.append(instance.key(), &reason);

        self.inner.on_update(instance, prev_props, prev_state)
    }

    fn on_destroy(&self, instance: &mut Self::Instance) -> Option<Self::Output> {
        self.registry.unregister(instance.key());

        self.inner.on_destroy(instance)
    }
}
