//! Per-render evaluation context and guards.
//!
//! Signal reads are tracked by the component's effect. Everything else a
//! render depends on (props, inherited variables, inherited containers) is
//! recorded as a [`Guard`]: the observed value is checked again on the next
//! render and a mismatch forces a full recomputation.

use crate::props::{ContainerState, InheritedContext, Props};
use crate::store::StyleStore;
use core::cell::{Cell, RefCell};
use std::rc::Rc;
use style_ir::{AttributeKind, StyleDescriptor};
use style_query::{Effect, Signal};

/// One non-reactive input observed during a render.
#[derive(Clone, Debug)]
pub(crate) enum Guard {
    /// A prop read directly (class names, inline style).
    Prop { name: String, value: Option<StyleDescriptor> },
    /// A prop or `dataSet` entry read by an attribute condition.
    Attribute {
        kind: AttributeKind,
        name: String,
        value: Option<StyleDescriptor>,
    },
    /// An inherited variable.
    Variable { name: String, value: Option<StyleDescriptor> },
    /// The container bound to a name; `None` name is the nearest container.
    Container {
        name: Option<String>,
        container: Option<Rc<ContainerState>>,
    },
}

pub(crate) fn attribute<'props>(props: &'props Props, kind: AttributeKind, name: &str) -> Option<&'props StyleDescriptor> {
    match kind {
        AttributeKind::Attribute => props.get(name),
        AttributeKind::Dataset => props.data(name),
    }
}

impl Guard {
    /// Whether the observed value is still what `props` and `inherited` hold.
    pub(crate) fn holds(&self, props: &Props, inherited: &InheritedContext) -> bool {
        match self {
            Self::Prop { name, value } => props.get(name) == value.as_ref(),
            Self::Attribute { kind, name, value } => attribute(props, *kind, name) == value.as_ref(),
            Self::Variable { name, value } => inherited.variable(name) == value.as_ref(),
            Self::Container { name, container } => {
                match (inherited.container(name.as_deref()), container) {
                    (Some(current), Some(seen)) => Rc::ptr_eq(current, seen),
                    (None, None) => true,
                    _ => false,
                }
            }
        }
    }
}

/// Counters exposed through [`crate::ComponentInstance::stats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Calls to `render`.
    pub renders: u64,
    /// Renders that re-ran rule filtering and resolution.
    pub recomputes: u64,
    /// Renders answered from the previous output.
    pub skipped: u64,
    /// Individual rule condition tests.
    pub rule_tests: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) renders: Cell<u64>,
    pub(crate) recomputes: Cell<u64>,
    pub(crate) skipped: Cell<u64>,
    pub(crate) rule_tests: Cell<u64>,
}

impl Counters {
    pub(crate) fn bump(counter: &Cell<u64>) {
        counter.set(counter.get().saturating_add(1));
    }

    pub(crate) fn snapshot(&self) -> RenderStats {
        RenderStats {
            renders: self.renders.get(),
            recomputes: self.recomputes.get(),
            skipped: self.skipped.get(),
            rule_tests: self.rule_tests.get(),
        }
    }
}

/// Inputs of one recomputation.
pub(crate) struct Context<'render> {
    pub(crate) store: &'render StyleStore,
    pub(crate) effect: &'render Effect,
    pub(crate) props: &'render Props,
    pub(crate) inherited: &'render InheritedContext,
    /// The component's own layout and interaction state.
    pub(crate) element: &'render ContainerState,
    pub(crate) counters: &'render Counters,
    pub(crate) guards: RefCell<Vec<Guard>>,
}

impl<'render> Context<'render> {
    pub(crate) fn new(
        store: &'render StyleStore,
        effect: &'render Effect,
        props: &'render Props,
        inherited: &'render InheritedContext,
        element: &'render ContainerState,
        counters: &'render Counters,
    ) -> Self {
        Self {
            store,
            effect,
            props,
            inherited,
            element,
            counters,
            guards: RefCell::new(Vec::new()),
        }
    }

    /// Read a signal, subscribing the component.
    #[inline]
    pub(crate) fn read<T: Clone + 'static>(&self, signal: &Signal<T>) -> T {
        signal.get(Some(self.effect))
    }

    pub(crate) fn guard(&self, guard: Guard) {
        self.guards.borrow_mut().push(guard);
    }

    /// Read a prop, guarding on its value.
    pub(crate) fn prop(&self, name: &str) -> Option<&'render StyleDescriptor> {
        let value = self.props.get(name);
        self.guard(Guard::Prop {
            name: name.to_owned(),
            value: value.cloned(),
        });
        value
    }

    /// Read an inherited variable, guarding on its value.
    pub(crate) fn inherited_variable(&self, name: &str) -> Option<&'render StyleDescriptor> {
        let value = self.inherited.variable(name);
        self.guard(Guard::Variable {
            name: name.to_owned(),
            value: value.cloned(),
        });
        value
    }

    /// Look up an ancestor container, guarding on which one is bound.
    pub(crate) fn container(&self, name: Option<&str>) -> Option<&'render Rc<ContainerState>> {
        let container = self.inherited.container(name);
        self.guard(Guard::Container {
            name: name.map(str::to_owned),
            container: container.map(Rc::clone),
        });
        container
    }

    pub(crate) fn take_guards(&self) -> Vec<Guard> {
        self.guards.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_compare_against_fresh_inputs() {
        let props = Props::new().with("className", "a");
        let inherited = InheritedContext::new().with_variable("gap", 4.0);
        let prop = Guard::Prop {
            name: "className".into(),
            value: Some("a".into()),
        };
        let variable = Guard::Variable {
            name: "gap".into(),
            value: Some(4.0.into()),
        };
        let container = Guard::Container {
            name: Some("card".into()),
            container: None,
        };
        assert!(prop.holds(&props, &inherited));
        assert!(variable.holds(&props, &inherited));
        assert!(container.holds(&props, &inherited));

        let changed = Props::new().with("className", "b");
        assert!(!prop.holds(&changed, &inherited));
        assert!(!variable.holds(&props, &InheritedContext::new()));
    }
}
