//! Component inputs and outputs.

use core::cell::Cell;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use style_ir::{PropertyPath, StyleDescriptor, StyleObject};
use style_query::Signal;

/// Resolved variables visible to descendants, names without `--`.
pub type VariableMap = FxHashMap<String, StyleDescriptor>;

/// Containers visible to descendants, by container name.
pub type ContainerMap = FxHashMap<String, Rc<ContainerState>>;

/// Key under which the nearest container is published.
pub(crate) const NEAREST_CONTAINER: &str = "";

/// Props passed to a component.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    values: StyleObject,
}

impl Props {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Self::set`].
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<StyleDescriptor>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<StyleDescriptor>) {
        self.values.insert(name.to_owned(), value.into());
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&StyleDescriptor> {
        self.values.get(name)
    }

    /// Entry of the `dataSet` prop.
    pub fn data(&self, name: &str) -> Option<&StyleDescriptor> {
        match self.values.get("dataSet") {
            Some(StyleDescriptor::Object(data)) => data.get(name),
            _ => None,
        }
    }
}

/// Maps one class-name prop to the prop its styles are written to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleConfig {
    /// Prop holding the class names, e.g. `className`.
    pub source: String,
    /// Prop receiving the styles; `None` spreads them over the props root.
    pub target: Option<PropertyPath>,
}

impl StyleConfig {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_owned(),
            target: Some(PropertyPath::from_dotted(target)),
        }
    }

    /// Styles are written directly onto the props.
    pub fn spread(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            target: None,
        }
    }

    pub(crate) fn target_segments(&self) -> Vec<String> {
        self.target
            .as_ref()
            .map(|target| target.segments().into_iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::new("className", "style")
    }
}

thread_local! {
    static NEXT_CONTAINER_ID: Cell<u64> = const { Cell::new(1) };
}

/// Live state of an element that descendants can query: its layout,
/// interaction flags and props.
#[derive(Debug)]
pub struct ContainerState {
    id: u64,
    pub(crate) width: Signal<f64>,
    pub(crate) height: Signal<f64>,
    pub(crate) hover: Signal<bool>,
    pub(crate) active: Signal<bool>,
    pub(crate) focus: Signal<bool>,
    pub(crate) props: Signal<Rc<Props>>,
}

impl ContainerState {
    pub(crate) fn new() -> Self {
        let id = NEXT_CONTAINER_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            id
        });
        Self {
            id,
            width: Signal::new(0.0),
            height: Signal::new(0.0),
            hover: Signal::new(false),
            active: Signal::new(false),
            focus: Signal::new(false),
            props: Signal::new(Rc::new(Props::default())),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Last reported layout size.
    #[inline]
    pub fn size(&self) -> (f64, f64) {
        (self.width.peek(), self.height.peek())
    }
}

/// What a component inherits from its ancestors.
#[derive(Clone, Debug, Default)]
pub struct InheritedContext {
    pub(crate) variables: Rc<VariableMap>,
    pub(crate) containers: Rc<ContainerMap>,
}

impl InheritedContext {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style inherited variable, mostly for tests and roots.
    #[must_use]
    pub fn with_variable(mut self, name: &str, value: impl Into<StyleDescriptor>) -> Self {
        Rc::make_mut(&mut self.variables).insert(name.to_owned(), value.into());
        self
    }

    #[inline]
    pub fn variable(&self, name: &str) -> Option<&StyleDescriptor> {
        self.variables.get(name)
    }

    /// Container registered as `name`; `None` asks for the nearest one.
    pub fn container(&self, name: Option<&str>) -> Option<&Rc<ContainerState>> {
        self.containers.get(name.unwrap_or(NEAREST_CONTAINER))
    }

    /// Whether both contexts hold the same variables and bind every name to
    /// the same container.
    pub(crate) fn same_as(&self, other: &Self) -> bool {
        let variables = Rc::ptr_eq(&self.variables, &other.variables) || self.variables == other.variables;
        let containers = Rc::ptr_eq(&self.containers, &other.containers)
            || (self.containers.len() == other.containers.len()
                && self.containers.iter().all(|(name, container)| {
                    other
                        .containers
                        .get(name)
                        .is_some_and(|bound| Rc::ptr_eq(container, bound))
                }));
        variables && containers
    }
}

/// Structural features a component needs from its host.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Provides variables to descendants.
    pub variables: bool,
    /// Registers itself as a container.
    pub containers: bool,
    pub animated: bool,
    /// Needs interaction (hover/active/focus) events.
    pub pressable: bool,
}

impl Capabilities {
    #[inline]
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            variables: self.variables || other.variables,
            containers: self.containers || other.containers,
            animated: self.animated || other.animated,
            pressable: self.pressable || other.pressable,
        }
    }
}

/// Result of one render.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// Resolved props by target prop name (`style`, `placeholderTextColor`, ...).
    pub props: StyleObject,
    /// Variables visible to children.
    pub variables: Rc<VariableMap>,
    /// Containers visible to children.
    pub containers: Rc<ContainerMap>,
    pub capabilities: Capabilities,
}

impl RenderOutput {
    /// The resolved `style` object, if any.
    pub fn style(&self) -> Option<&StyleObject> {
        match self.props.get("style") {
            Some(StyleDescriptor::Object(style)) => Some(style),
            _ => None,
        }
    }

    /// Convenience lookup of one `style` entry.
    pub fn style_value(&self, name: &str) -> Option<&StyleDescriptor> {
        self.style()?.get(name)
    }

    /// Context to render children with.
    pub fn child_context(&self) -> InheritedContext {
        InheritedContext {
            variables: Rc::clone(&self.variables),
            containers: Rc::clone(&self.containers),
        }
    }
}
