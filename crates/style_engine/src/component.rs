//! One styled component: rule matching, caching and change notification.
//!
//! A render reads class names from the props, fetches each class's rules
//! from the [`StyleStore`], keeps the ones whose conditions hold and
//! cascades them into the output props. Every store or environment signal
//! read on the way subscribes the component's effect; every prop or
//! inherited value read is recorded as a guard. The next render reuses the
//! previous output when no signal fired and every guard still holds.

use crate::cascade::{Cascade, declared_variables};
use crate::context::{Context, Counters, Guard, RenderStats};
use crate::error::StyleError;
use crate::props::{
    Capabilities, ContainerMap, ContainerState, InheritedContext, NEAREST_CONTAINER, Props, RenderOutput, StyleConfig,
    VariableMap,
};
use crate::resolver::Resolver;
use crate::store::StyleStore;
use core::cell::{Cell, RefCell};
use core::fmt;
use log::{debug, trace, warn};
use smallvec::SmallVec;
use std::rc::Rc;
use style_ir::{CURRENT_COLOR_VARIABLE, EM_VARIABLE, StyleDescriptor, StyleRule};
use style_query::{Effect, batch};

/// Rules matched for one config, in cascade order.
type Matched<'rules> = SmallVec<[&'rules StyleRule; 8]>;

/// What the previous recomputation produced and depended on.
struct Cache {
    output: Rc<RenderOutput>,
    guards: Vec<Guard>,
    inherited: InheritedContext,
    /// Variables this component publishes on top of the inherited ones.
    variables: Vec<(String, StyleDescriptor)>,
    /// Container names this component registers.
    containers: Vec<String>,
}

/// Result of one full recomputation.
struct Computed {
    props: style_ir::StyleObject,
    variables: Vec<(String, StyleDescriptor)>,
    containers: Vec<String>,
    capabilities: Capabilities,
}

pub struct ComponentInstance {
    store: Rc<StyleStore>,
    configs: Vec<StyleConfig>,
    effect: Effect,
    dirty: Rc<Cell<bool>>,
    state: Rc<ContainerState>,
    cache: RefCell<Option<Cache>>,
    counters: Counters,
    capabilities: Cell<Option<Capabilities>>,
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f
            .debug_struct("ComponentInstance")
            .field("configs", &self.configs)
            .field("container", &self.state.id())
            .field("dirty", &self.dirty.get())
            .field("stats", &self.counters.snapshot())
            .finish_non_exhaustive()
    }
}

fn class_names(value: Option<&StyleDescriptor>) -> Vec<&str> {
    match value {
        Some(StyleDescriptor::String(names)) => names.split_whitespace().collect(),
        Some(StyleDescriptor::Array(items)) => items.iter().filter_map(StyleDescriptor::as_str).collect(),
        _ => Vec::new(),
    }
}

fn merge_variables(inherited: &InheritedContext, own: &[(String, StyleDescriptor)]) -> Rc<VariableMap> {
    if own.is_empty() {
        return Rc::clone(&inherited.variables);
    }
    let mut variables = VariableMap::clone(&inherited.variables);
    for (name, value) in own {
        variables.insert(name.clone(), value.clone());
    }
    Rc::new(variables)
}

impl ComponentInstance {
    /// Create a component rendering `configs`; `on_change` is called
    /// whenever something the last render depended on changes.
    pub fn new(store: Rc<StyleStore>, configs: Vec<StyleConfig>, on_change: impl Fn() + 'static) -> Self {
        let dirty = Rc::new(Cell::new(true));
        let effect = {
            let dirty = Rc::clone(&dirty);
            Effect::new(move || {
                dirty.set(true);
                on_change();
            })
        };
        Self {
            store,
            configs,
            effect,
            dirty,
            state: Rc::new(ContainerState::new()),
            cache: RefCell::new(None),
            counters: Counters::default(),
            capabilities: Cell::new(None),
        }
    }

    /// Live state descendants see when this component is a container.
    #[inline]
    pub fn container(&self) -> &Rc<ContainerState> {
        &self.state
    }

    pub fn set_hover(&self, hover: bool) {
        self.state.hover.set(hover);
    }

    pub fn set_active(&self, active: bool) {
        self.state.active.set(active);
    }

    pub fn set_focus(&self, focus: bool) {
        self.state.focus.set(focus);
    }

    /// Report the laid out size.
    pub fn set_layout(&self, width: f64, height: f64) {
        batch(|| {
            self.state.width.set(width);
            self.state.height.set(height);
        });
    }

    #[inline]
    pub fn stats(&self) -> RenderStats {
        self.counters.snapshot()
    }

    /// Stop observing; later changes no longer call `on_change`.
    pub fn unmount(&self) {
        self.effect.dispose();
        self.cache.borrow_mut().take();
        self.dirty.set(true);
    }

    /// Resolve the props for `props` under `inherited`.
    ///
    /// # Errors
    /// Returns [`StyleError`] when a runtime function is unknown or called
    /// with invalid arguments.
    pub fn render(&self, props: &Props, inherited: &InheritedContext) -> Result<Rc<RenderOutput>, StyleError> {
        Counters::bump(&self.counters.renders);
        if let Some(output) = self.reuse(props, inherited) {
            Counters::bump(&self.counters.skipped);
            return Ok(output);
        }
        Counters::bump(&self.counters.recomputes);
        self.effect.unsubscribe();
        self.dirty.set(false);
        let context = Context::new(&self.store, &self.effect, props, inherited, &self.state, &self.counters);
        let computed = match self.compute(&context) {
            Ok(computed) => computed,
            Err(error) => {
                self.dirty.set(true);
                self.cache.borrow_mut().take();
                debug!("Render failed: {error}");
                return Err(error);
            }
        };
        self.check_capabilities(computed.capabilities);
        let output = Rc::new(RenderOutput {
            props: computed.props,
            variables: merge_variables(inherited, &computed.variables),
            containers: self.container_map(inherited, &computed.containers),
            capabilities: computed.capabilities,
        });
        let registers = !computed.containers.is_empty();
        *self.cache.borrow_mut() = Some(Cache {
            output: Rc::clone(&output),
            guards: context.take_guards(),
            inherited: inherited.clone(),
            variables: computed.variables,
            containers: computed.containers,
        });
        if registers {
            self.publish_props(props);
        }
        Ok(output)
    }

    /// The previous output, when nothing it depended on changed.
    ///
    /// A registered container still republishes its props: descendants may
    /// query props this component never read itself.
    fn reuse(&self, props: &Props, inherited: &InheritedContext) -> Option<Rc<RenderOutput>> {
        if self.dirty.get() {
            return None;
        }
        let (output, registers) = {
            let mut slot = self.cache.borrow_mut();
            let cache = slot.as_mut()?;
            if !cache.guards.iter().all(|guard| guard.holds(props, inherited)) {
                trace!("Guard failed, recomputing");
                return None;
            }
            if !inherited.same_as(&cache.inherited) {
                let previous = &cache.output;
                let output = Rc::new(RenderOutput {
                    props: previous.props.clone(),
                    variables: merge_variables(inherited, &cache.variables),
                    containers: self.container_map(inherited, &cache.containers),
                    capabilities: previous.capabilities,
                });
                cache.output = output;
                cache.inherited = inherited.clone();
            }
            (Rc::clone(&cache.output), !cache.containers.is_empty())
        };
        if registers {
            self.publish_props(props);
        }
        Some(output)
    }

    /// Containers visible to children, with this component registered
    /// under `names` when it is a container.
    fn container_map(&self, inherited: &InheritedContext, names: &[String]) -> Rc<ContainerMap> {
        if names.is_empty() {
            return Rc::clone(&inherited.containers);
        }
        let mut containers = ContainerMap::clone(&inherited.containers);
        for name in names.iter().map(String::as_str).chain([NEAREST_CONTAINER]) {
            containers.insert(name.to_owned(), Rc::clone(&self.state));
        }
        Rc::new(containers)
    }

    /// Expose `props` to descendants' attribute queries. Equal props do not
    /// notify.
    fn publish_props(&self, props: &Props) {
        self.state.props.set(Rc::new(props.clone()));
    }

    fn check_capabilities(&self, capabilities: Capabilities) {
        let previous = self.capabilities.replace(Some(capabilities));
        if cfg!(debug_assertions)
            && let Some(previous) = previous
            && previous != capabilities
        {
            warn!("Component capabilities changed between renders: {previous:?} -> {capabilities:?}");
        }
    }

    fn compute(&self, context: &Context<'_>) -> Result<Computed, StyleError> {
        let mut capabilities = Capabilities::default();
        let mut lists = Vec::new();
        for (index, config) in self.configs.iter().enumerate() {
            for class_name in class_names(context.prop(&config.source)) {
                if let Some(forced) = self.store.sentinel(class_name) {
                    capabilities = capabilities.merge(forced);
                }
                if let Some(rules) = context.read(&self.store.rules(class_name)) {
                    lists.push((index, rules));
                }
            }
        }

        let mut matched: Vec<Matched<'_>> = vec![SmallVec::new(); self.configs.len()];
        for (index, rules) in &lists {
            for rule in rules.iter() {
                capabilities.pressable |= rule.has_pseudo_classes();
                if context.test_rule(rule) {
                    capabilities.variables |= !rule.variables.is_empty() || rule.dynamic_variables;
                    capabilities.containers |= !rule.containers.is_empty();
                    capabilities.animated |= rule.animated;
                    if let Some(slot) = matched.get_mut(*index) {
                        slot.push(rule);
                    }
                }
            }
        }
        for rules in &mut matched {
            rules.sort_by_key(|rule| rule.specificity);
        }
        let mut all: Vec<&StyleRule> = matched.iter().flatten().copied().collect();
        all.sort_by_key(|rule| rule.specificity);
        trace!("{} of {} rule lists matched {} rules", lists.len(), self.configs.len(), all.len());

        let resolver = Resolver::new(context, declared_variables(all.iter().copied()));
        let mut cascade = Cascade::new(&resolver);
        for (config, rules) in self.configs.iter().zip(&matched) {
            let base = config.target_segments();
            for rule in rules.iter().filter(|rule| rule.specificity.important == 0) {
                cascade.apply_rule(&base, rule)?;
            }
            if let Some(style) = Self::inline_style(context, &base) {
                cascade.apply_inline(&base, style)?;
            }
            for rule in rules.iter().filter(|rule| rule.specificity.important > 0) {
                cascade.apply_rule(&base, rule)?;
            }
        }
        let metrics_base = self
            .configs
            .first()
            .map(StyleConfig::target_segments)
            .unwrap_or_default();
        let (props, metrics) = cascade.finish(&metrics_base)?;

        let mut variables = if resolver.has_own_variables() {
            resolver.own_variables()?
        } else {
            Vec::new()
        };
        if let Some(size) = metrics.font_size {
            variables.push((EM_VARIABLE.to_owned(), size.into()));
        }
        if let Some(color) = metrics.color {
            variables.push((CURRENT_COLOR_VARIABLE.to_owned(), color));
        }
        let mut containers: Vec<String> = Vec::new();
        for name in all.iter().flat_map(|rule| &rule.containers) {
            if !containers.contains(name) {
                containers.push(name.clone());
            }
        }
        Ok(Computed {
            props,
            variables,
            containers,
            capabilities,
        })
    }

    /// The inline style prop at `base`, e.g. `props.style`.
    fn inline_style<'props>(context: &Context<'props>, base: &[String]) -> Option<&'props StyleDescriptor> {
        let (first, rest) = base.split_first()?;
        let mut value = context.prop(first)?;
        for segment in rest {
            match value {
                StyleDescriptor::Object(object) => value = object.get(segment)?,
                _ => return None,
            }
        }
        Some(value)
    }
}

impl Drop for ComponentInstance {
    fn drop(&mut self) {
        self.effect.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_names_accept_strings_and_lists() {
        let text = StyleDescriptor::from("a  b\tc");
        assert_eq!(class_names(Some(&text)), vec!["a", "b", "c"]);
        let list = StyleDescriptor::Array(vec!["a".into(), 1.0.into()]);
        assert_eq!(class_names(Some(&list)), vec!["a"]);
        assert!(class_names(None).is_empty());
    }

    #[test]
    fn own_variables_extend_a_copy() {
        let inherited = InheritedContext::new().with_variable("a", 1.0);
        let same = merge_variables(&inherited, &[]);
        assert!(Rc::ptr_eq(&same, &inherited.variables));
        let merged = merge_variables(&inherited, &[("b".to_owned(), 2.0.into())]);
        assert_eq!(merged.len(), 2);
        assert_eq!(inherited.variables.len(), 1);
    }
}
