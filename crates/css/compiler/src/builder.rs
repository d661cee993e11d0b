//! Accumulates compiled rules, variables and keyframes.
//!
//! Every CSS style rule is lowered once into a [`RuleBody`] (normal and
//! `!important` drafts, plus dark-scheme drafts when `light-dark()` was
//! seen) and then stamped out for each normalized selector. Each CSS rule
//! takes the next source order, shared by all the style rules it produces.

use crate::conditions::ConditionParser;
use crate::options::CompileOptions;
use crate::parsers::values::camel_case;
use crate::parsers::{Converter, Declarations, parse_declaration};
use crate::warnings::{Warning, Warnings};
use core::mem;
use css_selectors::{ClassSelector, CompoundSelector, NormalizedSelector, parse_complex_selector};
use css_syntax::{ComponentValue, Declaration, KeyframeBlock, PropMapping, parse_values};
use log::{debug, trace};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use style_ir::{
    AnimationFrames, CURRENT_COLOR_VARIABLE, ContainerQuery, Keyframe, MediaCondition, PropertyPath,
    REM_VARIABLE, RuleSetDocument, Specificity, StyleDeclaration, StyleDescriptor, StyleObject, StyleRule,
    VariableValue,
};

/// Property paths and custom properties collected for one rule.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Draft {
    entries: Vec<(PropertyPath, StyleDescriptor)>,
    variables: Vec<(String, StyleDescriptor)>,
}

impl Draft {
    /// A later declaration of the same path replaces the earlier one.
    fn declare(&mut self, path: PropertyPath, value: StyleDescriptor) {
        self.entries.retain(|(existing, _)| *existing != path);
        self.entries.push((path, value));
    }

    fn variable(&mut self, name: &str, value: StyleDescriptor) {
        self.variables.retain(|(existing, _)| existing != name);
        self.variables.push((name.to_owned(), value));
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.variables.is_empty()
    }

    fn is_animated(&self) -> bool {
        self.entries.iter().any(|(path, value)| {
            let leaf = path.leaf();
            leaf.starts_with("animation")
                || leaf.starts_with("transition")
                || value.contains_function("@animation")
                || value.contains_function("@animationName")
        })
    }

    fn uses_variables(&self) -> bool {
        self.entries
            .iter()
            .map(|(_, value)| value)
            .chain(self.variables.iter().map(|(_, value)| value))
            .any(|value| value.contains_function("var"))
    }

    /// Literal name-addressed values share one static object, placed where
    /// the first of them was declared; everything else stays path-addressed.
    fn declarations(&self) -> Vec<StyleDeclaration> {
        let mut out = Vec::new();
        let mut shared: Option<(usize, StyleObject)> = None;
        for (path, value) in &self.entries {
            if let PropertyPath::Name(name) = path
                && !value.is_dynamic()
            {
                let (_, object) = shared.get_or_insert_with(|| (out.len(), StyleObject::new()));
                object.insert(name.clone(), value.clone());
                continue;
            }
            let deferred = value.contains_function("em") || value.references_variable(CURRENT_COLOR_VARIABLE);
            out.push(StyleDeclaration::dynamic(value.clone(), path.clone(), deferred));
        }
        if let Some((index, object)) = shared {
            out.insert(index, StyleDeclaration::Static(object));
        }
        out
    }

    fn value_of(&self, name: &str) -> Option<&StyleDescriptor> {
        self.entries
            .iter()
            .find(|(path, _)| matches!(path, PropertyPath::Name(existing) if existing == name))
            .map(|(_, value)| value)
    }
}

/// One CSS style rule, lowered but not yet bound to selectors.
#[derive(Clone, Debug, Default)]
pub(crate) struct RuleBody {
    normal: Draft,
    important: Draft,
    /// Dark-scheme replacements for declarations that used `light-dark()`.
    dark: Draft,
    dark_important: Draft,
    /// Explicit `container-name`s.
    containers: Vec<String>,
    /// A `container-type` was declared.
    container_type: bool,
    target: Option<PropertyPath>,
}

/// Conditions inherited from enclosing at-rules.
#[derive(Clone, Debug, Default)]
pub(crate) struct Scope {
    pub(crate) media: Vec<MediaCondition>,
    pub(crate) container_queries: Vec<ContainerQuery>,
}

fn dark_condition() -> MediaCondition {
    MediaCondition::equals("prefers-color-scheme", "dark")
}

/// Insert a variable alternative: conditioned ones in front, the
/// unconditioned one last (replacing any previous unconditioned value).
fn push_alternative(table: &mut Vec<(String, Vec<VariableValue>)>, name: &str, alternative: VariableValue) {
    let index = table
        .iter()
        .position(|(existing, _)| existing == name)
        .unwrap_or_else(|| {
            table.push((name.to_owned(), Vec::new()));
            table.len() - 1
        });
    let Some((_, alternatives)) = table.get_mut(index) else {
        return;
    };
    if alternative.media.is_some() {
        alternatives.insert(0, alternative);
    } else {
        alternatives.retain(|existing| existing.media.is_some());
        alternatives.push(alternative);
    }
}

/// `to` of an `@prop` mapping as path segments, without a leading `^`.
fn prop_segments(to: &str) -> Vec<&str> {
    to.trim_start_matches(PropertyPath::ANCHOR)
        .trim_start_matches('.')
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// The output sink shared by the whole walk.
pub(crate) struct StylesheetBuilder<'opts> {
    options: &'opts CompileOptions,
    pub(crate) conditions: ConditionParser,
    pub(crate) prefix: Option<CompoundSelector>,
    /// Variables still referenced after inlining; `None` keeps every variable.
    used_variables: Option<BTreeSet<String>>,
    rules: Vec<(String, Vec<StyleRule>)>,
    index: FxHashMap<String, usize>,
    keyframes: Vec<(String, AnimationFrames)>,
    root_variables: Vec<(String, Vec<VariableValue>)>,
    universal_variables: Vec<(String, Vec<VariableValue>)>,
    order: u32,
    warnings: Warnings,
}

impl<'opts> StylesheetBuilder<'opts> {
    pub(crate) fn new(options: &'opts CompileOptions, used_variables: Option<BTreeSet<String>>) -> Self {
        let prefix = options
            .selector_prefix
            .as_deref()
            .and_then(|prefix| parse_complex_selector(&parse_values(prefix)))
            .map(|selector| selector.first);
        if options.selector_prefix.is_some() && prefix.is_none() {
            debug!("Ignoring unparseable selector prefix {:?}", options.selector_prefix);
        }
        Self {
            options,
            conditions: ConditionParser::new(options.inline_rem.unwrap_or(14.0)),
            prefix,
            used_variables,
            rules: Vec::new(),
            index: FxHashMap::default(),
            keyframes: Vec::new(),
            root_variables: Vec::new(),
            universal_variables: Vec::new(),
            order: 0,
            warnings: Warnings::default(),
        }
    }

    fn record(&mut self, warnings: Vec<Warning>) {
        for warning in warnings {
            debug!(
                "Dropping {:?} for `{}`: {}",
                warning.kind, warning.property, warning.detail
            );
            self.warnings.record(warning, &self.options.ignored_warnings);
        }
    }

    /// Unused custom properties are dropped when inlining is enabled.
    fn keeps_variable(&self, name: &str) -> bool {
        self.used_variables
            .as_ref()
            .is_none_or(|used| used.contains(name) || self.options.is_preserved(name))
    }

    /// Lower one declaration into `light` and, if it used `light-dark()`, `dark`.
    fn lower(&mut self, declaration: &Declaration, props: &[PropMapping], light: &mut Draft, dark: &mut Draft) {
        let options = self.options;
        if let Some(name) = declaration.name.strip_prefix("--") {
            if !self.keeps_variable(name) {
                trace!("Dropping unused variable --{name}");
                return;
            }
            let mut converter = Converter::new(options, &declaration.name, false);
            let value = converter.generic(&declaration.value);
            let saw_light_dark = converter.saw_light_dark();
            self.record(converter.take_warnings());
            let Some(value) = value else {
                return;
            };
            light.variable(name, value);
            if saw_light_dark
                && let Some(dark_value) = Converter::new(options, &declaration.name, true).generic(&declaration.value)
            {
                dark.variable(name, dark_value);
            }
            return;
        }

        let mapping = props
            .iter()
            .find(|mapping| mapping.from == declaration.name || mapping.from == camel_case(&declaration.name));
        let mut converter = Converter::new(options, &declaration.name, false);
        let mut out = Declarations::default();
        parse_declaration(&mut converter, &declaration.name, &declaration.value, &mut out);
        let saw_light_dark = converter.saw_light_dark();
        self.record(converter.take_warnings());
        for (path, value) in remap(out, mapping) {
            light.declare(path, value);
        }
        if saw_light_dark {
            let mut dark_converter = Converter::new(options, &declaration.name, true);
            let mut dark_out = Declarations::default();
            parse_declaration(&mut dark_converter, &declaration.name, &declaration.value, &mut dark_out);
            for (path, value) in remap(dark_out, mapping) {
                dark.declare(path, value);
            }
        }
    }

    /// Lower every declaration of a style rule.
    pub(crate) fn body(&mut self, declarations: &[Declaration], props: &[PropMapping]) -> RuleBody {
        let mut body = RuleBody {
            target: props
                .iter()
                .find(|mapping| mapping.from == "*")
                .map(|mapping| PropertyPath::from_dotted(&prop_segments(&mapping.to).join("."))),
            ..RuleBody::default()
        };
        for declaration in declarations {
            match declaration.name.as_str() {
                "container-name" => body.containers.extend(container_names(&declaration.value)),
                "container-type" => body.container_type |= is_container_type(&declaration.value),
                "container" => {
                    let mut parts = declaration.value.split(|value| value.is_delim('/'));
                    body.containers.extend(parts.next().map(container_names).unwrap_or_default());
                    body.container_type |= parts.next().is_some_and(is_container_type);
                }
                _ if declaration.important => {
                    self.lower(declaration, props, &mut body.important, &mut body.dark_important);
                }
                _ => self.lower(declaration, props, &mut body.normal, &mut body.dark),
            }
        }
        body
    }

    #[inline]
    pub(crate) fn next_order(&mut self) -> u32 {
        self.order += 1;
        self.order
    }

    fn rules_of(&mut self, class_name: &str) -> &mut Vec<StyleRule> {
        let index = self.index.get(class_name).copied().unwrap_or_else(|| {
            self.rules.push((class_name.to_owned(), Vec::new()));
            self.index.insert(class_name.to_owned(), self.rules.len() - 1);
            self.rules.len() - 1
        });
        &mut self.rules[index].1
    }

    /// Register `name` as a container on elements with the class `name`.
    fn container_marker(&mut self, name: &str) {
        let rules = self.rules_of(name);
        let exists = rules.iter().any(|rule| {
            rule.specificity == Specificity::ZERO && rule.declarations.is_empty() && rule.containers == [name]
        });
        if !exists {
            rules.push(StyleRule {
                specificity: Specificity::ZERO,
                containers: vec![name.to_owned()],
                ..StyleRule::default()
            });
        }
    }

    /// Stamp `body` out for each normalized selector.
    pub(crate) fn apply(&mut self, selectors: &[NormalizedSelector], body: &RuleBody, scope: &Scope, order: u32) {
        for selector in selectors {
            match selector {
                NormalizedSelector::Class(class) => self.apply_class(class, body, scope, order),
                NormalizedSelector::RootVariables { dark } => {
                    let font_size = body.normal.value_of("fontSize").cloned();
                    if self.options.inline_rem.is_none()
                        && let Some(size @ StyleDescriptor::Number(_)) = font_size
                    {
                        let media = self.variable_media(scope, *dark, false);
                        push_alternative(&mut self.root_variables, REM_VARIABLE, VariableValue { value: size, media });
                    }
                    let mut table = mem::take(&mut self.root_variables);
                    self.apply_variables(&mut table, body, scope, *dark);
                    self.root_variables = table;
                }
                NormalizedSelector::UniversalVariables { dark } => {
                    let mut table = mem::take(&mut self.universal_variables);
                    self.apply_variables(&mut table, body, scope, *dark);
                    self.universal_variables = table;
                }
            }
        }
    }

    fn variable_media(&self, scope: &Scope, dark_root: bool, dark_value: bool) -> Option<MediaCondition> {
        let mut media = scope.media.clone();
        if dark_root || dark_value {
            media.push(dark_condition());
        }
        MediaCondition::all(media)
    }

    fn apply_variables(
        &self,
        table: &mut Vec<(String, Vec<VariableValue>)>,
        body: &RuleBody,
        scope: &Scope,
        dark_root: bool,
    ) {
        let passes = [
            (&body.normal, false),
            (&body.important, false),
            (&body.dark, true),
            (&body.dark_important, true),
        ];
        for (draft, dark_value) in passes {
            for (name, value) in &draft.variables {
                let media = self.variable_media(scope, dark_root, dark_value);
                push_alternative(table, name, VariableValue { value: value.clone(), media });
            }
        }
    }

    fn apply_class(&mut self, class: &ClassSelector, body: &RuleBody, scope: &Scope, order: u32) {
        for query in &class.container_queries {
            if let Some(name) = &query.name {
                self.container_marker(name);
            }
        }
        let mut containers = body.containers.clone();
        if containers.is_empty() && body.container_type {
            containers.push(class.class_name.clone());
        }
        let variants = [
            (&body.normal, false, false),
            (&body.important, true, false),
            (&body.dark, false, true),
            (&body.dark_important, true, true),
        ];
        for (draft, important, dark) in variants {
            let registers = !important && !dark && !containers.is_empty();
            if draft.is_empty() && !registers {
                continue;
            }
            let mut media = scope.media.clone();
            media.extend(class.media.iter().cloned());
            if dark {
                media.push(dark_condition());
            }
            let mut container_queries = scope.container_queries.clone();
            container_queries.extend(class.container_queries.iter().cloned());
            let specificity = Specificity {
                order,
                important: u32::from(important),
                ..class.specificity
            };
            let rule = StyleRule {
                specificity,
                declarations: draft.declarations(),
                variables: draft.variables.clone(),
                media,
                container_queries,
                containers: if registers { containers.clone() } else { Vec::new() },
                pseudo_classes: class.pseudo_classes,
                attributes: class.attributes.clone(),
                animated: draft.is_animated(),
                dynamic_variables: draft.uses_variables(),
                target: body.target.clone(),
            };
            trace!("Rule for .{} at order {order}", class.class_name);
            self.rules_of(&class.class_name).push(rule);
        }
    }

    /// `@keyframes name { ... }`; a later block with the same name wins.
    pub(crate) fn keyframes(&mut self, name: &str, blocks: &[KeyframeBlock]) {
        let mut frames = AnimationFrames::default();
        for block in blocks {
            let mut draft = Draft::default();
            let mut unused = Draft::default();
            for declaration in &block.declarations {
                if declaration.is_custom_property() {
                    continue;
                }
                self.lower(declaration, &[], &mut draft, &mut unused);
            }
            let easing = draft
                .entries
                .iter()
                .position(|(path, _)| path.leaf() == "animationTimingFunction")
                .map(|index| draft.entries.remove(index).1);
            for offset in &block.offsets {
                if let Some(easing) = &easing {
                    frames.easing.push((*offset, easing.clone()));
                }
                frames.frames.push(Keyframe(*offset, draft.declarations()));
            }
        }
        frames.frames.sort_by(|left, right| left.0.total_cmp(&right.0));
        frames.easing.sort_by(|left, right| left.0.total_cmp(&right.0));
        self.keyframes.retain(|(existing, _)| existing != name);
        self.keyframes.push((name.to_owned(), frames));
    }

    /// `@property --name { initial-value: ... }`: a universal default.
    pub(crate) fn property(&mut self, name: &str, declarations: &[Declaration]) {
        let Some(bare) = name.strip_prefix("--") else {
            return;
        };
        if !self.keeps_variable(bare) {
            return;
        }
        let Some(initial) = declarations.iter().find(|declaration| declaration.name == "initial-value") else {
            return;
        };
        let has_default = self
            .universal_variables
            .iter()
            .any(|(existing, alternatives)| existing == bare && alternatives.iter().any(|value| value.media.is_none()));
        if has_default {
            return;
        }
        let mut converter = Converter::new(self.options, name, false);
        let value = converter.generic(&initial.value);
        self.record(converter.take_warnings());
        if let Some(value) = value {
            push_alternative(&mut self.universal_variables, bare, VariableValue::unconditioned(value));
        }
    }

    /// Sort every class's rules by specificity and assemble the document.
    pub(crate) fn finish(self) -> (RuleSetDocument, Warnings) {
        let mut rules = self.rules;
        for (_, list) in &mut rules {
            list.sort_by(|left, right| left.specificity.cmp(&right.specificity));
        }
        let document = RuleSetDocument {
            rules,
            keyframes: self.keyframes,
            root_variables: self.root_variables,
            universal_variables: self.universal_variables,
        };
        (document, self.warnings)
    }
}

/// Redirect the output of one declaration through its `@prop` mapping.
fn remap(out: Declarations, mapping: Option<&PropMapping>) -> Vec<(PropertyPath, StyleDescriptor)> {
    let Some(mapping) = mapping else {
        return out.entries;
    };
    let segments = prop_segments(&mapping.to);
    let single = out.entries.len() == 1;
    out.entries
        .into_iter()
        .map(|(path, value)| {
            let mut target = segments.clone();
            if !single || target.is_empty() {
                target.push(path.leaf());
            }
            (PropertyPath::anchored(&target), value)
        })
        .collect()
}

fn container_names(values: &[ComponentValue]) -> Vec<String> {
    values
        .iter()
        .filter_map(ComponentValue::ident)
        .filter(|name| !name.eq_ignore_ascii_case("none"))
        .map(str::to_owned)
        .collect()
}

fn is_container_type(values: &[ComponentValue]) -> bool {
    values
        .iter()
        .filter_map(ComponentValue::ident)
        .any(|kind| !kind.eq_ignore_ascii_case("normal"))
}

#[allow(clippy::panic, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    fn draft(entries: &[(&str, StyleDescriptor)]) -> Draft {
        let mut draft = Draft::default();
        for (path, value) in entries {
            draft.declare(PropertyPath::from_dotted(path), value.clone());
        }
        draft
    }

    #[test]
    fn later_paths_replace_earlier_ones() {
        let draft = draft(&[
            ("color", "#ff0000".into()),
            ("borderColor", "#0000ff".into()),
            ("borderColor", StyleDescriptor::function("var", vec!["test".into()])),
        ]);
        let declarations = draft.declarations();
        assert_eq!(declarations.len(), 2);
        let StyleDeclaration::Static(object) = &declarations[0] else {
            panic!("expected the shared static object first");
        };
        assert_eq!(object.len(), 1);
        assert!(matches!(&declarations[1], StyleDeclaration::Dynamic(dynamic) if !dynamic.deferred));
    }

    #[test]
    fn em_and_current_color_are_deferred() {
        let draft = draft(&[
            ("lineHeight", StyleDescriptor::function("em", vec![1.5.into()])),
            (
                "borderColor",
                StyleDescriptor::function("var", vec![CURRENT_COLOR_VARIABLE.into()]),
            ),
        ]);
        assert!(draft.declarations().iter().all(
            |declaration| matches!(declaration, StyleDeclaration::Dynamic(dynamic) if dynamic.deferred)
        ));
    }

    #[test]
    fn unconditioned_alternative_stays_last() {
        let mut table = Vec::new();
        push_alternative(&mut table, "bg", VariableValue::unconditioned("white".into()));
        push_alternative(
            &mut table,
            "bg",
            VariableValue {
                value: "black".into(),
                media: Some(dark_condition()),
            },
        );
        push_alternative(&mut table, "bg", VariableValue::unconditioned("gray".into()));
        let alternatives = &table[0].1;
        assert_eq!(alternatives.len(), 2);
        assert!(alternatives[0].media.is_some());
        assert_eq!(alternatives[1].value, "gray".into());
    }

    #[test]
    fn prop_targets_are_anchored() {
        let mut out = Declarations::default();
        out.set("color", "#ff0000".into());
        let mapping = PropMapping {
            from: "color".into(),
            to: "placeholderTextColor".into(),
        };
        let remapped = remap(out, Some(&mapping));
        assert_eq!(remapped[0].0.to_string(), "^.placeholderTextColor");
    }
}
