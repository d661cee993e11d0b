//! CSS Custom Properties for Cascading Variables Module Level 1: compile-time inlining.
//! Spec: <https://www.w3.org/TR/css-variables-1/>
//!
//! Custom properties that are declared once on an unconditioned `:root` or
//! `*` rule and referenced exactly once are substituted into their single
//! use site, flattening `var()` chains. The input stylesheet is never
//! mutated; a rewritten copy is returned.

#![forbid(unsafe_code)]

use css_syntax::{ComponentValue, CssRule, Declaration, KeyframeBlock, StyleRule, Stylesheet, to_css, trim};
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};

/// Output of [`inline_variables`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InlinedStylesheet {
    pub stylesheet: Stylesheet,
    /// Names (without `--`) still referenced by a `var()` after inlining.
    pub used_variables: BTreeSet<String>,
    /// Names (without `--`) that were substituted and removed.
    pub inlined_variables: BTreeSet<String>,
}

/// One declaration of a custom property.
#[derive(Clone, Debug)]
struct Definition {
    value: Vec<ComponentValue>,
    /// Declared in an unconditioned top-level `:root` or `*` rule.
    inlinable: bool,
}

/// Definition and reference counts for every custom property in a sheet.
/// Keys keep the leading `--`.
#[derive(Debug, Default)]
struct VariableUsage {
    definitions: BTreeMap<String, Vec<Definition>>,
    references: BTreeMap<String, usize>,
}

/// `--name` from the arguments of a `var()` call.
fn var_name(args: &[ComponentValue]) -> Option<&str> {
    trim(args)
        .first()
        .and_then(ComponentValue::ident)
        .filter(|name| name.starts_with("--"))
}

/// `:root` or `*` with nothing else.
fn is_variable_scope(selectors: &[ComponentValue]) -> bool {
    match trim(selectors) {
        [ComponentValue::Colon, ComponentValue::Ident(name)] => name.eq_ignore_ascii_case("root"),
        [ComponentValue::Delim('*')] => true,
        _ => false,
    }
}

impl VariableUsage {
    fn count_references(&mut self, values: &[ComponentValue]) {
        for value in values {
            match value {
                ComponentValue::Function { name, args } => {
                    if name == "var"
                        && let Some(variable) = var_name(args)
                    {
                        *self.references.entry(variable.to_owned()).or_default() += 1;
                    }
                    self.count_references(args);
                }
                ComponentValue::ParenBlock(inner)
                | ComponentValue::SquareBlock(inner)
                | ComponentValue::CurlyBlock(inner) => self.count_references(inner),
                _ => {}
            }
        }
    }

    fn visit_declarations(&mut self, declarations: &[Declaration], scope: bool) {
        for declaration in declarations {
            self.count_references(&declaration.value);
            if declaration.is_custom_property() {
                self.definitions
                    .entry(declaration.name.clone())
                    .or_default()
                    .push(Definition {
                        value: declaration.value.clone(),
                        inlinable: scope && !declaration.important,
                    });
            }
        }
    }

    fn visit_rules(&mut self, rules: &[CssRule], top_level: bool) {
        for rule in rules {
            match rule {
                CssRule::Style(style) => {
                    let scope = top_level && is_variable_scope(&style.selectors);
                    self.visit_declarations(&style.declarations, scope);
                    self.visit_rules(&style.rules, false);
                }
                CssRule::Media { rules: nested, .. } | CssRule::Container { rules: nested, .. } => {
                    self.visit_rules(nested, false);
                }
                CssRule::Keyframes { frames, .. } => {
                    for frame in frames {
                        self.visit_declarations(&frame.declarations, false);
                    }
                }
                CssRule::Property { name, declarations } => {
                    for declaration in declarations {
                        self.count_references(&declaration.value);
                    }
                    // A registered property always stays a real variable.
                    self.definitions.entry(name.clone()).or_default().push(Definition {
                        value: Vec::new(),
                        inlinable: false,
                    });
                }
            }
        }
    }

    fn candidates(&self, preserve: &[String]) -> BTreeMap<String, Vec<ComponentValue>> {
        let preserved = |name: &str| {
            let bare = name.trim_start_matches("--");
            preserve.iter().any(|kept| kept.trim_start_matches("--") == bare)
        };
        let mut out = BTreeMap::new();
        for (name, definitions) in &self.definitions {
            let [definition] = definitions.as_slice() else {
                continue;
            };
            if !definition.inlinable || preserved(name) || self.references.get(name) != Some(&1) {
                continue;
            }
            out.insert(name.clone(), trim(&definition.value).to_vec());
        }
        out
    }

    fn referenced_names(&self) -> BTreeSet<String> {
        self.references
            .keys()
            .map(|name| name.trim_start_matches("--").to_owned())
            .collect()
    }
}

/// Replace references to `candidates` in `values`, recursively.
/// `stack` holds the chain being expanded; a cyclic reference is left as is.
fn substitute(
    values: &[ComponentValue],
    candidates: &BTreeMap<String, Vec<ComponentValue>>,
    stack: &mut Vec<String>,
) -> Vec<ComponentValue> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        match value {
            ComponentValue::Function { name, args } => {
                if name == "var"
                    && let Some(variable) = var_name(args)
                    && let Some(replacement) = candidates.get(variable)
                    && !stack.iter().any(|seen| seen == variable)
                {
                    stack.push(variable.to_owned());
                    out.extend(substitute(replacement, candidates, stack));
                    stack.pop();
                } else {
                    out.push(ComponentValue::Function {
                        name: name.clone(),
                        args: substitute(args, candidates, stack),
                    });
                }
            }
            ComponentValue::ParenBlock(inner) => {
                out.push(ComponentValue::ParenBlock(substitute(inner, candidates, stack)));
            }
            ComponentValue::SquareBlock(inner) => {
                out.push(ComponentValue::SquareBlock(substitute(inner, candidates, stack)));
            }
            ComponentValue::CurlyBlock(inner) => {
                out.push(ComponentValue::CurlyBlock(substitute(inner, candidates, stack)));
            }
            other => out.push(other.clone()),
        }
    }
    out
}

struct Rewriter<'vars> {
    candidates: &'vars BTreeMap<String, Vec<ComponentValue>>,
}

impl Rewriter<'_> {
    fn declarations(&self, declarations: &[Declaration]) -> Vec<Declaration> {
        declarations
            .iter()
            .filter(|declaration| !self.candidates.contains_key(&declaration.name))
            .map(|declaration| {
                let value = substitute(&declaration.value, self.candidates, &mut Vec::new());
                if value == declaration.value {
                    return declaration.clone();
                }
                trace!("Inlined variables in `{}`", declaration.name);
                Declaration {
                    name: declaration.name.clone(),
                    raw: to_css(&value),
                    value,
                    important: declaration.important,
                }
            })
            .collect()
    }

    fn rules(&self, rules: &[CssRule]) -> Vec<CssRule> {
        rules
            .iter()
            .map(|rule| match rule {
                CssRule::Style(style) => CssRule::Style(StyleRule {
                    selectors: style.selectors.clone(),
                    declarations: self.declarations(&style.declarations),
                    rules: self.rules(&style.rules),
                    props: style.props.clone(),
                }),
                CssRule::Media { query, rules: nested } => CssRule::Media {
                    query: query.clone(),
                    rules: self.rules(nested),
                },
                CssRule::Container { query, rules: nested } => CssRule::Container {
                    query: query.clone(),
                    rules: self.rules(nested),
                },
                CssRule::Keyframes { name, frames } => CssRule::Keyframes {
                    name: name.clone(),
                    frames: frames
                        .iter()
                        .map(|frame| KeyframeBlock {
                            offsets: frame.offsets.clone(),
                            declarations: self.declarations(&frame.declarations),
                        })
                        .collect(),
                },
                CssRule::Property { .. } => rule.clone(),
            })
            .collect()
    }
}

/// Names (without `--`) referenced by any `var()` in the sheet.
pub fn referenced_variables(sheet: &Stylesheet) -> BTreeSet<String> {
    let mut usage = VariableUsage::default();
    usage.visit_rules(&sheet.rules, true);
    usage.referenced_names()
}

/// Inline single-use custom properties. Names in `preserve` (with or
/// without `--`) are never inlined.
pub fn inline_variables(sheet: &Stylesheet, preserve: &[String]) -> InlinedStylesheet {
    let mut usage = VariableUsage::default();
    usage.visit_rules(&sheet.rules, true);
    let candidates = usage.candidates(preserve);
    if candidates.is_empty() {
        return InlinedStylesheet {
            used_variables: usage.referenced_names(),
            stylesheet: sheet.clone(),
            inlined_variables: BTreeSet::new(),
        };
    }
    debug!("Inlining {} single-use variables", candidates.len());
    let stylesheet = Stylesheet {
        rules: Rewriter { candidates: &candidates }.rules(&sheet.rules),
    };
    InlinedStylesheet {
        used_variables: referenced_variables(&stylesheet),
        stylesheet,
        inlined_variables: candidates
            .keys()
            .map(|name| name.trim_start_matches("--").to_owned())
            .collect(),
    }
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;
    use css_syntax::parse_stylesheet;

    fn declarations(sheet: &Stylesheet) -> Vec<(String, String)> {
        fn walk(rules: &[CssRule], out: &mut Vec<(String, String)>) {
            for rule in rules {
                match rule {
                    CssRule::Style(style) => {
                        for declaration in &style.declarations {
                            out.push((declaration.name.clone(), to_css(&declaration.value)));
                        }
                        walk(&style.rules, out);
                    }
                    CssRule::Media { rules: nested, .. } | CssRule::Container { rules: nested, .. } => walk(nested, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&sheet.rules, &mut out);
        out
    }

    fn inline(css: &str) -> InlinedStylesheet {
        inline_variables(&parse_stylesheet(css).unwrap(), &[])
    }

    #[test]
    fn chains_are_flattened() {
        let inlined = inline(":root { --a: 10px; --b: var(--a); --c: var(--b) } .x { width: var(--c) }");
        let manual = parse_stylesheet(":root {} .x { width: 10px }").unwrap();
        assert_eq!(declarations(&inlined.stylesheet), declarations(&manual));
        assert!(inlined.used_variables.is_empty());
        assert_eq!(inlined.inlined_variables.len(), 3);
    }

    #[test]
    fn multiple_uses_are_kept() {
        let inlined = inline(":root { --a: red } .x { color: var(--a) } .y { color: var(--a) }");
        assert!(inlined.inlined_variables.is_empty());
        assert!(inlined.used_variables.contains("a"));
    }

    #[test]
    fn conditioned_and_class_definitions_are_kept() {
        let media = inline("@media (min-width: 1px) { :root { --a: red } } .x { color: var(--a) }");
        assert!(media.inlined_variables.is_empty());
        let class = inline(".x { --a: red; color: var(--a) }");
        assert!(class.inlined_variables.is_empty());
    }

    #[test]
    fn preserved_names_are_kept() {
        let sheet = parse_stylesheet(":root { --a: red } .x { color: var(--a) }").unwrap();
        let inlined = inline_variables(&sheet, &["a".to_owned()]);
        assert!(inlined.inlined_variables.is_empty());
        assert_eq!(inlined.stylesheet, sheet);
    }

    #[test]
    fn cycles_are_left_alone() {
        let inlined = inline(":root { --a: var(--b); --b: var(--a) } .x { color: var(--a) }");
        assert_eq!(
            declarations(&inlined.stylesheet),
            vec![
                ("--a".to_owned(), "var(--a)".to_owned()),
                ("color".to_owned(), "var(--a)".to_owned()),
            ]
        );
    }
}
