//! Writing matched rules into the output props.
//! Spec: <https://www.w3.org/TR/css-cascade-5/#cascade-sort>
//!
//! Rules arrive sorted by specificity. Normal declarations are written
//! first, then the inline style, then `!important` rules, so a later write
//! to the same path wins. Declarations that depend on the element's own
//! font size or color are written as placeholders and evaluated once the
//! rest of the cascade has settled.

use crate::error::StyleError;
use crate::resolver::{ElementMetrics, Resolved, Resolver};
use core::mem;
use log::trace;
use rustc_hash::FxHashMap;
use style_ir::{PropertyPath, StyleDeclaration, StyleDescriptor, StyleObject, StyleRule};

/// The object at `segments`, created (or replaced) as needed.
fn object_at<'obj>(object: &'obj mut StyleObject, segments: &[String]) -> Option<&'obj mut StyleObject> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(object);
    };
    let slot = object.entry(first.clone()).or_insert(StyleDescriptor::Undefined);
    if !matches!(slot, StyleDescriptor::Object(_)) {
        *slot = StyleDescriptor::Object(StyleObject::new());
    }
    match slot {
        StyleDescriptor::Object(inner) => object_at(inner, rest),
        _ => None,
    }
}

fn value_at<'obj>(object: &'obj StyleObject, segments: &[String]) -> Option<&'obj StyleDescriptor> {
    let (first, rest) = segments.split_first()?;
    let value = object.get(first)?;
    if rest.is_empty() {
        return Some(value);
    }
    match value {
        StyleDescriptor::Object(inner) => value_at(inner, rest),
        _ => None,
    }
}

/// Assign `value` at `segments`; undefined removes the entry.
fn assign(object: &mut StyleObject, segments: &[String], value: StyleDescriptor) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    if value.is_undefined() {
        if let Some(StyleDescriptor::Object(parent)) = value_at_mut(object, parents) {
            parent.remove(leaf);
        } else if parents.is_empty() {
            object.remove(leaf);
        }
        return;
    }
    if let Some(parent) = object_at(object, parents) {
        parent.insert(leaf.clone(), value);
    }
}

fn value_at_mut<'obj>(object: &'obj mut StyleObject, segments: &[String]) -> Option<&'obj mut StyleDescriptor> {
    let (first, rest) = segments.split_first()?;
    let value = object.get_mut(first)?;
    if rest.is_empty() {
        return Some(value);
    }
    match value {
        StyleDescriptor::Object(inner) => value_at_mut(inner, rest),
        _ => None,
    }
}

/// Write a resolved declaration whose own path is `segments`.
fn write(object: &mut StyleObject, segments: &[String], resolved: Resolved) {
    match resolved {
        Resolved::Value(value) => assign(object, segments, value),
        Resolved::Expand(entries) => {
            let parents = segments.split_last().map_or(&[][..], |(_, parents)| parents);
            for (name, value) in entries {
                let mut path = parents.to_vec();
                path.push(name);
                assign(object, &path, value);
            }
        }
        Resolved::MergeTransform { replaces, entries } => {
            let mut path = segments.split_last().map_or_else(Vec::new, |(_, parents)| parents.to_vec());
            path.push("transform".to_owned());
            let mut list = match value_at(object, &path) {
                Some(StyleDescriptor::Array(list)) => list.clone(),
                _ => Vec::new(),
            };
            list.retain(|entry| match entry {
                StyleDescriptor::Object(entry) => !entry.keys().any(|key| replaces.contains(&key.as_str())),
                _ => true,
            });
            list.extend(entries);
            assign(object, &path, StyleDescriptor::Array(list));
        }
    }
}

/// Absolute segments of a declaration path under `base`.
fn absolute(base: &[String], path: &PropertyPath) -> Vec<String> {
    let segments = path.segments();
    if path.is_anchored() {
        return segments.into_iter().skip(1).map(str::to_owned).collect();
    }
    let mut out = base.to_vec();
    out.extend(segments.into_iter().map(str::to_owned));
    out
}

/// Write keyframe declarations into one frame object. Paths are taken
/// relative to the frame and nothing is deferred.
pub(crate) fn write_declarations(
    resolver: &Resolver<'_, '_>,
    declarations: &[StyleDeclaration],
    frame: &mut StyleObject,
) -> Result<(), StyleError> {
    for declaration in declarations {
        match declaration {
            StyleDeclaration::Static(entries) => {
                for (name, value) in entries {
                    frame.insert(name.clone(), value.clone());
                }
            }
            StyleDeclaration::Dynamic(dynamic) => {
                let segments = absolute(&[], &dynamic.path);
                let resolved = resolver.resolve_declaration(&dynamic.value)?;
                write(frame, &segments, resolved);
            }
        }
    }
    Ok(())
}

/// Variables declared by `rules`, later rules winning.
pub(crate) fn declared_variables<'rules>(rules: impl Iterator<Item = &'rules StyleRule>) -> FxHashMap<String, StyleDescriptor> {
    let mut variables = FxHashMap::default();
    for rule in rules {
        for (name, value) in &rule.variables {
            variables.insert(name.clone(), value.clone());
        }
    }
    variables
}

/// A deferred declaration waiting for the element's metrics.
struct Pending {
    segments: Vec<String>,
    value: StyleDescriptor,
    marker: String,
}

impl Pending {
    fn is_metric(&self) -> bool {
        matches!(self.segments.last().map(String::as_str), Some("fontSize" | "color"))
    }
}

/// Accumulates one render's props.
pub(crate) struct Cascade<'res, 'ctx, 'render> {
    resolver: &'res Resolver<'ctx, 'render>,
    props: StyleObject,
    pending: Vec<Pending>,
}

impl<'res, 'ctx, 'render> Cascade<'res, 'ctx, 'render> {
    pub(crate) fn new(resolver: &'res Resolver<'ctx, 'render>) -> Self {
        Self {
            resolver,
            props: StyleObject::new(),
            pending: Vec::new(),
        }
    }

    /// Apply every declaration of `rule` under `base` (its own target wins).
    pub(crate) fn apply_rule(&mut self, base: &[String], rule: &StyleRule) -> Result<(), StyleError> {
        let target: Vec<String>;
        let base = match &rule.target {
            Some(path) => {
                target = path.segments().into_iter().map(str::to_owned).collect();
                target.as_slice()
            }
            None => base,
        };
        for declaration in &rule.declarations {
            match declaration {
                StyleDeclaration::Static(entries) => {
                    for (name, value) in entries {
                        let mut path = base.to_vec();
                        path.push(name.clone());
                        assign(&mut self.props, &path, value.clone());
                    }
                }
                StyleDeclaration::Dynamic(dynamic) => {
                    let segments = absolute(base, &dynamic.path);
                    if dynamic.deferred {
                        let marker = format!("\u{0}deferred:{}", self.pending.len());
                        assign(&mut self.props, &segments, StyleDescriptor::String(marker.clone()));
                        self.pending.push(Pending {
                            segments,
                            value: dynamic.value.clone(),
                            marker,
                        });
                    } else {
                        let resolved = self.resolver.resolve_declaration(&dynamic.value)?;
                        write(&mut self.props, &segments, resolved);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply an inline style prop: an object or a list of objects.
    pub(crate) fn apply_inline(&mut self, base: &[String], style: &StyleDescriptor) -> Result<(), StyleError> {
        match style {
            StyleDescriptor::Object(entries) => {
                for (name, value) in entries {
                    let mut path = base.to_vec();
                    path.push(name.clone());
                    let resolved = self.resolver.resolve_declaration(value)?;
                    write(&mut self.props, &path, resolved);
                }
            }
            StyleDescriptor::Array(items) => {
                for item in items {
                    self.apply_inline(base, item)?;
                }
            }
            _ => trace!("Ignoring non-object inline style"),
        }
        Ok(())
    }

    fn commit(&mut self, pending: Vec<Pending>) -> Result<(), StyleError> {
        for entry in pending {
            let current = value_at(&self.props, &entry.segments);
            if current.and_then(StyleDescriptor::as_str) != Some(entry.marker.as_str()) {
                trace!("Deferred {} was overridden", entry.segments.join("."));
                continue;
            }
            let resolved = self.resolver.resolve_declaration(&entry.value)?;
            write(&mut self.props, &entry.segments, resolved);
        }
        Ok(())
    }

    /// Evaluate deferred declarations and return the props together with
    /// the element's metrics. `metrics_base` is where `fontSize` and
    /// `color` are read from.
    pub(crate) fn finish(mut self, metrics_base: &[String]) -> Result<(StyleObject, ElementMetrics), StyleError> {
        let (metric_entries, rest): (Vec<Pending>, Vec<Pending>) =
            mem::take(&mut self.pending).into_iter().partition(Pending::is_metric);
        self.commit(metric_entries)?;
        let read = |name: &str| {
            let mut path = metrics_base.to_vec();
            path.push(name.to_owned());
            value_at(&self.props, &path).cloned()
        };
        let metrics = ElementMetrics {
            font_size: read("fontSize").and_then(|size| size.as_number()),
            color: read("color").filter(|color| color.as_str().is_some()),
        };
        self.resolver.set_element(metrics.clone());
        self.commit(rest)?;
        Ok((self.props, metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(path: &str) -> Vec<String> {
        path.split('.').map(str::to_owned).collect()
    }

    #[test]
    fn assign_creates_and_removes() {
        let mut object = StyleObject::new();
        assign(&mut object, &segments("style.shadow.width"), 2.0.into());
        assert_eq!(value_at(&object, &segments("style.shadow.width")), Some(&2.0.into()));
        assign(&mut object, &segments("style.shadow.width"), StyleDescriptor::Undefined);
        assert_eq!(value_at(&object, &segments("style.shadow.width")), None);
        assign(&mut object, &segments("style.color"), "red".into());
        assign(&mut object, &segments("style.color.nested"), 1.0.into());
        assert_eq!(value_at(&object, &segments("style.color.nested")), Some(&1.0.into()));
    }

    #[test]
    fn expansions_land_next_to_the_declaration() {
        let mut object = StyleObject::new();
        let mut entries = StyleObject::new();
        entries.insert("borderWidth".into(), 1.0.into());
        entries.insert("borderColor".into(), "#ff0000".into());
        write(&mut object, &segments("style.border"), Resolved::Expand(entries));
        assert_eq!(value_at(&object, &segments("style.borderWidth")), Some(&1.0.into()));
        assert_eq!(value_at(&object, &segments("style.border")), None);
    }

    #[test]
    fn individual_transforms_replace_their_own_keys() {
        let rotate = |angle: &str| {
            let mut entry = StyleObject::new();
            entry.insert("rotate".into(), angle.into());
            StyleDescriptor::Object(entry)
        };
        let mut object = StyleObject::new();
        assign(
            &mut object,
            &segments("style.transform"),
            StyleDescriptor::Array(vec![rotate("10deg")]),
        );
        write(
            &mut object,
            &segments("style.rotate"),
            Resolved::MergeTransform {
                replaces: &["rotate"],
                entries: vec![rotate("45deg")],
            },
        );
        assert_eq!(
            value_at(&object, &segments("style.transform")),
            Some(&StyleDescriptor::Array(vec![rotate("45deg")]))
        );
    }

    #[test]
    fn anchored_paths_start_at_the_props_root() {
        let base = segments("style");
        assert_eq!(absolute(&base, &PropertyPath::anchored(&["numberOfLines"])), segments("numberOfLines"));
        assert_eq!(absolute(&base, &PropertyPath::from_dotted("width")), segments("style.width"));
    }
}
