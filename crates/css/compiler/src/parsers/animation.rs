//! Animations and transitions.
//! Spec: <https://www.w3.org/TR/css-animations-1/>
//! Spec: <https://www.w3.org/TR/css-transitions-1/>
//!
//! `animation` and `animation-name` always resolve at runtime, where the
//! named keyframes are looked up and evaluated. Their arguments keep the
//! source tokens (`"1s"`, `"ease-in"`, `2`) so the runtime can tell
//! durations from iteration counts.

use super::values::{camel_case, contains_var, significant, single};
use super::{Converter, Declarations, one};
use crate::warnings::WarningKind;
use css_syntax::{ComponentValue, split_commas};
use style_ir::StyleDescriptor;

const DIRECTIONS: &[&str] = &["normal", "reverse", "alternate", "alternate-reverse"];
const FILL_MODES: &[&str] = &["none", "forwards", "backwards", "both"];
const PLAY_STATES: &[&str] = &["running", "paused"];

/// A source token kept as written, variables excepted.
fn raw_token(converter: &mut Converter<'_>, value: &ComponentValue) -> Option<StyleDescriptor> {
    match value {
        ComponentValue::Number(number) => Some(StyleDescriptor::Number(*number)),
        ComponentValue::Ident(text) | ComponentValue::String(text) => Some(StyleDescriptor::string(text.as_str())),
        ComponentValue::Dimension { .. } => Some(StyleDescriptor::String(value.to_string())),
        ComponentValue::Function { name, args } if name == "var" => converter.function(name, args),
        ComponentValue::Function { name, args } if !contains_var(args) => {
            Some(StyleDescriptor::String(value.to_string()))
        }
        ComponentValue::Function { name, .. } => {
            converter.warn(WarningKind::Function, name.as_str());
            None
        }
        _ => {
            converter.warn_token(value);
            None
        }
    }
}

/// Comma separated lists: a scalar for one item, an array otherwise.
fn list(
    converter: &mut Converter<'_>,
    values: &[ComponentValue],
    always_array: bool,
    parse: fn(&mut Converter<'_>, &[ComponentValue]) -> Option<StyleDescriptor>,
) -> Option<StyleDescriptor> {
    let mut items = split_commas(values)
        .into_iter()
        .map(|item| parse(converter, item))
        .collect::<Option<Vec<_>>>()?;
    if items.len() == 1 && !always_array {
        return items.pop();
    }
    Some(StyleDescriptor::Array(items))
}

fn time(converter: &mut Converter<'_>, values: &[ComponentValue]) -> Option<StyleDescriptor> {
    let value = one(converter, values)?;
    converter.time(value)
}

/// `<easing-function>` kept as written.
fn easing(converter: &mut Converter<'_>, values: &[ComponentValue]) -> Option<StyleDescriptor> {
    let value = one(converter, values)?;
    raw_token(converter, value)
}

fn iteration_count(converter: &mut Converter<'_>, values: &[ComponentValue]) -> Option<StyleDescriptor> {
    let value = one(converter, values)?;
    if value.is_ident("infinite") {
        return Some(StyleDescriptor::string("infinite"));
    }
    converter.number(value)
}

fn transition_property(converter: &mut Converter<'_>, values: &[ComponentValue]) -> Option<StyleDescriptor> {
    match one(converter, values)? {
        ComponentValue::Ident(name) => Some(StyleDescriptor::String(camel_case(&name.to_ascii_lowercase()))),
        other => {
            converter.warn_token(other);
            None
        }
    }
}

fn keyword_list(converter: &mut Converter<'_>, values: &[ComponentValue], allowed: &[&str]) -> Option<StyleDescriptor> {
    let mut items = Vec::new();
    for item in split_commas(values) {
        let value = one(converter, item)?;
        items.push(converter.keyword(value, allowed)?);
    }
    if items.len() == 1 {
        return items.pop();
    }
    Some(StyleDescriptor::Array(items))
}

/// `animation`: one argument group per comma-separated animation.
fn animation(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    let mut groups = Vec::new();
    for group in split_commas(values) {
        let tokens = significant(group)
            .into_iter()
            .map(|value| raw_token(converter, value))
            .collect::<Option<Vec<_>>>();
        let Some(tokens) = tokens else {
            return;
        };
        groups.push(StyleDescriptor::Array(tokens));
    }
    out.set("animation", StyleDescriptor::function("@animation", groups));
}

fn animation_name(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    let mut names = Vec::new();
    for item in split_commas(values) {
        let Some(value) = one(converter, item) else {
            return;
        };
        let Some(name) = raw_token(converter, value) else {
            return;
        };
        names.push(name);
    }
    out.set("animationName", StyleDescriptor::function("@animationName", names));
}

/// `transition`: `<property> || <duration> || <easing> || <delay>` per item.
/// Spec: <https://www.w3.org/TR/css-transitions-1/#transition-shorthand-property>
fn transition(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    if single(values).is_some_and(|value| value.is_ident("none")) {
        out.set("transitionProperty", StyleDescriptor::Array(Vec::new()));
        return;
    }
    let mut properties = Vec::new();
    let mut durations = Vec::new();
    let mut delays = Vec::new();
    let mut easings = Vec::new();
    for group in split_commas(values) {
        let mut property = None;
        let mut duration = None;
        let mut delay = None;
        let mut timing = None;
        for value in significant(group) {
            let is_time = matches!(value, ComponentValue::Dimension { unit, .. } if unit == "s" || unit == "ms");
            if is_time && duration.is_none() {
                duration = converter.time(value);
            } else if is_time && delay.is_none() {
                delay = converter.time(value);
            } else if let ComponentValue::Ident(name) = value
                && property.is_none()
                && !is_easing_keyword(name)
            {
                property = Some(StyleDescriptor::String(camel_case(&name.to_ascii_lowercase())));
            } else if timing.is_none() {
                timing = raw_token(converter, value);
                if timing.is_none() {
                    return;
                }
            } else {
                converter.warn_value(values);
                return;
            }
        }
        properties.push(property.unwrap_or_else(|| StyleDescriptor::string("all")));
        durations.push(duration.unwrap_or(StyleDescriptor::Number(0.0)));
        delays.push(delay.unwrap_or(StyleDescriptor::Number(0.0)));
        easings.push(timing.unwrap_or_else(|| StyleDescriptor::string("ease")));
    }
    out.set("transitionProperty", StyleDescriptor::Array(properties));
    out.set("transitionDuration", StyleDescriptor::Array(durations));
    out.set("transitionDelay", StyleDescriptor::Array(delays));
    out.set("transitionTimingFunction", StyleDescriptor::Array(easings));
}

fn is_easing_keyword(name: &str) -> bool {
    ["ease", "ease-in", "ease-out", "ease-in-out", "linear", "step-start", "step-end"]
        .iter()
        .any(|keyword| name.eq_ignore_ascii_case(keyword))
}

pub(super) fn parse(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) -> bool {
    let value = match name {
        "animation" => {
            animation(converter, values, out);
            return true;
        }
        "animation-name" => {
            animation_name(converter, values, out);
            return true;
        }
        "transition" => {
            transition(converter, values, out);
            return true;
        }
        "animation-duration" | "animation-delay" => list(converter, values, false, time),
        "transition-duration" | "transition-delay" => list(converter, values, true, time),
        "animation-timing-function" => list(converter, values, false, easing),
        "transition-timing-function" => list(converter, values, true, easing),
        "animation-iteration-count" => list(converter, values, false, iteration_count),
        "transition-property" => list(converter, values, true, transition_property),
        "animation-direction" => keyword_list(converter, values, DIRECTIONS),
        "animation-fill-mode" => keyword_list(converter, values, FILL_MODES),
        "animation-play-state" => keyword_list(converter, values, PLAY_STATES),
        _ => return false,
    };
    out.set_some(&camel_case(name), value);
    true
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use style_ir::StyleDescriptor;

    #[test]
    fn animation_keeps_source_tokens() {
        assert_eq!(
            entries("animation", "spin 1s linear infinite, fade 200ms"),
            vec![entry(
                "animation",
                StyleDescriptor::function(
                    "@animation",
                    vec![
                        StyleDescriptor::Array(vec!["spin".into(), "1s".into(), "linear".into(), "infinite".into()]),
                        StyleDescriptor::Array(vec!["fade".into(), "200ms".into()]),
                    ]
                )
            )]
        );
    }

    #[test]
    fn transition_lists() {
        assert_eq!(
            entries("transition", "opacity 0.3s ease-in, background-color 1s"),
            vec![
                entry(
                    "transitionProperty",
                    StyleDescriptor::Array(vec!["opacity".into(), "backgroundColor".into()])
                ),
                entry("transitionDuration", StyleDescriptor::Array(vec![300.0.into(), 1000.0.into()])),
                entry("transitionDelay", StyleDescriptor::Array(vec![0.0.into(), 0.0.into()])),
                entry(
                    "transitionTimingFunction",
                    StyleDescriptor::Array(vec!["ease-in".into(), "ease".into()])
                ),
            ]
        );
    }

    #[test]
    fn longhands() {
        assert_eq!(entries("animation-duration", "2s"), vec![entry("animationDuration", 2000.0)]);
        assert_eq!(
            entries("animation-iteration-count", "infinite"),
            vec![entry("animationIterationCount", "infinite")]
        );
        assert_eq!(
            entries("animation-name", "bounce"),
            vec![entry(
                "animationName",
                StyleDescriptor::function("@animationName", vec!["bounce".into()])
            )]
        );
    }
}
