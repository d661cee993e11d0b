//! `animation` and `animation-name`.
//! Spec: <https://www.w3.org/TR/css-animations-1/#animation>
//! Spec: <https://www.w3.org/TR/css-animations-1/#keyframes>

use super::shorthands::tokens;
use super::{Resolved, Resolver};
use crate::cascade::write_declarations;
use crate::error::StyleError;
use log::debug;
use style_ir::{AnimationFrames, StyleDescriptor, StyleFunction, StyleObject, format_number, round};

const DIRECTIONS: [&str; 4] = ["normal", "reverse", "alternate", "alternate-reverse"];
const FILL_MODES: [&str; 4] = ["none", "forwards", "backwards", "both"];
const PLAY_STATES: [&str; 2] = ["running", "paused"];
const EASINGS: [&str; 7] = ["ease", "ease-in", "ease-out", "ease-in-out", "linear", "step-start", "step-end"];

/// Native longhand names, in output order.
const LONGHANDS: [&str; 8] = [
    "animationName",
    "animationDuration",
    "animationDelay",
    "animationIterationCount",
    "animationTimingFunction",
    "animationDirection",
    "animationFillMode",
    "animationPlayState",
];

/// `"1s"` / `"250ms"` in milliseconds.
fn milliseconds(text: &str) -> Option<f64> {
    if let Some(value) = text.strip_suffix("ms") {
        return value.parse::<f64>().ok().map(round);
    }
    text.strip_suffix('s')
        .and_then(|value| value.parse::<f64>().ok())
        .map(|seconds| round(seconds * 1000.0))
}

fn is_easing(text: &str) -> bool {
    EASINGS.contains(&text) || text.starts_with("cubic-bezier(") || text.starts_with("steps(")
}

/// Longhands of one comma separated animation.
#[derive(Default)]
struct Animation {
    name: Option<StyleDescriptor>,
    duration: Option<f64>,
    delay: Option<f64>,
    iteration_count: Option<StyleDescriptor>,
    timing_function: Option<String>,
    direction: Option<String>,
    fill_mode: Option<String>,
    play_state: Option<String>,
}

impl Animation {
    /// Assign each token to the first longhand that accepts it; names
    /// only take what no keyword claims.
    fn parse(tokens: Vec<StyleDescriptor>) -> Self {
        let mut animation = Self::default();
        for token in tokens {
            let text = match token {
                StyleDescriptor::Number(count) if animation.iteration_count.is_none() => {
                    animation.iteration_count = Some(count.into());
                    continue;
                }
                StyleDescriptor::String(text) => text,
                other => {
                    debug!("Ignoring animation token {other:?}");
                    continue;
                }
            };
            let lowered = text.to_ascii_lowercase();
            let keyword = lowered.as_str();
            if let Some(time) = milliseconds(keyword) {
                if animation.duration.is_none() {
                    animation.duration = Some(time);
                } else if animation.delay.is_none() {
                    animation.delay = Some(time);
                }
            } else if keyword == "infinite" && animation.iteration_count.is_none() {
                animation.iteration_count = Some(keyword.into());
            } else if is_easing(keyword) && animation.timing_function.is_none() {
                animation.timing_function = Some(lowered);
            } else if DIRECTIONS.contains(&keyword) && animation.direction.is_none() {
                animation.direction = Some(lowered);
            } else if FILL_MODES.contains(&keyword) && animation.fill_mode.is_none() {
                animation.fill_mode = Some(lowered);
            } else if PLAY_STATES.contains(&keyword) && animation.play_state.is_none() {
                animation.play_state = Some(lowered);
            } else if animation.name.is_none() {
                animation.name = Some(text.into());
            } else {
                debug!("Ignoring animation token {text}");
            }
        }
        animation
    }
}

impl Resolver<'_, '_> {
    /// `@animation([tokens]...)`, expanded into the longhand lists.
    pub(super) fn animation(&self, function: &StyleFunction) -> Result<Resolved, StyleError> {
        let mut lists: [Vec<StyleDescriptor>; 8] = Default::default();
        for group in &function.args {
            let StyleDescriptor::Array(group) = self.resolve(group)? else {
                return Err(StyleError::invalid("@animation", "expected one list per animation"));
            };
            let animation = Animation::parse(tokens(group));
            let name = match animation.name {
                Some(name) => self.keyframes(&name)?,
                None => StyleDescriptor::string("none"),
            };
            if name.is_undefined() {
                continue;
            }
            let values = [
                name,
                animation.duration.unwrap_or(0.0).into(),
                animation.delay.unwrap_or(0.0).into(),
                animation.iteration_count.unwrap_or(StyleDescriptor::Number(1.0)),
                animation.timing_function.unwrap_or_else(|| "ease".to_owned()).into(),
                animation.direction.unwrap_or_else(|| "normal".to_owned()).into(),
                animation.fill_mode.unwrap_or_else(|| "none".to_owned()).into(),
                animation.play_state.unwrap_or_else(|| "running".to_owned()).into(),
            ];
            for (list, value) in lists.iter_mut().zip(values) {
                list.push(value);
            }
        }
        let mut out = StyleObject::new();
        for (name, list) in LONGHANDS.into_iter().zip(lists) {
            out.insert(name.to_owned(), StyleDescriptor::Array(list));
        }
        Ok(Resolved::Expand(out))
    }

    /// `@animationName(names...)`.
    pub(super) fn animation_name(&self, function: &StyleFunction) -> Result<Resolved, StyleError> {
        let mut names = Vec::with_capacity(function.args.len());
        for name in &function.args {
            let resolved = self.resolve(name)?;
            let frames = self.keyframes(&resolved)?;
            if !frames.is_undefined() {
                names.push(frames);
            }
        }
        Ok(Resolved::Value(StyleDescriptor::Array(names)))
    }

    /// The keyframes registered under `name` as `{ "50%": { ... } }`.
    fn keyframes(&self, name: &StyleDescriptor) -> Result<StyleDescriptor, StyleError> {
        let Some(name) = name.as_str() else {
            return Ok(StyleDescriptor::Undefined);
        };
        if name == "none" {
            return Ok(StyleDescriptor::string("none"));
        }
        let Some(frames) = self.context.read(&self.context.store.keyframes(name)) else {
            debug!("Unknown keyframes {name}");
            return Ok(StyleDescriptor::Undefined);
        };
        self.frames(&frames)
    }

    fn frames(&self, frames: &AnimationFrames) -> Result<StyleDescriptor, StyleError> {
        let mut out = StyleObject::new();
        for frame in &frames.frames {
            let mut style = StyleObject::new();
            write_declarations(self, &frame.1, &mut style)?;
            if let Some((_, easing)) = frames.easing.iter().find(|(progress, _)| *progress == frame.0) {
                style.insert("animationTimingFunction".to_owned(), self.resolve(easing)?);
            }
            out.insert(format!("{}%", format_number(round(frame.0 * 100.0))), StyleDescriptor::Object(style));
        }
        Ok(StyleDescriptor::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_are_milliseconds() {
        assert_eq!(milliseconds("1.5s"), Some(1500.0));
        assert_eq!(milliseconds("200ms"), Some(200.0));
        assert_eq!(milliseconds("ease"), None);
    }

    #[test]
    fn tokens_fill_longhands_in_order() {
        let animation = Animation::parse(vec![
            "spin".into(),
            "1s".into(),
            "linear".into(),
            "infinite".into(),
            "200ms".into(),
            "none".into(),
        ]);
        assert_eq!(animation.name, Some("spin".into()));
        assert_eq!(animation.duration, Some(1000.0));
        assert_eq!(animation.delay, Some(200.0));
        assert_eq!(animation.iteration_count, Some("infinite".into()));
        assert_eq!(animation.timing_function.as_deref(), Some("linear"));
        assert_eq!(animation.fill_mode.as_deref(), Some("none"));
    }
}
