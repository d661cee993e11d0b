//! The injection registry: compiled rules, keyframes and variables as
//! keyed signals.

use crate::environment::{Environment, EnvironmentOptions};
use crate::props::Capabilities;
use core::cell::RefCell;
use core::fmt;
use log::debug;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use style_ir::{AnimationFrames, RuleSetDocument, StyleRule, VariableValue};
use style_query::{Family, Revision, RevisionCounter, Signal, batch};

/// Rules of one class name, absent until injected.
pub(crate) type RuleList = Option<Rc<[StyleRule]>>;

/// Alternatives of one root or universal variable.
pub(crate) type Alternatives = Option<Rc<[VariableValue]>>;

pub(crate) type Frames = Option<Rc<AnimationFrames>>;

/// Class names that force a capability regardless of the rules they match.
pub const SENTINEL_CLASSES: [(&str, Capabilities); 4] = [
    (
        "will-change-variable",
        Capabilities {
            variables: true,
            containers: false,
            animated: false,
            pressable: false,
        },
    ),
    (
        "will-change-container",
        Capabilities {
            variables: false,
            containers: true,
            animated: false,
            pressable: false,
        },
    ),
    (
        "will-change-animation",
        Capabilities {
            variables: false,
            containers: false,
            animated: true,
            pressable: false,
        },
    ),
    (
        "will-change-pressable",
        Capabilities {
            variables: false,
            containers: false,
            animated: false,
            pressable: true,
        },
    ),
];

/// Injected content is immutable, so identity is equality.
fn same<T: ?Sized>(left: &Option<Rc<T>>, right: &Option<Rc<T>>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => Rc::ptr_eq(left, right),
        (None, None) => true,
        _ => false,
    }
}

fn family<T: ?Sized + 'static>() -> Family<String, Option<Rc<T>>> {
    Family::new(|_key: &String| Signal::with_equality(None, same))
}

/// Style collection shared by every component of an application.
///
/// Written only by [`StyleStore::inject`] and [`StyleStore::reset`], read by
/// every component render. All writes of one injection are batched so each
/// affected component is notified once.
pub struct StyleStore {
    options: EnvironmentOptions,
    environment: Environment,
    rules: Family<String, RuleList>,
    keyframes: Family<String, Frames>,
    root_variables: Family<String, Alternatives>,
    universal_variables: Family<String, Alternatives>,
    sentinels: RefCell<FxHashMap<String, Capabilities>>,
    revision: RevisionCounter,
}

impl fmt::Debug for StyleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f
            .debug_struct("StyleStore")
            .field("classes", &self.rules.len())
            .field("keyframes", &self.keyframes.len())
            .field("root_variables", &self.root_variables.len())
            .field("universal_variables", &self.universal_variables.len())
            .field("revision", &self.revision.current())
            .finish_non_exhaustive()
    }
}

impl StyleStore {
    pub fn new(options: EnvironmentOptions) -> Rc<Self> {
        let store = Self {
            environment: Environment::new(&options),
            options,
            rules: family(),
            keyframes: family(),
            root_variables: family(),
            universal_variables: family(),
            sentinels: RefCell::new(FxHashMap::default()),
            revision: RevisionCounter::new(),
        };
        store.register_sentinels();
        Rc::new(store)
    }

    #[inline]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Number of injections and resets so far.
    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision.current()
    }

    fn register_sentinels(&self) {
        let mut sentinels = self.sentinels.borrow_mut();
        for (name, capabilities) in SENTINEL_CLASSES {
            sentinels.insert(name.to_owned(), capabilities);
        }
    }

    /// Capabilities forced by a sentinel class name.
    pub fn sentinel(&self, class_name: &str) -> Option<Capabilities> {
        self.sentinels.borrow().get(class_name).copied()
    }

    /// Publish a compiled document.
    ///
    /// Each class name's rule list, each keyframe table and each variable
    /// is replaced as a whole; components observing them are notified once,
    /// after every write of the document has been applied.
    pub fn inject(&self, document: &RuleSetDocument) {
        batch(|| {
            for (class_name, rules) in &document.rules {
                self.rules.get(class_name).set(Some(Rc::from(rules.as_slice())));
            }
            for (name, frames) in &document.keyframes {
                self.keyframes.get(name).set(Some(Rc::new(frames.clone())));
            }
            for (name, alternatives) in &document.root_variables {
                self.root_variables
                    .get(name)
                    .set(Some(Rc::from(alternatives.as_slice())));
            }
            for (name, alternatives) in &document.universal_variables {
                self.universal_variables
                    .get(name)
                    .set(Some(Rc::from(alternatives.as_slice())));
            }
            self.register_sentinels();
        });
        let revision = self.revision.increment();
        debug!(
            "Injected {} classes, {} keyframes, {} root and {} universal variables (revision {})",
            document.rules.len(),
            document.keyframes.len(),
            document.root_variables.len(),
            document.universal_variables.len(),
            revision.get()
        );
    }

    /// Forget every injected document and restore the initial environment.
    pub fn reset(&self) {
        batch(|| {
            for key in self.rules.keys() {
                self.rules.get(&key).set(None);
            }
            for key in self.keyframes.keys() {
                self.keyframes.get(&key).set(None);
            }
            for key in self.root_variables.keys() {
                self.root_variables.get(&key).set(None);
            }
            for key in self.universal_variables.keys() {
                self.universal_variables.get(&key).set(None);
            }
            self.environment.reset(&self.options);
        });
        self.register_sentinels();
        self.revision.increment();
        debug!("Style store reset");
    }

    /// Drop cached signals nobody observes. Returns how many were removed.
    ///
    /// Evicting an injected entry forgets it, so this is meant for stores
    /// that re-inject on demand (development reloads).
    pub fn evict_unobserved(&self) -> usize {
        let evicted = self.rules.evict_unobserved()
            + self.keyframes.evict_unobserved()
            + self.root_variables.evict_unobserved()
            + self.universal_variables.evict_unobserved();
        if evicted > 0 {
            debug!("Evicted {evicted} unobserved style signal(s)");
        }
        evicted
    }

    pub(crate) fn rules(&self, class_name: &str) -> Signal<RuleList> {
        self.rules.get(&class_name.to_owned())
    }

    pub(crate) fn keyframes(&self, name: &str) -> Signal<Frames> {
        self.keyframes.get(&name.to_owned())
    }

    pub(crate) fn root_variable(&self, name: &str) -> Signal<Alternatives> {
        self.root_variables.get(&name.to_owned())
    }

    pub(crate) fn universal_variable(&self, name: &str) -> Signal<Alternatives> {
        self.universal_variables.get(&name.to_owned())
    }

    /// Whether rules were ever requested or injected for `class_name`.
    pub fn knows_class(&self, class_name: &str) -> bool {
        self.rules
            .existing(&class_name.to_owned())
            .is_some_and(|signal| signal.peek().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use style_ir::{Specificity, StyleDescriptor};
    use style_query::Effect;

    fn document(class_name: &str, order: u32) -> RuleSetDocument {
        RuleSetDocument {
            rules: vec![(
                class_name.to_owned(),
                vec![StyleRule {
                    specificity: Specificity {
                        order,
                        class_name: 1,
                        ..Specificity::ZERO
                    },
                    ..StyleRule::default()
                }],
            )],
            root_variables: vec![(
                "gap".to_owned(),
                vec![VariableValue::unconditioned(StyleDescriptor::Number(4.0))],
            )],
            ..RuleSetDocument::default()
        }
    }

    #[test]
    fn inject_replaces_whole_lists() {
        let store = StyleStore::new(EnvironmentOptions::default());
        store.inject(&document("a", 1));
        let first = store.rules("a").peek();
        store.inject(&document("a", 2));
        let second = store.rules("a").peek();
        assert!(!same(&first, &second));
        assert_eq!(second.map(|rules| rules[0].specificity.order), Some(2));
        assert_eq!(store.revision().get(), 2);
    }

    #[test]
    fn sentinels_are_registered() {
        let store = StyleStore::new(EnvironmentOptions::default());
        assert_eq!(store.sentinel("will-change-pressable").map(|caps| caps.pressable), Some(true));
        store.reset();
        assert!(store.sentinel("will-change-variable").is_some());
        assert!(store.sentinel("plain").is_none());
    }

    #[test]
    fn reset_clears_and_eviction_keeps_observed() {
        let store = StyleStore::new(EnvironmentOptions::default());
        store.inject(&document("a", 1));
        let effect = Effect::new(|| {});
        store.rules("a").get(Some(&effect));
        store.reset();
        assert!(!store.knows_class("a"));
        assert_eq!(store.evict_unobserved(), 1);
        assert!(store.rules.contains(&"a".to_owned()));
    }
}
