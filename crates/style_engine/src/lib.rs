//! Runtime resolution of compiled style rule sets.
//!
//! A [`StyleStore`] holds injected [`style_ir::RuleSetDocument`]s and the
//! environment (window size, color scheme, font scale, ...). Each
//! [`ComponentInstance`] turns its props into resolved style props:
//!
//! ```text
//! props ─┬─ class names ──► store rules ──► condition tests ──► cascade ──► RenderOutput
//!        └─ inline style ─────────────────────────────────────────┘
//!                        ▲ inherited variables and containers from ancestors
//! ```
//!
//! Store and environment reads go through `style_query` signals, so a
//! component is told (once per batch) when anything it used changes, and a
//! render with unchanged inputs returns the previous output.
//!
//! # Example
//!
//! ```ignore
//! let store = StyleStore::new(EnvironmentOptions::default());
//! store.inject(&document);
//! let button = ComponentInstance::new(Rc::clone(&store), vec![StyleConfig::default()], || {});
//! let output = button.render(&Props::new().with("className", "btn"), &InheritedContext::new())?;
//! let child = output.child_context();
//! ```

#![forbid(unsafe_code)]

mod cascade;
mod component;
mod conditions;
mod context;
mod environment;
mod error;
mod props;
mod resolver;
mod store;

pub use component::ComponentInstance;
pub use context::RenderStats;
pub use environment::{ColorScheme, Environment, EnvironmentOptions};
pub use error::StyleError;
pub use props::{
    Capabilities, ContainerMap, ContainerState, InheritedContext, Props, RenderOutput, StyleConfig, VariableMap,
};
pub use store::{SENTINEL_CLASSES, StyleStore};
