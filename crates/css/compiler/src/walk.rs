//! Traversal of the parsed rule tree.
//! Spec: <https://www.w3.org/TR/css-nesting-1/#nesting>
//! Spec: <https://www.w3.org/TR/css-conditional-3/#processing>

use crate::builder::{Scope, StylesheetBuilder};
use crate::conditions::MediaPrelude;
use css_selectors::{SelectorList, nest_selector_list, normalize_selector_list, parse_selector_list};
use css_syntax::{CssRule, StyleRule, to_css};
use log::debug;

impl StylesheetBuilder<'_> {
    /// Compile `rules` under the selectors of an enclosing style rule (if
    /// any) and the conditions of the enclosing at-rules.
    pub(crate) fn walk(&mut self, rules: &[CssRule], parent: Option<&SelectorList>, scope: &Scope) {
        for rule in rules {
            match rule {
                CssRule::Style(style) => self.style_rule(style, parent, scope),
                CssRule::Media { query, rules: children } => match self.conditions.media_query_list(query) {
                    MediaPrelude::Inert => debug!("Skipping inert @media {}", to_css(query)),
                    MediaPrelude::Conditions(conditions) => {
                        let mut nested = scope.clone();
                        nested.media.extend(conditions);
                        self.walk(children, parent, &nested);
                    }
                },
                CssRule::Container { query, rules: children } => match self.conditions.container_query(query) {
                    Some(container) => {
                        let mut nested = scope.clone();
                        nested.container_queries.push(container);
                        self.walk(children, parent, &nested);
                    }
                    None => debug!("Skipping unsupported @container {}", to_css(query)),
                },
                CssRule::Keyframes { name, frames } => self.keyframes(name, frames),
                CssRule::Property { name, declarations } => self.property(name, declarations),
            }
        }
    }

    fn style_rule(&mut self, rule: &StyleRule, parent: Option<&SelectorList>, scope: &Scope) {
        let own = parse_selector_list(&rule.selectors);
        let selectors = match parent {
            Some(parent) => nest_selector_list(parent, &own),
            None => own,
        };
        let order = self.next_order();
        let normalized = normalize_selector_list(&selectors, self.prefix.as_ref());
        if normalized.is_empty() {
            debug!("No supported selector in `{}`", to_css(&rule.selectors));
        } else {
            let body = self.body(&rule.declarations, &rule.props);
            self.apply(&normalized, &body, scope, order);
        }
        self.walk(&rule.rules, Some(&selectors), scope);
    }
}
