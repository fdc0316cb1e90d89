//! Effective-item resolution.
//!
//! When the same logical entity is defined at several scopes, only the most
//! specific definition is shown and used. Overrides replace the inherited
//! definition wholesale; fields are never merged across scopes.

use std::collections::HashMap;

use crate::error::{GatewayError, GatewayResult};
use crate::models::scope::ScopedItem;

/// Reduces `items` to one item per name: the one with the most specific
/// scope.
///
/// Among items of equal scope priority the first one in input order is
/// kept. The result lists names in order of first appearance. Items with a
/// blank name are rejected instead of being grouped together.
pub fn effective_items<T: ScopedItem>(items: Vec<T>) -> GatewayResult<Vec<T>> {
    let mut slots: Vec<T> = Vec::with_capacity(items.len());
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for item in items {
        if item.name().trim().is_empty() {
            return Err(GatewayError::Validation {
                message: format!(
                    "scoped item at {} has no name and cannot be resolved",
                    item.scope_info()
                ),
            });
        }

        match by_name.get(item.name()) {
            Some(&slot) => {
                let best = slots[slot].scope_info().scope_type;
                if item.scope_info().scope_type.is_more_specific_than(best) {
                    slots[slot] = item;
                }
            }
            None => {
                by_name.insert(item.name().to_owned(), slots.len());
                slots.push(item);
            }
        }
    }

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scope::{ScopeInfo, ScopeType};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: String,
        scope: ScopeInfo,
        tag: &'static str,
    }

    impl ScopedItem for Item {
        fn name(&self) -> &str {
            &self.name
        }

        fn scope_info(&self) -> &ScopeInfo {
            &self.scope
        }
    }

    fn item(name: &str, scope: ScopeInfo, tag: &'static str) -> Item {
        Item {
            name: name.into(),
            scope,
            tag,
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let resolved = effective_items(Vec::<Item>::new()).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn division_override_wins_over_organization() {
        let items = vec![
            item("openai", ScopeInfo::organization("org1"), "org"),
            item("openai", ScopeInfo::division("div1"), "div"),
            item("anthropic", ScopeInfo::organization("org1"), "org"),
        ];

        let resolved = effective_items(items).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "openai");
        assert_eq!(resolved[0].tag, "div");
        assert_eq!(resolved[1].name, "anthropic");
        assert_eq!(resolved[1].tag, "org");
    }

    #[test]
    fn narrower_scope_wins_for_every_pair() {
        for a in ScopeType::ALL {
            for b in ScopeType::ALL {
                if a.priority() >= b.priority() {
                    continue;
                }
                for order in [[a, b], [b, a]] {
                    let items = order
                        .iter()
                        .map(|t| item("same", ScopeInfo::new(*t, "x"), t.as_str()))
                        .collect();
                    let resolved = effective_items(items).unwrap();
                    assert_eq!(resolved.len(), 1);
                    assert_eq!(resolved[0].scope.scope_type, a, "{a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn ties_keep_first_in_input_order() {
        let items = vec![
            item("openai", ScopeInfo::division("div1"), "first"),
            item("openai", ScopeInfo::division("div2"), "second"),
        ];

        let resolved = effective_items(items).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].tag, "first");
    }

    #[test]
    fn resolution_is_idempotent() {
        let items = vec![
            item("a", ScopeInfo::organization("org1"), "a-org"),
            item("b", ScopeInfo::division("div1"), "b-div"),
            item("a", ScopeInfo::division("div1"), "a-div"),
            item("b", ScopeInfo::new(ScopeType::Global, "g"), "b-global"),
        ];

        let once = effective_items(items).unwrap();
        let twice = effective_items(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn single_scope_input_is_identity() {
        let items = vec![
            item("a", ScopeInfo::organization("org1"), "a"),
            item("b", ScopeInfo::organization("org1"), "b"),
        ];

        assert_eq!(effective_items(items.clone()).unwrap(), items);
    }

    #[test]
    fn unnamed_items_are_rejected() {
        let items = vec![
            item("", ScopeInfo::organization("org1"), "a"),
            item("  ", ScopeInfo::division("div1"), "b"),
        ];

        let err = effective_items(items).unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }
}
