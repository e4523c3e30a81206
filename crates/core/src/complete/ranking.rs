use luasense_api::{CompletionItem, CompletionKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Final ordering applied to a completion list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingStrategy {
    /// Identifiers, then keywords, then everything else; each group by
    /// label, case-insensitively, ties kept in discovery order.
    #[default]
    Grouped,
    /// Description descending, then label ascending.
    Legacy,
}

fn group(kind: CompletionKind) -> u8 {
    match kind {
        CompletionKind::Identifier => 0,
        CompletionKind::Keyword => 1,
        _ => 2,
    }
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

impl RankingStrategy {
    pub fn sort(&self, items: &mut [CompletionItem]) {
        match self {
            RankingStrategy::Grouped => items.sort_by(|a, b| {
                group(a.kind)
                    .cmp(&group(b.kind))
                    .then_with(|| compare_labels(&a.label, &b.label))
            }),
            RankingStrategy::Legacy => items.sort_by(|a, b| {
                b.description
                    .cmp(&a.description)
                    .then_with(|| a.label.cmp(&b.label))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str, kind: CompletionKind, description: &str) -> CompletionItem {
        CompletionItem::new(label, kind, 0).with_description(description)
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_grouped() {
        let mut items = vec![
            item("for", CompletionKind::Keyword, ""),
            item("Widget", CompletionKind::Class, "a.Widget"),
            item("food", CompletionKind::Identifier, ""),
            item("apply", CompletionKind::Method, ""),
            item("Foo", CompletionKind::Identifier, ""),
            item("Widget", CompletionKind::Class, "b.Widget"),
        ];
        RankingStrategy::Grouped.sort(&mut items);

        assert_eq!(labels(&items), vec!["Foo", "food", "for", "apply", "Widget", "Widget"]);
        // equal labels stay in discovery order
        assert_eq!(items[5].description, "b.Widget");
    }

    #[test]
    fn test_legacy() {
        let mut items = vec![
            item("b", CompletionKind::Method, "String"),
            item("a", CompletionKind::Method, "String"),
            item("c", CompletionKind::Keyword, "Keyword"),
            item("d", CompletionKind::Identifier, "Identifier"),
        ];
        RankingStrategy::Legacy.sort(&mut items);
        assert_eq!(labels(&items), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_serde_names() {
        let strategy: RankingStrategy = serde_json::from_str("\"legacy\"").unwrap();
        assert_eq!(strategy, RankingStrategy::Legacy);
        assert_eq!(serde_json::to_string(&RankingStrategy::Grouped).unwrap(), "\"grouped\"");
    }
}
