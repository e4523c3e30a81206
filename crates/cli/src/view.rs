use luasense_api::{CompletionItem, IndexStats};
use tabled::Tabled;

/// A terminal view of one completion candidate.
#[derive(Tabled)]
pub struct CompletionView {
    pub kind: String,
    pub label: String,
    pub insert: String,
    pub replace: usize,
    pub description: String,
}

impl CompletionView {
    pub fn from_item(item: &CompletionItem) -> Self {
        Self {
            kind: item.kind.as_str().to_string(),
            label: item.label.clone(),
            insert: item.insert_text.clone(),
            replace: item.replace_len,
            description: if item.description.is_empty() {
                "-".to_string()
            } else {
                item.description.clone()
            },
        }
    }
}

#[derive(Tabled)]
pub struct StatRow {
    pub metric: &'static str,
    pub count: usize,
}

impl StatRow {
    pub fn from_stats(stats: &IndexStats) -> Vec<Self> {
        vec![
            Self { metric: "classes", count: stats.classes },
            Self { metric: "members", count: stats.members },
            Self { metric: "short names", count: stats.short_names },
            Self { metric: "archives", count: stats.archives },
        ]
    }
}
