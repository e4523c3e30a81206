use dashmap::DashMap;
use luasense_api::naming::{self, NESTED_MARKER};
use luasense_api::{CompletionEntry, CompletionKind};

/// Labels for member candidates: methods as `name(params)` with parameter
/// types shortened unless full types were requested.
#[derive(Debug, Default)]
pub struct MemberRenderer {
    full_types: bool,
    // binary type name → unqualified form
    simple_names: DashMap<String, String>,
}

impl MemberRenderer {
    pub fn new(full_types: bool) -> Self {
        Self {
            full_types,
            simple_names: DashMap::new(),
        }
    }

    pub fn label(&self, entry: &CompletionEntry) -> String {
        if entry.kind() != CompletionKind::Method {
            return entry.name().to_string();
        }
        let parameters = entry.signature().unwrap_or_default();
        if self.full_types {
            format!("{}({})", entry.name(), parameters)
        } else {
            format!("{}({})", entry.name(), self.simplify_parameters(parameters))
        }
    }

    /// `java.lang.String, int` → `String, int`
    pub fn simplify_parameters(&self, parameters: &str) -> String {
        if parameters.trim().is_empty() {
            return String::new();
        }
        parameters
            .split(',')
            .map(|parameter| {
                parameter
                    .trim()
                    .split(' ')
                    .map(|part| {
                        if part.contains('.') || part.contains(NESTED_MARKER) {
                            self.simplify_type(part)
                        } else {
                            part.to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn simplify_type(&self, type_name: &str) -> String {
        if let Some(cached) = self.simple_names.get(type_name) {
            return cached.clone();
        }
        let simple = naming::unqualified(type_name).to_string();
        self.simple_names
            .insert(type_name.to_string(), simple.clone());
        simple
    }

    pub fn cached_types(&self) -> usize {
        self.simple_names.len()
    }
}
