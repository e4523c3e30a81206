use super::kind::CompletionKind;
use super::naming;
use serde::{Deserialize, Serialize};

/// Return type recorded for methods that return nothing.
pub const VOID: &str = "void";

/// One member of an indexed class.
///
/// `type_name` is the declared type of a field or property, or the return
/// type of a method, as a binary class name (`java.lang.String`) or a
/// primitive (`int`, `void`). `signature` holds the raw parameter type list
/// and is only ever present on `Method` entries: every constructor and the
/// deserializer drop it for other kinds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "EntryRepr")]
pub struct CompletionEntry {
    name: String,
    kind: CompletionKind,
    type_name: String,
    description: String,
    signature: Option<String>,
}

impl CompletionEntry {
    pub fn new(
        name: impl Into<String>,
        kind: CompletionKind,
        type_name: impl Into<String>,
        description: impl Into<String>,
        signature: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: type_name.into(),
            description: description.into(),
            signature: if kind == CompletionKind::Method {
                signature
            } else {
                None
            },
        }
    }

    /// A method returning `return_type`, with `parameters` as a
    /// comma-separated list of parameter types (possibly empty).
    pub fn method(
        name: impl Into<String>,
        return_type: impl Into<String>,
        parameters: impl Into<String>,
    ) -> Self {
        let return_type = return_type.into();
        let description = naming::unqualified(&return_type).to_string();
        Self::new(
            name,
            CompletionKind::Method,
            return_type,
            description,
            Some(parameters.into()),
        )
    }

    pub fn field(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let description = naming::unqualified(&type_name).to_string();
        Self::new(name, CompletionKind::Field, type_name, description, None)
    }

    /// A field exposed through a getter or setter.
    pub fn property(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let description = naming::unqualified(&type_name).to_string();
        Self::new(name, CompletionKind::Property, type_name, description, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CompletionKind {
        self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn is_void(&self) -> bool {
        self.type_name == VOID
    }
}

#[derive(Deserialize)]
struct EntryRepr {
    name: String,
    kind: CompletionKind,
    type_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    signature: Option<String>,
}

impl From<EntryRepr> for CompletionEntry {
    fn from(repr: EntryRepr) -> Self {
        CompletionEntry::new(
            repr.name,
            repr.kind,
            repr.type_name,
            repr.description,
            repr.signature,
        )
    }
}
