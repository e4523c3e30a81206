//! Public members of a single class file.
//!
//! Methods are recorded with their return type and comma-separated
//! parameter types. A public field that has a getter (`getX()`, or `isX()`
//! for booleans) becomes a property typed by the getter's return; failing
//! that, a matching `setX(T)` makes it a property typed by the setter's
//! return.

use super::converter::JavaTypeConverter;
use luasense_api::CompletionEntry;
use luasense_plugin::{BoxError, ClassMembers};
use ristretto_classfile::{ClassFile, FieldAccessFlags, MethodAccessFlags};
use std::io::Cursor;

struct MethodShape {
    name: String,
    parameters: Vec<String>,
    return_type: String,
}

pub fn reflect_class(class_name: &str, bytes: Vec<u8>) -> Result<ClassMembers, BoxError> {
    let class = ClassFile::from_bytes(&mut Cursor::new(bytes))
        .map_err(|e| format!("Failed to parse class {class_name}: {e:?}"))?;
    let pool = &class.constant_pool;
    let mut members = ClassMembers::new(class_name);

    let mut methods = Vec::new();
    for method in &class.methods {
        if !method.access_flags.contains(MethodAccessFlags::PUBLIC) {
            continue;
        }
        let name = pool
            .try_get_utf8(method.name_index)
            .map_err(|e| format!("Failed to parse method name: {e:?}"))?;
        // constructors, static initializers and compiler-generated bridges
        if name.starts_with('<') || name.contains('$') {
            continue;
        }
        let descriptor = pool
            .try_get_utf8(method.descriptor_index)
            .map_err(|e| format!("Failed to parse method descriptor: {e:?}"))?;
        let (parameters, return_type) = JavaTypeConverter::convert_method(descriptor)
            .map_err(|e| format!("Failed to parse method signature {descriptor}: {e:?}"))?;

        members.insert(CompletionEntry::method(
            name,
            return_type.clone(),
            parameters.join(", "),
        ));
        methods.push(MethodShape {
            name: name.to_string(),
            parameters,
            return_type,
        });
    }

    let mut fields = Vec::new();
    for field in &class.fields {
        if !field.access_flags.contains(FieldAccessFlags::PUBLIC) {
            continue;
        }
        let name = pool
            .try_get_utf8(field.name_index)
            .map_err(|e| format!("Failed to parse field name: {e:?}"))?;
        if name.contains('$') {
            continue;
        }
        let type_name = JavaTypeConverter::convert_type(&field.field_type);
        members.insert(CompletionEntry::field(name, type_name.clone()));
        fields.push((name.to_string(), type_name));
    }

    for (name, type_name) in &fields {
        if let Some(type_name) = property_type(&methods, name, type_name) {
            members.insert(CompletionEntry::property(name.as_str(), type_name));
        }
    }

    Ok(members)
}

fn property_type(methods: &[MethodShape], field: &str, field_type: &str) -> Option<String> {
    let capitalized = capitalize(field);
    let find = |name: String, parameters: &[&str]| {
        methods.iter().find(|m| {
            m.name == name
                && m.parameters.len() == parameters.len()
                && m.parameters.iter().zip(parameters).all(|(a, b)| a.as_str() == *b)
        })
    };

    let getter = find(format!("get{capitalized}"), &[]).or_else(|| {
        (field_type == "boolean")
            .then(|| find(format!("is{capitalized}"), &[]))
            .flatten()
    });
    getter
        .or_else(|| find(format!("set{capitalized}"), &[field_type]))
        .map(|m| m.return_type.clone())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(name: &str, parameters: &[&str], return_type: &str) -> MethodShape {
        MethodShape {
            name: name.to_string(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            return_type: return_type.to_string(),
        }
    }

    #[test]
    fn test_property_type_prefers_getter() {
        let methods = vec![
            shape("getText", &[], "java.lang.CharSequence"),
            shape("setText", &["java.lang.String"], "void"),
            shape("isEnabled", &[], "boolean"),
            shape("setWidth", &["int"], "void"),
        ];
        assert_eq!(
            property_type(&methods, "text", "java.lang.String").as_deref(),
            Some("java.lang.CharSequence")
        );
        assert_eq!(
            property_type(&methods, "enabled", "boolean").as_deref(),
            Some("boolean")
        );
        assert_eq!(property_type(&methods, "width", "int").as_deref(), Some("void"));
        assert_eq!(property_type(&methods, "width", "long"), None);
        assert_eq!(property_type(&methods, "enabled", "int"), None);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("text"), "Text");
        assert_eq!(capitalize(""), "");
    }
}
