use ristretto_classfile::{BaseType, FieldType};

pub struct JavaTypeConverter;

impl JavaTypeConverter {
    /// Binary type name of a descriptor type: `java.lang.String`, `int`,
    /// `android.view.View$OnClickListener[]`.
    pub fn convert_type(ty: &FieldType) -> String {
        match ty {
            FieldType::Base(BaseType::Byte) => "byte".to_string(),
            FieldType::Base(BaseType::Char) => "char".to_string(),
            FieldType::Base(BaseType::Double) => "double".to_string(),
            FieldType::Base(BaseType::Float) => "float".to_string(),
            FieldType::Base(BaseType::Int) => "int".to_string(),
            FieldType::Base(BaseType::Long) => "long".to_string(),
            FieldType::Base(BaseType::Short) => "short".to_string(),
            FieldType::Base(BaseType::Boolean) => "boolean".to_string(),
            FieldType::Object(name) => name.replace('/', "."),
            FieldType::Array(component) => {
                let mut dimensions = 1usize;
                let mut current = component.as_ref();
                while let FieldType::Array(inner) = current {
                    dimensions += 1;
                    current = inner.as_ref();
                }
                format!("{}{}", Self::convert_type(current), "[]".repeat(dimensions))
            }
        }
    }

    /// Parameter types and return type of a method descriptor; methods
    /// without a return value report `void`.
    pub fn convert_method(
        descriptor: &str,
    ) -> Result<(Vec<String>, String), ristretto_classfile::Error> {
        let (params, ret) = FieldType::parse_method_descriptor(descriptor)?;
        let return_type = match ret {
            None => luasense_api::models::entry::VOID.to_string(),
            Some(field_type) => Self::convert_type(&field_type),
        };
        let parameters = params.iter().map(Self::convert_type).collect();
        Ok((parameters, return_type))
    }
}
