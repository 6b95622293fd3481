use crate::model::{field::FieldModel, key::KeyModel};
use thiserror::Error as ThisError;

///
/// RecordModel
/// Minimal, macro-generated runtime model for one record type.
///

#[derive(Debug)]
pub struct RecordModel {
    /// Rust type name (for diagnostics).
    pub record_name: &'static str,
    /// Stable external store name used in requests.
    pub store_name: &'static str,
    /// Primary key shape (simple or compound).
    pub primary_key: KeyModel,
    /// Ordered field list (authoritative for validation and the wire layer).
    pub fields: &'static [FieldModel],
}

impl RecordModel {
    /// Resolve a field selector to exactly one declared field.
    pub fn field(&self, name: &str) -> Result<&FieldModel, SchemaError> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| SchemaError::UnknownField {
                record: self.record_name,
                field: name.to_string(),
            })
    }

    /// True when `name` resolves to a declared field.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    /// Wire names of the primary key fields, in key order.
    #[must_use]
    pub fn key_wire_names(&self) -> Vec<&'static str> {
        self.primary_key
            .field_names()
            .into_iter()
            .map(|name| {
                self.fields
                    .iter()
                    .find(|field| field.name == name)
                    .map_or(name, |field| field.wire_name)
            })
            .collect()
    }
}

///
/// SchemaError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("record '{record}' has no field named '{field}'")]
    UnknownField { record: &'static str, field: String },
}

#[cfg(test)]
mod tests {
    use crate::test_fixtures::Person;
    use crate::traits::RecordKind;

    #[test]
    fn selector_resolves_declared_fields() {
        let model = Person::MODEL;
        assert_eq!(model.field("age").unwrap().wire_name, "age");
        assert!(model.field("age").unwrap().indexed);
        assert!(model.field("id").unwrap().primary_key);
        assert!(!model.field("name").unwrap().orderable());
    }

    #[test]
    fn unknown_selector_is_a_schema_error() {
        let err = Person::MODEL.field("ssn").unwrap_err();
        assert!(err.to_string().contains("ssn"));
    }
}
