use crate::{model::record::RecordModel, traits::FieldValues, value::Value};
use thiserror::Error as ThisError;

///
/// KeyModel
///
/// Primary key shape for one record type.
///
/// Compound keys are an ordered, fixed-length tuple of field names; the
/// order is the key path order sent to the store at creation time.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyModel {
    Simple {
        field: &'static str,
        auto_increment: bool,
    },
    Compound {
        fields: &'static [&'static str],
        auto_increment: bool,
    },
}

impl KeyModel {
    /// Key path field names in key order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        match *self {
            Self::Simple { field, .. } => vec![field],
            Self::Compound { fields, .. } => fields.to_vec(),
        }
    }

    #[must_use]
    pub const fn auto_increment(&self) -> bool {
        match self {
            Self::Simple { auto_increment, .. } | Self::Compound { auto_increment, .. } => {
                *auto_increment
            }
        }
    }

    /// Validate that a supplied key value matches this shape.
    ///
    /// Runs before any request is dispatched; shape mismatches never reach
    /// the executor.
    pub fn validate(&self, record: &'static str, key: &Value) -> Result<(), KeyError> {
        match self {
            Self::Simple { .. } => {
                if key.is_scalar() {
                    Ok(())
                } else {
                    Err(KeyError::ShapeMismatch {
                        record,
                        expected: "a scalar key",
                        found: key.clone(),
                    })
                }
            }
            Self::Compound { fields, .. } => match key.as_list() {
                Some(parts) if parts.len() == fields.len() && parts.iter().all(Value::is_scalar) => {
                    Ok(())
                }
                _ => Err(KeyError::ShapeMismatch {
                    record,
                    expected: "an ordered list of scalars matching the compound key arity",
                    found: key.clone(),
                }),
            },
        }
    }
}

/// Extract the primary key value from a record instance.
///
/// Mutations addressed by record require a resolvable key; an absent or
/// null key field fails before any request is sent. Auto-increment keys
/// may legitimately be absent on insert, which is the one path that skips
/// this extraction.
pub fn extract_key<R: FieldValues>(
    model: &'static RecordModel,
    record: &R,
) -> Result<Value, KeyError> {
    let names = model.primary_key.field_names();

    let mut parts = Vec::with_capacity(names.len());
    for name in names {
        match record.get_value(name) {
            Some(value) if value.is_scalar() => parts.push(value),
            _ => {
                return Err(KeyError::MissingPrimaryKey {
                    record: model.record_name,
                    field: name,
                });
            }
        }
    }

    match model.primary_key {
        KeyModel::Simple { .. } => Ok(parts.remove(0)),
        KeyModel::Compound { .. } => Ok(Value::List(parts)),
    }
}

///
/// KeyError
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum KeyError {
    #[error("key for record '{record}' must be {expected}, found {found}")]
    ShapeMismatch {
        record: &'static str,
        expected: &'static str,
        found: Value,
    },

    #[error("record '{record}' has no resolvable primary key value for field '{field}'")]
    MissingPrimaryKey {
        record: &'static str,
        field: &'static str,
    },
}
