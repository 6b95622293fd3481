use crate::{model::record::RecordModel, value::Value};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;

///
/// RecordKind
///
/// A record type that carries its own capability model.
///
/// `MODEL` is static data attached at the type's definition site by the
/// `record!` macro; there is no runtime reflection. The serde bounds make
/// every record transportable across the executor boundary.
///

pub trait RecordKind:
    Clone + Debug + Serialize + DeserializeOwned + FieldValues + Send + Sync + 'static
{
    const MODEL: &'static RecordModel;

    /// Stable store name used in requests.
    #[must_use]
    fn store_name() -> &'static str {
        Self::MODEL.store_name
    }
}

///
/// FieldValues
///
/// Runtime field access by name.
///
/// This decouples predicate evaluation and key extraction from concrete
/// record types; a missing field is `None`, a present-but-null field is
/// `Some(Value::Null)`.
///

pub trait FieldValues {
    fn get_value(&self, field: &str) -> Option<Value>;
}
