//! Process-wide record model catalog.
//!
//! Models are `&'static` data attached at the definition site, so lookup
//! by type is a compile-time constant. The catalog exists for the runtime
//! surfaces that need *enumeration*, such as building a database schema
//! from every record type an application has touched, and guarantees
//! at-most-once registration per type under concurrent first use.

use crate::{
    model::{field::FieldModel, record::RecordModel, record::SchemaError},
    traits::RecordKind,
};
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{LazyLock, RwLock, RwLockReadGuard},
};

static CATALOG: LazyLock<RwLock<HashMap<TypeId, &'static RecordModel>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Describe a record type, registering its model on first use.
///
/// Idempotent; readers never observe a half-built model because the model
/// itself is static data and the registry write is the only mutation.
pub fn describe<R: RecordKind>() -> &'static RecordModel {
    let type_id = TypeId::of::<R>();

    {
        let catalog = read_catalog();
        if let Some(model) = catalog.get(&type_id) {
            return model;
        }
    }

    let mut catalog = CATALOG
        .write()
        .expect("record catalog poisoned while registering");
    *catalog.entry(type_id).or_insert(R::MODEL)
}

/// Resolve a field selector for a record type.
pub fn lookup<R: RecordKind>(field: &str) -> Result<&'static FieldModel, SchemaError> {
    describe::<R>().field(field)
}

/// Every model registered so far, in store-name order.
///
/// Used when creating a database from the record types the process has
/// touched; the ordering keeps schema requests deterministic.
#[must_use]
pub fn registered_models() -> Vec<&'static RecordModel> {
    let catalog = read_catalog();
    let mut models: Vec<_> = catalog.values().copied().collect();
    models.sort_by_key(|model| model.store_name);
    models
}

fn read_catalog() -> RwLockReadGuard<'static, HashMap<TypeId, &'static RecordModel>> {
    CATALOG.read().expect("record catalog poisoned while reading")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::Person;

    #[test]
    fn describe_is_idempotent() {
        let first = describe::<Person>();
        let second = describe::<Person>();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn lookup_fails_on_unknown_selector() {
        assert!(lookup::<Person>("age").is_ok());
        assert!(lookup::<Person>("shoe_size").is_err());
    }

    #[test]
    fn concurrent_first_use_registers_once() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| std::ptr::addr_of!(*describe::<Person>()) as usize))
            .collect();

        let mut addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        addresses.dedup();
        assert_eq!(addresses.len(), 1);
    }
}
