//! Declaration-site wiring for record types.
//!
//! `record!` attaches a static `RecordModel` and a `FieldValues`
//! implementation to an existing struct. The struct itself is written by
//! hand (with its serde derives); the macro only records schema facts, so
//! there is no runtime reflection anywhere in the pipeline.

/// Attach a capability model to a record struct.
///
/// ```ignore
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// struct Person {
///     id: i64,
///     age: i64,
///     name: String,
/// }
///
/// record! {
///     Person in "people" key [id] {
///         @pk id,
///         @index age,
///         name,
///     }
/// }
/// ```
///
/// Capability markers: `@pk`, `@unique`, `@index`, or none. The key spec
/// is `[field]`, `[auto field]`, or `[a, b, ...]` for a compound key.
/// Every field may carry `as "wireName"` to rename it on the wire.
#[macro_export]
macro_rules! record {
    (
        $name:ident in $store:literal key $keyspec:tt {
            $( $(@$cap:ident)? $field:ident $(as $wire:literal)? ),+ $(,)?
        }
    ) => {
        impl $crate::traits::RecordKind for $name {
            const MODEL: &'static $crate::model::record::RecordModel =
                &$crate::model::record::RecordModel {
                    record_name: stringify!($name),
                    store_name: $store,
                    primary_key: $crate::record!(@key $keyspec),
                    fields: &[
                        $( $crate::record!(
                            @field $field, $crate::record!(@wire $field $($wire)?) ; $($cap)?
                        ), )+
                    ],
                };
        }

        impl $crate::traits::FieldValues for $name {
            fn get_value(&self, field: &str) -> Option<$crate::value::Value> {
                match field {
                    $( stringify!($field) => {
                        Some($crate::value::Value::from(self.$field.clone()))
                    } )+
                    _ => None,
                }
            }
        }
    };

    // --- key shapes ---------------------------------------------------
    (@key [ auto $field:ident ]) => {
        $crate::model::key::KeyModel::Simple {
            field: stringify!($field),
            auto_increment: true,
        }
    };
    (@key [ $field:ident ]) => {
        $crate::model::key::KeyModel::Simple {
            field: stringify!($field),
            auto_increment: false,
        }
    };
    (@key [ $($field:ident),+ ]) => {
        $crate::model::key::KeyModel::Compound {
            fields: &[ $( stringify!($field) ),+ ],
            auto_increment: false,
        }
    };

    // --- wire name ----------------------------------------------------
    (@wire $field:ident $wire:literal) => { $wire };
    (@wire $field:ident) => { stringify!($field) };

    // --- capability bits ----------------------------------------------
    (@field $field:ident, $wire:expr ; pk) => {
        $crate::model::field::FieldModel {
            name: stringify!($field),
            wire_name: $wire,
            primary_key: true,
            unique: false,
            indexed: false,
        }
    };
    (@field $field:ident, $wire:expr ; unique) => {
        $crate::model::field::FieldModel {
            name: stringify!($field),
            wire_name: $wire,
            primary_key: false,
            unique: true,
            indexed: false,
        }
    };
    (@field $field:ident, $wire:expr ; index) => {
        $crate::model::field::FieldModel {
            name: stringify!($field),
            wire_name: $wire,
            primary_key: false,
            unique: false,
            indexed: true,
        }
    };
    (@field $field:ident, $wire:expr ;) => {
        $crate::model::field::FieldModel {
            name: stringify!($field),
            wire_name: $wire,
            primary_key: false,
            unique: false,
            indexed: false,
        }
    };
}
