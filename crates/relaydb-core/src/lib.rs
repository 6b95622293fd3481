//! Core runtime for RelayDB: record models, the predicate AST, the fluent
//! query builder, the wire plan codec, and the executor boundary.

#[macro_use]
pub mod macros;

// public exports are one module level down
pub mod executor;
pub mod model;
pub mod predicate;
pub mod query;
pub mod response;
pub mod session;
pub mod traits;
pub mod value;

#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Version tag carried by every serialized plan envelope.
///
/// Executors reject envelopes with an unknown version instead of guessing
/// at operation semantics.
pub const WIRE_VERSION: u32 = 1;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No executors, codecs, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{field::FieldModel, key::KeyModel, record::RecordModel},
        predicate::Predicate,
        traits::{FieldValues, RecordKind},
        value::Value,
    };
}
