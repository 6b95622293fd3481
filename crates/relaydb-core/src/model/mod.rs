//! Runtime capability models for record types.
//!
//! Types in `model` are the *runtime representations* of schema facts:
//! which field is the primary key, which fields carry an index, and the
//! wire name each field travels under. They are static data attached at
//! the record type's definition site and consulted by query planning and
//! the session boundary; nothing here mutates after first build.

pub mod catalog;
pub mod field;
pub mod key;
pub mod record;
