//! Predicate layer: the serializable boolean AST, the conjunction
//! combiner, and pure row evaluation.
//!
//! The AST is schema-agnostic at construction; `resolve` (and its
//! validation-only form `close`) is the only pass that consults a record
//! model, and it runs during plan compilation.

mod ast;
mod combine;
mod eval;


pub use ast::{CompareOp, ComparePredicate, Predicate};
pub use combine::{PredicateError, close, combine, resolve};
pub use eval::{FieldPresence, Row, eval};
