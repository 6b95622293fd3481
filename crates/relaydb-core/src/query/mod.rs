//! Query layer: staged operations, the wire plan codec, and the fluent
//! builder that compiles a chain into a dispatchable plan.

mod builder;
mod op;
mod plan;

#[cfg(test)]
mod tests;

pub use builder::{Query, QueryError};
pub use op::{OpCode, StagedOp, WireOp};
pub use plan::{PlanCodecError, QueryPlan, WirePlan};
