//! RelayDB: typed, composable queries compiled to a portable plan and
//! executed by an external record store.
//!
//! This is the public meta-crate. Downstream users depend on **relaydb**
//! only; it re-exports the stable API from `relaydb-core`:
//!
//!   - record models and the [`record!`] declaration macro
//!   - the predicate AST and combiner
//!   - the fluent [`Query`] builder and the wire plan codec
//!   - the [`Session`] handle and the [`Executor`] boundary

pub use relaydb_core as core;

pub use relaydb_core::{
    WIRE_VERSION,
    executor::{Executor, ExecutorError, MemoryExecutor, StorageEstimate},
    model::{
        catalog,
        key::KeyError,
        record::SchemaError,
    },
    predicate::{CompareOp, Predicate, PredicateError},
    query::{OpCode, PlanCodecError, Query, QueryError, QueryPlan, StagedOp, WireOp},
    record,
    response::{RecordStream, Response},
    session::{CancellationToken, Session, SessionError},
};

pub mod prelude {
    pub use relaydb_core::prelude::*;

    pub use relaydb_core::{
        executor::MemoryExecutor,
        record,
        session::{CancellationToken, Session},
    };
}
