use crate::{
    executor::ExecutorError,
    model::{key::KeyError, record::SchemaError},
    predicate::{Predicate, PredicateError, combine, resolve},
    query::{
        op::StagedOp,
        plan::{PlanCodecError, QueryPlan},
    },
    response::{RecordStream, Response},
    session::Session,
    traits::RecordKind,
};
use std::marker::PhantomData;
use thiserror::Error as ThisError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

///
/// Query
///
/// Session-bound fluent query over one record type.
///
/// Every chaining call takes `&self` and returns a **new** snapshot; the
/// receiver is never altered, so any intermediate snapshot can branch
/// into independent chains and remains valid indefinitely. Chaining is
/// pure allocation: snapshots are safe to share across tasks.
///
/// Terminal calls each independently compile (combine + close +
/// serialize) and dispatch; none of them consume or finalize the
/// snapshot.
///

pub struct Query<'a, R: RecordKind> {
    session: &'a Session,
    predicates: Vec<Predicate>,
    ops: Vec<StagedOp>,
    results_unique: bool,
    cancel: Option<CancellationToken>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: RecordKind> Clone for Query<'_, R> {
    fn clone(&self) -> Self {
        Self {
            session: self.session,
            predicates: self.predicates.clone(),
            ops: self.ops.clone(),
            results_unique: self.results_unique,
            cancel: self.cancel.clone(),
            _marker: PhantomData,
        }
    }
}

impl<'a, R: RecordKind> Query<'a, R> {
    pub(crate) const fn new(session: &'a Session) -> Self {
        Self {
            session,
            predicates: Vec::new(),
            ops: Vec::new(),
            results_unique: true,
            cancel: None,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Chain refinement (pure, copy-on-write)
    // ------------------------------------------------------------------

    /// Append a filter predicate.
    ///
    /// Predicates are free-form here; field references are checked at
    /// compile time (`plan`), not at chain time.
    #[must_use]
    pub fn filter(&self, predicate: Predicate) -> Self {
        let mut next = self.clone();
        next.predicates.push(predicate);
        next
    }

    /// Append an ascending ordering step over an indexed field.
    ///
    /// Fails fast when the selector does not resolve, or resolves to a
    /// field without any index capability; nothing is dispatched.
    pub fn order_by(&self, field: &str) -> Result<Self, QueryError> {
        let wire_name = self.orderable_wire_name(field)?;
        let mut next = self.clone();
        next.ops.push(StagedOp::OrderBy(wire_name));
        Ok(next)
    }

    /// Append a descending ordering step over an indexed field.
    pub fn order_by_desc(&self, field: &str) -> Result<Self, QueryError> {
        let wire_name = self.orderable_wire_name(field)?;
        let mut next = self.clone();
        next.ops.push(StagedOp::OrderByDescending(wire_name));
        Ok(next)
    }

    /// Skip the first `n` results of the plan so far.
    ///
    /// No upper-bound validation; checking `n` against store size is an
    /// executor concern.
    #[must_use]
    pub fn skip(&self, n: u32) -> Self {
        let mut next = self.clone();
        next.ops.push(StagedOp::Skip(n));
        next
    }

    /// Keep the first `n` results of the plan so far.
    #[must_use]
    pub fn take(&self, n: u32) -> Self {
        let mut next = self.clone();
        next.ops.push(StagedOp::Take(n));
        next
    }

    /// Keep the last `n` results after the rest of the plan.
    #[must_use]
    pub fn take_last(&self, n: u32) -> Self {
        let mut next = self.clone();
        next.ops.push(StagedOp::TakeLast(n));
        next
    }

    /// Allow duplicate rows in the result set.
    ///
    /// Multi-index scans may surface the same record more than once;
    /// results are unique by default.
    #[must_use]
    pub fn results_not_unique(&self) -> Self {
        let mut next = self.clone();
        next.results_unique = false;
        next
    }

    /// Attach a cooperative cancellation signal for terminal calls.
    ///
    /// Cancellation aborts the in-flight executor round trip and surfaces
    /// `ExecutorError::Cancelled`; partial results are never returned.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let mut next = self.clone();
        next.cancel = Some(token);
        next
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    /// Compile this chain into a dispatchable plan without executing it.
    ///
    /// Combines the predicate list left-to-right, resolves every field
    /// reference to its wire name against the record model, and fixes the
    /// staged-operation order.
    pub fn plan(&self) -> Result<QueryPlan, QueryError> {
        let predicate = if self.predicates.is_empty() {
            None
        } else {
            Some(resolve(R::MODEL, &combine(&self.predicates))?)
        };

        Ok(QueryPlan {
            store: R::MODEL.store_name.to_string(),
            predicate,
            ops: self.ops.clone(),
            results_unique: self.results_unique,
        })
    }

    // ------------------------------------------------------------------
    // Execution terminals
    // ------------------------------------------------------------------

    /// Execute and return the fully materialized result list.
    pub async fn to_vec(&self) -> Result<Vec<R>, QueryError> {
        Ok(self.fetch().await?.into_vec())
    }

    /// Execute and return a one-shot pull sequence over the results.
    ///
    /// The full result set is fetched eagerly before the first element is
    /// yielded; the stream exists only for item-at-a-time consumption,
    /// not incremental fetch.
    pub async fn stream(&self) -> Result<RecordStream<R>, QueryError> {
        Ok(self.fetch().await?.into_stream())
    }

    /// Execute and return the number of matching records.
    ///
    /// Fetches the full result set; no server-side count is assumed of
    /// executors.
    pub async fn count(&self) -> Result<usize, QueryError> {
        Ok(self.fetch().await?.len())
    }

    async fn fetch(&self) -> Result<Response<R>, QueryError> {
        let plan = self.plan()?;
        debug!(
            store = %plan.store,
            ops = plan.ops.len(),
            filtered = plan.predicate.is_some(),
            "dispatching query plan"
        );

        let rows = self
            .session
            .execute_plan(&plan, self.cancel.as_ref())
            .await?;

        Ok(Response::from_rows(rows)?)
    }

    fn orderable_wire_name(&self, field: &str) -> Result<String, QueryError> {
        let field_model = R::MODEL.field(field)?;

        if !field_model.orderable() {
            return Err(QueryError::UnorderableField {
                record: R::MODEL.record_name,
                field: field.to_string(),
            });
        }

        Ok(field_model.wire_name.to_string())
    }
}

///
/// QueryError
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Predicate(#[from] PredicateError),

    #[error(
        "cannot order record '{record}' by '{field}': the field carries no \
         primary key, unique index, or index capability"
    )]
    UnorderableField { record: &'static str, field: String },

    #[error("{0}")]
    Key(#[from] KeyError),

    #[error("{0}")]
    Codec(#[from] PlanCodecError),

    #[error("{0}")]
    Executor(#[from] ExecutorError),
}
