use crate::{
    WIRE_VERSION,
    predicate::Predicate,
    query::op::{OpCode, StagedOp, WireOp},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// QueryPlan
///
/// Compiled, replay-safe form of one query chain.
/// `ops` is the exact application order; it is never re-sorted.
///

#[derive(Clone, Debug, PartialEq)]
pub struct QueryPlan {
    pub store: String,
    pub predicate: Option<Predicate>,
    pub ops: Vec<StagedOp>,
    pub results_unique: bool,
}

impl QueryPlan {
    /// Encode into the versioned wire envelope.
    #[must_use]
    pub fn to_wire(&self) -> WirePlan {
        WirePlan {
            v: WIRE_VERSION,
            store: self.store.clone(),
            predicate: self.predicate.clone(),
            operations: self.ops.iter().map(StagedOp::to_wire).collect(),
            results_unique: self.results_unique,
        }
    }

    /// Serialize to the canonical wire string.
    ///
    /// Deterministic: the envelope is ordered structs and sequences only,
    /// so the same logical plan always produces byte-identical output.
    pub fn serialize(&self) -> Result<String, PlanCodecError> {
        Ok(serde_json::to_string(&self.to_wire())?)
    }

    /// Decode a wire string back into a plan, preserving operation order
    /// and count exactly.
    pub fn deserialize(wire: &str) -> Result<Self, PlanCodecError> {
        let envelope: WirePlan = serde_json::from_str(wire)?;

        if envelope.v != WIRE_VERSION {
            return Err(PlanCodecError::VersionMismatch { found: envelope.v });
        }

        let ops = envelope
            .operations
            .iter()
            .map(StagedOp::from_wire)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            store: envelope.store,
            predicate: envelope.predicate,
            ops,
            results_unique: envelope.results_unique,
        })
    }
}

///
/// WirePlan
///
/// Transport envelope for a compiled plan. Field order is fixed; the
/// predicate travels as its own AST encoding, opaque to this layer.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WirePlan {
    pub v: u32,
    pub store: String,
    pub predicate: Option<Predicate>,
    pub operations: Vec<WireOp>,
    pub results_unique: bool,
}

///
/// PlanCodecError
///

#[derive(Debug, ThisError)]
pub enum PlanCodecError {
    #[error("plan encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported wire plan version {found}")]
    VersionMismatch { found: u32 },

    #[error("operation {op:?} carries a malformed operand")]
    BadOperand { op: OpCode },
}
