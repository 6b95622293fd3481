use crate::{query::plan::PlanCodecError, value::Value};
use serde::{Deserialize, Serialize};

///
/// StagedOp
///
/// One ordering/pagination step of a query plan, applied by the executor
/// in the exact declared order. `TakeLast` selects the last n results
/// after the rest of the plan; it is deliberately not an alias of `Skip`.
///
/// `First`/`Last` exist on the wire contract as reserved opcodes and are
/// not exposed through the builder.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StagedOp {
    Skip(u32),
    Take(u32),
    TakeLast(u32),
    OrderBy(String),
    OrderByDescending(String),
    First,
    Last,
}

impl StagedOp {
    /// Encode into the stable `{opcode, value}` wire pair.
    #[must_use]
    pub fn to_wire(&self) -> WireOp {
        match self {
            Self::Skip(n) => WireOp::with_value(OpCode::Skip, Value::Uint(u64::from(*n))),
            Self::Take(n) => WireOp::with_value(OpCode::Take, Value::Uint(u64::from(*n))),
            Self::TakeLast(n) => WireOp::with_value(OpCode::TakeLast, Value::Uint(u64::from(*n))),
            Self::OrderBy(field) => WireOp::with_value(OpCode::OrderBy, Value::Text(field.clone())),
            Self::OrderByDescending(field) => {
                WireOp::with_value(OpCode::OrderByDescending, Value::Text(field.clone()))
            }
            Self::First => WireOp::bare(OpCode::First),
            Self::Last => WireOp::bare(OpCode::Last),
        }
    }

    /// Decode from a wire pair, checking the value shape the opcode needs.
    pub fn from_wire(wire: &WireOp) -> Result<Self, PlanCodecError> {
        let op = match wire.op {
            OpCode::Skip => Self::Skip(wire.count()?),
            OpCode::Take => Self::Take(wire.count()?),
            OpCode::TakeLast => Self::TakeLast(wire.count()?),
            OpCode::OrderBy => Self::OrderBy(wire.field()?),
            OpCode::OrderByDescending => Self::OrderByDescending(wire.field()?),
            OpCode::First => Self::First,
            OpCode::Last => Self::Last,
        };

        Ok(op)
    }
}

///
/// OpCode
///
/// Stable wire spellings; renames are part of the executor contract and
/// must never change without a wire version bump.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum OpCode {
    Take,
    #[serde(rename = "Take_Last")]
    TakeLast,
    Skip,
    #[serde(rename = "Order_By")]
    OrderBy,
    #[serde(rename = "Order_By_Descending")]
    OrderByDescending,
    First,
    Last,
}

///
/// WireOp
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireOp {
    pub op: OpCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl WireOp {
    #[must_use]
    pub const fn bare(op: OpCode) -> Self {
        Self { op, value: None }
    }

    #[must_use]
    pub const fn with_value(op: OpCode, value: Value) -> Self {
        Self {
            op,
            value: Some(value),
        }
    }

    fn count(&self) -> Result<u32, PlanCodecError> {
        match &self.value {
            Some(Value::Uint(n)) => {
                u32::try_from(*n).map_err(|_| PlanCodecError::BadOperand { op: self.op })
            }
            Some(Value::Int(n)) => {
                u32::try_from(*n).map_err(|_| PlanCodecError::BadOperand { op: self.op })
            }
            _ => Err(PlanCodecError::BadOperand { op: self.op }),
        }
    }

    fn field(&self) -> Result<String, PlanCodecError> {
        match &self.value {
            Some(Value::Text(field)) => Ok(field.clone()),
            _ => Err(PlanCodecError::BadOperand { op: self.op }),
        }
    }
}
