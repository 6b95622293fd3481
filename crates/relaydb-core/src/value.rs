use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

///
/// Value
///
/// Dynamic scalar carried by predicates, keys, and wire plans.
/// The encoding is externally tagged and stable; executors on the far
/// side of the boundary decode it without schema knowledge.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    List(Vec<Self>),
}

impl Value {
    /// True for non-list, non-null values.
    ///
    /// Key material must be scalar; compound keys are a list of scalars.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Null | Self::List(_))
    }

    /// Compare two values within their comparison family.
    ///
    /// Int/Uint/Float widen to a common numeric comparison. Text and Bool
    /// compare within their own family. Cross-family comparison yields
    /// `None`, which predicate evaluation treats as "no match".
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Uint(a), Self::Uint(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Uint(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Self::Uint(a), Self::Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&to_f64_i(*b)),
            (Self::Int(a), Self::Float(b)) => to_f64_i(*a).partial_cmp(b),
            (Self::Float(a), Self::Uint(b)) => a.partial_cmp(&to_f64_u(*b)),
            (Self::Uint(a), Self::Float(b)) => to_f64_u(*a).partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Family-aware equality: `Int(1)` equals `Uint(1)`.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// Borrow the text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the list payload, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
const fn to_f64_i(v: i64) -> f64 {
    v as f64
}

#[allow(clippy::cast_precision_loss)]
const fn to_f64_u(v: u64) -> f64 {
    v as f64
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Uint(u64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Decode a JSON scalar into a `Value` for row-side evaluation.
///
/// Numbers prefer the narrowest lossless family: unsigned, then signed,
/// then float.
#[must_use]
pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(v) => Value::Bool(*v),
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Value::Uint(v)
            } else if let Some(v) = n.as_i64() {
                Value::Int(v)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(from_json).collect()),
        serde_json::Value::Object(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_families_widen() {
        assert_eq!(Value::Int(1).compare(&Value::Uint(1)), Some(Ordering::Equal));
        assert_eq!(Value::Uint(2).compare(&Value::Int(-3)), Some(Ordering::Greater));
        assert_eq!(Value::Float(1.5).compare(&Value::Int(2)), Some(Ordering::Less));
    }

    #[test]
    fn cross_family_is_incomparable() {
        assert_eq!(Value::Text("1".into()).compare(&Value::Int(1)), None);
        assert_eq!(Value::Bool(true).compare(&Value::Int(1)), None);
        assert!(!Value::Text("1".into()).same(&Value::Int(1)));
    }

    #[test]
    fn json_numbers_pick_narrowest_family() {
        assert_eq!(from_json(&serde_json::json!(7)), Value::Uint(7));
        assert_eq!(from_json(&serde_json::json!(-7)), Value::Int(-7));
        assert_eq!(from_json(&serde_json::json!(1.25)), Value::Float(1.25));
    }

    #[test]
    fn option_and_vec_conversions() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Int(3));
        assert_eq!(
            Value::from(vec!["a", "b"]),
            Value::List(vec![Value::Text("a".into()), Value::Text("b".into())])
        );
    }
}
