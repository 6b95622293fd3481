use crate::{
    predicate::{CompareOp, ComparePredicate, Predicate},
    traits::FieldValues,
    value::Value,
};
use std::cmp::Ordering;

///
/// FieldPresence
///
/// Result of reading a field from a row during evaluation. Distinguishes
/// a missing field from a present field whose value is `Null`.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FieldPresence {
    Present(Value),
    Missing,
}

///
/// Row
///
/// Abstraction over a row-like value that exposes fields by name.
/// Decouples evaluation from concrete record types; the reference
/// executor evaluates over raw JSON rows through the same trait.
///

pub trait Row {
    fn field(&self, name: &str) -> FieldPresence;
}

impl<T: FieldValues> Row for T {
    fn field(&self, name: &str) -> FieldPresence {
        match self.get_value(name) {
            Some(value) => FieldPresence::Present(value),
            None => FieldPresence::Missing,
        }
    }
}

// Evaluate a field predicate only when the field is present.
fn on_present<R: Row + ?Sized>(row: &R, field: &str, f: impl FnOnce(&Value) -> bool) -> bool {
    match row.field(field) {
        FieldPresence::Present(value) => f(&value),
        FieldPresence::Missing => false,
    }
}

/// Evaluate a predicate against a single row.
///
/// Pure runtime evaluation: no schema access, no planning. Unsupported or
/// cross-family comparisons evaluate to `false`, never panic.
#[must_use]
pub fn eval<R: Row + ?Sized>(row: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::False => false,
        Predicate::And(children) => children.iter().all(|child| eval(row, child)),
        Predicate::Or(children) => children.iter().any(|child| eval(row, child)),
        Predicate::Not(inner) => !eval(row, inner),
        Predicate::Compare(cmp) => eval_compare(row, cmp),
    }
}

fn eval_compare<R: Row + ?Sized>(row: &R, cmp: &ComparePredicate) -> bool {
    on_present(row, &cmp.field, |actual| match cmp.op {
        CompareOp::Eq => actual.same(&cmp.value),
        CompareOp::Ne => {
            // Incomparable operands are "no match", not "not equal".
            actual
                .compare(&cmp.value)
                .is_some_and(|ord| ord != Ordering::Equal)
        }
        CompareOp::Lt => matches!(actual.compare(&cmp.value), Some(Ordering::Less)),
        CompareOp::Lte => matches!(
            actual.compare(&cmp.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CompareOp::Gt => matches!(actual.compare(&cmp.value), Some(Ordering::Greater)),
        CompareOp::Gte => matches!(
            actual.compare(&cmp.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CompareOp::In => cmp
            .value
            .as_list()
            .is_some_and(|candidates| candidates.iter().any(|c| actual.same(c))),
        CompareOp::NotIn => cmp
            .value
            .as_list()
            .is_some_and(|candidates| !candidates.iter().any(|c| actual.same(c))),
        CompareOp::Contains => match actual {
            Value::Text(text) => cmp
                .value
                .as_text()
                .is_some_and(|needle| text.contains(needle)),
            Value::List(items) => items.iter().any(|item| item.same(&cmp.value)),
            _ => false,
        },
        CompareOp::StartsWith => actual.as_text().zip(cmp.value.as_text()).is_some_and(
            |(text, prefix)| text.starts_with(prefix),
        ),
        CompareOp::EndsWith => actual
            .as_text()
            .zip(cmp.value.as_text())
            .is_some_and(|(text, suffix)| text.ends_with(suffix)),
    })
}
