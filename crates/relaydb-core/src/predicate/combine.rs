use crate::{
    model::record::RecordModel,
    predicate::{ComparePredicate, Predicate},
};
use thiserror::Error as ThisError;

/// Fold independently-expressed predicates into one conjunction.
///
/// - zero predicates: the canonical always-true predicate
/// - one predicate: returned structurally unchanged, not wrapped
/// - more: left fold in chain order, `And[And[p1, p2], p3]`. The truth
///   value is order-independent, but the tree shape is deterministic so
///   serialized plans are stable and testable
#[must_use]
pub fn combine(predicates: &[Predicate]) -> Predicate {
    match predicates {
        [] => Predicate::True,
        [single] => single.clone(),
        [first, rest @ ..] => rest.iter().fold(first.clone(), |acc, next| {
            Predicate::And(vec![acc, next.clone()])
        }),
    }
}

/// Check that a predicate is closed over one record model.
///
/// Every field reference in every operand must resolve against the shared
/// model; a stray reference means the predicate cannot be rewritten onto
/// the record parameter and the plan must not be dispatched.
pub fn close(model: &'static RecordModel, predicate: &Predicate) -> Result<(), PredicateError> {
    resolve(model, predicate).map(|_| ())
}

/// Close a predicate over one record model and rewrite every field
/// reference to its wire name.
///
/// The returned tree is the one that crosses the executor boundary.
/// Executors only know wire names, so the rewrite has to happen during
/// plan compilation, matching what ordering operations already send.
pub fn resolve(
    model: &'static RecordModel,
    predicate: &Predicate,
) -> Result<Predicate, PredicateError> {
    match predicate {
        Predicate::True | Predicate::False => Ok(predicate.clone()),
        Predicate::And(children) => Ok(Predicate::And(resolve_all(model, children)?)),
        Predicate::Or(children) => Ok(Predicate::Or(resolve_all(model, children)?)),
        Predicate::Not(inner) => Ok(Predicate::Not(Box::new(resolve(model, inner)?))),
        Predicate::Compare(cmp) => {
            let Ok(field_model) = model.field(&cmp.field) else {
                return Err(PredicateError::UnresolvedField {
                    record: model.record_name,
                    field: cmp.field.clone(),
                });
            };

            Ok(Predicate::Compare(ComparePredicate {
                field: field_model.wire_name.to_string(),
                op: cmp.op,
                value: cmp.value.clone(),
            }))
        }
    }
}

fn resolve_all(
    model: &'static RecordModel,
    children: &[Predicate],
) -> Result<Vec<Predicate>, PredicateError> {
    children.iter().map(|child| resolve(model, child)).collect()
}

///
/// PredicateError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PredicateError {
    #[error(
        "predicate references '{field}', which is not a field of record '{record}'; \
         predicates must close over exactly one record parameter"
    )]
    UnresolvedField { record: &'static str, field: String },
}
