///
/// FieldModel
/// Runtime field metadata consulted by ordering validation and the wire
/// layer. One entry per declared field, in declaration order.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Field name as used in predicates and selectors.
    pub name: &'static str,
    /// Stable external name sent across the executor boundary.
    pub wire_name: &'static str,
    /// Field is the (or part of the) primary key.
    pub primary_key: bool,
    /// Field carries a unique index.
    pub unique: bool,
    /// Field carries a regular index.
    pub indexed: bool,
}

impl FieldModel {
    /// Whether ordering operations may target this field.
    ///
    /// Executors can only order over key paths they index.
    #[must_use]
    pub const fn orderable(&self) -> bool {
        self.primary_key || self.unique || self.indexed
    }
}
