//! Shared merge machinery for partial updates.
//!
//! A patch slot is applied only when its candidate passes the field
//! predicate. Rejected slots keep the current value and are reported in
//! `PatchOutcome::skipped`, never as an error.

use crate::validate::{validate_type, FieldKind, FieldValue, ValidationResult};

/// Which patch slots were applied and which were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Fields whose value was replaced.
    pub applied: Vec<&'static str>,
    /// Fields present in the patch but rejected by validation.
    pub skipped: Vec<&'static str>,
}

impl PatchOutcome {
    /// Returns whether no field changed.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Applies `candidate` to `slot` when it passes `check`.
pub(crate) fn merge_field<T: Clone>(
    slot: &mut T,
    candidate: Option<&T>,
    field: &'static str,
    check: impl FnOnce(&T) -> ValidationResult,
    outcome: &mut PatchOutcome,
) {
    let Some(candidate) = candidate else {
        return;
    };

    match check(candidate) {
        Ok(()) => {
            *slot = candidate.clone();
            outcome.applied.push(field);
        }
        Err(_) => outcome.skipped.push(field),
    }
}

/// Converts one untyped mapping entry into a typed slot value.
///
/// Returns `None` when the value kind does not match the field kind; the
/// caller drops the entry so the stored value is retained.
pub(crate) fn text_slot(field: &'static str, value: &FieldValue) -> Option<String> {
    validate_type(field, value, FieldKind::Text).ok()?;
    value.as_text().map(str::to_string)
}

pub(crate) fn integer_slot(field: &'static str, value: &FieldValue) -> Option<i64> {
    validate_type(field, value, FieldKind::Integer).ok()?;
    value.as_integer()
}

pub(crate) fn float_slot(field: &'static str, value: &FieldValue) -> Option<f64> {
    validate_type(field, value, FieldKind::Float).ok()?;
    value.as_float()
}
