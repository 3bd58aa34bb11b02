//! Domain records stored per owner.
//!
//! # Responsibility
//! - Define tasks, goals and user accounts as core business logic sees them.
//! - Own field-level validation shared by repositories and services.
//!
//! # Invariants
//! - Every task and goal belongs to exactly one owner (the account e-mail).
//! - Only tasks carry ordering semantics.

pub mod goal;
pub mod task;
pub mod user;

/// Trims `value` and returns `None` when nothing is left.
pub(crate) fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
