//! Entry controllers wrapping the quantity reconcilers.
//!
//! - `quick` — the create form: product pick, note, quantities, payload
//! - `row` — inline editing of a persisted entry with dirty tracking

pub mod quick;
pub mod row;

pub use quick::{IpqcQuickEntry, OqcQuickEntry};
pub use row::{IpqcPatch, IpqcRowEditor, OqcPatch, OqcRowEditor};

/// Trimmed text, or `None` when blank. Empty strings go over the wire as `null`.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
