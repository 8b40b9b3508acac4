//! Identifier generation for cells and notebooks.

use uuid::Uuid;

/// Opaque cell identifier.
///
/// Ids loaded from disk are not required to be UUIDs, so they stay strings.
pub type CellId = String;

/// Opaque notebook identifier.
pub type NotebookId = String;

/// Returns a fresh random (v4) identifier.
///
/// Uniqueness comes from the OS random source, not a counter.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
