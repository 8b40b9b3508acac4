//! Workspace document model.
//!
//! # Responsibility
//! - Define the aggregate persisted in `.luna` files.
//! - Keep one flat cell map with per-notebook ordering arrays.
//!
//! # Invariants
//! - Every cell/notebook is identified by an opaque id that is never reused
//!   while the entity exists (active or in the recycle bin).
//! - Soft-deleted cells keep their slot in `cell_order`; active views filter
//!   them out through `Workspace::active_cell_ids`.
//! - The recycle bin maps and their order arrays stay in 1:1 correspondence.

pub mod cell;
pub mod ids;
pub mod notebook;
pub mod recycle_bin;
pub mod workspace;

use chrono::{SecondsFormat, Utc};

/// Current UTC time as an RFC 3339 string with millisecond precision.
///
/// Shape matches `2025-10-20T14:30:45.123Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
