//! Workspace mutation operations.
//!
//! # Responsibility
//! - Apply cell, notebook and recycle-bin mutations to an explicit
//!   `&mut Workspace`.
//! - Keep denormalized `cell_index` values in step with `cell_order`.
//!
//! # Invariants
//! - Every operation runs to completion; callers never observe a partially
//!   updated workspace.
//! - Not-found conditions return `false`/`None` and leave the workspace
//!   untouched. Contract violations return `WorkspaceError`.

pub mod cells;
pub mod notebooks;
pub mod recycle_bin;

use crate::model::ids::NotebookId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller contract violations raised by workspace operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    /// Target notebook is not active in the workspace.
    NotebookNotFound(NotebookId),
}

impl Display for WorkspaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotebookNotFound(id) => write!(f, "notebook not found: {id}"),
        }
    }
}

impl Error for WorkspaceError {}

/// Swaps `order[index]` with its neighbor in `direction`.
///
/// Returns `false` when the id is absent, already at the boundary, or the
/// order has fewer than two entries.
pub(crate) fn swap_with_neighbor(order: &mut [String], id: &str, direction: MoveDirection) -> bool {
    if order.len() < 2 {
        return false;
    }
    let Some(index) = order.iter().position(|value| value == id) else {
        return false;
    };
    let target = match direction {
        MoveDirection::Up if index > 0 => index - 1,
        MoveDirection::Down if index + 1 < order.len() => index + 1,
        _ => return false,
    };
    order.swap(index, target);
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{swap_with_neighbor, MoveDirection};

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn swap_respects_boundaries() {
        let mut ids = order(&["a", "b", "c"]);
        assert!(!swap_with_neighbor(&mut ids, "a", MoveDirection::Up));
        assert!(!swap_with_neighbor(&mut ids, "c", MoveDirection::Down));
        assert!(!swap_with_neighbor(&mut ids, "zz", MoveDirection::Up));
        assert_eq!(ids, order(&["a", "b", "c"]));

        assert!(swap_with_neighbor(&mut ids, "b", MoveDirection::Up));
        assert_eq!(ids, order(&["b", "a", "c"]));
    }

    #[test]
    fn swap_requires_two_entries() {
        let mut ids = order(&["solo"]);
        assert!(!swap_with_neighbor(&mut ids, "solo", MoveDirection::Down));
    }
}
