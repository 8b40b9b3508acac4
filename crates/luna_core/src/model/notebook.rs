//! Notebook domain model.

use super::ids::{new_id, CellId, NotebookId};
use serde::{Deserialize, Serialize};

/// Title used when a caller creates a notebook without one.
pub const DEFAULT_NOTEBOOK_TITLE: &str = "Untitled Notebook";

/// Ordered collection of cells.
///
/// `cell_order` is the only record of which active cells belong to the
/// notebook; cell objects themselves live in `Workspace::cells`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: NotebookId,
    pub title: String,
    #[serde(default)]
    pub cell_order: Vec<CellId>,
    /// Session hint: cell to focus when the notebook is reopened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_selected_cell_id: Option<CellId>,
}

impl Notebook {
    /// Creates an empty notebook with a generated id.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(new_id(), title)
    }

    /// Creates an empty notebook with a caller-provided id.
    ///
    /// Used when restoring from the recycle bin, where identity is preserved.
    pub fn with_id(id: impl Into<NotebookId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            cell_order: Vec::new(),
            last_selected_cell_id: None,
        }
    }

    /// Position of `cell_id` in `cell_order`, including soft-deleted slots.
    pub fn position_of(&self, cell_id: &str) -> Option<usize> {
        self.cell_order.iter().position(|id| id == cell_id)
    }
}
