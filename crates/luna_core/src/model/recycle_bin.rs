//! Recycle bin bookkeeping.
//!
//! # Responsibility
//! - Record enough origin metadata to restore deleted cells and notebooks
//!   exactly.
//! - Keep most-recent-first display order for the bin view.
//!
//! # Invariants
//! - `cell_order` holds exactly the keys of `cells`; `notebook_order` holds
//!   exactly the keys of `notebooks`.
//! - Entries are recorded once; re-deletion only refreshes `deleted_at`.

use super::ids::{CellId, NotebookId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Origin metadata for one soft-deleted cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecycleBinCellEntry {
    pub id: CellId,
    /// Notebook the cell was deleted from.
    pub notebook_id: NotebookId,
    /// Index in the notebook's `cell_order` at deletion time.
    pub original_index: usize,
    pub deleted_at: String,
}

/// Display snapshot of one deleted notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecycleBinNotebookEntry {
    pub id: NotebookId,
    /// Title captured at deletion time.
    pub title: String,
    pub deleted_at: String,
}

/// Soft-deleted entities and their restore metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecycleBin {
    #[serde(default)]
    pub cells: BTreeMap<CellId, RecycleBinCellEntry>,
    #[serde(default)]
    pub notebooks: BTreeMap<NotebookId, RecycleBinNotebookEntry>,
    /// Most recent deletion first.
    #[serde(default)]
    pub cell_order: Vec<CellId>,
    /// Most recent deletion first.
    #[serde(default)]
    pub notebook_order: Vec<NotebookId>,
}

impl RecycleBin {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
            && self.notebooks.is_empty()
            && self.cell_order.is_empty()
            && self.notebook_order.is_empty()
    }

    /// Records a cell deletion unless an entry already exists.
    ///
    /// Returns `true` when a new entry was created. An existing entry keeps
    /// its `original_index` and `notebook_id`; only `deleted_at` is refreshed.
    pub fn record_cell(
        &mut self,
        cell_id: &str,
        notebook_id: &str,
        original_index: usize,
        deleted_at: &str,
    ) -> bool {
        if let Some(existing) = self.cells.get_mut(cell_id) {
            existing.deleted_at = deleted_at.to_string();
            return false;
        }
        self.cells.insert(
            cell_id.to_string(),
            RecycleBinCellEntry {
                id: cell_id.to_string(),
                notebook_id: notebook_id.to_string(),
                original_index,
                deleted_at: deleted_at.to_string(),
            },
        );
        self.cell_order.insert(0, cell_id.to_string());
        true
    }

    /// Records a notebook snapshot at the front of the notebook order.
    pub fn record_notebook(&mut self, notebook_id: &str, title: &str, deleted_at: &str) {
        self.notebooks.insert(
            notebook_id.to_string(),
            RecycleBinNotebookEntry {
                id: notebook_id.to_string(),
                title: title.to_string(),
                deleted_at: deleted_at.to_string(),
            },
        );
        self.notebook_order.retain(|id| id != notebook_id);
        self.notebook_order.insert(0, notebook_id.to_string());
    }

    /// Removes a cell entry and its order slot.
    pub fn remove_cell(&mut self, cell_id: &str) -> Option<RecycleBinCellEntry> {
        self.cell_order.retain(|id| id != cell_id);
        self.cells.remove(cell_id)
    }

    /// Removes a notebook entry and its order slot.
    pub fn remove_notebook(&mut self, notebook_id: &str) -> Option<RecycleBinNotebookEntry> {
        self.notebook_order.retain(|id| id != notebook_id);
        self.notebooks.remove(notebook_id)
    }

    /// Cell entries owned by `notebook_id`, sorted by `original_index` ascending.
    pub fn cell_entries_for(&self, notebook_id: &str) -> Vec<RecycleBinCellEntry> {
        let mut entries = self
            .cells
            .values()
            .filter(|entry| entry.notebook_id == notebook_id)
            .cloned()
            .collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.original_index);
        entries
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.notebooks.clear();
        self.cell_order.clear();
        self.notebook_order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::RecycleBin;

    #[test]
    fn record_cell_is_most_recent_first_and_keeps_first_index() {
        let mut bin = RecycleBin::default();
        assert!(bin.record_cell("a", "nb", 0, "t1"));
        assert!(bin.record_cell("b", "nb", 3, "t2"));
        assert!(!bin.record_cell("a", "nb", 7, "t3"));

        assert_eq!(bin.cell_order, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(bin.cells["a"].original_index, 0);
        assert_eq!(bin.cells["a"].deleted_at, "t3");
    }

    #[test]
    fn cell_entries_for_sorts_by_original_index() {
        let mut bin = RecycleBin::default();
        bin.record_cell("c", "nb", 2, "t");
        bin.record_cell("a", "nb", 0, "t");
        bin.record_cell("x", "other", 1, "t");
        bin.record_cell("b", "nb", 1, "t");

        let ids = bin
            .cell_entries_for("nb")
            .into_iter()
            .map(|entry| entry.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_and_clear_keep_order_in_sync() {
        let mut bin = RecycleBin::default();
        bin.record_cell("a", "nb", 0, "t");
        bin.record_notebook("nb", "Title", "t");
        assert!(bin.remove_cell("a").is_some());
        assert!(bin.cell_order.is_empty());

        bin.record_cell("b", "nb", 0, "t");
        bin.clear();
        assert!(bin.is_empty());
    }
}
