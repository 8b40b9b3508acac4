//! Notebook-level operations.
//!
//! # Invariants
//! - Creation always appends the new id to `notebook_order`.
//! - Deleting a notebook moves it and every cell it lists into the recycle
//!   bin; restoring re-creates it with the same id at the end of the order.

use super::cells::recalculate_cell_indexes;
use super::{swap_with_neighbor, MoveDirection};
use crate::model::ids::{CellId, NotebookId};
use crate::model::notebook::Notebook;
use crate::model::now_timestamp;
use crate::model::workspace::Workspace;
use log::{debug, warn};

/// Outcome of a notebook soft-delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookDeletion {
    /// Notebook the UI should select next, if any remain.
    pub next_notebook_id: Option<NotebookId>,
}

/// Outcome of a notebook restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookRestore {
    pub notebook_id: NotebookId,
    /// Cells reattached to the notebook, in restored order.
    pub reattached: Vec<CellId>,
    /// Bin entries cleared because their cell object no longer exists.
    pub orphaned: Vec<CellId>,
}

/// Creates an empty notebook and appends it to `notebook_order`.
pub fn create_notebook(workspace: &mut Workspace, title: impl Into<String>) -> Notebook {
    let notebook = Notebook::new(title);
    workspace.notebook_order.push(notebook.id.clone());
    workspace
        .notebooks
        .insert(notebook.id.clone(), notebook.clone());
    notebook
}

/// Renames a notebook to the trimmed `new_title`.
///
/// Returns `false` when the notebook is missing, the trimmed title is
/// empty, or it equals the current title.
pub fn rename_notebook(workspace: &mut Workspace, notebook_id: &str, new_title: &str) -> bool {
    let Some(notebook) = workspace.notebooks.get_mut(notebook_id) else {
        return false;
    };
    let title = new_title.trim();
    if title.is_empty() || title == notebook.title {
        return false;
    }
    notebook.title = title.to_string();
    true
}

/// Moves a notebook and all of its cells into the recycle bin.
///
/// Every cell listed in the notebook's `cell_order` gets a bin entry unless
/// it already has one; existing entries are left untouched. Returns `None` without mutation when the notebook is
/// not active.
pub fn delete_notebook_soft(
    workspace: &mut Workspace,
    notebook_id: &str,
) -> Option<NotebookDeletion> {
    let notebook = workspace.notebooks.remove(notebook_id)?;
    let deleted_at = now_timestamp();

    let bin = &mut workspace.recycle_bin;
    bin.record_notebook(notebook_id, notebook.title.as_str(), deleted_at.as_str());
    for (index, cell_id) in notebook.cell_order.iter().enumerate() {
        if !bin.cells.contains_key(cell_id) {
            bin.record_cell(cell_id, notebook_id, index, deleted_at.as_str());
        }
    }
    workspace.notebook_order.retain(|id| id != notebook_id);

    let next_notebook_id = workspace
        .notebook_order
        .first()
        .cloned()
        .or_else(|| workspace.notebooks.keys().next().cloned());
    Some(NotebookDeletion { next_notebook_id })
}

/// Restores a notebook from the bin and returns its id.
pub fn restore_notebook_from_bin(workspace: &mut Workspace, notebook_id: &str) -> Option<NotebookId> {
    restore_notebook_from_bin_detailed(workspace, notebook_id).map(|restore| restore.notebook_id)
}

/// Restores a notebook from the bin, reporting reattached and orphaned cells.
///
/// The notebook keeps its id and snapshotted title and is appended to
/// `notebook_order`. Bin cell entries naming it are reattached by ascending
/// `original_index` and become active again. Entries whose cell object is
/// gone are cleared and reported as orphaned.
pub fn restore_notebook_from_bin_detailed(
    workspace: &mut Workspace,
    notebook_id: &str,
) -> Option<NotebookRestore> {
    let snapshot = workspace.recycle_bin.remove_notebook(notebook_id)?;

    let mut notebook = Notebook::with_id(snapshot.id, snapshot.title);
    let mut reattached = Vec::new();
    let mut orphaned = Vec::new();
    for entry in workspace.recycle_bin.cell_entries_for(notebook_id) {
        workspace.recycle_bin.remove_cell(entry.id.as_str());
        match workspace.cells.get_mut(entry.id.as_str()) {
            Some(cell) => {
                cell.soft_deleted = false;
                notebook.cell_order.push(entry.id.clone());
                reattached.push(entry.id);
            }
            None => orphaned.push(entry.id),
        }
    }

    if !orphaned.is_empty() {
        warn!(
            "event=notebook_restore module=ops status=partial orphaned_cells={} reattached_cells={}",
            orphaned.len(),
            reattached.len()
        );
    }

    workspace.notebook_order.retain(|id| id != notebook_id);
    workspace.notebook_order.push(notebook_id.to_string());
    workspace.notebooks.insert(notebook_id.to_string(), notebook);
    recalculate_cell_indexes(workspace, notebook_id);

    Some(NotebookRestore {
        notebook_id: notebook_id.to_string(),
        reattached,
        orphaned,
    })
}

/// Swaps the notebook with its predecessor in `notebook_order`.
pub fn move_notebook_up(workspace: &mut Workspace, notebook_id: &str) -> bool {
    move_notebook(workspace, notebook_id, MoveDirection::Up)
}

/// Swaps the notebook with its successor in `notebook_order`.
pub fn move_notebook_down(workspace: &mut Workspace, notebook_id: &str) -> bool {
    move_notebook(workspace, notebook_id, MoveDirection::Down)
}

fn move_notebook(workspace: &mut Workspace, notebook_id: &str, direction: MoveDirection) -> bool {
    let moved = swap_with_neighbor(&mut workspace.notebook_order, notebook_id, direction);
    if moved {
        debug!(
            "event=notebook_move module=ops status=ok direction={}",
            direction.as_str()
        );
    }
    moved
}
