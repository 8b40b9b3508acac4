//! Cell-level operations.
//!
//! # Invariants
//! - Soft-delete never removes the id from `cell_order`; restore never
//!   re-inserts it.
//! - Hard-delete bypasses the recycle bin entirely.
//! - Locked or hidden cells cannot be soft-deleted.

use super::{swap_with_neighbor, MoveDirection, WorkspaceError};
use crate::model::cell::{Cell, CellKind, CellStateFlag};
use crate::model::now_timestamp;
use crate::model::workspace::Workspace;
use log::debug;

/// Builds an unplaced cell with a fresh id. Does not touch any workspace.
pub fn create_cell(kind: CellKind, initial_source: impl Into<String>) -> Cell {
    Cell::new(kind, initial_source)
}

/// Registers `cell` and inserts its id into the notebook's `cell_order`.
///
/// `position` is honored when it lies in `0..=len`; otherwise the id is
/// appended. An existing cell with the same id is overwritten, and a stale
/// slot for that id in the same notebook is dropped before inserting.
///
/// # Errors
/// - `WorkspaceError::NotebookNotFound` when `notebook_id` is not active.
pub fn add_cell_to_notebook(
    workspace: &mut Workspace,
    notebook_id: &str,
    cell: Cell,
    position: Option<usize>,
) -> Result<(), WorkspaceError> {
    let notebook = workspace
        .notebooks
        .get_mut(notebook_id)
        .ok_or_else(|| WorkspaceError::NotebookNotFound(notebook_id.to_string()))?;

    let cell_id = cell.id.clone();
    notebook.cell_order.retain(|id| *id != cell_id);
    match position {
        Some(index) if index <= notebook.cell_order.len() => {
            notebook.cell_order.insert(index, cell_id.clone());
        }
        _ => notebook.cell_order.push(cell_id.clone()),
    }
    workspace.cells.insert(cell_id, cell);

    recalculate_cell_indexes(workspace, notebook_id);
    Ok(())
}

/// Moves a cell into the recycle bin while keeping its `cell_order` slot.
///
/// Returns `false` without mutation when the notebook or cell is missing,
/// the cell is not listed in that notebook, or it is locked/hidden. A
/// repeated delete keeps the first `original_index` and refreshes
/// `deleted_at` only.
pub fn soft_delete_cell(workspace: &mut Workspace, notebook_id: &str, cell_id: &str) -> bool {
    let Some(notebook) = workspace.notebooks.get(notebook_id) else {
        return false;
    };
    let Some(cell) = workspace.cells.get_mut(cell_id) else {
        return false;
    };
    if cell.is_delete_protected() {
        return false;
    }
    let Some(index) = notebook.position_of(cell_id) else {
        return false;
    };

    let deleted_at = now_timestamp();
    cell.soft_deleted = true;
    workspace
        .recycle_bin
        .record_cell(cell_id, notebook_id, index, deleted_at.as_str());
    true
}

/// Brings a soft-deleted cell back into its notebook's active view.
///
/// Returns `false` when the cell, the notebook, or a bin entry naming that
/// notebook is missing.
pub fn restore_cell_from_bin(workspace: &mut Workspace, notebook_id: &str, cell_id: &str) -> bool {
    if !workspace.notebooks.contains_key(notebook_id) {
        return false;
    }
    let Some(cell) = workspace.cells.get_mut(cell_id) else {
        return false;
    };
    match workspace.recycle_bin.cells.get(cell_id) {
        Some(entry) if entry.notebook_id == notebook_id => {}
        _ => return false,
    }

    cell.soft_deleted = false;
    workspace.recycle_bin.remove_cell(cell_id);
    true
}

/// Permanently removes a cell from a notebook and the cell map.
///
/// Used for kinds that must never be recoverable, such as page breaks.
/// The recycle bin is not consulted. Returns `false` when the cell is not
/// listed in that notebook.
pub fn hard_delete_cell(workspace: &mut Workspace, notebook_id: &str, cell_id: &str) -> bool {
    if !workspace.cells.contains_key(cell_id) {
        return false;
    }
    let Some(notebook) = workspace.notebooks.get_mut(notebook_id) else {
        return false;
    };
    let Some(index) = notebook.position_of(cell_id) else {
        return false;
    };

    notebook.cell_order.remove(index);
    workspace.cells.remove(cell_id);
    recalculate_cell_indexes(workspace, notebook_id);
    true
}

/// Swaps the cell with its predecessor in `cell_order`.
pub fn move_cell_up(workspace: &mut Workspace, notebook_id: &str, cell_id: &str) -> bool {
    move_cell(workspace, notebook_id, cell_id, MoveDirection::Up)
}

/// Swaps the cell with its successor in `cell_order`.
pub fn move_cell_down(workspace: &mut Workspace, notebook_id: &str, cell_id: &str) -> bool {
    move_cell(workspace, notebook_id, cell_id, MoveDirection::Down)
}

fn move_cell(
    workspace: &mut Workspace,
    notebook_id: &str,
    cell_id: &str,
    direction: MoveDirection,
) -> bool {
    let Some(notebook) = workspace.notebooks.get_mut(notebook_id) else {
        return false;
    };
    if !swap_with_neighbor(&mut notebook.cell_order, cell_id, direction) {
        return false;
    }
    debug!(
        "event=cell_move module=ops status=ok direction={} order_len={}",
        direction.as_str(),
        notebook.cell_order.len()
    );
    recalculate_cell_indexes(workspace, notebook_id);
    true
}

/// Replaces the text of a text or python cell.
///
/// Returns `false` for missing cells and page breaks.
pub fn set_cell_source(workspace: &mut Workspace, cell_id: &str, source: impl Into<String>) -> bool {
    workspace
        .cells
        .get_mut(cell_id)
        .is_some_and(|cell| cell.set_source(source))
}

/// Sets one UI-state flag on a cell. Returns `false` when the cell is missing.
pub fn set_cell_state(
    workspace: &mut Workspace,
    cell_id: &str,
    flag: CellStateFlag,
    value: bool,
) -> bool {
    let Some(cell) = workspace.cells.get_mut(cell_id) else {
        return false;
    };
    cell.set_flag(flag, value);
    true
}

/// Rewrites `cell_index` for every cell listed in the notebook's order.
pub fn recalculate_cell_indexes(workspace: &mut Workspace, notebook_id: &str) {
    let Some(notebook) = workspace.notebooks.get(notebook_id) else {
        return;
    };
    for (index, cell_id) in notebook.cell_order.iter().enumerate() {
        if let Some(cell) = workspace.cells.get_mut(cell_id) {
            cell.cell_index = index as i64;
        }
    }
}
