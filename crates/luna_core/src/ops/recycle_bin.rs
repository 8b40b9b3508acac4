//! Permanent purge of recycle-bin contents.
//!
//! # Invariants
//! - Purge is the only path that frees cell and notebook ids for good.
//! - After `empty_recycle_bin` the bin is empty and no cell is soft-deleted.

use super::cells::recalculate_cell_indexes;
use crate::model::workspace::Workspace;
use log::info;
use std::collections::BTreeSet;

/// Counts reported by a purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    pub notebooks_purged: usize,
    pub cells_purged: usize,
}

/// Permanently deletes every notebook and cell currently in the bin.
///
/// Cells of deleted notebooks are dropped together with their notebook.
/// Cells soft-deleted from notebooks that are still active are removed from
/// those notebooks' `cell_order`, and the affected notebooks get their
/// `cell_index` values recomputed.
pub fn empty_recycle_bin(workspace: &mut Workspace) -> PurgeSummary {
    let mut summary = PurgeSummary::default();

    let binned_notebooks = workspace.recycle_bin.notebook_order.clone();
    for notebook_id in &binned_notebooks {
        for entry in workspace.recycle_bin.cell_entries_for(notebook_id) {
            workspace.cells.remove(entry.id.as_str());
            workspace.recycle_bin.remove_cell(entry.id.as_str());
            summary.cells_purged += 1;
        }
        workspace.notebooks.remove(notebook_id.as_str());
        workspace.notebook_order.retain(|id| id != notebook_id);
        workspace.recycle_bin.remove_notebook(notebook_id);
        summary.notebooks_purged += 1;
    }

    let mut affected = BTreeSet::new();
    let binned_cells = workspace.recycle_bin.cell_order.clone();
    for cell_id in &binned_cells {
        let Some(entry) = workspace.recycle_bin.remove_cell(cell_id) else {
            continue;
        };
        if let Some(notebook) = workspace.notebooks.get_mut(entry.notebook_id.as_str()) {
            notebook.cell_order.retain(|id| id != cell_id);
            affected.insert(entry.notebook_id);
        }
        workspace.cells.remove(cell_id.as_str());
        summary.cells_purged += 1;
    }

    // Soft-deleted cells with no bin entry (hand-edited documents) go too.
    let strays = workspace
        .cells
        .values()
        .filter(|cell| cell.soft_deleted)
        .map(|cell| cell.id.clone())
        .collect::<Vec<_>>();
    for cell_id in &strays {
        for notebook in workspace.notebooks.values_mut() {
            if notebook.position_of(cell_id).is_some() {
                notebook.cell_order.retain(|id| id != cell_id);
                affected.insert(notebook.id.clone());
            }
        }
        workspace.cells.remove(cell_id.as_str());
        summary.cells_purged += 1;
    }

    workspace.recycle_bin.clear();
    for notebook_id in &affected {
        recalculate_cell_indexes(workspace, notebook_id);
    }

    info!(
        "event=recycle_bin_empty module=ops status=ok notebooks={} cells={}",
        summary.notebooks_purged, summary.cells_purged
    );
    summary
}
