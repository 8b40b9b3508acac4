//! Editing session over one workspace.
//!
//! # Responsibility
//! - Own the live `Workspace` together with UI selection state: current
//!   notebook, selected cell, active/bin view and remembered bin selections.
//! - Turn user intents ("delete the selected cell") into calls on `ops`.
//!
//! # Invariants
//! - The session never mutates the workspace except through `ops`.
//! - `dirty` is set by every successful mutation and cleared by save/open.
//! - Selection ids may go stale after purges; accessors re-check them.

use crate::model::cell::{Cell, CellKind, CellStateFlag};
use crate::model::ids::{CellId, NotebookId};
use crate::model::notebook::{Notebook, DEFAULT_NOTEBOOK_TITLE};
use crate::model::workspace::Workspace;
use crate::ops::cells::{
    add_cell_to_notebook, hard_delete_cell, move_cell_down, move_cell_up, restore_cell_from_bin,
    set_cell_source, set_cell_state, soft_delete_cell,
};
use crate::ops::notebooks::{
    create_notebook, delete_notebook_soft, move_notebook_down, move_notebook_up, rename_notebook,
    restore_notebook_from_bin_detailed, NotebookRestore,
};
use crate::ops::recycle_bin::{empty_recycle_bin, PurgeSummary};
use crate::ops::WorkspaceError;
use crate::persistence::{load_workspace_file, save_workspace_file, PersistError};
use log::debug;
use std::collections::HashMap;
use std::path::Path;

/// Title of the notebook created when a session has none.
pub const DEFAULT_FIRST_NOTEBOOK_TITLE: &str = "Notebook 1 (double click to rename)";

/// Which side of the workspace the UI is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Active,
    Bin,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Bin => "bin",
        }
    }
}

/// One row of the notebook picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookSummary {
    pub id: NotebookId,
    pub title: String,
    pub active_cells: usize,
    pub binned_cells: usize,
}

/// Live workspace plus selection state.
#[derive(Debug, Default)]
pub struct WorkspaceSession {
    workspace: Workspace,
    current_notebook_id: Option<NotebookId>,
    selected_cell_id: Option<CellId>,
    view_mode: ViewMode,
    bin_selected_notebook_id: Option<NotebookId>,
    bin_last_selected_cell: HashMap<NotebookId, CellId>,
    dirty: bool,
}

impl WorkspaceSession {
    /// Creates a session over an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session over `workspace`, resuming its last selected
    /// notebook when that notebook is still active.
    pub fn from_workspace(workspace: Workspace) -> Self {
        let current_notebook_id = workspace
            .last_selected_notebook_id
            .clone()
            .filter(|id| workspace.notebooks.contains_key(id));
        Self {
            workspace,
            current_notebook_id,
            ..Self::default()
        }
    }

    /// Opens a `.luna` file into a fresh session.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        load_workspace_file(path).map(Self::from_workspace)
    }

    /// Writes the workspace to `path` and clears the dirty flag.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        self.workspace.last_selected_notebook_id = self.current_notebook_id.clone();
        save_workspace_file(path, &self.workspace)?;
        self.dirty = false;
        Ok(())
    }

    /// Swaps in another workspace and resets all selection state.
    pub fn replace_workspace(&mut self, workspace: Workspace) {
        *self = Self::from_workspace(workspace);
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current notebook id, if it still names an active notebook.
    pub fn current_notebook_id(&self) -> Option<&str> {
        self.current_notebook_id
            .as_deref()
            .filter(|id| self.workspace.notebooks.contains_key(*id))
    }

    pub fn current_notebook(&self) -> Option<&Notebook> {
        self.current_notebook_id()
            .and_then(|id| self.workspace.notebook(id))
    }

    /// Selected cell id, if the cell still exists.
    pub fn selected_cell_id(&self) -> Option<&str> {
        self.selected_cell_id
            .as_deref()
            .filter(|id| self.workspace.cells.contains_key(*id))
    }

    pub fn bin_selected_notebook_id(&self) -> Option<&str> {
        self.bin_selected_notebook_id.as_deref()
    }

    /// Active notebooks in display order with their cell counts.
    pub fn notebook_list(&self) -> Vec<NotebookSummary> {
        self.workspace
            .ordered_notebooks()
            .into_iter()
            .map(|notebook| NotebookSummary {
                id: notebook.id.clone(),
                title: notebook.title.clone(),
                active_cells: self.workspace.active_cell_ids(&notebook.id).len(),
                binned_cells: self.workspace.soft_deleted_cell_ids(&notebook.id).len(),
            })
            .collect()
    }

    /// Returns a valid current notebook id, creating the default notebook
    /// when the workspace has none.
    ///
    /// Preference: current notebook, then first in `notebook_order`, then
    /// first map key.
    pub fn ensure_default_notebook(&mut self) -> NotebookId {
        if let Some(id) = self.current_notebook_id() {
            return id.to_string();
        }
        let existing = self
            .workspace
            .notebook_order
            .iter()
            .find(|id| self.workspace.notebooks.contains_key(*id))
            .or_else(|| self.workspace.notebooks.keys().next())
            .cloned();
        let id = match existing {
            Some(id) => id,
            None => {
                self.dirty = true;
                create_notebook(&mut self.workspace, DEFAULT_FIRST_NOTEBOOK_TITLE).id
            }
        };
        self.current_notebook_id = Some(id.clone());
        id
    }

    /// Creates a notebook and makes it current. A blank title falls back to
    /// the default title.
    pub fn create_notebook(&mut self, title: &str) -> NotebookId {
        let title = match title.trim() {
            "" => DEFAULT_NOTEBOOK_TITLE,
            trimmed => trimmed,
        };
        let notebook = create_notebook(&mut self.workspace, title);
        self.current_notebook_id = Some(notebook.id.clone());
        self.selected_cell_id = None;
        self.dirty = true;
        notebook.id
    }

    /// Makes an active notebook current and clears the cell selection.
    pub fn select_notebook(&mut self, notebook_id: &str) -> bool {
        if !self.workspace.notebooks.contains_key(notebook_id) {
            return false;
        }
        self.current_notebook_id = Some(notebook_id.to_string());
        self.selected_cell_id = None;
        true
    }

    /// Soft-deletes a notebook. When it was current, the next notebook
    /// reported by the operation becomes current.
    pub fn delete_notebook(&mut self, notebook_id: &str) -> bool {
        let Some(deletion) = delete_notebook_soft(&mut self.workspace, notebook_id) else {
            return false;
        };
        if self.current_notebook_id.as_deref() == Some(notebook_id) {
            self.current_notebook_id = deletion.next_notebook_id;
            self.selected_cell_id = None;
        }
        self.dirty = true;
        true
    }

    pub fn rename_notebook(&mut self, notebook_id: &str, new_title: &str) -> bool {
        let changed = rename_notebook(&mut self.workspace, notebook_id, new_title);
        self.mark(changed)
    }

    pub fn move_current_notebook_up(&mut self) -> bool {
        let Some(id) = self.current_notebook_id.clone() else {
            return false;
        };
        let changed = move_notebook_up(&mut self.workspace, &id);
        self.mark(changed)
    }

    pub fn move_current_notebook_down(&mut self) -> bool {
        let Some(id) = self.current_notebook_id.clone() else {
            return false;
        };
        let changed = move_notebook_down(&mut self.workspace, &id);
        self.mark(changed)
    }

    /// Selects an existing cell.
    pub fn select_cell(&mut self, cell_id: &str) -> bool {
        if !self.workspace.cells.contains_key(cell_id) {
            return false;
        }
        self.selected_cell_id = Some(cell_id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_cell_id = None;
    }

    /// Inserts `cell` into the current notebook directly after the selected
    /// cell, or at the end when nothing in that notebook is selected. The
    /// new cell becomes the selection.
    pub fn insert_cell(&mut self, cell: Cell) -> Result<CellId, WorkspaceError> {
        let notebook_id = self.ensure_default_notebook();
        let position = self.insert_position_after_selection(&notebook_id);
        let cell_id = cell.id.clone();
        add_cell_to_notebook(&mut self.workspace, &notebook_id, cell, position)?;
        self.selected_cell_id = Some(cell_id.clone());
        self.dirty = true;
        Ok(cell_id)
    }

    pub fn add_text_cell(&mut self, source: impl Into<String>) -> Result<CellId, WorkspaceError> {
        self.insert_cell(Cell::new(CellKind::Text, source))
    }

    pub fn add_python_cell(&mut self, source: impl Into<String>) -> Result<CellId, WorkspaceError> {
        self.insert_cell(Cell::new(CellKind::Python, source))
    }

    pub fn add_page_break(&mut self) -> Result<CellId, WorkspaceError> {
        self.insert_cell(Cell::page_break())
    }

    pub fn set_cell_source(&mut self, cell_id: &str, source: impl Into<String>) -> bool {
        let changed = set_cell_source(&mut self.workspace, cell_id, source);
        self.mark(changed)
    }

    /// Returns `false` only for a missing cell; the session becomes dirty
    /// only when the flag actually flips.
    pub fn set_cell_state(&mut self, cell_id: &str, flag: CellStateFlag, value: bool) -> bool {
        let Some(previous) = self.workspace.cell(cell_id).map(|cell| cell.flag(flag)) else {
            return false;
        };
        let applied = set_cell_state(&mut self.workspace, cell_id, flag, value);
        self.mark(applied && previous != value);
        applied
    }

    /// Deletes the selected cell. Its owning notebook becomes current.
    ///
    /// Regular cells are soft-deleted and remembered as the bin selection for
    /// the notebook; page breaks are hard-deleted. The selection then moves
    /// to the next active cell, else the previous one, else it is cleared.
    /// The view stays in active mode.
    pub fn soft_delete_selected_cell(&mut self) -> bool {
        let Some(cell_id) = self.selected_cell_id().map(str::to_string) else {
            return false;
        };
        let Some(notebook_id) = self.owning_notebook_id(&cell_id) else {
            return false;
        };
        let is_page_break = self
            .workspace
            .cell(&cell_id)
            .is_some_and(|cell| cell.kind() == CellKind::PageBreak);
        let neighbor = self.nearest_active_neighbor(&notebook_id, &cell_id);

        let deleted = if is_page_break {
            hard_delete_cell(&mut self.workspace, &notebook_id, &cell_id)
        } else {
            soft_delete_cell(&mut self.workspace, &notebook_id, &cell_id)
        };
        if !deleted {
            return false;
        }
        if !is_page_break {
            self.bin_last_selected_cell
                .insert(notebook_id.clone(), cell_id.clone());
        }
        self.current_notebook_id = Some(notebook_id);
        self.selected_cell_id = neighbor;
        self.dirty = true;
        true
    }

    /// Restores the selected cell into the notebook its bin entry names,
    /// makes that notebook current and returns to active view on success.
    pub fn restore_selected_cell_from_bin(&mut self) -> bool {
        let Some(cell_id) = self.selected_cell_id().map(str::to_string) else {
            return false;
        };
        let Some(notebook_id) = self
            .workspace
            .recycle_bin
            .cells
            .get(&cell_id)
            .map(|entry| entry.notebook_id.clone())
        else {
            return false;
        };
        if !restore_cell_from_bin(&mut self.workspace, &notebook_id, &cell_id) {
            return false;
        }
        if self.bin_last_selected_cell.get(&notebook_id) == Some(&cell_id) {
            self.bin_last_selected_cell.remove(&notebook_id);
        }
        self.set_view_mode(ViewMode::Active);
        self.current_notebook_id = Some(notebook_id);
        self.selected_cell_id = Some(cell_id);
        self.dirty = true;
        true
    }

    pub fn move_selected_cell_up(&mut self) -> bool {
        let Some(cell_id) = self.selected_cell_id().map(str::to_string) else {
            return false;
        };
        let Some(notebook_id) = self.owning_notebook_id(&cell_id) else {
            return false;
        };
        let changed = move_cell_up(&mut self.workspace, &notebook_id, &cell_id);
        if changed {
            self.current_notebook_id = Some(notebook_id);
        }
        self.mark(changed)
    }

    pub fn move_selected_cell_down(&mut self) -> bool {
        let Some(cell_id) = self.selected_cell_id().map(str::to_string) else {
            return false;
        };
        let Some(notebook_id) = self.owning_notebook_id(&cell_id) else {
            return false;
        };
        let changed = move_cell_down(&mut self.workspace, &notebook_id, &cell_id);
        if changed {
            self.current_notebook_id = Some(notebook_id);
        }
        self.mark(changed)
    }

    /// Switches the view. Entering the bin picks a notebook to show: the
    /// previous bin selection, else the current notebook, else the most
    /// recently deleted notebook, else the first active notebook with
    /// soft-deleted cells. Each candidate must still be represented in the
    /// bin.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        debug!(
            "event=view_mode_change module=session status=ok mode={}",
            mode.as_str()
        );
        if mode == ViewMode::Active {
            return;
        }

        let candidate = [
            self.bin_selected_notebook_id.clone(),
            self.current_notebook_id.clone(),
        ]
        .into_iter()
        .flatten()
        .find(|id| self.is_notebook_represented_in_bin(id))
        .or_else(|| self.workspace.recycle_bin.notebook_order.first().cloned())
        .or_else(|| {
            self.workspace
                .ordered_notebooks()
                .into_iter()
                .find(|notebook| !self.workspace.soft_deleted_cell_ids(&notebook.id).is_empty())
                .map(|notebook| notebook.id.clone())
        });

        match candidate {
            Some(id) => self.select_notebook_in_bin(&id),
            None => self.bin_selected_notebook_id = None,
        }
    }

    /// Shows `notebook_id` in the bin view and selects its remembered cell,
    /// or its first soft-deleted cell.
    pub fn select_notebook_in_bin(&mut self, notebook_id: &str) {
        self.view_mode = ViewMode::Bin;
        self.bin_selected_notebook_id = Some(notebook_id.to_string());
        let remembered = self
            .bin_last_selected_cell
            .get(notebook_id)
            .filter(|id| self.workspace.cells.contains_key(*id))
            .cloned();
        self.selected_cell_id = remembered.or_else(|| self.first_soft_deleted_cell_id(notebook_id));
    }

    /// True when the notebook is deleted or has soft-deleted cells.
    pub fn is_notebook_represented_in_bin(&self, notebook_id: &str) -> bool {
        self.workspace
            .recycle_bin
            .notebooks
            .contains_key(notebook_id)
            || !self.workspace.soft_deleted_cell_ids(notebook_id).is_empty()
    }

    /// First binned cell of a notebook.
    ///
    /// Active notebook: first soft-deleted cell in `cell_order`. Deleted
    /// notebook: lowest `original_index` entry whose cell still exists.
    pub fn first_soft_deleted_cell_id(&self, notebook_id: &str) -> Option<CellId> {
        if self.workspace.notebooks.contains_key(notebook_id) {
            return self
                .workspace
                .soft_deleted_cell_ids(notebook_id)
                .first()
                .map(|id| (*id).clone());
        }
        self.workspace
            .recycle_bin
            .cell_entries_for(notebook_id)
            .into_iter()
            .find(|entry| self.workspace.cells.contains_key(&entry.id))
            .map(|entry| entry.id)
    }

    /// Restores a deleted notebook, switches to active view and selects the
    /// notebook's first cell.
    pub fn restore_notebook_from_bin(&mut self, notebook_id: &str) -> Option<NotebookRestore> {
        let restore = restore_notebook_from_bin_detailed(&mut self.workspace, notebook_id)?;
        self.bin_last_selected_cell.remove(notebook_id);
        if self.bin_selected_notebook_id.as_deref() == Some(notebook_id) {
            self.bin_selected_notebook_id = None;
        }
        self.set_view_mode(ViewMode::Active);
        self.current_notebook_id = Some(restore.notebook_id.clone());
        self.selected_cell_id = self
            .workspace
            .active_cell_ids(notebook_id)
            .first()
            .map(|id| (*id).clone());
        self.dirty = true;
        Some(restore)
    }

    /// Purges the bin and forgets every bin-side selection.
    pub fn empty_recycle_bin(&mut self) -> PurgeSummary {
        let summary = empty_recycle_bin(&mut self.workspace);
        self.bin_last_selected_cell.clear();
        self.bin_selected_notebook_id = None;
        if self.selected_cell_id().is_none() {
            self.selected_cell_id = None;
        }
        if self.current_notebook_id().is_none() {
            self.current_notebook_id = None;
        }
        if summary.notebooks_purged > 0 || summary.cells_purged > 0 {
            self.dirty = true;
        }
        summary
    }

    fn mark(&mut self, changed: bool) -> bool {
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Active notebook whose `cell_order` lists `cell_id`.
    fn owning_notebook_id(&self, cell_id: &str) -> Option<NotebookId> {
        self.workspace
            .notebooks
            .values()
            .find(|notebook| notebook.position_of(cell_id).is_some())
            .map(|notebook| notebook.id.clone())
    }

    fn insert_position_after_selection(&self, notebook_id: &str) -> Option<usize> {
        let selected = self.selected_cell_id()?;
        self.workspace
            .notebook(notebook_id)?
            .position_of(selected)
            .map(|index| index + 1)
    }

    fn nearest_active_neighbor(&self, notebook_id: &str, cell_id: &str) -> Option<CellId> {
        let notebook = self.workspace.notebook(notebook_id)?;
        let index = notebook.position_of(cell_id)?;
        let is_active = |id: &&CellId| self.workspace.cell(id).is_some_and(Cell::is_active);
        notebook.cell_order[index + 1..]
            .iter()
            .find(is_active)
            .or_else(|| notebook.cell_order[..index].iter().rev().find(is_active))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{ViewMode, WorkspaceSession, DEFAULT_FIRST_NOTEBOOK_TITLE};
    use crate::model::cell::CellStateFlag;

    #[test]
    fn ensure_default_notebook_creates_once() {
        let mut session = WorkspaceSession::new();
        let first = session.ensure_default_notebook();
        let second = session.ensure_default_notebook();
        assert_eq!(first, second);
        assert_eq!(session.workspace().notebooks.len(), 1);
        assert_eq!(
            session.current_notebook().unwrap().title,
            DEFAULT_FIRST_NOTEBOOK_TITLE
        );
        assert!(session.is_dirty());
    }

    #[test]
    fn insert_goes_after_selection() {
        let mut session = WorkspaceSession::new();
        let a = session.add_text_cell("a").unwrap();
        let c = session.add_text_cell("c").unwrap();
        session.select_cell(&a);
        let b = session.add_text_cell("b").unwrap();

        let order = &session.current_notebook().unwrap().cell_order;
        assert_eq!(order, &vec![a, b.clone(), c]);
        assert_eq!(session.selected_cell_id(), Some(b.as_str()));
    }

    #[test]
    fn soft_delete_moves_selection_to_next_then_previous() {
        let mut session = WorkspaceSession::new();
        let a = session.add_text_cell("a").unwrap();
        let b = session.add_text_cell("b").unwrap();
        let c = session.add_text_cell("c").unwrap();

        session.select_cell(&b);
        assert!(session.soft_delete_selected_cell());
        assert_eq!(session.selected_cell_id(), Some(c.as_str()));

        assert!(session.soft_delete_selected_cell());
        assert_eq!(session.selected_cell_id(), Some(a.as_str()));

        assert!(session.soft_delete_selected_cell());
        assert_eq!(session.selected_cell_id(), None);
        assert_eq!(session.view_mode(), ViewMode::Active);
    }

    #[test]
    fn locked_selected_cell_is_not_deleted() {
        let mut session = WorkspaceSession::new();
        let a = session.add_text_cell("a").unwrap();
        assert!(session.set_cell_state(&a, CellStateFlag::HardLocked, true));
        assert!(!session.soft_delete_selected_cell());
        assert_eq!(session.selected_cell_id(), Some(a.as_str()));
    }

    #[test]
    fn page_break_is_removed_for_good() {
        let mut session = WorkspaceSession::new();
        let a = session.add_text_cell("a").unwrap();
        let page_break = session.add_page_break().unwrap();

        assert!(session.soft_delete_selected_cell());
        assert!(session.workspace().cell(&page_break).is_none());
        assert!(session.workspace().recycle_bin.is_empty());
        assert_eq!(session.selected_cell_id(), Some(a.as_str()));
    }

    #[test]
    fn bin_view_reselects_last_deleted_cell() {
        let mut session = WorkspaceSession::new();
        let notebook_id = session.ensure_default_notebook();
        let a = session.add_text_cell("a").unwrap();
        session.add_text_cell("b").unwrap();
        session.select_cell(&a);
        session.soft_delete_selected_cell();

        session.set_view_mode(ViewMode::Bin);
        assert_eq!(session.bin_selected_notebook_id(), Some(notebook_id.as_str()));
        assert_eq!(session.selected_cell_id(), Some(a.as_str()));

        assert!(session.restore_selected_cell_from_bin());
        assert_eq!(session.view_mode(), ViewMode::Active);
        assert!(session.workspace().cell(&a).unwrap().is_active());
    }

    #[test]
    fn save_clears_dirty_flag() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = WorkspaceSession::new();
        session.add_python_cell("print(1)").unwrap();
        session.save_to(dir.path().join("work")).unwrap();
        assert!(!session.is_dirty());

        let reopened = WorkspaceSession::open(dir.path().join("work.luna")).unwrap();
        assert_eq!(reopened.workspace(), session.workspace());
        assert_eq!(
            reopened.current_notebook_id(),
            session.current_notebook_id()
        );
        assert!(!reopened.is_dirty());
    }
}
