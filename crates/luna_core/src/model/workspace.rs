//! Workspace aggregate root.
//!
//! # Responsibility
//! - Hold notebooks, the flat cell map, notebook display order and the
//!   recycle bin as one value.
//! - Provide read-only views (active cells, ordered notebooks) and a
//!   structural integrity report.
//!
//! # Invariants
//! - Exactly one `Workspace` is live per session; operations receive it by
//!   `&mut` and never keep references across calls.
//! - `notebook_order` holds exactly the keys of `notebooks`, once each.

use super::cell::Cell;
use super::ids::{CellId, NotebookId};
use super::notebook::Notebook;
use super::recycle_bin::RecycleBin;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Display, Formatter};

/// The only document version this build reads and writes.
pub const WORKSPACE_VERSION: u32 = 1;

/// Root document persisted in `.luna` files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub version: u32,
    #[serde(default)]
    pub notebooks: BTreeMap<NotebookId, Notebook>,
    #[serde(default)]
    pub cells: BTreeMap<CellId, Cell>,
    #[serde(default)]
    pub notebook_order: Vec<NotebookId>,
    #[serde(default)]
    pub recycle_bin: RecycleBin,
    /// Session hint only; not semantically load-bearing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_selected_notebook_id: Option<NotebookId>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Creates an empty workspace at the current document version.
    pub fn new() -> Self {
        Self {
            version: WORKSPACE_VERSION,
            notebooks: BTreeMap::new(),
            cells: BTreeMap::new(),
            notebook_order: Vec::new(),
            recycle_bin: RecycleBin::default(),
            last_selected_notebook_id: None,
        }
    }

    pub fn notebook(&self, notebook_id: &str) -> Option<&Notebook> {
        self.notebooks.get(notebook_id)
    }

    pub fn cell(&self, cell_id: &str) -> Option<&Cell> {
        self.cells.get(cell_id)
    }

    /// Active notebooks in display order.
    ///
    /// Falls back to map order when `notebook_order` is empty, so documents
    /// written without an order still list their notebooks.
    pub fn ordered_notebooks(&self) -> Vec<&Notebook> {
        if self.notebook_order.is_empty() {
            return self.notebooks.values().collect();
        }
        self.notebook_order
            .iter()
            .filter_map(|id| self.notebooks.get(id))
            .collect()
    }

    /// Ids of the notebook's cells that are visible in the active view.
    ///
    /// This is the single place that applies the `!soft_deleted` filter.
    pub fn active_cell_ids(&self, notebook_id: &str) -> Vec<&CellId> {
        self.cell_ids_where(notebook_id, Cell::is_active)
    }

    /// Ids of the notebook's cells that are currently in the recycle bin.
    pub fn soft_deleted_cell_ids(&self, notebook_id: &str) -> Vec<&CellId> {
        self.cell_ids_where(notebook_id, |cell| cell.soft_deleted)
    }

    fn cell_ids_where(&self, notebook_id: &str, keep: impl Fn(&Cell) -> bool) -> Vec<&CellId> {
        let Some(notebook) = self.notebooks.get(notebook_id) else {
            return Vec::new();
        };
        notebook
            .cell_order
            .iter()
            .filter(|id| self.cells.get(id.as_str()).is_some_and(&keep))
            .collect()
    }

    /// Reports every structural inconsistency found in this workspace.
    ///
    /// An empty result means all lifecycle invariants hold.
    pub fn check_integrity(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        let bin = &self.recycle_bin;

        let mut seen_in_order = HashSet::new();
        for id in &self.notebook_order {
            if !seen_in_order.insert(id.as_str()) {
                issues.push(IntegrityIssue::DuplicateNotebookOrderEntry(id.clone()));
            }
            if !self.notebooks.contains_key(id) {
                issues.push(IntegrityIssue::OrderedNotebookMissing(id.clone()));
            }
        }
        for id in self.notebooks.keys() {
            if !seen_in_order.contains(id.as_str()) {
                issues.push(IntegrityIssue::UnorderedNotebook(id.clone()));
            }
            if bin.notebooks.contains_key(id) {
                issues.push(IntegrityIssue::NotebookActiveAndBinned(id.clone()));
            }
        }

        let mut owner_by_cell: HashMap<&str, &str> = HashMap::new();
        for notebook in self.notebooks.values() {
            for cell_id in &notebook.cell_order {
                if !self.cells.contains_key(cell_id) {
                    issues.push(IntegrityIssue::DanglingCellRef {
                        notebook_id: notebook.id.clone(),
                        cell_id: cell_id.clone(),
                    });
                }
                if owner_by_cell
                    .insert(cell_id.as_str(), notebook.id.as_str())
                    .is_some()
                {
                    issues.push(IntegrityIssue::DuplicateCellRef(cell_id.clone()));
                }
            }
        }

        for (cell_id, cell) in &self.cells {
            let in_bin = bin.cells.contains_key(cell_id);
            if cell.soft_deleted && !in_bin {
                issues.push(IntegrityIssue::SoftDeletedWithoutBinEntry(cell_id.clone()));
            }
            if !owner_by_cell.contains_key(cell_id.as_str()) && !in_bin {
                issues.push(IntegrityIssue::UnreachableCell(cell_id.clone()));
            }
        }

        check_order_matches_keys(
            "recycleBin.cellOrder",
            &bin.cell_order,
            bin.cells.keys(),
            &mut issues,
        );
        check_order_matches_keys(
            "recycleBin.notebookOrder",
            &bin.notebook_order,
            bin.notebooks.keys(),
            &mut issues,
        );

        issues
    }
}

fn check_order_matches_keys<'a>(
    collection: &'static str,
    order: &[String],
    keys: impl Iterator<Item = &'a String>,
    issues: &mut Vec<IntegrityIssue>,
) {
    let ordered = order.iter().map(String::as_str).collect::<HashSet<_>>();
    if ordered.len() != order.len() {
        issues.push(IntegrityIssue::BinOrderMismatch {
            collection,
            id: "<duplicate>".to_string(),
        });
    }
    let mut key_set = HashSet::new();
    for key in keys {
        key_set.insert(key.as_str());
        if !ordered.contains(key.as_str()) {
            issues.push(IntegrityIssue::BinOrderMismatch {
                collection,
                id: key.clone(),
            });
        }
    }
    for id in order {
        if !key_set.contains(id.as_str()) {
            issues.push(IntegrityIssue::BinOrderMismatch {
                collection,
                id: id.clone(),
            });
        }
    }
}

/// One violated structural invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// `notebook_order` names a notebook that is not active.
    OrderedNotebookMissing(NotebookId),
    /// Active notebook missing from `notebook_order`.
    UnorderedNotebook(NotebookId),
    /// `notebook_order` contains the same id more than once.
    DuplicateNotebookOrderEntry(NotebookId),
    /// Notebook is both active and in the recycle bin.
    NotebookActiveAndBinned(NotebookId),
    /// `cell_order` entry with no cell object.
    DanglingCellRef {
        notebook_id: NotebookId,
        cell_id: CellId,
    },
    /// Cell id listed more than once across all `cell_order` arrays.
    DuplicateCellRef(CellId),
    /// Cell flagged soft-deleted but absent from the recycle bin.
    SoftDeletedWithoutBinEntry(CellId),
    /// Cell object referenced by no notebook and no bin entry.
    UnreachableCell(CellId),
    /// Recycle-bin order array out of sync with its map.
    BinOrderMismatch {
        collection: &'static str,
        id: String,
    },
}

impl Display for IntegrityIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderedNotebookMissing(id) => {
                write!(f, "notebookOrder references missing notebook {id}")
            }
            Self::UnorderedNotebook(id) => write!(f, "notebook {id} missing from notebookOrder"),
            Self::DuplicateNotebookOrderEntry(id) => {
                write!(f, "notebook {id} listed twice in notebookOrder")
            }
            Self::NotebookActiveAndBinned(id) => {
                write!(f, "notebook {id} is both active and in the recycle bin")
            }
            Self::DanglingCellRef {
                notebook_id,
                cell_id,
            } => write!(f, "notebook {notebook_id} references missing cell {cell_id}"),
            Self::DuplicateCellRef(id) => write!(f, "cell {id} listed in more than one slot"),
            Self::SoftDeletedWithoutBinEntry(id) => {
                write!(f, "cell {id} is soft-deleted without a recycle bin entry")
            }
            Self::UnreachableCell(id) => write!(f, "cell {id} is not reachable"),
            Self::BinOrderMismatch { collection, id } => {
                write!(f, "{collection} out of sync at {id}")
            }
        }
    }
}
