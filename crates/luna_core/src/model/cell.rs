//! Cell domain model.
//!
//! # Responsibility
//! - Define the notebook cell record and its kind-specific payload.
//! - Provide lifecycle helpers for soft-delete and lock semantics.
//!
//! # Invariants
//! - `id` is stable and never reused for another cell.
//! - `soft_deleted` is the source of truth for recycle-bin visibility.
//! - `cell_index == UNPLACED_CELL_INDEX` until the cell is placed in a notebook.

use super::ids::{new_id, CellId};
use super::now_timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Sentinel `cell_index` for a cell that has not been placed yet.
pub const UNPLACED_CELL_INDEX: i64 = -1;

/// Default source for newly created text cells.
pub const DEFAULT_TEXT_SOURCE: &str = "New text cell";

/// Default source for newly created python cells.
pub const DEFAULT_PYTHON_SOURCE: &str = "# New Python cell";

/// Cell discriminant without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Rich-text cell.
    Text,
    /// Python code cell.
    Python,
    /// Page-break marker. Never recoverable once removed.
    PageBreak,
}

impl CellKind {
    /// Stable label used in the document format and in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Python => "python",
            Self::PageBreak => "page-break",
        }
    }
}

impl Display for CellKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific cell payload.
///
/// Serialized inline with the cell, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CellBody {
    Text { source: String },
    Python { source: String },
    PageBreak,
}

impl CellBody {
    /// Builds a payload for `kind`; page breaks ignore `source`.
    pub fn new(kind: CellKind, source: impl Into<String>) -> Self {
        match kind {
            CellKind::Text => Self::Text {
                source: source.into(),
            },
            CellKind::Python => Self::Python {
                source: source.into(),
            },
            CellKind::PageBreak => Self::PageBreak,
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Self::Text { .. } => CellKind::Text,
            Self::Python { .. } => CellKind::Python,
            Self::PageBreak => CellKind::PageBreak,
        }
    }
}

/// Independent UI-state booleans that can be toggled on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStateFlag {
    HardLocked,
    SoftLocked,
    Hidden,
    Flagged,
}

/// Canonical cell record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Stable id, unique across the workspace.
    pub id: CellId,
    #[serde(flatten)]
    pub body: CellBody,
    /// Denormalized position inside the owning notebook's `cell_order`.
    #[serde(default = "unplaced_index")]
    pub cell_index: i64,
    /// Recycle-bin tombstone. The id stays in its notebook's `cell_order`.
    #[serde(default)]
    pub soft_deleted: bool,
    #[serde(default)]
    pub hard_locked: bool,
    #[serde(default)]
    pub soft_locked: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub flagged: bool,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 last-modification time.
    pub updated_at: String,
}

fn unplaced_index() -> i64 {
    UNPLACED_CELL_INDEX
}

impl Cell {
    /// Creates an unplaced cell with a generated id.
    ///
    /// # Invariants
    /// - `cell_index` starts as `UNPLACED_CELL_INDEX`.
    /// - All state flags start as `false`.
    pub fn new(kind: CellKind, source: impl Into<String>) -> Self {
        Self::with_id(new_id(), kind, source)
    }

    /// Creates an unplaced cell with a caller-provided id.
    ///
    /// Used by import paths where identity already exists.
    pub fn with_id(id: impl Into<CellId>, kind: CellKind, source: impl Into<String>) -> Self {
        let now = now_timestamp();
        Self {
            id: id.into(),
            body: CellBody::new(kind, source),
            cell_index: UNPLACED_CELL_INDEX,
            soft_deleted: false,
            hard_locked: false,
            soft_locked: false,
            hidden: false,
            flagged: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn text(source: impl Into<String>) -> Self {
        Self::new(CellKind::Text, source)
    }

    pub fn python(source: impl Into<String>) -> Self {
        Self::new(CellKind::Python, source)
    }

    pub fn page_break() -> Self {
        Self::new(CellKind::PageBreak, "")
    }

    pub fn kind(&self) -> CellKind {
        self.body.kind()
    }

    /// Text content, or `None` for page breaks.
    pub fn source(&self) -> Option<&str> {
        match &self.body {
            CellBody::Text { source } | CellBody::Python { source } => Some(source.as_str()),
            CellBody::PageBreak => None,
        }
    }

    /// Replaces text content. Returns `false` for page breaks.
    pub fn set_source(&mut self, value: impl Into<String>) -> bool {
        match &mut self.body {
            CellBody::Text { source } | CellBody::Python { source } => {
                *source = value.into();
                self.touch();
                true
            }
            CellBody::PageBreak => false,
        }
    }

    pub fn flag(&self, flag: CellStateFlag) -> bool {
        match flag {
            CellStateFlag::HardLocked => self.hard_locked,
            CellStateFlag::SoftLocked => self.soft_locked,
            CellStateFlag::Hidden => self.hidden,
            CellStateFlag::Flagged => self.flagged,
        }
    }

    /// Sets one state flag. Returns whether the value changed.
    pub fn set_flag(&mut self, flag: CellStateFlag, value: bool) -> bool {
        let slot = match flag {
            CellStateFlag::HardLocked => &mut self.hard_locked,
            CellStateFlag::SoftLocked => &mut self.soft_locked,
            CellStateFlag::Hidden => &mut self.hidden,
            CellStateFlag::Flagged => &mut self.flagged,
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        self.touch();
        true
    }

    /// Whether soft-delete is currently forbidden for this cell.
    pub fn is_delete_protected(&self) -> bool {
        self.soft_locked || self.hard_locked || self.hidden
    }

    /// Returns whether this cell should appear in active views.
    pub fn is_active(&self) -> bool {
        !self.soft_deleted
    }

    fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}
