//! Core domain logic for Luna notebooks.
//!
//! The crate owns the workspace model, every mutation on it, the recycle
//! bin lifecycle and the `.luna` persistence pipeline. UI shells call in
//! through `luna_ffi`; nothing here keeps hidden global workspace state.

pub mod logging;
pub mod model;
pub mod naming;
pub mod ops;
pub mod persistence;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cell::{Cell, CellBody, CellKind, CellStateFlag};
pub use model::ids::{CellId, NotebookId};
pub use model::notebook::Notebook;
pub use model::recycle_bin::{RecycleBin, RecycleBinCellEntry, RecycleBinNotebookEntry};
pub use model::workspace::{IntegrityIssue, Workspace, WORKSPACE_VERSION};
pub use ops::WorkspaceError;
pub use persistence::{CodecError, DocumentError, PersistError};
pub use service::session_service::{NotebookSummary, ViewMode, WorkspaceSession};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
