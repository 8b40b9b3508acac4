//! FFI use-case API for the Luna notebook UI.
//!
//! # Responsibility
//! - Expose workspace, notebook, cell and recycle-bin use-cases to Dart via FRB.
//! - Own the single editing session of the process.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The session is only reached through `with_session`, one call at a time.
//! - Failures come back as `ok=false` envelopes with a readable message.

use luna_core::model::cell::{DEFAULT_PYTHON_SOURCE, DEFAULT_TEXT_SOURCE};
use luna_core::naming::{submission_pdf_file_name_now, suggest_workspace_file_name_now};
use luna_core::persistence::ensure_workspace_extension;
use luna_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    WorkspaceSession,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const WORKSPACE_FILE_NAME: &str = "luna_workspace.luna";
const WORKSPACE_PATH_ENV: &str = "LUNA_WORKSPACE_PATH";
static DEFAULT_WORKSPACE_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: OnceLock<Mutex<WorkspaceSession>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Notebook or cell id the action produced or selected, if any.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl WorkspaceActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_flag(ok: bool, success: &str, failure: &str, id: Option<String>) -> Self {
        if ok {
            Self::success(success, id)
        } else {
            Self::failure(failure)
        }
    }
}

/// One notebook row for the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookListItem {
    pub notebook_id: String,
    pub title: String,
    pub active_cells: u32,
    pub binned_cells: u32,
}

/// Notebook list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookListResponse {
    pub items: Vec<NotebookListItem>,
    pub current_notebook_id: Option<String>,
    pub message: String,
}

/// Replaces the session with an empty workspace holding one default notebook.
#[flutter_rust_bridge::frb(sync)]
pub fn workspace_new() -> WorkspaceActionResponse {
    respond(
        with_session(|session| {
            *session = WorkspaceSession::new();
            session.ensure_default_notebook()
        }),
        |notebook_id| WorkspaceActionResponse::success("Workspace created.", Some(notebook_id)),
    )
}

/// Opens a `.luna` file. `None` or blank uses the default workspace path.
///
/// # FFI contract
/// - On failure the current session is left untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn workspace_open(path: Option<String>) -> WorkspaceActionResponse {
    let path = resolve_workspace_path(path);
    let opened = match WorkspaceSession::open(&path) {
        Ok(opened) => opened,
        Err(err) => {
            return WorkspaceActionResponse::failure(format!("workspace_open failed: {err}"));
        }
    };
    respond(
        with_session(|session| {
            *session = opened;
            session.ensure_default_notebook()
        }),
        |notebook_id| WorkspaceActionResponse::success("Workspace opened.", Some(notebook_id)),
    )
}

/// Saves the session to a `.luna` file. `None` or blank uses the default
/// workspace path. Returns the written path as `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn workspace_save(path: Option<String>) -> WorkspaceActionResponse {
    let path = match ensure_workspace_extension(resolve_workspace_path(path)) {
        Ok(path) => path,
        Err(err) => {
            return WorkspaceActionResponse::failure(format!("workspace_save failed: {err}"));
        }
    };
    let saved = with_session(|session| session.save_to(&path).map_err(|err| err.to_string()));
    match saved.and_then(|result| result) {
        Ok(()) => {
            WorkspaceActionResponse::success("Workspace saved.", Some(path.display().to_string()))
        }
        Err(err) => WorkspaceActionResponse::failure(format!("workspace_save failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn notebook_create(title: String) -> WorkspaceActionResponse {
    respond(
        with_session(|session| session.create_notebook(&title)),
        |notebook_id| WorkspaceActionResponse::success("Notebook created.", Some(notebook_id)),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn notebook_rename(notebook_id: String, title: String) -> WorkspaceActionResponse {
    respond(
        with_session(|session| session.rename_notebook(&notebook_id, &title)),
        |renamed| {
            WorkspaceActionResponse::from_flag(
                renamed,
                "Notebook renamed.",
                "Notebook not renamed (missing, blank or unchanged title).",
                Some(notebook_id.clone()),
            )
        },
    )
}

/// Moves a notebook to the recycle bin. `id` is the notebook now current.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_delete(notebook_id: String) -> WorkspaceActionResponse {
    respond(
        with_session(|session| {
            session
                .delete_notebook(&notebook_id)
                .then(|| session.current_notebook_id().map(str::to_string))
        }),
        |deleted| match deleted {
            Some(current) => WorkspaceActionResponse::success("Notebook moved to bin.", current),
            None => WorkspaceActionResponse::failure("Notebook not found."),
        },
    )
}

/// Restores a notebook from the recycle bin and makes it current.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_restore(notebook_id: String) -> WorkspaceActionResponse {
    respond(
        with_session(|session| session.restore_notebook_from_bin(&notebook_id)),
        |restored| match restored {
            Some(restore) if restore.orphaned.is_empty() => {
                WorkspaceActionResponse::success("Notebook restored.", Some(restore.notebook_id))
            }
            Some(restore) => WorkspaceActionResponse::success(
                format!(
                    "Notebook restored; {} missing cell(s) dropped.",
                    restore.orphaned.len()
                ),
                Some(restore.notebook_id),
            ),
            None => WorkspaceActionResponse::failure("Notebook not in recycle bin."),
        },
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn notebook_list() -> NotebookListResponse {
    let listed = with_session(|session| {
        let items = session
            .notebook_list()
            .into_iter()
            .map(|summary| NotebookListItem {
                notebook_id: summary.id,
                title: summary.title,
                active_cells: count_u32(summary.active_cells),
                binned_cells: count_u32(summary.binned_cells),
            })
            .collect::<Vec<_>>();
        (items, session.current_notebook_id().map(str::to_string))
    });
    match listed {
        Ok((items, current_notebook_id)) => NotebookListResponse {
            message: format!("{} notebook(s).", items.len()),
            items,
            current_notebook_id,
        },
        Err(err) => NotebookListResponse {
            items: Vec::new(),
            current_notebook_id: None,
            message: format!("notebook_list failed: {err}"),
        },
    }
}

/// Adds a text cell after the selection in the current notebook.
#[flutter_rust_bridge::frb(sync)]
pub fn cell_add_text(source: Option<String>) -> WorkspaceActionResponse {
    let source = source.unwrap_or_else(|| DEFAULT_TEXT_SOURCE.to_string());
    add_cell(|session| session.add_text_cell(source))
}

/// Adds a python cell after the selection in the current notebook.
#[flutter_rust_bridge::frb(sync)]
pub fn cell_add_python(source: Option<String>) -> WorkspaceActionResponse {
    let source = source.unwrap_or_else(|| DEFAULT_PYTHON_SOURCE.to_string());
    add_cell(|session| session.add_python_cell(source))
}

#[flutter_rust_bridge::frb(sync)]
pub fn cell_set_source(cell_id: String, source: String) -> WorkspaceActionResponse {
    respond(
        with_session(|session| session.set_cell_source(&cell_id, source)),
        |updated| {
            WorkspaceActionResponse::from_flag(
                updated,
                "Cell updated.",
                "Cell not found or has no source.",
                Some(cell_id.clone()),
            )
        },
    )
}

/// Deletes a cell wherever it lives; its notebook becomes current. `id` is
/// the cell selected next.
#[flutter_rust_bridge::frb(sync)]
pub fn cell_soft_delete(cell_id: String) -> WorkspaceActionResponse {
    respond(
        with_session(|session| {
            (session.select_cell(&cell_id) && session.soft_delete_selected_cell())
                .then(|| session.selected_cell_id().map(str::to_string))
        }),
        |deleted| match deleted {
            Some(next) => WorkspaceActionResponse::success("Cell moved to bin.", next),
            None => WorkspaceActionResponse::failure("Cell not deleted (missing or locked)."),
        },
    )
}

/// Restores a binned cell into the notebook it was deleted from.
#[flutter_rust_bridge::frb(sync)]
pub fn cell_restore(cell_id: String) -> WorkspaceActionResponse {
    respond(
        with_session(|session| {
            session.select_cell(&cell_id) && session.restore_selected_cell_from_bin()
        }),
        |restored| {
            WorkspaceActionResponse::from_flag(
                restored,
                "Cell restored.",
                "Cell not in recycle bin.",
                Some(cell_id.clone()),
            )
        },
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn cell_move_up(cell_id: String) -> WorkspaceActionResponse {
    respond(
        with_session(|session| session.select_cell(&cell_id) && session.move_selected_cell_up()),
        |moved| WorkspaceActionResponse::from_flag(moved, "Cell moved.", "Cell not moved.", None),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn cell_move_down(cell_id: String) -> WorkspaceActionResponse {
    respond(
        with_session(|session| session.select_cell(&cell_id) && session.move_selected_cell_down()),
        |moved| WorkspaceActionResponse::from_flag(moved, "Cell moved.", "Cell not moved.", None),
    )
}

/// Permanently purges the recycle bin.
#[flutter_rust_bridge::frb(sync)]
pub fn recycle_bin_empty() -> WorkspaceActionResponse {
    respond(with_session(|session| session.empty_recycle_bin()), |summary| {
        WorkspaceActionResponse::success(
            format!(
                "Recycle bin emptied: {} notebook(s), {} cell(s).",
                summary.notebooks_purged, summary.cells_purged
            ),
            None,
        )
    })
}

/// Suggested `.luna` file name for a save dialog, stamped with local time.
#[flutter_rust_bridge::frb(sync)]
pub fn suggest_workspace_file_name(title: String) -> String {
    suggest_workspace_file_name_now(&title)
}

/// Suggested PDF name for a submission export. Blank name parts are skipped.
#[flutter_rust_bridge::frb(sync)]
pub fn suggest_submission_file_name(
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
) -> String {
    submission_pdf_file_name_now(
        first_name.as_deref(),
        middle_name.as_deref(),
        last_name.as_deref(),
    )
}

fn add_cell(
    f: impl FnOnce(&mut WorkspaceSession) -> Result<String, luna_core::WorkspaceError>,
) -> WorkspaceActionResponse {
    match with_session(|session| f(session).map_err(|err| err.to_string())) {
        Ok(Ok(cell_id)) => WorkspaceActionResponse::success("Cell added.", Some(cell_id)),
        Ok(Err(err)) | Err(err) => {
            WorkspaceActionResponse::failure(format!("cell add failed: {err}"))
        }
    }
}

fn respond<T>(
    result: Result<T, String>,
    f: impl FnOnce(T) -> WorkspaceActionResponse,
) -> WorkspaceActionResponse {
    match result {
        Ok(value) => f(value),
        Err(err) => WorkspaceActionResponse::failure(err),
    }
}

fn with_session<T>(f: impl FnOnce(&mut WorkspaceSession) -> T) -> Result<T, String> {
    let lock = SESSION.get_or_init(|| Mutex::new(WorkspaceSession::new()));
    let mut session = lock.lock().map_err(|_| {
        warn!("event=session_lock module=ffi status=error error_code=poisoned");
        "workspace session is unavailable after an earlier failure".to_string()
    })?;
    Ok(f(&mut session))
}

fn resolve_workspace_path(path: Option<String>) -> PathBuf {
    if let Some(raw) = path {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    DEFAULT_WORKSPACE_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(WORKSPACE_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(WORKSPACE_FILE_NAME)
        })
        .clone()
}

fn count_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        cell_add_python, cell_add_text, cell_move_down, cell_move_up, cell_restore,
        cell_set_source, cell_soft_delete, core_version, init_logging, notebook_create,
        notebook_delete, notebook_list, notebook_rename, notebook_restore, ping,
        recycle_bin_empty, suggest_submission_file_name, suggest_workspace_file_name,
        workspace_new, workspace_open, workspace_save,
    };
    use std::sync::Mutex;

    // The session is process-wide; tests touching it run one at a time.
    static SESSION_GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn notebook_and_cell_flow() {
        let _guard = SESSION_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        let created = workspace_new();
        assert!(created.ok, "{}", created.message);
        let first_notebook = created.id.unwrap();

        let a = cell_add_text(None).id.unwrap();
        let b = cell_add_python(Some("x = 2".to_string())).id.unwrap();
        assert!(cell_set_source(a.clone(), "edited".to_string()).ok);
        assert!(cell_move_up(b.clone()).ok);
        assert!(!cell_move_up(b.clone()).ok);
        assert!(cell_move_down(b.clone()).ok);

        let deleted = cell_soft_delete(a.clone());
        assert!(deleted.ok, "{}", deleted.message);
        assert_eq!(deleted.id, Some(b.clone()));
        assert!(cell_restore(a.clone()).ok);
        assert!(!cell_restore(a).ok);

        let second = notebook_create("Second".to_string()).id.unwrap();
        assert!(notebook_rename(second.clone(), "Renamed".to_string()).ok);
        assert!(!notebook_rename(second.clone(), " ".to_string()).ok);

        let listed = notebook_list();
        assert_eq!(listed.items.len(), 2);
        assert_eq!(listed.current_notebook_id, Some(second.clone()));
        assert_eq!(listed.items[0].active_cells, 2);
        assert_eq!(listed.items[1].title, "Renamed");

        let removed = notebook_delete(second.clone());
        assert_eq!(removed.id, Some(first_notebook));
        assert!(notebook_restore(second.clone()).ok);
        assert!(!notebook_restore(second.clone()).ok);

        notebook_delete(second);
        let emptied = recycle_bin_empty();
        assert!(emptied.message.contains("1 notebook(s)"));
        assert_eq!(notebook_list().items.len(), 1);
    }

    #[test]
    fn cell_actions_reach_cells_outside_current_notebook() {
        let _guard = SESSION_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        let first_notebook = workspace_new().id.unwrap();
        let a = cell_add_text(Some("a".to_string())).id.unwrap();
        let b = cell_add_text(Some("b".to_string())).id.unwrap();
        assert!(cell_soft_delete(b.clone()).ok);
        let second = notebook_create("Second".to_string()).id.unwrap();

        let restored = cell_restore(b.clone());
        assert!(restored.ok, "{}", restored.message);
        assert_eq!(notebook_list().current_notebook_id, Some(first_notebook.clone()));

        notebook_create("Third".to_string());
        let moved = cell_move_up(b.clone());
        assert!(moved.ok, "{}", moved.message);

        notebook_create("Fourth".to_string());
        let deleted = cell_soft_delete(a.clone());
        assert!(deleted.ok, "{}", deleted.message);
        assert_eq!(deleted.id, Some(b));

        let listed = notebook_list();
        let first = listed
            .items
            .iter()
            .find(|item| item.notebook_id == first_notebook)
            .unwrap();
        assert_eq!((first.active_cells, first.binned_cells), (1, 1));
        assert!(listed.items.iter().any(|item| item.notebook_id == second));
    }

    #[test]
    fn save_and_open_round_trip() {
        let _guard = SESSION_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffi").display().to_string();

        workspace_new();
        cell_add_text(Some("persisted".to_string()));
        let saved = workspace_save(Some(path.clone()));
        assert!(saved.ok, "{}", saved.message);
        assert!(saved.id.unwrap().ends_with("ffi.luna"));

        workspace_new();
        let opened = workspace_open(Some(format!("{path}.luna")));
        assert!(opened.ok, "{}", opened.message);
        assert_eq!(notebook_list().items[0].active_cells, 1);

        let missing = workspace_open(Some(dir.path().join("none.luna").display().to_string()));
        assert!(!missing.ok);
        assert_eq!(notebook_list().items[0].active_cells, 1);
    }

    #[test]
    fn suggested_names_carry_extension_and_sanitized_parts() {
        let workspace_name = suggest_workspace_file_name("Lab 4: Loops".to_string());
        assert!(workspace_name.starts_with("Lab-4-Loops-Y"));
        assert!(workspace_name.ends_with(".luna"));

        let pdf_name =
            suggest_submission_file_name(Some("Ada".to_string()), None, Some(" ".to_string()));
        assert!(pdf_name.starts_with("Ada-Y"));
        assert!(pdf_name.ends_with(".pdf"));
    }
}
