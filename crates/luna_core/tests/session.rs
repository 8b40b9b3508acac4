use luna_core::model::cell::DEFAULT_TEXT_SOURCE;
use luna_core::{CellStateFlag, ViewMode, Workspace, WorkspaceSession};
use tempfile::tempdir;

#[test]
fn create_select_and_delete_notebooks() {
    let mut session = WorkspaceSession::new();
    let first = session.create_notebook("First");
    let second = session.create_notebook("   ");

    assert_eq!(session.current_notebook_id(), Some(second.as_str()));
    assert_eq!(session.current_notebook().unwrap().title, "Untitled Notebook");
    assert!(session.select_notebook(&first));
    assert!(!session.select_notebook("missing"));

    assert!(session.delete_notebook(&first));
    assert_eq!(session.current_notebook_id(), Some(second.as_str()));
    assert!(!session.delete_notebook(&first));

    let titles = session
        .notebook_list()
        .into_iter()
        .map(|summary| summary.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Untitled Notebook".to_string()]);
}

#[test]
fn notebook_list_counts_active_and_binned_cells() {
    let mut session = WorkspaceSession::new();
    session.add_text_cell(DEFAULT_TEXT_SOURCE).unwrap();
    session.add_python_cell("x = 1").unwrap();
    session.soft_delete_selected_cell();

    let list = session.notebook_list();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].active_cells, 1);
    assert_eq!(list[0].binned_cells, 1);
}

#[test]
fn bin_view_falls_back_to_most_recent_deleted_notebook() {
    let mut session = WorkspaceSession::new();
    let keep = session.create_notebook("Keep");
    let gone = session.create_notebook("Gone");
    let cell = session.add_text_cell("inside").unwrap();
    session.select_notebook(&keep);
    session.delete_notebook(&gone);

    session.set_view_mode(ViewMode::Bin);

    assert_eq!(session.view_mode(), ViewMode::Bin);
    assert!(session.is_notebook_represented_in_bin(&gone));
    assert!(!session.is_notebook_represented_in_bin(&keep));
    assert_eq!(session.bin_selected_notebook_id(), Some(gone.as_str()));
    assert_eq!(session.first_soft_deleted_cell_id(&gone), Some(cell.clone()));
    assert_eq!(session.selected_cell_id(), Some(cell.as_str()));
}

#[test]
fn bin_view_without_content_selects_nothing() {
    let mut session = WorkspaceSession::new();
    session.add_text_cell("a").unwrap();
    session.set_view_mode(ViewMode::Bin);
    assert_eq!(session.bin_selected_notebook_id(), None);
}

#[test]
fn restoring_notebook_returns_to_active_view() {
    let mut session = WorkspaceSession::new();
    let gone = session.create_notebook("Gone");
    let first = session.add_text_cell("one").unwrap();
    session.add_text_cell("two").unwrap();
    session.create_notebook("Other");
    session.delete_notebook(&gone);
    session.set_view_mode(ViewMode::Bin);

    let restore = session.restore_notebook_from_bin(&gone).unwrap();

    assert!(restore.orphaned.is_empty());
    assert_eq!(session.view_mode(), ViewMode::Active);
    assert_eq!(session.current_notebook_id(), Some(gone.as_str()));
    assert_eq!(session.selected_cell_id(), Some(first.as_str()));
    assert!(session.restore_notebook_from_bin(&gone).is_none());
}

#[test]
fn emptying_bin_forgets_bin_selection() {
    let mut session = WorkspaceSession::new();
    let cell = session.add_text_cell("a").unwrap();
    session.soft_delete_selected_cell();
    session.set_view_mode(ViewMode::Bin);
    assert_eq!(session.selected_cell_id(), Some(cell.as_str()));

    let summary = session.empty_recycle_bin();

    assert_eq!(summary.cells_purged, 1);
    assert_eq!(session.bin_selected_notebook_id(), None);
    assert_eq!(session.selected_cell_id(), None);
    assert!(session.workspace().recycle_bin.is_empty());
}

#[test]
fn moving_selected_cell_and_current_notebook() {
    let mut session = WorkspaceSession::new();
    let a = session.add_text_cell("a").unwrap();
    let b = session.add_text_cell("b").unwrap();

    assert!(session.move_selected_cell_up());
    assert_eq!(
        session.current_notebook().unwrap().cell_order,
        vec![b.clone(), a.clone()]
    );
    assert!(!session.move_selected_cell_up());
    assert!(session.move_selected_cell_down());

    let first = session.current_notebook_id().unwrap().to_string();
    session.create_notebook("Second");
    assert!(session.move_current_notebook_up());
    assert_eq!(session.workspace().notebook_order[1], first);
    assert!(!session.move_current_notebook_up());
}

#[test]
fn replace_workspace_resets_selection() {
    let mut session = WorkspaceSession::new();
    session.add_text_cell("a").unwrap();
    session.set_view_mode(ViewMode::Bin);

    session.replace_workspace(Workspace::new());

    assert_eq!(session.view_mode(), ViewMode::Active);
    assert_eq!(session.selected_cell_id(), None);
    assert_eq!(session.current_notebook_id(), None);
    assert!(!session.is_dirty());
}

#[test]
fn open_resumes_last_selected_notebook() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resume.luna");
    let mut session = WorkspaceSession::new();
    session.create_notebook("One");
    let two = session.create_notebook("Two");
    session.save_to(&path).unwrap();

    let reopened = WorkspaceSession::open(&path).unwrap();
    assert_eq!(reopened.current_notebook_id(), Some(two.as_str()));
    assert_eq!(reopened.notebook_list().len(), 2);
}

#[test]
fn cell_actions_follow_the_cell_owner_not_the_current_notebook() {
    let mut session = WorkspaceSession::new();
    let first = session.create_notebook("First");
    let a = session.add_text_cell("a").unwrap();
    let b = session.add_text_cell("b").unwrap();
    let binned = session.add_text_cell("binned").unwrap();
    assert!(session.soft_delete_selected_cell());
    let second = session.create_notebook("Second");
    assert_eq!(session.current_notebook_id(), Some(second.as_str()));

    assert!(session.select_cell(&binned));
    assert!(session.restore_selected_cell_from_bin());
    assert_eq!(session.current_notebook_id(), Some(first.as_str()));
    assert!(!session.workspace().cell(&binned).unwrap().soft_deleted);

    session.select_notebook(&second);
    assert!(session.select_cell(&b));
    assert!(session.move_selected_cell_up());
    assert_eq!(
        session.workspace().notebook(&first).unwrap().cell_order,
        vec![b.clone(), a.clone(), binned.clone()]
    );
    assert_eq!(session.current_notebook_id(), Some(first.as_str()));

    session.select_notebook(&second);
    assert!(session.select_cell(&a));
    assert!(session.soft_delete_selected_cell());
    assert!(session.workspace().cell(&a).unwrap().soft_deleted);
    assert_eq!(session.current_notebook_id(), Some(first.as_str()));
    assert_eq!(session.selected_cell_id(), Some(binned.as_str()));
}

#[test]
fn restore_without_bin_entry_is_rejected() {
    let mut session = WorkspaceSession::new();
    let a = session.add_text_cell("a").unwrap();
    assert!(session.select_cell(&a));
    assert!(!session.restore_selected_cell_from_bin());
}

#[test]
fn unchanged_cell_state_keeps_session_clean() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.luna");
    let mut session = WorkspaceSession::new();
    let a = session.add_text_cell("a").unwrap();
    session.save_to(&path).unwrap();

    assert!(session.set_cell_state(&a, CellStateFlag::Flagged, false));
    assert!(!session.is_dirty());
    assert!(session.set_cell_state(&a, CellStateFlag::Flagged, true));
    assert!(session.is_dirty());
    assert!(!session.set_cell_state("missing", CellStateFlag::Flagged, true));
}
