use crate::action::Action;
use crate::router::{RouterState, router_reducer};
use crate::settings::{GridSettings, WorkbookState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Root of the state tree: one slice per reducer.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct AppState {
    pub router: Arc<RouterState>,
    pub workbook: Arc<WorkbookState>,
}

impl AppState {
    pub fn new(router: RouterState, workbook: WorkbookState) -> Self {
        AppState {
            router: Arc::new(router),
            workbook: Arc::new(workbook),
        }
    }

    pub fn settings(&self) -> &GridSettings {
        &self.workbook.settings
    }
}

/// Transition for the workbook slice, driven by grid widget callbacks.
///
/// Total and side-effect free:
/// - `ApplyDataChanges` always yields a fresh state, even for an empty batch.
///   Changes inside the spare rows and columns grow the data; changes past
///   them are skipped. `old_value` is never checked against the cell it
///   claims to replace.
/// - `SetReadOnly` yields a fresh state whose `data` is the same allocation.
/// - Everything else returns `state` itself.
pub fn workbook_reducer(state: &Arc<WorkbookState>, action: &Action) -> Arc<WorkbookState> {
    match action {
        Action::ApplyDataChanges { changes } => {
            let settings = GridSettings {
                data: state
                    .settings
                    .data
                    .with_changes(changes, state.settings.declared_bounds()),
                ..state.settings.clone()
            };
            Arc::new(WorkbookState { settings })
        }

        Action::SetReadOnly { read_only } => {
            let settings = GridSettings {
                read_only: *read_only,
                ..state.settings.clone()
            };
            Arc::new(WorkbookState { settings })
        }

        Action::LocationChange { .. } | Action::CallHistoryMethod { .. } | Action::Unknown => {
            Arc::clone(state)
        }
    }
}

/// Runs every slice reducer. When no slice changed the previous root is
/// returned as-is.
pub fn root_reducer(state: &Arc<AppState>, action: &Action) -> Arc<AppState> {
    let router = router_reducer(&state.router, action);
    let workbook = workbook_reducer(&state.workbook, action);

    if Arc::ptr_eq(&router, &state.router) && Arc::ptr_eq(&workbook, &state.workbook) {
        return Arc::clone(state);
    }

    Arc::new(AppState { router, workbook })
}
