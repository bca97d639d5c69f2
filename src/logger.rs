use crate::action::Action;
use crate::reducer::AppState;
use crate::store::{Middleware, Next, Store};
use std::sync::Arc;

/// Logs every action on its way to the reducer.
///
/// For cell edits it also reports tuples the reducer is going to skip
/// (past the spare rows and columns) and tuples whose `old_value` no longer
/// matches the cell. Neither is an error; the reducer applies what it can.
#[derive(Debug, Default)]
pub struct LoggerMiddleware;

impl Middleware<AppState, Action> for LoggerMiddleware {
    fn handle(&self, store: &Store<AppState, Action>, action: Action, next: Next<'_, AppState, Action>) {
        let prev = store.state();
        log::debug!("action {}", action.kind());

        if let Action::ApplyDataChanges { changes } = &action {
            let settings = prev.settings();
            for change in changes {
                if !settings.accepts(change.row, change.column) {
                    log::warn!("skipping edit outside the grid at {}", change);
                    continue;
                }
                let current = settings
                    .data
                    .get(change.row, change.column)
                    .cloned()
                    .unwrap_or_default();
                if current != change.old_value {
                    log::debug!("stale edit at {}, cell holds '{}'", change, current);
                } else {
                    log::trace!("edit {}", change);
                }
            }
        }

        next.run(action);

        if Arc::ptr_eq(&prev, &store.state()) {
            log::trace!("state unchanged");
        }
    }
}
