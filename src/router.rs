//! Keeps the store and the navigation history in step.
//!
//! The history is the source of truth for "where the user is". Navigation
//! requested through the store goes to the history via [`RouterMiddleware`],
//! and every history transition comes back into the store as a
//! `LOCATION_CHANGE` action through [`connect_router`].

use crate::action::{Action, HistoryMethod, location_change};
use crate::history::{History, HistoryAction, ListenerId, Location};
use crate::reducer::AppState;
use crate::store::{Middleware, Next, Store};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

lazy_static! {
    static ref PARAM_REGEX: Regex = Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").unwrap();
}

/// Router slice of the application state.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct RouterState {
    pub location: Location,
    pub action: HistoryAction,
}

impl RouterState {
    /// Initial slice for a freshly created history.
    pub fn from_history(history: &History) -> Self {
        RouterState {
            location: history.location(),
            action: HistoryAction::Pop,
        }
    }
}

pub fn router_reducer(state: &Arc<RouterState>, action: &Action) -> Arc<RouterState> {
    match action {
        Action::LocationChange { payload } => Arc::new(payload.clone()),
        _ => Arc::clone(state),
    }
}

/// Applies `CALL_HISTORY_METHOD` actions to the history. Those actions stop
/// here; everything else is forwarded.
pub struct RouterMiddleware {
    history: History,
}

impl RouterMiddleware {
    pub fn new(history: History) -> Self {
        RouterMiddleware { history }
    }
}

impl Middleware<AppState, Action> for RouterMiddleware {
    fn handle(&self, _store: &Store<AppState, Action>, action: Action, next: Next<'_, AppState, Action>) {
        match action {
            Action::CallHistoryMethod { payload } => match payload {
                HistoryMethod::Push(path) => self.history.push(&path),
                HistoryMethod::Replace(path) => self.history.replace(&path),
                HistoryMethod::Go(delta) => self.history.go(delta),
                HistoryMethod::GoBack => self.history.go_back(),
                HistoryMethod::GoForward => self.history.go_forward(),
            },
            other => next.run(other),
        }
    }
}

/// Dispatch `LOCATION_CHANGE` into `store` whenever `history` moves.
///
/// The listener only holds a weak handle, so the history (which the router
/// middleware keeps inside the store) does not keep the store alive.
pub fn connect_router(store: &Store<AppState, Action>, history: &History) -> ListenerId {
    let weak = store.downgrade();
    history.listen(move |location, action| {
        if let Some(store) = weak.upgrade() {
            store.dispatch(location_change(location.clone(), action));
        }
    })
}

/// Result of matching a route pattern against a pathname.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub path: String,
    pub url: String,
    pub is_exact: bool,
    pub params: BTreeMap<String, String>,
}

/// Match `pathname` against a pattern such as `/workbook/:name`.
///
/// `:name` segments capture one path segment each. Without `exact` the
/// pattern only has to match a prefix ending on a segment boundary. A
/// trailing slash on either side is ignored.
pub fn match_path(pattern: &str, pathname: &str, exact: bool) -> Option<RouteMatch> {
    let trimmed = pattern.trim_end_matches('/');

    let mut names = Vec::new();
    let mut body = String::new();
    let mut last = 0;
    for caps in PARAM_REGEX.captures_iter(trimmed) {
        let whole = caps.get(0)?;
        body.push_str(&regex::escape(&trimmed[last..whole.start()]));
        body.push_str("([^/]+)");
        names.push(caps[1].to_string());
        last = whole.end();
    }
    body.push_str(&regex::escape(&trimmed[last..]));

    let source = if exact {
        format!("^{}/?$", body)
    } else {
        format!("^{}(?:/|$)", body)
    };
    let re = match Regex::new(&source) {
        Ok(re) => re,
        Err(e) => {
            log::warn!("invalid route pattern {}: {}", pattern, e);
            return None;
        }
    };

    let caps = re.captures(pathname)?;
    let matched = caps.get(0)?.as_str();
    let url = match matched.trim_end_matches('/') {
        "" => "/".to_string(),
        url => url.to_string(),
    };

    let params = names
        .into_iter()
        .enumerate()
        .filter_map(|(i, name)| caps.get(i + 1).map(|m| (name, m.as_str().to_string())))
        .collect();

    let normalized = match pathname.trim_end_matches('/') {
        "" => "/",
        p => p,
    };

    Some(RouteMatch {
        path: pattern.to_string(),
        is_exact: url == normalized,
        url,
        params,
    })
}
