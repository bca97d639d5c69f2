use crate::cell::CellChange;
use crate::history::{HistoryAction, Location};
use crate::router::RouterState;
use serde::{Deserialize, Serialize};

pub const UPDATE_SHEET_DATA: &str = "UPDATE_SHEET_DATA";
pub const UPDATE_SHEET_READ_ONLY: &str = "UPDATE_SHEET_READ_ONLY";
pub const LOCATION_CHANGE: &str = "@@router/LOCATION_CHANGE";
pub const CALL_HISTORY_METHOD: &str = "@@router/CALL_HISTORY_METHOD";
pub const UNKNOWN: &str = "@@unknown";

/// Every message the store understands.
///
/// On the wire an action is a JSON object tagged by `type`. Tags this crate
/// does not know deserialize to [`Action::Unknown`], which every reducer
/// passes through untouched.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum Action {
    /// A batch of cell edits coming from the grid widget.
    #[serde(rename = "UPDATE_SHEET_DATA")]
    ApplyDataChanges {
        #[serde(rename = "dataChanges")]
        changes: Vec<CellChange>,
    },

    #[serde(rename = "UPDATE_SHEET_READ_ONLY")]
    SetReadOnly {
        #[serde(rename = "readOnly")]
        read_only: bool,
    },

    /// The history moved; emitted by the router binding.
    #[serde(rename = "@@router/LOCATION_CHANGE")]
    LocationChange { payload: RouterState },

    /// Request to navigate; consumed by the router middleware.
    #[serde(rename = "@@router/CALL_HISTORY_METHOD")]
    CallHistoryMethod { payload: HistoryMethod },

    #[serde(other)]
    Unknown,
}

impl Action {
    /// Wire tag of this action.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::ApplyDataChanges { .. } => UPDATE_SHEET_DATA,
            Action::SetReadOnly { .. } => UPDATE_SHEET_READ_ONLY,
            Action::LocationChange { .. } => LOCATION_CHANGE,
            Action::CallHistoryMethod { .. } => CALL_HISTORY_METHOD,
            Action::Unknown => UNKNOWN,
        }
    }
}

/// Navigation requested through the store.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "method", content = "args", rename_all = "camelCase")]
pub enum HistoryMethod {
    Push(String),
    Replace(String),
    Go(isize),
    GoBack,
    GoForward,
}

pub fn update_sheet_data(changes: Vec<CellChange>) -> Action {
    Action::ApplyDataChanges { changes }
}

pub fn update_sheet_read_only(read_only: bool) -> Action {
    Action::SetReadOnly { read_only }
}

pub fn location_change(location: Location, action: HistoryAction) -> Action {
    Action::LocationChange {
        payload: RouterState { location, action },
    }
}

pub fn push(path: impl Into<String>) -> Action {
    Action::CallHistoryMethod {
        payload: HistoryMethod::Push(path.into()),
    }
}

pub fn replace(path: impl Into<String>) -> Action {
    Action::CallHistoryMethod {
        payload: HistoryMethod::Replace(path.into()),
    }
}

pub fn go(delta: isize) -> Action {
    Action::CallHistoryMethod {
        payload: HistoryMethod::Go(delta),
    }
}

pub fn go_back() -> Action {
    Action::CallHistoryMethod {
        payload: HistoryMethod::GoBack,
    }
}

pub fn go_forward() -> Action {
    Action::CallHistoryMethod {
        payload: HistoryMethod::GoForward,
    }
}
