/*!
# Datable

A spreadsheet grid driven by a single predictable state store, served from Rust.

## Overview

The grid itself is a browser-side table widget. This crate owns everything
around it: the authoritative state tree, the reducer that applies the
widget's edits, the middleware pipeline, navigation history and the web
shell that mounts the widget and keeps it in sync.

## Architecture

### State
- **GridSettings** - the data matrix plus display flags (headers, read-only,
  column width, spare rows and columns)
- **AppState** - root of the tree: a router slice and a workbook slice
- Published states are immutable; updates share every untouched row and
  slice with the previous state

### Pipeline
- **Store** - dispatch, subscribe, ordered action queue
- **Middleware** - logger, router binding, effect runner
- **Reducers** - `workbook_reducer` for grid edits and the read-only flag,
  `router_reducer` for location changes, `root_reducer` combining both

### Shell (`web` feature)
- axum server with the host page, a JSON action endpoint and a server-sent
  event stream of new states

## Action protocol

- `UPDATE_SHEET_DATA` with `dataChanges: [[row, col, old, new], ...]`
- `UPDATE_SHEET_READ_ONLY` with `readOnly: bool`
- `@@router/CALL_HISTORY_METHOD` with `payload: {method, args}`
- `@@router/LOCATION_CHANGE` (emitted by the router binding)

Any other `type` is accepted and leaves the state untouched.

## Modules

- **cell**: cell values, change tuples, cell names
- **settings**: data matrix and grid settings
- **mock_data**: seed data
- **action**: the action enum and creators
- **reducer**: state transitions
- **store**: state container and middleware chain
- **logger**: action logging middleware
- **effects**: asynchronous effect runner
- **history**: navigation history
- **router**: history binding and route matching
- **config**: command line and environment configuration
- **app**: application shell and HTTP routes
*/

pub mod action;
pub mod cell;
pub mod effects;
pub mod error;
pub mod history;
pub mod logger;
pub mod mock_data;
pub mod reducer;
pub mod router;
pub mod settings;
pub mod store;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;

pub use action::*;
pub use cell::*;
pub use error::*;
pub use reducer::*;
pub use settings::*;
pub use store::*;
