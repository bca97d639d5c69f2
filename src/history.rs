//! In-memory navigation history.
//!
//! Keeps a stack of visited locations and a cursor into it, the same model a
//! browser session history uses. Listeners are told about every transition
//! together with the kind of navigation that caused it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// How the current location was reached.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryAction {
    Push,
    Replace,
    Pop,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub key: String,
}

impl Location {
    /// Parse `pathname?search#hash`. Search keeps its leading `?` and hash its
    /// leading `#`; an empty pathname becomes `/`.
    pub fn parse(path: &str) -> Self {
        let (rest, hash) = match path.find('#') {
            Some(i) => (&path[..i], &path[i..]),
            None => (path, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };

        Location {
            pathname: if pathname.is_empty() {
                "/".to_string()
            } else {
                pathname.to_string()
            },
            search: if search == "?" { String::new() } else { search.to_string() },
            hash: if hash == "#" { String::new() } else { hash.to_string() },
            key: create_key(),
        }
    }

    /// Inverse of [`Location::parse`], without the key.
    pub fn path(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

fn create_key() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

pub type ListenerId = u64;
type Listener = Arc<dyn Fn(&Location, HistoryAction) + Send + Sync>;

struct Entries {
    stack: Vec<Location>,
    index: usize,
}

/// Shared handle to a navigation history. Clones observe the same stack.
#[derive(Clone)]
pub struct History {
    entries: Arc<Mutex<Entries>>,
    listeners: Arc<Mutex<Vec<(ListenerId, Listener)>>>,
    next_id: Arc<AtomicU64>,
}

impl History {
    pub fn new(initial_path: &str) -> Self {
        History {
            entries: Arc::new(Mutex::new(Entries {
                stack: vec![Location::parse(initial_path)],
                index: 0,
            })),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn location(&self) -> Location {
        let entries = self.lock_entries();
        entries.stack[entries.index].clone()
    }

    /// Number of entries; never zero.
    pub fn length(&self) -> usize {
        self.lock_entries().stack.len()
    }

    pub fn index(&self) -> usize {
        self.lock_entries().index
    }

    pub fn can_go(&self, delta: isize) -> bool {
        let entries = self.lock_entries();
        target_index(&entries, delta).is_some()
    }

    /// Drop every entry after the current one and append `path`.
    pub fn push(&self, path: &str) {
        let location = Location::parse(path);
        {
            let mut entries = self.lock_entries();
            let keep = entries.index + 1;
            entries.stack.truncate(keep);
            entries.stack.push(location.clone());
            entries.index = keep;
        }
        log::debug!("history push {}", location);
        self.notify(&location, HistoryAction::Push);
    }

    pub fn replace(&self, path: &str) {
        let location = Location::parse(path);
        {
            let mut entries = self.lock_entries();
            let index = entries.index;
            entries.stack[index] = location.clone();
        }
        log::debug!("history replace {}", location);
        self.notify(&location, HistoryAction::Replace);
    }

    /// Move the cursor by `delta`. Moves that would leave the stack, and a
    /// zero move, do nothing.
    pub fn go(&self, delta: isize) {
        let location = {
            let mut entries = self.lock_entries();
            match target_index(&entries, delta) {
                Some(index) => {
                    entries.index = index;
                    entries.stack[index].clone()
                }
                None => {
                    log::debug!("history go({}) ignored at index {}", delta, entries.index);
                    return;
                }
            }
        };
        self.notify(&location, HistoryAction::Pop);
    }

    pub fn go_back(&self) {
        self.go(-1);
    }

    pub fn go_forward(&self) {
        self.go(1);
    }

    pub fn listen<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Location, HistoryAction) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock_listeners().push((id, Arc::new(listener)));
        id
    }

    pub fn unlisten(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    fn notify(&self, location: &Location, action: HistoryAction) {
        // snapshot so listeners may navigate or unlisten while being called
        let listeners: Vec<Listener> = self
            .lock_listeners()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(location, action);
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.lock_entries();
        f.debug_struct("History")
            .field("index", &entries.index)
            .field("stack", &entries.stack)
            .finish()
    }
}

fn target_index(entries: &Entries, delta: isize) -> Option<usize> {
    if delta == 0 {
        return None;
    }
    let target = entries.index.checked_add_signed(delta)?;
    (target < entries.stack.len()).then_some(target)
}
