//! Predictable state container.
//!
//! A [`Store`] owns the current state behind an `Arc`, runs every dispatched
//! action through its middleware chain and then through the reducer, and
//! tells subscribers about the resulting state. Published states are never
//! mutated; a reducer returns a new `Arc` (or the same one when nothing
//! changed).
//!
//! Actions are processed strictly one at a time in dispatch order. A
//! dispatch that arrives while another is being processed, whether from a
//! middleware, a listener or another thread, is queued and handled by the
//! caller that is already draining the queue.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub type SubscriptionId = u64;

type ReducerFn<S, A> = dyn Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync;
type Listener<S> = Arc<dyn Fn(&Arc<S>) + Send + Sync>;

/// A step in the dispatch pipeline.
///
/// A middleware receives every action before the reducer sees it and decides
/// what happens next: forward it with `next.run(action)`, swallow it, or
/// forward it and then start follow-up work.
pub trait Middleware<S, A>: Send + Sync {
    fn handle(&self, store: &Store<S, A>, action: A, next: Next<'_, S, A>);
}

/// The remainder of the middleware chain, ending in the reducer.
pub struct Next<'a, S, A> {
    store: &'a Store<S, A>,
    rest: &'a [Arc<dyn Middleware<S, A>>],
}

impl<S, A> Next<'_, S, A>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
{
    pub fn run(self, action: A) {
        match self.rest.split_first() {
            Some((middleware, rest)) => middleware.handle(
                self.store,
                action,
                Next {
                    store: self.store,
                    rest,
                },
            ),
            None => self.store.reduce(action),
        }
    }
}

struct Queue<A> {
    actions: VecDeque<A>,
    draining: bool,
}

struct Shared<S, A> {
    state: Mutex<Arc<S>>,
    reducer: Box<ReducerFn<S, A>>,
    middleware: Vec<Arc<dyn Middleware<S, A>>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener<S>)>>,
    next_listener: AtomicU64,
    queue: Mutex<Queue<A>>,
}

/// Cloneable handle to one state tree.
pub struct Store<S, A> {
    shared: Arc<Shared<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Store {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("middleware", &self.shared.middleware.len())
            .finish()
    }
}

impl<S, A> Store<S, A>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
{
    pub fn new<R>(reducer: R, initial_state: S, middleware: Vec<Arc<dyn Middleware<S, A>>>) -> Self
    where
        R: Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync + 'static,
    {
        Store {
            shared: Arc::new(Shared {
                state: Mutex::new(Arc::new(initial_state)),
                reducer: Box::new(reducer),
                middleware,
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                queue: Mutex::new(Queue {
                    actions: VecDeque::new(),
                    draining: false,
                }),
            }),
        }
    }

    /// Current state. The returned `Arc` keeps observing this exact value no
    /// matter what is dispatched afterwards.
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&lock(&self.shared.state))
    }

    pub fn dispatch(&self, action: A) {
        {
            let mut queue = lock(&self.shared.queue);
            queue.actions.push_back(action);
            if queue.draining {
                return;
            }
            queue.draining = true;
        }

        let _guard = DrainGuard { store: self };
        loop {
            let action = {
                let mut queue = lock(&self.shared.queue);
                match queue.actions.pop_front() {
                    Some(action) => action,
                    None => {
                        queue.draining = false;
                        return;
                    }
                }
            };
            Next {
                store: self,
                rest: &self.shared.middleware,
            }
            .run(action);
        }
    }

    /// Register a listener called with the new state after every action that
    /// reaches the reducer.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Arc<S>) + Send + Sync + 'static,
    {
        let id = self.shared.next_listener.fetch_add(1, Ordering::Relaxed);
        lock(&self.shared.listeners).push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.shared.listeners);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn downgrade(&self) -> WeakStore<S, A> {
        WeakStore {
            shared: Arc::downgrade(&self.shared),
        }
    }

    fn reduce(&self, action: A) {
        let next = {
            let mut state = lock(&self.shared.state);
            let next = (self.shared.reducer)(&state, &action);
            *state = Arc::clone(&next);
            next
        };

        let listeners: Vec<Listener<S>> = lock(&self.shared.listeners)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&next);
        }
    }
}

/// Non-owning store handle, for parties the store itself keeps alive.
pub struct WeakStore<S, A> {
    shared: Weak<Shared<S, A>>,
}

impl<S, A> Clone for WeakStore<S, A> {
    fn clone(&self) -> Self {
        WeakStore {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<S, A> WeakStore<S, A> {
    pub fn upgrade(&self) -> Option<Store<S, A>> {
        self.shared.upgrade().map(|shared| Store { shared })
    }
}

// Clears the draining flag if a middleware or listener panics mid-drain.
// Only the action that panicked is lost; anything other callers queued in
// the meantime stays queued and is drained by the next dispatch.
struct DrainGuard<'a, S, A> {
    store: &'a Store<S, A>,
}

impl<S, A> Drop for DrainGuard<'_, S, A> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut queue = lock(&self.store.shared.queue);
            queue.draining = false;
            if !queue.actions.is_empty() {
                log::warn!(
                    "dispatch panicked with {} action(s) still queued",
                    queue.actions.len()
                );
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
