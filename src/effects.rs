//! Asynchronous side effects attached to the store pipeline.
//!
//! Watchers registered with [`EffectMiddleware::take_every`] are started on
//! the tokio runtime for every matching action, after the reducer has seen
//! that action. An effect talks back to the store only by dispatching, so it
//! goes through the same ordered queue as everything else.

use crate::store::{Middleware, Next, Store};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::sync::Notify;

type EffectFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
type Handler<S, A> = Arc<dyn Fn(EffectContext<S, A>, A) -> EffectFuture + Send + Sync>;
type Matcher<A> = Box<dyn Fn(&A) -> bool + Send + Sync>;

/// What a running effect can do with the store.
pub struct EffectContext<S, A> {
    store: Store<S, A>,
}

impl<S, A> EffectContext<S, A>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
{
    pub fn dispatch(&self, action: A) {
        self.store.dispatch(action);
    }

    pub fn state(&self) -> Arc<S> {
        self.store.state()
    }
}

struct Watcher<S, A> {
    name: String,
    matches: Matcher<A>,
    handler: Handler<S, A>,
}

#[derive(Default)]
struct Tasks {
    running: AtomicUsize,
    idle: Notify,
}

// Decrements on drop so a panicking effect still counts as finished.
struct TaskGuard(Arc<Tasks>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if self.0.running.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

pub struct EffectMiddleware<S, A> {
    runtime: Option<Handle>,
    watchers: RwLock<Vec<Watcher<S, A>>>,
    tasks: Arc<Tasks>,
}

impl<S, A> Default for EffectMiddleware<S, A> {
    fn default() -> Self {
        EffectMiddleware {
            runtime: Handle::try_current().ok(),
            watchers: RwLock::new(Vec::new()),
            tasks: Arc::new(Tasks::default()),
        }
    }
}

impl<S, A> EffectMiddleware<S, A>
where
    S: Send + Sync + 'static,
    A: Clone + Send + 'static,
{
    /// Uses the runtime current at construction, or at spawn time if there
    /// was none.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime(runtime: Handle) -> Self {
        EffectMiddleware {
            runtime: Some(runtime),
            ..Self::default()
        }
    }

    /// Start `handler` for every action accepted by `matches`.
    pub fn take_every<M, F, Fut>(&self, name: &str, matches: M, handler: F)
    where
        M: Fn(&A) -> bool + Send + Sync + 'static,
        F: Fn(EffectContext<S, A>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: Handler<S, A> =
            Arc::new(move |ctx: EffectContext<S, A>, action: A| -> EffectFuture {
                Box::pin(handler(ctx, action))
            });
        self.watchers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Watcher {
                name: name.to_string(),
                matches: Box::new(matches),
                handler,
            });
        log::debug!("registered effect watcher {}", name);
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Effects started and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.tasks.running.load(Ordering::SeqCst)
    }

    /// Resolves once no effect is running.
    pub async fn settled(&self) {
        loop {
            let notified = self.tasks.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn spawn(&self, name: &str, future: EffectFuture) {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            log::warn!("no tokio runtime available, effect {} skipped", name);
            return;
        };

        self.tasks.running.fetch_add(1, Ordering::SeqCst);
        let guard = TaskGuard(Arc::clone(&self.tasks));
        runtime.spawn(async move {
            let _guard = guard;
            future.await;
        });
    }
}

impl<S, A> Middleware<S, A> for EffectMiddleware<S, A>
where
    S: Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
{
    fn handle(&self, store: &Store<S, A>, action: A, next: Next<'_, S, A>) {
        let matched: Vec<(String, Handler<S, A>)> = self
            .watchers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|w| (w.matches)(&action))
            .map(|w| (w.name.clone(), Arc::clone(&w.handler)))
            .collect();

        if matched.is_empty() {
            next.run(action);
            return;
        }

        next.run(action.clone());

        for (name, handler) in matched {
            log::debug!("starting effect {}", name);
            let ctx = EffectContext {
                store: store.clone(),
            };
            self.spawn(&name, handler(ctx, action.clone()));
        }
    }
}
