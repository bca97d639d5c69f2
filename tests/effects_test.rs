use datable::action::{self, Action};
use datable::cell::{CellChange, CellValue};
use datable::effects::EffectMiddleware;
use datable::history::History;
use datable::reducer::{AppState, root_reducer};
use datable::router::RouterState;
use datable::settings::WorkbookState;
use datable::store::{Middleware, Store};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn store_with(effects: Arc<EffectMiddleware<AppState, Action>>) -> Store<AppState, Action> {
    let history = History::new("/");
    let initial = AppState::new(RouterState::from_history(&history), WorkbookState::default());
    let middleware: Vec<Arc<dyn Middleware<AppState, Action>>> = vec![effects];
    Store::new(root_reducer, initial, middleware)
}

#[tokio::test]
async fn test_idle_middleware_forwards() {
    let effects = Arc::new(EffectMiddleware::new());
    let store = store_with(Arc::clone(&effects));

    store.dispatch(action::update_sheet_read_only(true));
    assert!(store.state().settings().read_only);
    assert_eq!(effects.watcher_count(), 0);
    assert_eq!(effects.in_flight(), 0);
    effects.settled().await;
    println!("✓ With no watchers actions pass straight to the reducer");
}

#[tokio::test]
async fn test_effect_dispatches_follow_up() {
    let effects = Arc::new(EffectMiddleware::new());
    let store = store_with(Arc::clone(&effects));

    // lock the grid after the first edit lands
    effects.take_every(
        "lock-after-edit",
        |action: &Action| matches!(action, Action::ApplyDataChanges { .. }),
        |ctx, _action| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let edited = ctx.state().settings().data.get(1, 1).cloned();
            if edited == Some(CellValue::from(99)) {
                ctx.dispatch(action::update_sheet_read_only(true));
            }
        },
    );
    assert_eq!(effects.watcher_count(), 1);

    store.dispatch(action::update_sheet_data(vec![CellChange::new(1, 1, 10, 99)]));
    assert!(!store.state().settings().read_only);

    effects.settled().await;
    assert_eq!(effects.in_flight(), 0);
    assert!(store.state().settings().read_only);
    println!("✓ Effect saw the reduced state and dispatched back");
}

#[tokio::test]
async fn test_only_matching_actions_start_effects() {
    let effects = Arc::new(EffectMiddleware::new());
    let store = store_with(Arc::clone(&effects));
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    effects.take_every(
        "count-read-only",
        |action: &Action| matches!(action, Action::SetReadOnly { .. }),
        move |_ctx, _action| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        },
    );

    store.dispatch(action::update_sheet_read_only(true));
    store.dispatch(Action::Unknown);
    store.dispatch(action::update_sheet_read_only(false));
    effects.settled().await;

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    println!("✓ Watchers only run for matching actions");
}

#[tokio::test]
async fn test_panicking_effect_still_settles() {
    let effects = Arc::new(EffectMiddleware::new());
    let store = store_with(Arc::clone(&effects));

    effects.take_every(
        "boom",
        |action: &Action| matches!(action, Action::Unknown),
        |_ctx, _action| async move {
            panic!("effect failed");
        },
    );

    store.dispatch(Action::Unknown);
    effects.settled().await;
    assert_eq!(effects.in_flight(), 0);

    store.dispatch(action::update_sheet_read_only(true));
    assert!(store.state().settings().read_only);
    println!("✓ A failed effect does not wedge the store");
}

#[test]
fn test_no_runtime_skips_effects() {
    let effects = Arc::new(EffectMiddleware::new());
    let store = store_with(Arc::clone(&effects));
    effects.take_every("never", |_: &Action| true, |_ctx, _action| async {});

    store.dispatch(action::update_sheet_read_only(true));
    assert!(store.state().settings().read_only);
    assert_eq!(effects.in_flight(), 0);
    println!("✓ Without a runtime the action still reduces");
}
