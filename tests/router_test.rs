use datable::action::{self, Action};
use datable::history::{History, HistoryAction, Location};
use datable::reducer::{AppState, root_reducer};
use datable::router::{RouterMiddleware, RouterState, connect_router, match_path};
use datable::settings::WorkbookState;
use datable::store::{Middleware, Store};
use std::sync::{Arc, Mutex};

fn connected_store(history: &History) -> Store<AppState, Action> {
    let initial = AppState::new(RouterState::from_history(history), WorkbookState::default());
    let middleware: Vec<Arc<dyn Middleware<AppState, Action>>> =
        vec![Arc::new(RouterMiddleware::new(history.clone()))];
    let store = Store::new(root_reducer, initial, middleware);
    connect_router(&store, history);
    store
}

#[test]
fn test_location_parse() {
    let location = Location::parse("/workbook/q1?tab=2#B3");
    assert_eq!(location.pathname, "/workbook/q1");
    assert_eq!(location.search, "?tab=2");
    assert_eq!(location.hash, "#B3");
    assert_eq!(location.path(), "/workbook/q1?tab=2#B3");
    assert!(!location.key.is_empty());
    println!("✓ Path split into pathname, search and hash");

    assert_eq!(Location::parse("").pathname, "/");
    assert_eq!(Location::parse("?x=1").pathname, "/");
    println!("✓ Empty pathname becomes /");
}

#[test]
fn test_history_stack() {
    let history = History::new("/");
    history.push("/a");
    history.push("/b");
    assert_eq!(history.length(), 3);
    assert_eq!(history.location().pathname, "/b");

    history.go_back();
    assert_eq!(history.location().pathname, "/a");
    history.push("/c");
    assert_eq!(history.length(), 3);
    assert!(!history.can_go(1));
    println!("✓ Push after going back drops forward entries");

    history.replace("/d");
    assert_eq!(history.location().pathname, "/d");
    assert_eq!(history.length(), 3);
    println!("✓ Replace keeps the stack length");

    history.go(-10);
    assert_eq!(history.location().pathname, "/d");
    history.go(-2);
    assert_eq!(history.location().pathname, "/");
    history.go_forward();
    assert_eq!(history.location().pathname, "/a");
    println!("✓ Out-of-range go is ignored");
}

#[test]
fn test_history_listeners() {
    let history = History::new("/");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = history.listen(move |location, action| {
        sink.lock().unwrap().push((location.pathname.clone(), action));
    });

    history.push("/a");
    history.replace("/b");
    history.go_back();
    history.go_back(); // nothing to go back to
    assert!(history.unlisten(id));
    history.push("/c");

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("/a".to_string(), HistoryAction::Push),
            ("/b".to_string(), HistoryAction::Replace),
            ("/".to_string(), HistoryAction::Pop),
        ]
    );
    println!("✓ Listeners see each transition with its kind");
}

#[test]
fn test_navigation_through_store() {
    let history = History::new("/");
    let store = connected_store(&history);
    assert_eq!(store.state().router.location.pathname, "/");

    store.dispatch(action::push("/workbook/q1"));
    assert_eq!(history.location().pathname, "/workbook/q1");
    assert_eq!(store.state().router.location.pathname, "/workbook/q1");
    assert_eq!(store.state().router.action, HistoryAction::Push);
    println!("✓ push() moves the history and the router slice");

    store.dispatch(action::go_back());
    assert_eq!(store.state().router.location.pathname, "/");
    assert_eq!(store.state().router.action, HistoryAction::Pop);
    println!("✓ goBack() comes back as a POP location change");

    history.push("/workbook/direct");
    assert_eq!(store.state().router.location.pathname, "/workbook/direct");
    println!("✓ Direct history navigation reaches the store");
}

#[test]
fn test_history_method_does_not_reach_reducer() {
    let history = History::new("/");
    let store = connected_store(&history);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |state| {
        sink.lock().unwrap().push(state.router.location.pathname.clone());
    });

    store.dispatch(action::push("/x"));
    // only the LOCATION_CHANGE reduces
    assert_eq!(*seen.lock().unwrap(), vec!["/x".to_string()]);

    let workbook = Arc::clone(&store.state().workbook);
    store.dispatch(action::go(5));
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert!(Arc::ptr_eq(&workbook, &store.state().workbook));
    println!("✓ Navigation requests are consumed by the router middleware");
}

#[test]
fn test_match_path() {
    let m = match_path("/workbook/:name", "/workbook/q1", true).unwrap();
    assert_eq!(m.url, "/workbook/q1");
    assert_eq!(m.params.get("name").map(String::as_str), Some("q1"));
    assert!(m.is_exact);
    println!("✓ Param captured");

    assert!(match_path("/workbook/:name", "/workbook/q1/", true).is_some());
    assert!(match_path("/workbook/:name", "/workbook", true).is_none());
    assert!(match_path("/workbook/:name", "/workbook/q1/extra", true).is_none());
    println!("✓ Exact matching honours trailing slashes and segments");

    let m = match_path("/workbook", "/workbook/q1", false).unwrap();
    assert_eq!(m.url, "/workbook");
    assert!(!m.is_exact);
    assert!(match_path("/work", "/workbook", false).is_none());
    println!("✓ Prefix matching stops at segment boundaries");

    assert!(match_path("/", "/", true).is_some());
    assert!(match_path("/", "/anything", true).is_none());
    assert_eq!(match_path("/", "/anything", false).unwrap().url, "/");
    println!("✓ Root pattern");

    let m = match_path("/a.b/:x", "/a.b/1", true).unwrap();
    assert_eq!(m.params["x"], "1");
    assert!(match_path("/a.b/:x", "/axb/1", true).is_none());
    println!("✓ Literal characters are escaped");
}
