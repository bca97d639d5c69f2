use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::Stream;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::action::Action;
use crate::config::Config;
use crate::effects::EffectMiddleware;
use crate::error::{Result, ShellError};
use crate::history::History;
use crate::logger::LoggerMiddleware;
use crate::mock_data::mock_workbook_default_data;
use crate::reducer::{AppState, root_reducer};
use crate::router::{RouterMiddleware, RouterState, connect_router, match_path};
use crate::settings::{GridSettings, WorkbookState};
use crate::store::{Middleware, Next, Store};

pub type AppStore = Store<AppState, Action>;
pub type AppEffects = EffectMiddleware<AppState, Action>;

const INDEX_HTML: &str = include_str!("./static/index.html");
const UPDATE_BUFFER: usize = 64;

/// Everything the running application is made of.
pub struct Shell {
    store: AppStore,
    history: History,
    effects: Arc<AppEffects>,
    updates: broadcast::Sender<Arc<AppState>>,
    config: Config,
}

impl Shell {
    /// Build the store, attach middleware and router, and start publishing
    /// state updates. Call once at startup.
    pub fn bootstrap(config: Config) -> Shell {
        let history = History::new(&config.initial_path);
        let effects = Arc::new(AppEffects::new());
        let settings = config.grid_settings(mock_workbook_default_data());
        let store = configure_store(settings, &history, Arc::clone(&effects));
        connect_router(&store, &history);

        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        let publisher = updates.clone();
        store.subscribe(move |state| {
            // no receivers just means nobody is watching right now
            let _ = publisher.send(Arc::clone(state));
        });

        log::info!(
            "store ready at {} with {} data rows",
            history.location(),
            store.state().settings().data.row_count()
        );

        Shell {
            store,
            history,
            effects,
            updates,
            config,
        }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn effects(&self) -> &Arc<AppEffects> {
        &self.effects
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn subscribe_updates(&self) -> broadcast::Receiver<Arc<AppState>> {
        self.updates.subscribe()
    }
}

/// Drops cell edits that reach the store while the grid is read-only.
///
/// Runs inside the dispatch queue, so the flag it reads is the one left by
/// every action dispatched before the edit.
#[derive(Debug, Default)]
pub struct ReadOnlyMiddleware;

impl Middleware<AppState, Action> for ReadOnlyMiddleware {
    fn handle(&self, store: &Store<AppState, Action>, action: Action, next: Next<'_, AppState, Action>) {
        if matches!(action, Action::ApplyDataChanges { .. }) && store.state().settings().read_only {
            log::info!("dropped {} while read-only", action.kind());
            return;
        }
        next.run(action);
    }
}

/// One store wrapping the root reducer, with logging, the read-only guard,
/// the router binding and the effect runner in that order.
pub fn configure_store(
    settings: GridSettings,
    history: &History,
    effects: Arc<AppEffects>,
) -> AppStore {
    let initial = AppState::new(
        RouterState::from_history(history),
        WorkbookState::new(settings),
    );
    let middleware: Vec<Arc<dyn Middleware<AppState, Action>>> = vec![
        Arc::new(LoggerMiddleware),
        Arc::new(ReadOnlyMiddleware),
        Arc::new(RouterMiddleware::new(history.clone())),
        effects,
    ];
    Store::new(root_reducer, initial, middleware)
}

/// Client-side pages the shell knows how to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Page {
    Workbook { name: Option<String> },
}

pub fn resolve_page(pathname: &str) -> Option<Page> {
    if match_path("/", pathname, true).is_some() {
        return Some(Page::Workbook { name: None });
    }
    match_path("/workbook/:name", pathname, true).map(|m| Page::Workbook {
        name: m.params.get("name").cloned(),
    })
}

/// Host document: the mount element plus the state to hydrate it with.
pub fn render_page(state: &AppState, page: Option<&Page>) -> Result<String> {
    let title = match page {
        Some(Page::Workbook { name: Some(name) }) => name.as_str(),
        Some(Page::Workbook { name: None }) => "Workbook",
        None => "Not found",
    };
    // keep "</script>" inside string values from closing the tag
    let preloaded = serde_json::to_string(state)?.replace('<', "\\u003c");

    Ok(INDEX_HTML
        .replace("{{title}}", &escape_html(title))
        .replace("{{preloaded_state}}", &preloaded))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            status: "error".to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}

pub fn router(shell: Arc<Shell>) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/settings", get(get_settings))
        .route("/api/dispatch", post(dispatch_action))
        .route("/api/events", get(stream_events))
        .nest_service("/static", ServeDir::new(&shell.config.static_dir))
        .fallback(serve_page)
        .layer(CorsLayer::permissive())
        .with_state(shell)
}

pub async fn run(config: Config) -> Result<()> {
    config.validate()?;
    let address = config.address();

    let shell = Arc::new(Shell::bootstrap(config));
    let app = router(shell);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ShellError::Bind {
            address: address.clone(),
            source,
        })?;
    log::info!("Listening on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn get_state(State(shell): State<Arc<Shell>>) -> Json<Arc<AppState>> {
    Json(shell.store.state())
}

async fn get_settings(State(shell): State<Arc<Shell>>) -> Json<GridSettings> {
    Json(shell.store.state().settings().clone())
}

async fn dispatch_action(
    State(shell): State<Arc<Shell>>,
    Json(action): Json<Action>,
) -> Response {
    // Fast path for the common case. A read-only toggle queued just before
    // this edit is caught by ReadOnlyMiddleware instead.
    if matches!(action, Action::ApplyDataChanges { .. }) && shell.store.state().settings().read_only {
        log::info!("rejected {} while read-only", action.kind());
        return error_response(StatusCode::CONFLICT, "grid is read-only");
    }

    // When another caller is draining the queue, dispatch only enqueues and
    // the state returned here may not include this action yet. Clients that
    // need the settled state follow /api/events.
    shell.store.dispatch(action);
    Json(shell.store.state()).into_response()
}

async fn stream_events(
    State(shell): State<Arc<Shell>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let receiver = shell.subscribe_updates();
    let stream = futures::stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(state) => {
                    let event = Event::default().event("state").json_data(&*state);
                    return Some((event, receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("event stream lagging, {} states skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn serve_page(State(shell): State<Arc<Shell>>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let page = resolve_page(uri.path());
    let status = if page.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    match render_page(&shell.store.state(), page.as_ref()) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            log::error!("failed to render {}: {}", uri.path(), e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
