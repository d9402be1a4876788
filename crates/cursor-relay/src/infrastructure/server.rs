//! HTTP surface: router, listener, entry page, and graceful shutdown.
//!
//! Two routes only:
//!
//! - `GET /`   — the entry page, embedded at compile time with the configured
//!   title substituted in. Other methods on `/` get 405; other paths 404.
//! - `GET /ws` — the WebSocket upgrade endpoint (see
//!   [`crate::infrastructure::session`]).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::application::HubHandle;
use crate::domain::AppConfig;
use crate::infrastructure::session;

/// The entry page template; `{{title}}` is replaced at startup.
const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Shared state handed to every request handler.
///
/// Long-lived objects (the hub handle, the rendered page) are constructed
/// once at startup and passed by reference — nothing is reached through
/// ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
    index_html: Arc<String>,
}

impl AppState {
    pub fn new(hub: HubHandle, title: &str) -> Self {
        Self {
            hub,
            index_html: Arc::new(render_index(title)),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/ws", get(session::ws_handler))
        .with_state(state)
}

/// Binds the listener and serves until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound (port in use, missing
/// permission) or if the server fails while running. Bind failures are fatal
/// before any connection is served.
pub async fn run_server(config: &AppConfig, hub: HubHandle) -> anyhow::Result<()> {
    let state = AppState::new(hub, &config.app.title);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr}"))?;

    info!("{} listening on http://localhost:{}/", config.app.title, config.app.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with an error")?;

    Ok(())
}

async fn serve_index(State(state): State<AppState>) -> Html<String> {
    Html(state.index_html.as_ref().clone())
}

fn render_index(title: &str) -> String {
    INDEX_HTML.replace("{{title}}", title)
}

/// Resolves when the process receives Ctrl+C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C; shutting down"),
        Err(e) => tracing::error!("failed to listen for shutdown signal: {e}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Hub;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router(title: &str) -> Router {
        let hub = Hub::new().spawn();
        router(AppState::new(hub, title))
    }

    #[tokio::test]
    async fn test_get_root_serves_entry_page_with_title() {
        // Arrange
        let app = test_router("Shared Canvas");

        // Act
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Shared Canvas"));
        assert!(!html.contains("{{title}}"), "placeholder must be substituted");
    }

    #[tokio::test]
    async fn test_post_root_is_method_not_allowed() {
        let app = test_router("t");
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let app = test_router("t");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nothing/here")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_plain_get_on_ws_route_is_rejected() {
        // A request without the upgrade headers must get an error response,
        // not a hanging connection.
        let app = test_router("t");
        let response = app
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(
            response.status().is_client_error(),
            "non-upgrade request must be rejected, got {}",
            response.status()
        );
    }

    #[test]
    fn test_render_index_substitutes_every_occurrence() {
        let page = render_index("My Title");
        assert!(!page.contains("{{title}}"));
        assert!(page.contains("My Title"));
    }
}
