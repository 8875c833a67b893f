//! HTTP read API plus the on-demand scrape trigger.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use dolarhoy_lib::dolarhoy_page::Renderer;
use dolarhoy_lib::{CycleError, HistoryStore, Latest, ScrapeCycle};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state.
pub struct AppState<R> {
    pub cycle: Arc<ScrapeCycle<R>>,
    /// On-demand scrapes return the record without appending it.
    pub read_only_trigger: bool,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            cycle: Arc::clone(&self.cycle),
            read_only_trigger: self.read_only_trigger,
        }
    }
}

pub fn router<R>(state: AppState<R>, static_dir: Option<PathBuf>) -> Router
where
    R: Renderer + 'static,
{
    let api = Router::new()
        .route("/data", get(latest_record::<R>))
        .route("/history", get(history::<R>))
        .route(
            "/scrape",
            get(scrape::<R>)
                .post(scrape::<R>)
                .fallback(method_not_allowed),
        )
        .with_state(state);

    let app = Router::new().nest("/api", api);
    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// GET /api/data - latest record
async fn latest_record<R>(State(state): State<AppState<R>>) -> Response
where
    R: Renderer + 'static,
{
    match state.cycle.store().offload(HistoryStore::latest).await {
        Ok(Latest::Record(record)) => Json(record).into_response(),
        Ok(Latest::Empty) => Json(json!({ "error": "No data available" })).into_response(),
        Ok(Latest::Missing) => Json(json!({ "error": "Data file not found" })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Could not read history");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/history - every stored record
async fn history<R>(State(state): State<AppState<R>>) -> Response
where
    R: Renderer + 'static,
{
    match state.cycle.store().offload(HistoryStore::history_json).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Could not read history");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET|POST /api/scrape - run a cycle now
async fn scrape<R>(State(state): State<AppState<R>>) -> Response
where
    R: Renderer + 'static,
{
    let result = if state.read_only_trigger {
        state.cycle.preview().await
    } else {
        state.cycle.run().await
    };
    match result {
        Ok(record) => Json(json!({
            "success": true,
            "message": "Scraping completed",
            "data": record,
        }))
        .into_response(),
        Err(CycleError::AlreadyRunning) => {
            error_response(StatusCode::CONFLICT, CycleError::AlreadyRunning.to_string())
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use dolarhoy_lib::dolarhoy_page::{DomNode, Error};
    use serde_json::Value;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    /// Serves a blue card once released; `entered` fires when a render starts.
    struct GatedRenderer {
        gated: bool,
        entered: Notify,
        release: Notify,
        page: DomNode,
    }

    impl GatedRenderer {
        fn open(page: DomNode) -> Self {
            Self {
                gated: false,
                entered: Notify::new(),
                release: Notify::new(),
                page,
            }
        }

        fn gated(page: DomNode) -> Self {
            Self {
                gated: true,
                ..Self::open(page)
            }
        }
    }

    impl Renderer for GatedRenderer {
        fn render(&self, _url: &str) -> impl Future<Output = Result<DomNode, Error>> + Send {
            async move {
                if self.gated {
                    self.entered.notify_one();
                    self.release.notified().await;
                }
                Ok(self.page.clone())
            }
        }
    }

    fn blue_page() -> DomNode {
        DomNode::element(
            "body",
            vec![DomNode::element(
                "div",
                vec![
                    DomNode::element("h2", vec![DomNode::text("Dólar blue")]),
                    DomNode::element("p", vec![DomNode::text("Compra $1.420,00")]),
                    DomNode::element("p", vec![DomNode::text("Venta $1.460,00")]),
                ],
            )],
        )
    }

    fn empty_page() -> DomNode {
        DomNode::element("body", vec![DomNode::text("Compra Venta 1.000")])
    }

    fn state(name: &str, renderer: GatedRenderer) -> AppState<GatedRenderer> {
        let dir = std::env::temp_dir().join(format!("dolarhoy_routes_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let store = HistoryStore::new(dir.join("dolar.json"));
        AppState {
            cycle: Arc::new(ScrapeCycle::new(renderer, "https://www.dolarhoy.com/", store, "UTC")),
            read_only_trigger: false,
        }
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn data_without_file_is_not_found_payload() {
        let app = router(state("missing", GatedRenderer::open(blue_page())), None);
        let (status, body) = call(app, "GET", "/api/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": "Data file not found" }));
    }

    #[tokio::test]
    async fn data_with_empty_history() {
        let state = state("empty", GatedRenderer::open(blue_page()));
        std::fs::write(state.cycle.store().path(), "[]").unwrap();
        let (status, body) = call(router(state, None), "GET", "/api/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": "No data available" }));
    }

    #[tokio::test]
    async fn corrupt_history_is_server_error() {
        let state = state("corrupt", GatedRenderer::open(blue_page()));
        std::fs::write(state.cycle.store().path(), "{oops").unwrap();

        let (status, body) = call(router(state.clone(), None), "GET", "/api/data").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("json"));

        let (status, _) = call(router(state, None), "GET", "/api/history").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn history_without_file_is_empty_array() {
        let app = router(state("history_missing", GatedRenderer::open(blue_page())), None);
        let (status, body) = call(app, "GET", "/api/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn scrape_then_read_back() {
        let state = state("scrape", GatedRenderer::open(blue_page()));

        let (status, body) = call(router(state.clone(), None), "POST", "/api/scrape").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Scraping completed");
        assert_eq!(body["data"]["data"]["blue"]["venta"], 1460.0);

        let (_, latest) = call(router(state.clone(), None), "GET", "/api/data").await;
        assert_eq!(latest, body["data"]);

        let (_, history) = call(router(state, None), "GET", "/api/history").await;
        assert_eq!(history.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn scrape_without_values_is_server_error() {
        let state = state("no_values", GatedRenderer::open(empty_page()));
        let (status, body) = call(router(state.clone(), None), "GET", "/api/scrape").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "no numeric values extracted");
        assert!(!state.cycle.store().path().exists());
    }

    #[tokio::test]
    async fn read_only_trigger_does_not_persist() {
        let state = AppState {
            read_only_trigger: true,
            ..state("read_only", GatedRenderer::open(blue_page()))
        };
        let (status, body) = call(router(state.clone(), None), "GET", "/api/scrape").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["data"]["blue"]["compra"], 1420.0);
        assert!(!state.cycle.store().path().exists());
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        let app = router(state("method", GatedRenderer::open(blue_page())), None);
        let (status, body) = call(app, "DELETE", "/api/scrape").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "error": "Method not allowed" }));
    }

    #[tokio::test]
    async fn concurrent_scrape_conflicts() {
        let state = state("conflict", GatedRenderer::gated(blue_page()));

        let first = tokio::spawn(call(router(state.clone(), None), "POST", "/api/scrape"));
        state.cycle.renderer().entered.notified().await;

        let (status, body) = call(router(state.clone(), None), "POST", "/api/scrape").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "a scrape is already running");

        state.cycle.renderer().release.notify_one();
        let (status, _) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }
}
