use crate::config::SiteConfig;
use crate::fragment::FetchError;
use crate::pages::{self, STYLESHEET};
use crate::router::{PageFetcher, RouteTable, View};
use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceExt;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info};

type SharedState = Arc<AppState>;

pub struct AppState {
    pub site: SiteConfig,
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    /// Directory holding the `wasm-bindgen` output, served under `/pkg`.
    pub assets_dir: Option<PathBuf>,
    pub site: SiteConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            assets_dir: None,
            site: SiteConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    let state = Arc::new(AppState {
        site: config.site.clone(),
    });
    let router = build_router(state, config.assets_dir.clone());
    info!(
        %config.addr,
        assets = ?config.assets_dir,
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

pub fn build_router(state: SharedState, assets_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new();
    for route in RouteTable::standard().iter() {
        let view = route.view;
        router = router.route(
            route.path,
            get(move |State(state): State<SharedState>| async move { view_html(&state, view) }),
        );
    }
    let router = router
        .route("/assets/css/style.css", get(stylesheet))
        .route("/healthz", get(health))
        .fallback(not_found);
    let router = match assets_dir {
        Some(dir) => router.nest_service("/pkg", ServeDir::new(dir)),
        None => router,
    };
    router
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn view_html(state: &AppState, view: View) -> Response {
    match pages::render_view(view, &state.site) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(%view, %err, "template rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "template error").into_response()
        }
    }
}

async fn not_found(State(state): State<SharedState>) -> Response {
    match pages::render_not_found(&state.site) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, mime::TEXT_CSS_UTF_8.as_ref())],
        STYLESHEET,
    )
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "portal-spa" }))
}

/// Fetches documents straight from an in-process [`Router`], without sockets.
#[derive(Clone)]
pub struct RouterFetcher {
    router: Router,
}

impl RouterFetcher {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn for_site(site: SiteConfig) -> Self {
        Self::new(build_router(Arc::new(AppState { site }), None))
    }
}

impl PageFetcher for RouterFetcher {
    async fn fetch(&self, document: &str) -> Result<String, FetchError> {
        let request = Request::get(document)
            .body(Body::empty())
            .map_err(|err| FetchError::Network(err.to_string()))?;
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        String::from_utf8(bytes.to_vec()).map_err(|err| FetchError::Network(err.to_string()))
    }
}

#[cfg(all(test, feature = "web"))]
mod tests {
    use super::*;
    use axum::body;

    fn test_router() -> Router {
        let state = Arc::new(AppState {
            site: SiteConfig::default(),
        });
        build_router(state, None)
    }

    async fn get_text(path: &str) -> (StatusCode, String) {
        let response = test_router()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn every_route_serves_a_page() {
        for path in ["/", "/index.html", "/projetos.html", "/cadastro.html"] {
            let (status, html) = get_text(path).await;
            assert!(status.is_success(), "{path} -> {status}");
            assert!(html.contains("<main"), "{path} has no main");
        }
    }

    #[tokio::test]
    async fn registration_page_has_form() {
        let (_, html) = get_text("/cadastro.html").await;
        assert!(html.contains(r#"id="formCadastro""#));
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (status, html) = get_text("/sobre.html").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Página não encontrada"));
    }

    #[tokio::test]
    async fn stylesheet_is_css() {
        let response = test_router()
            .oneshot(
                Request::get("/assets/css/style.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/css"));
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let (status, body) = get_text("/healthz").await;
        assert!(status.is_success());
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(payload["status"], "ok");
    }

    #[tokio::test]
    async fn router_fetcher_maps_statuses() {
        let fetcher = RouterFetcher::for_site(SiteConfig::default());
        assert!(fetcher.fetch("/projetos.html").await.is_ok());
        assert_eq!(
            fetcher.fetch("/nada.html").await,
            Err(FetchError::Status(404))
        );
    }
}
