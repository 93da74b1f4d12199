//! HTTP front end for the compose-file search.
//!
//! ## Endpoints
//!
//! - `GET /` : service banner
//! - `GET /health` : liveness check
//! - `GET /search?q=&page=&limit=` : live search against GitHub
//! - `GET /mock?q=` : canned fixtures, optionally falling back to live search

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::mock;
use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use dockdock_search::{GitHubHost, SearchConfig, SearchCriteria, SearchError, SearchOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Page requested when `page` is omitted.
const DEFAULT_PAGE: u32 = 1;

/// Result count requested when `limit` is omitted.
const DEFAULT_LIMIT: u32 = 10;

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// GitHub client shared by every request.
    host: Arc<GitHubHost>,
    /// Search settings, read-only after start-up.
    search: Arc<SearchConfig>,
    app_name: String,
    app_version: String,
    mock_fallback: bool,
}

impl AppState {
    /// Build state from a loaded configuration and a ready host.
    pub fn new(config: &ServiceConfig, host: GitHubHost) -> Self {
        Self {
            host: Arc::new(host),
            search: Arc::new(config.search.clone()),
            app_name: config.app_name.clone(),
            app_version: config.app_version.clone(),
            mock_fallback: config.mock_fallback,
        }
    }

    async fn run_search(
        &self,
        criteria: &SearchCriteria,
    ) -> std::result::Result<SearchOutcome, ApiError> {
        dockdock_search::search_with(self.host.as_ref(), criteria, &self.search)
            .await
            .map_err(ApiError::from)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A request-fatal error rendered as `{error, message, status}`.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    detail: Option<Value>,
}

/// JSON body of an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error kind, e.g. `"validation_error"`.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// HTTP status, repeated in the body.
    pub status: u16,
    /// Upstream response body, for passed-through rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ApiError {
    /// A 422 for missing or malformed query parameters.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            kind: dockdock_search::error::error_kinds::VALIDATION,
            message: message.into(),
            detail: None,
        }
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
        let detail = match &err {
            SearchError::UpstreamRejected { body, .. } => Some(
                serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone())),
            ),
            _ => None,
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), kind = self.kind, "{}", self.message);
        } else {
            tracing::warn!(status = self.status.as_u16(), kind = self.kind, "{}", self.message);
        }
        let body = ErrorBody {
            error: self.kind.to_owned(),
            message: self.message,
            status: self.status.as_u16(),
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Turn a handler panic into a 500 with the usual error body.
fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = detail, "request handler panicked");
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        kind: "internal_error",
        message: "internal server error".into(),
        detail: None,
    }
    .into_response()
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Raw `/search` parameters. Parsed by hand so malformed numbers become 422.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

/// Raw `/mock` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct MockParams {
    q: Option<String>,
}

fn parse_number(name: &str, raw: Option<&str>, default: u32) -> std::result::Result<u32, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            ApiError::validation(format!("{name} must be a positive integer, got {value:?}"))
        }),
    }
}

impl SearchParams {
    /// Validate into search criteria.
    ///
    /// # Errors
    ///
    /// Returns a 422 [`ApiError`] if `q` is missing or any value is out of range.
    pub fn into_criteria(self) -> std::result::Result<SearchCriteria, ApiError> {
        let q = self.q.ok_or_else(|| ApiError::validation("q is required"))?;
        let page = parse_number("page", self.page.as_deref(), DEFAULT_PAGE)?;
        let limit = parse_number("limit", self.limit.as_deref(), DEFAULT_LIMIT)?;
        SearchCriteria::new(q, page, limit).map_err(ApiError::from)
    }
}

fn query_rejection(rejection: QueryRejection) -> ApiError {
    ApiError::validation(rejection.body_text())
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `GET /` : service banner.
async fn handle_root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": state.app_name,
        "version": state.app_version,
    }))
}

/// `GET /health` : liveness check.
async fn handle_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": state.app_name,
    }))
}

/// `GET /search` : live search.
async fn handle_search(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> std::result::Result<Json<SearchOutcome>, ApiError> {
    let Query(params) = params.map_err(query_rejection)?;
    let criteria = params.into_criteria()?;
    state.run_search(&criteria).await.map(Json)
}

/// `GET /mock` : fixtures, or live search for unmatched queries when enabled.
async fn handle_mock(
    State(state): State<AppState>,
    params: std::result::Result<Query<MockParams>, QueryRejection>,
) -> std::result::Result<Json<SearchOutcome>, ApiError> {
    let Query(params) = params.map_err(query_rejection)?;
    let query = params.q.as_deref().filter(|q| !q.trim().is_empty());

    if state.mock_fallback
        && let Some(q) = query
        && !mock::bucket_for(q).is_named()
    {
        tracing::debug!(query = q, "no fixture bucket matched, searching live");
        let criteria = SearchCriteria::new(q, DEFAULT_PAGE, DEFAULT_LIMIT)?;
        return state.run_search(&criteria).await.map(Json);
    }

    Ok(Json(mock::mock_outcome(query)))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the CORS layer for `origins`.
///
/// A `"*"` entry allows any origin without credentials. Otherwise only the
/// listed origins are allowed, with credentials, and request methods and
/// headers are mirrored back.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o.trim() == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, "ignoring invalid CORS origin: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Build the application router.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/search", get(handle_search))
        .route("/mock", get(handle_mock))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// The running HTTP service.
///
/// Serving happens on a background tokio task; dropping the handle stops it.
pub struct Server {
    addr: SocketAddr,
    handle: JoinHandle<std::io::Result<()>>,
}

impl Server {
    /// Validate `config`, build the GitHub host and start serving.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the listener
    /// cannot bind.
    pub async fn start(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        let host = GitHubHost::new(&config.search)?;
        Self::start_with_host(config, host).await
    }

    /// Start serving with an already-built host.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind.
    pub async fn start_with_host(config: &ServiceConfig, host: GitHubHost) -> Result<Self> {
        let app = router(AppState::new(config, host), &config.cors_origins);

        let bind_addr = config.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ServiceError::Server(format!("bind {bind_addr} failed: {e}")))?;
        let addr = listener.local_addr()?;

        info!("{} listening on http://{addr}", config.app_name);

        let handle = tokio::spawn(async move { axum::serve(listener, app).await });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }

    /// Wait until the server task ends.
    ///
    /// # Errors
    ///
    /// Returns an error if serving failed or the task panicked.
    pub async fn join(mut self) -> Result<()> {
        match (&mut self.handle).await {
            Ok(served) => served.map_err(ServiceError::from),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(ServiceError::Server(format!("server task failed: {e}"))),
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(q: Option<&str>, page: Option<&str>, limit: Option<&str>) -> SearchParams {
        SearchParams {
            q: q.map(str::to_owned),
            page: page.map(str::to_owned),
            limit: limit.map(str::to_owned),
        }
    }

    #[test]
    fn params_apply_defaults() {
        let criteria = params(Some("flask"), None, None).into_criteria().expect("valid");
        assert_eq!(criteria.page(), 1);
        assert_eq!(criteria.limit(), 10);
    }

    #[test]
    fn params_missing_q_is_422() {
        let err = params(None, None, None).into_criteria().unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message.contains("q"));
    }

    #[test]
    fn params_non_numeric_is_422() {
        let err = params(Some("flask"), Some("two"), None).into_criteria().unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message.contains("page"));

        let err = params(Some("flask"), None, Some("-5")).into_criteria().unwrap_err();
        assert!(err.message.contains("limit"));
    }

    #[test]
    fn params_out_of_range_is_422() {
        for (page, limit) in [("0", "10"), ("1", "0"), ("1", "101")] {
            let err = params(Some("flask"), Some(page), Some(limit))
                .into_criteria()
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY, "page={page} limit={limit}");
            assert_eq!(err.kind, "validation_error");
        }
    }

    #[test]
    fn search_error_maps_status_and_kind() {
        let err = ApiError::from(SearchError::UpstreamUnreachable("connection refused".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind, "upstream_unreachable");

        let err = ApiError::from(SearchError::Timeout("exceeded 30s limit".into()));
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn rejected_error_carries_upstream_body() {
        let err = ApiError::from(SearchError::UpstreamRejected {
            status: 422,
            body: r#"{"message":"Validation Failed"}"#.into(),
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.detail, Some(json!({"message": "Validation Failed"})));

        let err = ApiError::from(SearchError::UpstreamRejected {
            status: 500,
            body: "plain text".into(),
        });
        assert_eq!(err.detail, Some(Value::String("plain text".into())));
    }

    #[test]
    fn unknown_status_becomes_bad_gateway() {
        let err = ApiError::from(SearchError::UpstreamRejected {
            status: 42,
            body: String::new(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn handler_panic_is_500_json() {
        async fn boom() -> &'static str {
            panic!("handler blew up");
        }
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(panic_response));
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let served = tokio::spawn(async move { axum::serve(listener, app).await });

        let response = reqwest::get(format!("http://{addr}/boom")).await.expect("request");
        assert_eq!(response.status().as_u16(), 500);
        let body: ErrorBody = response.json().await.expect("error body");
        assert_eq!(body.error, "internal_error");
        assert_eq!(body.status, 500);

        // The connection survives, so a second request is answered too.
        let again = reqwest::get(format!("http://{addr}/boom")).await.expect("request");
        assert_eq!(again.status().as_u16(), 500);
        served.abort();
    }

    #[test]
    fn cors_layer_accepts_wildcard_and_lists() {
        let _ = cors_layer(&["*".to_owned()]);
        let _ = cors_layer(&["http://localhost:3000".to_owned(), "bad\norigin".to_owned()]);
        let _ = cors_layer(&[]);
    }
}
