//! HTTP dispatch: route table, CORS, the error envelope, static fallback.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::{DevVerifier, GoogleVerifier, IdentityVerifier};
use crate::config::{AuthMode, Config};
use crate::constants::CONTENT_TYPE_APPLICATION_JSON;
use crate::error::ApiError;
use crate::kv::Store;
use crate::posts::PostRepository;

const ALLOWED_METHODS: &str = "GET, HEAD, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostRepository,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub config: Arc<Config>,
}

/// Marker carried from a failed handler to the envelope middleware, which
/// is the single place failures are serialized.
#[derive(Clone)]
struct ErrorMessage(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response
            .extensions_mut()
            .insert(ErrorMessage(self.to_string()));
        response
    }
}

/// Start the web server.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve(config: Config, store: Store) -> Result<()> {
    let verifier: Arc<dyn IdentityVerifier> = match config.auth_mode {
        AuthMode::Dev => {
            warn!("Development identity mode: bearer credentials are trusted verbatim");
            Arc::new(DevVerifier::new(store.clone()))
        }
        AuthMode::Google => Arc::new(GoogleVerifier::new(
            store.clone(),
            config.auth_issuer.clone(),
            config.auth_client_id.clone(),
            config.jwks_url.clone(),
            config.jwks_cache_ttl,
        )),
    };

    let addr: SocketAddr = format!("{}:{}", config.web_host, config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let state = AppState {
        posts: PostRepository::new(store),
        verifier,
        config: Arc::new(config),
    };

    let app = create_app(state);

    info!(addr = %addr, "Starting web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(listener, app).await.context("Web server error")?;

    Ok(())
}

/// Create the main application router.
///
/// Unmatched paths fall through to static-asset resolution.
pub fn create_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let max_upload_bytes = state.config.max_upload_bytes;
    info!(static_dir = ?static_dir, "Serving static files");

    Router::new()
        .merge(routes::router())
        .fallback_service(ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(error_envelope))
        .layer(middleware::map_response(apply_cors))
        .layer(middleware::from_fn(preflight))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Answer `OPTIONS` requests before routing: a CORS preflight (Origin plus
/// both Access-Control-Request headers) gets permissive CORS headers and an
/// empty body; any other `OPTIONS` gets the `Allow` list.
async fn preflight(request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }
    let headers = request.headers();
    if headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_HEADERS)
    {
        return apply_cors(StatusCode::OK.into_response()).await;
    }
    [(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS))].into_response()
}

/// Attach permissive CORS headers to every response.
async fn apply_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

/// Serialize any handler failure as `{err, pathname}` with status 500,
/// regardless of the failure's kind. The internal taxonomy stays distinct
/// so a stricter status mapping can be retrofitted here alone.
async fn error_envelope(request: Request, next: Next) -> Response {
    let pathname = request.uri().path().to_string();
    let mut response = next.run(request).await;
    let Some(ErrorMessage(err)) = response.extensions_mut().remove::<ErrorMessage>() else {
        return response;
    };

    warn!(pathname = %pathname, error = %err, "Request failed");

    let body = serde_json::json!({
        "err": err,
        "pathname": pathname,
    });
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static(CONTENT_TYPE_APPLICATION_JSON),
        )],
        body.to_string(),
    )
        .into_response()
}
