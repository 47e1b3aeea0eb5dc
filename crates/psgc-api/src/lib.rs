// crates/psgc-api/src/lib.rs

//! # psgc-api
//!
//! Read-only JSON interface over a loaded [`Catalog`](psgc_core::Catalog).
//!
//! | route | returns |
//! |-------|---------|
//! | `GET /api/{regions,provinces,city-muni,cities,municipalities,barangays,masterlist}` | `{metadata, data}` page |
//! | `GET /api/<level>/{code}` | one entity, or 404 |
//! | `GET /ping` | `.` |
//! | `GET /stats` | row counts per table |
//!
//! List routes take `page`, `perPage` (or `per_page`) and `filter`; values
//! that are missing or unusable fall back to page 1, 1000 rows, no filter.

use axum::error_handling::HandleErrorLayer;
use axum::extract::OriginalUri;
use axum::http::Method;
use axum::Router;
use std::future::Future;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod error;
pub mod pagination;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorDetail, ErrorResponse};
pub use pagination::PageQuery;
pub use state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let request_timeout = state.request_timeout();
    let concurrency_limit = state.config.concurrency_limit;

    let router = Router::new()
        .merge(routes::api())
        .merge(routes::service())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(cors())
        .layer(TraceLayer::new_for_http());

    let router = match concurrency_limit {
        Some(limit) => router.layer(ConcurrencyLimitLayer::new(limit)),
        None => router,
    };

    let router = match request_timeout {
        Some(timeout) => router.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(timeout)),
        ),
        None => router,
    };

    router.with_state(state)
}

/// Binds `host:port` from the state's config and serves until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "PSGC API listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(300))
}

async fn not_found(uri: OriginalUri) -> ApiError {
    ApiError::NotFound {
        message: format!("not found: {}", uri.0.path()),
    }
}

async fn method_not_allowed(method: Method, uri: OriginalUri) -> ApiError {
    ApiError::MethodNotAllowed {
        message: format!("{method} is not allowed on {}", uri.0.path()),
    }
}

async fn handle_timeout_error(err: tower::BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return ApiError::ServiceUnavailable {
            message: "request timed out".to_string(),
        };
    }
    ApiError::Internal {
        message: format!("unhandled middleware error: {err}"),
    }
}
