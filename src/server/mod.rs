//! HTTP transport for the issue handler.
//!
//! Routes:
//! - `GET /health`
//! - `GET|POST|PUT|DELETE /api/issues/:project` (query, create, update, delete)
//!
//! Request failures are answered with `{"error": ..., "_id"?: ...}`. By
//! default they use status 200 like successes; with `strict_status` they map
//! onto 400, 404 and 500.

mod body;

pub use body::{body_fields, query_filter};

use crate::error::{HandlerError, Result};
use crate::handler::IssueHandler;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

/// Shared state for request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    handler: IssueHandler,
    strict_status: bool,
}

impl AppState {
    #[must_use]
    pub const fn new(handler: IssueHandler, strict_status: bool) -> Self {
        Self {
            handler,
            strict_status,
        }
    }

    /// Status code used for a request failure.
    #[must_use]
    pub const fn status_for(&self, err: &HandlerError) -> StatusCode {
        if !self.strict_status {
            StatusCode::OK
        } else if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn respond<T: Serialize>(&self, result: std::result::Result<T, HandlerError>) -> Response {
        match result {
            Ok(body) => Json(body).into_response(),
            Err(error) => RequestFailure {
                status: self.status_for(&error),
                error,
            }
            .into_response(),
        }
    }
}

#[derive(Debug)]
struct RequestFailure {
    status: StatusCode,
    error: HandlerError,
}

impl IntoResponse for RequestFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.error.payload())).into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/issues/:project",
            get(query_issues)
                .post(create_issue)
                .put(update_issue)
                .delete(delete_issue),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on `bind` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(bind: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "Issue service listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Issue service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn query_issues(
    State(state): State<AppState>,
    Path(project): Path<String>,
    query: std::result::Result<Query<body::Pairs>, QueryRejection>,
) -> Response {
    let filter = query_filter(query);
    state.respond(state.handler.query_filter(&project, &filter).await)
}

async fn create_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    req: Request,
) -> Response {
    let fields = body_fields(req).await;
    state.respond(state.handler.create(&project, &fields).await)
}

async fn update_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    req: Request,
) -> Response {
    let fields = body_fields(req).await;
    state.respond(state.handler.update(&project, &fields).await)
}

async fn delete_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    req: Request,
) -> Response {
    let fields = body_fields(req).await;
    state.respond(state.handler.delete(&project, &fields).await)
}
