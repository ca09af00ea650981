//! Salesbook Web Server
//!
//! Axum-based REST API for recording daily branch sales and reading
//! monthly reports.
//!
//! - JSON in, JSON out; errors are `{ "error": "..." }`
//! - Restrictive CORS policy and security headers
//! - Request tracing via tower-http
//! - Sanitized error responses (internal detail is logged, not returned)

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{debug, error, info};

use salesbook_core::{Database, RecordStore, SalesLedger};

mod handlers;

/// Maximum JSON request body size (64 KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub ledger: SalesLedger<Database>,
}

/// Create the application router
pub fn create_router(ledger: SalesLedger<Database>, config: ServerConfig) -> Router {
    ledger.store().on_snapshot_change(Box::new(|snapshot| {
        debug!(records = snapshot.len(), "Sales snapshot changed");
    }));

    let state = Arc::new(AppState { ledger });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/branches", get(handlers::list_branches))
        .route(
            "/records",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route("/records/:branch/:date", get(handlers::get_record))
        .route("/report", get(handlers::get_report));

    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server
pub async fn serve(ledger: SalesLedger<Database>, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(ledger, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    ledger: SalesLedger<Database>,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        app_id = %ledger.config().app_id,
        branches = ledger.branches().len(),
        "Serving sales ledger"
    );

    let app = create_router(ledger, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes are reported back; everything else stays in the log
        if let Some(core_err) = err.downcast_ref::<salesbook_core::Error>() {
            use salesbook_core::Error as CoreError;
            match core_err {
                CoreError::UnknownBranch(_)
                | CoreError::InvalidPeriod(_)
                | CoreError::InvalidData(_) => return Self::bad_request(&core_err.to_string()),
                CoreError::NotFound(_) => return Self::not_found(&core_err.to_string()),
                _ => {}
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}
