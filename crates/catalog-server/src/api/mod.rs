mod products;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        State,
    },
    http::{header, HeaderName, Method, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use catalog_core::{Environment, FilterError};
use catalog_db::DbError;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
    REQUEST_ID_HEADER,
};
use crate::service::ProductService;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductService>,
    pub env: Environment,
}

impl AppState {
    fn db_error(&self, error: &DbError) -> ApiError {
        map_db_error(self.env, error)
    }
}

/// Error response rendered as `{"status":"error","message":...}`.
///
/// `code` only selects the HTTP status; `detail` is serialized as `error`
/// and is only ever set outside production.
#[derive(Debug)]
pub struct ApiError {
    code: &'static str,
    message: String,
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ApiError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn status(&self) -> StatusCode {
        match self.code {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = ErrorEnvelope {
            status: "error",
            message: self.message,
            error: self.detail,
        };
        (status, Json(body)).into_response()
    }
}

impl From<FilterError> for ApiError {
    fn from(error: FilterError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Classifies storage failures: unique violations are 409, missing rows on
/// write are 404, anything else is a 500 whose detail is hidden in production.
pub(super) fn map_db_error(env: Environment, error: &DbError) -> ApiError {
    if let Some(constraint) = error.unique_violation() {
        tracing::warn!(constraint, "unique constraint violated");
        let message = if constraint.is_empty() {
            "a record with the same unique value already exists".to_string()
        } else {
            format!("unique constraint '{constraint}' violated")
        };
        return ApiError::new("conflict", message);
    }

    if matches!(error, DbError::NotFound) {
        return ApiError::not_found("product not found");
    }

    tracing::error!(error = %error, "database query failed");
    if env.exposes_error_detail() {
        ApiError::new("internal_error", error.to_string()).with_detail(format!("{error:?}"))
    } else {
        ApiError::new("internal_error", "internal server error")
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    // Literal segments outrank `{id}` in axum's router.
    Router::new()
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/api/products/filters", get(products::product_filters))
        .route("/api/products/count", get(products::count_products))
        .route("/api/products/deleted", get(products::list_deleted_products))
        .route(
            "/api/products/deleted/{id}",
            get(products::get_deleted_product),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/health", get(health));

    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map_or("-", |id| id.0.as_str());
        tracing::info_span!(
            "http",
            method = %req.method(),
            uri = %req.uri(),
            request_id,
        )
    });

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(trace)
                .layer(build_cors())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.products.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
