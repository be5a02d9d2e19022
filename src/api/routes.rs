use crate::api::catalog_handlers::{
    category_handler, facets_handler, invalidate_handler, products_handler, taxonomy_handler,
};
use crate::api::doc::ApiDoc;
use crate::api::handlers::{health_handler, metrics_handler};
use crate::api::state::AppState;
use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};

use axum::http::HeaderValue;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn create_router(state: AppState, allowed_origins: String) -> Router {
    let cors = cors_layer(&allowed_origins);

    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_response(|response: &axum::http::Response<_>, latency: Duration, _span: &tracing::Span| {
                    if latency.as_millis() > 1000 {
                        tracing::warn!(
                            status = response.status().as_u16(),
                            "Slow HTTP request: {}ms",
                            latency.as_millis()
                        );
                    }
                }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(60),
        ))
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // System endpoints (no versioning)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/v1/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }))
        // Catalog
        .route("/v1/taxonomy", get(taxonomy_handler))
        .route("/v1/facets", get(facets_handler))
        .route("/v1/categories/{slug}", get(category_handler))
        .route("/v1/categories/{slug}/products", get(products_handler))
        .route("/v1/cache/invalidate", post(invalidate_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(middleware)
        .with_state(state)
}

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins == "*" {
        return CorsLayer::permissive();
    }

    let origin_values: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    match origin_values.len() {
        0 => {
            tracing::warn!("No valid CORS origins found, falling back to permissive CORS");
            CorsLayer::permissive()
        }
        1 => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin_values[0].clone()))
            .allow_methods(Any)
            .allow_headers(Any),
        _ => CorsLayer::new()
            .allow_origin(AllowOrigin::list(origin_values))
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Records request count and latency per matched route.
async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let status_class = format!("{}xx", status / 100);
    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.to_string(),
        "status_class" => status_class
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}
