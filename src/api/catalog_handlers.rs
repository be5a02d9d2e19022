//! HTTP handlers for the storefront catalog.
//!
//! Thin adapters over `StorefrontService`: they validate input, parse facet
//! values out of the raw query string and shape the JSON responses.

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::state::AppState;
use crate::application::catalog::{parse_facet_filters, ProductPage, ProductQuery};
use crate::domain::{CategoryView, TaxonomyItem};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, RawQuery, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[allow(unused_imports)]
use serde_json::json; // Used in utoipa::path examples

// ============================================================================
// Query Parameters
// ============================================================================

/// Listing parameters. Facet values (`brand`, `color`, `size`, `price`, ...)
/// are read from the raw query string and may be repeated or comma-separated.
#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// Page number (1-based)
    #[param(default = 1, minimum = 1, example = 1)]
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<usize>,

    /// Products per page; 1000 returns everything unfiltered
    #[param(default = 8, minimum = 1, maximum = 1000, example = 8)]
    #[validate(range(min = 1, max = 1000))]
    pub per_page: Option<usize>,

    /// One of nameAZ, nameZA, priceLowToHigh, priceHighToLow, brand
    #[param(default = "nameAZ", example = "priceLowToHigh")]
    #[validate(length(max = 32))]
    pub sort_by: Option<String>,

    /// Free-text fuzzy search over name and brand
    #[param(example = "trail")]
    #[validate(length(max = 100))]
    pub search: Option<String>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FacetsResponse {
    pub facets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvalidateResponse {
    pub status: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get the full category taxonomy
#[utoipa::path(
    get,
    path = "/v1/taxonomy",
    responses(
        (status = 200, description = "Flat taxonomy list", body = Vec<TaxonomyItem>),
        (status = 503, description = "Upstream taxonomy unavailable", body = ErrorResponse)
    ),
    tag = "catalog"
)]
#[instrument(skip(state))]
pub async fn taxonomy_handler(State(state): State<AppState>) -> Result<Json<Vec<TaxonomyItem>>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "taxonomy").increment(1);

    let taxonomy = state.storefront.taxonomy().await;
    if taxonomy.is_empty() {
        return Err(ApiError::Unavailable(
            "Taxonomy could not be loaded from upstream".to_string(),
        ));
    }
    Ok(Json(taxonomy))
}

/// Resolve a category page: node, breadcrumbs and child categories
#[utoipa::path(
    get,
    path = "/v1/categories/{slug}",
    params(("slug" = String, Path, description = "Taxonomy WEB_URL", example = "shoes-running")),
    responses(
        (status = 200, description = "Category view", body = CategoryView,
            example = json!({
                "category": { "WEB_TAXONOMY_ID": 2, "DEPT": "Shoes", "TYP": "Running", "SUBTYP_1": "EMPTY", "SUBTYP_2": "EMPTY", "SUBTYP_3": "EMPTY", "WEB_URL": "shoes-running" },
                "breadcrumbs": [
                    { "label": "Home", "url": "/" },
                    { "label": "Shoes", "url": "shoes" },
                    { "label": "Running", "url": "shoes-running" }
                ],
                "children": []
            })
        ),
        (status = 404, description = "Unknown slug", body = ErrorResponse)
    ),
    tag = "catalog"
)]
#[instrument(skip(state))]
pub async fn category_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CategoryView>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "category").increment(1);

    state
        .storefront
        .category(&slug)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound(slug))
}

/// List one page of products for a category
#[utoipa::path(
    get,
    path = "/v1/categories/{slug}/products",
    params(
        ("slug" = String, Path, description = "Taxonomy WEB_URL", example = "shoes-running"),
        ProductListParams
    ),
    responses(
        (status = 200, description = "Product page; empty when products are unavailable", body = ProductPage),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse)
    ),
    tag = "catalog"
)]
#[instrument(skip(state, params, raw_query))]
pub async fn products_handler(
    Path(slug): Path<String>,
    params: Result<Query<ProductListParams>, QueryRejection>,
    RawQuery(raw_query): RawQuery,
    State(state): State<AppState>,
) -> Result<Json<ProductPage>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    params
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    metrics::counter!("api_requests_total", "endpoint" => "products").increment(1);

    let filters = parse_facet_filters(raw_query.as_deref().unwrap_or_default(), state.storefront.facets());
    let query = ProductQuery::new(params.page, params.per_page, params.sort_by.as_deref())
        .with_search(params.search)
        .with_filters(filters);

    Ok(Json(state.storefront.products(&slug, &query).await))
}

/// List the facet names accepted by the products endpoint
#[utoipa::path(
    get,
    path = "/v1/facets",
    responses((status = 200, description = "Facet names", body = FacetsResponse)),
    tag = "catalog"
)]
pub async fn facets_handler(State(state): State<AppState>) -> Json<FacetsResponse> {
    Json(FacetsResponse {
        facets: state.storefront.facets().names().map(str::to_string).collect(),
    })
}

/// Drop cached taxonomy and product sets
#[utoipa::path(
    post,
    path = "/v1/cache/invalidate",
    responses((status = 200, description = "Caches cleared", body = InvalidateResponse)),
    tag = "cache"
)]
#[instrument(skip(state))]
pub async fn invalidate_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    state.storefront.invalidate().await;
    Json(InvalidateResponse {
        status: "invalidated".to_string(),
    })
}
