use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // System Handlers
        crate::api::handlers::health_handler,
        crate::api::handlers::metrics_handler,
        // Catalog Handlers
        crate::api::catalog_handlers::taxonomy_handler,
        crate::api::catalog_handlers::category_handler,
        crate::api::catalog_handlers::products_handler,
        crate::api::catalog_handlers::facets_handler,
        crate::api::catalog_handlers::invalidate_handler
    ),
    components(
        schemas(
            crate::api::handlers::HealthResponse,
            crate::api::handlers::HealthDependencies,
            crate::api::error::ErrorResponse,
            crate::api::catalog_handlers::FacetsResponse,
            crate::api::catalog_handlers::InvalidateResponse,
            crate::application::ProductPage,
            crate::domain::TaxonomyItem,
            crate::domain::BreadcrumbItem,
            crate::domain::CategoryView,
            crate::domain::Product,
            crate::domain::Variation
        )
    ),
    tags(
        (name = "system", description = "System endpoints for health checks and metrics"),
        (name = "catalog", description = "Category taxonomy, breadcrumbs and product listings"),
        (name = "cache", description = "Cache management")
    ),
    info(
        title = "Storefront Catalog Gateway",
        version = "0.1.0",
        description = "REST gateway over an upstream storefront API: category taxonomy, breadcrumb resolution and filtered, sorted, paginated product listings backed by a two-tier cache."
    )
)]
pub struct ApiDoc;
