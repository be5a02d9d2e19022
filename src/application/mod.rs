pub mod catalog;
pub mod category_resolver;
pub mod memory_cache;
pub mod product_cache;
pub mod storefront_service;
pub mod taxonomy_store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use catalog::{select_products, FacetRegistry, ProductPage, ProductQuery};
pub use memory_cache::MemoryCache;
pub use product_cache::ProductCache;
pub use storefront_service::StorefrontService;
pub use taxonomy_store::{RetryPolicy, TaxonomyStore};
