//! Storefront catalog service.
//!
//! Ties the taxonomy store, category resolver, product cache and listing
//! pipeline together for one page request. Listing never fails: any
//! retrieval error degrades to an empty page.

use crate::application::catalog::{select_products, FacetRegistry, ProductPage, ProductQuery};
use crate::application::category_resolver::{find_by_web_url, resolve_category};
use crate::application::product_cache::ProductCache;
use crate::application::taxonomy_store::TaxonomyStore;
use crate::domain::{CategoryView, TaxonomyItem, TaxonomyKey};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::{error, info};

pub struct StorefrontService {
    taxonomy: Arc<TaxonomyStore>,
    products: Arc<ProductCache>,
    facets: FacetRegistry,
}

impl StorefrontService {
    pub fn new(taxonomy: Arc<TaxonomyStore>, products: Arc<ProductCache>, facets: FacetRegistry) -> Self {
        info!(
            "Initialized StorefrontService with facets: {}",
            facets.names().collect::<Vec<_>>().join(", ")
        );
        Self {
            taxonomy,
            products,
            facets,
        }
    }

    pub fn facets(&self) -> &FacetRegistry {
        &self.facets
    }

    /// Full taxonomy list; empty when upstream is unavailable.
    pub async fn taxonomy(&self) -> Vec<TaxonomyItem> {
        self.taxonomy.fetch_taxonomy_data().await
    }

    /// Category node, breadcrumbs and children for a slug.
    pub async fn category(&self, web_url: &str) -> Option<CategoryView> {
        let taxonomy = self.taxonomy.fetch_taxonomy_data().await;
        resolve_category(&taxonomy, web_url)
    }

    /// One page of products for the category at `web_url`.
    pub async fn products(&self, web_url: &str, query: &ProductQuery) -> ProductPage {
        match self.try_products(web_url, query).await {
            Ok(page) => page,
            Err(e) => {
                error!("Product listing failed for {}: {:#}", web_url, e);
                metrics::counter!("product_listing_failures_total").increment(1);
                ProductPage::empty()
            }
        }
    }

    async fn try_products(&self, web_url: &str, query: &ProductQuery) -> Result<ProductPage> {
        let taxonomy = self.taxonomy.fetch_taxonomy_data().await;
        let node = find_by_web_url(&taxonomy, web_url)
            .ok_or_else(|| anyhow!("Unknown category: {}", web_url))?;

        let key = TaxonomyKey::from(node);
        let raw = self
            .products
            .get_cached_products(&key, query.search_term().unwrap_or_default())
            .await?;

        Ok(select_products(&raw, &self.facets, query))
    }

    /// Clear every cache tier this service owns.
    pub async fn invalidate(&self) {
        self.taxonomy.invalidate().await;
        self.products.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures::{product, shoe_taxonomy};
    use crate::application::memory_cache::test_support::ManualClock;
    use crate::application::taxonomy_store::RetryPolicy;
    use crate::domain::{Clock, MockCacheRepository, MockProductSource, MockTaxonomySource};
    use std::time::Duration;

    fn remote() -> Arc<MockCacheRepository> {
        let mut remote = MockCacheRepository::new();
        remote.expect_get().returning(|_| Ok(None));
        remote.expect_set().returning(|_, _, _| Ok(()));
        remote.expect_delete().returning(|_| Ok(()));
        Arc::new(remote)
    }

    fn service(taxonomy: MockTaxonomySource, products: MockProductSource) -> StorefrontService {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at(1_700_000_000_000));
        let retry = RetryPolicy {
            attempts: 3,
            attempt_timeout: Duration::from_millis(50),
            backoff: Duration::from_millis(1),
        };
        let store = TaxonomyStore::with_settings(Arc::new(taxonomy), remote(), clock.clone(), 3600, retry);
        let cache = ProductCache::new(Arc::new(products), remote(), clock);
        StorefrontService::new(Arc::new(store), Arc::new(cache), FacetRegistry::default())
    }

    fn taxonomy_source() -> MockTaxonomySource {
        let mut source = MockTaxonomySource::new();
        source.expect_fetch_taxonomy().returning(|| Ok(shoe_taxonomy()));
        source
    }

    #[tokio::test]
    async fn test_products_use_dept_and_type_of_slug() {
        let mut products = MockProductSource::new();
        products
            .expect_fetch_products()
            .withf(|key| key == &TaxonomyKey::new(Some("Shoes"), Some("Running")))
            .times(1)
            .returning(|_| {
                Ok((1..=10)
                    .map(|i| product(i, &format!("Runner {:02}", i), "Acme", 60.0))
                    .collect())
            });

        let service = service(taxonomy_source(), products);
        let page = service
            .products("shoes-running-trail", &ProductQuery::new(Some(2), Some(8), None))
            .await;
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.product_count, 10);

        // sibling slug under the same dept/type shares the cached set
        let road = service.products("shoes-running-road", &ProductQuery::default()).await;
        assert_eq!(road.product_count, 10);
    }

    #[tokio::test]
    async fn test_upstream_failure_yields_empty_page() {
        let mut products = MockProductSource::new();
        products
            .expect_fetch_products()
            .returning(|_| Err(anyhow!("response was not a JSON array")));

        let page = service(taxonomy_source(), products)
            .products("shoes", &ProductQuery::default())
            .await;
        assert_eq!(page, ProductPage::empty());
    }

    #[tokio::test]
    async fn test_unknown_slug_yields_empty_page() {
        let mut products = MockProductSource::new();
        products.expect_fetch_products().times(0);

        let service = service(taxonomy_source(), products);
        assert_eq!(
            service.products("does-not-exist", &ProductQuery::default()).await,
            ProductPage::empty()
        );
        assert!(service.category("does-not-exist").await.is_none());
    }

    #[tokio::test]
    async fn test_category_view() {
        let service = service(taxonomy_source(), MockProductSource::new());
        let view = service.category("shoes").await.unwrap();

        assert_eq!(view.breadcrumbs.len(), 2);
        assert_eq!(view.children.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_refetches_taxonomy() {
        let mut taxonomy = MockTaxonomySource::new();
        taxonomy
            .expect_fetch_taxonomy()
            .times(2)
            .returning(|| Ok(shoe_taxonomy()));

        let service = service(taxonomy, MockProductSource::new());
        assert_eq!(service.taxonomy().await.len(), 7);
        service.invalidate().await;
        assert_eq!(service.taxonomy().await.len(), 7);
    }
}
