//! HTTP client for the upstream storefront API.
//!
//! Both upstream resources live behind one endpoint and are selected with a
//! `method` query parameter. Bodies are read as a byte stream and stitched
//! together before parsing, since the upstream sends large arrays chunked.
//! Retry policy belongs to the callers; this client makes exactly one request
//! per call.

use crate::domain::{Product, ProductSource, TaxonomyItem, TaxonomyKey, TaxonomySource};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upstream method returning the flat taxonomy list
const TAXONOMY_METHOD: &str = "getWebTaxonomy";

/// Upstream method returning products for a department/type
const PRODUCTS_METHOD: &str = "getproductsbycategorydetails";

/// Storefront upstream API client
#[derive(Clone)]
pub struct StorefrontApiClient {
    client: Client,
    base_url: String,
}

impl StorefrontApiClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent("StorefrontCatalogGateway/1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query parameters for a product request; unset levels are left out.
    pub fn product_params(key: &TaxonomyKey) -> Vec<(&'static str, String)> {
        let mut params = vec![("method", PRODUCTS_METHOD.to_string())];
        if let Some(dept) = &key.dept {
            params.push(("dept", dept.clone()));
        }
        if let Some(typ) = &key.typ {
            params.push(("typ", typ.clone()));
        }
        params
    }

    /// GET the endpoint and return the elements of its JSON array body.
    async fn get_array(&self, params: &[(&'static str, String)]) -> Result<Vec<Value>> {
        debug!("Fetching from storefront API: {} {:?}", self.base_url, params);

        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to fetch from {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            bail!("API request failed with status {}: {}", status, error_body);
        }

        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.context("Failed while reading response body")?;
            body.extend_from_slice(&chunk);
        }

        let json: Value = serde_json::from_slice(&body)
            .with_context(|| format!("Failed to parse JSON from {}", self.base_url))?;

        match json {
            Value::Array(items) => Ok(items),
            other => bail!("Expected a JSON array, got {}", json_kind(&other)),
        }
    }
}

/// Parse each element on its own so one malformed record does not sink the
/// whole response.
fn parse_items<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping malformed {}: {}", what, e);
                None
            }
        })
        .collect();

    if parsed.len() < total {
        warn!("Skipped {} of {} malformed {} records", total - parsed.len(), total, what);
    }
    parsed
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl TaxonomySource for StorefrontApiClient {
    async fn fetch_taxonomy(&self) -> Result<Vec<TaxonomyItem>> {
        info!("Fetching web taxonomy");
        let items = self
            .get_array(&[("method", TAXONOMY_METHOD.to_string())])
            .await?;
        Ok(parse_items(items, "taxonomy"))
    }
}

#[async_trait]
impl ProductSource for StorefrontApiClient {
    async fn fetch_products(&self, key: &TaxonomyKey) -> Result<Vec<Product>> {
        let params = Self::product_params(key);
        info!("Fetching products: {:?}", params);
        let items = self.get_array(&params).await?;
        Ok(parse_items(items, "product"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = StorefrontApiClient::new("http://localhost:8080/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn test_product_params_skip_unset_levels() {
        let full = StorefrontApiClient::product_params(&TaxonomyKey::new(Some("Shoes"), Some("Running")));
        assert_eq!(
            full,
            vec![
                ("method", PRODUCTS_METHOD.to_string()),
                ("dept", "Shoes".to_string()),
                ("typ", "Running".to_string()),
            ]
        );

        let dept_only = StorefrontApiClient::product_params(&TaxonomyKey::new(Some("Bags"), None));
        assert_eq!(dept_only.len(), 2);
        assert_eq!(dept_only[1], ("dept", "Bags".to_string()));
    }

    #[test]
    fn test_parse_items_skips_malformed_records() {
        let items = vec![
            json!({ "STYLE_ID": 1, "NAME": "Ok" }),
            json!({ "STYLE_ID": "not-a-number" }),
            json!({ "STYLE_ID": "3", "NAME": "Also ok" }),
        ];
        let products: Vec<Product> = parse_items(items, "product");

        assert_eq!(products.len(), 2);
        assert_eq!(products[1].style_id, 3);
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!({})), "object");
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!([1])), "array");
    }
}
