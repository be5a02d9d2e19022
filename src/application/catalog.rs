//! Product listing pipeline: dedup, fuzzy search, faceted filtering, sorting
//! and pagination over a raw product set.
//!
//! `select_products` is pure. The same products, facets and query always give
//! the same page; nothing here touches the network or the caches.

use crate::domain::{Product, Variation};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use utoipa::ToSchema;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: usize = 8;

/// Page sizes at or above this value mean "return everything, unfiltered".
pub const ALL_PRODUCTS: usize = 1000;

// ============================================================================
// Sorting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    NameAz,
    NameZa,
    PriceLowToHigh,
    PriceHighToLow,
    Brand,
    /// Unrecognized key: keep input order
    Unsorted,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "nameAZ" => SortKey::NameAz,
            "nameZA" => SortKey::NameZa,
            "priceLowToHigh" => SortKey::PriceLowToHigh,
            "priceHighToLow" => SortKey::PriceHighToLow,
            "brand" => SortKey::Brand,
            _ => SortKey::Unsorted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::NameAz => "nameAZ",
            SortKey::NameZa => "nameZA",
            SortKey::PriceLowToHigh => "priceLowToHigh",
            SortKey::PriceHighToLow => "priceHighToLow",
            SortKey::Brand => "brand",
            SortKey::Unsorted => "none",
        }
    }
}

// ============================================================================
// Facets
// ============================================================================

pub type ProductField = fn(&Product) -> &str;
pub type VariationField = fn(&Variation) -> &str;

/// Where a facet reads its value from.
#[derive(Clone, Copy)]
pub enum FacetSource {
    /// Fixed price bands over `SELLING_PRICE`
    Price,
    /// Matches if any variation has the value
    Variation(VariationField),
    /// Matches on a field of the product itself
    Field(ProductField),
}

impl std::fmt::Debug for FacetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacetSource::Price => f.write_str("Price"),
            FacetSource::Variation(_) => f.write_str("Variation"),
            FacetSource::Field(_) => f.write_str("Field"),
        }
    }
}

/// Price bands offered by the price facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBand {
    Under50,
    From50To100,
    From100To200,
    Over200,
}

impl PriceBand {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Under $50" => Some(PriceBand::Under50),
            "$50 - $100" => Some(PriceBand::From50To100),
            "$100 - $200" => Some(PriceBand::From100To200),
            "Over $200" => Some(PriceBand::Over200),
            _ => None,
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        match self {
            PriceBand::Under50 => price < 50.0,
            PriceBand::From50To100 => (50.0..=100.0).contains(&price),
            PriceBand::From100To200 => (100.0..=200.0).contains(&price),
            PriceBand::Over200 => price > 200.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FacetDefinition {
    pub name: String,
    pub source: FacetSource,
}

impl FacetDefinition {
    /// OR semantics: the product passes if any requested value matches.
    pub fn matches(&self, product: &Product, values: &[String]) -> bool {
        match self.source {
            // unknown band labels pass everything
            FacetSource::Price => values.iter().any(|label| {
                PriceBand::parse(label).is_none_or(|band| band.contains(product.selling_price))
            }),
            FacetSource::Variation(field) => product
                .variations
                .iter()
                .any(|v| values.iter().any(|value| field(v) == value)),
            FacetSource::Field(field) => values.iter().any(|value| field(product) == value),
        }
    }
}

fn brand(p: &Product) -> &str {
    &p.brand
}

fn dept(p: &Product) -> &str {
    &p.dept
}

fn typ(p: &Product) -> &str {
    &p.typ
}

fn subtyp(p: &Product) -> &str {
    &p.subtyp
}

fn color(v: &Variation) -> &str {
    &v.color
}

fn size(v: &Variation) -> &str {
    &v.size
}

/// Facets known to the listing, looked up case-insensitively by name.
#[derive(Debug, Clone)]
pub struct FacetRegistry {
    facets: BTreeMap<String, FacetDefinition>,
}

impl FacetRegistry {
    pub fn empty() -> Self {
        Self {
            facets: BTreeMap::new(),
        }
    }

    pub fn register(mut self, name: &str, source: FacetSource) -> Self {
        let name = name.to_lowercase();
        self.facets.insert(
            name.clone(),
            FacetDefinition { name, source },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&FacetDefinition> {
        self.facets.get(&name.to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.facets.keys().map(String::as_str)
    }
}

impl Default for FacetRegistry {
    fn default() -> Self {
        Self::empty()
            .register("brand", FacetSource::Field(brand))
            .register("dept", FacetSource::Field(dept))
            .register("typ", FacetSource::Field(typ))
            .register("subtyp", FacetSource::Field(subtyp))
            .register("color", FacetSource::Variation(color))
            .register("size", FacetSource::Variation(size))
            .register("price", FacetSource::Price)
    }
}

// ============================================================================
// Query
// ============================================================================

/// Everything the listing needs from the request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
    pub sort_by: SortKey,
    pub search: Option<String>,
    /// Facet name to requested values
    pub filters: BTreeMap<String, Vec<String>>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            sort_by: SortKey::default(),
            search: None,
            filters: BTreeMap::new(),
        }
    }
}

impl ProductQuery {
    pub fn new(page: Option<usize>, per_page: Option<usize>, sort_by: Option<&str>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            per_page: per_page.filter(|p| *p > 0).unwrap_or(DEFAULT_PER_PAGE),
            sort_by: sort_by
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(SortKey::parse)
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search;
        self
    }

    pub fn with_filter(mut self, facet: &str, values: &[&str]) -> Self {
        self.filters
            .entry(facet.to_lowercase())
            .or_default()
            .extend(values.iter().map(|v| v.to_string()));
        self
    }

    pub fn with_filters(mut self, filters: BTreeMap<String, Vec<String>>) -> Self {
        self.filters = filters;
        self
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Collect facet values from a raw query string.
///
/// Values may be repeated (`color=Red&color=Blue`) or comma-separated
/// (`color=Red,Blue`); each piece is decoded on its own, so an encoded comma
/// (`%2C`) stays part of its value. Keys that are not registered facets are
/// ignored.
pub fn parse_facet_filters(raw_query: &str, facets: &FacetRegistry) -> BTreeMap<String, Vec<String>> {
    let mut filters: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for pair in raw_query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let Some(facet) = facets.get(&decode_component(raw_key)) else {
            continue;
        };

        let values = raw_value
            .split(',')
            .map(decode_component)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        filters.entry(facet.name.clone()).or_default().extend(values);
    }

    filters.retain(|_, values| !values.is_empty());
    filters
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// One page of the listing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_pages: usize,
    /// Matching products before pagination
    pub product_count: usize,
}

impl ProductPage {
    /// The shape returned when products could not be retrieved.
    pub fn empty() -> Self {
        Self {
            products: Vec::new(),
            total_pages: 1,
            product_count: 0,
        }
    }
}

/// Case-insensitive subsequence matcher over NAME and BRAND.
pub struct FuzzyMatcher {
    pattern: Regex,
}

impl FuzzyMatcher {
    /// Build a matcher for `term`; `None` if the term is blank. Every
    /// character of the trimmed term, inner spaces included, must appear in
    /// order.
    pub fn new(term: &str) -> Option<Self> {
        let parts: Vec<String> = term
            .trim()
            .chars()
            .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
            .collect();
        if parts.is_empty() {
            return None;
        }

        RegexBuilder::new(&parts.join(".*?"))
            .case_insensitive(true)
            .build()
            .ok()
            .map(|pattern| Self { pattern })
    }

    /// Brand matches weigh more than name matches; zero means no match.
    pub fn score(&self, product: &Product) -> u32 {
        let mut score = 0;
        if self.pattern.is_match(&product.brand) {
            score += 2;
        }
        if self.pattern.is_match(&product.name) {
            score += 1;
        }
        score
    }
}

/// Run the listing pipeline over `products`.
pub fn select_products(products: &[Product], facets: &FacetRegistry, query: &ProductQuery) -> ProductPage {
    let unique = dedup_by_style(products);

    let searched: Vec<&Product> = match query.search_term().and_then(FuzzyMatcher::new) {
        Some(matcher) => unique
            .into_iter()
            .filter(|p| matcher.score(p) > 0)
            .collect(),
        None => unique,
    };

    if query.per_page >= ALL_PRODUCTS {
        return ProductPage {
            product_count: searched.len(),
            total_pages: 1,
            products: searched.into_iter().cloned().collect(),
        };
    }

    let mut filtered: Vec<&Product> = searched
        .into_iter()
        .filter(|p| matches_filters(p, facets, &query.filters))
        .collect();

    sort_products(&mut filtered, query.sort_by);
    paginate(filtered, query.page, query.per_page)
}

/// Keep the first product for each `STYLE_ID`, preserving order.
pub fn dedup_by_style(products: &[Product]) -> Vec<&Product> {
    let mut seen = HashSet::with_capacity(products.len());
    products
        .iter()
        .filter(|p| seen.insert(p.style_id))
        .collect()
}

/// AND across facets, OR within a facet. Unregistered names are ignored.
fn matches_filters(product: &Product, facets: &FacetRegistry, filters: &BTreeMap<String, Vec<String>>) -> bool {
    filters.iter().all(|(name, values)| {
        if values.is_empty() {
            return true;
        }
        facets
            .get(name)
            .is_none_or(|facet| facet.matches(product, values))
    })
}

/// Stable sort; missing values go last whatever the direction.
pub fn sort_products(products: &mut [&Product], sort_by: SortKey) {
    match sort_by {
        SortKey::NameAz => products.sort_by(|a, b| missing_last(text(&a.name), text(&b.name), false, cmp_text)),
        SortKey::NameZa => products.sort_by(|a, b| missing_last(text(&a.name), text(&b.name), true, cmp_text)),
        SortKey::Brand => products.sort_by(|a, b| missing_last(text(&a.brand), text(&b.brand), false, cmp_text)),
        SortKey::PriceLowToHigh => products.sort_by(|a, b| {
            missing_last(price(a.regular_price), price(b.regular_price), false, f64::total_cmp)
        }),
        SortKey::PriceHighToLow => products.sort_by(|a, b| {
            missing_last(price(a.regular_price), price(b.regular_price), true, f64::total_cmp)
        }),
        SortKey::Unsorted => {}
    }
}

fn text(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.trim().is_empty())
}

fn price(value: f64) -> Option<f64> {
    Some(value).filter(|v| v.is_finite())
}

fn cmp_text(a: &&str, b: &&str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn missing_last<T>(a: Option<T>, b: Option<T>, descending: bool, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => cmp(&a, &b).reverse(),
        (Some(a), Some(b)) => cmp(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn paginate(filtered: Vec<&Product>, page: usize, per_page: usize) -> ProductPage {
    let per_page = per_page.max(1);
    let product_count = filtered.len();
    let total_pages = product_count.div_ceil(per_page).max(1);
    let offset = page.max(1).saturating_sub(1).saturating_mul(per_page);

    ProductPage {
        products: filtered
            .into_iter()
            .skip(offset)
            .take(per_page)
            .cloned()
            .collect(),
        total_pages,
        product_count,
    }
}
