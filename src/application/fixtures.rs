//! Builders for taxonomy and product values used across unit tests.

use crate::domain::{Product, TaxonomyItem, Variation};

pub fn node(id: i64, levels: &[&str], web_url: &str) -> TaxonomyItem {
    let level = |i: usize| levels.get(i).map(|s| s.to_string());
    TaxonomyItem {
        web_taxonomy_id: id,
        dept: level(0),
        typ: level(1),
        subtyp_1: level(2),
        subtyp_2: level(3),
        subtyp_3: level(4),
        web_url: web_url.to_string(),
        active: true,
        short_desc: levels.last().map(|s| s.to_string()).unwrap_or_default(),
        long_desc: String::new(),
        meta_tags: String::new(),
        sort_position: id,
    }
}

/// Shoes > Running > Trail, Shoes > Running > Road, Shoes > Casual, Bags.
pub fn shoe_taxonomy() -> Vec<TaxonomyItem> {
    vec![
        node(1, &["Shoes"], "shoes"),
        node(2, &["Shoes", "Running"], "shoes-running"),
        node(3, &["Shoes", "Running", "Trail"], "shoes-running-trail"),
        node(4, &["Shoes", "Running", "Road"], "shoes-running-road"),
        node(5, &["Shoes", "Casual"], "shoes-casual"),
        node(6, &["Bags"], "bags"),
        node(7, &["Shoes", "Running", "Trail", "Waterproof"], "shoes-running-trail-waterproof"),
    ]
}

pub fn product(style_id: i64, name: &str, brand: &str, price: f64) -> Product {
    Product {
        style_id,
        name: name.to_string(),
        brand: brand.to_string(),
        dept: "Shoes".to_string(),
        typ: "Running".to_string(),
        subtyp: String::new(),
        selling_price: price,
        regular_price: price,
        image_url: String::new(),
        thumbnail_url: String::new(),
        variations: Vec::new(),
        alternate_images: Vec::new(),
    }
}

pub fn variation(color: &str, size: &str, quantity: u64) -> Variation {
    Variation {
        color: color.to_string(),
        size: size.to_string(),
        quantity,
        color_alias: None,
        hex: None,
        image_url: None,
        sku: None,
    }
}
