//! Breadcrumb and child-category resolution over the flat taxonomy list.
//!
//! A node is the "category page" for level `k` when its levels `0..=k` are set
//! and level `k + 1` is unset. Deeper nodes under the same prefix are leaf or
//! sub-category pages.

use crate::domain::{BreadcrumbItem, CategoryView, TaxonomyItem, LEVEL_COUNT};

/// Find the node whose `WEB_URL` equals `web_url` (first match wins).
pub fn find_by_web_url<'a>(taxonomy: &'a [TaxonomyItem], web_url: &str) -> Option<&'a TaxonomyItem> {
    taxonomy.iter().find(|item| item.web_url == web_url)
}

/// Whether `candidate` is the category page for `node` at `level`.
fn is_category_page(candidate: &TaxonomyItem, node: &TaxonomyItem, level: usize) -> bool {
    let wanted = node.levels();
    let have = candidate.levels();

    have[..=level] == wanted[..=level] && (level + 1 >= LEVEL_COUNT || have[level + 1].is_none())
}

/// Build the Home-first trail for the node at `web_url`.
///
/// Returns `None` when the slug is unknown. Levels without a matching
/// category page are skipped.
pub fn resolve_breadcrumbs(taxonomy: &[TaxonomyItem], web_url: &str) -> Option<Vec<BreadcrumbItem>> {
    let node = find_by_web_url(taxonomy, web_url)?;
    let mut crumbs = vec![BreadcrumbItem::home()];

    for (level, value) in node.levels().iter().enumerate() {
        let Some(label) = value else { break };
        if let Some(page) = taxonomy
            .iter()
            .find(|candidate| is_category_page(candidate, node, level))
        {
            crumbs.push(BreadcrumbItem {
                label: label.to_string(),
                url: page.web_url.clone(),
            });
        }
    }

    Some(crumbs)
}

/// List the categories exactly one level below the node at `web_url`.
pub fn resolve_child_categories(taxonomy: &[TaxonomyItem], web_url: &str) -> Vec<TaxonomyItem> {
    let Some(node) = find_by_web_url(taxonomy, web_url) else {
        return Vec::new();
    };
    let Some(depth) = node.depth() else {
        return Vec::new();
    };
    let child = depth + 1;
    if child >= LEVEL_COUNT {
        return Vec::new();
    }

    let prefix = node.levels();
    taxonomy
        .iter()
        .filter(|item| {
            let levels = item.levels();
            levels[..child] == prefix[..child]
                && levels[child].is_some()
                && (child + 1 >= LEVEL_COUNT || levels[child + 1].is_none())
        })
        .cloned()
        .collect()
}

/// Resolve everything a category page needs in one pass.
pub fn resolve_category(taxonomy: &[TaxonomyItem], web_url: &str) -> Option<CategoryView> {
    let category = find_by_web_url(taxonomy, web_url)?.clone();
    let breadcrumbs = resolve_breadcrumbs(taxonomy, web_url)?;
    let children = resolve_child_categories(taxonomy, web_url);

    Some(CategoryView {
        category,
        breadcrumbs,
        children,
    })
}
