//! Final item assembly, deduplication and ordering.

use std::collections::HashMap;

use rust_decimal::Decimal;
use saletrack_core::{SaleItem, SiteDescriptor};

use crate::client::{absolutize_url, canonicalize_url};
use crate::price::ResolvedPrice;
use crate::sizes::is_color_label;
use crate::types::{ProductSources, Variant};

/// Builds the report record for one product, or `None` if it is excluded.
///
/// Exclusions: the link cannot be resolved to an absolute http(s) URL, or
/// the item is not discounted (`original > sale` fails) while
/// `include_undiscounted` is off. Undiscounted items that are kept carry
/// discount 0 and amount saved 0.
#[must_use]
pub fn assemble(
    sources: &ProductSources,
    price: &ResolvedPrice,
    sizes: Vec<String>,
    site: &SiteDescriptor,
    include_undiscounted: bool,
) -> Option<SaleItem> {
    let block = &sources.block;
    let Some(url) = canonicalize_url(&site.base_url, &block.href) else {
        tracing::debug!(name = %block.name, href = %block.href, "product link not resolvable");
        return None;
    };

    let (discount_percent, amount_saved) = match price.original {
        Some(original) if original > price.sale => (price.discount_percent, original - price.sale),
        _ if include_undiscounted => (0, Decimal::ZERO),
        _ => {
            tracing::debug!(name = %block.name, sale = %price.sale, "not discounted; excluded");
            return None;
        }
    };

    Some(SaleItem {
        name: colorway_name(block.name.trim(), sources),
        url,
        sale_price: price.sale,
        original_price: price.original,
        discount_percent,
        amount_saved,
        sizes,
        website: site.name.clone(),
        image_url: block
            .image_src
            .as_deref()
            .and_then(|src| absolutize_url(&site.base_url, src)),
    })
}

/// Appends the colorway (`"Field Jacket - Otter Green"`) when every available
/// variant shares one recognized color that the name does not already show.
/// Listings often carry one card per colorway under the same product name.
fn colorway_name(name: &str, sources: &ProductSources) -> String {
    let color = single_color(&sources.script_variants)
        .or_else(|| single_color(&sources.json_variants));
    match color {
        Some(color) if !name.to_lowercase().contains(&color.to_lowercase()) => {
            format!("{name} - {color}")
        }
        _ => name.to_owned(),
    }
}

fn single_color(variants: &[Variant]) -> Option<&str> {
    let mut colors = variants
        .iter()
        .filter(|v| v.available)
        .filter_map(|v| v.color.as_deref())
        .filter(|c| is_color_label(c));
    let first = colors.next()?;
    colors
        .all(|c| c.eq_ignore_ascii_case(first))
        .then_some(first)
}

/// Merges items sharing a canonical URL and sorts the result.
///
/// Of two records with the same URL the one with sizes wins over one
/// without; otherwise the first seen is kept. Ordering is discount
/// descending, then name case-insensitively, then URL, so repeated runs over
/// the same page produce the same sequence.
#[must_use]
pub fn dedupe_and_sort(items: Vec<SaleItem>) -> Vec<SaleItem> {
    let mut kept: Vec<SaleItem> = Vec::with_capacity(items.len());
    let mut by_url: HashMap<String, usize> = HashMap::new();

    for item in items {
        match by_url.get(&item.url) {
            Some(&idx) => {
                if kept[idx].sizes.is_empty() && !item.sizes.is_empty() {
                    kept[idx] = item;
                }
            }
            None => {
                by_url.insert(item.url.clone(), kept.len());
                kept.push(item);
            }
        }
    }

    kept.sort_by(|a, b| {
        b.discount_percent
            .cmp(&a.discount_percent)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.url.cmp(&b.url))
    });
    kept
}
