//! Optional per-category size filtering.

use saletrack_core::{SaleItem, SizeCategory, SizePreferences};

use crate::sizes::normalize_size;

const BOTTOMS: [&str; 6] = ["jeans", "pants", "trousers", "chinos", "shorts", "trunks"];
const OUTERWEAR: [&str; 7] = ["jacket", "coat", "vest", "blazer", "parka", "anorak", "cruiser"];
const FOOTWEAR: [&str; 5] = ["shoe", "boot", "sneaker", "sandal", "loafer"];
const ACCESSORIES: [&str; 8] = ["hat", "cap", "belt", "bag", "backpack", "wallet", "glove", "scarf"];

/// Garment category from keywords in the product name. Anything
/// unrecognized is treated as a top.
#[must_use]
pub fn categorize(name: &str) -> SizeCategory {
    let words: Vec<String> = name
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_owned)
        .collect();
    if has_keyword(&words, &BOTTOMS) {
        SizeCategory::Bottoms
    } else if has_keyword(&words, &OUTERWEAR) {
        SizeCategory::Outerwear
    } else if has_keyword(&words, &FOOTWEAR) {
        SizeCategory::Footwear
    } else if has_keyword(&words, &ACCESSORIES) {
        SizeCategory::Accessories
    } else {
        SizeCategory::Tops
    }
}

/// Whole-word match, allowing a plural `s`.
fn has_keyword(words: &[String], keywords: &[&str]) -> bool {
    words.iter().any(|w| {
        keywords
            .iter()
            .any(|k| w.as_str() == *k || w.strip_suffix('s') == Some(*k))
    })
}

/// Whether `item` passes the size preferences.
///
/// Passes when filtering is disabled, the item has no known sizes, its
/// category has no list or the list contains `all`, or any size matches a
/// preferred size after normalization.
#[must_use]
pub fn matches_size_preference(item: &SaleItem, prefs: &SizePreferences) -> bool {
    if !prefs.enabled || item.sizes.is_empty() {
        return true;
    }
    let Some(preferred) = prefs.preferred_sizes.get(&categorize(&item.name)) else {
        return true;
    };
    if preferred.iter().any(|p| p.trim().eq_ignore_ascii_case("all")) {
        return true;
    }

    let wanted: Vec<String> = preferred.iter().map(|p| canonical_label(p)).collect();
    item.sizes
        .iter()
        .any(|size| wanted.contains(&canonical_label(size)))
}

fn canonical_label(raw: &str) -> String {
    normalize_size(raw).map_or_else(|| raw.trim().to_uppercase(), |label| label.to_string())
}
