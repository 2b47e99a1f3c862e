//! Size label normalization and purchasable-size resolution.
//!
//! Sites put colors, fits, and sizes into the same variant option slots, so
//! a raw label is only accepted when it matches a known size shape and
//! contains no color word.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::types::{ProductSources, Variant};

/// Letter sizes in ascending rank. `OS` (one size) sorts after the range.
const LETTER_SIZES: [&str; 11] = [
    "XXS", "XS", "S", "M", "L", "XL", "2XL", "3XL", "4XL", "5XL", "OS",
];

const WORD_SIZES: [(&str, &str); 14] = [
    ("EXTRA SMALL", "XS"),
    ("X-SMALL", "XS"),
    ("SMALL", "S"),
    ("MEDIUM", "M"),
    ("LARGE", "L"),
    ("EXTRA LARGE", "XL"),
    ("X-LARGE", "XL"),
    ("XX-LARGE", "2XL"),
    ("XXX-LARGE", "3XL"),
    ("ONE SIZE", "OS"),
    ("ONE SIZE FITS ALL", "OS"),
    ("O/S", "OS"),
    ("OSFA", "OS"),
    ("ONESIZE", "OS"),
];

/// Color and pattern words seen in option slots. A label equal to or
/// containing one of these is never a size.
const COLOR_WORDS: [&str; 55] = [
    "BLACK", "WHITE", "BLUE", "RED", "GREEN", "BROWN", "GRAY", "GREY", "NAVY", "TAN", "BEIGE",
    "RAVEN", "RUST", "GOLD", "SILVER", "CREAM", "OLIVE", "KHAKI", "CHARCOAL", "HEATHER",
    "INDIGO", "CRIMSON", "BURGUNDY", "MAROON", "PURPLE", "PINK", "ORANGE", "YELLOW", "DARK",
    "LIGHT", "BRIGHT", "MULTI", "PLAID", "CAMO", "WILDLIFE", "SORREL", "LARCH", "TROUT",
    "RIVER", "SMOKE", "FALLS", "ALMOND", "MAPLE", "BARK", "DUST", "CLAY", "FLAG", "ARMY",
    "FIELD", "STONE", "SAND", "DECO", "FLAME", "FRONTIER", "OTTER",
];

static NUMERAL_XL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([2-5])XL?$").expect("valid regex"));

static REPEATED_XL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(X{2,5})L$").expect("valid regex"));

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?:\.\d{1,2})?$").expect("valid regex"));

static DIMENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3}(?:\.\d)?)\s*W?\s*[X/]\s*(\d{1,3}(?:\.\d)?)\s*L?$").expect("valid regex")
});

/// A recognized size. The derived ordering is the display order: letter
/// sizes by rank, then numeric ascending, then dimension pairs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeLabel {
    /// Index into the letter-size rank table.
    Letter(usize),
    Numeric(Decimal),
    /// Waist × length.
    Dimension(Decimal, Decimal),
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeLabel::Letter(rank) => f.write_str(LETTER_SIZES[*rank]),
            SizeLabel::Numeric(n) => write!(f, "{}", n.normalize()),
            SizeLabel::Dimension(w, l) => write!(f, "{}x{}", w.normalize(), l.normalize()),
        }
    }
}

/// `true` when `raw` is, or contains, a known color word.
#[must_use]
pub fn is_color_label(raw: &str) -> bool {
    let upper = raw.to_uppercase();
    COLOR_WORDS.iter().any(|c| upper.contains(c))
}

/// Normalizes one raw size label.
///
/// Accepts letter sizes (`xl`, `XXL`→`2XL`, `2X`→`2XL`, `Medium`→`M`),
/// numeric sizes (`32`, `10.5`) and dimension pairs (`32x34`, `32W x 34L`,
/// `32/34`). Returns `None` for colors and anything unrecognized.
#[must_use]
pub fn normalize_size(raw: &str) -> Option<SizeLabel> {
    let upper = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
    if upper.is_empty() || is_color_label(&upper) {
        return None;
    }

    if let Some((_, letter)) = WORD_SIZES.iter().find(|(word, _)| *word == upper) {
        return letter_rank(letter).map(SizeLabel::Letter);
    }

    let compact: String = upper.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    if let Some(rank) = letter_rank(&compact) {
        return Some(SizeLabel::Letter(rank));
    }
    if let Some(caps) = NUMERAL_XL.captures(&compact) {
        return letter_rank(&format!("{}XL", &caps[1])).map(SizeLabel::Letter);
    }
    if let Some(caps) = REPEATED_XL.captures(&compact) {
        return letter_rank(&format!("{}XL", caps[1].len())).map(SizeLabel::Letter);
    }

    if NUMERIC.is_match(&compact) {
        return Decimal::from_str(&compact).ok().map(SizeLabel::Numeric);
    }
    if let Some(caps) = DIMENSION.captures(&upper) {
        let waist = Decimal::from_str(&caps[1]).ok()?;
        let length = Decimal::from_str(&caps[2]).ok()?;
        return Some(SizeLabel::Dimension(waist, length));
    }

    None
}

fn letter_rank(label: &str) -> Option<usize> {
    LETTER_SIZES.iter().position(|l| *l == label)
}

/// Extracts a size from a variant title such as `"Brown / XL"` or
/// `"32W x 34L - Tan"`. The whole title is tried first, then each segment.
fn size_from_title(title: &str) -> Option<SizeLabel> {
    normalize_size(title).or_else(|| {
        title
            .split([',', '|'])
            .flat_map(|part| part.split(" / "))
            .flat_map(|part| part.split(" - "))
            .find_map(normalize_size)
    })
}

/// Purchasable sizes across `variants`, deduplicated and in display order.
///
/// Unavailable variants are ignored. The size field is tried first, the
/// title second. An empty result is displayed as "N/A".
#[must_use]
pub fn resolve_sizes(variants: &[Variant]) -> Vec<String> {
    variants
        .iter()
        .filter(|v| v.available)
        .filter_map(|v| {
            v.size
                .as_deref()
                .and_then(normalize_size)
                .or_else(|| v.title.as_deref().and_then(size_from_title))
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|label| label.to_string())
        .collect()
}

/// Sizes for a product: script variants when they yield any size, otherwise
/// the JSON fragment variants.
#[must_use]
pub fn resolve_product_sizes(sources: &ProductSources) -> Vec<String> {
    let from_script = resolve_sizes(&sources.script_variants);
    if from_script.is_empty() {
        resolve_sizes(&sources.json_variants)
    } else {
        from_script
    }
}

#[cfg(test)]
#[path = "sizes_test.rs"]
mod tests;
