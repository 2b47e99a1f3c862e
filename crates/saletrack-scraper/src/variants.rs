//! Decoding of embedded variant data.
//!
//! Themes inline the product's variant matrix as a JSON-like literal assigned
//! to a global or property (`var meta = {...}`, `"variants": [...]`). The
//! literal is located by marker, cut out with a balanced-delimiter scan, and
//! parsed with `serde_json`. Decoding never fails loudly: any problem yields
//! an empty list so price and size resolution fall through to other sources.

use serde_json::Value;

use crate::error::DecodeError;
use crate::price::price_from_json;
use crate::sizes::normalize_size;
use crate::types::Variant;

/// Markers that precede a variant literal, most specific first.
const VARIANT_MARKERS: [&str; 6] = [
    "\"variants\":",
    "variants:",
    "\"product\":",
    "productJson =",
    "var meta =",
    "ShopifyAnalytics.meta =",
];

const OPTION_KEYS: [&str; 3] = ["option1", "option2", "option3"];

/// Returns `true` if `text` contains any known variant marker.
#[must_use]
pub fn contains_variant_marker(text: &str) -> bool {
    VARIANT_MARKERS.iter().any(|m| text.contains(m))
}

/// Decodes the variant list embedded in `script`.
///
/// Returns an empty list when no marker is present or the literal is
/// truncated or malformed; the reason is logged at debug level.
#[must_use]
pub fn decode_variants(script: &str) -> Vec<Variant> {
    match try_decode_variants(script) {
        Ok(variants) => variants,
        Err(e) => {
            tracing::debug!(error = %e, "embedded variant data not decoded");
            Vec::new()
        }
    }
}

/// Decodes a product JSON document (`{"product": {...}}`, a bare product
/// object, or a bare variant array). Falls back to marker scanning when the
/// text is not a single JSON value, e.g. a script wrapper around it.
#[must_use]
pub fn decode_json_fragment(text: &str) -> Vec<Variant> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => variants_from_value(&value).unwrap_or_default(),
        Err(_) => decode_variants(text),
    }
}

/// Fallible form of [`decode_variants`].
///
/// Tries every occurrence of every marker and returns the first literal that
/// decodes to a non-empty variant list. When none does, the error from the
/// last attempt is returned.
///
/// # Errors
///
/// - [`DecodeError::MissingMarker`]: no marker followed by `{` or `[`.
/// - [`DecodeError::Unterminated`]: the literal never closes.
/// - [`DecodeError::Malformed`]: the literal is not valid JSON.
/// - [`DecodeError::NoVariantList`]: valid JSON without variant entries.
pub fn try_decode_variants(script: &str) -> Result<Vec<Variant>, DecodeError> {
    let mut last_err = DecodeError::MissingMarker;

    for marker in VARIANT_MARKERS {
        let mut search_from = 0usize;
        while let Some(rel) = script[search_from..].find(marker) {
            let after_marker = search_from + rel + marker.len();
            search_from = after_marker;

            let rest = &script[after_marker..];
            let start = after_marker + (rest.len() - rest.trim_start().len());
            if !script[start..].starts_with(['{', '[']) {
                continue;
            }

            let Some(literal) = extract_balanced_literal(&script[start..]) else {
                last_err = DecodeError::Unterminated { start };
                continue;
            };

            match serde_json::from_str::<Value>(literal) {
                Ok(value) => match variants_from_value(&value) {
                    Some(variants) if !variants.is_empty() => return Ok(variants),
                    _ => last_err = DecodeError::NoVariantList,
                },
                Err(e) => last_err = DecodeError::Malformed(e),
            }
        }
    }

    Err(last_err)
}

/// Cuts the balanced `{…}` or `[…]` literal from the start of `s`.
///
/// Scans character by character with an explicit stack of expected closers,
/// skipping over string literals (double or single quoted) and their escape
/// sequences, so braces inside prices or names cannot end the literal early.
/// Returns `None` if `s` does not start with an opener, the literal is
/// unterminated, or a closer does not match its opener (`[42}`).
#[must_use]
pub fn extract_balanced_literal(s: &str) -> Option<&str> {
    if !s.starts_with(['{', '[']) {
        return None;
    }

    let mut expected: Vec<char> = Vec::new();
    let mut in_string: Option<char> = None;
    let mut escape = false;

    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if let Some(quote) = in_string {
            match c {
                '\\' => escape = true,
                _ if c == quote => in_string = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => in_string = Some(c),
            '{' => expected.push('}'),
            '[' => expected.push(']'),
            '}' | ']' => {
                if expected.pop() != Some(c) {
                    return None;
                }
                if expected.is_empty() {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Finds the variant array inside a decoded value.
///
/// Accepts a bare array, an object with a `variants` key, or an object that
/// wraps the product under `product`.
fn variants_from_value(value: &Value) -> Option<Vec<Variant>> {
    match value {
        Value::Array(entries) => Some(entries.iter().filter_map(variant_from_entry).collect()),
        Value::Object(map) => {
            if let Some(variants) = map.get("variants") {
                return variants_from_value(variants);
            }
            map.get("product").and_then(variants_from_value)
        }
        _ => None,
    }
}

fn variant_from_entry(entry: &Value) -> Option<Variant> {
    let obj = entry.as_object()?;

    let id = obj.get("id").and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    let title = string_field(entry, &["title", "public_title", "name"]);

    let mut options: Vec<String> = OPTION_KEYS
        .iter()
        .filter_map(|k| string_field(entry, &[*k]))
        .collect();
    if options.is_empty() {
        if let Some(Value::Array(arr)) = obj.get("options") {
            options = arr
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
        }
    }

    let size = string_field(entry, &["size", "Size"])
        .or_else(|| options.iter().find(|o| normalize_size(o).is_some()).cloned());
    let color = string_field(entry, &["color", "colour", "Color"]).or_else(|| {
        options
            .iter()
            .find(|o| size.as_deref() != Some(o.as_str()))
            .cloned()
    });

    let price = obj.get("price").and_then(price_from_json);
    let compare_at_price = ["compare_at_price", "compareAtPrice", "compare_price"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(price_from_json));

    Some(Variant {
        id,
        size,
        color,
        title,
        price,
        compare_at_price,
        available: availability(entry),
    })
}

/// Availability rule: the flag must be true and, when a quantity is present
/// and non-null, the quantity must be positive. Without a flag the quantity
/// decides; with neither the variant counts as unavailable.
fn availability(entry: &Value) -> bool {
    let flag = entry.get("available").and_then(|v| match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    });
    let quantity = ["inventory_quantity", "inventoryQuantity", "quantity"]
        .iter()
        .find_map(|k| entry.get(*k).and_then(Value::as_i64));

    match (flag, quantity) {
        (Some(flag), Some(qty)) => flag && qty > 0,
        (Some(flag), None) => flag,
        (None, Some(qty)) => qty > 0,
        (None, None) => false,
    }
}

fn string_field(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        entry
            .get(*k)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    })
}

#[cfg(test)]
#[path = "variants_test.rs"]
mod tests;
