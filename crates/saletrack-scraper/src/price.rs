//! Sale and original price resolution.
//!
//! Each price is resolved by walking an ordered chain of source rules; the
//! first rule that yields a positive amount wins. A source whose text does
//! not parse simply yields `None` and the chain moves on.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::error::PriceUnresolvable;
use crate::types::{ProductSources, Variant};

/// First number in a price string, separators included.
static PRICE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d(?:[\d.,]*\d)?").expect("valid regex"));

/// Which source produced a resolved price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    JsonFragment,
    ScriptVariants,
    Html,
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PriceSource::JsonFragment => "json",
            PriceSource::ScriptVariants => "script",
            PriceSource::Html => "html",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrice {
    pub sale: Decimal,
    pub original: Option<Decimal>,
    /// Recomputed from `sale` and `original`; 0 when there is no discount.
    pub discount_percent: u32,
    pub sale_source: PriceSource,
    pub original_source: Option<PriceSource>,
}

type PriceRule = fn(&ProductSources) -> Option<Decimal>;

const SALE_CHAIN: [(PriceSource, PriceRule); 3] = [
    (PriceSource::JsonFragment, sale_from_json),
    (PriceSource::ScriptVariants, sale_from_script),
    (PriceSource::Html, sale_from_html),
];

const ORIGINAL_CHAIN: [(PriceSource, PriceRule); 3] = [
    (PriceSource::Html, original_from_html),
    (PriceSource::JsonFragment, original_from_json),
    (PriceSource::ScriptVariants, original_from_script),
];

/// Resolves sale and original price for one product.
///
/// # Errors
///
/// Returns [`PriceUnresolvable`] when no source yields a sale price.
pub fn resolve_price(sources: &ProductSources) -> Result<ResolvedPrice, PriceUnresolvable> {
    let (sale_source, sale) =
        first_match(&SALE_CHAIN, sources).ok_or_else(|| PriceUnresolvable {
            name: sources.block.name.clone(),
        })?;
    let original = first_match(&ORIGINAL_CHAIN, sources);

    let discount_percent = original
        .and_then(|(_, o)| discount_percent(sale, o))
        .unwrap_or(0);

    Ok(ResolvedPrice {
        sale,
        original: original.map(|(_, o)| o),
        discount_percent,
        sale_source,
        original_source: original.map(|(s, _)| s),
    })
}

fn first_match(
    chain: &[(PriceSource, PriceRule)],
    sources: &ProductSources,
) -> Option<(PriceSource, Decimal)> {
    chain
        .iter()
        .find_map(|(source, rule)| rule(sources).map(|price| (*source, price)))
}

/// `round((original - sale) / original * 100)`, rounding halves away from
/// zero. `None` unless `original > sale > 0`.
#[must_use]
pub fn discount_percent(sale: Decimal, original: Decimal) -> Option<u32> {
    if sale <= Decimal::ZERO || original <= sale {
        return None;
    }
    ((original - sale) / original * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

/// Parses visible price text such as `"$1,299.00"`, `"Sale price $35.70"`,
/// `"119.00 USD"` or `"1.299,00 €"` into currency units.
///
/// A comma followed by exactly two trailing digits is a decimal mark (dots
/// before it are then thousands separators); any other comma is a
/// thousands separator. Returns `None` when the text holds no number or the
/// amount is not positive.
#[must_use]
pub fn parse_price_text(text: &str) -> Option<Decimal> {
    let raw = PRICE_NUMBER.find(text)?.as_str();
    let number = match raw.rfind([',', '.']) {
        Some(mark) if raw[mark..].starts_with(',') && raw.len() - mark == 3 => {
            format!("{}.{}", raw[..mark].replace('.', ""), &raw[mark + 1..])
        }
        _ => raw.replace(',', ""),
    };
    Decimal::from_str(&number)
        .ok()
        .filter(|d| *d > Decimal::ZERO)
}

/// Price from a JSON value. Strings are currency units, integers are cents,
/// floats are currency units.
pub(crate) fn price_from_json(value: &Value) -> Option<Decimal> {
    let price = match value {
        Value::String(s) => parse_price_text(s)?,
        Value::Number(n) => {
            if let Some(cents) = n.as_i64() {
                Decimal::new(cents, 2)
            } else {
                Decimal::try_from(n.as_f64()?).ok()?.round_dp(2)
            }
        }
        _ => return None,
    };
    (price > Decimal::ZERO).then_some(price)
}

fn min_price<'a>(variants: impl Iterator<Item = &'a Variant>) -> Option<Decimal> {
    variants.filter_map(|v| v.price).min()
}

/// Compare-at price of the variant the sale price is taken from.
///
/// Variants are ranked the way the sale rules pick them: available before
/// unavailable, then cheapest first. The first ranked variant carrying a
/// compare-at price supplies it, so sale and original normally describe the
/// same variant.
fn compare_of_priced_variant(variants: &[Variant]) -> Option<Decimal> {
    let mut ranked: Vec<&Variant> = variants.iter().collect();
    ranked.sort_by_key(|v| (!v.available, v.price.is_none(), v.price));
    ranked.into_iter().find_map(|v| v.compare_at_price)
}

fn sale_from_json(sources: &ProductSources) -> Option<Decimal> {
    let variants = &sources.json_variants;
    min_price(variants.iter().filter(|v| v.available)).or_else(|| min_price(variants.iter()))
}

fn sale_from_script(sources: &ProductSources) -> Option<Decimal> {
    min_price(sources.script_variants.iter().filter(|v| v.available))
}

fn sale_from_html(sources: &ProductSources) -> Option<Decimal> {
    sources
        .block
        .sale_price_text
        .as_deref()
        .and_then(parse_price_text)
}

fn original_from_html(sources: &ProductSources) -> Option<Decimal> {
    sources
        .block
        .compare_price_text
        .as_deref()
        .and_then(parse_price_text)
}

fn original_from_json(sources: &ProductSources) -> Option<Decimal> {
    compare_of_priced_variant(&sources.json_variants)
}

fn original_from_script(sources: &ProductSources) -> Option<Decimal> {
    compare_of_priced_variant(&sources.script_variants)
}

#[cfg(test)]
#[path = "price_test.rs"]
mod tests;
