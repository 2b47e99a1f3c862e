//! Intermediate shapes passed between the extraction stages.
//!
//! ## Where product data comes from on a sale listing
//!
//! A listing card carries three partially overlapping sources:
//!
//! - **Visible HTML**: name, link, image, and price text. The compare-at
//!   price is usually a struck-through node (`<s>`, `.price-item--regular`).
//! - **Script literal**: themes inline the product's variant matrix in a
//!   `<script>` block (`var meta = {"product": {"variants": [...]}}` or
//!   similar). This is the most reliable source for stock state because it
//!   is what drives the add-to-cart button.
//! - **JSON fragment**: some themes embed `<script type="application/json">`
//!   with the storefront product document; otherwise the same document is
//!   available at `<product url>.json`. Prices there are decimal strings.
//!
//! The sources regularly disagree: listing cards cache prices longer than the
//! JSON document, and variant option slots mix colors and sizes.

use rust_decimal::Decimal;

/// One located product container, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProductBlock {
    pub name: String,
    /// `href` exactly as found; may be page-relative.
    pub href: String,
    pub image_src: Option<String>,
    /// Text of the first sale-price node that contained a parseable price.
    pub sale_price_text: Option<String>,
    /// Text of the first compare-at (struck-through) price node.
    pub compare_price_text: Option<String>,
    /// Inline script text containing a variant marker.
    pub variant_script: Option<String>,
    /// Inline or fetched product JSON document.
    pub json_fragment: Option<String>,
}

/// One purchasable size/color combination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variant {
    /// Site-native identifier, kept opaque.
    pub id: Option<String>,
    /// Raw size label; may turn out to be a color on sites that mix option slots.
    pub size: Option<String>,
    pub color: Option<String>,
    /// Variant title, e.g. `"Brown / XL"`. Used as a fallback size source.
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub available: bool,
}

/// Everything known about one product when prices and sizes are resolved.
#[derive(Debug, Clone, Default)]
pub struct ProductSources {
    pub block: RawProductBlock,
    /// Variants decoded from the inline script literal.
    pub script_variants: Vec<Variant>,
    /// Variants decoded from the JSON fragment.
    pub json_variants: Vec<Variant>,
}
