use rust_decimal::Decimal;

use super::*;

// -----------------------------------------------------------------------
// extract_balanced_literal
// -----------------------------------------------------------------------

#[test]
fn balanced_literal_stops_at_matching_bracket() {
    let s = r#"[{"size":"L"},{"size":"XL"}]; var other = [1];"#;
    assert_eq!(
        extract_balanced_literal(s),
        Some(r#"[{"size":"L"},{"size":"XL"}]"#)
    );
}

#[test]
fn balanced_literal_handles_nested_objects() {
    let s = r#"{"product":{"variants":[{"id":1}]}} trailing"#;
    assert_eq!(
        extract_balanced_literal(s),
        Some(r#"{"product":{"variants":[{"id":1}]}}"#)
    );
}

#[test]
fn balanced_literal_ignores_brackets_inside_strings() {
    let s = r#"[{"title":"Vest [Limited] {2024}"}] tail"#;
    assert_eq!(
        extract_balanced_literal(s),
        Some(r#"[{"title":"Vest [Limited] {2024}"}]"#)
    );
}

#[test]
fn balanced_literal_handles_escaped_quotes() {
    let s = r#"[{"title":"The \"Cruiser\" ]"}] tail"#;
    assert_eq!(
        extract_balanced_literal(s),
        Some(r#"[{"title":"The \"Cruiser\" ]"}]"#)
    );
}

#[test]
fn balanced_literal_unterminated_returns_none() {
    assert!(extract_balanced_literal(r#"[{"size":"L"},{"size":"#).is_none());
}

#[test]
fn balanced_literal_mismatched_closer_returns_none() {
    assert!(extract_balanced_literal("[1, 2}").is_none());
}

#[test]
fn balanced_literal_requires_opener() {
    assert!(extract_balanced_literal("  [1]").is_none());
    assert!(extract_balanced_literal("var x").is_none());
}

// -----------------------------------------------------------------------
// decode_variants
// -----------------------------------------------------------------------

#[test]
fn decode_meta_assignment_with_product_wrapper() {
    let script = r#"
        window.dataLayer = window.dataLayer || [];
        var meta = {"product":{"id":4607379,"variants":[
            {"id":1,"price":11900,"public_title":"Brown / M","option1":"Brown","option2":"M","available":true},
            {"id":2,"price":11900,"public_title":"Brown / XL","option1":"Brown","option2":"XL","available":false}
        ]}};
        for (var attr in meta) { window.ShopifyAnalytics.meta[attr] = meta[attr]; }
    "#;
    let variants = decode_variants(script);
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].id.as_deref(), Some("1"));
    assert_eq!(variants[0].size.as_deref(), Some("M"));
    assert_eq!(variants[0].color.as_deref(), Some("Brown"));
    assert_eq!(variants[0].price, Some(Decimal::new(11900, 2)));
    assert!(variants[0].available);
    assert_eq!(variants[1].size.as_deref(), Some("XL"));
    assert!(!variants[1].available);
}

#[test]
fn decode_bare_variants_property() {
    let script = r#"theme.product = { handle: "vest", "variants": [{"size":"L","color":"Otter Green","available":true}] };"#;
    let variants = decode_variants(script);
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].size.as_deref(), Some("L"));
    assert_eq!(variants[0].color.as_deref(), Some("Otter Green"));
}

#[test]
fn decode_keeps_color_in_size_slot_for_later_filtering() {
    let script = r#"var meta = {"product":{"variants":[{"size":"Brown","color":null,"available":false}]}};"#;
    let variants = decode_variants(script);
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].size.as_deref(), Some("Brown"));
    assert!(variants[0].color.is_none());
    assert!(!variants[0].available);
}

#[test]
fn decode_truncated_literal_returns_empty() {
    let script = r#"var meta = {"product":{"variants":[{"size":"XL","available":true},{"size":"#;
    assert!(decode_variants(script).is_empty());
    assert!(matches!(
        try_decode_variants(script),
        Err(DecodeError::Unterminated { .. })
    ));
}

#[test]
fn decode_without_marker_returns_empty() {
    let script = "document.querySelector('.cart').addEventListener('click', go);";
    assert!(decode_variants(script).is_empty());
    assert!(matches!(
        try_decode_variants(script),
        Err(DecodeError::MissingMarker)
    ));
}

#[test]
fn decode_malformed_literal_returns_empty() {
    let script = r#"var meta = {"product":{"variants":[{size: 'XL', available: true}]}};"#;
    assert!(decode_variants(script).is_empty());
}

#[test]
fn decode_skips_marker_not_followed_by_literal() {
    let script = r#"var variants: number; var meta = {"product":{"variants":[{"size":"S","available":true}]}};"#;
    let variants = decode_variants(script);
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].size.as_deref(), Some("S"));
}

#[test]
fn decode_options_array_form() {
    let script = r#""variants": [{"options":["Tan","32x34"],"available":true}]"#;
    let variants = decode_variants(script);
    assert_eq!(variants[0].size.as_deref(), Some("32x34"));
    assert_eq!(variants[0].color.as_deref(), Some("Tan"));
}

// -----------------------------------------------------------------------
// availability
// -----------------------------------------------------------------------

#[test]
fn availability_flag_and_positive_quantity() {
    let script = r#""variants":[{"size":"M","available":true,"inventory_quantity":3}]"#;
    assert!(decode_variants(script)[0].available);
}

#[test]
fn availability_zero_quantity_overrides_true_flag() {
    let script = r#""variants":[{"size":"M","available":true,"inventory_quantity":0}]"#;
    assert!(!decode_variants(script)[0].available);
}

#[test]
fn availability_null_quantity_defers_to_flag() {
    let script = r#""variants":[{"size":"M","available":true,"inventory_quantity":null}]"#;
    assert!(decode_variants(script)[0].available);
}

#[test]
fn availability_quantity_only() {
    let script = r#""variants":[{"size":"M","inventory_quantity":2},{"size":"L","inventory_quantity":-1}]"#;
    let variants = decode_variants(script);
    assert!(variants[0].available);
    assert!(!variants[1].available);
}

#[test]
fn availability_missing_everything_is_unavailable() {
    let script = r#""variants":[{"size":"M"}]"#;
    assert!(!decode_variants(script)[0].available);
}

// -----------------------------------------------------------------------
// decode_json_fragment
// -----------------------------------------------------------------------

#[test]
fn json_fragment_product_document_with_string_prices() {
    let doc = r#"{"product":{"title":"Mackinaw Wool Cruiser","variants":[
        {"id":40,"title":"M","option1":"M","price":"35.70","compare_at_price":"119.00","available":true},
        {"id":41,"title":"L","option1":"L","price":"35.70","compare_at_price":"119.00","available":true}
    ]}}"#;
    let variants = decode_json_fragment(doc);
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].price, Some(Decimal::new(3570, 2)));
    assert_eq!(variants[0].compare_at_price, Some(Decimal::new(11900, 2)));
    assert_eq!(variants[1].size.as_deref(), Some("L"));
}

#[test]
fn json_fragment_not_json_falls_back_to_markers() {
    let text = r#"window.product = {"variants":[{"size":"S","available":true}]};"#;
    let variants = decode_json_fragment(text);
    assert_eq!(variants.len(), 1);
}

#[test]
fn json_fragment_without_variants_is_empty() {
    assert!(decode_json_fragment(r#"{"product":{"title":"Gift Card"}}"#).is_empty());
    assert!(decode_json_fragment("not json at all").is_empty());
}

#[test]
fn contains_marker_detects_known_assignments() {
    assert!(contains_variant_marker("var meta = {}"));
    assert!(contains_variant_marker(r#"{"variants": []}"#));
    assert!(!contains_variant_marker("console.log('hi')"));
}
