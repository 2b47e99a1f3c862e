use super::*;

const BASE: &str = "https://www.filson.com";

#[test]
fn absolutize_root_relative_href() {
    assert_eq!(
        absolutize_url(BASE, "/products/mackinaw-cruiser").as_deref(),
        Some("https://www.filson.com/products/mackinaw-cruiser")
    );
}

#[test]
fn absolutize_keeps_absolute_href() {
    assert_eq!(
        absolutize_url(BASE, "https://other.example.com/p/1").as_deref(),
        Some("https://other.example.com/p/1")
    );
}

#[test]
fn absolutize_protocol_relative_href() {
    assert_eq!(
        absolutize_url(BASE, "//cdn.shopify.com/s/files/jacket.jpg").as_deref(),
        Some("https://cdn.shopify.com/s/files/jacket.jpg")
    );
}

#[test]
fn absolutize_rejects_script_and_fragment_links() {
    assert!(absolutize_url(BASE, "javascript:void(0)").is_none());
    assert!(absolutize_url(BASE, "#reviews").is_none());
    assert!(absolutize_url(BASE, "mailto:help@filson.com").is_none());
    assert!(absolutize_url(BASE, "   ").is_none());
}

#[test]
fn canonicalize_drops_query_and_fragment() {
    assert_eq!(
        canonicalize_url(BASE, "/products/cruiser?variant=4607379&color=brown#sizes").as_deref(),
        Some("https://www.filson.com/products/cruiser")
    );
}

#[test]
fn canonicalize_trims_trailing_slash() {
    assert_eq!(
        canonicalize_url(BASE, "/products/cruiser/").as_deref(),
        Some("https://www.filson.com/products/cruiser")
    );
}

#[test]
fn canonicalize_lowercases_host() {
    assert_eq!(
        canonicalize_url(BASE, "https://WWW.Filson.com/products/cruiser").as_deref(),
        Some("https://www.filson.com/products/cruiser")
    );
}

#[test]
fn canonicalize_same_product_from_relative_and_absolute() {
    assert_eq!(
        canonicalize_url(BASE, "/products/cruiser?variant=1"),
        canonicalize_url(BASE, "https://www.filson.com/products/cruiser")
    );
}

#[test]
fn product_json_url_appends_suffix() {
    assert_eq!(
        product_json_url("https://www.filson.com/products/cruiser"),
        "https://www.filson.com/products/cruiser.json"
    );
}

#[test]
fn extract_domain_strips_scheme_and_path() {
    assert_eq!(
        extract_domain("https://www.filson.com/collections/sale"),
        "www.filson.com"
    );
}

#[test]
fn extract_domain_fallback_no_scheme() {
    assert_eq!(extract_domain("filson.com"), "filson.com");
}

#[tokio::test]
async fn fetch_text_rejects_relative_url() {
    let client = SaleClient::new(1_000, "saletrack-test/0.1", 0, 0).unwrap();
    let err = client.fetch_text("/collections/sale").await.unwrap_err();
    assert!(matches!(err, ScraperError::InvalidUrl { .. }));
}
