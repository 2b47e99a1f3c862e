//! URL resolution and canonicalization for product links.

use reqwest::Url;

/// Resolves `href` against `base_url`, returning an absolute URL string.
///
/// Protocol-relative (`//cdn.example.com/x.jpg`), root-relative, and
/// already-absolute hrefs are all accepted. Returns `None` for
/// `javascript:`/`mailto:` links, bare fragments, and unparseable input.
#[must_use]
pub fn absolutize_url(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
    {
        return None;
    }

    let base = Url::parse(base_url).ok()?;
    let joined = base.join(href).ok()?;
    if !matches!(joined.scheme(), "http" | "https") {
        return None;
    }
    Some(joined.to_string())
}

/// Canonical form of a product URL used as the deduplication key.
///
/// Resolves against `base_url`, lowercases the host (done by `Url`), drops
/// query and fragment (variant selectors like `?variant=123` would otherwise
/// split one product into several keys), and trims a trailing slash from the
/// path.
#[must_use]
pub fn canonicalize_url(base_url: &str, href: &str) -> Option<String> {
    let absolute = absolutize_url(base_url, href)?;
    let mut url = Url::parse(&absolute).ok()?;
    url.set_query(None);
    url.set_fragment(None);

    let trimmed = url.path().trim_end_matches('/').to_owned();
    if trimmed.is_empty() {
        url.set_path("/");
    } else {
        url.set_path(&trimmed);
    }

    let mut out = url.to_string();
    if out.ends_with('/') && url.path() == "/" {
        out.pop();
    }
    Some(out)
}

/// URL of the storefront's JSON representation of a product page.
///
/// `https://shop.example.com/products/jacket` → `https://shop.example.com/products/jacket.json`.
#[must_use]
pub fn product_json_url(canonical_url: &str) -> String {
    format!("{}.json", canonical_url.trim_end_matches('/'))
}

/// Extracts the hostname from a URL for use in error messages.
///
/// Falls back to the full URL string if parsing fails.
#[must_use]
pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
