use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const MAX_RETRIES_CEILING: u32 = 10;

/// One target storefront and how to read its sale listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub name: String,
    /// Sale listing page, e.g. `"https://www.filson.com/collections/sale"`.
    pub listing_url: String,
    /// Origin used to absolutize page-relative links.
    pub base_url: String,
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Upper bound on product containers read from one listing page.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default)]
    pub selectors: SiteSelectors,
}

impl SiteDescriptor {
    /// Generate a URL-safe slug from the site name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' || c == '.' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Returns `true` when `key` names this site, either verbatim
    /// (case-insensitive) or by slug.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key.trim()) || self.slug() == key.trim().to_lowercase()
    }
}

/// CSS selector lists for the listing page.
///
/// Each value is a comma-separated list; entries are tried in order and the
/// first one that yields usable text wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSelectors {
    pub item_container: String,
    pub name: String,
    pub link: String,
    pub sale_price: String,
    pub compare_price: String,
    pub image: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            item_container: ".product-item, .product-card, .grid__item".to_string(),
            name: ".product-title, .product-card__title, .card__heading, h3, h2".to_string(),
            link: "a[href]".to_string(),
            sale_price: ".price-item--sale, .price__sale .money, .sale-price, .price--sale, .money"
                .to_string(),
            compare_price:
                ".price-item--regular, .compare-at-price, .price__compare, .was-price, s, del"
                    .to_string(),
            image: "img".to_string(),
        }
    }
}

/// Garment family used to pick which preferred sizes apply to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeCategory {
    Tops,
    Bottoms,
    Outerwear,
    Footwear,
    Accessories,
}

impl std::fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeCategory::Tops => write!(f, "tops"),
            SizeCategory::Bottoms => write!(f, "bottoms"),
            SizeCategory::Outerwear => write!(f, "outerwear"),
            SizeCategory::Footwear => write!(f, "footwear"),
            SizeCategory::Accessories => write!(f, "accessories"),
        }
    }
}

/// Optional per-category size filter applied to assembled items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizePreferences {
    pub enabled: bool,
    /// Preferred size labels per category. `"all"` accepts everything.
    pub preferred_sizes: BTreeMap<SizeCategory, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteDescriptor>,
    #[serde(default)]
    pub preferences: SizePreferences,
}

impl SitesFile {
    /// Looks up a configured site by name or slug.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&SiteDescriptor> {
        self.sites.iter().find(|s| s.matches(key))
    }
}

fn default_request_delay_ms() -> u64 {
    1_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_items() -> usize {
    50
}

/// Load and validate the sites configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sites(&content)
}

/// Parse and validate sites YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sites(content: &str) -> Result<SitesFile, ConfigError> {
    let sites_file: SitesFile =
        serde_yaml::from_str(content).map_err(ConfigError::SitesFileParse)?;

    validate_sites(&sites_file)?;

    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    if sites_file.sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one site must be configured".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for site in &sites_file.sites {
        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site name must be non-empty".to_string(),
            ));
        }

        validate_http_url(&site.name, "listing_url", &site.listing_url)?;
        validate_http_url(&site.name, "base_url", &site.base_url)?;

        if site.timeout_ms == 0 {
            return Err(ConfigError::Validation(format!(
                "site '{}' has timeout_ms 0; must be positive",
                site.name
            )));
        }

        if site.max_retries > MAX_RETRIES_CEILING {
            return Err(ConfigError::Validation(format!(
                "site '{}' has max_retries {}; must be at most {MAX_RETRIES_CEILING}",
                site.name, site.max_retries
            )));
        }

        if site.max_items == 0 {
            return Err(ConfigError::Validation(format!(
                "site '{}' has max_items 0; must be positive",
                site.name
            )));
        }

        if site.selectors.item_container.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty item_container selector",
                site.name
            )));
        }

        let lower_name = site.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate site name: '{}'",
                site.name
            )));
        }

        let slug = site.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site slug: '{}' (from site '{}')",
                slug, site.name
            )));
        }
    }

    Ok(())
}

fn validate_http_url(site: &str, field: &str, raw: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| {
        ConfigError::Validation(format!("site '{site}' has invalid {field} \"{raw}\": {e}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::Validation(format!(
            "site '{site}' {field} must be an absolute http(s) URL, got \"{raw}\""
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;
