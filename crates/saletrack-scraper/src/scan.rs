//! One full pass over a site's sale listing.

use std::time::Duration;

use saletrack_core::{SaleItem, SiteDescriptor, SizePreferences};
use tokio::time::Instant;

use crate::assemble::{assemble, dedupe_and_sort};
use crate::client::{canonicalize_url, product_json_url, SaleClient};
use crate::error::ScraperError;
use crate::locator::RawItemLocator;
use crate::preferences::matches_size_preference;
use crate::price::resolve_price;
use crate::sizes::resolve_product_sizes;
use crate::types::{ProductSources, RawProductBlock, Variant};
use crate::variants::{decode_json_fragment, decode_variants};

/// Per-run behavior switches.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Fetch `<product>.json` for blocks missing variant or compare-at data.
    pub product_lookups: bool,
    /// Keep items without a discount (discount 0, saved 0).
    pub include_undiscounted: bool,
    /// Wall-clock budget for the whole run.
    pub run_deadline: Option<Duration>,
    pub preferences: SizePreferences,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            product_lookups: true,
            include_undiscounted: false,
            run_deadline: None,
            preferences: SizePreferences::default(),
        }
    }
}

/// Result of one run. `items` is deduplicated and sorted.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub site: String,
    pub items: Vec<SaleItem>,
    /// Product containers found on the listing page.
    pub located: usize,
    /// Located products dropped: no price, not discounted, filtered by size
    /// preference, or merged as duplicates.
    pub excluded: usize,
    pub lookup_failures: usize,
    /// The run deadline expired before every product was processed.
    pub deadline_hit: bool,
}

/// Fetches a site's listing and turns it into a [`ScanReport`].
///
/// All requests are awaited one after another with the site's request delay
/// slept before each, so a run never has more than one request in flight.
pub struct Scanner {
    site: SiteDescriptor,
    client: SaleClient,
    locator: RawItemLocator,
    options: ScanOptions,
}

impl Scanner {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if the site's selectors do
    /// not parse, or [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(
        site: SiteDescriptor,
        user_agent: &str,
        options: ScanOptions,
    ) -> Result<Self, ScraperError> {
        let client = SaleClient::for_site(&site, user_agent)?;
        let locator = RawItemLocator::for_site(&site)?;
        Ok(Self {
            site,
            client,
            locator,
            options,
        })
    }

    /// Runs the scan.
    ///
    /// Per-product problems (undecodable scripts, failed lookups, missing
    /// prices) are logged and absorbed. A listing with no products is an
    /// `Ok` report with no items.
    ///
    /// # Errors
    ///
    /// - Any fetch error from the listing page itself.
    /// - [`ScraperError::DeadlineExceeded`] if the run deadline expires
    ///   before the listing page arrives.
    pub async fn scan(&self) -> Result<ScanReport, ScraperError> {
        let deadline = self.options.run_deadline.map(|d| Instant::now() + d);
        let listing_url = self.site.listing_url.as_str();

        tracing::info!(site = %self.site.name, url = listing_url, "fetching sale listing");
        let html = match deadline {
            Some(at) => tokio::time::timeout_at(at, self.fetch(listing_url))
                .await
                .map_err(|_| self.deadline_error(listing_url))??,
            None => self.fetch(listing_url).await?,
        };

        let blocks = self.locator.locate(&html);
        let located = blocks.len();
        tracing::info!(site = %self.site.name, located, "product containers located");

        let mut items = Vec::new();
        let mut excluded = 0usize;
        let mut lookup_failures = 0usize;
        let mut deadline_hit = false;

        for block in blocks {
            if deadline.is_some_and(|at| Instant::now() >= at) {
                deadline_hit = true;
                break;
            }

            let mut sources = decode_sources(block);

            if let Some(lookup_url) = self.lookup_url(&sources) {
                let fetched = match deadline {
                    Some(at) => match tokio::time::timeout_at(at, self.lookup(&lookup_url)).await {
                        Ok(result) => result,
                        Err(_) => {
                            deadline_hit = true;
                            break;
                        }
                    },
                    None => self.lookup(&lookup_url).await,
                };
                match fetched {
                    Ok(variants) => {
                        if !variants.is_empty() {
                            sources.json_variants = variants;
                        }
                    }
                    Err(e) => {
                        lookup_failures += 1;
                        tracing::warn!(
                            site = %self.site.name,
                            url = %lookup_url,
                            error = %e,
                            "product lookup failed; using listing data only"
                        );
                    }
                }
            }

            match self.build_item(&sources) {
                Some(item) => items.push(item),
                None => excluded += 1,
            }
        }

        if deadline_hit {
            tracing::warn!(
                site = %self.site.name,
                assembled = items.len(),
                "run deadline reached; returning partial results"
            );
        }

        let assembled = items.len();
        let items = dedupe_and_sort(items);
        excluded += assembled - items.len();

        tracing::info!(
            site = %self.site.name,
            items = items.len(),
            excluded,
            lookup_failures,
            "scan complete"
        );

        Ok(ScanReport {
            site: self.site.name.clone(),
            items,
            located,
            excluded,
            lookup_failures,
            deadline_hit,
        })
    }

    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        if self.site.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.site.request_delay_ms)).await;
        }
        self.client.fetch_text(url).await
    }

    async fn lookup(&self, url: &str) -> Result<Vec<Variant>, ScraperError> {
        let body = self.fetch(url).await?;
        Ok(decode_json_fragment(&body))
    }

    /// The product JSON URL when a lookup is enabled and would add data the
    /// listing lacks.
    fn lookup_url(&self, sources: &ProductSources) -> Option<String> {
        let block = &sources.block;
        let missing_data = block.json_fragment.is_none()
            && (sources.script_variants.is_empty() || block.compare_price_text.is_none());
        if !self.options.product_lookups || !missing_data {
            return None;
        }
        canonicalize_url(&self.site.base_url, &block.href).map(|c| product_json_url(&c))
    }

    fn build_item(&self, sources: &ProductSources) -> Option<SaleItem> {
        let price = match resolve_price(sources) {
            Ok(price) => price,
            Err(e) => {
                tracing::debug!(site = %self.site.name, error = %e, "product excluded");
                return None;
            }
        };
        tracing::debug!(
            name = %sources.block.name,
            sale = %price.sale,
            sale_source = %price.sale_source,
            original = ?price.original,
            original_source = ?price.original_source,
            discount = price.discount_percent,
            "price resolved"
        );
        let sizes = resolve_product_sizes(sources);
        let item = assemble(
            sources,
            &price,
            sizes,
            &self.site,
            self.options.include_undiscounted,
        )?;

        if matches_size_preference(&item, &self.options.preferences) {
            Some(item)
        } else {
            tracing::debug!(name = %item.name, sizes = %item.sizes_display(), "filtered by size preference");
            None
        }
    }

    fn deadline_error(&self, url: &str) -> ScraperError {
        ScraperError::DeadlineExceeded {
            url: url.to_owned(),
            deadline_secs: self.options.run_deadline.map_or(0, |d| d.as_secs()),
        }
    }
}

fn decode_sources(block: RawProductBlock) -> ProductSources {
    let script_variants = block
        .variant_script
        .as_deref()
        .map(decode_variants)
        .unwrap_or_default();
    let json_variants = block
        .json_fragment
        .as_deref()
        .map(decode_json_fragment)
        .unwrap_or_default();
    ProductSources {
        block,
        script_variants,
        json_variants,
    }
}
