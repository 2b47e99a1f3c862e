//! Product container location on a listing page.
//!
//! Each selector field is a comma-separated priority list. The parts are
//! parsed individually and tried in order, so `.price-item--sale, .money`
//! prefers the sale node even when a `.money` compare price comes first in
//! document order.

use scraper::{ElementRef, Html, Selector};

use saletrack_core::{SiteDescriptor, SiteSelectors};

use crate::error::ScraperError;
use crate::price::parse_price_text;
use crate::types::RawProductBlock;
use crate::variants::contains_variant_marker;

/// Attributes checked, in order, for an image URL. Lazy-loading themes keep
/// the real URL out of `src`.
const IMAGE_ATTRS: [&str; 4] = ["src", "data-src", "data-srcset", "srcset"];

/// Finds product containers and pulls out their raw fields.
///
/// Holds no per-page state; calling [`RawItemLocator::locate`] twice on the
/// same page yields the same blocks.
#[derive(Debug)]
pub struct RawItemLocator {
    container: Vec<Selector>,
    name: Vec<Selector>,
    link: Vec<Selector>,
    sale_price: Vec<Selector>,
    compare_price: Vec<Selector>,
    image: Vec<Selector>,
    script: Selector,
    json_script: Selector,
    max_items: usize,
}

impl RawItemLocator {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if any selector does not parse.
    pub fn new(selectors: &SiteSelectors, max_items: usize) -> Result<Self, ScraperError> {
        Ok(Self {
            container: parse_selector_list(&selectors.item_container)?,
            name: parse_selector_list(&selectors.name)?,
            link: parse_selector_list(&selectors.link)?,
            sale_price: parse_selector_list(&selectors.sale_price)?,
            compare_price: parse_selector_list(&selectors.compare_price)?,
            image: parse_selector_list(&selectors.image)?,
            script: parse_one("script:not([type=\"application/json\"])")?,
            json_script: parse_one("script[type=\"application/json\"]")?,
            max_items,
        })
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if the site's selectors do not parse.
    pub fn for_site(site: &SiteDescriptor) -> Result<Self, ScraperError> {
        Self::new(&site.selectors, site.max_items)
    }

    /// Returns one block per usable product container, at most `max_items`.
    ///
    /// Containers are taken from the first container selector that matches
    /// anything. Containers without a name or a link are skipped with a
    /// warning. A page with no containers yields an empty list.
    #[must_use]
    pub fn locate(&self, html: &str) -> Vec<RawProductBlock> {
        let document = Html::parse_document(html);

        let containers: Vec<ElementRef<'_>> = self
            .container
            .iter()
            .map(|sel| document.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        let mut blocks = Vec::new();
        for (index, container) in containers.into_iter().enumerate() {
            if blocks.len() >= self.max_items {
                tracing::debug!(
                    max_items = self.max_items,
                    "item cap reached; remaining containers ignored"
                );
                break;
            }
            match self.block_from(container) {
                Some(block) => blocks.push(block),
                None => tracing::warn!(index, "skipping product container without name or link"),
            }
        }
        blocks
    }

    fn block_from(&self, container: ElementRef<'_>) -> Option<RawProductBlock> {
        let href = self.href_of(container)?;
        let name = first_text(container, &self.name)
            .or_else(|| {
                first_match(container, &self.link)
                    .map(element_text)
                    .filter(|t| !t.is_empty())
            })
            .or_else(|| first_attr(container, &self.image, &["alt"]))?;

        let compare_nodes: Vec<_> = self
            .compare_price
            .iter()
            .flat_map(|sel| container.select(sel))
            .map(|el| el.id())
            .collect();

        let sale_price_text = self
            .sale_price
            .iter()
            .flat_map(|sel| container.select(sel))
            .filter(|el| {
                !std::iter::once(el.id())
                    .chain(el.ancestors().map(|n| n.id()))
                    .any(|id| compare_nodes.contains(&id))
            })
            .map(element_text)
            .find(|text| parse_price_text(text).is_some());

        let compare_price_text = self
            .compare_price
            .iter()
            .flat_map(|sel| container.select(sel))
            .map(element_text)
            .find(|text| parse_price_text(text).is_some());

        let variant_script = container
            .select(&self.script)
            .map(|el| el.text().collect::<String>())
            .find(|text| contains_variant_marker(text));

        let json_fragment = container
            .select(&self.json_script)
            .map(|el| el.text().collect::<String>())
            .find(|text| !text.trim().is_empty());

        let image_src =
            first_attr(container, &self.image, &IMAGE_ATTRS).map(|src| first_srcset_url(&src));

        Some(RawProductBlock {
            name,
            href,
            image_src,
            sale_price_text,
            compare_price_text,
            variant_script,
            json_fragment,
        })
    }

    fn href_of(&self, container: ElementRef<'_>) -> Option<String> {
        if container.value().name() == "a" {
            if let Some(href) = non_empty_attr(container, "href") {
                return Some(href);
            }
        }
        first_attr(container, &self.link, &["href"])
    }
}

/// Splits a comma-separated selector list at top level and parses each part.
fn parse_selector_list(list: &str) -> Result<Vec<Selector>, ScraperError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in list.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);

    let selectors = parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_one)
        .collect::<Result<Vec<_>, _>>()?;

    if selectors.is_empty() {
        return Err(ScraperError::InvalidSelector {
            selector: list.to_owned(),
            reason: "empty selector list".to_owned(),
        });
    }
    Ok(selectors)
}

fn parse_one(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

fn first_match<'a>(container: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|sel| container.select(sel).next())
}

fn first_text(container: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|sel| container.select(sel))
        .map(element_text)
        .find(|t| !t.is_empty())
}

fn first_attr(container: ElementRef<'_>, selectors: &[Selector], attrs: &[&str]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|sel| container.select(sel))
        .find_map(|el| attrs.iter().find_map(|attr| non_empty_attr(el, attr)))
}

fn non_empty_attr(el: ElementRef<'_>, attr: &str) -> Option<String> {
    el.value()
        .attr(attr)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Element text with whitespace runs collapsed to single spaces.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First URL of a `srcset` value (`"a.jpg 1x, b.jpg 2x"` → `"a.jpg"`).
fn first_srcset_url(value: &str) -> String {
    value
        .split(',')
        .next()
        .and_then(|candidate| candidate.split_whitespace().next())
        .unwrap_or(value)
        .to_owned()
}

#[cfg(test)]
#[path = "locator_test.rs"]
mod tests;
