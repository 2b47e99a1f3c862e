pub mod assemble;
pub mod client;
pub mod error;
pub mod locator;
pub mod preferences;
pub mod price;
pub(crate) mod rate_limit;
pub mod scan;
pub mod sizes;
pub mod types;
pub mod variants;

pub use assemble::{assemble, dedupe_and_sort};
pub use client::SaleClient;
pub use error::{DecodeError, PriceUnresolvable, ScraperError};
pub use locator::RawItemLocator;
pub use preferences::{categorize, matches_size_preference};
pub use price::{discount_percent, parse_price_text, resolve_price, PriceSource, ResolvedPrice};
pub use scan::{ScanOptions, ScanReport, Scanner};
pub use sizes::{normalize_size, resolve_product_sizes, resolve_sizes, SizeLabel};
pub use types::{ProductSources, RawProductBlock, Variant};
pub use variants::{decode_json_fragment, decode_variants, try_decode_variants};
