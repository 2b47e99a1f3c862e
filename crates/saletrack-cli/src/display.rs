//! Plain-text rendering of scan results.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use saletrack_core::{SaleItem, SiteDescriptor};

const NAME_WIDTH: usize = 40;
const SIZES_WIDTH: usize = 20;
const WEBSITE_WIDTH: usize = 15;

pub(crate) fn print_sites(sites: &[SiteDescriptor]) {
    println!("{:<20}{:<20}{:<8}LISTING", "NAME", "SLUG", "DELAY");
    for site in sites {
        println!(
            "{:<20}{:<20}{:<8}{}",
            truncate(&site.name, 19),
            truncate(&site.slug(), 19),
            format!("{}ms", site.request_delay_ms),
            site.listing_url
        );
    }
}

/// The numbered item table, one row per item.
pub(crate) fn render_table(items: &[SaleItem]) -> String {
    let mut out = String::new();
    let header = format!(
        "{:>3}  {:<NAME_WIDTH$}  {:>10}  {:>10}  {:>5}  {:>9}  {:<SIZES_WIDTH$}  {}",
        "#", "Product Name", "Sale Price", "Original $", "% Off", "Save $", "Sizes", "Website"
    );
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "-".repeat(header.chars().count()));

    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<NAME_WIDTH$}  {:>10}  {:>10}  {:>5}  {:>9}  {:<SIZES_WIDTH$}  {}",
            index + 1,
            truncate(&item.name, NAME_WIDTH),
            money(item.sale_price),
            item.original_price.map_or_else(|| "-".to_owned(), money),
            format!("{}%", item.discount_percent),
            money(item.amount_saved),
            truncate(&item.sizes_display(), SIZES_WIDTH),
            truncate(&item.website, WEBSITE_WIDTH),
        );
    }
    out
}

/// One line: item count, average discount and total potential savings.
pub(crate) fn render_summary(items: &[SaleItem]) -> String {
    if items.is_empty() {
        return "No discounted items.".to_owned();
    }
    let total_discount: u64 = items.iter().map(|i| u64::from(i.discount_percent)).sum();
    let average = Decimal::from(total_discount) / Decimal::from(items.len());
    let savings: Decimal = items.iter().map(|i| i.amount_saved).sum();
    format!(
        "{} items | average discount {}% | total potential savings {}",
        items.len(),
        average.round_dp(1).normalize(),
        money(savings)
    )
}

/// Multi-line detail view for item number `number` (1-based).
pub(crate) fn render_details(number: usize, item: &SaleItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{number} {}", item.name);
    let _ = writeln!(out, "  Website:    {}", item.website);
    let _ = writeln!(out, "  Sale price: {}", money(item.sale_price));
    if let Some(original) = item.original_price {
        let _ = writeln!(out, "  Original:   {}", money(original));
    }
    let _ = writeln!(
        out,
        "  Discount:   {}% (save {})",
        item.discount_percent,
        money(item.amount_saved)
    );
    let _ = writeln!(out, "  Sizes:      {}", item.sizes_display());
    let _ = writeln!(out, "  URL:        {}", item.url);
    if let Some(image) = &item.image_url {
        let _ = writeln!(out, "  Image:      {image}");
    }
    out
}

fn money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, discount: u32, sale: i64, original: i64, sizes: &[&str]) -> SaleItem {
        SaleItem {
            name: name.to_owned(),
            url: format!(
                "https://www.filson.com/products/{}",
                name.to_lowercase().replace(' ', "-")
            ),
            sale_price: Decimal::new(sale, 2),
            original_price: Some(Decimal::new(original, 2)),
            discount_percent: discount,
            amount_saved: Decimal::new(original - sale, 2),
            sizes: sizes.iter().map(|s| (*s).to_owned()).collect(),
            website: "Filson".to_owned(),
            image_url: None,
        }
    }

    #[test]
    fn table_has_header_and_numbered_rows() {
        let items = vec![
            item("Mackinaw Wool Cruiser", 70, 3570, 11900, &["XL"]),
            item("Tin Cloth Vest", 50, 7500, 15000, &[]),
        ];
        let table = render_table(&items);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        let columns = [
            "#", "Product Name", "Sale Price", "Original $", "% Off", "Save $", "Sizes", "Website",
        ];
        for column in columns {
            assert!(lines[0].contains(column), "missing column {column}");
        }
        assert!(lines[2].trim_start().starts_with("1  Mackinaw Wool Cruiser"));
        assert!(lines[2].contains("$35.70"));
        assert!(lines[2].contains("$119.00"));
        assert!(lines[2].contains("70%"));
        assert!(lines[2].contains("$83.30"));
        assert!(lines[3].contains("N/A"));
    }

    #[test]
    fn table_truncates_long_names() {
        let long = "Extraordinarily Long Product Name That Overflows The Column";
        let table = render_table(&[item(long, 10, 900, 1000, &[])]);
        assert!(!table.contains(long));
        assert!(table.contains("..."));
    }

    #[test]
    fn table_shows_dash_for_missing_original() {
        let mut undiscounted = item("Wool Packer Hat", 0, 9500, 9500, &[]);
        undiscounted.original_price = None;
        undiscounted.amount_saved = Decimal::ZERO;
        let table = render_table(&[undiscounted]);
        assert!(table.lines().nth(2).unwrap().contains(" - "));
    }

    #[test]
    fn summary_reports_count_average_and_savings() {
        let items = vec![
            item("A", 70, 3570, 11900, &[]),
            item("B", 45, 5500, 10000, &[]),
        ];
        assert_eq!(
            render_summary(&items),
            "2 items | average discount 57.5% | total potential savings $128.30"
        );
    }

    #[test]
    fn summary_for_empty_list() {
        assert_eq!(render_summary(&[]), "No discounted items.");
    }

    #[test]
    fn details_include_url_and_sizes() {
        let details = render_details(3, &item("Tin Cloth Vest", 50, 7500, 15000, &["M", "L"]));
        assert!(details.starts_with("#3 Tin Cloth Vest"));
        assert!(details.contains("Sizes:      M, L"));
        assert!(details.contains("https://www.filson.com/products/tin-cloth-vest"));
    }
}
