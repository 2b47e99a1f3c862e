//! `scan` command: run the scanner for each selected site and report.
//!
//! A site that cannot be reached is reported and skipped so the remaining
//! sites still run. The command fails only when no site could be scanned.

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use saletrack_core::{AppConfig, ItemSink, SaleItem, SiteDescriptor, SitesFile};
use saletrack_scraper::{dedupe_and_sort, ScanOptions, ScanReport, Scanner};

use crate::history::JsonHistorySink;
use crate::{display, interactive, ScanArgs};

pub(crate) async fn run_scan(
    config: &AppConfig,
    sites_file: &SitesFile,
    args: &ScanArgs,
) -> anyhow::Result<()> {
    let sites = select_sites(sites_file, args.site.as_deref())?;
    let options = ScanOptions {
        product_lookups: config.product_lookups,
        include_undiscounted: args.include_undiscounted || config.include_undiscounted,
        run_deadline: config.run_deadline_secs.map(Duration::from_secs),
        preferences: sites_file.preferences.clone(),
    };

    let mut reports: Vec<ScanReport> = Vec::new();
    let mut failures = 0usize;
    for site in sites {
        let scanner = Scanner::new(site.clone(), &config.user_agent, options.clone())
            .with_context(|| format!("invalid configuration for site '{}'", site.name))?;
        match scanner.scan().await {
            Ok(report) => reports.push(report),
            Err(e) => {
                failures += 1;
                eprintln!("error: could not scan {}: {e}", site.name);
            }
        }
    }

    if reports.is_empty() && failures > 0 {
        anyhow::bail!("no site could be scanned ({failures} failed)");
    }

    for report in &reports {
        if report.deadline_hit {
            eprintln!(
                "warning: {} hit the run deadline; results are partial",
                report.site
            );
        }
    }

    let items = dedupe_and_sort(reports.into_iter().flat_map(|r| r.items).collect());

    let history = args.history.clone().or_else(|| config.history_path.clone());
    let mut stdout = std::io::stdout().lock();
    write_output(&items, args.json, history.as_deref(), &mut stdout)?;
    drop(stdout);

    if !args.json && !args.no_interactive && !items.is_empty() && std::io::stdin().is_terminal() {
        let stdin = std::io::stdin();
        interactive::run(&items, stdin.lock(), std::io::stdout())?;
    }
    Ok(())
}

/// Writes the report (or JSON), then records history.
///
/// History failures are warnings only; the report is already out.
fn write_output(
    items: &[SaleItem],
    json: bool,
    history: Option<&Path>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(items)?)?;
    } else {
        write!(out, "{}", render_report(items))?;
    }
    out.flush()?;

    if let Some(path) = history {
        record_history(path, items);
    }
    Ok(())
}

fn record_history(path: &Path, items: &[SaleItem]) {
    let recorded =
        JsonHistorySink::open(path).and_then(|mut sink| sink.record(items, Utc::now()));
    match recorded {
        Ok(changed) => tracing::info!(path = %path.display(), changed, "history updated"),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "history not updated");
            eprintln!("warning: history not updated: {e}");
        }
    }
}

fn select_sites<'a>(
    sites_file: &'a SitesFile,
    key: Option<&str>,
) -> anyhow::Result<Vec<&'a SiteDescriptor>> {
    match key {
        Some(key) => {
            let site = sites_file.find(key).ok_or_else(|| {
                anyhow::anyhow!("site '{key}' is not configured; run `saletrack sites` to list sites")
            })?;
            Ok(vec![site])
        }
        None => Ok(sites_file.sites.iter().collect()),
    }
}

fn render_report(items: &[SaleItem]) -> String {
    let mut out = format!("{} items found\n", items.len());
    if !items.is_empty() {
        out.push('\n');
        out.push_str(&display::render_table(items));
        out.push('\n');
        out.push_str(&display::render_summary(items));
        out.push('\n');
    }
    out
}
