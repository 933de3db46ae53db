use crate::cli::{Command, DEFAULT_GREP_KEYS};
use crate::extract;
use crate::models::{BatchResult, ListingReport};
use crate::scrapers::search::debug_chunk;
use crate::scrapers::types::SearchParams;
use crate::scrapers::{listing, BrowserSearchScraper, CalendarClient, ListingScraper, MarketScanner, SearchResultScraper};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use tracing::{info, warn};

pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Dump { url, out } => dump(&url, &out).await,
        Command::Analyze { file } => analyze(&file).await,
        Command::Inspect { url } => inspect(&url).await,
        Command::Market { file, out } => market(&file, out.as_deref()).await,
        Command::Calendar {
            listing_id,
            start,
            months,
            currency,
        } => calendar(&listing_id, &start, months, &currency).await,
        Command::Batch {
            ids,
            limit,
            start,
            currency,
            out,
        } => batch(&ids, limit, &start, &currency, &out).await,
        Command::Search {
            location,
            checkin,
            checkout,
            out,
        } => search(location, checkin, checkout, &out).await,
        Command::Chunk { file, out } => chunk(&file, &out).await,
        Command::Grep {
            file,
            keys,
            context,
        } => grep(&file, &keys, context).await,
        Command::ScanIds { file } => scan_ids(&file).await,
    }
}

async fn dump(url: &str, out: &Path) -> Result<()> {
    let scraper = ListingScraper::new()?;
    let html = scraper.fetch(url).await?;

    tokio::fs::write(out, &html)
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;

    info!("Downloaded {} ({} bytes)", out.display(), html.len());
    Ok(())
}

async fn analyze(file: &Path) -> Result<()> {
    let content = read_file(file).await?;
    info!("Analyzing {} ({} bytes)...", file.display(), content.len());

    let report = listing::analyze(&content);
    print_listing_report(&report);
    Ok(())
}

async fn inspect(url: &str) -> Result<()> {
    info!("Fetching {}...", url);

    let scraper = ListingScraper::new()?;
    let html = scraper.fetch(url).await?;

    let report = listing::analyze(&html);
    let quote = listing::price_quote(&html);

    println!("\n--- ANALYSIS RESULT ---");
    println!("Property: {}", report.title_display());
    println!(
        "Detected Base Price: {} {}",
        quote
            .price
            .map(|p| format!("{}", p))
            .unwrap_or_else(|| "N/A".to_string()),
        quote.currency
    );
    println!("Analysis Time: {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));

    match quote.price {
        Some(price) => {
            let intel = listing::market_intel(price);
            println!("\n[MARKET INTEL]");
            println!(
                "Est. Monthly Revenue: ${:.2} {}",
                intel.est_monthly_revenue, quote.currency
            );
            println!("Market Occupancy Avg: {}%", intel.occupancy_avg_pct);
            if intel.below_market {
                println!("⚠️ VULNERABILITY: Price is below market average ($150). Potential to increase rates.");
            } else {
                println!("✅ STRATEGY: Premium pricing detected.");
            }
        }
        None => {
            warn!("Could not extract exact price from static HTML. Browser automation required for deep dive.");
        }
    }

    Ok(())
}

async fn market(file: &Path, out: Option<&Path>) -> Result<()> {
    let scanner = SearchResultScraper::new(file.to_path_buf());
    let listings = scanner.scan().await?;

    println!("\n--- Detected Competitors (Method: Result Chunking) ---");
    println!(
        "{:<20} | {:<10} | {:<25} | {}",
        "ID", "Rating", "Price", "Title"
    );
    println!("{}", "-".repeat(120));

    for listing in &listings {
        println!(
            "{:<20} | {:<10} | {:<25} | {}",
            listing.id,
            listing.rating_display(),
            listing.price_display(),
            extract::truncate_chars(listing.title_display(), 40)
        );
    }

    println!("\nTotal unique competitors found: {}", listings.len());

    if let Some(out) = out {
        write_json(out, &listings).await?;
        info!("Saved {} listings to {}", listings.len(), out.display());
    }

    Ok(())
}

async fn calendar(listing_id: &str, start: &str, months: u8, currency: &str) -> Result<()> {
    let client = CalendarClient::new(currency)?;
    let calendar = client.fetch_calendar(listing_id, start, months).await?;

    info!("SUCCESS: Calendar data found!");

    match crate::scrapers::calendar::first_month_occupancy(&calendar) {
        Some(occ) => {
            println!("Month: {}", occ.month);
            println!(
                "Occupancy (Month 1): {}/{} days booked ({:.1}%)",
                occ.booked,
                occ.total,
                occ.rate_pct()
            );
        }
        None => warn!("Calendar has no months"),
    }

    Ok(())
}

async fn batch(ids_file: &Path, limit: usize, start: &str, currency: &str, out: &Path) -> Result<()> {
    println!("--- BATCH MARKET SCAN (Top {} Listings) ---", limit);

    let content = read_file(ids_file).await?;
    let ids: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(String::from)
        .collect();

    if ids.is_empty() {
        anyhow::bail!("No listing IDs in {}", ids_file.display());
    }

    let client = CalendarClient::new(currency)?;
    let results = client.batch_scan(&ids, start).await;

    println!("\n--- FINAL REPORT ---");
    print_batch_results(&results);

    write_json(out, &results).await?;
    info!("Saved {} results to {}", results.len(), out.display());

    Ok(())
}

async fn search(location: String, checkin: String, checkout: String, out: &Path) -> Result<()> {
    let params = SearchParams {
        location,
        checkin,
        checkout,
    };

    let scraper = BrowserSearchScraper::new(params)?;
    let listings = scraper.search()?;

    println!(
        "\nFound {} properties available for these dates.",
        listings.len()
    );

    let id_list = listings
        .iter()
        .map(|l| l.id.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    tokio::fs::write(out, id_list)
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;

    info!("Saved {} IDs to {}", listings.len(), out.display());
    Ok(())
}

async fn chunk(file: &Path, out: &Path) -> Result<()> {
    let content = read_file(file).await?;

    match debug_chunk(&content) {
        Some(chunk) => {
            tokio::fs::write(out, chunk)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!("Dumped {} chars to {}", chunk.chars().count(), out.display());
        }
        None => warn!("StaySearchResult not found"),
    }

    Ok(())
}

async fn grep(file: &Path, keys: &[String], context: usize) -> Result<()> {
    let content = read_file(file).await?;
    println!("File size: {} bytes", content.len());

    let defaults: Vec<String> = DEFAULT_GREP_KEYS.iter().map(|k| k.to_string()).collect();
    let keys: &[String] = if keys.is_empty() { &defaults } else { keys };

    for key in keys {
        println!("--- Searching for '{}' ---", key);
        println!("Found {} matches", extract::keyword_count(&content, key));

        for snippet in extract::keyword_contexts(&content, key, context, 5) {
            println!("Context: ...{}...", snippet);
            println!("{}", "-".repeat(20));
        }
    }

    Ok(())
}

async fn scan_ids(file: &Path) -> Result<()> {
    let content = read_file(file).await?;

    match extract::scan_ids(&content) {
        Some(ids) => println!("{}", ids.join(" ")),
        None => println!("No JSON array found in file."),
    }

    Ok(())
}

fn print_listing_report(report: &ListingReport) {
    println!("\n--- Listing Intelligence Report ---");
    println!("Title:       {}", report.title_display());
    println!(
        "Rating:      {} ({} reviews)",
        report.rating_display(),
        report.review_count
    );
    println!("Superhost:   {}", report.superhost_display());
    println!("Currency:    {}", report.currency_display());
    println!("Status:      {}", report.active_display());
    println!("Guest Sat:   {}", report.guest_satisfaction_display());
}

fn print_batch_results(results: &[BatchResult]) {
    println!(
        "{:<20} | {:<10} | {:<8} | {:<8} | {}",
        "ID", "Occupancy", "Booked", "Total", "Month"
    );
    println!("{}", "-".repeat(70));
    for result in results {
        println!(
            "{:<20} | {:<9}% | {:<8} | {:<8} | {}",
            result.id, result.occupancy, result.booked, result.total, result.month
        );
    }
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
