use crate::models::{MarketListing, Source};
use crate::scrapers::traits::MarketScanner;
use crate::scrapers::types::SearchParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use headless_chrome::{Browser, LaunchOptions};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Browser-based market search using headless Chrome.
///
/// Search pages render their result grid client-side, so a plain GET sees
/// an empty shell; the page has to be driven by a real browser before the
/// room links exist in the DOM.
pub struct BrowserSearchScraper {
    browser: Browser,
    params: SearchParams,
}

impl BrowserSearchScraper {
    pub fn new(params: SearchParams) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self { browser, params })
    }

    /// Open the search page, let it render, and collect the listing IDs
    /// linked from the result grid.
    pub fn search(&self) -> Result<Vec<MarketListing>> {
        let url = self.params.search_url();

        info!("Searching market: {}", self.params.location);
        info!("Dates: {} to {}", self.params.checkin, self.params.checkout);
        info!("URL: {}", url);

        let tab = self.browser.new_tab()?;
        tab.navigate_to(&url)?;
        tab.wait_until_navigated()?;

        // Result grid loads after navigation settles
        info!("Waiting for results to render...");
        thread::sleep(Duration::from_secs(8));

        let html_result = tab.evaluate("document.documentElement.outerHTML", false)?;
        let html = match html_result.value {
            Some(value) => value.as_str().unwrap_or("").to_string(),
            None => {
                warn!("Could not get HTML from page");
                String::new()
            }
        };

        if html.is_empty() {
            warn!("HTML is empty");
            return Ok(Vec::new());
        }

        debug!("Captured {} bytes of rendered HTML", html.len());

        Ok(extract_room_links(&html))
    }
}

#[async_trait]
impl MarketScanner for BrowserSearchScraper {
    async fn scan(&self) -> Result<Vec<MarketListing>> {
        self.search()
    }

    fn source_name(&self) -> &'static str {
        "Airbnb search"
    }
}

/// Pull deduplicated listing IDs out of the `/rooms/<id>` anchors of a
/// rendered search page.
pub fn extract_room_links(html: &str) -> Vec<MarketListing> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse(r#"a[href^="/rooms/"]"#).unwrap();
    let id_re = Regex::new(r"/rooms/(\d+)").expect("valid regex");

    let mut seen = HashSet::new();
    let mut listings = Vec::new();

    for anchor in document.select(&anchor_selector) {
        let href = anchor.value().attr("href").unwrap_or("");
        let id = match id_re.captures(href) {
            Some(cap) => cap[1].to_string(),
            None => continue,
        };
        if !seen.insert(id.clone()) {
            continue;
        }

        listings.push(MarketListing {
            id,
            source: Source::Airbnb,
            rating: None,
            price: None,
            title: None,
            url: Some(format!("https://www.airbnb.com{}", href)),
            scraped_at: Utc::now(),
        });
    }

    listings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_dedupes_room_ids() {
        let html = r#"
            <div>
                <a href="/rooms/1306660878963671518?check_in=2026-02-05">One</a>
                <a href="/rooms/1306660878963671518">Duplicate card link</a>
                <a href="/rooms/987654321">Two</a>
                <a href="/experiences/555">Not a room</a>
                <a href="/rooms/plus">No numeric id</a>
            </div>
        "#;

        let listings = extract_room_links(html);
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id, "1306660878963671518");
        assert_eq!(
            listings[0].url.as_deref(),
            Some("https://www.airbnb.com/rooms/1306660878963671518?check_in=2026-02-05")
        );
        assert_eq!(listings[1].id, "987654321");
    }

    #[test]
    fn empty_page_yields_no_listings() {
        assert!(extract_room_links("<html><body></body></html>").is_empty());
    }
}
