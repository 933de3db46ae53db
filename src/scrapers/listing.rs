use crate::extract::first_capture;
use crate::models::{ListingReport, MarketIntel, PriceQuote};
use anyhow::{Context, Result};
use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Market average assumption used when a listing reveals nothing better.
const MARKET_OCCUPANCY_AVG_PCT: u8 = 65;

/// Nightly rate below which a listing is considered underpriced for the
/// market (the market average sits around $150).
const BELOW_MARKET_THRESHOLD: f64 = 100.0;

/// Fetches listing pages and pulls scalar fields out of the raw HTML
pub struct ListingScraper {
    client: Client,
}

impl ListingScraper {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Download a listing page as raw HTML.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .context("Failed to fetch listing page")?;

        if !response.status().is_success() {
            warn!("Listing page returned status: {}", response.status());
            anyhow::bail!("Failed to fetch page. Status: {}", response.status());
        }

        let html = response.text().await.context("Failed to read response body")?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }
}

/// Scan a listing page for its scalar fields. Every field degrades to its
/// sentinel when the page does not carry it.
pub fn analyze(html: &str) -> ListingReport {
    let title = first_capture(r#"<meta property="og:title" content="(.*?)""#, html);

    let rating = first_capture(r#""ratingValue":([\d\.]+)"#, html).and_then(|s| s.parse().ok());

    let review_count = first_capture(r#""reviewCount":"?(\d+)"?"#, html)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let superhost =
        first_capture(r#""isSuperhost":(true|false)"#, html).map(|s| s == "true");

    let currency = first_capture(r#""serverDeterminedCurrency":"(.*?)""#, html);

    let active = first_capture(r#""isActive":(true|false)"#, html).map(|s| s == "true");

    let guest_satisfaction =
        first_capture(r#""guestSatisfactionOverall":([\d\.]+)"#, html).and_then(|s| s.parse().ok());

    ListingReport {
        title,
        rating,
        review_count,
        superhost,
        currency,
        active,
        guest_satisfaction,
        scraped_at: Utc::now(),
    }
}

/// Detect the nightly price on a listing page.
///
/// The JSON-LD offers block is tried first; when it is absent or malformed
/// the scan falls back to a bare `"price":N,"currency":"X"` pattern anywhere
/// in the page.
pub fn price_quote(html: &str) -> PriceQuote {
    if let Some(quote) = price_from_json_ld(html) {
        return quote;
    }

    let fallback_re =
        Regex::new(r#""price":(\d+),"currency":"(.*?)""#).expect("valid regex");
    if let Some(cap) = fallback_re.captures(html) {
        return PriceQuote {
            price: cap[1].parse().ok(),
            currency: cap[2].to_string(),
        };
    }

    PriceQuote::default()
}

fn price_from_json_ld(html: &str) -> Option<PriceQuote> {
    let block = first_capture(
        r#"(?s)<script type="application/ld\+json">(.*?)</script>"#,
        html,
    )?;

    // Sometimes the block is an array of schema objects
    let data = match serde_json::from_str::<Value>(&block).ok()? {
        Value::Array(items) => items.into_iter().next()?,
        other => other,
    };

    let offers = data.get("offers")?;
    let price = match offers.get("price")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }?;
    let currency = offers
        .get("priceCurrency")
        .and_then(|c| c.as_str())
        .unwrap_or("USD")
        .to_string();

    Some(PriceQuote {
        price: Some(price),
        currency,
    })
}

/// Revenue estimate from a detected nightly price: 30 nights at the assumed
/// market occupancy average.
pub fn market_intel(nightly_price: f64) -> MarketIntel {
    MarketIntel {
        est_monthly_revenue: nightly_price * 30.0 * (MARKET_OCCUPANCY_AVG_PCT as f64 / 100.0),
        occupancy_avg_pct: MARKET_OCCUPANCY_AVG_PCT,
        below_market: nightly_price < BELOW_MARKET_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        r#"<meta property="og:title" content="Beachfront condo in Cartagena">"#,
        r#"{"ratingValue":4.84,"reviewCount":"27","isSuperhost":true,"#,
        r#""serverDeterminedCurrency":"COP","isActive":true,"#,
        r#""guestSatisfactionOverall":4.91}"#,
    );

    #[test]
    fn analyze_extracts_all_fields() {
        let report = analyze(SAMPLE);
        assert_eq!(report.title.as_deref(), Some("Beachfront condo in Cartagena"));
        assert_eq!(report.rating, Some(4.84));
        assert_eq!(report.review_count, 27);
        assert_eq!(report.superhost, Some(true));
        assert_eq!(report.currency.as_deref(), Some("COP"));
        assert_eq!(report.active, Some(true));
        assert_eq!(report.guest_satisfaction, Some(4.91));
    }

    #[test]
    fn analyze_degrades_to_sentinels() {
        let report = analyze("<html>nothing useful</html>");
        assert_eq!(report.rating_display(), "N/A");
        assert_eq!(report.review_count, 0);
        assert_eq!(report.superhost_display(), "UNKNOWN");
        assert_eq!(report.title_display(), "Unknown");
    }

    #[test]
    fn unquoted_review_count_matches() {
        let report = analyze(r#""reviewCount":143"#);
        assert_eq!(report.review_count, 143);
    }

    #[test]
    fn price_from_json_ld_offers() {
        let html = concat!(
            r#"<script type="application/ld+json">"#,
            r#"{"@type":"Product","offers":{"price":185,"priceCurrency":"USD"}}"#,
            r#"</script>"#,
        );
        let quote = price_quote(html);
        assert_eq!(quote.price, Some(185.0));
        assert_eq!(quote.currency, "USD");
    }

    #[test]
    fn price_from_json_ld_array_with_string_price() {
        let html = concat!(
            r#"<script type="application/ld+json">"#,
            r#"[{"offers":{"price":"240","priceCurrency":"COP"}},{"other":1}]"#,
            r#"</script>"#,
        );
        let quote = price_quote(html);
        assert_eq!(quote.price, Some(240.0));
        assert_eq!(quote.currency, "COP");
    }

    #[test]
    fn price_falls_back_to_bare_pattern() {
        let html = r#"<script type="application/ld+json">not json</script> "price":95,"currency":"EUR""#;
        let quote = price_quote(html);
        assert_eq!(quote.price, Some(95.0));
        assert_eq!(quote.currency, "EUR");
    }

    #[test]
    fn missing_price_degrades_to_default() {
        let quote = price_quote("<html></html>");
        assert_eq!(quote.price, None);
        assert_eq!(quote.currency, "USD");
    }

    #[test]
    fn intel_estimates_revenue_and_flags_underpricing() {
        let intel = market_intel(95.0);
        assert!(intel.below_market);
        assert_eq!(intel.est_monthly_revenue, 95.0 * 30.0 * 0.65);

        let premium = market_intel(200.0);
        assert!(!premium.below_market);
    }
}
