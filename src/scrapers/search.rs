use crate::extract::{decode_unicode_escapes, truncate_chars};
use crate::models::{MarketListing, Source};
use crate::scrapers::traits::MarketScanner;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// Search-result blocks are delimited by this typename in the embedded
/// GraphQL payload; everything before the first marker is page preamble.
const RESULT_MARKER: &str = r#"{"__typename":"StaySearchResult""#;

/// Chars of each block to scan; past this point fields start bleeding in
/// from the next result.
const CHUNK_LIMIT: usize = 5000;

/// Scans a saved search-result dump for competitor listings
pub struct SearchResultScraper {
    path: PathBuf,
}

impl SearchResultScraper {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl MarketScanner for SearchResultScraper {
    async fn scan(&self) -> Result<Vec<MarketListing>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        info!(
            "Analyzing {} ({} bytes)...",
            self.path.display(),
            content.len()
        );

        Ok(scan_market(&content))
    }

    fn source_name(&self) -> &'static str {
        "Airbnb search dump"
    }
}

/// Chunk the dump on the StaySearchResult marker and regex each block for
/// id, rating, price, and title. Blocks without a listing id are skipped;
/// duplicate ids keep only the first occurrence.
pub fn scan_market(content: &str) -> Vec<MarketListing> {
    let id_re = Regex::new(r"Hosting-(\d+)").expect("valid regex");
    let rating_re = Regex::new(r#""avgRatingLocalized":"(.*?)""#).expect("valid regex");
    let title_re = Regex::new(r#""title":"(.*?)""#).expect("valid regex");
    let discounted_re = Regex::new(r#""discountedPrice":"(.*?)""#).expect("valid regex");
    let original_re = Regex::new(r#""originalPrice":"(.*?)""#).expect("valid regex");

    let mut listings = Vec::new();
    let mut seen_ids = HashSet::new();

    // First chunk is header/preamble, skip it
    for chunk in content.split(RESULT_MARKER).skip(1) {
        let chunk = truncate_chars(chunk, CHUNK_LIMIT);

        let id = match id_re.captures(chunk) {
            Some(cap) => cap[1].to_string(),
            None => continue,
        };
        if !seen_ids.insert(id.clone()) {
            continue;
        }

        let rating = rating_re.captures(chunk).map(|cap| cap[1].to_string());
        let title = title_re
            .captures(chunk)
            .map(|cap| decode_unicode_escapes(&cap[1]));

        // Discounted price wins when both are present
        let price = discounted_re
            .captures(chunk)
            .or_else(|| original_re.captures(chunk))
            .map(|cap| cap[1].to_string());

        debug!("Found listing {}", id);

        listings.push(MarketListing {
            id,
            source: Source::Airbnb,
            rating,
            price,
            title,
            url: None,
            scraped_at: Utc::now(),
        });
    }

    listings
}

/// First 10000 chars following the first StaySearchResult marker, for
/// eyeballing the payload shape when the field regexes stop matching.
pub fn debug_chunk(content: &str) -> Option<&str> {
    let start = content.find(RESULT_MARKER)?;
    Some(truncate_chars(&content[start..], 10000))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_block(id: &str, body: &str) -> String {
        format!(r#"{{"__typename":"StaySearchResult"{}"listing":{{"id":"Hosting-{}"}}"#, body, id)
    }

    #[test]
    fn scans_blocks_into_listings() {
        let html = format!(
            "preamble with no fields{}{}",
            result_block(
                "12345",
                r#","avgRatingLocalized":"4.84 (12)","title":"Ocean view","discountedPrice":"$90 USD","originalPrice":"$120 USD","#
            ),
            result_block(
                "67890",
                ",\"avgRatingLocalized\":\"4.91 (231)\",\"title\":\"Pe\\u00f1a loft\",\"originalPrice\":\"$210 USD\","
            ),
        );

        let listings = scan_market(&html);
        assert_eq!(listings.len(), 2);

        assert_eq!(listings[0].id, "12345");
        assert_eq!(listings[0].rating.as_deref(), Some("4.84 (12)"));
        assert_eq!(listings[0].title.as_deref(), Some("Ocean view"));
        // Discounted price preferred over original
        assert_eq!(listings[0].price.as_deref(), Some("$90 USD"));

        assert_eq!(listings[1].id, "67890");
        assert_eq!(listings[1].title.as_deref(), Some("Peña loft"));
        assert_eq!(listings[1].price.as_deref(), Some("$210 USD"));
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let html = format!(
            "x{}{}",
            result_block("111", r#","title":"First","#),
            result_block("111", r#","title":"Second","#),
        );

        let listings = scan_market(&html);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title.as_deref(), Some("First"));
    }

    #[test]
    fn block_without_id_is_skipped() {
        let html = format!("x{}", result_block("", r#","title":"No id here","#))
            .replace("Hosting-", "Nothing-");
        assert!(scan_market(&html).is_empty());
    }

    #[test]
    fn missing_fields_stay_none() {
        let html = format!("x{}", result_block("555", ","));
        let listings = scan_market(&html);
        assert_eq!(listings.len(), 1);
        assert!(listings[0].rating.is_none());
        assert!(listings[0].price.is_none());
        assert_eq!(listings[0].price_display(), "N/A");
    }

    #[test]
    fn debug_chunk_starts_at_marker() {
        let content = format!("preamble{}rest of payload", RESULT_MARKER);
        let chunk = debug_chunk(&content).unwrap();
        assert!(chunk.starts_with(RESULT_MARKER));
        assert!(chunk.ends_with("rest of payload"));

        assert!(debug_chunk("no marker").is_none());
    }

    #[test]
    fn fields_past_chunk_limit_are_ignored() {
        let padding = "x".repeat(CHUNK_LIMIT);
        let html = format!(
            r#"pre{}"listing":{{"id":"Hosting-777"}}{}"discountedPrice":"$50 USD""#,
            RESULT_MARKER, padding
        );

        let listings = scan_market(&html);
        assert_eq!(listings.len(), 1);
        assert!(listings[0].price.is_none());
    }
}
