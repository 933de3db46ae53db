use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Airbnb market-intelligence scraper
#[derive(Debug, Parser)]
#[command(name = "listing-scout", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download a listing page to a local HTML dump
    Dump {
        /// Listing page URL
        url: String,
        /// Where to write the page body
        #[arg(long, default_value = "airbnb_dump.html")]
        out: PathBuf,
    },

    /// Report the scalar fields of a saved listing page
    Analyze {
        /// Saved listing page (HTML dump)
        file: PathBuf,
    },

    /// Fetch a live listing page and report fields plus a revenue estimate
    Inspect {
        /// Listing page URL
        url: String,
    },

    /// Scan a saved search-result dump for competitor listings
    Market {
        /// Saved search-result page (HTML dump)
        file: PathBuf,
        /// Also write the scanned listings as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Fetch a listing's availability calendar and report occupancy
    Calendar {
        /// Numeric listing ID
        listing_id: String,
        /// First calendar month to request
        #[arg(long, default_value = "2026-02-01")]
        start: String,
        /// Number of months to request
        #[arg(long, default_value_t = 6)]
        months: u8,
        /// Currency for the calendar request
        #[arg(long, default_value = "COP")]
        currency: String,
    },

    /// Occupancy scan over a file of listing IDs
    Batch {
        /// File with one listing ID per line
        #[arg(long, default_value = "ids.txt")]
        ids: PathBuf,
        /// How many IDs to scan
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// First calendar month to request
        #[arg(long, default_value = "2026-02-01")]
        start: String,
        /// Currency for the calendar requests
        #[arg(long, default_value = "COP")]
        currency: String,
        /// Where to write the scan results
        #[arg(long, default_value = "batch_results.json")]
        out: PathBuf,
    },

    /// Browser-based market search collecting listing IDs
    Search {
        /// Location slug as it appears in the search URL
        #[arg(default_value = "Bocagrande--Cartagena--Colombia")]
        location: String,
        /// Check-in date (YYYY-MM-DD)
        #[arg(long, default_value = "2026-02-05")]
        checkin: String,
        /// Check-out date (YYYY-MM-DD)
        #[arg(long, default_value = "2026-03-03")]
        checkout: String,
        /// Where to write the collected IDs
        #[arg(long, default_value = "ids.txt")]
        out: PathBuf,
    },

    /// Dump the first search-result block of a saved page for debugging
    Chunk {
        /// Saved search-result page (HTML dump)
        file: PathBuf,
        /// Where to write the chunk
        #[arg(long, default_value = "debug_chunk.json")]
        out: PathBuf,
    },

    /// Show context windows around keywords in a saved page
    Grep {
        /// Saved page to search
        file: PathBuf,
        /// Keywords to look for (defaults to the usual fee/policy keys)
        keys: Vec<String>,
        /// Context chars on each side of a match
        #[arg(long, default_value_t = 100)]
        context: usize,
    },

    /// Print the listing IDs of a JSON scan result mixed with console logs
    ScanIds {
        /// Scan output file (JSON array, possibly surrounded by logs)
        file: PathBuf,
    },
}

/// Keys the grep subcommand scans for when none are given.
pub const DEFAULT_GREP_KEYS: &[&str] = &[
    "cleaning_fee",
    "min_nights",
    "cancellation_policy",
    "amenity_names",
    "house_rules",
    "response_time_shown",
    "guest_controls",
];

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn calendar_defaults_match_the_endpoint_conventions() {
        let cli = Cli::parse_from(["listing-scout", "calendar", "1306660878963671518"]);
        match cli.command {
            Command::Calendar {
                listing_id,
                start,
                months,
                currency,
            } => {
                assert_eq!(listing_id, "1306660878963671518");
                assert_eq!(start, "2026-02-01");
                assert_eq!(months, 6);
                assert_eq!(currency, "COP");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
