use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source of the listing data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Source {
    Airbnb,
}

/// Scalar fields pulled out of a single listing page.
///
/// A field the page did not contain is `None`; the report rendering
/// substitutes the usual sentinels ("N/A", "UNKNOWN") instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingReport {
    pub title: Option<String>,
    pub rating: Option<f64>,
    pub review_count: u32,
    pub superhost: Option<bool>,
    pub currency: Option<String>,
    pub active: Option<bool>,
    pub guest_satisfaction: Option<f64>,
    pub scraped_at: DateTime<Utc>,
}

impl ListingReport {
    pub fn title_display(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown")
    }

    pub fn rating_display(&self) -> String {
        match self.rating {
            Some(r) => format!("{}", r),
            None => "N/A".to_string(),
        }
    }

    pub fn superhost_display(&self) -> String {
        bool_display(self.superhost)
    }

    pub fn currency_display(&self) -> &str {
        self.currency.as_deref().unwrap_or("UNKNOWN")
    }

    pub fn active_display(&self) -> String {
        bool_display(self.active)
    }

    pub fn guest_satisfaction_display(&self) -> String {
        match self.guest_satisfaction {
            Some(g) => format!("{}", g),
            None => "N/A".to_string(),
        }
    }
}

fn bool_display(value: Option<bool>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "UNKNOWN".to_string(),
    }
}

/// One competitor row scanned out of a search-result dump.
///
/// Rating and price stay the localized display strings the page carries
/// ("4,84", "$1.200.000 COP"), so they are kept as scraped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketListing {
    pub id: String,
    pub source: Source,
    pub rating: Option<String>,
    pub price: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl MarketListing {
    pub fn rating_display(&self) -> &str {
        self.rating.as_deref().unwrap_or("N/A")
    }

    pub fn price_display(&self) -> &str {
        self.price.as_deref().unwrap_or("N/A")
    }

    pub fn title_display(&self) -> &str {
        self.title.as_deref().unwrap_or("N/A")
    }
}

/// Nightly price detected on a listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Option<f64>,
    pub currency: String,
}

impl Default for PriceQuote {
    fn default() -> Self {
        Self {
            price: None,
            currency: "USD".to_string(),
        }
    }
}

/// Revenue estimate derived from a detected nightly price and an assumed
/// market occupancy average.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketIntel {
    pub est_monthly_revenue: f64,
    pub occupancy_avg_pct: u8,
    pub below_market: bool,
}

/// Booked/total day counts for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarOccupancy {
    pub month: String,
    pub booked: u32,
    pub total: u32,
}

impl CalendarOccupancy {
    pub fn rate_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.booked as f64 / self.total as f64 * 100.0
        }
    }
}

/// One line of a batch occupancy scan, persisted to batch_results.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub id: String,
    pub occupancy: String,
    pub booked: u32,
    pub total: u32,
    pub month: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_render_sentinels() {
        let report = ListingReport {
            title: None,
            rating: None,
            review_count: 0,
            superhost: None,
            currency: None,
            active: None,
            guest_satisfaction: None,
            scraped_at: Utc::now(),
        };

        assert_eq!(report.title_display(), "Unknown");
        assert_eq!(report.rating_display(), "N/A");
        assert_eq!(report.superhost_display(), "UNKNOWN");
        assert_eq!(report.currency_display(), "UNKNOWN");
        assert_eq!(report.active_display(), "UNKNOWN");
        assert_eq!(report.guest_satisfaction_display(), "N/A");
    }

    #[test]
    fn occupancy_rate_handles_empty_month() {
        let empty = CalendarOccupancy {
            month: "February 2026".to_string(),
            booked: 0,
            total: 0,
        };
        assert_eq!(empty.rate_pct(), 0.0);

        let half = CalendarOccupancy {
            month: "February 2026".to_string(),
            booked: 14,
            total: 28,
        };
        assert_eq!(half.rate_pct(), 50.0);
    }
}
