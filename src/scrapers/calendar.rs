use crate::models::{BatchResult, CalendarOccupancy};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

const ENDPOINT: &str = "https://www.airbnb.com/api/v3/PdpAvailabilityCalendar";

/// Common public client ID embedded in the Airbnb web app.
const API_KEY: &str = "d306zoyjsyarp7ifhu67rjxn52tv0t20";

/// Persisted-query hash for the PdpAvailabilityCalendar operation.
const QUERY_HASH: &str = "8f0884d3d954bf4e85764375b0606114a2f8c050d5f47844070a68d812328406";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Client for the availability-calendar endpoint
pub struct CalendarClient {
    client: Client,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    data: Option<CalendarData>,
}

#[derive(Debug, Deserialize)]
struct CalendarData {
    merlin: Option<Merlin>,
}

#[derive(Debug, Deserialize)]
struct Merlin {
    #[serde(rename = "pdpAvailabilityCalendar")]
    pdp_availability_calendar: AvailabilityCalendar,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityCalendar {
    #[serde(rename = "calendarMonths")]
    pub calendar_months: Vec<CalendarMonth>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarMonth {
    pub name: String,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarDay {
    pub available: bool,
}

impl CalendarClient {
    pub fn new(currency: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            currency: currency.to_string(),
        })
    }

    /// Fetch the availability calendar for a listing.
    ///
    /// An unexpected response shape is reported with a truncated body rather
    /// than treated as an error, since the endpoint is undocumented.
    pub async fn fetch_calendar(
        &self,
        listing_id: &str,
        start_date: &str,
        months: u8,
    ) -> Result<AvailabilityCalendar> {
        let variables = json!({
            "request": {
                "listingId": listing_id,
                "count": months,
                "startDate": start_date,
            }
        });
        let extensions = json!({
            "persistedQuery": {
                "version": 1,
                "sha256Hash": QUERY_HASH,
            }
        });

        info!("Fetching calendar for {}...", listing_id);

        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("operationName", "PdpAvailabilityCalendar"),
                ("locale", "en"),
                ("currency", &self.currency),
                ("variables", &variables.to_string()),
                ("extensions", &extensions.to_string()),
            ])
            .header("x-airbnb-api-key", API_KEY)
            .send()
            .await
            .context("Failed to fetch availability calendar")?;

        let status = response.status();
        debug!("Status code: {}", status);

        let body = response.text().await.context("Failed to read response body")?;

        if !status.is_success() {
            anyhow::bail!(
                "Calendar request failed ({}): {}",
                status,
                crate::extract::truncate_chars(&body, 500)
            );
        }

        parse_calendar(&body)
    }

    /// Occupancy scan over the first month of each listed id.
    ///
    /// Failures are per-listing: a listing that cannot be fetched is logged
    /// and skipped, matching the rest-of-the-batch-continues behavior of a
    /// manual scan. A short pause between listings keeps the endpoint calm.
    pub async fn batch_scan(&self, ids: &[String], start_date: &str) -> Vec<BatchResult> {
        let mut results = Vec::new();

        for id in ids {
            match self.fetch_calendar(id, start_date, 6).await {
                Ok(calendar) => match first_month_occupancy(&calendar) {
                    Some(occ) => {
                        info!(
                            "[SUCCESS] {} -> {:.1}% occupancy ({}/{} days)",
                            id,
                            occ.rate_pct(),
                            occ.booked,
                            occ.total
                        );
                        results.push(BatchResult {
                            id: id.clone(),
                            occupancy: format!("{:.1}", occ.rate_pct()),
                            booked: occ.booked,
                            total: occ.total,
                            month: occ.month,
                        });
                    }
                    None => info!("[NO DATA] {}", id),
                },
                Err(err) => warn!("[FAILED] {}: {:#}", id, err),
            }

            tokio::time::sleep(Duration::from_secs(2)).await;
        }

        results
    }
}

/// Parse a calendar response body. A body whose JSON structure is unknown
/// becomes an error carrying the first 500 chars for inspection.
pub fn parse_calendar(body: &str) -> Result<AvailabilityCalendar> {
    let parsed: CalendarResponse =
        serde_json::from_str(body).context("Calendar response was not JSON")?;

    match parsed.data.and_then(|d| d.merlin) {
        Some(merlin) => Ok(merlin.pdp_availability_calendar),
        None => anyhow::bail!(
            "Response JSON structure unknown: {}",
            crate::extract::truncate_chars(body, 500)
        ),
    }
}

/// Booked/total day counts for the first month of the calendar.
pub fn first_month_occupancy(calendar: &AvailabilityCalendar) -> Option<CalendarOccupancy> {
    let month = calendar.calendar_months.first()?;

    let total = month.days.len() as u32;
    let booked = month.days.iter().filter(|day| !day.available).count() as u32;

    Some(CalendarOccupancy {
        month: month.name.clone(),
        booked,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "data": {
            "merlin": {
                "pdpAvailabilityCalendar": {
                    "calendarMonths": [
                        {
                            "name": "February 2026",
                            "days": [
                                {"available": false},
                                {"available": true},
                                {"available": false},
                                {"available": true}
                            ]
                        },
                        {
                            "name": "March 2026",
                            "days": [{"available": true}]
                        }
                    ]
                }
            }
        }
    }"#;

    #[test]
    fn parses_calendar_and_counts_occupancy() {
        let calendar = parse_calendar(SAMPLE).unwrap();
        assert_eq!(calendar.calendar_months.len(), 2);

        let occ = first_month_occupancy(&calendar).unwrap();
        assert_eq!(occ.month, "February 2026");
        assert_eq!(occ.booked, 2);
        assert_eq!(occ.total, 4);
        assert_eq!(occ.rate_pct(), 50.0);
    }

    #[test]
    fn unknown_structure_is_an_error() {
        let err = parse_calendar(r#"{"data":{"other":1}}"#).unwrap_err();
        assert!(err.to_string().contains("structure unknown"));
    }

    #[test]
    fn non_json_body_is_an_error() {
        assert!(parse_calendar("<html>blocked</html>").is_err());
    }

    #[test]
    fn empty_calendar_has_no_occupancy() {
        let calendar = AvailabilityCalendar {
            calendar_months: vec![],
        };
        assert!(first_month_occupancy(&calendar).is_none());
    }
}
