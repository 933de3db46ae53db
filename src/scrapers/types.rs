use serde::{Deserialize, Serialize};

/// Search parameters for a market scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Location slug as it appears in the search URL
    /// (e.g. "Bocagrande--Cartagena--Colombia")
    pub location: String,
    /// Check-in date (YYYY-MM-DD)
    pub checkin: String,
    /// Check-out date (YYYY-MM-DD)
    pub checkout: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            location: "Bocagrande--Cartagena--Colombia".to_string(),
            checkin: "2026-02-05".to_string(),
            checkout: "2026-03-03".to_string(),
        }
    }
}

impl SearchParams {
    /// Search URL for these parameters.
    pub fn search_url(&self) -> String {
        format!(
            "https://www.airbnb.com/s/{}/homes?checkin={}&checkout={}",
            self.location, self.checkin, self.checkout
        )
    }
}
