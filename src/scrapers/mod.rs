pub mod browser;
pub mod calendar;
pub mod listing;
pub mod search;
pub mod traits;
pub mod types;

pub use browser::BrowserSearchScraper;
pub use calendar::CalendarClient;
pub use listing::ListingScraper;
pub use search::SearchResultScraper;
pub use traits::MarketScanner;
