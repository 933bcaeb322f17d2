use serde::{Deserialize, Serialize};

/// Which markets the holdings list shows by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketFilter {
    All,
    #[serde(rename = "KR")]
    Kr,
    #[serde(rename = "US")]
    Us,
}

/// User-configurable settings. Passed around as a plain value — the only
/// mutation path is `PocketTracker::update_settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub dark_mode: bool,

    /// Default market tab on the holdings page
    pub market_filter: MarketFilter,

    /// Monthly spending target in KRW
    pub budget_goal: f64,

    /// Route shown after login
    pub start_page: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            market_filter: MarketFilter::All,
            budget_goal: 2_000_000.0,
            start_page: "/".to_string(),
        }
    }
}
