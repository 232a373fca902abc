use serde::{Deserialize, Serialize};

/// Events requested per back-pagination call when the caller does not
/// override it.
pub const DEFAULT_PAGE_SIZE: u16 = 20;

/// Tunables for a room timeline subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Page size for "request older history" calls.
    #[serde(default = "default_page_size")]
    pub pagination_page_size: u16,
    /// Render hint: collapse the sender header of grouped events.
    #[serde(default = "default_collapse")]
    pub collapse_grouped: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            pagination_page_size: DEFAULT_PAGE_SIZE,
            collapse_grouped: true,
        }
    }
}

fn default_page_size() -> u16 {
    DEFAULT_PAGE_SIZE
}

fn default_collapse() -> bool {
    true
}
