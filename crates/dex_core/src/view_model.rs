use crate::{DetailState, EnrichedListItem, FailureKind};

/// Why a list shows no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    NoMatches { search_text: String },
    EmptyRoster,
    Unavailable(FailureKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListView {
    /// Enriched and search-filtered items.
    pub items: Vec<EnrichedListItem>,
    pub is_loading: bool,
    pub is_fetching_more: bool,
    pub has_more: bool,
    pub is_enriching: bool,
    pub total: Option<u64>,
    pub empty_reason: Option<EmptyReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub search_text: String,
    pub active_category: String,
    pub scroll_offset: u64,
    pub list: ListView,
    pub detail: Option<DetailState>,
    pub dirty: bool,
}
