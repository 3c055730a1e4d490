use crate::types::normalize_category;
use crate::RosterKey;

/// Session-wide list controls: search text, category filter and the saved scroll offset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    search_text: String,
    active_category: String,
    scroll_offset: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Empty when the full roster is active.
    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn roster_key(&self) -> RosterKey {
        RosterKey::from_category(&self.active_category)
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Switches the category filter. Returns `true` if the category changed.
    ///
    /// A change also clears the search text.
    pub fn set_active_category(&mut self, category: &str) -> bool {
        let category = normalize_category(category);
        if category == self.active_category {
            return false;
        }
        self.active_category = category;
        self.search_text.clear();
        true
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll_offset = offset;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
