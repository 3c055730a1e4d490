use crate::{CreatureDetail, FailureKind, Generation, Page};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Render tick; starts the first page of an untouched roster.
    Tick,
    /// User edited the search box.
    SearchChanged(String),
    /// User picked a category filter. An empty string selects the full roster.
    CategorySelected(String),
    /// The view's proximity trigger asked for the next page.
    LoadMoreRequested,
    /// The list was scrolled.
    ScrollChanged(u64),
    /// User opened a creature; the list's scroll offset at that moment is kept.
    CreatureOpened { name: String, scroll_offset: u64 },
    /// User left the detail view.
    BackToList,
    /// User asked to clear all list controls.
    Reset,
    /// Engine finished a page request.
    PageLoaded {
        generation: Generation,
        result: Result<Page, FailureKind>,
    },
    /// Engine finished one localized-name lookup.
    LocalizedNameResolved {
        generation: Generation,
        name: String,
        localized: Option<String>,
    },
    /// Engine finished a detail lookup.
    DetailLoaded {
        name: String,
        result: Result<CreatureDetail, FailureKind>,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
