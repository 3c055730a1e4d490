use crate::filter::filter_items;
use crate::view_model::{AppViewModel, EmptyReason, ListView};
use crate::{
    Cursor, DetailState, EnrichedListItem, Generation, LocalizedNames, RosterKey, RosterPhase,
    RosterState, SelectionState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    selection: SelectionState,
    roster: RosterState,
    generation: Generation,
    names: LocalizedNames,
    detail: Option<DetailState>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            selection: SelectionState::default(),
            roster: RosterState::default(),
            generation: 1,
            names: LocalizedNames::default(),
            detail: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn roster(&self) -> &RosterState {
        &self.roster
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn detail(&self) -> Option<&DetailState> {
        self.detail.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            search_text: self.selection.search_text().to_string(),
            active_category: self.selection.active_category().to_string(),
            scroll_offset: self.selection.scroll_offset(),
            list: self.list_view(),
            detail: self.detail.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Enriched roster items before search filtering.
    pub fn enriched_items(&self) -> Vec<EnrichedListItem> {
        self.roster
            .current_items()
            .iter()
            .map(|item| {
                let localized = self.names.localized(&item.name).map(str::to_string);
                EnrichedListItem::new(item.clone(), localized)
            })
            .collect()
    }

    fn list_view(&self) -> ListView {
        let items = filter_items(&self.enriched_items(), self.selection.search_text());
        let is_loading = self.roster.is_loading();
        let is_enriching = self
            .roster
            .current_items()
            .iter()
            .any(|item| self.names.is_pending(&item.name));
        let empty_reason = if items.is_empty() && !is_loading {
            self.empty_reason()
        } else {
            None
        };
        ListView {
            items,
            is_loading,
            is_fetching_more: self.roster.is_fetching_more(),
            has_more: self.roster.has_more(),
            is_enriching,
            total: self.roster.total(),
            empty_reason,
        }
    }

    fn empty_reason(&self) -> Option<EmptyReason> {
        if self.roster.current_items().is_empty() {
            if let Some(kind) = self.roster.last_error() {
                return Some(EmptyReason::Unavailable(kind));
            }
            if self.roster.phase() == RosterPhase::Exhausted {
                return Some(EmptyReason::EmptyRoster);
            }
            return None;
        }
        let search_text = self.selection.search_text().trim();
        (!search_text.is_empty()).then(|| EmptyReason::NoMatches {
            search_text: search_text.to_string(),
        })
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub(crate) fn names_mut(&mut self) -> &mut LocalizedNames {
        &mut self.names
    }

    pub(crate) fn set_detail(&mut self, detail: Option<DetailState>) {
        self.detail = detail;
    }

    pub(crate) fn begin_load(&mut self) -> Option<Cursor> {
        self.roster.begin_load()
    }

    pub(crate) fn roster_mut(&mut self) -> &mut RosterState {
        &mut self.roster
    }

    /// Starts a fresh roster under a new generation. Returns the retired generation.
    pub(crate) fn replace_roster(&mut self, key: RosterKey) -> Generation {
        let retired = self.generation;
        self.generation += 1;
        self.roster = RosterState::new(key);
        self.names.abandon_pending();
        retired
    }
}
