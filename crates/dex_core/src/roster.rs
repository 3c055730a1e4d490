use std::collections::HashSet;

use crate::{Cursor, FailureKind, ListItem, Page, RosterKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RosterPhase {
    #[default]
    Idle,
    /// First page in flight.
    Loading,
    Ready,
    /// A follow-up page is in flight.
    LoadingMore,
    Exhausted,
}

/// Pagination state of one roster: fetched items, next cursor and load phase.
///
/// Pages are appended strictly in the order they were requested; only one
/// load may be in flight at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterState {
    key: RosterKey,
    items: Vec<ListItem>,
    seen: HashSet<String>,
    cursor: Cursor,
    total: Option<u64>,
    phase: RosterPhase,
    pages_loaded: usize,
    last_error: Option<FailureKind>,
}

impl Default for RosterState {
    fn default() -> Self {
        Self::new(RosterKey::Full)
    }
}

impl RosterState {
    pub fn new(key: RosterKey) -> Self {
        Self {
            key,
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: Cursor::START,
            total: None,
            phase: RosterPhase::Idle,
            pages_loaded: 0,
            last_error: None,
        }
    }

    pub fn key(&self) -> &RosterKey {
        &self.key
    }

    pub fn phase(&self) -> RosterPhase {
        self.phase
    }

    /// All items fetched so far, in fetch order.
    pub fn current_items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn last_error(&self) -> Option<FailureKind> {
        self.last_error
    }

    pub fn has_more(&self) -> bool {
        match self.cursor {
            Cursor::End => false,
            Cursor::Offset(offset) => self.total.is_none_or(|total| offset < total),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == RosterPhase::Loading
    }

    pub fn is_fetching_more(&self) -> bool {
        self.phase == RosterPhase::LoadingMore
    }

    pub fn is_in_flight(&self) -> bool {
        self.is_loading() || self.is_fetching_more()
    }

    /// True until the first page has been requested.
    pub fn is_untouched(&self) -> bool {
        self.phase == RosterPhase::Idle && self.pages_loaded == 0 && self.last_error.is_none()
    }

    /// Marks a load as in flight and returns the cursor to fetch.
    ///
    /// Returns `None` when the roster is exhausted or a load is already running.
    pub fn begin_load(&mut self) -> Option<Cursor> {
        if self.is_in_flight() || !self.has_more() {
            return None;
        }
        self.phase = if self.pages_loaded == 0 {
            RosterPhase::Loading
        } else {
            RosterPhase::LoadingMore
        };
        Some(self.cursor)
    }

    /// Applies the outcome of the load started by [`RosterState::begin_load`].
    ///
    /// Returns the number of items appended. Items whose name is already
    /// present are skipped. A failure keeps earlier pages and the cursor so the
    /// same page can be requested again.
    pub fn finish_load(&mut self, result: Result<Page, FailureKind>) -> usize {
        if !self.is_in_flight() {
            return 0;
        }
        match result {
            Ok(page) => {
                let before = self.items.len();
                for item in page.items {
                    if self.seen.insert(item.name.clone()) {
                        self.items.push(item);
                    }
                }
                if page.total.is_some() {
                    self.total = page.total;
                }
                self.cursor = page.next;
                self.pages_loaded += 1;
                self.last_error = None;
                self.phase = if self.has_more() {
                    RosterPhase::Ready
                } else {
                    RosterPhase::Exhausted
                };
                self.items.len() - before
            }
            Err(kind) => {
                self.last_error = Some(kind);
                self.phase = self.settled_phase();
                0
            }
        }
    }

    /// Drops an in-flight marker whose result will never arrive.
    pub fn abort_load(&mut self) {
        if self.is_in_flight() {
            self.phase = self.settled_phase();
        }
    }

    fn settled_phase(&self) -> RosterPhase {
        if self.pages_loaded == 0 {
            RosterPhase::Idle
        } else {
            RosterPhase::Ready
        }
    }
}
