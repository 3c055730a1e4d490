use dex_core::{ListItem, RosterState};
use dex_logging::dex_warn;

use crate::{FetchError, ListSource};

/// Drives a [`RosterState`] against a [`ListSource`] with awaited loads.
pub struct Paginator<S> {
    source: S,
    state: RosterState,
}

impl<S: ListSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        let state = RosterState::new(source.roster());
        Self { source, state }
    }

    pub fn current_items(&self) -> &[ListItem] {
        self.state.current_items()
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    pub fn state(&self) -> &RosterState {
        &self.state
    }

    /// Fetches and appends the next page. Returns the number of items appended.
    ///
    /// A no-op returning `Ok(0)` once the roster is exhausted. A failure
    /// leaves earlier pages untouched and the same page is retried next call.
    pub async fn load_next(&mut self) -> Result<usize, FetchError> {
        // A previous call was dropped mid-flight.
        self.state.abort_load();

        let Some(cursor) = self.state.begin_load() else {
            return Ok(0);
        };
        match self.source.fetch_page(cursor).await {
            Ok(page) => Ok(self.state.finish_load(Ok(page))),
            Err(err) => {
                dex_warn!("Loading {} page failed: {}", self.state.key(), err);
                self.state.finish_load(Err(err.kind));
                Err(err)
            }
        }
    }
}
