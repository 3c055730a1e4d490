use crate::{AppState, DetailState, Effect, Msg, RosterKey};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Tick => {
            if state.roster().is_untouched() {
                request_page(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::LoadMoreRequested => request_page(&mut state),
        Msg::SearchChanged(text) => {
            if text != state.selection().search_text() {
                state.selection_mut().set_search_text(text);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CategorySelected(category) => {
            if !state.selection_mut().set_active_category(&category) {
                return (state, Vec::new());
            }
            let key = state.selection().roster_key();
            switch_roster(&mut state, key)
        }
        Msg::ScrollChanged(offset) => {
            state.selection_mut().set_scroll_offset(offset);
            Vec::new()
        }
        Msg::CreatureOpened {
            name,
            scroll_offset,
        } => {
            state.selection_mut().set_scroll_offset(scroll_offset);
            state.set_detail(Some(DetailState::Loading { name: name.clone() }));
            state.mark_dirty();
            vec![Effect::FetchDetail { name }]
        }
        Msg::BackToList => {
            if state.detail().is_none() {
                return (state, Vec::new());
            }
            state.set_detail(None);
            state.mark_dirty();
            let offset = state.selection().scroll_offset();
            if offset > 0 {
                vec![Effect::RestoreScroll { offset }]
            } else {
                Vec::new()
            }
        }
        Msg::Reset => {
            let was_filtered = state.selection().roster_key() != RosterKey::Full;
            state.selection_mut().reset();
            state.set_detail(None);
            state.mark_dirty();
            if was_filtered {
                switch_roster(&mut state, RosterKey::Full)
            } else {
                Vec::new()
            }
        }
        Msg::PageLoaded { generation, result } => {
            if generation != state.generation() {
                return (state, Vec::new());
            }
            state.roster_mut().finish_load(result);
            state.mark_dirty();
            request_localized_names(&mut state)
        }
        Msg::LocalizedNameResolved {
            generation,
            name,
            localized,
        } => {
            if state.names_mut().resolve(&name, generation, localized) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DetailLoaded { name, result } => {
            let awaiting = matches!(
                state.detail(),
                Some(DetailState::Loading { name: pending }) if *pending == name
            );
            if awaiting {
                let detail = match result {
                    Ok(detail) => DetailState::Loaded(Box::new(detail)),
                    Err(kind) => DetailState::Unavailable { name, kind },
                };
                state.set_detail(Some(detail));
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn request_page(state: &mut AppState) -> Vec<Effect> {
    let Some(cursor) = state.begin_load() else {
        return Vec::new();
    };
    state.mark_dirty();
    vec![Effect::FetchPage {
        generation: state.generation(),
        roster: state.roster().key().clone(),
        cursor,
    }]
}

fn switch_roster(state: &mut AppState, key: RosterKey) -> Vec<Effect> {
    let retired = state.replace_roster(key);
    state.mark_dirty();
    let mut effects = vec![Effect::AbandonGeneration {
        generation: retired,
    }];
    effects.extend(request_page(state));
    effects
}

fn request_localized_names(state: &mut AppState) -> Vec<Effect> {
    let generation = state.generation();
    let names: Vec<String> = state
        .roster()
        .current_items()
        .iter()
        .map(|item| item.name.clone())
        .collect();
    let requested = state
        .names_mut()
        .request(names.iter().map(String::as_str), generation);
    if requested.is_empty() {
        Vec::new()
    } else {
        vec![Effect::ResolveLocalizedNames {
            generation,
            names: requested,
        }]
    }
}
