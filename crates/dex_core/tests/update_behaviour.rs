use std::sync::Once;

use dex_core::{
    update, AppState, CreatureDetail, Cursor, DetailState, Effect, EmptyReason, FailureKind,
    ListItem, Msg, Page, RosterKey,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(dex_logging::initialize_for_tests);
}

fn page(names: &[&str], next: Cursor, total: Option<u64>) -> Page {
    Page {
        items: names
            .iter()
            .map(|name| ListItem::new(*name, format!("https://pokeapi.co/api/v2/pokemon/{name}/")))
            .collect(),
        next,
        total,
    }
}

fn visible_names(state: &AppState) -> Vec<String> {
    state
        .view()
        .list
        .items
        .into_iter()
        .map(|item| item.name)
        .collect()
}

/// Starts the full roster and delivers its first page.
fn with_first_page(names: &[&str], next: Cursor, total: Option<u64>) -> (AppState, Vec<Effect>) {
    let (state, _) = update(AppState::new(), Msg::Tick);
    let generation = state.generation();
    update(
        state,
        Msg::PageLoaded {
            generation,
            result: Ok(page(names, next, total)),
        },
    )
}

#[test]
fn tick_requests_first_page_of_full_roster() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::Tick);

    assert_eq!(
        effects,
        vec![Effect::FetchPage {
            generation: 1,
            roster: RosterKey::Full,
            cursor: Cursor::START,
        }]
    );
    let view = state.view();
    assert!(view.list.is_loading);
    assert!(view.list.has_more);
    assert!(view.list.empty_reason.is_none());
    assert!(state.consume_dirty());
}

#[test]
fn page_loaded_appends_items_and_requests_localized_names() {
    init_logging();
    let (state, effects) = with_first_page(&["bulbasaur", "ivysaur"], Cursor::Offset(2), Some(4));

    assert_eq!(visible_names(&state), vec!["bulbasaur", "ivysaur"]);
    assert_eq!(
        effects,
        vec![Effect::ResolveLocalizedNames {
            generation: 1,
            names: vec!["bulbasaur".to_string(), "ivysaur".to_string()],
        }]
    );
    let view = state.view();
    assert!(!view.list.is_loading);
    assert!(view.list.is_enriching);
    assert_eq!(view.list.total, Some(4));
}

#[test]
fn load_more_is_ignored_while_in_flight() {
    init_logging();
    let (state, _) = with_first_page(&["a"], Cursor::Offset(1), Some(3));

    let (state, effects) = update(state, Msg::LoadMoreRequested);
    assert_eq!(
        effects,
        vec![Effect::FetchPage {
            generation: 1,
            roster: RosterKey::Full,
            cursor: Cursor::Offset(1),
        }]
    );
    assert!(state.view().list.is_fetching_more);

    let (_state, effects) = update(state, Msg::LoadMoreRequested);
    assert!(effects.is_empty());
}

#[test]
fn load_more_after_exhaustion_is_noop() {
    init_logging();
    let (state, _) = with_first_page(&["a", "b"], Cursor::End, Some(2));
    assert!(!state.view().list.has_more);

    let (_state, effects) = update(state, Msg::LoadMoreRequested);
    assert!(effects.is_empty());
}

#[test]
fn switching_category_abandons_old_roster_and_starts_fresh() {
    init_logging();
    let (state, _) = with_first_page(&["a", "b"], Cursor::Offset(2), Some(10));

    let (state, effects) = update(state, Msg::CategorySelected("fire".to_string()));
    assert_eq!(
        effects,
        vec![
            Effect::AbandonGeneration { generation: 1 },
            Effect::FetchPage {
                generation: 2,
                roster: RosterKey::Category("fire".to_string()),
                cursor: Cursor::START,
            },
        ]
    );
    assert!(visible_names(&state).is_empty());

    // Returning to the full roster does not resume from the old cursor.
    let (state, effects) = update(state, Msg::CategorySelected(String::new()));
    assert_eq!(
        effects,
        vec![
            Effect::AbandonGeneration { generation: 2 },
            Effect::FetchPage {
                generation: 3,
                roster: RosterKey::Full,
                cursor: Cursor::START,
            },
        ]
    );
    assert_eq!(state.view().active_category, "");
}

#[test]
fn reselecting_active_category_does_nothing() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::CategorySelected("water".to_string()));
    let (next, effects) = update(state.clone(), Msg::CategorySelected(" Water ".to_string()));

    assert!(effects.is_empty());
    assert_eq!(state, next);
}

#[test]
fn switching_category_clears_search_text() {
    init_logging();
    let (state, _) = with_first_page(&["charmander"], Cursor::Offset(1), Some(5));
    let (state, _) = update(state, Msg::SearchChanged("char".to_string()));
    assert_eq!(state.view().search_text, "char");

    let (state, _) = update(state, Msg::CategorySelected("fire".to_string()));
    assert_eq!(state.view().search_text, "");
    assert_eq!(state.view().active_category, "fire");
}

#[test]
fn late_page_for_abandoned_roster_is_discarded() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::Tick);
    let (state, _) = update(state, Msg::CategorySelected("grass".to_string()));

    let (state, effects) = update(
        state,
        Msg::PageLoaded {
            generation: 1,
            result: Ok(page(&["pidgey"], Cursor::Offset(1), Some(100))),
        },
    );
    assert!(effects.is_empty());
    assert!(visible_names(&state).is_empty());
    assert!(state.view().list.is_loading);

    let (state, _) = update(
        state,
        Msg::PageLoaded {
            generation: 2,
            result: Ok(page(&["oddish"], Cursor::End, Some(1))),
        },
    );
    assert_eq!(visible_names(&state), vec!["oddish"]);
}

#[test]
fn localized_names_enrich_items_and_feed_search() {
    init_logging();
    let (state, _) = with_first_page(&["pikachu", "raichu"], Cursor::End, Some(2));
    let (state, _) = update(
        state,
        Msg::LocalizedNameResolved {
            generation: 1,
            name: "pikachu".to_string(),
            localized: Some("피카츄".to_string()),
        },
    );

    let view = state.view();
    assert_eq!(view.list.items[0].display_name(), "피카츄");
    assert_eq!(view.list.items[1].display_name(), "raichu");
    assert!(view.list.is_enriching);

    let (state, _) = update(state, Msg::SearchChanged("피카".to_string()));
    assert_eq!(visible_names(&state), vec!["pikachu"]);
}

#[test]
fn failed_lookup_keeps_item_with_canonical_name() {
    init_logging();
    let (state, _) = with_first_page(&["missingno", "mew"], Cursor::End, Some(2));
    let (state, _) = update(
        state,
        Msg::LocalizedNameResolved {
            generation: 1,
            name: "missingno".to_string(),
            localized: None,
        },
    );
    let (state, _) = update(
        state,
        Msg::LocalizedNameResolved {
            generation: 1,
            name: "mew".to_string(),
            localized: Some("뮤".to_string()),
        },
    );

    let view = state.view();
    assert_eq!(view.list.items.len(), 2);
    assert_eq!(view.list.items[0].display_name(), "missingno");
    assert!(!view.list.is_enriching);
}

#[test]
fn lookup_result_for_old_generation_is_ignored() {
    init_logging();
    let (state, _) = with_first_page(&["eevee"], Cursor::Offset(1), Some(10));
    let (state, _) = update(state, Msg::CategorySelected("normal".to_string()));
    let (mut state, _) = update(
        state,
        Msg::LocalizedNameResolved {
            generation: 1,
            name: "eevee".to_string(),
            localized: Some("이브이".to_string()),
        },
    );
    state.consume_dirty();

    let (state, effects) = update(
        state,
        Msg::PageLoaded {
            generation: 2,
            result: Ok(page(&["eevee"], Cursor::End, Some(1))),
        },
    );
    // The abandoned lookup is requested again under the new generation.
    assert_eq!(
        effects,
        vec![Effect::ResolveLocalizedNames {
            generation: 2,
            names: vec!["eevee".to_string()],
        }]
    );
    assert_eq!(state.view().list.items[0].localized_name, None);
}

#[test]
fn failed_page_keeps_prior_items_and_allows_retry() {
    init_logging();
    let (state, _) = with_first_page(&["a", "b"], Cursor::Offset(2), Some(6));
    let (state, _) = update(state, Msg::LoadMoreRequested);
    let (state, effects) = update(
        state,
        Msg::PageLoaded {
            generation: 1,
            result: Err(FailureKind::Transient),
        },
    );
    assert!(effects.is_empty());

    let view = state.view();
    assert_eq!(visible_names(&state), vec!["a", "b"]);
    assert!(view.list.has_more);
    assert!(!view.list.is_fetching_more);

    let (_state, effects) = update(state, Msg::LoadMoreRequested);
    assert_eq!(
        effects,
        vec![Effect::FetchPage {
            generation: 1,
            roster: RosterKey::Full,
            cursor: Cursor::Offset(2),
        }]
    );
}

#[test]
fn empty_reasons_distinguish_no_match_and_unavailable() {
    init_logging();
    let (state, _) = with_first_page(&["onix"], Cursor::End, Some(1));
    let (state, _) = update(state, Msg::SearchChanged("zzz".to_string()));
    let view = state.view();
    assert!(view.list.items.is_empty());
    assert_eq!(
        view.list.empty_reason,
        Some(EmptyReason::NoMatches {
            search_text: "zzz".to_string()
        })
    );

    let (state, _) = update(AppState::new(), Msg::Tick);
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            generation: 1,
            result: Err(FailureKind::NotFound),
        },
    );
    assert_eq!(
        state.view().list.empty_reason,
        Some(EmptyReason::Unavailable(FailureKind::NotFound))
    );
    // Ticks do not retry a failed first page on their own.
    let (_state, effects) = update(state, Msg::Tick);
    assert!(effects.is_empty());
}

#[test]
fn scroll_offset_survives_detail_round_trip() {
    init_logging();
    let (state, _) = with_first_page(&["snorlax"], Cursor::End, Some(1));
    let (state, effects) = update(
        state,
        Msg::CreatureOpened {
            name: "snorlax".to_string(),
            scroll_offset: 480,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::FetchDetail {
            name: "snorlax".to_string()
        }]
    );
    assert_eq!(
        state.view().detail,
        Some(DetailState::Loading {
            name: "snorlax".to_string()
        })
    );

    let (state, effects) = update(state, Msg::BackToList);
    assert_eq!(effects, vec![Effect::RestoreScroll { offset: 480 }]);
    assert_eq!(state.view().scroll_offset, 480);
    assert!(state.view().detail.is_none());

    let (state, _) = update(state, Msg::Reset);
    assert_eq!(state.view().scroll_offset, 0);
}

#[test]
fn detail_result_for_other_creature_is_ignored() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::CreatureOpened {
            name: "mew".to_string(),
            scroll_offset: 0,
        },
    );
    let (state, _) = update(
        state,
        Msg::DetailLoaded {
            name: "mewtwo".to_string(),
            result: Err(FailureKind::Transient),
        },
    );
    assert_eq!(state.view().detail.map(|d| d.name().to_string()), Some("mew".to_string()));

    let detail = CreatureDetail {
        id: 151,
        name: "mew".to_string(),
        localized_name: Some("뮤".to_string()),
        ..CreatureDetail::default()
    };
    let (state, _) = update(
        state,
        Msg::DetailLoaded {
            name: "mew".to_string(),
            result: Ok(detail.clone()),
        },
    );
    assert_eq!(state.view().detail, Some(DetailState::Loaded(Box::new(detail))));
}

#[test]
fn reset_from_category_returns_to_full_roster() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::CategorySelected("ice".to_string()));
    let (state, _) = update(state, Msg::SearchChanged("lap".to_string()));
    let (state, effects) = update(state, Msg::Reset);

    assert_eq!(
        effects,
        vec![
            Effect::AbandonGeneration { generation: 2 },
            Effect::FetchPage {
                generation: 3,
                roster: RosterKey::Full,
                cursor: Cursor::START,
            },
        ]
    );
    let view = state.view();
    assert_eq!(view.active_category, "");
    assert_eq!(view.search_text, "");
}
