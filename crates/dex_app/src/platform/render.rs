use std::fmt::Write as _;

use dex_core::l10n::{generation_label, stat_label, type_label};
use dex_core::{
    AppViewModel, CreatureDetail, DetailState, EmptyReason, EnrichedListItem, FailureKind, ListView,
};

/// Rows shown per screen of the list.
pub const WINDOW_ROWS: usize = 20;

/// Renders whichever screen is active.
pub fn render(view: &AppViewModel, window_start: u64, locale: &str) -> String {
    match &view.detail {
        Some(detail) => render_detail(detail, locale),
        None => render_list(view, window_start, locale),
    }
}

fn render_list(view: &AppViewModel, window_start: u64, locale: &str) -> String {
    let mut out = String::new();
    let list = &view.list;

    let category = if view.active_category.is_empty() {
        "all"
    } else {
        type_label(locale, &view.active_category)
    };
    let _ = write!(out, "[{category}]");
    if !view.search_text.trim().is_empty() {
        let _ = write!(out, " search: \"{}\"", view.search_text);
    }
    let _ = writeln!(out, " {}", count_label(list));

    if let Some(reason) = &list.empty_reason {
        let _ = writeln!(out, "  {}", empty_label(reason));
    }

    let start = usize::try_from(window_start)
        .unwrap_or(usize::MAX)
        .min(list.items.len());
    let end = start.saturating_add(WINDOW_ROWS).min(list.items.len());
    for (index, item) in list.items[start..end].iter().enumerate() {
        let _ = writeln!(out, "{:>5}. {}", start + index + 1, item_label(item));
    }

    if let Some(status) = status_label(list) {
        let _ = writeln!(out, "  {status}");
    } else if end < list.items.len() {
        let _ = writeln!(out, "  ... {} more below (scroll {})", list.items.len() - end, end);
    } else if list.has_more {
        let _ = writeln!(out, "  type `more` to load the next page");
    }
    out
}

fn count_label(list: &ListView) -> String {
    match list.total {
        Some(total) => format!("{} shown of {}", list.items.len(), total),
        None => format!("{} shown", list.items.len()),
    }
}

fn status_label(list: &ListView) -> Option<&'static str> {
    if list.is_loading {
        Some("loading...")
    } else if list.is_fetching_more {
        Some("loading more...")
    } else if list.is_enriching {
        Some("resolving names...")
    } else {
        None
    }
}

fn item_label(item: &EnrichedListItem) -> String {
    match &item.localized_name {
        Some(localized) if *localized != item.name => format!("{localized} ({})", item.name),
        _ => item.name.clone(),
    }
}

fn empty_label(reason: &EmptyReason) -> String {
    match reason {
        EmptyReason::NoMatches { search_text } => format!("no creatures match \"{search_text}\""),
        EmptyReason::EmptyRoster => "this list is empty".to_string(),
        EmptyReason::Unavailable(kind) => format!("list unavailable: {}", failure_label(*kind)),
    }
}

fn failure_label(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::NotFound => "not found",
        FailureKind::Transient => "network problem, try `more` again",
        FailureKind::Malformed => "unexpected response",
    }
}

fn render_detail(detail: &DetailState, locale: &str) -> String {
    match detail {
        DetailState::Loading { name } => format!("loading {name}...\n"),
        DetailState::Unavailable { name, kind } => {
            format!("{name}: {}\n  type `back` to return\n", failure_label(*kind))
        }
        DetailState::Loaded(detail) => render_creature(detail, locale),
    }
}

fn render_creature(detail: &CreatureDetail, locale: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{:04} {}", detail.id, detail.display_name());
    if detail.localized_name.is_some() {
        let _ = writeln!(out, "  ({})", detail.name);
    }

    let types: Vec<&str> = detail
        .types
        .iter()
        .map(|name| type_label(locale, name))
        .collect();
    let _ = writeln!(out, "  types: {}", types.join(" / "));
    let _ = writeln!(
        out,
        "  height: {:.1} m  weight: {:.1} kg",
        f64::from(detail.height) / 10.0,
        f64::from(detail.weight) / 10.0
    );
    if let Some(experience) = detail.base_experience {
        let _ = writeln!(out, "  base experience: {experience}");
    }
    if let Some(generation) = &detail.generation {
        let _ = writeln!(out, "  {}", generation_label(locale, generation));
    }
    if let Some(from) = &detail.evolves_from {
        let _ = writeln!(out, "  evolves from: {from}");
    }

    for stat in &detail.stats {
        let _ = writeln!(out, "  {:<10} {:>3}", stat_label(locale, &stat.name), stat.base);
    }
    let abilities: Vec<String> = detail
        .abilities
        .iter()
        .map(|ability| {
            if ability.hidden {
                format!("{} (hidden)", ability.name)
            } else {
                ability.name.clone()
            }
        })
        .collect();
    if !abilities.is_empty() {
        let _ = writeln!(out, "  abilities: {}", abilities.join(", "));
    }
    if let Some(description) = &detail.description {
        let _ = writeln!(out, "  {description}");
    }
    if let Some(url) = &detail.artwork_url {
        let _ = writeln!(out, "  artwork: {url}");
    }
    let _ = writeln!(out, "  type `back` to return");
    out
}
