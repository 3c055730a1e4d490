use crate::EnrichedListItem;

/// Keeps items whose canonical or localized name contains `search_text`, ignoring case.
///
/// Blank search text returns the input unchanged.
pub fn filter_items(items: &[EnrichedListItem], search_text: &str) -> Vec<EnrichedListItem> {
    let needle = search_text.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| matches_search(item, &needle))
        .cloned()
        .collect()
}

fn matches_search(item: &EnrichedListItem, needle: &str) -> bool {
    item.name.to_lowercase().contains(needle)
        || item
            .localized_name
            .as_deref()
            .is_some_and(|localized| localized.to_lowercase().contains(needle))
}
