use std::collections::{HashMap, HashSet};

use dex_core::{EnrichedListItem, ListItem};
use dex_logging::dex_debug;
use futures_util::{stream, StreamExt};

use crate::{CatalogApi, QueryKey};

pub const DEFAULT_ENRICH_CONCURRENCY: usize = 8;

/// A partially enriched list read from cache without issuing requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentSnapshot {
    pub items: Vec<EnrichedListItem>,
    /// True while any constituent lookup is still outstanding.
    pub is_loading: bool,
}

/// Attaches localized names to list items via one species lookup per distinct name.
#[derive(Clone)]
pub struct EnrichmentAggregator {
    api: CatalogApi,
    concurrency: usize,
}

impl EnrichmentAggregator {
    pub fn new(api: CatalogApi, concurrency: usize) -> Self {
        Self {
            api,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolves every distinct name and returns `items` in the same order and count.
    pub async fn enrich(&self, items: &[ListItem]) -> Vec<EnrichedListItem> {
        let mut resolved = HashMap::new();
        self.resolve_each(distinct_names(items), |name, localized| {
            resolved.insert(name, localized);
        })
        .await;
        items
            .iter()
            .map(|item| {
                let localized = resolved.get(&item.name).cloned().flatten();
                EnrichedListItem::new(item.clone(), localized)
            })
            .collect()
    }

    /// Looks up each name with bounded concurrency, reporting results in completion order.
    ///
    /// Failed lookups are reported as `None`.
    pub async fn resolve_each<F>(&self, names: Vec<String>, mut on_resolved: F)
    where
        F: FnMut(String, Option<String>),
    {
        let mut lookups = stream::iter(names)
            .map(|name| async move {
                let localized = self.lookup(&name).await;
                (name, localized)
            })
            .buffer_unordered(self.concurrency);
        while let Some((name, localized)) = lookups.next().await {
            on_resolved(name, localized);
        }
    }

    pub fn snapshot(&self, items: &[ListItem]) -> EnrichmentSnapshot {
        let cache = self.api.cache();
        let mut is_loading = false;
        let items = items
            .iter()
            .map(|item| {
                is_loading |= cache.is_pending(&QueryKey::species(&item.name));
                let localized = self.api.cached_localized_name(&item.name).flatten();
                EnrichedListItem::new(item.clone(), localized)
            })
            .collect();
        EnrichmentSnapshot { items, is_loading }
    }

    async fn lookup(&self, name: &str) -> Option<String> {
        match self.api.localized_name(name).await {
            Ok(localized) => localized,
            Err(err) => {
                dex_debug!("Localized name for {} unavailable: {}", name, err);
                None
            }
        }
    }
}

/// Names in first-seen order without repeats.
pub fn distinct_names(items: &[ListItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.name.as_str()))
        .map(|item| item.name.clone())
        .collect()
}
