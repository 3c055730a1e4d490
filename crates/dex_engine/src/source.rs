use std::collections::HashSet;
use std::sync::Arc;

use dex_core::{Cursor, ListItem, Page, RosterKey};
use dex_logging::dex_debug;

use crate::{CatalogApi, FetchError};

/// Upstream ceiling of the full roster; later entries are alternate forms.
pub const FULL_ROSTER_CEILING: u64 = 1302;

#[derive(Debug, Clone)]
pub struct RosterSettings {
    pub page_size: u64,
    /// Caps the full roster below the count reported upstream.
    pub ceiling: Option<u64>,
    pub category_slice: usize,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            ceiling: Some(FULL_ROSTER_CEILING),
            category_slice: 30,
        }
    }
}

/// One page-at-a-time view of a roster.
#[async_trait::async_trait]
pub trait ListSource: Send + Sync {
    fn roster(&self) -> RosterKey;

    async fn fetch_page(&self, cursor: Cursor) -> Result<Page, FetchError>;
}

#[async_trait::async_trait]
impl<S: ListSource + ?Sized> ListSource for Arc<S> {
    fn roster(&self) -> RosterKey {
        (**self).roster()
    }

    async fn fetch_page(&self, cursor: Cursor) -> Result<Page, FetchError> {
        (**self).fetch_page(cursor).await
    }
}

pub fn source_for(api: &CatalogApi, key: &RosterKey, settings: &RosterSettings) -> Arc<dyn ListSource> {
    match key {
        RosterKey::Full => Arc::new(FullRoster::new(api.clone(), settings.page_size, settings.ceiling)),
        RosterKey::Category(name) => Arc::new(CategoryRoster::new(
            api.clone(),
            name.clone(),
            settings.category_slice,
        )),
    }
}

/// The whole catalog, requested upstream one offset window at a time.
pub struct FullRoster {
    api: CatalogApi,
    page_size: u64,
    ceiling: Option<u64>,
}

impl FullRoster {
    pub fn new(api: CatalogApi, page_size: u64, ceiling: Option<u64>) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            ceiling,
        }
    }
}

#[async_trait::async_trait]
impl ListSource for FullRoster {
    fn roster(&self) -> RosterKey {
        RosterKey::Full
    }

    async fn fetch_page(&self, cursor: Cursor) -> Result<Page, FetchError> {
        let Cursor::Offset(offset) = cursor else {
            return Ok(Page::end());
        };
        let response = self.api.list_page(offset, self.page_size).await?;
        let total = self
            .ceiling
            .map_or(response.count, |ceiling| response.count.min(ceiling));

        let room = total.saturating_sub(offset);
        let items: Vec<ListItem> = response
            .results
            .into_iter()
            .take(usize::try_from(room).unwrap_or(usize::MAX))
            .map(|entry| ListItem::new(entry.name, entry.url))
            .collect();

        let reached = offset + items.len() as u64;
        // An empty page before the reported total would otherwise never advance.
        let next = if !items.is_empty() && reached < total {
            Cursor::Offset(reached)
        } else {
            Cursor::End
        };
        dex_debug!(
            "Full roster page offset={} items={} total={}",
            offset,
            items.len(),
            total
        );
        Ok(Page {
            items,
            next,
            total: Some(total),
        })
    }
}

/// Members of one category, read through the query cache and sliced locally.
pub struct CategoryRoster {
    api: CatalogApi,
    category: String,
    slice_size: usize,
}

impl CategoryRoster {
    pub fn new(api: CatalogApi, category: impl Into<String>, slice_size: usize) -> Self {
        Self {
            api,
            category: category.into(),
            slice_size: slice_size.max(1),
        }
    }

    /// Within the cache's stale time this is a hit, so slicing never refetches.
    async fn members(&self) -> Result<Vec<ListItem>, FetchError> {
        let response = self.api.category(&self.category).await?;
        let mut seen = HashSet::new();
        let members: Vec<ListItem> = response
            .pokemon
            .into_iter()
            .filter(|member| seen.insert(member.pokemon.name.clone()))
            .map(|member| ListItem::new(member.pokemon.name, member.pokemon.url))
            .collect();
        dex_debug!(
            "Category {} membership: {} members",
            self.category,
            members.len()
        );
        Ok(members)
    }
}

#[async_trait::async_trait]
impl ListSource for CategoryRoster {
    fn roster(&self) -> RosterKey {
        RosterKey::Category(self.category.clone())
    }

    async fn fetch_page(&self, cursor: Cursor) -> Result<Page, FetchError> {
        let Cursor::Offset(offset) = cursor else {
            return Ok(Page::end());
        };
        let mut members = self.members().await?;
        let len = members.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
        let end = start.saturating_add(self.slice_size).min(len);
        let next = if end < len {
            Cursor::Offset(end as u64)
        } else {
            Cursor::End
        };
        Ok(Page {
            items: members.drain(start..end).collect(),
            next,
            total: Some(len as u64),
        })
    }
}
