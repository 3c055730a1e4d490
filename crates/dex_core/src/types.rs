use std::fmt;

use url::Url;

/// Identifies one roster context. Results tagged with an older generation are stale.
pub type Generation = u64;

/// One entry of a roster page as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListItem {
    pub name: String,
    pub source_url: String,
}

impl ListItem {
    pub fn new(name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_url: source_url.into(),
        }
    }

    /// Numeric id taken from the last path segment of `source_url`, if any.
    ///
    /// `https://pokeapi.co/api/v2/pokemon/25/` yields `Some(25)`.
    pub fn resource_id(&self) -> Option<u32> {
        let url = Url::parse(&self.source_url).ok()?;
        url.path_segments()?
            .filter(|segment| !segment.is_empty())
            .next_back()?
            .parse()
            .ok()
    }
}

/// A list item with its localized display name attached once known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedListItem {
    pub name: String,
    pub source_url: String,
    pub localized_name: Option<String>,
}

impl EnrichedListItem {
    pub fn new(item: ListItem, localized_name: Option<String>) -> Self {
        Self {
            name: item.name,
            source_url: item.source_url,
            localized_name,
        }
    }

    /// Localized name when resolved, canonical name otherwise.
    pub fn display_name(&self) -> &str {
        self.localized_name.as_deref().unwrap_or(&self.name)
    }
}

impl From<ListItem> for EnrichedListItem {
    fn from(item: ListItem) -> Self {
        Self::new(item, None)
    }
}

/// Pagination position within a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    Offset(u64),
    #[default]
    End,
}

impl Cursor {
    pub const START: Cursor = Cursor::Offset(0);

    pub fn is_end(self) -> bool {
        matches!(self, Cursor::End)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<ListItem>,
    pub next: Cursor,
    /// Total roster size when the source knows it.
    pub total: Option<u64>,
}

impl Page {
    pub fn end() -> Self {
        Self {
            items: Vec::new(),
            next: Cursor::End,
            total: None,
        }
    }
}

/// Which logical collection is being paginated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RosterKey {
    #[default]
    Full,
    Category(String),
}

impl RosterKey {
    /// Maps a category filter value to a roster; an empty filter selects the full roster.
    pub fn from_category(category: &str) -> Self {
        let category = normalize_category(category);
        if category.is_empty() {
            RosterKey::Full
        } else {
            RosterKey::Category(category)
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            RosterKey::Full => None,
            RosterKey::Category(name) => Some(name),
        }
    }
}

impl fmt::Display for RosterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterKey::Full => write!(f, "full"),
            RosterKey::Category(name) => write!(f, "category:{name}"),
        }
    }
}

pub fn normalize_category(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Failure classes surfaced to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The identifier does not exist upstream. Not retried automatically.
    NotFound,
    /// Network or server failure; a later access may succeed.
    Transient,
    /// The response did not have the expected shape.
    Malformed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Transient => write!(f, "temporarily unavailable"),
            FailureKind::Malformed => write!(f, "malformed response"),
        }
    }
}
