use std::fmt;

use dex_core::{Cursor, FailureKind, Generation, Page, RosterKey};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transient, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Malformed, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    CreatureList,
    Creature,
    Species,
    Category,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::CreatureList => "creature-list",
            ResourceKind::Creature => "creature",
            ResourceKind::Species => "species",
            ResourceKind::Category => "category",
        }
    }

    /// First path segment of the upstream endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            ResourceKind::CreatureList | ResourceKind::Creature => "pokemon",
            ResourceKind::Species => "pokemon-species",
            ResourceKind::Category => "type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Identifies one upstream read: resource kind, identifier and page window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    kind: ResourceKind,
    id: String,
    window: Option<PageWindow>,
}

impl QueryKey {
    pub fn creature_list(offset: u64, limit: u64) -> Self {
        Self {
            kind: ResourceKind::CreatureList,
            id: String::new(),
            window: Some(PageWindow { offset, limit }),
        }
    }

    pub fn creature(name: &str) -> Self {
        Self::named(ResourceKind::Creature, name)
    }

    pub fn species(name: &str) -> Self {
        Self::named(ResourceKind::Species, name)
    }

    pub fn category(name: &str) -> Self {
        Self::named(ResourceKind::Category, name)
    }

    fn named(kind: ResourceKind, name: &str) -> Self {
        Self {
            kind,
            id: name.trim().to_lowercase(),
            window: None,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn window(&self) -> Option<PageWindow> {
        self.window
    }

    /// Deterministic cache key, e.g. `creature-list::offset=20&limit=20` or `species:pikachu:`.
    pub fn cache_key(&self) -> String {
        let window = self
            .window
            .map(|w| format!("offset={}&limit={}", w.offset, w.limit))
            .unwrap_or_default();
        format!("{}:{}:{}", self.kind.as_str(), self.id, window)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PageFetched {
        generation: Generation,
        roster: RosterKey,
        cursor: Cursor,
        result: Result<Page, FetchError>,
    },
    NameResolved {
        generation: Generation,
        name: String,
        localized: Option<String>,
    },
    DetailFetched {
        name: String,
        result: Result<dex_core::CreatureDetail, FetchError>,
    },
}

// Upstream payload shapes. Only the fields the pipeline reads are modelled.

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListResponse {
    pub count: u64,
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryMember {
    pub pokemon: NamedResource,
    #[serde(default)]
    pub slot: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryResponse {
    pub name: String,
    pub pokemon: Vec<CategoryMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalizedText {
    pub name: String,
    pub language: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlavorText {
    pub flavor_text: String,
    pub language: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpeciesRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub names: Vec<LocalizedText>,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorText>,
    pub generation: Option<NamedResource>,
    pub evolves_from_species: Option<NamedResource>,
}

impl SpeciesRecord {
    pub fn localized_name(&self, locale: &str) -> Option<String> {
        self.names
            .iter()
            .find(|entry| entry.language.name == locale)
            .map(|entry| entry.name.clone())
            .filter(|name| !name.is_empty())
    }

    /// First flavor text in `locale`, with line breaks flattened to spaces.
    pub fn localized_description(&self, locale: &str) -> Option<String> {
        self.flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == locale)
            .map(|entry| entry.flavor_text.replace(['\n', '\u{c}'], " "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatEntry {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Artwork {
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<Artwork>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

impl Sprites {
    /// Official artwork when available, the default sprite otherwise.
    pub fn best_image(&self) -> Option<String> {
        self.other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|artwork| artwork.front_default.clone())
            .or_else(|| self.front_default.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatureRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    pub base_experience: Option<u32>,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub sprites: Sprites,
}
