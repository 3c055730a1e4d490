//! Dex engine: catalog IO, query cache, roster sources and enrichment.
mod api;
mod cache;
mod engine;
mod enrich;
mod gateway;
mod paginator;
mod source;
mod types;

pub use api::CatalogApi;
pub use cache::{CacheEntry, CacheSettings, EntryState, Payload, QueryCache};
pub use engine::{EngineConfig, EngineHandle};
pub use enrich::{
    distinct_names, EnrichmentAggregator, EnrichmentSnapshot, DEFAULT_ENRICH_CONCURRENCY,
};
pub use gateway::{
    classify_status, Gateway, GatewayError, GatewaySettings, ReqwestGateway, DEFAULT_API_BASE,
};
pub use paginator::Paginator;
pub use source::{
    source_for, CategoryRoster, FullRoster, ListSource, RosterSettings, FULL_ROSTER_CEILING,
};
pub use types::{
    AbilitySlot, Artwork, CategoryMember, CategoryResponse, CreatureRecord, EngineEvent,
    FetchError, FlavorText, ListResponse, LocalizedText, NamedResource, OtherSprites, PageWindow,
    QueryKey, ResourceKind, SpeciesRecord, Sprites, StatEntry, TypeSlot,
};
