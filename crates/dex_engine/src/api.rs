use dex_core::{AbilityView, CreatureDetail, StatValue};
use dex_logging::dex_warn;
use serde::de::DeserializeOwned;

use crate::{
    CategoryResponse, CreatureRecord, FetchError, ListResponse, Payload, QueryCache, QueryKey,
    SpeciesRecord,
};

/// Typed reads of the catalog through the query cache.
#[derive(Clone)]
pub struct CatalogApi {
    cache: QueryCache,
    locale: String,
}

impl CatalogApi {
    pub fn new(cache: QueryCache, locale: impl Into<String>) -> Self {
        Self {
            cache,
            locale: locale.into(),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub async fn list_page(&self, offset: u64, limit: u64) -> Result<ListResponse, FetchError> {
        self.fetch(&QueryKey::creature_list(offset, limit)).await
    }

    pub async fn category(&self, name: &str) -> Result<CategoryResponse, FetchError> {
        self.fetch(&QueryKey::category(name)).await
    }

    pub async fn creature(&self, name: &str) -> Result<CreatureRecord, FetchError> {
        self.fetch(&QueryKey::creature(name)).await
    }

    pub async fn species(&self, name: &str) -> Result<SpeciesRecord, FetchError> {
        self.fetch(&QueryKey::species(name)).await
    }

    /// Localized species name for the configured locale. `Ok(None)` if the species has none.
    pub async fn localized_name(&self, name: &str) -> Result<Option<String>, FetchError> {
        let species = self.species(name).await?;
        Ok(species.localized_name(&self.locale))
    }

    /// Localized name from cache only.
    ///
    /// `None` means not cached yet; `Some(None)` means cached without a usable name.
    pub fn cached_localized_name(&self, name: &str) -> Option<Option<String>> {
        let key = QueryKey::species(name);
        let payload = self.cache.peek(&key)?;
        Some(
            decode::<SpeciesRecord>(&key, &payload)
                .ok()
                .and_then(|species| species.localized_name(&self.locale)),
        )
    }

    /// Creature record plus species data. A species failure only drops the localized fields.
    pub async fn creature_detail(&self, name: &str) -> Result<CreatureDetail, FetchError> {
        let (creature, species) = futures_util::join!(self.creature(name), self.species(name));
        let creature = creature?;
        let species = match species {
            Ok(species) => Some(species),
            Err(err) => {
                dex_warn!("Species lookup for {} failed: {}", name, err);
                None
            }
        };
        Ok(self.build_detail(creature, species))
    }

    fn build_detail(&self, creature: CreatureRecord, species: Option<SpeciesRecord>) -> CreatureDetail {
        let locale = self.locale.as_str();
        let artwork_url = creature.sprites.best_image();
        CreatureDetail {
            id: creature.id,
            localized_name: species.as_ref().and_then(|s| s.localized_name(locale)),
            types: creature.types.into_iter().map(|slot| slot.kind.name).collect(),
            height: creature.height,
            weight: creature.weight,
            base_experience: creature.base_experience,
            stats: creature
                .stats
                .into_iter()
                .map(|entry| StatValue {
                    name: entry.stat.name,
                    base: entry.base_stat,
                })
                .collect(),
            abilities: creature
                .abilities
                .into_iter()
                .map(|slot| AbilityView {
                    name: slot.ability.name,
                    hidden: slot.is_hidden,
                })
                .collect(),
            artwork_url,
            description: species
                .as_ref()
                .and_then(|s| s.localized_description(locale)),
            generation: species
                .as_ref()
                .and_then(|s| s.generation.as_ref())
                .map(|g| g.name.clone()),
            evolves_from: species
                .as_ref()
                .and_then(|s| s.evolves_from_species.as_ref())
                .map(|s| s.name.clone()),
            name: creature.name,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<T, FetchError> {
        let payload = self.cache.get(key).await?;
        decode(key, &payload)
    }
}

fn decode<T: DeserializeOwned>(key: &QueryKey, payload: &Payload) -> Result<T, FetchError> {
    T::deserialize(&**payload).map_err(|err| {
        dex_warn!("Unexpected payload shape for {}: {}", key, err);
        FetchError::malformed(format!("{key}: {err}"))
    })
}
