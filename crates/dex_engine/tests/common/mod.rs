#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use dex_core::FailureKind;
use dex_engine::{
    CacheSettings, CatalogApi, FetchError, Gateway, QueryCache, QueryKey, ResourceKind,
};
use serde_json::{json, Value};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(dex_logging::initialize_for_tests);
}

pub fn creature_url(id: u64) -> String {
    format!("https://pokeapi.co/api/v2/pokemon/{id}/")
}

pub fn species_json(name: &str, localized: Option<&str>) -> Value {
    let mut names = vec![json!({"name": name, "language": {"name": "en"}})];
    if let Some(localized) = localized {
        names.push(json!({"name": localized, "language": {"name": "ko"}}));
    }
    json!({
        "id": 1,
        "name": name,
        "names": names,
        "flavor_text_entries": [],
        "generation": {"name": "generation-i"},
        "evolves_from_species": null
    })
}

/// In-memory catalog that records every request it serves.
#[derive(Default)]
pub struct FakeGateway {
    roster_total: u64,
    categories: Mutex<HashMap<String, Vec<String>>>,
    species: Mutex<HashMap<String, Value>>,
    failing: Mutex<HashSet<String>>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full roster of `total` creatures named `creature-1..=total`.
    pub fn with_roster(mut self, total: u64) -> Self {
        self.roster_total = total;
        self
    }

    pub fn with_category(self, name: &str, members: &[&str]) -> Self {
        self.set_category(name, members);
        self
    }

    pub fn with_species(self, name: &str, localized: Option<&str>) -> Self {
        self.set_species(name, species_json(name, localized));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_species(&self, name: &str, payload: Value) {
        self.species
            .lock()
            .unwrap()
            .insert(name.to_string(), payload);
    }

    pub fn set_category(&self, name: &str, members: &[&str]) {
        self.categories.lock().unwrap().insert(
            name.to_string(),
            members.iter().map(|member| member.to_string()).collect(),
        );
    }

    pub fn fail(&self, key: &QueryKey) {
        self.failing.lock().unwrap().insert(key.cache_key());
    }

    pub fn recover(&self, key: &QueryKey) {
        self.failing.lock().unwrap().remove(&key.cache_key());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, key: &QueryKey) -> usize {
        let wanted = key.cache_key();
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == wanted)
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, key: &QueryKey) -> Result<Value, FetchError> {
        if self.failing.lock().unwrap().contains(&key.cache_key()) {
            return Err(FetchError::transient(format!("{key}: 503")));
        }
        match key.kind() {
            ResourceKind::CreatureList => {
                let window = key.window().expect("list keys carry a window");
                let end = (window.offset + window.limit).min(self.roster_total);
                let results: Vec<Value> = (window.offset..end)
                    .map(|i| json!({"name": format!("creature-{}", i + 1), "url": creature_url(i + 1)}))
                    .collect();
                Ok(json!({"count": self.roster_total, "next": null, "previous": null, "results": results}))
            }
            ResourceKind::Category => {
                let members = self
                    .categories
                    .lock()
                    .unwrap()
                    .get(key.id())
                    .cloned()
                    .ok_or_else(|| FetchError::not_found(format!("{key}: 404")))?;
                let pokemon: Vec<Value> = members
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        json!({"pokemon": {"name": name, "url": creature_url(i as u64 + 1)}, "slot": 1})
                    })
                    .collect();
                Ok(json!({"id": 10, "name": key.id(), "pokemon": pokemon}))
            }
            ResourceKind::Species => self
                .species
                .lock()
                .unwrap()
                .get(key.id())
                .cloned()
                .ok_or_else(|| FetchError::not_found(format!("{key}: 404"))),
            ResourceKind::Creature => Err(FetchError::new(
                FailureKind::NotFound,
                format!("{key}: 404"),
            )),
        }
    }
}

#[async_trait::async_trait]
impl Gateway for FakeGateway {
    async fn get(&self, key: &QueryKey) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(key.cache_key());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.respond(key)
    }
}

pub fn api_over(gateway: &Arc<FakeGateway>, settings: CacheSettings) -> CatalogApi {
    let cache = QueryCache::new(gateway.clone(), settings);
    CatalogApi::new(cache, "ko")
}
