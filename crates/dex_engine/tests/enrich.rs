mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{api_over, init_logging, FakeGateway};
use dex_core::{EnrichedListItem, ListItem};
use dex_engine::{distinct_names, CacheSettings, EnrichmentAggregator, QueryKey};
use pretty_assertions::assert_eq;
use serde_json::json;

fn item(name: &str) -> ListItem {
    ListItem::new(name, format!("https://pokeapi.co/api/v2/pokemon/{name}/"))
}

fn localized(items: &[EnrichedListItem]) -> Vec<(&str, Option<&str>)> {
    items
        .iter()
        .map(|item| (item.name.as_str(), item.localized_name.as_deref()))
        .collect()
}

#[tokio::test]
async fn enrichment_keeps_order_and_cardinality() {
    init_logging();
    let gateway = Arc::new(
        FakeGateway::new()
            .with_species("bulbasaur", Some("이상해씨"))
            .with_species("charmander", Some("파이리"))
            .with_species("squirtle", Some("꼬부기")),
    );
    let aggregator = EnrichmentAggregator::new(api_over(&gateway, CacheSettings::default()), 2);
    let items = vec![item("squirtle"), item("bulbasaur"), item("charmander")];

    let enriched = aggregator.enrich(&items).await;

    assert_eq!(
        localized(&enriched),
        vec![
            ("squirtle", Some("꼬부기")),
            ("bulbasaur", Some("이상해씨")),
            ("charmander", Some("파이리")),
        ]
    );
}

#[tokio::test]
async fn failed_lookups_fall_back_to_the_canonical_name() {
    init_logging();
    let gateway = Arc::new(FakeGateway::new().with_species("pikachu", Some("피카츄")));
    gateway.set_species("glitch", json!({"unexpected": true}));
    let aggregator = EnrichmentAggregator::new(api_over(&gateway, CacheSettings::default()), 4);
    let items = vec![item("pikachu"), item("missingno"), item("glitch")];

    let enriched = aggregator.enrich(&items).await;

    assert_eq!(
        localized(&enriched),
        vec![("pikachu", Some("피카츄")), ("missingno", None), ("glitch", None)]
    );
    assert_eq!(enriched[1].display_name(), "missingno");
}

#[tokio::test]
async fn repeated_names_are_looked_up_once() {
    init_logging();
    let gateway = Arc::new(FakeGateway::new().with_species("eevee", Some("이브이")));
    let aggregator = EnrichmentAggregator::new(api_over(&gateway, CacheSettings::default()), 4);
    let items = vec![item("eevee"), item("eevee"), item("eevee")];

    let enriched = aggregator.enrich(&items).await;
    aggregator.enrich(&items).await;

    assert_eq!(enriched.len(), 3);
    assert!(enriched
        .iter()
        .all(|entry| entry.localized_name.as_deref() == Some("이브이")));
    assert_eq!(gateway.call_count(&QueryKey::species("eevee")), 1);
}

#[tokio::test]
async fn lookups_respect_the_concurrency_bound() {
    init_logging();
    let names: Vec<String> = (1..=6).map(|i| format!("creature-{i}")).collect();
    let mut gateway = FakeGateway::new().with_delay(Duration::from_millis(20));
    for name in &names {
        gateway = gateway.with_species(name, None);
    }
    let gateway = Arc::new(gateway);
    let aggregator = EnrichmentAggregator::new(api_over(&gateway, CacheSettings::default()), 2);
    let items: Vec<ListItem> = names.iter().map(|name| item(name)).collect();

    let enriched = aggregator.enrich(&items).await;

    assert_eq!(enriched.len(), 6);
    assert_eq!(gateway.max_in_flight(), 2);
}

#[tokio::test]
async fn resolve_each_reports_every_name() {
    init_logging();
    let gateway = Arc::new(
        FakeGateway::new()
            .with_species("abra", Some("캐이시"))
            .with_species("kadabra", None),
    );
    let aggregator = EnrichmentAggregator::new(api_over(&gateway, CacheSettings::default()), 3);

    let mut reported = Vec::new();
    aggregator
        .resolve_each(
            vec!["abra".to_string(), "kadabra".to_string(), "alakazam".to_string()],
            |name, localized| reported.push((name, localized)),
        )
        .await;
    reported.sort();

    assert_eq!(
        reported,
        vec![
            ("abra".to_string(), Some("캐이시".to_string())),
            ("alakazam".to_string(), None),
            ("kadabra".to_string(), None),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn snapshot_reports_loading_until_every_lookup_settles() {
    init_logging();
    let gateway = Arc::new(
        FakeGateway::new()
            .with_species("jigglypuff", Some("푸린"))
            .with_delay(Duration::from_millis(100)),
    );
    let aggregator = EnrichmentAggregator::new(api_over(&gateway, CacheSettings::default()), 4);
    let items = vec![item("jigglypuff")];

    let before = aggregator.snapshot(&items);
    assert!(!before.is_loading);
    assert_eq!(before.items[0].localized_name, None);

    let running = tokio::spawn({
        let aggregator = aggregator.clone();
        let items = items.clone();
        async move { aggregator.enrich(&items).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    let during = aggregator.snapshot(&items);
    assert!(during.is_loading);
    assert_eq!(during.items.len(), 1);

    running.await.expect("enrichment task");
    let after = aggregator.snapshot(&items);
    assert!(!after.is_loading);
    assert_eq!(after.items[0].display_name(), "푸린");
}

#[test]
fn distinct_names_keep_first_seen_order() {
    let items = vec![item("b"), item("a"), item("b"), item("c"), item("a")];

    assert_eq!(distinct_names(&items), vec!["b", "a", "c"]);
}
