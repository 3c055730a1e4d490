use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use dex_core::{Cursor, Generation, RosterKey};
use dex_logging::{dex_debug, dex_error, dex_info};
use tokio_util::sync::CancellationToken;

use crate::{
    source_for, CacheSettings, CatalogApi, EngineEvent, EnrichmentAggregator, Gateway,
    GatewayError, GatewaySettings, ListSource, QueryCache, ReqwestGateway, RosterSettings,
    DEFAULT_ENRICH_CONCURRENCY,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub gateway: GatewaySettings,
    pub cache: CacheSettings,
    pub roster: RosterSettings,
    pub enrich_concurrency: usize,
    pub locale: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gateway: GatewaySettings::default(),
            cache: CacheSettings::default(),
            roster: RosterSettings::default(),
            enrich_concurrency: DEFAULT_ENRICH_CONCURRENCY,
            locale: dex_core::l10n::DEFAULT_LOCALE.to_string(),
        }
    }
}

enum EngineCommand {
    FetchPage {
        generation: Generation,
        roster: RosterKey,
        cursor: Cursor,
    },
    ResolveNames {
        generation: Generation,
        names: Vec<String>,
    },
    FetchDetail {
        name: String,
    },
    Abandon {
        generation: Generation,
    },
}

/// Runs catalog IO on a background tokio runtime.
///
/// Commands are queued without blocking; results come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, GatewayError> {
        let gateway = ReqwestGateway::new(config.gateway.clone())?;
        Ok(Self::with_gateway(config, Arc::new(gateway)))
    }

    pub fn with_gateway(config: EngineConfig, gateway: Arc<dyn Gateway>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    dex_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let cache = QueryCache::new(gateway, config.cache.clone());
            let api = CatalogApi::new(cache, config.locale.clone());
            let mut dispatcher = Dispatcher::new(api, &config, event_tx);
            dex_info!("Engine started (locale={})", config.locale);

            while let Ok(command) = cmd_rx.recv() {
                dispatcher.dispatch(&runtime, command);
            }
            dex_debug!("Engine command channel closed");
        });

        Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
        }
    }

    pub fn fetch_page(&self, generation: Generation, roster: RosterKey, cursor: Cursor) {
        self.send(EngineCommand::FetchPage {
            generation,
            roster,
            cursor,
        });
    }

    pub fn resolve_names(&self, generation: Generation, names: Vec<String>) {
        self.send(EngineCommand::ResolveNames { generation, names });
    }

    pub fn fetch_detail(&self, name: impl Into<String>) {
        self.send(EngineCommand::FetchDetail { name: name.into() });
    }

    /// Cancels outstanding page and name work for `generation` and everything older.
    pub fn abandon(&self, generation: Generation) {
        self.send(EngineCommand::Abandon { generation });
    }

    /// Blocks until the next event. Returns `None` once the engine thread has stopped.
    ///
    /// Holds the event receiver while waiting, so use it from a single reader thread.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv()
            .ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv_timeout(timeout)
            .ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            dex_error!("Engine is not running; command dropped");
        }
    }
}

struct Dispatcher {
    api: CatalogApi,
    roster_settings: RosterSettings,
    aggregator: EnrichmentAggregator,
    sources: HashMap<RosterKey, Arc<dyn ListSource>>,
    tokens: HashMap<Generation, CancellationToken>,
    abandoned_through: Generation,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl Dispatcher {
    fn new(api: CatalogApi, config: &EngineConfig, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            aggregator: EnrichmentAggregator::new(api.clone(), config.enrich_concurrency),
            api,
            roster_settings: config.roster.clone(),
            sources: HashMap::new(),
            tokens: HashMap::new(),
            abandoned_through: 0,
            event_tx,
        }
    }

    fn dispatch(&mut self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        match command {
            EngineCommand::FetchPage {
                generation,
                roster,
                cursor,
            } => {
                let Some(token) = self.token_for(generation) else {
                    dex_debug!("Skipping page request for abandoned generation {}", generation);
                    return;
                };
                let source = self.source(&roster);
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {
                            dex_debug!("Page request {} {:?} abandoned", roster, cursor);
                        }
                        result = source.fetch_page(cursor) => {
                            let _ = event_tx.send(EngineEvent::PageFetched {
                                generation,
                                roster,
                                cursor,
                                result,
                            });
                        }
                    }
                });
            }
            EngineCommand::ResolveNames { generation, names } => {
                let Some(token) = self.token_for(generation) else {
                    return;
                };
                let aggregator = self.aggregator.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let resolve = aggregator.resolve_each(names, |name, localized| {
                        let _ = event_tx.send(EngineEvent::NameResolved {
                            generation,
                            name,
                            localized,
                        });
                    });
                    tokio::select! {
                        _ = token.cancelled() => {
                            dex_debug!("Name lookups for generation {} abandoned", generation);
                        }
                        _ = resolve => {}
                    }
                });
            }
            EngineCommand::FetchDetail { name } => {
                let api = self.api.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let result = api.creature_detail(&name).await;
                    let _ = event_tx.send(EngineEvent::DetailFetched { name, result });
                });
            }
            EngineCommand::Abandon { generation } => {
                self.abandoned_through = self.abandoned_through.max(generation);
                self.tokens.retain(|&active, token| {
                    let keep = active > generation;
                    if !keep {
                        token.cancel();
                    }
                    keep
                });
            }
        }
    }

    fn token_for(&mut self, generation: Generation) -> Option<CancellationToken> {
        if generation <= self.abandoned_through {
            return None;
        }
        Some(self.tokens.entry(generation).or_default().clone())
    }

    /// Sources are kept per roster so a category's membership is fetched once.
    fn source(&mut self, roster: &RosterKey) -> Arc<dyn ListSource> {
        let api = &self.api;
        let settings = &self.roster_settings;
        Arc::clone(
            self.sources
                .entry(roster.clone())
                .or_insert_with(|| source_for(api, roster, settings)),
        )
    }
}
