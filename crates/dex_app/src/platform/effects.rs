use std::sync::{mpsc, Arc};
use std::thread;

use dex_core::{Effect, Msg};
use dex_engine::{EngineConfig, EngineEvent, EngineHandle};
use dex_logging::{dex_debug, dex_warn};

use super::app::Input;

/// Forwards core effects to the engine and engine events back as messages.
pub struct EffectRunner {
    engine: Arc<EngineHandle>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, input_tx: mpsc::Sender<Input>) -> anyhow::Result<Self> {
        let engine = Arc::new(EngineHandle::new(config)?);
        let runner = Self { engine };
        runner.spawn_event_loop(input_tx);
        Ok(runner)
    }

    /// Runs engine-bound effects. View effects are handed back to the caller.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut view_effects = Vec::new();
        for effect in effects {
            match effect {
                Effect::FetchPage {
                    generation,
                    roster,
                    cursor,
                } => {
                    dex_debug!("FetchPage generation={} roster={} cursor={:?}", generation, roster, cursor);
                    self.engine.fetch_page(generation, roster, cursor);
                }
                Effect::ResolveLocalizedNames { generation, names } => {
                    dex_debug!("ResolveLocalizedNames generation={} count={}", generation, names.len());
                    self.engine.resolve_names(generation, names);
                }
                Effect::AbandonGeneration { generation } => {
                    self.engine.abandon(generation);
                }
                Effect::FetchDetail { name } => {
                    self.engine.fetch_detail(name);
                }
                effect @ Effect::RestoreScroll { .. } => view_effects.push(effect),
            }
        }
        view_effects
    }

    fn spawn_event_loop(&self, input_tx: mpsc::Sender<Input>) {
        let engine = Arc::clone(&self.engine);
        thread::spawn(move || {
            while let Some(event) = engine.recv() {
                if input_tx.send(Input::Core(to_msg(event))).is_err() {
                    break;
                }
            }
            dex_debug!("Engine event loop stopped");
        });
    }
}

pub(crate) fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PageFetched {
            generation,
            roster,
            cursor,
            result,
        } => Msg::PageLoaded {
            generation,
            result: result.map_err(|err| {
                dex_warn!("Page {} {:?} failed: {}", roster, cursor, err);
                err.kind
            }),
        },
        EngineEvent::NameResolved {
            generation,
            name,
            localized,
        } => Msg::LocalizedNameResolved {
            generation,
            name,
            localized,
        },
        EngineEvent::DetailFetched { name, result } => Msg::DetailLoaded {
            result: result.map_err(|err| {
                dex_warn!("Detail for {} failed: {}", name, err);
                err.kind
            }),
            name,
        },
    }
}
