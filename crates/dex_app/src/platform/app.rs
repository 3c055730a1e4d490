use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use dex_core::l10n::{is_known_category, type_label, CATEGORIES};
use dex_core::{normalize_category, update, AppState, AppViewModel, DetailState, Effect, Msg};
use dex_logging::{dex_info, dex_warn};

use super::config::{load_config, AppConfig};
use super::effects::EffectRunner;
use super::logging;
use super::render::{render, WINDOW_ROWS};

const TICK_INTERVAL: Duration = Duration::from_millis(75);

const HELP: &str = "\
commands:
  more              load the next page
  search <text>     filter by canonical or localized name
  clear             clear the search
  type [name]       show one type (no name shows everything)
  types             list the available types
  open <name|#>     show a creature
  back              return to the list
  scroll <n>        move the list window to row n
  reset             clear every list control
  quit";

/// Everything the main loop reacts to.
pub(crate) enum Input {
    Line(String),
    Core(Msg),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Send(Msg),
    Open(String),
    Scroll(u64),
    Help,
    Types,
    Quit,
}

pub fn run_app() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("resolving the working directory")?;
    let (config, config_problem) = match load_config(&cwd) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    logging::initialize(config.log_destination, config.log_level());
    if let Some(err) = config_problem {
        dex_warn!("Using default settings: {:#}", err);
    }
    dex_info!(
        "Starting dex (api={}, locale={}, page_size={})",
        config.api_base,
        config.locale,
        config.page_size
    );

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(config.engine_config(), input_tx.clone())
        .context("starting the catalog engine")?;
    spawn_stdin_reader(input_tx.clone());

    // Background tick to throttle rendering.
    thread::spawn(move || {
        while input_tx.send(Input::Core(Msg::Tick)).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    println!("{HELP}");
    let mut app = App::new(runner, config.locale);
    for input in input_rx {
        match input {
            Input::Core(Msg::Tick) => app.on_tick(),
            Input::Core(msg) => app.dispatch(msg),
            Input::Line(line) => {
                if !app.handle_line(&line) {
                    break;
                }
            }
            Input::Closed => break,
        }
    }
    dex_info!("Exiting");
    Ok(())
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if input_tx.send(Input::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    dex_warn!("Failed to read stdin: {}", err);
                    break;
                }
            }
        }
        let _ = input_tx.send(Input::Closed);
    });
}

struct App {
    state: AppState,
    runner: EffectRunner,
    locale: String,
    window_start: u64,
    gate: RenderGate,
}

impl App {
    fn new(runner: EffectRunner, locale: String) -> Self {
        Self {
            state: AppState::new(),
            runner,
            locale,
            window_start: 0,
            gate: RenderGate::default(),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in self.runner.enqueue(effects) {
            if let Effect::RestoreScroll { offset } = effect {
                self.window_start = offset;
            }
        }
        if self.state.consume_dirty() {
            self.gate.mark_pending();
        }
    }

    fn on_tick(&mut self) {
        self.dispatch(Msg::Tick);
        let view = self.state.view();
        if self.gate.should_draw(&view) {
            self.draw(&view);
        }
    }

    fn flush(&mut self) {
        let view = self.state.view();
        self.gate.drawn(&view);
        self.draw(&view);
    }

    fn draw(&self, view: &AppViewModel) {
        print!("{}", render(view, self.window_start, &self.locale));
    }

    /// Returns false once the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        let command = match parse_command(line, &self.locale) {
            Ok(Some(command)) => command,
            Ok(None) => return true,
            Err(message) => {
                println!("{message}");
                return true;
            }
        };

        match command {
            Command::Quit => return false,
            Command::Help => println!("{HELP}"),
            Command::Types => println!("{}", types_listing(&self.locale)),
            Command::Send(msg) => {
                let resets_window = matches!(
                    msg,
                    Msg::SearchChanged(_) | Msg::CategorySelected(_) | Msg::Reset
                );
                if resets_window {
                    self.window_start = 0;
                }
                self.dispatch(msg);
            }
            Command::Open(target) => match self.resolve_creature(&target) {
                Some(name) => self.dispatch(Msg::CreatureOpened {
                    name,
                    scroll_offset: self.window_start,
                }),
                None => println!("no creature {target:?} in the list"),
            },
            Command::Scroll(offset) => {
                self.window_start = offset;
                self.dispatch(Msg::ScrollChanged(offset));
                self.load_more_if_near_end();
            }
        }
        self.flush();
        true
    }

    /// Proximity trigger: a window reaching the last loaded rows asks for the next page.
    fn load_more_if_near_end(&mut self) {
        let view = self.state.view();
        let window_end = self.window_start.saturating_add(WINDOW_ROWS as u64);
        if view.list.has_more && window_end >= view.list.items.len() as u64 {
            self.dispatch(Msg::LoadMoreRequested);
        }
    }

    /// Accepts a 1-based row number, a localized name, or a canonical name.
    fn resolve_creature(&self, target: &str) -> Option<String> {
        let items = self.state.view().list.items;
        if let Ok(row) = target.parse::<usize>() {
            return row
                .checked_sub(1)
                .and_then(|index| items.get(index))
                .map(|item| item.name.clone());
        }
        let wanted = target.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        items
            .iter()
            .find(|item| {
                item.name == wanted
                    || item
                        .localized_name
                        .as_deref()
                        .is_some_and(|localized| localized.to_lowercase() == wanted)
            })
            .map(|item| item.name.clone())
            .or(Some(wanted))
    }
}

/// Decides when a tick redraws the screen.
///
/// A page is drawn as soon as it lands, with canonical names standing in for
/// lookups still in flight. While those lookups trickle in the screen is held,
/// then drawn once more when the last one settles.
struct RenderGate {
    pending: bool,
    /// Row count of the last frame drawn while names were still resolving.
    drawn_while_enriching: Option<usize>,
}

impl Default for RenderGate {
    fn default() -> Self {
        Self {
            pending: true,
            drawn_while_enriching: None,
        }
    }
}

impl RenderGate {
    fn mark_pending(&mut self) {
        self.pending = true;
    }

    fn should_draw(&mut self, view: &AppViewModel) -> bool {
        if !self.pending || !is_settled(view) {
            return false;
        }
        let rows = view.list.items.len();
        if view.detail.is_none()
            && view.list.is_enriching
            && self.drawn_while_enriching == Some(rows)
        {
            return false;
        }
        self.drawn(view);
        true
    }

    fn drawn(&mut self, view: &AppViewModel) {
        self.pending = false;
        let enriching = view.detail.is_none() && view.list.is_enriching;
        self.drawn_while_enriching = enriching.then_some(view.list.items.len());
    }
}

/// Pending name lookups never hold the screen back; page and detail loads do.
fn is_settled(view: &AppViewModel) -> bool {
    match view.detail {
        Some(DetailState::Loading { .. }) => false,
        Some(_) => true,
        None => !view.list.is_loading && !view.list.is_fetching_more,
    }
}

fn parse_command(line: &str, locale: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "more" => Command::Send(Msg::LoadMoreRequested),
        "search" => Command::Send(Msg::SearchChanged(rest.to_string())),
        "clear" => Command::Send(Msg::SearchChanged(String::new())),
        "type" => match resolve_category(rest, locale) {
            Some(category) => Command::Send(Msg::CategorySelected(category)),
            None => return Err(format!("unknown type {rest:?}; try `types`")),
        },
        "types" => Command::Types,
        "open" if !rest.is_empty() => Command::Open(rest.to_string()),
        "open" => return Err("usage: open <name|#>".to_string()),
        "back" => Command::Send(Msg::BackToList),
        "scroll" => match rest.parse::<u64>() {
            Ok(offset) => Command::Scroll(offset),
            Err(_) => return Err("usage: scroll <row>".to_string()),
        },
        "reset" => Command::Send(Msg::Reset),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command {other:?}; try `help`")),
    };
    Ok(Some(command))
}

/// Maps a type name or its localized label to a category id. Blank selects everything.
fn resolve_category(input: &str, locale: &str) -> Option<String> {
    let normalized = normalize_category(input);
    if normalized.is_empty() || is_known_category(&normalized) {
        return Some(normalized);
    }
    CATEGORIES
        .iter()
        .find(|category| type_label(locale, category) == input.trim())
        .map(|category| category.to_string())
}

fn types_listing(locale: &str) -> String {
    CATEGORIES
        .iter()
        .map(|category| {
            let label = type_label(locale, category);
            if label == *category {
                category.to_string()
            } else {
                format!("{category} ({label})")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
