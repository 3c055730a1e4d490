//! Dex core: pure list-pipeline state machine and view-model helpers.
mod detail;
mod effect;
mod filter;
pub mod l10n;
mod msg;
mod names;
mod roster;
mod selection;
mod state;
mod types;
mod update;
mod view_model;

pub use detail::{AbilityView, CreatureDetail, DetailState, StatValue};
pub use effect::Effect;
pub use filter::filter_items;
pub use msg::Msg;
pub use names::LocalizedNames;
pub use roster::{RosterPhase, RosterState};
pub use selection::SelectionState;
pub use state::AppState;
pub use types::{
    normalize_category, Cursor, EnrichedListItem, FailureKind, Generation, ListItem, Page,
    RosterKey,
};
pub use update::update;
pub use view_model::{AppViewModel, EmptyReason, ListView};
