use crate::{Cursor, Generation, RosterKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPage {
        generation: Generation,
        roster: RosterKey,
        cursor: Cursor,
    },
    ResolveLocalizedNames {
        generation: Generation,
        names: Vec<String>,
    },
    /// Outstanding work for this generation is no longer wanted.
    AbandonGeneration { generation: Generation },
    FetchDetail { name: String },
    RestoreScroll { offset: u64 },
}
