use crate::FailureKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatValue {
    pub name: String,
    pub base: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityView {
    pub name: String,
    pub hidden: bool,
}

/// Everything the detail view shows for one creature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreatureDetail {
    pub id: u32,
    pub name: String,
    pub localized_name: Option<String>,
    pub types: Vec<String>,
    /// Decimetres, as reported upstream.
    pub height: u32,
    /// Hectograms, as reported upstream.
    pub weight: u32,
    pub base_experience: Option<u32>,
    pub stats: Vec<StatValue>,
    pub abilities: Vec<AbilityView>,
    pub artwork_url: Option<String>,
    pub description: Option<String>,
    pub generation: Option<String>,
    pub evolves_from: Option<String>,
}

impl CreatureDetail {
    pub fn display_name(&self) -> &str {
        self.localized_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading { name: String },
    Loaded(Box<CreatureDetail>),
    Unavailable { name: String, kind: FailureKind },
}

impl DetailState {
    pub fn name(&self) -> &str {
        match self {
            DetailState::Loading { name } | DetailState::Unavailable { name, .. } => name,
            DetailState::Loaded(detail) => &detail.name,
        }
    }
}
