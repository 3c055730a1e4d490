use std::collections::HashMap;

use crate::Generation;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Pending(Generation),
    Resolved(Option<String>),
}

/// Localized-name bookkeeping keyed by canonical item name.
///
/// Resolved names outlive roster switches; pending lookups belong to the
/// generation that requested them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalizedNames {
    entries: HashMap<String, Lookup>,
}

impl LocalizedNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks unknown names as pending for `generation` and returns them, deduplicated,
    /// in first-seen order.
    pub fn request<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a str>,
        generation: Generation,
    ) -> Vec<String> {
        let mut requested = Vec::new();
        for name in names {
            if self.entries.contains_key(name) {
                continue;
            }
            self.entries
                .insert(name.to_string(), Lookup::Pending(generation));
            requested.push(name.to_string());
        }
        requested
    }

    /// Records a lookup result. Returns `false` if the result is stale or unexpected.
    pub fn resolve(&mut self, name: &str, generation: Generation, localized: Option<String>) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) if *entry == Lookup::Pending(generation) => {
                *entry = Lookup::Resolved(localized);
                true
            }
            _ => false,
        }
    }

    /// Forgets every pending lookup so the names can be requested again later.
    pub fn abandon_pending(&mut self) {
        self.entries
            .retain(|_, lookup| matches!(lookup, Lookup::Resolved(_)));
    }

    pub fn localized(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(Lookup::Resolved(Some(localized))) => Some(localized),
            _ => None,
        }
    }

    pub fn is_pending(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Lookup::Pending(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_skips_known_and_duplicate_names() {
        let mut names = LocalizedNames::new();
        let first = names.request(["a", "b", "a"], 1);
        assert_eq!(first, vec!["a".to_string(), "b".to_string()]);
        let second = names.request(["b", "c"], 1);
        assert_eq!(second, vec!["c".to_string()]);
    }

    #[test]
    fn resolve_ignores_other_generations() {
        let mut names = LocalizedNames::new();
        names.request(["a"], 2);
        assert!(!names.resolve("a", 1, Some("에이".into())));
        assert!(names.is_pending("a"));
        assert!(names.resolve("a", 2, Some("에이".into())));
        assert_eq!(names.localized("a"), Some("에이"));
    }

    #[test]
    fn abandon_keeps_resolved_names() {
        let mut names = LocalizedNames::new();
        names.request(["a", "b"], 1);
        names.resolve("a", 1, None);
        names.abandon_pending();
        assert!(!names.is_pending("b"));
        assert_eq!(names.request(["a", "b"], 2), vec!["b".to_string()]);
    }
}
