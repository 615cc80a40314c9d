//! Local vocabulary: ids for literals outside the persistent vocabulary.
//!
//! Operators that synthesize literals (or receive them from inputs that do)
//! carry the id-to-string mapping alongside their result table. Downstream
//! operators propagate the vocabulary; combining operators share the union
//! of their inputs' vocabularies when more than one is non-empty.

use crate::id::Id;
use hashbrown::HashMap;
use std::sync::Arc;

/// Side-channel mapping of non-indexed literal ids to their text.
#[derive(Debug, Clone, Default)]
pub struct LocalVocab {
    entries: HashMap<Id, Arc<str>>,
}

impl LocalVocab {
    /// A new, empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the text for an id. Re-inserting an id replaces its text.
    pub fn insert(&mut self, id: Id, text: impl Into<Arc<str>>) {
        self.entries.insert(id, text.into());
    }

    /// Look up the text for an id.
    pub fn get(&self, id: Id) -> Option<&str> {
        self.entries.get(&id).map(|s| s.as_ref())
    }

    /// Number of registered ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no ids are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Share the vocabulary of two inputs.
    ///
    /// If at most one input is non-empty its vocabulary is shared as-is
    /// (no copy); when both are non-empty the union is materialized. On
    /// conflicting ids the entry of `a` wins; inputs of one query never
    /// disagree on an id in practice.
    pub fn shared_from_non_empty_of(a: &Arc<LocalVocab>, b: &Arc<LocalVocab>) -> Arc<LocalVocab> {
        match (a.is_empty(), b.is_empty()) {
            (true, _) => Arc::clone(b),
            (_, true) => Arc::clone(a),
            (false, false) => {
                let mut merged = LocalVocab {
                    entries: b.entries.clone(),
                };
                for (id, text) in &a.entries {
                    merged.entries.insert(*id, Arc::clone(text));
                }
                Arc::new(merged)
            }
        }
    }
}
