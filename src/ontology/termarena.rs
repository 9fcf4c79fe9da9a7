use std::collections::hash_map::{Entry, Values};
use std::collections::HashMap;

use crate::term::internal::HpoTermInternal;
use crate::{HpoTermId, DEFAULT_NUM_TERMS};

pub(crate) struct Arena {
    terms: HashMap<HpoTermId, HpoTermInternal>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Inserts the term, unless a term with the same id is already present
    ///
    /// Returns the rejected term in case of a duplicate
    pub fn insert(&mut self, term: HpoTermInternal) -> Result<(), HpoTermInternal> {
        match self.terms.entry(*term.id()) {
            Entry::Occupied(_) => Err(term),
            Entry::Vacant(entry) => {
                entry.insert(term);
                Ok(())
            }
        }
    }

    pub fn contains(&self, id: &HpoTermId) -> bool {
        self.terms.contains_key(id)
    }

    pub fn get(&self, id: HpoTermId) -> Option<&HpoTermInternal> {
        self.terms.get(&id)
    }

    pub fn get_mut(&mut self, id: HpoTermId) -> Option<&mut HpoTermInternal> {
        self.terms.get_mut(&id)
    }

    pub fn values(&self) -> Values<'_, HpoTermId, HpoTermInternal> {
        self.terms.values()
    }

    pub fn keys(&self) -> Vec<HpoTermId> {
        self.terms.keys().copied().collect()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            terms: HashMap::with_capacity(DEFAULT_NUM_TERMS),
        }
    }
}
