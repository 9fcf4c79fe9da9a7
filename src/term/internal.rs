use std::sync::OnceLock;

use smallvec::SmallVec;

use crate::term::HpoGroup;
use crate::{HpoError, HpoResult, HpoTermId, DEFAULT_NUM_PARENTS};

pub(crate) type HpoChildren = SmallVec<[HpoTermId; DEFAULT_NUM_PARENTS]>;

#[derive(Debug)]
pub(crate) struct HpoTermInternal {
    id: HpoTermId,
    name: String,
    children: HpoChildren,
    parents: HpoGroup,
    ancestors: OnceLock<HpoGroup>,
}

impl HpoTermInternal {
    pub fn new(name: String, id: HpoTermId) -> HpoTermInternal {
        HpoTermInternal {
            id,
            name,
            children: HpoChildren::new(),
            parents: HpoGroup::with_capacity(DEFAULT_NUM_PARENTS),
            ancestors: OnceLock::new(),
        }
    }

    /// Builds a term from the raw fields of one ontology row
    pub fn try_new(id: &str, name: &str) -> HpoResult<HpoTermInternal> {
        let id = HpoTermId::try_from(id)?;
        if name.trim().is_empty() {
            return Err(HpoError::InvalidInput(format!("{id} has no name")));
        }
        Ok(HpoTermInternal::new(name.to_string(), id))
    }

    pub fn id(&self) -> &HpoTermId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[HpoTermId] {
        &self.children
    }

    pub fn parents(&self) -> &HpoGroup {
        &self.parents
    }

    /// Returns the memoized ancestor closure, if it was already calculated
    pub fn ancestors_cached(&self) -> Option<&HpoGroup> {
        self.ancestors.get()
    }

    pub fn ancestors_or_init<F: FnOnce() -> HpoGroup>(&self, f: F) -> &HpoGroup {
        self.ancestors.get_or_init(f)
    }

    /// Records a declared child, keeping the authored order
    pub fn add_child(&mut self, child_id: HpoTermId) {
        self.children.push(child_id);
    }

    pub fn add_parent(&mut self, parent_id: HpoTermId) -> bool {
        self.parents.insert(parent_id)
    }
}

impl PartialEq for HpoTermInternal {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HpoTermInternal {}
