use std::ops::BitOr;

use smallvec::SmallVec;

use crate::{HpoTermId, DEFAULT_NUM_ALL_PARENTS};

/// A set of [`HpoTermId`] representing a group of HPO terms
///
/// Each term can occur only once in the group and the ids are
/// kept in ascending order.
///
/// This group is used e.g. for the parents of a term, the ancestor
/// closure of a term or the phenotypes of a patient.
///
/// # Examples
///
/// ```
/// use phenorank::HpoGroup;
///
/// let mut group = HpoGroup::new();
/// assert!(group.insert(12u32));
/// assert!(group.insert(1u32));
/// assert!(!group.insert(12u32));
///
/// assert_eq!(group.len(), 2);
/// assert_eq!(group.iter().next(), Some(1u32.into()));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct HpoGroup {
    ids: SmallVec<[HpoTermId; DEFAULT_NUM_ALL_PARENTS]>,
}

impl HpoGroup {
    /// Constructs a new, empty [`HpoGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`HpoGroup`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: SmallVec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no [`HpoTermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`HpoTermId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`HpoTermId`] to the group
    ///
    /// Returns whether the `HpoTermId` was newly inserted. That is:
    ///
    /// - If the group did not previously contain this `HpoTermId`, true is returned.
    /// - If the group already contained this `HpoTermId`, false is returned.
    ///
    pub fn insert<I: Into<HpoTermId>>(&mut self, id: I) -> bool {
        let id = id.into();
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Returns `true` if the group contains the [`HpoTermId`]
    pub fn contains(&self, id: &HpoTermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`HpoTermId`]s inside the group
    pub fn iter(&self) -> HpoTermIds<'_> {
        HpoTermIds::new(self.ids.iter())
    }

    /// Returns the ids as a sorted slice
    pub fn as_slice(&self) -> &[HpoTermId] {
        &self.ids
    }
}

impl From<Vec<HpoTermId>> for HpoGroup {
    fn from(mut v: Vec<HpoTermId>) -> Self {
        v.sort_unstable();
        v.dedup();
        Self {
            ids: SmallVec::from_vec(v),
        }
    }
}

impl FromIterator<HpoTermId> for HpoGroup {
    fn from_iter<T: IntoIterator<Item = HpoTermId>>(iter: T) -> Self {
        let ids: Vec<HpoTermId> = iter.into_iter().collect();
        ids.into()
    }
}

impl Extend<HpoTermId> for HpoGroup {
    fn extend<T: IntoIterator<Item = HpoTermId>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a HpoGroup {
    type Item = HpoTermId;

    type IntoIter = HpoTermIds<'a>;

    fn into_iter(self) -> HpoTermIds<'a> {
        HpoTermIds::new(self.ids.iter())
    }
}

/// An iterator over [`HpoTermId`]s
pub struct HpoTermIds<'a> {
    inner: std::slice::Iter<'a, HpoTermId>,
}

impl<'a> HpoTermIds<'a> {
    fn new(inner: std::slice::Iter<'a, HpoTermId>) -> Self {
        Self { inner }
    }
}

impl<'a> Iterator for HpoTermIds<'a> {
    type Item = HpoTermId;
    fn next(&mut self) -> Option<HpoTermId> {
        self.inner.next().copied()
    }
}

impl BitOr for &HpoGroup {
    type Output = HpoGroup;

    fn bitor(self, rhs: &HpoGroup) -> HpoGroup {
        let mut ids = SmallVec::with_capacity(self.len() + rhs.len());
        let mut left = self.ids.iter().peekable();
        let mut right = rhs.ids.iter().peekable();

        // both sides are sorted, a single merge pass keeps the order
        loop {
            let next = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) if l < r => left.next(),
                (Some(l), Some(r)) if l > r => right.next(),
                (Some(_), Some(_)) => {
                    right.next();
                    left.next()
                }
                (Some(_), None) => left.next(),
                (None, Some(_)) => right.next(),
                (None, None) => break,
            };
            if let Some(id) = next {
                ids.push(*id);
            }
        }
        HpoGroup { ids }
    }
}
