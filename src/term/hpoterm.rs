use crate::term::internal::HpoTermInternal;
use crate::term::{HpoGroup, HpoTermIds};
use crate::{HpoError, HpoResult, HpoTermId, Ontology, ROOT_ID};

/// The `HpoTerm` represents a single term from the HP Ontology
///
/// It is a read-only view into the [`Ontology`] and gives access
/// to the name, the declared children and the derived parents and
/// ancestors of the term.
#[derive(Debug, Clone, Copy)]
pub struct HpoTerm<'a> {
    term: &'a HpoTermInternal,
    ontology: &'a Ontology,
}

impl<'a> HpoTerm<'a> {
    /// Constructs a new [`HpoTerm`]
    ///
    /// # Errors
    ///
    /// If the given [`HpoTermId`] does not match an existing term
    /// it returns an [`HpoError::DoesNotExist`]
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::{HpoTerm, HpoTermId, Ontology};
    ///
    /// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
    ///
    /// let term = HpoTerm::try_new(&ontology, 118u32);
    /// assert!(term.is_ok());
    ///
    /// let non_existing_term = HpoTerm::try_new(&ontology, 666666666u32);
    /// assert!(non_existing_term.is_err());
    /// ```
    pub fn try_new<I: Into<HpoTermId>>(ontology: &'a Ontology, term: I) -> HpoResult<HpoTerm<'a>> {
        let term_id = term.into();
        let term = ontology
            .get(term_id)
            .ok_or_else(|| HpoError::DoesNotExist(term_id.to_string()))?;
        Ok(HpoTerm { term, ontology })
    }

    pub(crate) fn new(ontology: &'a Ontology, term: &'a HpoTermInternal) -> HpoTerm<'a> {
        HpoTerm { term, ontology }
    }

    /// Returns the [`HpoTermId`] of the term
    ///
    /// e.g.: `HP:0012285`
    pub fn id(&self) -> HpoTermId {
        *self.term.id()
    }

    /// Returns the name of the term
    ///
    /// e.g.: `Abnormal hypothalamus physiology`
    pub fn name(&self) -> &'a str {
        self.term.name()
    }

    /// Returns `true` if the term is the root of the ontology
    pub fn is_root(&self) -> bool {
        self.id() == ROOT_ID
    }

    /// Returns the declared children, in the order of the ontology source
    pub fn children_ids(&self) -> &'a [HpoTermId] {
        self.term.children()
    }

    /// Returns the direct parents of the term
    pub fn parent_ids(&self) -> &'a HpoGroup {
        self.term.parents()
    }

    /// Returns an iterator of the direct parents of the term
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::Ontology;
    ///
    /// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
    /// let term = ontology.hpo(118u32).unwrap();
    /// let parents: Vec<&str> = term.parents().map(|parent| parent.name()).collect();
    /// assert_eq!(parents, vec!["All"]);
    /// ```
    pub fn parents(&self) -> Iter<'a> {
        Iter::new(self.term.parents().iter(), self.ontology)
    }

    /// Returns the ancestor closure: the term itself and all direct
    /// and indirect parents up to the root
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::{HpoTerm, Ontology};
    ///
    /// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
    /// let term = ontology.hpo(12285u32).unwrap();
    ///
    /// let ancestors = term.ancestor_ids();
    /// assert_eq!(ancestors.len(), 7);
    /// assert!(ancestors.contains(&12285u32.into()));
    /// assert!(ancestors.contains(&1u32.into()));
    /// ```
    pub fn ancestor_ids(&self) -> &'a HpoGroup {
        self.ontology.ancestors_of(self.term)
    }

    /// Returns an iterator of the terms of the ancestor closure
    pub fn ancestors(&self) -> Iter<'a> {
        Iter::new(self.ancestor_ids().iter(), self.ontology)
    }
}

impl PartialEq for HpoTerm<'_> {
    fn eq(&self, other: &HpoTerm) -> bool {
        self.term.id() == other.term.id()
    }
}

impl Eq for HpoTerm<'_> {}

/// An iterator of [`HpoTerm`]s
pub struct Iter<'a> {
    ids: HpoTermIds<'a>,
    ontology: &'a Ontology,
}

impl<'a> Iter<'a> {
    fn new(ids: HpoTermIds<'a>, ontology: &'a Ontology) -> Self {
        Self { ids, ontology }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = HpoTerm<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        let ontology = self.ontology;
        // all ids are validated during the Ontology construction
        self.ids
            .by_ref()
            .find_map(|id| ontology.get(id))
            .map(|term| HpoTerm::new(ontology, term))
    }
}

impl std::fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Iter<HpoTerm>")
    }
}
