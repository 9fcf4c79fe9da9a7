use core::fmt::Debug;
use std::collections::{HashSet, VecDeque};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::parser;
use crate::term::internal::HpoTermInternal;
use crate::term::{HpoGroup, HpoTerm};
use crate::{HpoError, HpoResult, HpoTermId, DEFAULT_NUM_ALL_PARENTS, ROOT_ID};

mod termarena;
use termarena::Arena;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Ontology` is the phenotype graph of the `phenorank` crate
///
/// The [`Ontology`] holds all [`HpoTerm`]s together with their declared
/// children and the derived parents. It is built once, validated eagerly
/// and then only read.
///
/// # Examples
///
/// ```
/// use phenorank::{Ontology, HpoTermId};
///
/// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
///
/// // get single terms from the ontology
///
/// let absent_term = HpoTermId::try_from("HP:9999999").unwrap();
/// assert!(ontology.hpo(absent_term).is_none());
///
/// let present_term = HpoTermId::try_from("HP:0000001").unwrap();
/// let root_term = ontology.hpo(present_term).unwrap();
/// assert_eq!(root_term.name(), "All");
///
/// // Iterate all HPO terms
/// for term in &ontology {
///     // do something with term
///     println!("{}", term.name());
/// }
/// ```
///
/// # Construction
///
/// The ontology is read from a comma separated table. Every row contains
/// the term id, the term name and all declared child ids of the term:
///
/// ```text
/// HP:0000001,All,HP:0000118,HP:0000005
/// HP:0000005,Mode of inheritance,HP:0034345
/// ...
/// ```
///
/// Use [`Ontology::from_csv`], [`Ontology::from_reader`] or
/// [`Ontology::from_standard`] to load the data.
///
/// The construction fails with [`HpoError::InvalidOntology`] if
///
/// - a term id is listed more than once
/// - a declared child is not itself a term of the table
/// - the root term [`ROOT_ID`] is missing
/// - any other term is not declared as the child of another term
/// - any term can not be reached from the root
///
/// # Example ontology
///
/// For all examples and tests in this documentation, we're using the
/// following small ontology from `tests/example_hpo.csv`:
///
/// ```mermaid
/// graph TD
/// HP:0000001["HP:0000001<br>All"]
/// HP:0000001 --> HP:0000118
/// HP:0000001 --> HP:0000005
/// HP:0000005["HP:0000005<br>Mode of inheritance"]
/// HP:0000005 --> HP:0034345
/// HP:0034345["HP:0034345<br>Mendelian inheritance"]
/// HP:0034345 --> HP:0000006
/// HP:0034345 --> HP:0000007
/// HP:0000118["HP:0000118<br>Phenotypic abnormality"]
/// HP:0000118 --> HP:0000707
/// HP:0000118 --> HP:0000818
/// HP:0000707["HP:0000707<br>Abnormality of the nervous system"]
/// HP:0000707 --> HP:0012638
/// HP:0000707 --> HP:0012639
/// HP:0000818["HP:0000818<br>Abnormality of the endocrine system"]
/// HP:0000818 --> HP:0000864
/// HP:0000864["HP:0000864<br>Abnormality of the hypothalamus-pituitary axis"]
/// HP:0000864 --> HP:0012285
/// HP:0012638["HP:0012638<br>Abnormal nervous system physiology"]
/// HP:0012638 --> HP:0012285
/// HP:0012638 --> HP:0001250
/// HP:0012639["HP:0012639<br>Abnormal nervous system morphology"]
/// HP:0012639 --> HP:0002011
/// HP:0012285["HP:0012285<br>Abnormal hypothalamus physiology"]
/// HP:0001250["HP:0001250<br>Seizure"]
/// HP:0002011["HP:0002011<br>Morphological central nervous system abnormality"]
/// ```
#[derive(Default)]
pub struct Ontology {
    hpo_terms: Arena,
}

impl Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ontology with {} terms", self.hpo_terms.len())
    }
}

/// Public API of the Ontology
impl Ontology {
    /// Initialize the [`Ontology`] from a data folder
    ///
    /// The folder must contain the ontology table
    /// [`ONTOLOGY_FILENAME`](crate::ONTOLOGY_FILENAME).
    ///
    /// # Errors
    ///
    /// - the table is not present: [`HpoError::CannotOpenFile`]
    /// - see [`Ontology::from_reader`]
    pub fn from_standard<P: AsRef<Path>>(folder: P) -> HpoResult<Self> {
        Self::from_csv(folder.as_ref().join(crate::ONTOLOGY_FILENAME))
    }

    /// Build the [`Ontology`] from a comma separated ontology table
    ///
    /// # Errors
    ///
    /// - the file is not present or readable: [`HpoError::CannotOpenFile`]
    /// - see [`Ontology::from_reader`]
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::Ontology;
    ///
    /// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
    /// assert_eq!(ontology.len(), 14);
    /// ```
    pub fn from_csv<P: AsRef<Path>>(filename: P) -> HpoResult<Self> {
        let filename = filename.as_ref();
        let file = File::open(filename)
            .map_err(|_| HpoError::CannotOpenFile(filename.display().to_string()))?;
        debug!("Reading ontology from {}", filename.display());
        Self::from_reader(file)
    }

    /// Build the [`Ontology`] from any reader of the ontology table
    ///
    /// # Errors
    ///
    /// - a row can not be parsed: [`HpoError::InvalidInput`]
    /// - the terms do not form a single DAG below the root:
    ///   [`HpoError::InvalidOntology`]
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::{HpoError, Ontology};
    ///
    /// let table = "HP:0000001,All,HP:0000002\nHP:0000002,Foo\n";
    /// let ontology = Ontology::from_reader(table.as_bytes()).unwrap();
    /// assert_eq!(ontology.len(), 2);
    ///
    /// // HP:0000003 is not connected to any other term
    /// let table = "HP:0000001,All,HP:0000002\nHP:0000002,Foo\nHP:0000003,Bar\n";
    /// let res = Ontology::from_reader(table.as_bytes());
    /// assert!(matches!(res, Err(HpoError::InvalidOntology(_))));
    /// ```
    pub fn from_reader<R: Read>(reader: R) -> HpoResult<Self> {
        let terms = parser::hp_csv::read_hpo_table(reader)?;
        Self::from_terms(terms)
    }

    /// Returns the number of HPO-Terms in the Ontology
    pub fn len(&self) -> usize {
        self.hpo_terms.len()
    }

    /// Returns `true` if the Ontology does not contain any HPO-Terms
    ///
    /// ```
    /// use phenorank::Ontology;
    /// let ontology = Ontology::default();
    /// assert!(ontology.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the ontology contains a term with the given id
    ///
    /// Callers should use this check before requesting the
    /// [`Ontology::ancestor_set`] of untrusted ids
    pub fn contains<I: Into<HpoTermId>>(&self, term_id: I) -> bool {
        self.hpo_terms.contains(&term_id.into())
    }

    /// Returns the [`HpoTerm`] of the provided [`HpoTermId`]
    ///
    /// If no such term is present in the Ontolgy, `None` is returned
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::Ontology;
    /// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
    /// let term = ontology.hpo(1250u32).unwrap();
    /// assert_eq!(term.name(), "Seizure");
    /// assert!(ontology.hpo(66666u32).is_none());
    /// ```
    pub fn hpo<I: Into<HpoTermId>>(&self, term_id: I) -> Option<HpoTerm<'_>> {
        HpoTerm::try_new(self, term_id).ok()
    }

    /// Returns the [`HpoTerm`] of the provided [`HpoTermId`]
    ///
    /// # Errors
    ///
    /// If no such term is present, [`HpoError::DoesNotExist`] is returned
    pub fn term<I: Into<HpoTermId>>(&self, term_id: I) -> HpoResult<HpoTerm<'_>> {
        HpoTerm::try_new(self, term_id)
    }

    /// Returns the ancestor closure of the term
    ///
    /// The closure contains the term itself and all direct and indirect
    /// parents, up to and including the root. Terms that are reachable via
    /// multiple paths are contained only once.
    ///
    /// The closure is calculated once per term and cached afterwards.
    ///
    /// # Errors
    ///
    /// If no such term is present, [`HpoError::DoesNotExist`] is returned
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::Ontology;
    /// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
    ///
    /// let ancestors = ontology.ancestor_set(1250u32).unwrap();
    /// assert_eq!(ancestors.len(), 5);
    ///
    /// let root = ontology.ancestor_set(1u32).unwrap();
    /// assert_eq!(root.len(), 1);
    ///
    /// assert!(ontology.ancestor_set(66666u32).is_err());
    /// ```
    pub fn ancestor_set<I: Into<HpoTermId>>(&self, term_id: I) -> HpoResult<&HpoGroup> {
        Ok(self.term(term_id)?.ancestor_ids())
    }

    /// Returns the union of the ancestor closures of all `term_ids`
    ///
    /// # Errors
    ///
    /// If any of the terms is not present, [`HpoError::DoesNotExist`] is returned
    pub fn ancestor_union<I: IntoIterator<Item = HpoTermId>>(
        &self,
        term_ids: I,
    ) -> HpoResult<HpoGroup> {
        let mut res = HpoGroup::with_capacity(DEFAULT_NUM_ALL_PARENTS);
        for term_id in term_ids {
            res = &res | self.ancestor_set(term_id)?;
        }
        Ok(res)
    }

    /// Returns an Iterator of all [`HpoTerm`]s from the Ontology
    pub fn hpos(&self) -> Iter<'_> {
        self.into_iter()
    }
}

/// Crate-only functions for building and traversing the Ontology
impl Ontology {
    /// Builds and validates the ontology from all parsed terms
    ///
    /// The terms must already contain their declared children
    pub(crate) fn from_terms(terms: Vec<HpoTermInternal>) -> HpoResult<Self> {
        let mut ont = Ontology::default();
        let mut connections: Vec<(HpoTermId, HpoTermId)> = Vec::with_capacity(terms.len() * 2);

        for term in terms {
            for child in term.children() {
                connections.push((*term.id(), *child));
            }
            if let Err(duplicate) = ont.hpo_terms.insert(term) {
                return Err(HpoError::InvalidOntology(format!(
                    "Duplicate HPO term id {}",
                    duplicate.id()
                )));
            }
        }

        if !ont.contains(ROOT_ID) {
            return Err(HpoError::InvalidOntology(format!(
                "root term {ROOT_ID} is missing"
            )));
        }

        for (parent, child) in connections {
            ont.add_parent(parent, child)?;
        }

        ont.check_consistency()?;
        debug!("Built ontology with {} terms", ont.len());
        Ok(ont)
    }

    /// Records `parent_id` as parent of `child_id`
    fn add_parent(&mut self, parent_id: HpoTermId, child_id: HpoTermId) -> HpoResult<()> {
        let child = self.hpo_terms.get_mut(child_id).ok_or_else(|| {
            HpoError::InvalidOntology(format!(
                "{child_id} is declared as child of {parent_id} but is not a term"
            ))
        })?;
        child.add_parent(parent_id);
        Ok(())
    }

    /// Ensures that all terms form a single structure below the root
    fn check_consistency(&self) -> HpoResult<()> {
        let mut ids = self.hpo_terms.keys();
        ids.sort_unstable();

        // every term, except the root, must be a child of another term
        for id in &ids {
            if *id != ROOT_ID && self.get_unchecked(*id).parents().is_empty() {
                return Err(HpoError::InvalidOntology(format!(
                    "{id} is not used in the HPO tree"
                )));
            }
        }

        // every term must be reachable from the root
        let mut reached: HashSet<HpoTermId> = HashSet::with_capacity(self.len());
        let mut queue = VecDeque::from([ROOT_ID]);
        while let Some(id) = queue.pop_front() {
            if reached.insert(id) {
                queue.extend(self.get_unchecked(id).children().iter().copied());
            }
        }
        if reached.len() != self.len() {
            if let Some(id) = ids.iter().find(|id| !reached.contains(id)) {
                return Err(HpoError::InvalidOntology(format!(
                    "{id} is not connected to {ROOT_ID}"
                )));
            }
        }
        Ok(())
    }

    /// Returns the `HpoTermInternal` with the given `HpoTermId`
    ///
    /// Returns `None` if no such term is present
    pub(crate) fn get<I: Into<HpoTermId>>(&self, term_id: I) -> Option<&HpoTermInternal> {
        self.hpo_terms.get(term_id.into())
    }

    /// Returns the `HpoTermInternal` with the given `HpoTermId`
    ///
    /// This method should only be called if the caller is sure that the term actually
    /// exists, e.g. during an iteration of all `HpoTermId`s.
    ///
    /// # Panics
    ///
    /// This method will panic if the `term_id` is not present in the Ontology
    fn get_unchecked(&self, term_id: HpoTermId) -> &HpoTermInternal {
        self.hpo_terms
            .get(term_id)
            .expect("term ids are validated during the Ontology construction")
    }

    /// Returns the cached ancestor closure of `term`, calculating it if needed
    pub(crate) fn ancestors_of<'a>(&'a self, term: &'a HpoTermInternal) -> &'a HpoGroup {
        term.ancestors_or_init(|| self.collect_ancestors(term))
    }

    /// Walks all parents of `term` with an explicit worklist
    ///
    /// Parents with an already cached closure are not walked again, their
    /// closure is merged as a whole.
    fn collect_ancestors(&self, term: &HpoTermInternal) -> HpoGroup {
        let mut res = HpoGroup::with_capacity(DEFAULT_NUM_ALL_PARENTS);
        let mut stack: Vec<HpoTermId> = vec![*term.id()];

        while let Some(id) = stack.pop() {
            if res.contains(&id) {
                continue;
            }
            let Some(current) = self.get(id) else {
                continue;
            };
            if let Some(cached) = current.ancestors_cached() {
                res = &res | cached;
                continue;
            }
            res.insert(id);
            stack.extend(current.parents().iter());
        }
        res
    }
}

/// Iterates the Ontology and yields [`HpoTerm`]s
pub struct Iter<'a> {
    inner: std::collections::hash_map::Values<'a, HpoTermId, HpoTermInternal>,
    ontology: &'a Ontology,
}

impl<'a> std::iter::Iterator for Iter<'a> {
    type Item = HpoTerm<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|term| HpoTerm::new(self.ontology, term))
    }
}

impl<'a> IntoIterator for &'a Ontology {
    type Item = HpoTerm<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.hpo_terms.values(),
            ontology: self,
        }
    }
}
