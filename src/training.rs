//! Training data: how often each phenotype is observed for a gene
//!
//! The [`FrequencyModel`] is built once from diagnosed cases and is then
//! only read by the [`Prioritizer`](crate::Prioritizer).
//!
//! Every case is generalized before counting: a patient with
//! `HP:0001250 | Seizure` also counts as a patient with
//! `Abnormal nervous system physiology`, `Phenotypic abnormality` and
//! every other ancestor term.
//!
//! # Examples
//!
//! ```
//! use phenorank::annotations::NcbiGeneIds;
//! use phenorank::{FrequencyModel, Ontology};
//!
//! let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
//! let model = FrequencyModel::from_folder(
//!     &ontology,
//!     &NcbiGeneIds::new(),
//!     "tests/cases"
//! ).unwrap();
//!
//! assert_eq!(model.total_cases(), 7);
//! assert_eq!(model.len(), 3);
//! assert_eq!(model.gene_count(10u32.into()), 4);
//! ```
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::annotations::{GeneId, GeneResolver};
use crate::parser;
use crate::parser::cases::{gene_reference, parse_diagnosed_line};
use crate::utils::canonical_path;
use crate::{f64_from_u64, HpoError, HpoGroup, HpoResult, HpoTermId, Ontology, DEFAULT_NUM_GENES};

/// A single diagnosed patient
#[derive(Debug, Clone)]
pub struct TrainingRecord {
    patient: String,
    gene: GeneId,
    phenotypes: HpoGroup,
}

impl TrainingRecord {
    /// Constructs a new [`TrainingRecord`]
    pub fn new<S: Into<String>>(patient: S, gene: GeneId, phenotypes: HpoGroup) -> Self {
        Self {
            patient: patient.into(),
            gene,
            phenotypes,
        }
    }

    /// The patient identifier
    pub fn patient(&self) -> &str {
        &self.patient
    }

    /// The causal gene of the patient
    pub fn gene(&self) -> GeneId {
        self.gene
    }

    /// The observed phenotypes, not yet expanded to their ancestors
    pub fn phenotypes(&self) -> &HpoGroup {
        &self.phenotypes
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct GeneCounts {
    cases: u64,
    phenotypes: HashMap<HpoTermId, u64>,
}

/// Case and phenotype counts of all trained genes
///
/// The counts are stored as: gene -> phenotype -> number of cases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyModel {
    total_cases: u64,
    genes: HashMap<GeneId, GeneCounts>,
}

impl Default for FrequencyModel {
    fn default() -> Self {
        Self {
            total_cases: 0,
            genes: HashMap::with_capacity(DEFAULT_NUM_GENES),
        }
    }
}

/// Loading training data
impl FrequencyModel {
    /// Constructs an empty [`FrequencyModel`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the model from all training files
    ///
    /// Paths are de-duplicated after resolving them, so listing the same
    /// file twice (or via a symlink) counts its cases only once.
    ///
    /// # Errors
    ///
    /// - no source is given: [`HpoError::InvalidConfiguration`]
    /// - a source does not contain a single usable case: [`HpoError::InvalidConfiguration`]
    /// - a source can't be read: [`HpoError::CannotOpenFile`]
    /// - a row is malformed: [`HpoError::InvalidInput`]
    /// - a phenotype is not part of the ontology: [`HpoError::DoesNotExist`]
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::annotations::NcbiGeneIds;
    /// use phenorank::{FrequencyModel, Ontology};
    ///
    /// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
    /// let model = FrequencyModel::from_sources(
    ///     &ontology,
    ///     &NcbiGeneIds::new(),
    ///     ["tests/cases/train_1.tsv", "tests/../tests/cases/train_1.tsv"]
    /// ).unwrap();
    ///
    /// assert_eq!(model.total_cases(), 5);
    /// ```
    pub fn from_sources<G, P, I>(ontology: &Ontology, resolver: &G, sources: I) -> HpoResult<Self>
    where
        G: GeneResolver,
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        let mut paths: BTreeSet<PathBuf> = BTreeSet::new();
        for source in sources {
            paths.insert(canonical_path(source)?);
        }
        if paths.is_empty() {
            return Err(HpoError::InvalidConfiguration(
                "no training sources provided".to_string(),
            ));
        }

        let mut model = Self::new();
        for path in &paths {
            let ingested = model.ingest_file(ontology, resolver, path)?;
            if ingested == 0 {
                return Err(HpoError::InvalidConfiguration(format!(
                    "no training cases available in file {}",
                    path.display()
                )));
            }
            debug!("Loaded {ingested} cases from {}", path.display());
        }
        info!(
            "Trained {} cases of {} genes from {} sources",
            model.total_cases,
            model.len(),
            paths.len()
        );
        Ok(model)
    }

    /// Builds the model from every regular file inside `folder`
    ///
    /// A data folder usually contains the training files in the
    /// [`CASES_FOLDER`](crate::CASES_FOLDER) subdirectory.
    ///
    /// # Errors
    ///
    /// - the folder can't be read: [`HpoError::CannotOpenFile`]
    /// - the folder does not contain any file: [`HpoError::InvalidConfiguration`]
    /// - see [`FrequencyModel::from_sources`]
    pub fn from_folder<G: GeneResolver, P: AsRef<Path>>(
        ontology: &Ontology,
        resolver: &G,
        folder: P,
    ) -> HpoResult<Self> {
        let folder = folder.as_ref();
        let entries = folder
            .read_dir()
            .map_err(|_| HpoError::CannotOpenFile(folder.display().to_string()))?;

        let mut sources = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|_| HpoError::CannotOpenFile(folder.display().to_string()))?
                .path();
            if path.is_file() {
                sources.push(path);
            }
        }

        if sources.is_empty() {
            return Err(HpoError::InvalidConfiguration(format!(
                "no training files in {}",
                folder.display()
            )));
        }
        Self::from_sources(ontology, resolver, sources)
    }

    /// Adds all cases of the file and returns the number of ingested cases
    ///
    /// # Errors
    ///
    /// - the file can't be read: [`HpoError::CannotOpenFile`]
    /// - see [`FrequencyModel::ingest_reader`]
    pub fn ingest_file<G: GeneResolver, P: AsRef<Path>>(
        &mut self,
        ontology: &Ontology,
        resolver: &G,
        path: P,
    ) -> HpoResult<usize> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|_| HpoError::CannotOpenFile(path.display().to_string()))?;
        self.ingest_reader(
            ontology,
            resolver,
            BufReader::new(file),
            &path.display().to_string(),
        )
    }

    /// Adds all cases of the tab separated `reader`
    ///
    /// Rows with a gene reference that `resolver` does not know are
    /// skipped with a warning, before their phenotypes are parsed.
    /// `source` is only used for messages.
    ///
    /// Returns the number of ingested cases
    ///
    /// # Errors
    ///
    /// - a row is malformed: [`HpoError::InvalidInput`]
    /// - a phenotype is not part of the ontology: [`HpoError::DoesNotExist`]
    ///
    /// On error, no case of `reader` is added to the model.
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::annotations::NcbiGeneIds;
    /// use phenorank::{FrequencyModel, Ontology};
    ///
    /// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
    /// let mut model = FrequencyModel::new();
    ///
    /// let data = "P1\tEntrez:10\tHP:0001250\nP2\tEVX2\tHP:0001250\n";
    /// let ingested = model
    ///     .ingest_reader(&ontology, &NcbiGeneIds::new(), data.as_bytes(), "inline")
    ///     .unwrap();
    ///
    /// assert_eq!(ingested, 1);
    /// assert_eq!(model.total_cases(), 1);
    /// ```
    pub fn ingest_reader<G: GeneResolver, R: BufRead>(
        &mut self,
        ontology: &Ontology,
        resolver: &G,
        reader: R,
        source: &str,
    ) -> HpoResult<usize> {
        let mut partial = FrequencyModel::new();
        let mut ingested = 0;
        parser::for_each_line(reader, source, |line_no, line| {
            let reference = gene_reference(line)?;
            let Some(gene) = resolver.resolve(reference) else {
                warn!("Skipping unknown gene {reference} (line {line_no} of {source})");
                return Ok(());
            };
            let case = parse_diagnosed_line(line)?;
            partial.add_case(ontology, gene, case.phenotypes())?;
            ingested += 1;
            Ok(())
        })?;
        self.merge(&partial);
        Ok(ingested)
    }

    /// Adds a single case
    ///
    /// # Errors
    ///
    /// If a phenotype is not part of the ontology, [`HpoError::DoesNotExist`]
    /// is returned and the model is left unchanged
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::{FrequencyModel, HpoGroup, Ontology, TrainingRecord};
    ///
    /// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
    /// let mut model = FrequencyModel::new();
    ///
    /// let mut phenotypes = HpoGroup::new();
    /// phenotypes.insert(1250u32);
    /// model.ingest(&ontology, &TrainingRecord::new("P1", 10u32.into(), phenotypes)).unwrap();
    ///
    /// // HP:0000118 | Phenotypic abnormality is an ancestor of HP:0001250
    /// assert_eq!(model.phenotype_count(118u32, 10u32.into()), 1);
    /// ```
    pub fn ingest(&mut self, ontology: &Ontology, record: &TrainingRecord) -> HpoResult<()> {
        self.add_case(ontology, record.gene(), record.phenotypes())
    }

    /// Adds the counts of `other` to `self`
    ///
    /// Merging is associative and commutative, so partial models can
    /// be built independently, e.g. on multiple threads.
    pub fn merge(&mut self, other: &FrequencyModel) {
        self.total_cases += other.total_cases;
        for (gene, other_counts) in &other.genes {
            let counts = self.genes.entry(*gene).or_default();
            counts.cases += other_counts.cases;
            for (phenotype, count) in &other_counts.phenotypes {
                *counts.phenotypes.entry(*phenotype).or_insert(0) += count;
            }
        }
    }

    fn add_case(&mut self, ontology: &Ontology, gene: GeneId, phenotypes: &HpoGroup) -> HpoResult<()> {
        let expanded = ontology.ancestor_union(phenotypes)?;

        self.total_cases += 1;
        let counts = self.genes.entry(gene).or_default();
        counts.cases += 1;
        for phenotype in &expanded {
            *counts.phenotypes.entry(phenotype).or_insert(0) += 1;
        }
        Ok(())
    }
}

/// Read-only queries
impl FrequencyModel {
    /// Returns the number of ingested cases
    pub fn total_cases(&self) -> u64 {
        self.total_cases
    }

    /// Returns the number of trained genes
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if no case was ingested
    pub fn is_empty(&self) -> bool {
        self.total_cases == 0
    }

    /// Returns all trained genes, ordered by [`GeneId`]
    pub fn genes(&self) -> Vec<GeneId> {
        let mut genes: Vec<GeneId> = self.genes.keys().copied().collect();
        genes.sort_unstable();
        genes
    }

    /// Returns `true` if at least one case of `gene` was ingested
    pub fn contains_gene(&self, gene: GeneId) -> bool {
        self.genes.contains_key(&gene)
    }

    /// Returns the number of cases with `gene` as causal gene
    pub fn gene_count(&self, gene: GeneId) -> u64 {
        self.genes.get(&gene).map_or(0, |counts| counts.cases)
    }

    /// Returns the number of cases of `gene` that show `phenotype`,
    /// directly or through a more specific term
    pub fn phenotype_count<I: Into<HpoTermId>>(&self, phenotype: I, gene: GeneId) -> u64 {
        let phenotype = phenotype.into();
        self.genes
            .get(&gene)
            .and_then(|counts| counts.phenotypes.get(&phenotype))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the number of cases of all genes that show `phenotype`
    pub fn phenotype_population<I: Into<HpoTermId>>(&self, phenotype: I) -> u64 {
        let phenotype = phenotype.into();
        self.genes
            .values()
            .filter_map(|counts| counts.phenotypes.get(&phenotype))
            .sum()
    }

    /// The prior probability of `gene`: `P(gene)`
    ///
    /// `0` if the model is empty
    pub fn p_gene(&self, gene: GeneId) -> f64 {
        if self.total_cases == 0 {
            return 0.0;
        }
        f64_from_u64(self.gene_count(gene)) / f64_from_u64(self.total_cases)
    }

    /// The probability to observe `phenotype` for `gene`: `P(phenotype | gene)`
    ///
    /// `0` if `gene` was never trained
    pub fn p_phenotype_given_gene<I: Into<HpoTermId>>(&self, phenotype: I, gene: GeneId) -> f64 {
        let cases = self.gene_count(gene);
        if cases == 0 {
            return 0.0;
        }
        f64_from_u64(self.phenotype_count(phenotype, gene)) / f64_from_u64(cases)
    }

    /// The number of training cases of `gene`, used to break ties
    /// between equally plausible genes
    pub fn training_frequency(&self, gene: GeneId) -> u64 {
        self.gene_count(gene)
    }
}
