//! Phenotype driven gene prioritization
//!
//! `phenorank` ranks candidate genes for the phenotypes of a patient, based
//! on the phenotypes of previously diagnosed patients.
//!
//! The main building blocks are
//!
//! - the [`Ontology`]: all [`HpoTerm`]s of the Human Phenotype Ontology and
//!   their ancestor closure
//! - the [`FrequencyModel`]: per gene phenotype counts of the training cases
//! - the [`Prioritizer`]: evidence scoring and ranking of all trained genes
//!
//! # Examples
//!
//! ```
//! use phenorank::annotations::NcbiGeneIds;
//! use phenorank::parser::cases::parse_phenotypes;
//! use phenorank::{FrequencyModel, Ontology, Prioritizer};
//!
//! let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
//! let model = FrequencyModel::from_folder(&ontology, &NcbiGeneIds::new(), "tests/cases").unwrap();
//! let prioritizer = Prioritizer::new(&ontology, &model);
//!
//! let phenotypes = parse_phenotypes(["HP:0001250"]).unwrap();
//! let genes = prioritizer.prioritize_genes(&phenotypes).unwrap();
//! assert_eq!(genes[0].to_string(), "NCBI-GeneID:10");
//! ```
use std::num::ParseIntError;
use thiserror::Error;

pub mod annotations;
pub mod batch;
pub mod evaluation;
pub mod parser;
pub mod prioritization;
pub mod term;
pub mod training;
mod ontology;
mod utils;

pub use ontology::Ontology;
pub use prioritization::{GenePlausibility, Prioritizer};
pub use term::{HpoGroup, HpoTerm, HpoTermId};
pub use training::{FrequencyModel, TrainingRecord};

const DEFAULT_NUM_PARENTS: usize = 10;
const DEFAULT_NUM_ALL_PARENTS: usize = 30;
const DEFAULT_NUM_GENES: usize = 5_000;
const DEFAULT_NUM_TERMS: usize = 20_000;

/// The root term of the ontology `HP:0000001 | All`
///
/// Every other term must be a direct or indirect child of the root
pub const ROOT_ID: HpoTermId = HpoTermId::from_u32(1);

/// The maximum absolute evidence a single phenotype can contribute to a gene
///
/// It is returned when a phenotype is never observed for a gene (`-CLIP_EVIDENCE`)
/// or observed exclusively for a gene (`+CLIP_EVIDENCE`)
pub const CLIP_EVIDENCE: f64 = 30.0;

/// Default filename of the ontology table inside a data folder
pub const ONTOLOGY_FILENAME: &str = "hpo.csv";

/// Default name of the folder with training cases inside a data folder
pub const CASES_FOLDER: &str = "cases";

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HpoError {
    /// Failed to find the requested term or gene
    #[error("{0} does not exist")]
    DoesNotExist(String),
    /// Failed to parse an integer
    #[error("unable to parse Integer")]
    ParseIntError,
    /// Failed to open or read a file
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// A row of an input file does not follow the expected format
    #[error("invalid input data: {0}")]
    InvalidInput(String),
    /// The ontology is not a single DAG connected to the root
    #[error("invalid ontology: {0}")]
    InvalidOntology(String),
    /// The provided training or output setup is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<ParseIntError> for HpoError {
    fn from(_: ParseIntError) -> Self {
        HpoError::ParseIntError
    }
}

/// Shortcut for `Result<T, HpoError>`
pub type HpoResult<T> = Result<T, HpoError>;

/// Converts a `u64` count into `f64`
///
/// Counts in this crate are far below `2^52`, so the conversion is exact.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn f64_from_u64(n: u64) -> f64 {
    n as f64
}
