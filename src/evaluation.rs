//! Benchmarking of the prioritization with diagnosed patients
//!
//! Every patient is ranked and the position of the diagnosed gene is
//! recorded in a [`RankDistribution`]. Patients with a gene that is
//! unknown or not part of the ranking are recorded as misses.
//!
//! # Examples
//!
//! ```
//! use phenorank::annotations::NcbiGeneIds;
//! use phenorank::{FrequencyModel, Ontology, Prioritizer};
//!
//! let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
//! let resolver = NcbiGeneIds::new();
//! let model = FrequencyModel::from_folder(&ontology, &resolver, "tests/cases").unwrap();
//! let prioritizer = Prioritizer::new(&ontology, &model);
//!
//! let result = prioritizer.evaluate_file(&resolver, "tests/diagnosed.tsv").unwrap();
//! assert_eq!(result.total(), 5);
//! assert_eq!(result.misses(), 2);
//! assert_eq!(result.top(1), 40.0);
//! ```
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, trace, warn};

use crate::annotations::GeneResolver;
use crate::parser;
use crate::parser::cases::{gene_reference, parse_diagnosed_line};
use crate::{f64_from_u64, HpoError, HpoResult, Prioritizer};

const SUMMARY_RANKS: [usize; 6] = [1, 3, 5, 10, 50, 100];

/// Histogram of the ranks of the diagnosed genes
///
/// Ranks start at `1`, the key `0` counts all misses.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RankDistribution {
    counts: BTreeMap<usize, u64>,
}

impl RankDistribution {
    /// Constructs an empty [`RankDistribution`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result of a single patient
    ///
    /// `None` (or a rank of `0`) is recorded as miss
    pub fn record(&mut self, rank: Option<usize>) {
        *self.counts.entry(rank.unwrap_or(0)).or_insert(0) += 1;
    }

    /// Records a patient whose gene was found at `rank` (1-based)
    pub fn record_rank(&mut self, rank: usize) {
        self.record(Some(rank));
    }

    /// Records a patient whose gene was not found
    pub fn record_miss(&mut self) {
        self.record(None);
    }

    /// Returns the number of patients
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Returns the number of patients whose gene was not found
    pub fn misses(&self) -> u64 {
        self.count(0)
    }

    /// Returns the number of patients with the gene at `rank`
    pub fn count(&self, rank: usize) -> u64 {
        self.counts.get(&rank).copied().unwrap_or(0)
    }

    /// Returns the worst rank of all found genes, `0` if no gene was found
    pub fn max_rank(&self) -> usize {
        self.counts
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
    }

    /// Returns the percentage of patients with the gene within the top `n` genes
    ///
    /// Misses are part of the total. An empty distribution returns `0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::evaluation::RankDistribution;
    ///
    /// let mut result = RankDistribution::new();
    /// result.record_rank(1);
    /// result.record_rank(3);
    /// result.record_rank(3);
    /// result.record_miss();
    ///
    /// assert_eq!(result.top(1), 25.0);
    /// assert_eq!(result.top(2), 25.0);
    /// assert_eq!(result.top(3), 75.0);
    /// assert_eq!(result.rank_for_coverage(50.0), Some(3));
    /// assert_eq!(result.rank_for_coverage(80.0), None);
    /// ```
    pub fn top(&self, n: usize) -> f64 {
        let total = self.total();
        if total == 0 || n == 0 {
            return 0.0;
        }
        let found: u64 = self.counts.range(1..=n).map(|(_, count)| count).sum();
        100.0 * f64_from_u64(found) / f64_from_u64(total)
    }

    /// Returns the smallest `n` with at least `percent` of all genes in the top `n`
    pub fn rank_for_coverage(&self, percent: f64) -> Option<usize> {
        (1..=self.max_rank()).find(|n| self.top(*n) >= percent)
    }
}

impl Display for RankDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for n in SUMMARY_RANKS {
            writeln!(f, "top {n:>3}: {:>6.2} %", self.top(n))?;
        }
        if let Some(n) = self.rank_for_coverage(50.0) {
            writeln!(
                f,
                "top {n} prioritized genes include the diagnosed gene with {:.2} % probability",
                self.top(n)
            )?;
        }
        Ok(())
    }
}

/// Evaluation of diagnosed patients
impl Prioritizer<'_> {
    /// Ranks every diagnosed patient of `reader` and records the rank of the diagnosed gene
    ///
    /// Rows with a gene reference that `resolver` does not know are
    /// recorded as miss with a warning.
    ///
    /// # Errors
    ///
    /// - a row is malformed: [`HpoError::InvalidInput`]
    /// - a phenotype is not part of the ontology: [`HpoError::DoesNotExist`]
    pub fn evaluate_reader<G: GeneResolver, R: BufRead>(
        &self,
        resolver: &G,
        reader: R,
        source: &str,
    ) -> HpoResult<RankDistribution> {
        let mut distribution = RankDistribution::new();
        parser::for_each_line(reader, source, |line_no, line| {
            let reference = gene_reference(line)?;
            let Some(gene) = resolver.resolve(reference) else {
                warn!("Unknown gene {reference} (line {line_no} of {source})");
                distribution.record_miss();
                return Ok(());
            };
            let case = parse_diagnosed_line(line)?;

            let rank = self
                .prioritize_genes(case.phenotypes())?
                .iter()
                .position(|candidate| *candidate == gene)
                .map(|idx| idx + 1);
            trace!("Patient {}: {gene} at rank {rank:?}", case.patient());
            distribution.record(rank);
            Ok(())
        })?;

        info!(
            "Evaluated {} patients: top 1 {:.2} %, top 10 {:.2} %",
            distribution.total(),
            distribution.top(1),
            distribution.top(10)
        );
        Ok(distribution)
    }

    /// Ranks every diagnosed patient of a file, see [`Prioritizer::evaluate_reader`]
    ///
    /// # Errors
    ///
    /// - the file can't be read: [`HpoError::CannotOpenFile`]
    /// - see [`Prioritizer::evaluate_reader`]
    pub fn evaluate_file<G: GeneResolver, P: AsRef<Path>>(
        &self,
        resolver: &G,
        path: P,
    ) -> HpoResult<RankDistribution> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|_| HpoError::CannotOpenFile(path.display().to_string()))?;
        self.evaluate_reader(resolver, BufReader::new(file), &path.display().to_string())
    }
}
