//! Ranking of genes by their plausibility to cause a set of phenotypes
//!
//! The [`Prioritizer`] compares the phenotypes of a patient with the
//! trained [`FrequencyModel`]. Each phenotype contributes an evidence score
//! to every gene: a base 10 log-odds ratio in decibel of observing
//! the phenotype for this gene versus observing it for any other gene.
//!
//! ```text
//! evidence(p, g) = 10 * log10( P(p|g) * P(g) / Σ(g' != g) P(p|g') * P(g') )
//! ```
//!
//! - a phenotype never observed for `g` scores `-CLIP_EVIDENCE`
//! - a phenotype observed only for `g` scores `+CLIP_EVIDENCE`
//!
//! The plausibility of a gene is the sum of the evidence of all phenotypes.
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
//! let phenotypes = parse_phenotypes(["HP:0000006", "HP:0012285"]).unwrap();
//! let ranking = prioritizer.rank(&phenotypes).unwrap();
//!
//! assert_eq!(ranking[0].gene().as_u32(), 2125);
//! assert_eq!(ranking[0].plausibility_by_phenotype(6u32), 30.0);
//! ```
use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use crate::annotations::GeneId;
use crate::{
    f64_from_u64, FrequencyModel, HpoError, HpoGroup, HpoResult, HpoTermId, Ontology,
    CLIP_EVIDENCE,
};

/// The plausibility of a gene for a set of phenotypes
///
/// It holds the evidence of every phenotype and their sum.
#[derive(Debug, Clone, PartialEq)]
pub struct GenePlausibility {
    gene: GeneId,
    plausibility: f64,
    by_phenotype: BTreeMap<HpoTermId, f64>,
}

impl GenePlausibility {
    /// Constructs a new [`GenePlausibility`] without any evidence
    pub fn new(gene: GeneId) -> Self {
        Self {
            gene,
            plausibility: 0.0,
            by_phenotype: BTreeMap::new(),
        }
    }

    /// Sets the evidence of `phenotype`
    ///
    /// A previous evidence of the same phenotype is replaced
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::GenePlausibility;
    ///
    /// let mut result = GenePlausibility::new(10u32.into());
    /// result.set(1250u32, 4.0);
    /// result.set(12285u32, -1.5);
    /// result.set(1250u32, 2.0);
    ///
    /// assert_eq!(result.plausibility(), 0.5);
    /// assert_eq!(result.plausibility_by_phenotype(1250u32), 2.0);
    /// ```
    pub fn set<I: Into<HpoTermId>>(&mut self, phenotype: I, evidence: f64) {
        self.by_phenotype.insert(phenotype.into(), evidence);
        self.plausibility = self.by_phenotype.values().sum();
    }

    /// Returns the gene
    pub fn gene(&self) -> GeneId {
        self.gene
    }

    /// Returns the sum of the evidence of all phenotypes
    pub fn plausibility(&self) -> f64 {
        self.plausibility
    }

    /// Returns the evidence of a single phenotype, `0` if it is not set
    pub fn plausibility_by_phenotype<I: Into<HpoTermId>>(&self, phenotype: I) -> f64 {
        self.by_phenotype
            .get(&phenotype.into())
            .copied()
            .unwrap_or(0.0)
    }

    /// Returns an iterator of all phenotypes and their evidence, ordered by [`HpoTermId`]
    pub fn phenotypes(&self) -> impl Iterator<Item = (HpoTermId, f64)> + '_ {
        self.by_phenotype.iter().map(|(id, evidence)| (*id, *evidence))
    }
}

/// Scores and ranks all trained genes
///
/// The prioritizer only borrows the [`Ontology`] and the [`FrequencyModel`].
/// It does not hold any state on its own, so it can be shared between threads.
#[derive(Debug, Clone, Copy)]
pub struct Prioritizer<'a> {
    ontology: &'a Ontology,
    model: &'a FrequencyModel,
}

impl<'a> Prioritizer<'a> {
    /// Constructs a new [`Prioritizer`]
    pub fn new(ontology: &'a Ontology, model: &'a FrequencyModel) -> Self {
        Self { ontology, model }
    }

    /// Returns the [`Ontology`]
    pub fn ontology(&self) -> &'a Ontology {
        self.ontology
    }

    /// Returns the [`FrequencyModel`]
    pub fn model(&self) -> &'a FrequencyModel {
        self.model
    }

    /// Returns the evidence of `phenotype` for `gene`
    ///
    /// A gene that was never trained scores `-CLIP_EVIDENCE`
    ///
    /// # Errors
    ///
    /// If `phenotype` is not an ontology term, [`HpoError::DoesNotExist`] is returned
    pub fn evidence<I: Into<HpoTermId>>(&self, phenotype: I, gene: GeneId) -> HpoResult<f64> {
        let phenotype = self.known_phenotype(phenotype)?;
        Ok(evidence_from_counts(
            self.model.phenotype_count(phenotype, gene),
            self.model.phenotype_population(phenotype),
        ))
    }

    /// Returns the [`GenePlausibility`] of a single gene
    ///
    /// # Errors
    ///
    /// - `gene` was never trained: [`HpoError::DoesNotExist`]
    /// - a phenotype is not an ontology term: [`HpoError::DoesNotExist`]
    pub fn plausibility(&self, gene: GeneId, phenotypes: &HpoGroup) -> HpoResult<GenePlausibility> {
        if !self.model.contains_gene(gene) {
            return Err(HpoError::DoesNotExist(gene.to_string()));
        }
        let populations = self.populations(phenotypes)?;
        Ok(self.score(gene, &populations))
    }

    /// Ranks all trained genes, the most plausible gene first
    ///
    /// Genes with the same plausibility are ordered by their number of
    /// training cases (descending) and then by [`GeneId`].
    ///
    /// # Errors
    ///
    /// If a phenotype is not an ontology term, [`HpoError::DoesNotExist`] is returned
    pub fn rank(&self, phenotypes: &HpoGroup) -> HpoResult<Vec<GenePlausibility>> {
        let populations = self.populations(phenotypes)?;

        let mut ranking: Vec<GenePlausibility> = self
            .model
            .genes()
            .into_iter()
            .map(|gene| self.score(gene, &populations))
            .collect();
        ranking.sort_by(|a, b| self.compare(a, b));

        debug!(
            "Ranked {} genes for {} phenotypes",
            ranking.len(),
            phenotypes.len()
        );
        Ok(ranking)
    }

    /// Returns only the ranked genes, see [`Prioritizer::rank`]
    ///
    /// # Errors
    ///
    /// If a phenotype is not an ontology term, [`HpoError::DoesNotExist`] is returned
    pub fn prioritize_genes(&self, phenotypes: &HpoGroup) -> HpoResult<Vec<GeneId>> {
        Ok(self
            .rank(phenotypes)?
            .iter()
            .map(GenePlausibility::gene)
            .collect())
    }

    fn known_phenotype<I: Into<HpoTermId>>(&self, phenotype: I) -> HpoResult<HpoTermId> {
        let phenotype = phenotype.into();
        if self.ontology.contains(phenotype) {
            Ok(phenotype)
        } else {
            Err(HpoError::DoesNotExist(phenotype.to_string()))
        }
    }

    /// Returns each phenotype with its number of cases across all genes
    fn populations(&self, phenotypes: &HpoGroup) -> HpoResult<Vec<(HpoTermId, u64)>> {
        phenotypes
            .iter()
            .map(|phenotype| {
                let phenotype = self.known_phenotype(phenotype)?;
                Ok((phenotype, self.model.phenotype_population(phenotype)))
            })
            .collect()
    }

    fn score(&self, gene: GeneId, populations: &[(HpoTermId, u64)]) -> GenePlausibility {
        let mut result = GenePlausibility::new(gene);
        for (phenotype, population) in populations {
            let own = self.model.phenotype_count(*phenotype, gene);
            result.set(*phenotype, evidence_from_counts(own, *population));
        }
        result
    }

    fn compare(&self, a: &GenePlausibility, b: &GenePlausibility) -> Ordering {
        b.plausibility()
            .partial_cmp(&a.plausibility())
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                self.model
                    .training_frequency(b.gene())
                    .cmp(&self.model.training_frequency(a.gene()))
            })
            .then_with(|| a.gene().cmp(&b.gene()))
    }
}

/// Calculates the evidence from the number of cases of the gene that
/// show the phenotype (`own`) and the cases of all genes with the phenotype
///
/// `P(p|g) * P(g)` reduces to `count(p, g) / total_cases`, so the ratio of the
/// joint probabilities equals the ratio of the counts.
fn evidence_from_counts(own: u64, population: u64) -> f64 {
    if own == 0 {
        return -CLIP_EVIDENCE;
    }
    let others = population.saturating_sub(own);
    if others == 0 {
        return CLIP_EVIDENCE;
    }
    10.0 * (f64_from_u64(own) / f64_from_u64(others)).log10()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::TrainingRecord;
    use rayon::prelude::*;

    const DIAMOND: &str = "HP:0000001,All,HP:0000010
HP:0000010,A,HP:0000020,HP:0000030
HP:0000020,B,HP:0000040
HP:0000030,C,HP:0000040
HP:0000040,D
";

    fn diamond() -> Ontology {
        Ontology::from_reader(DIAMOND.as_bytes()).unwrap()
    }

    fn group(ids: &[u32]) -> HpoGroup {
        ids.iter().map(|id| HpoTermId::from(*id)).collect()
    }

    fn train(ontology: &Ontology, cases: &[(u32, &[u32])]) -> FrequencyModel {
        let mut model = FrequencyModel::new();
        for (idx, (gene, phenotypes)) in cases.iter().enumerate() {
            let record = TrainingRecord::new(idx.to_string(), (*gene).into(), group(phenotypes));
            model.ingest(ontology, &record).unwrap();
        }
        model
    }

    #[test]
    fn exclusive_phenotype_is_clipped() {
        let ontology = diamond();
        let model = train(&ontology, &[(1, &[20])]);
        let prioritizer = Prioritizer::new(&ontology, &model);

        assert_eq!(prioritizer.evidence(20u32, 1.into()).unwrap(), CLIP_EVIDENCE);
        assert_eq!(prioritizer.evidence(20u32, 2.into()).unwrap(), -CLIP_EVIDENCE);
        assert_eq!(prioritizer.evidence(30u32, 1.into()).unwrap(), -CLIP_EVIDENCE);
    }

    #[test]
    fn evidence_matches_probabilities() {
        let ontology = diamond();
        let model = train(
            &ontology,
            &[(1, &[20]), (1, &[30]), (1, &[40]), (2, &[20]), (3, &[30]), (3, &[20])],
        );
        let prioritizer = Prioritizer::new(&ontology, &model);

        for phenotype in [1u32, 10, 20] {
            for gene in model.genes() {
                let joint = model.p_phenotype_given_gene(phenotype, gene) * model.p_gene(gene);
                let others: f64 = model
                    .genes()
                    .into_iter()
                    .filter(|other| *other != gene)
                    .map(|other| model.p_phenotype_given_gene(phenotype, other) * model.p_gene(other))
                    .sum();
                let expected = 10.0 * (joint / others).log10();
                let evidence = prioritizer.evidence(phenotype, gene).unwrap();
                assert!(
                    (evidence - expected).abs() < 1e-9,
                    "{phenotype} {gene}: {evidence} != {expected}"
                );
            }
        }
    }

    #[test]
    fn unknown_phenotype_fails() {
        let ontology = diamond();
        let model = train(&ontology, &[(1, &[20])]);
        let prioritizer = Prioritizer::new(&ontology, &model);

        assert!(matches!(
            prioritizer.evidence(99u32, 1.into()),
            Err(HpoError::DoesNotExist(_))
        ));
        assert!(prioritizer.rank(&group(&[20, 99])).is_err());
    }

    #[test]
    fn untrained_gene_has_no_plausibility() {
        let ontology = diamond();
        let model = train(&ontology, &[(1, &[20])]);
        let prioritizer = Prioritizer::new(&ontology, &model);

        assert!(prioritizer.plausibility(1.into(), &group(&[20])).is_ok());
        assert!(matches!(
            prioritizer.plausibility(2.into(), &group(&[20])),
            Err(HpoError::DoesNotExist(_))
        ));
    }

    #[test]
    fn diagnostic_phenotype_ranks_first() {
        let ontology = diamond();
        let mut model = FrequencyModel::new();
        for n in 0..100 {
            let g1 = if n < 90 { 20u32 } else { 30 };
            let g2 = if n < 1 { 20u32 } else { 30 };
            model
                .ingest(&ontology, &TrainingRecord::new("a", 1.into(), group(&[g1])))
                .unwrap();
            model
                .ingest(&ontology, &TrainingRecord::new("b", 2.into(), group(&[g2])))
                .unwrap();
        }
        let prioritizer = Prioritizer::new(&ontology, &model);

        let ranking = prioritizer.rank(&group(&[20])).unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].gene(), 1.into());
        assert_eq!(ranking[1].gene(), 2.into());
        assert!(ranking[0].plausibility() > ranking[1].plausibility());
    }

    #[test]
    fn ties_are_broken_by_training_frequency() {
        let ontology = diamond();
        let model = train(
            &ontology,
            &[(5, &[20]), (7, &[20]), (7, &[20]), (4, &[20]), (9, &[40])],
        );
        let prioritizer = Prioritizer::new(&ontology, &model);

        let ranking = prioritizer.rank(&group(&[30])).unwrap();
        let genes: Vec<u32> = ranking.iter().map(|r| r.gene().as_u32()).collect();
        assert_eq!(genes, vec![9, 7, 4, 5]);
        assert_eq!(ranking[1].plausibility(), ranking[2].plausibility());
        assert_eq!(
            prioritizer.prioritize_genes(&group(&[30])).unwrap(),
            [9u32, 7, 4, 5].map(GeneId::from).to_vec()
        );
    }

    #[test]
    fn plausibility_is_the_sum_of_evidence() {
        let ontology = diamond();
        let model = train(&ontology, &[(1, &[20]), (1, &[40]), (2, &[30])]);
        let prioritizer = Prioritizer::new(&ontology, &model);

        let query = group(&[20, 30]);
        let result = prioritizer.plausibility(1.into(), &query).unwrap();
        let expected =
            prioritizer.evidence(20u32, 1.into()).unwrap() + prioritizer.evidence(30u32, 1.into()).unwrap();
        assert!((result.plausibility() - expected).abs() < 1e-12);
        assert_eq!(result.phenotypes().count(), 2);
    }

    #[test]
    fn replacing_evidence_does_not_double_count() {
        let mut result = GenePlausibility::new(1.into());
        result.set(20u32, 3.0);
        result.set(20u32, -7.0);
        assert_eq!(result.plausibility(), -7.0);
        assert_eq!(result.plausibility_by_phenotype(20u32), -7.0);
        assert_eq!(result.plausibility_by_phenotype(30u32), 0.0);
    }

    #[test]
    fn rank_is_deterministic_in_parallel() {
        let ontology = diamond();
        let model = train(
            &ontology,
            &[(1, &[20]), (2, &[30]), (3, &[40]), (4, &[20]), (5, &[10]), (6, &[20])],
        );
        let prioritizer = Prioritizer::new(&ontology, &model);
        let queries = vec![
            group(&[20]),
            group(&[30]),
            group(&[40]),
            group(&[10, 20]),
            group(&[1]),
        ];

        let sequential: Vec<Vec<GenePlausibility>> =
            queries.iter().map(|q| prioritizer.rank(q).unwrap()).collect();
        let parallel: Vec<Vec<GenePlausibility>> =
            queries.par_iter().map(|q| prioritizer.rank(q).unwrap()).collect();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn empty_model_ranks_nothing() {
        let ontology = diamond();
        let model = FrequencyModel::new();
        let prioritizer = Prioritizer::new(&ontology, &model);
        assert!(prioritizer.rank(&group(&[20])).unwrap().is_empty());
    }

    #[test]
    fn accessors_return_the_inputs() {
        let ontology = diamond();
        let model = train(&ontology, &[(1, &[20]), (2, &[30])]);
        let prioritizer = Prioritizer::new(&ontology, &model);
        assert!(std::ptr::eq(prioritizer.ontology(), &ontology));
        assert!(std::ptr::eq(prioritizer.model(), &model));
        assert_eq!(prioritizer.model().total_cases(), 2);
        assert!(prioritizer.ontology().contains(40u32));
    }
}
