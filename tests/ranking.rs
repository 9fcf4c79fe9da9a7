use phenorank::annotations::{GeneId, GeneResolver, NcbiGeneIds};
use phenorank::parser::cases::parse_phenotypes;
use phenorank::{FrequencyModel, HpoError, Ontology, Prioritizer};
use rayon::prelude::*;
use std::collections::HashMap;

fn ontology() -> Ontology {
    Ontology::from_csv("tests/example_hpo.csv").unwrap()
}

#[test]
fn ancestors_of_deep_terms() {
    let ontology = ontology();
    let ancestors = ontology.ancestor_set(12285u32).unwrap();
    let ids: Vec<u32> = ancestors.iter().map(|id| id.as_u32()).collect();
    assert_eq!(ids, vec![1, 118, 707, 818, 864, 12285, 12638]);

    let names: Vec<&str> = ontology
        .hpo(1250u32)
        .unwrap()
        .ancestors()
        .map(|term| term.name())
        .collect();
    assert!(names.contains(&"Abnormal nervous system physiology"));
    assert!(names.contains(&"All"));
    assert!(names.contains(&"Seizure"));
}

#[test]
fn train_and_rank() {
    let ontology = ontology();
    let model = FrequencyModel::from_folder(&ontology, &NcbiGeneIds::new(), "tests/cases").unwrap();
    let prioritizer = Prioritizer::new(&ontology, &model);

    let seizure = parse_phenotypes(["HP:0001250"]).unwrap();
    let ranking = prioritizer.rank(&seizure).unwrap();
    let genes: Vec<u32> = ranking.iter().map(|r| r.gene().as_u32()).collect();
    assert_eq!(genes, vec![10, 2125, 3000]);
    assert_eq!(ranking[0].plausibility(), 30.0);
    assert_eq!(ranking[1].plausibility(), -30.0);
    assert_eq!(ranking[2].plausibility(), -30.0);

    let mixed = parse_phenotypes(["HP:0000006", "HP:0012285"]).unwrap();
    let result = prioritizer.plausibility(10u32.into(), &mixed).unwrap();
    assert_eq!(result.plausibility_by_phenotype(6u32), -30.0);
    assert!(result.plausibility_by_phenotype(12285u32).abs() < 1e-12);
}

#[test]
fn unknown_phenotypes_are_reported() {
    let ontology = ontology();
    let model = FrequencyModel::from_folder(&ontology, &NcbiGeneIds::new(), "tests/cases").unwrap();
    let prioritizer = Prioritizer::new(&ontology, &model);

    let query = parse_phenotypes(["HP:0000002"]).unwrap();
    assert!(matches!(
        prioritizer.rank(&query),
        Err(HpoError::DoesNotExist(_))
    ));
}

#[test]
fn symbol_lexicon() {
    let ontology = ontology();
    let mut symbols: HashMap<String, GeneId> = HashMap::new();
    symbols.insert("EVX2".to_string(), 344_191u32.into());
    symbols.insert("NAT2".to_string(), 10u32.into());
    assert_eq!(symbols.resolve("EVX2"), Some(344_191u32.into()));

    let mut model = FrequencyModel::new();
    let ingested = model
        .ingest_file(&ontology, &symbols, "tests/unresolved_cases.tsv")
        .unwrap();
    assert_eq!(ingested, 2);
    assert_eq!(model.genes(), vec![GeneId::from(10), GeneId::from(344_191)]);
}

#[test]
fn parallel_queries() {
    let ontology = ontology();
    let model = FrequencyModel::from_folder(&ontology, &NcbiGeneIds::new(), "tests/cases").unwrap();
    let prioritizer = Prioritizer::new(&ontology, &model);

    let terms: Vec<_> = ontology.hpos().map(|term| term.id()).collect();
    let sequential: Vec<Vec<GeneId>> = terms
        .iter()
        .map(|id| prioritizer.prioritize_genes(&[*id].into_iter().collect()).unwrap())
        .collect();
    let parallel: Vec<Vec<GeneId>> = terms
        .par_iter()
        .map(|id| prioritizer.prioritize_genes(&[*id].into_iter().collect()).unwrap())
        .collect();
    assert_eq!(sequential, parallel);
}
