use std::io;
use std::io::Write;
use std::path::Path;

use phenorank::annotations::NcbiGeneIds;
use phenorank::parser::cases::parse_phenotypes;
use phenorank::{FrequencyModel, Ontology, Prioritizer, CASES_FOLDER};

const MAX_GENES: usize = 20;

/// Ranks the trained genes for a list of HPO terms
///
/// Usage: rank_phenotypes <data folder> <HP:0000001> [<HP:...> ...]
fn main() {
    simple_logger::init_with_env().unwrap();

    let mut args = std::env::args().skip(1);
    let folder = args
        .next()
        .expect("Please specify the data folder as first argument");
    let codes: Vec<String> = args.collect();
    assert!(!codes.is_empty(), "Please specify at least one HPO term");

    let ontology = Ontology::from_standard(&folder).expect("Unable to read the ontology");
    let model = FrequencyModel::from_folder(
        &ontology,
        &NcbiGeneIds::new(),
        Path::new(&folder).join(CASES_FOLDER),
    )
    .expect("Unable to train the model");
    let prioritizer = Prioritizer::new(&ontology, &model);

    let phenotypes = parse_phenotypes(codes.iter().map(String::as_str)).expect("Invalid HPO term");
    let ranking = prioritizer.rank(&phenotypes).expect("Unable to rank the genes");

    let mut stdout = io::stdout().lock();
    for (idx, result) in ranking.iter().take(MAX_GENES).enumerate() {
        writeln!(
            stdout,
            "{}\t{}\t{:.2}\t(trained {} times)",
            idx + 1,
            result.gene(),
            result.plausibility(),
            model.training_frequency(result.gene())
        )
        .unwrap();
        for (phenotype, evidence) in result.phenotypes() {
            let name = ontology.hpo(phenotype).map_or("", |term| term.name());
            writeln!(stdout, "\t{phenotype} | {name}\t{evidence:.2}").unwrap();
        }
    }
}
