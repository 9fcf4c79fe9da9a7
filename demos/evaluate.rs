use std::path::Path;

use phenorank::annotations::NcbiGeneIds;
use phenorank::batch::evaluate_file;
use phenorank::{FrequencyModel, Ontology, Prioritizer, CASES_FOLDER};

/// Evaluates the ranking with diagnosed patients
///
/// Usage: evaluate <data folder> <diagnosed patients> <output file> [<max rank>]
fn main() {
    simple_logger::init_with_env().unwrap();

    let mut args = std::env::args().skip(1);
    let folder = args.next().expect("Please specify the data folder");
    let input = args.next().expect("Please specify the patient file");
    let output = args.next().expect("Please specify the output file");
    let max_rank = args
        .next()
        .map(|max| max.parse::<usize>().expect("The max rank must be a number"));

    let resolver = NcbiGeneIds::new();
    let ontology = Ontology::from_standard(&folder).expect("Unable to read the ontology");
    let model = FrequencyModel::from_folder(
        &ontology,
        &resolver,
        Path::new(&folder).join(CASES_FOLDER),
    )
    .expect("Unable to train the model");
    let prioritizer = Prioritizer::new(&ontology, &model);

    let distribution = evaluate_file(&prioritizer, &resolver, &input, &output, max_rank)
        .expect("Unable to evaluate the patients");

    println!("{} patients", distribution.total());
    print!("{distribution}");
}
