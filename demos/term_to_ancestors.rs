use phenorank::Ontology;

/// Prints every term with its sorted ancestor closure
///
/// Usage: term_to_ancestors <data folder>
fn main() {
    simple_logger::init_with_env().unwrap();

    let folder = std::env::args()
        .nth(1)
        .expect("Please specify the data folder");
    let ontology = Ontology::from_standard(folder).unwrap();

    let mut ancestors: Vec<String> = Vec::new();
    for term in &ontology {
        ancestors.clear();
        for ancestor in term.ancestors() {
            ancestors.push(ancestor.id().to_string());
        }
        ancestors.sort();
        println!("{}\t{}", term.id(), ancestors.join(","));
    }
}
