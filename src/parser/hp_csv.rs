use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::trace;

use crate::term::internal::HpoTermInternal;
use crate::{HpoError, HpoResult, HpoTermId, DEFAULT_NUM_TERMS};

/// Reads all rows of the ontology table
///
/// Each row has the form `id,name[,child_id...]`. Fields may be quoted and
/// empty child fields are ignored. The parent-child connections are not
/// validated here, that's done while building the `Ontology`.
pub(crate) fn read_hpo_table<R: Read>(reader: R) -> HpoResult<Vec<HpoTermInternal>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut terms = Vec::with_capacity(DEFAULT_NUM_TERMS);
    for record in reader.records() {
        let record = record.map_err(|err| HpoError::InvalidInput(err.to_string()))?;
        let line = record.position().map_or(0, csv::Position::line);
        let term = term_from_record(&record)
            .map_err(|err| HpoError::InvalidInput(format!("{err} (ontology table line {line})")))?;
        trace!("Parsed {} with {} children", term.id(), term.children().len());
        terms.push(term);
    }
    Ok(terms)
}

fn term_from_record(record: &StringRecord) -> HpoResult<HpoTermInternal> {
    let (Some(id), Some(name)) = (record.get(0), record.get(1)) else {
        return Err(HpoError::InvalidInput(
            "row must contain at least the term id and name".to_string(),
        ));
    };
    let mut term = HpoTermInternal::try_new(id, name)?;
    for child in record.iter().skip(2).filter(|child| !child.is_empty()) {
        term.add_child(HpoTermId::try_from(child)?);
    }
    Ok(term)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_rows() {
        let table = "HP:0000001,All,HP:0000118,HP:0000005\n\
            HP:0000118,\"Phenotypic abnormality\"\n\
            HP:0000005,Mode of inheritance,,\n";
        let terms = read_hpo_table(table.as_bytes()).unwrap();
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[0].name(), "All");
        assert_eq!(
            terms[0].children(),
            &[HpoTermId::from(118u32), HpoTermId::from(5u32)]
        );
        assert_eq!(terms[1].name(), "Phenotypic abnormality");
        assert!(terms[2].children().is_empty());
    }

    #[test]
    fn quoted_names_can_contain_commas() {
        let table = "HP:0000152,\"Abnormality of head, or neck\",HP:0000234\n";
        let terms = read_hpo_table(table.as_bytes()).unwrap();
        assert_eq!(terms[0].name(), "Abnormality of head, or neck");
        assert_eq!(terms[0].children(), &[HpoTermId::from(234u32)]);
    }

    #[test]
    fn missing_name_fails() {
        let table = "HP:0000001,All\nHP:0000002\n";
        let err = read_hpo_table(table.as_bytes()).unwrap_err();
        assert!(matches!(err, HpoError::InvalidInput(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn invalid_child_fails() {
        let table = "HP:0000001,All,HP:12\n";
        let err = read_hpo_table(table.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("HP:12"));
    }
}
