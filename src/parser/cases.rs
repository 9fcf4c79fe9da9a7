//! Parsing of tab separated patient rows
//!
//! Two layouts are used:
//!
//! - diagnosed cases (training and evaluation data):
//!   `patient <TAB> gene <TAB> HP:0000001 <TAB> HP:...`
//! - undiagnosed patients (prioritization queries):
//!   `patient <TAB> HP:0000001 <TAB> HP:...`
//!
//! The gene is kept as raw reference, it is resolved
//! by a [`GeneResolver`](crate::annotations::GeneResolver).

use crate::{HpoError, HpoGroup, HpoResult, HpoTermId};

/// A patient row with a known causal gene
#[derive(Debug)]
pub struct DiagnosedCase<'a> {
    patient: &'a str,
    gene: &'a str,
    phenotypes: HpoGroup,
}

impl<'a> DiagnosedCase<'a> {
    /// The patient identifier (first column)
    pub fn patient(&self) -> &'a str {
        self.patient
    }

    /// The raw gene reference (second column)
    pub fn gene(&self) -> &'a str {
        self.gene
    }

    /// The observed phenotypes
    pub fn phenotypes(&self) -> &HpoGroup {
        &self.phenotypes
    }
}

/// A patient row without a known causal gene
#[derive(Debug)]
pub struct PatientCase<'a> {
    patient: &'a str,
    phenotypes: HpoGroup,
}

impl<'a> PatientCase<'a> {
    /// The patient identifier (first column)
    pub fn patient(&self) -> &'a str {
        self.patient
    }

    /// The observed phenotypes
    pub fn phenotypes(&self) -> &HpoGroup {
        &self.phenotypes
    }
}

/// Parses a diagnosed patient row
///
/// # Errors
///
/// Returns [`HpoError::InvalidInput`] if the row has fewer than 3 columns
/// or contains a malformed phenotype code
///
/// # Examples
///
/// ```
/// use phenorank::parser::cases::parse_diagnosed_line;
///
/// let case = parse_diagnosed_line("P1\tEntrez:10\tHP:0001250\tHP:0012285").unwrap();
/// assert_eq!(case.patient(), "P1");
/// assert_eq!(case.gene(), "Entrez:10");
/// assert_eq!(case.phenotypes().len(), 2);
///
/// assert!(parse_diagnosed_line("P1\tEntrez:10").is_err());
/// assert!(parse_diagnosed_line("P1\tEntrez:10\t1250").is_err());
/// ```
pub fn parse_diagnosed_line(line: &str) -> HpoResult<DiagnosedCase<'_>> {
    let mut cols = columns(line);

    let (Some(patient), Some(gene)) = (cols.next(), cols.next()) else {
        return Err(too_few_columns(line, 3));
    };

    let phenotypes = phenotypes(cols)?;
    if phenotypes.is_empty() {
        return Err(too_few_columns(line, 3));
    }

    Ok(DiagnosedCase {
        patient,
        gene,
        phenotypes,
    })
}

/// Returns the raw gene reference (second column) of a diagnosed row
///
/// The phenotype columns are not parsed, so rows of unknown genes
/// can be skipped before their phenotypes are checked.
///
/// # Errors
///
/// Returns [`HpoError::InvalidInput`] if the row has fewer than 2 columns
///
/// # Examples
///
/// ```
/// use phenorank::parser::cases::gene_reference;
///
/// assert_eq!(gene_reference("P1\tEVX2\tHP:12").unwrap(), "EVX2");
/// assert!(gene_reference("P1").is_err());
/// ```
pub fn gene_reference(line: &str) -> HpoResult<&str> {
    columns(line)
        .nth(1)
        .ok_or_else(|| too_few_columns(line, 3))
}

/// Parses an undiagnosed patient row
///
/// # Errors
///
/// Returns [`HpoError::InvalidInput`] if the row has fewer than 2 columns
/// or contains a malformed phenotype code
///
/// # Examples
///
/// ```
/// use phenorank::parser::cases::parse_patient_line;
///
/// let case = parse_patient_line("P1\tHP:0001250\tHP:0001250").unwrap();
/// assert_eq!(case.patient(), "P1");
/// assert_eq!(case.phenotypes().len(), 1);
/// ```
pub fn parse_patient_line(line: &str) -> HpoResult<PatientCase<'_>> {
    let mut cols = columns(line);

    let Some(patient) = cols.next() else {
        return Err(too_few_columns(line, 2));
    };

    let phenotypes = phenotypes(cols)?;
    if phenotypes.is_empty() {
        return Err(too_few_columns(line, 2));
    }

    Ok(PatientCase {
        patient,
        phenotypes,
    })
}

/// Parses a list of phenotype codes, e.g. from the command line
///
/// # Errors
///
/// Returns [`HpoError::InvalidInput`] for a malformed phenotype code
pub fn parse_phenotypes<'a, I: IntoIterator<Item = &'a str>>(codes: I) -> HpoResult<HpoGroup> {
    phenotypes(codes.into_iter().map(str::trim))
}

fn columns(line: &str) -> impl Iterator<Item = &str> {
    line.trim_end_matches(['\r', '\n', '\t'])
        .split('\t')
        .map(str::trim)
}

fn phenotypes<'a, I: Iterator<Item = &'a str>>(codes: I) -> HpoResult<HpoGroup> {
    let mut group = HpoGroup::new();
    for code in codes {
        group.insert(HpoTermId::try_from(code)?);
    }
    Ok(group)
}

fn too_few_columns(line: &str, expected: usize) -> HpoError {
    HpoError::InvalidInput(format!(
        "line must have at least {expected} tab delimited columns: {line}"
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn diagnosed_line() {
        let case = parse_diagnosed_line("12\tNAT2\tHP:0000007\tHP:0001250\n").unwrap();
        assert_eq!(case.patient(), "12");
        assert_eq!(case.gene(), "NAT2");
        let expected: HpoGroup = [7u32, 1250].into_iter().map(HpoTermId::from).collect();
        assert_eq!(case.phenotypes(), &expected);
    }

    #[test]
    fn trailing_tabs_are_ignored() {
        let case = parse_diagnosed_line("12\t10\tHP:0000007\t\t\r\n").unwrap();
        assert_eq!(case.phenotypes().len(), 1);
    }

    #[test]
    fn diagnosed_line_without_phenotypes() {
        let err = parse_diagnosed_line("12\tNAT2").unwrap_err();
        assert!(matches!(err, HpoError::InvalidInput(_)));
        assert!(parse_diagnosed_line("12").is_err());
    }

    #[test]
    fn malformed_phenotype() {
        let err = parse_diagnosed_line("12\tNAT2\tHP:0000007\tHP0001250").unwrap_err();
        assert!(err.to_string().contains("HP0001250"));
        assert!(parse_patient_line("12\tHP:000125").is_err());
    }

    #[test]
    fn gene_reference_ignores_phenotypes() {
        assert_eq!(gene_reference("12\tNAT2\tHP0001250").unwrap(), "NAT2");
        assert_eq!(gene_reference("12\t Entrez:10 \n").unwrap(), "Entrez:10");
        assert!(matches!(gene_reference("12\n"), Err(HpoError::InvalidInput(_))));
    }

    #[test]
    fn patient_line() {
        let case = parse_patient_line("P-7\tHP:0000007\tHP:0001250").unwrap();
        assert_eq!(case.patient(), "P-7");
        assert_eq!(case.phenotypes().len(), 2);
        assert!(parse_patient_line("P-7").is_err());
    }

    #[test]
    fn phenotype_list() {
        let group = parse_phenotypes(["HP:0000007", " HP:0001250 "]).unwrap();
        assert_eq!(group.len(), 2);
        assert!(parse_phenotypes(["HP:0000007", "Seizure"]).is_err());
    }
}
