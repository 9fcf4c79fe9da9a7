//! File based prioritization and evaluation runs
//!
//! Both runs read a tab separated input file and write a tab separated
//! result file. The input and output file must not be the same.
//!
//! - [`prioritize_file`]: one row per patient with the ranked genes
//!   `patient <TAB> gene <TAB> gene ...`
//! - [`evaluate_file`]: the cumulative percentage of patients with the
//!   diagnosed gene within the top `n` genes
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::annotations::GeneResolver;
use crate::evaluation::RankDistribution;
use crate::parser::{self, cases::parse_patient_line};
use crate::utils::canonical_path;
use crate::{HpoError, HpoResult, Prioritizer};

/// Ranks the genes of every patient in `input` and writes them to `output`
///
/// `max_genes` limits the number of genes per patient. `output` is only
/// created once all patients are ranked, a failing row leaves no file.
///
/// Returns the number of prioritized patients
///
/// # Errors
///
/// - `input` and `output` are the same file: [`HpoError::InvalidConfiguration`]
/// - a file can't be read or written: [`HpoError::CannotOpenFile`]
/// - see [`prioritize_reader`]
///
/// # Examples
///
/// ```no_run
/// use phenorank::annotations::NcbiGeneIds;
/// use phenorank::batch::prioritize_file;
/// use phenorank::{FrequencyModel, Ontology, Prioritizer};
///
/// let ontology = Ontology::from_standard("data").unwrap();
/// let model = FrequencyModel::from_folder(&ontology, &NcbiGeneIds::new(), "data/cases").unwrap();
/// let prioritizer = Prioritizer::new(&ontology, &model);
///
/// prioritize_file(&prioritizer, "patients.tsv", "result/patients.tsv", Some(50)).unwrap();
/// ```
pub fn prioritize_file<P: AsRef<Path>, Q: AsRef<Path>>(
    prioritizer: &Prioritizer,
    input: P,
    output: Q,
    max_genes: Option<usize>,
) -> HpoResult<usize> {
    let (input, output) = (input.as_ref(), output.as_ref());
    check_paths(input, output)?;

    let reader = open_input(input)?;
    let mut rows = Vec::new();
    let patients = prioritize_reader(
        prioritizer,
        reader,
        &input.display().to_string(),
        &mut rows,
        max_genes,
    )?;

    let mut writer = create_output(output)?;
    writer.write_all(&rows).map_err(|_| write_error(output))?;
    writer.flush().map_err(|_| write_error(output))?;

    info!("Prioritized {patients} patients into {}", output.display());
    Ok(patients)
}

/// Ranks the genes of every patient row in `reader` and writes them to `writer`
///
/// Returns the number of prioritized patients
///
/// # Errors
///
/// - a row is malformed: [`HpoError::InvalidInput`]
/// - a phenotype is not part of the ontology: [`HpoError::DoesNotExist`]
/// - `writer` fails: [`HpoError::CannotOpenFile`]
///
/// # Examples
///
/// ```
/// use phenorank::annotations::NcbiGeneIds;
/// use phenorank::batch::prioritize_reader;
/// use phenorank::{FrequencyModel, Ontology, Prioritizer};
///
/// let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
/// let model = FrequencyModel::from_folder(&ontology, &NcbiGeneIds::new(), "tests/cases").unwrap();
/// let prioritizer = Prioritizer::new(&ontology, &model);
///
/// let mut result = Vec::new();
/// prioritize_reader(&prioritizer, "Q1\tHP:0001250\n".as_bytes(), "inline", &mut result, Some(2)).unwrap();
///
/// assert_eq!(
///     String::from_utf8(result).unwrap(),
///     "Q1\tNCBI-GeneID:10\tNCBI-GeneID:2125\n"
/// );
/// ```
pub fn prioritize_reader<R: BufRead, W: Write>(
    prioritizer: &Prioritizer,
    reader: R,
    source: &str,
    writer: &mut W,
    max_genes: Option<usize>,
) -> HpoResult<usize> {
    let mut patients = 0;
    parser::for_each_line(reader, source, |_, line| {
        let case = parse_patient_line(line)?;
        let genes = prioritizer.prioritize_genes(case.phenotypes())?;
        let limit = max_genes.unwrap_or(genes.len());

        let mut row = case.patient().to_string();
        for gene in genes.iter().take(limit) {
            row.push('\t');
            row.push_str(&gene.to_string());
        }
        writeln!(writer, "{row}").map_err(|_| write_error(source))?;
        patients += 1;
        Ok(())
    })?;
    Ok(patients)
}

/// Evaluates all diagnosed patients in `input` and writes the top `n`
/// percentages to `output`
///
/// `max_rank` limits the number of rows.
///
/// # Errors
///
/// - `input` and `output` are the same file: [`HpoError::InvalidConfiguration`]
/// - a file can't be read or written: [`HpoError::CannotOpenFile`]
/// - see [`Prioritizer::evaluate_reader`]
pub fn evaluate_file<G: GeneResolver, P: AsRef<Path>, Q: AsRef<Path>>(
    prioritizer: &Prioritizer,
    resolver: &G,
    input: P,
    output: Q,
    max_rank: Option<usize>,
) -> HpoResult<RankDistribution> {
    let (input, output) = (input.as_ref(), output.as_ref());
    check_paths(input, output)?;

    let reader = open_input(input)?;
    let distribution =
        prioritizer.evaluate_reader(resolver, reader, &input.display().to_string())?;

    let mut writer = create_output(output)?;
    write_distribution(&distribution, &mut writer, max_rank)?;
    writer.flush().map_err(|_| write_error(output))?;

    info!("Evaluated {} patients into {}", distribution.total(), output.display());
    Ok(distribution)
}

/// Writes the `top <TAB> %` table of a [`RankDistribution`]
///
/// # Errors
///
/// If `writer` fails, [`HpoError::CannotOpenFile`] is returned
///
/// # Examples
///
/// ```
/// use phenorank::batch::write_distribution;
/// use phenorank::evaluation::RankDistribution;
///
/// let mut distribution = RankDistribution::new();
/// distribution.record_rank(1);
/// distribution.record_rank(2);
/// distribution.record_rank(2);
/// distribution.record_miss();
///
/// let mut result = Vec::new();
/// write_distribution(&distribution, &mut result, None).unwrap();
/// assert_eq!(String::from_utf8(result).unwrap(), "top\t%\n1\t25.00\n2\t75.00\n");
/// ```
pub fn write_distribution<W: Write>(
    distribution: &RankDistribution,
    writer: &mut W,
    max_rank: Option<usize>,
) -> HpoResult<()> {
    let last = match max_rank {
        Some(max) => max.min(distribution.max_rank()),
        None => distribution.max_rank(),
    };

    writeln!(writer, "top\t%").map_err(|_| write_error("distribution"))?;
    for n in 1..=last {
        writeln!(writer, "{n}\t{:.2}", distribution.top(n))
            .map_err(|_| write_error("distribution"))?;
    }
    Ok(())
}

fn check_paths(input: &Path, output: &Path) -> HpoResult<()> {
    if canonical_path(input)? == canonical_path(output)? {
        return Err(HpoError::InvalidConfiguration(format!(
            "input [{}] and output [{}] must not be the same file",
            input.display(),
            output.display()
        )));
    }
    Ok(())
}

fn open_input(path: &Path) -> HpoResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|_| HpoError::CannotOpenFile(path.display().to_string()))
}

fn create_output(path: &Path) -> HpoResult<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|_| HpoError::CannotOpenFile(parent.display().to_string()))?;
        }
    }
    File::create(path)
        .map(BufWriter::new)
        .map_err(|_| HpoError::CannotOpenFile(path.display().to_string()))
}

fn write_error<S: AsRef<Path>>(target: S) -> HpoError {
    HpoError::CannotOpenFile(format!("unable to write to {}", target.as_ref().display()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::annotations::NcbiGeneIds;
    use crate::{FrequencyModel, Ontology};
    use std::path::PathBuf;

    fn output_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("phenorank-{}", std::process::id()))
            .join(name)
    }

    fn fixtures() -> (Ontology, FrequencyModel) {
        let ontology = Ontology::from_csv("tests/example_hpo.csv").unwrap();
        let model = FrequencyModel::from_folder(&ontology, &NcbiGeneIds::new(), "tests/cases").unwrap();
        (ontology, model)
    }

    #[test]
    fn prioritize_patients() {
        let (ontology, model) = fixtures();
        let prioritizer = Prioritizer::new(&ontology, &model);
        let output = output_path("prioritized.tsv");

        let patients = prioritize_file(&prioritizer, "tests/patients.tsv", &output, None).unwrap();
        assert_eq!(patients, 2);

        let result = fs::read_to_string(&output).unwrap();
        assert_eq!(
            result,
            "Q1\tNCBI-GeneID:10\tNCBI-GeneID:2125\tNCBI-GeneID:3000\n\
             Q2\tNCBI-GeneID:2125\tNCBI-GeneID:10\tNCBI-GeneID:3000\n"
        );
    }

    #[test]
    fn prioritize_limits_genes() {
        let (ontology, model) = fixtures();
        let prioritizer = Prioritizer::new(&ontology, &model);

        let mut result = Vec::new();
        prioritize_reader(
            &prioritizer,
            "Q2\tHP:0000006\tHP:0012285\n".as_bytes(),
            "inline",
            &mut result,
            Some(1),
        )
        .unwrap();
        assert_eq!(String::from_utf8(result).unwrap(), "Q2\tNCBI-GeneID:2125\n");
    }

    #[test]
    fn same_input_and_output_fails() {
        let (ontology, model) = fixtures();
        let prioritizer = Prioritizer::new(&ontology, &model);

        let res = prioritize_file(
            &prioritizer,
            "tests/patients.tsv",
            "tests/../tests/patients.tsv",
            None,
        );
        assert!(matches!(res, Err(HpoError::InvalidConfiguration(_))));

        let res = evaluate_file(
            &prioritizer,
            &NcbiGeneIds::new(),
            "tests/diagnosed.tsv",
            "./tests/diagnosed.tsv",
            None,
        );
        assert!(matches!(res, Err(HpoError::InvalidConfiguration(_))));

        // the input is left untouched
        let content = fs::read_to_string("tests/patients.tsv").unwrap();
        assert!(content.starts_with("Q1\t"));
    }

    #[test]
    fn evaluate_patients() {
        let (ontology, model) = fixtures();
        let prioritizer = Prioritizer::new(&ontology, &model);
        let output = output_path("evaluation/top.tsv");

        let distribution = evaluate_file(
            &prioritizer,
            &NcbiGeneIds::new(),
            "tests/diagnosed.tsv",
            &output,
            None,
        )
        .unwrap();
        assert_eq!(distribution.total(), 5);

        let result = fs::read_to_string(&output).unwrap();
        assert_eq!(result, "top\t%\n1\t40.00\n2\t40.00\n3\t60.00\n");
    }

    #[test]
    fn evaluation_table_is_limited() {
        let mut distribution = RankDistribution::new();
        distribution.record_rank(5);

        let mut result = Vec::new();
        write_distribution(&distribution, &mut result, Some(2)).unwrap();
        assert_eq!(String::from_utf8(result).unwrap(), "top\t%\n1\t0.00\n2\t0.00\n");

        let mut result = Vec::new();
        write_distribution(&RankDistribution::new(), &mut result, Some(2)).unwrap();
        assert_eq!(String::from_utf8(result).unwrap(), "top\t%\n");
    }

    #[test]
    fn malformed_row_writes_no_output() {
        let (ontology, model) = fixtures();
        let prioritizer = Prioritizer::new(&ontology, &model);
        let input = output_path("malformed/patients.tsv");
        fs::create_dir_all(input.parent().unwrap()).unwrap();
        fs::write(&input, "Q1\tHP:0001250\nQ2\tHP:12\n").unwrap();
        let output = output_path("malformed/result.tsv");

        let res = prioritize_file(&prioritizer, &input, &output, None);
        assert!(matches!(res, Err(HpoError::InvalidInput(_))));
        assert!(!output.exists());
    }

    #[test]
    fn missing_input_fails() {
        let (ontology, model) = fixtures();
        let prioritizer = Prioritizer::new(&ontology, &model);
        let res = prioritize_file(
            &prioritizer,
            "tests/no_patients.tsv",
            output_path("missing.tsv"),
            None,
        );
        assert!(matches!(res, Err(HpoError::CannotOpenFile(_))));
    }
}
