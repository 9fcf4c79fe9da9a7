//! Parsing the ontology table and the tab separated patient case files

use std::io::BufRead;

use crate::{HpoError, HpoResult};

pub mod cases;
/// Module to parse the ontology table
pub(crate) mod hp_csv;

/// Calls `parse_line` for every non-blank line of `reader`
///
/// The line number (starting at 1) is passed along with the line.
/// Errors of [`HpoError::InvalidInput`] are extended with the
/// line number and the `source` name.
pub(crate) fn for_each_line<R, F>(reader: R, source: &str, mut parse_line: F) -> HpoResult<()>
where
    R: BufRead,
    F: FnMut(usize, &str) -> HpoResult<()>,
{
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|_| {
            HpoError::CannotOpenFile(format!("{source}: unable to read line {line_no}"))
        })?;
        if line.trim().is_empty() {
            continue;
        }
        parse_line(line_no, &line).map_err(|err| match err {
            HpoError::InvalidInput(msg) => {
                HpoError::InvalidInput(format!("{msg} (line {line_no} of {source})"))
            }
            other => other,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blank_lines_are_skipped() {
        let data = "a\n\n  \nb\n".as_bytes();
        let mut seen = Vec::new();
        for_each_line(data, "test", |line_no, line| {
            seen.push((line_no, line.to_string()));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![(1, "a".to_string()), (4, "b".to_string())]);
    }

    #[test]
    fn errors_contain_the_location() {
        let data = "a\nb\n".as_bytes();
        let err = for_each_line(data, "cases.tsv", |_, line| {
            if line == "b" {
                Err(HpoError::InvalidInput("bad row".to_string()))
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input data: bad row (line 2 of cases.tsv)"
        );
    }
}
