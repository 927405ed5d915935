//! Reading the list of logins from the input CSV.

use crate::Result;
use camino::Utf8Path;
use csv::ReaderBuilder;
use ohno::{EnrichableExt, IntoAppError, bail};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;

/// Column holding the login in the default input layout.
pub const DEFAULT_LOGIN_COLUMN: &str = "contributor_login";

/// Read the unique logins found in `column` of the CSV file at `path`.
pub fn read_identifiers(path: &Utf8Path, column: &str) -> Result<Vec<String>> {
    let file = File::open(path).into_app_err_with(|| format!("unable to open input file '{path}'"))?;
    parse_identifiers(file, column).map_err(|e| e.enrich_with(|| format!("reading input file '{path}'")))
}

/// Collect the unique, non-blank values of `column`, in first-seen order.
pub fn parse_identifiers(reader: impl Read, column: &str) -> Result<Vec<String>> {
    let mut csv_reader = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);

    let headers = csv_reader.headers().into_app_err("unable to read the CSV header row")?;
    let Some(index) = headers.iter().position(|h| h.trim() == column) else {
        bail!("input has no '{column}' column");
    };

    let mut seen = HashSet::new();
    let mut identifiers = Vec::new();

    for record in csv_reader.records() {
        let record = record.into_app_err("malformed CSV record")?;
        let Some(login) = record.get(index).map(str::trim) else {
            continue;
        };

        if !login.is_empty() && seen.insert(login.to_string()) {
            identifiers.push(login.to_string());
        }
    }

    Ok(identifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deduplicates_in_first_seen_order() {
        let csv = "repo,contributor_login,commits\nr1,alice,3\nr2,bob,1\nr3,alice,7\nr4,carol,2\n";
        let ids = parse_identifiers(csv.as_bytes(), DEFAULT_LOGIN_COLUMN).unwrap();
        assert_eq!(ids, ["alice", "bob", "carol"]);
    }

    #[test]
    fn test_parse_skips_blank_values_and_lines() {
        let csv = "contributor_login\n alice \n\n   \nbob\n";
        let ids = parse_identifiers(csv.as_bytes(), DEFAULT_LOGIN_COLUMN).unwrap();
        assert_eq!(ids, ["alice", "bob"]);
    }

    #[test]
    fn test_parse_short_rows_are_skipped() {
        let csv = "repo,contributor_login\nr1\nr2,dave\n";
        let ids = parse_identifiers(csv.as_bytes(), DEFAULT_LOGIN_COLUMN).unwrap();
        assert_eq!(ids, ["dave"]);
    }

    #[test]
    fn test_parse_custom_column() {
        let csv = "login,name\nerin,Erin\nfrank,Frank\n";
        let ids = parse_identifiers(csv.as_bytes(), "login").unwrap();
        assert_eq!(ids, ["erin", "frank"]);
    }

    #[test]
    fn test_parse_missing_column() {
        let csv = "login,name\nerin,Erin\n";
        let err = parse_identifiers(csv.as_bytes(), DEFAULT_LOGIN_COLUMN).unwrap_err();
        assert!(format!("{err:#}").contains("contributor_login"));
    }

    #[test]
    fn test_parse_header_only() {
        let ids = parse_identifiers("contributor_login\n".as_bytes(), DEFAULT_LOGIN_COLUMN).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("nope.csv")).unwrap();
        assert!(read_identifiers(&path, DEFAULT_LOGIN_COLUMN).is_err());
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("in.csv")).unwrap();
        std::fs::write(&path, "contributor_login\nalice\nalice\n").unwrap();
        assert_eq!(read_identifiers(&path, DEFAULT_LOGIN_COLUMN).unwrap(), ["alice"]);
    }
}
