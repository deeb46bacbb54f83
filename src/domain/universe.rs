//! Ticker lists.
//!
//! Symbols come either from a comma-separated config value or from a plain
//! text file with one symbol per line.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::error::DcatraderError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("ticker list is empty")]
    Empty,
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// One symbol per line; surrounding whitespace trimmed, blank lines skipped.
pub fn parse_ticker_lines(content: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    if codes.is_empty() {
        return Err(UniverseError::Empty);
    }
    Ok(codes)
}

pub fn load_ticker_symbols<P: AsRef<Path>>(path: P) -> Result<Vec<String>, DcatraderError> {
    let content = fs::read_to_string(path)?;
    Ok(parse_ticker_lines(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_codes_basic() {
        let result = parse_codes("VOO,QQQ,VTI").unwrap();
        assert_eq!(result, vec!["VOO", "QQQ", "VTI"]);
    }

    #[test]
    fn test_parse_codes_with_whitespace_and_case() {
        let result = parse_codes("  voo , Qqq ,VTI ").unwrap();
        assert_eq!(result, vec!["VOO", "QQQ", "VTI"]);
    }

    #[test]
    fn test_parse_codes_empty_token() {
        let result = parse_codes("VOO,,QQQ");
        assert!(matches!(result, Err(UniverseError::EmptyToken)));
    }

    #[test]
    fn test_parse_codes_duplicate() {
        let result = parse_codes("VOO,QQQ,voo");
        assert!(matches!(result, Err(UniverseError::DuplicateCode(s)) if s == "VOO"));
    }

    #[test]
    fn test_parse_ticker_lines_trims_and_skips_blank() {
        let result = parse_ticker_lines("VOO\n  qqq  \n\n\tVTI\r\n").unwrap();
        assert_eq!(result, vec!["VOO", "QQQ", "VTI"]);
    }

    #[test]
    fn test_parse_ticker_lines_empty() {
        assert!(matches!(
            parse_ticker_lines("\n  \n"),
            Err(UniverseError::Empty)
        ));
    }

    #[test]
    fn test_parse_ticker_lines_duplicate() {
        assert!(matches!(
            parse_ticker_lines("VOO\nvoo\n"),
            Err(UniverseError::DuplicateCode(s)) if s == "VOO"
        ));
    }

    #[test]
    fn test_load_ticker_symbols_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "VOO").unwrap();
        writeln!(file, " msft ").unwrap();
        let result = load_ticker_symbols(file.path()).unwrap();
        assert_eq!(result, vec!["VOO", "MSFT"]);
    }

    #[test]
    fn test_load_ticker_symbols_missing_file() {
        let err = load_ticker_symbols("/nonexistent/stock-list.txt").unwrap_err();
        assert!(matches!(err, DcatraderError::Io(_)));
    }
}
