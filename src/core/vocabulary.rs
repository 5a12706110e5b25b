//! Keyword vocabulary loaded from a tabular (CSV/TSV) source.
//!
//! Each row's term cell is decoded in two stages: a list literal such as
//! `["coverage", 'co-pay']` is tried first, and any decode error falls back
//! to splitting the cell on commas. Terms are trimmed and lowercased; empty
//! terms are dropped.

use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

pub const DEFAULT_TERM_COLUMN: &str = "keywords";

/// Unordered set of lowercase, trimmed terms. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: HashSet<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::new();
        vocabulary.extend(terms);
        vocabulary
    }

    pub fn extend<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() {
                self.terms.insert(term);
            }
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

/// Loads the vocabulary from a CSV (or `.tsv`) file.
///
/// Never fails: a missing or unreadable file yields an empty vocabulary and
/// malformed rows are skipped, each with a warning.
pub fn load_vocabulary<P: AsRef<Path>>(path: P, column: &str) -> Vocabulary {
    let path = path.as_ref();

    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(
                "⚠️ Vocabulary source {} unavailable ({}), continuing with an empty vocabulary",
                path.display(),
                e
            );
            return Vocabulary::new();
        }
    };

    let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };

    match read_vocabulary(file, column, delimiter) {
        Ok(vocabulary) => {
            tracing::info!(
                "📚 Loaded {} vocabulary terms from {}",
                vocabulary.len(),
                path.display()
            );
            vocabulary
        }
        Err(e) => {
            tracing::warn!(
                "⚠️ Failed to read vocabulary from {}: {}, continuing with an empty vocabulary",
                path.display(),
                e
            );
            Vocabulary::new()
        }
    }
}

/// Reads terms from `reader`. Fails only when the header row cannot be read.
pub fn read_vocabulary<R: Read>(reader: R, column: &str, delimiter: u8) -> Result<Vocabulary> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column_index = match headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(column))
    {
        Some(index) => index,
        None if headers.is_empty() => {
            return Err(EtlError::ProcessingError {
                message: "vocabulary source has no header row".to_string(),
            })
        }
        None => {
            tracing::warn!(
                "Vocabulary column '{}' not found in headers {:?}, using the first column",
                column,
                headers.iter().collect::<Vec<_>>()
            );
            0
        }
    };

    let mut vocabulary = Vocabulary::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping malformed vocabulary row {}: {}", row + 1, e);
                continue;
            }
        };

        match record.get(column_index) {
            Some(cell) => vocabulary.extend(parse_terms(cell)),
            None => tracing::debug!("Vocabulary row {} has no term column", row + 1),
        }
    }

    Ok(vocabulary)
}

/// Decodes one cell: list literal first, comma split on any decode error.
pub fn parse_terms(cell: &str) -> Vec<String> {
    match parse_list_literal(cell) {
        Ok(items) => items,
        Err(_) => split_delimited(cell),
    }
}

pub fn split_delimited(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    NotAList,
    UnterminatedString,
    UnexpectedChar(char),
}

/// Parses a bracketed list of quoted strings. Both quote styles are
/// accepted, as are backslash escapes and a trailing comma.
pub fn parse_list_literal(cell: &str) -> std::result::Result<Vec<String>, LiteralError> {
    let inner = cell
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(LiteralError::NotAList)?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();
    let mut expect_item = true;

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => continue,
            '\'' | '"' if expect_item => {
                let quote = c;
                let mut item = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some('n') => item.push('\n'),
                            Some('t') => item.push('\t'),
                            Some(escaped) => item.push(escaped),
                            None => return Err(LiteralError::UnterminatedString),
                        },
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        c => item.push(c),
                    }
                }
                if !closed {
                    return Err(LiteralError::UnterminatedString);
                }
                items.push(item);
                expect_item = false;
            }
            ',' if !expect_item => expect_item = true,
            other => return Err(LiteralError::UnexpectedChar(other)),
        }
    }

    Ok(items)
}
