//! Reader for HMMER per-domain tables (`hmmsearch --domtblout`) run against
//! translated ORFs.
//!
//! Each target is an ORF whose description carries its nucleotide location
//! (`contig:1200-3400`), so envelope coordinates on the protein profile are
//! converted back to nucleotide coordinates on the source sequence.

use crate::domain::model::{DomainCode, DomainHit, InvalidHit};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

const TARGET_FIELD: usize = 0;
const QUERY_FIELD: usize = 3;
const DOMAIN_SCORE_FIELD: usize = 13;
const ENV_FROM_FIELD: usize = 19;
const ENV_TO_FIELD: usize = 20;
const MIN_FIELDS: usize = 22;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HitLineError {
    #[error("expected at least 22 fields, found {0}")]
    TooFewFields(usize),

    #[error("no ORF offset (':<start>-') in '{0}'")]
    MissingOffset(String),

    #[error("field {field} is not a number: '{value}'")]
    NotANumber { field: usize, value: String },

    #[error("envelope {env_from}-{env_to} at offset {offset} is out of coordinate range")]
    CoordinateOverflow {
        env_from: i64,
        env_to: i64,
        offset: i64,
    },

    #[error("line is not valid UTF-8 text")]
    NotText,

    #[error("invalid hit: {0}")]
    InvalidHit(#[from] InvalidHit),
}

/// A hit attributed to a sequence id, before it is attached to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHit {
    pub sequence_id: String,
    pub profile: String,
    pub hit: DomainHit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineDiagnostic {
    pub line_number: usize,
    pub line: String,
    pub error: HitLineError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitTable {
    pub hits: Vec<ParsedHit>,
    pub diagnostics: Vec<LineDiagnostic>,
}

fn offset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r":(\d+)-").expect("valid ORF offset pattern"))
}

/// Sequence id for an ORF name: everything before the first `|`.
pub fn base_sequence_id(name: &str) -> &str {
    name.split('|').next().unwrap_or(name)
}

/// Profile-relative envelope to nucleotide coordinates; `None` when the
/// result does not fit in an `i64`.
pub fn to_nucleotide_span(env_from: i64, env_to: i64, offset: i64) -> Option<(i64, i64)> {
    let start = env_from.checked_mul(3)?.checked_sub(2)?.checked_add(offset)?;
    let end = env_to.checked_mul(3)?.checked_sub(5)?.checked_add(offset)?;
    Some((start, end))
}

fn number<T: std::str::FromStr>(fields: &[&str], index: usize) -> Result<T, HitLineError> {
    fields[index]
        .parse()
        .map_err(|_| HitLineError::NotANumber {
            field: index,
            value: fields[index].to_string(),
        })
}

/// Returns `Ok(None)` for comments and blank lines.
pub fn parse_line(line: &str) -> Result<Option<ParsedHit>, HitLineError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.first() {
        None => return Ok(None),
        Some(first) if first.starts_with('#') => return Ok(None),
        Some(_) => {}
    }
    if fields.len() < MIN_FIELDS {
        return Err(HitLineError::TooFewFields(fields.len()));
    }

    let description = fields[fields.len() - 1];
    let offset: i64 = offset_pattern()
        .captures(description)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| HitLineError::MissingOffset(description.to_string()))?;

    let env_from: i64 = number(&fields, ENV_FROM_FIELD)?;
    let env_to: i64 = number(&fields, ENV_TO_FIELD)?;
    let score: f64 = number(&fields, DOMAIN_SCORE_FIELD)?;
    let (start, end) = to_nucleotide_span(env_from, env_to, offset).ok_or(
        HitLineError::CoordinateOverflow {
            env_from,
            env_to,
            offset,
        },
    )?;

    let profile = fields[QUERY_FIELD].to_string();
    let hit = DomainHit::new(DomainCode::from_name(&profile), start, end, score)?;

    Ok(Some(ParsedHit {
        sequence_id: base_sequence_id(fields[TARGET_FIELD]).to_string(),
        profile,
        hit,
    }))
}

/// Parses a whole table; bad lines, including ones that are not UTF-8, are
/// reported and skipped.
pub fn parse_hit_table(content: &[u8]) -> HitTable {
    let mut table = HitTable::default();

    for (index, raw) in content.split(|b| *b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let parsed = std::str::from_utf8(raw)
            .map_err(|_| HitLineError::NotText)
            .and_then(parse_line);
        match parsed {
            Ok(Some(parsed)) => table.hits.push(parsed),
            Ok(None) => {}
            Err(error) => {
                tracing::warn!("Could not parse line {}: {}", index + 1, error);
                table.diagnostics.push(LineDiagnostic {
                    line_number: index + 1,
                    line: String::from_utf8_lossy(raw).into_owned(),
                    error,
                });
            }
        }
    }

    let unknown = table
        .hits
        .iter()
        .filter(|parsed| !parsed.hit.code.is_known())
        .count();
    tracing::debug!(
        "Parsed {} hits ({} with an unrecognized profile), skipped {} lines",
        table.hits.len(),
        unknown,
        table.diagnostics.len()
    );
    table
}
