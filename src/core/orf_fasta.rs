use crate::core::hmm_hits::{base_sequence_id, ParsedHit};
use crate::domain::model::SequenceRecord;
use crate::utils::error::{ClassifError, Result};
use bio::io::fasta;
use std::collections::HashMap;

/// Records keyed by sequence id, in the order they first appear in the ORF
/// file. Several ORFs of one element share a record.
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    records: Vec<SequenceRecord>,
    index: HashMap<String, usize>,
}

impl SequenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: SequenceRecord) -> bool {
        if self.index.contains_key(&record.id) {
            return false;
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    /// Appends the hit to its sequence; gives it back if the id is unknown.
    pub fn attach(&mut self, parsed: ParsedHit) -> std::result::Result<(), ParsedHit> {
        match self.index.get(&parsed.sequence_id) {
            Some(&position) => {
                self.records[position].add_hit(parsed.hit);
                Ok(())
            }
            None => Err(parsed),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<SequenceRecord> {
        self.records
    }
}

/// Prior label: first non-empty tab-separated field of the header description.
pub fn prior_label(description: Option<&str>) -> Option<String> {
    description?
        .split('\t')
        .map(str::trim)
        .find(|field| !field.is_empty())
        .map(String::from)
}

/// Reads ORF FASTA content produced upstream (`>contig|orf_1<TAB>Gypsy`).
pub fn read_orf_records(content: &[u8], source: &str) -> Result<SequenceSet> {
    let reader = fasta::Reader::new(content);
    let mut set = SequenceSet::new();

    for result in reader.records() {
        let record = result.map_err(|e| ClassifError::FastaError {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        let id = base_sequence_id(record.id());
        if id.is_empty() {
            tracing::warn!("{}: skipping FASTA record with empty id", source);
            continue;
        }
        set.insert(SequenceRecord::new(id, prior_label(record.desc())));
    }

    tracing::debug!("Loaded {} sequences from {}", set.len(), source);
    Ok(set)
}
