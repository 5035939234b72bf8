use crate::core::selector::{rank_candidates, select_best};
use crate::core::state_machine::StateMachine;
use crate::core::transitions::GapThresholds;
use crate::domain::model::{
    sort_hits, Candidate, Decision, DomainHit, SequenceRecord, SequenceReport,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub gaps: GapThresholds,
    /// Stop enumerating a sequence after this many candidates.
    pub max_candidates: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Candidates in selection order, best first.
    pub candidates: Vec<Candidate>,
    pub decision: Decision,
    pub truncated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&self, hits: &[DomainHit]) -> Classification {
        self.classify_ordered(&sort_hits(hits))
    }

    /// `ordered` must already be sorted by start coordinate.
    fn classify_ordered(&self, ordered: &[DomainHit]) -> Classification {
        let enumeration = StateMachine::new(ordered, self.config.gaps)
            .with_max_candidates(self.config.max_candidates)
            .run();

        let decision = select_best(&enumeration.candidates);
        Classification {
            candidates: rank_candidates(&enumeration.candidates),
            decision,
            truncated: enumeration.truncated,
        }
    }

    pub fn classify_record(&self, record: &SequenceRecord) -> SequenceReport {
        let classification = self.classify_ordered(&record.sorted_hits());
        if classification.truncated {
            tracing::warn!(
                "{}: enumeration stopped after {} candidates",
                record.id,
                classification.candidates.len()
            );
        }

        SequenceReport {
            id: record.id.clone(),
            prior_label: record.prior_label.clone(),
            candidates: classification.candidates,
            decision: classification.decision,
            truncated: classification.truncated,
        }
    }

    /// Classifies every record that has hits, keeping input order. Records
    /// without hits are left out of the result.
    pub fn classify_records(
        &self,
        records: &[SequenceRecord],
        parallel: bool,
    ) -> Vec<SequenceReport> {
        if parallel {
            records
                .par_iter()
                .filter(|r| r.has_hits())
                .map(|r| self.classify_record(r))
                .collect()
        } else {
            records
                .iter()
                .filter(|r| r.has_hits())
                .map(|r| self.classify_record(r))
                .collect()
        }
    }
}

/// Classifies with the default gap thresholds and no candidate limit.
pub fn classify(hits: &[DomainHit]) -> Classification {
    Classifier::default().classify(hits)
}
