use serde::{Deserialize, Serialize};
use std::fmt;

/// Protein domain family of a hit, taken from the two-character prefix of the
/// profile name (`GAG_...`, `RT_...`, `INT_...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainCode {
    Gag,
    Ap,
    Rt,
    Rh,
    In,
    En,
    Unknown(String),
}

impl DomainCode {
    pub fn from_name(name: &str) -> Self {
        match name.get(..2) {
            Some("GA") => DomainCode::Gag,
            Some("AP") => DomainCode::Ap,
            Some("RT") => DomainCode::Rt,
            Some("RH") => DomainCode::Rh,
            Some("IN") => DomainCode::In,
            Some("EN") => DomainCode::En,
            _ => DomainCode::Unknown(name.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DomainCode::Unknown(_))
    }
}

impl fmt::Display for DomainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainCode::Gag => write!(f, "GAG"),
            DomainCode::Ap => write!(f, "AP"),
            DomainCode::Rt => write!(f, "RT"),
            DomainCode::Rh => write!(f, "RH"),
            DomainCode::In => write!(f, "IN"),
            DomainCode::En => write!(f, "EN"),
            DomainCode::Unknown(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidHit {
    ReversedSpan { start: i64, end: i64 },
    NonFiniteScore,
}

impl fmt::Display for InvalidHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidHit::ReversedSpan { start, end } => {
                write!(f, "start {} is after end {}", start, end)
            }
            InvalidHit::NonFiniteScore => write!(f, "score is not a finite number"),
        }
    }
}

impl std::error::Error for InvalidHit {}

/// One scored domain match on a sequence, in nucleotide coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainHit {
    pub code: DomainCode,
    pub start: i64,
    pub end: i64,
    pub score: f64,
}

impl DomainHit {
    pub fn new(code: DomainCode, start: i64, end: i64, score: f64) -> Result<Self, InvalidHit> {
        if start > end {
            return Err(InvalidHit::ReversedSpan { start, end });
        }
        if !score.is_finite() {
            return Err(InvalidHit::NonFiniteScore);
        }
        Ok(Self {
            code,
            start,
            end,
            score,
        })
    }

    /// Coordinates strictly between `self` and a later hit, saturating at
    /// the `i64` bounds.
    pub fn gap_to(&self, next: &DomainHit) -> i64 {
        next.start.saturating_sub(self.end).saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Superfamily {
    Gypsy,
    Copia,
}

impl Superfamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Superfamily::Gypsy => "Gypsy",
            Superfamily::Copia => "Copia",
        }
    }
}

impl fmt::Display for Superfamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub label: Superfamily,
    pub score: f64,
}

impl Candidate {
    pub fn new(label: Superfamily, score: f64) -> Self {
        Self { label, score }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug 格式保留小數點 (18.0)
        write!(f, "{}:{:?}", self.label, self.score)
    }
}

/// Final call for one sequence. `label == None` is the "no classification"
/// sentinel and always carries a score of -1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub label: Option<Superfamily>,
    pub score: f64,
}

impl Decision {
    pub const UNCLASSIFIED_SCORE: f64 = -1.0;

    pub fn unclassified() -> Self {
        Self {
            label: None,
            score: Self::UNCLASSIFIED_SCORE,
        }
    }

    pub fn label_str(&self) -> &'static str {
        self.label.map(|l| l.as_str()).unwrap_or("")
    }
}

impl From<Candidate> for Decision {
    fn from(candidate: Candidate) -> Self {
        Self {
            label: Some(candidate.label),
            score: candidate.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub id: String,
    pub prior_label: Option<String>,
    pub hits: Vec<DomainHit>,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, prior_label: Option<String>) -> Self {
        Self {
            id: id.into(),
            prior_label,
            hits: Vec::new(),
        }
    }

    pub fn with_hits(mut self, hits: Vec<DomainHit>) -> Self {
        self.hits = hits;
        self
    }

    pub fn add_hit(&mut self, hit: DomainHit) {
        self.hits.push(hit);
    }

    pub fn has_hits(&self) -> bool {
        !self.hits.is_empty()
    }

    /// Hits by ascending start; equal starts keep insertion order.
    pub fn sorted_hits(&self) -> Vec<DomainHit> {
        sort_hits(&self.hits)
    }
}

pub fn sort_hits(hits: &[DomainHit]) -> Vec<DomainHit> {
    let mut sorted = hits.to_vec();
    sorted.sort_by_key(|hit| hit.start);
    sorted
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Agreement {
    Agrees,
    Disagrees,
    NoPrior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceReport {
    pub id: String,
    pub prior_label: Option<String>,
    /// Candidates in selection order (best first).
    pub candidates: Vec<Candidate>,
    pub decision: Decision,
    pub truncated: bool,
}

impl SequenceReport {
    /// A prior label only counts against us when we made a different call;
    /// an unclassified sequence with a prior label is not a disagreement.
    pub fn agreement(&self) -> Agreement {
        match (&self.prior_label, self.decision.label) {
            (None, _) => Agreement::NoPrior,
            (Some(prior), Some(label)) if prior.as_str() != label.as_str() => {
                Agreement::Disagrees
            }
            (Some(_), _) => Agreement::Agrees,
        }
    }
}

/// Rows of the results table.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultRow {
    Disagreement {
        id: String,
        prior: String,
        label: Superfamily,
        score: f64,
    },
    NoPrior {
        id: String,
        label: Superfamily,
    },
}

impl ResultRow {
    pub fn from_report(report: &SequenceReport) -> Option<Self> {
        let label = report.decision.label?;
        match report.agreement() {
            Agreement::Disagrees => Some(ResultRow::Disagreement {
                id: report.id.clone(),
                prior: report.prior_label.clone().unwrap_or_default(),
                label,
                score: report.decision.score,
            }),
            Agreement::NoPrior => Some(ResultRow::NoPrior {
                id: report.id.clone(),
                label,
            }),
            Agreement::Agrees => None,
        }
    }

    pub fn fields(&self) -> Vec<String> {
        match self {
            ResultRow::Disagreement {
                id,
                prior,
                label,
                score,
            } => vec![
                id.clone(),
                prior.clone(),
                label.to_string(),
                format!("{:?}", score),
            ],
            ResultRow::NoPrior { id, label } => vec![id.clone(), label.to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub job_name: String,
    pub sequences_loaded: usize,
    pub sequences_classified: usize,
    pub gypsy: usize,
    pub copia: usize,
    pub unclassified: usize,
    pub successes: usize,
    pub errors: usize,
    pub no_prior: usize,
    pub skipped_hit_lines: usize,
    pub dropped_hits: usize,
    pub truncated: usize,
}

impl RunSummary {
    pub fn tally(&mut self, report: &SequenceReport) {
        self.sequences_classified += 1;
        match report.decision.label {
            Some(Superfamily::Gypsy) => self.gypsy += 1,
            Some(Superfamily::Copia) => self.copia += 1,
            None => self.unclassified += 1,
        }
        match report.agreement() {
            Agreement::Agrees => self.successes += 1,
            Agreement::Disagrees => self.errors += 1,
            Agreement::NoPrior => self.no_prior += 1,
        }
        if report.truncated {
            self.truncated += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(code: &str, start: i64, end: i64, score: f64) -> DomainHit {
        DomainHit::new(DomainCode::from_name(code), start, end, score).unwrap()
    }

    #[test]
    fn test_domain_code_from_profile_prefix() {
        assert_eq!(DomainCode::from_name("GAG"), DomainCode::Gag);
        assert_eq!(DomainCode::from_name("GAG_pre-integrs"), DomainCode::Gag);
        assert_eq!(DomainCode::from_name("INT_core"), DomainCode::In);
        assert_eq!(DomainCode::from_name("EN"), DomainCode::En);
        assert_eq!(
            DomainCode::from_name("Chromo"),
            DomainCode::Unknown("Chromo".to_string())
        );
        assert!(!DomainCode::from_name("X").is_known());
    }

    #[test]
    fn test_domain_hit_rejects_reversed_span() {
        let err = DomainHit::new(DomainCode::Rt, 50, 10, 1.0).unwrap_err();
        assert_eq!(err, InvalidHit::ReversedSpan { start: 50, end: 10 });
        assert!(DomainHit::new(DomainCode::Rt, 10, 10, f64::NAN).is_err());
    }

    #[test]
    fn test_gap_counts_intervening_coordinates() {
        let a = hit("AP", 101, 200, 5.0);
        assert_eq!(a.gap_to(&hit("RT", 1001, 1050, 7.0)), 800);
        assert_eq!(hit("GAG", 0, 100, 1.0).gap_to(&a), 0);
    }

    #[test]
    fn test_sorted_hits_is_stable_on_equal_start() {
        let record = SequenceRecord::new("seq1", None).with_hits(vec![
            hit("RT", 500, 600, 1.0),
            hit("RH", 100, 200, 2.0),
            hit("IN", 100, 150, 3.0),
        ]);
        let sorted = record.sorted_hits();
        assert_eq!(sorted[0].code, DomainCode::Rh);
        assert_eq!(sorted[1].code, DomainCode::In);
        assert_eq!(sorted[2].code, DomainCode::Rt);
    }

    #[test]
    fn test_candidate_display_keeps_decimal() {
        assert_eq!(Candidate::new(Superfamily::Gypsy, 18.0).to_string(), "Gypsy:18.0");
        assert_eq!(Candidate::new(Superfamily::Copia, 2.5).to_string(), "Copia:2.5");
    }

    #[test]
    fn test_agreement_rules() {
        let mut report = SequenceReport {
            id: "s".to_string(),
            prior_label: Some("Gypsy".to_string()),
            candidates: vec![],
            decision: Decision::unclassified(),
            truncated: false,
        };
        assert_eq!(report.agreement(), Agreement::Agrees);
        assert_eq!(ResultRow::from_report(&report), None);

        report.decision = Candidate::new(Superfamily::Copia, 4.0).into();
        assert_eq!(report.agreement(), Agreement::Disagrees);
        assert_eq!(
            ResultRow::from_report(&report).unwrap().fields(),
            vec!["s", "Gypsy", "Copia", "4.0"]
        );

        report.prior_label = None;
        assert_eq!(report.agreement(), Agreement::NoPrior);
        assert_eq!(
            ResultRow::from_report(&report).unwrap().fields(),
            vec!["s", "Copia"]
        );
    }

    #[test]
    fn test_summary_tally() {
        let mut summary = RunSummary::default();
        summary.tally(&SequenceReport {
            id: "a".to_string(),
            prior_label: Some("Copia".to_string()),
            candidates: vec![Candidate::new(Superfamily::Gypsy, 3.0)],
            decision: Candidate::new(Superfamily::Gypsy, 3.0).into(),
            truncated: false,
        });
        summary.tally(&SequenceReport {
            id: "b".to_string(),
            prior_label: None,
            candidates: vec![],
            decision: Decision::unclassified(),
            truncated: false,
        });
        assert_eq!(summary.sequences_classified, 2);
        assert_eq!(summary.gypsy, 1);
        assert_eq!(summary.unclassified, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.no_prior, 1);
    }
}
