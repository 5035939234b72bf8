use crate::domain::model::{Candidate, Decision};

/// Candidates best-first. The sort is stable, so equal scores keep the order
/// in which the state machine generated them.
pub fn rank_candidates(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

pub fn select_best(candidates: &[Candidate]) -> Decision {
    rank_candidates(candidates)
        .first()
        .copied()
        .map(Decision::from)
        .unwrap_or_else(Decision::unclassified)
}

/// `label:score` pairs joined by commas, in the order given.
pub fn format_evidence(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
