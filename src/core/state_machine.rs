use crate::core::transitions::{transition, GapThresholds, State, Target};
use crate::domain::model::{Candidate, DomainHit, Superfamily};

/// Every candidate produced for one hit list, in generation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enumeration {
    pub candidates: Vec<Candidate>,
    /// Set when `max_candidates` stopped the search early.
    pub truncated: bool,
}

/// Depth-first walk over all order-preserving chains of hits allowed by the
/// transition table. Each complete chain contributes one candidate scored by
/// the sum of its hits.
pub struct StateMachine<'a> {
    hits: &'a [DomainHit],
    gaps: GapThresholds,
    max_candidates: Option<usize>,
    candidates: Vec<Candidate>,
    truncated: bool,
}

impl<'a> StateMachine<'a> {
    /// `hits` must already be ordered by start coordinate.
    pub fn new(hits: &'a [DomainHit], gaps: GapThresholds) -> Self {
        Self {
            hits,
            gaps,
            max_candidates: None,
            candidates: Vec::new(),
            truncated: false,
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: Option<usize>) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn run(mut self) -> Enumeration {
        let hits = self.hits;
        for (index, hit) in hits.iter().enumerate() {
            if self.truncated {
                break;
            }
            if let Some(Target::Enter(state)) =
                transition(State::Start, &hit.code).map(|t| t.target)
            {
                self.walk(index, state, 0.0, hit.score);
            }
        }

        Enumeration {
            candidates: self.candidates,
            truncated: self.truncated,
        }
    }

    /// `at` is the hit that brought the path into `state`; `cumulative`
    /// includes its score, `base` is the score before it was added.
    fn walk(&mut self, at: usize, state: State, base: f64, cumulative: f64) {
        let hits = self.hits;
        let current = &hits[at];

        for (offset, next) in hits[at + 1..].iter().enumerate() {
            if self.truncated {
                return;
            }
            let Some(rule) = transition(state, &next.code) else {
                continue;
            };
            // 超出距離只略過此 hit，繼續往後掃描
            if !self.gaps.allows(rule.gap, current, next) {
                continue;
            }
            let score = cumulative + next.score;
            match rule.target {
                Target::Enter(next_state) => {
                    self.walk(at + 1 + offset, next_state, cumulative, score)
                }
                Target::Emit(label) => self.emit(label, score),
            }
        }

        if let Some(label) = state.fallback_label() {
            self.emit(label, base);
        }
    }

    fn emit(&mut self, label: Superfamily, score: f64) {
        if let Some(max) = self.max_candidates {
            if self.candidates.len() >= max {
                self.truncated = true;
                return;
            }
        }
        self.candidates.push(Candidate::new(label, score));
    }
}

pub fn enumerate_candidates(hits: &[DomainHit], gaps: GapThresholds) -> Vec<Candidate> {
    StateMachine::new(hits, gaps).run().candidates
}
