//! Domain-adjacency rules for LTR retrotransposon superfamilies.
//!
//! Gypsy elements carry their domains in the order GAG-AP-RT-RH-IN(-EN) while
//! Copia elements place the integrase before reverse transcriptase:
//! GAG-AP-IN-RT-RH. The state of a path is the last domain type matched; each
//! row of [`TRANSITIONS`] says which next domain may follow, how far away it
//! may be, and whether it continues the path or closes it with a label.

use crate::domain::model::{DomainCode, DomainHit, Superfamily};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Start,
    Gag,
    Ap,
    Rt,
    Rh,
    Int,
    EnBranch,
    IntRt,
}

impl State {
    /// Fallback states emit their label even when no closing domain is found.
    pub fn fallback_label(&self) -> Option<Superfamily> {
        match self {
            State::EnBranch => Some(Superfamily::Gypsy),
            State::IntRt => Some(Superfamily::Copia),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapRule {
    Unbounded,
    AfterProtease,
    Downstream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Enter(State),
    Emit(Superfamily),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: State,
    pub code: DomainCode,
    pub gap: GapRule,
    pub target: Target,
}

const fn row(from: State, code: DomainCode, gap: GapRule, target: Target) -> Transition {
    Transition {
        from,
        code,
        gap,
        target,
    }
}

use GapRule::{AfterProtease, Downstream, Unbounded};
use Target::{Emit, Enter};

pub static TRANSITIONS: [Transition; 19] = [
    row(State::Start, DomainCode::Gag, Unbounded, Enter(State::Gag)),
    row(State::Start, DomainCode::Ap, Unbounded, Enter(State::Ap)),
    row(State::Start, DomainCode::Rt, Unbounded, Enter(State::Rt)),
    row(State::Start, DomainCode::Rh, Unbounded, Enter(State::Rh)),
    row(State::Start, DomainCode::In, Unbounded, Enter(State::Int)),
    // GAG 之後不限距離
    row(State::Gag, DomainCode::Ap, Unbounded, Enter(State::Ap)),
    row(State::Gag, DomainCode::Rt, Unbounded, Enter(State::Rt)),
    row(State::Gag, DomainCode::Rh, Unbounded, Enter(State::Rh)),
    row(State::Gag, DomainCode::In, Unbounded, Enter(State::Int)),
    row(State::Ap, DomainCode::Rt, AfterProtease, Enter(State::Rt)),
    row(State::Ap, DomainCode::Rh, AfterProtease, Enter(State::Rh)),
    row(State::Ap, DomainCode::In, AfterProtease, Enter(State::Int)),
    row(State::Rt, DomainCode::Rh, Downstream, Enter(State::Rh)),
    row(State::Rt, DomainCode::In, Downstream, Enter(State::EnBranch)),
    row(State::Rh, DomainCode::In, Downstream, Enter(State::EnBranch)),
    row(State::Int, DomainCode::Rt, Downstream, Enter(State::IntRt)),
    row(State::Int, DomainCode::Rh, Downstream, Emit(Superfamily::Copia)),
    row(State::EnBranch, DomainCode::En, Downstream, Emit(Superfamily::Gypsy)),
    row(State::IntRt, DomainCode::Rh, Downstream, Emit(Superfamily::Copia)),
];

pub fn transition(from: State, code: &DomainCode) -> Option<&'static Transition> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == from && t.code == *code)
}

/// Maximum number of intervening coordinates allowed between consecutive hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapThresholds {
    pub after_protease: i64,
    pub downstream: i64,
}

impl Default for GapThresholds {
    fn default() -> Self {
        Self {
            after_protease: 800,
            downstream: 2000,
        }
    }
}

impl GapThresholds {
    pub fn limit(&self, rule: GapRule) -> Option<i64> {
        match rule {
            GapRule::Unbounded => None,
            GapRule::AfterProtease => Some(self.after_protease),
            GapRule::Downstream => Some(self.downstream),
        }
    }

    pub fn allows(&self, rule: GapRule, current: &DomainHit, next: &DomainHit) -> bool {
        match self.limit(rule) {
            None => true,
            Some(max_gap) => current.gap_to(next) <= max_gap,
        }
    }
}
