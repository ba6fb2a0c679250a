// crates/vsim_algo/src/lib.rs
//! Pure election algorithms over `vsim_core` people.
//!
//! - `ranking`: each elector's distance-ordered preference list
//! - `duels`: the weighted pairwise preference matrix
//! - `ties`: duel-based reordering of equal-score runs
//! - `tabulation`: one module per voting rule
//!
//! Every rule resets its score slot on each candidate before accumulating, so
//! re-running a rule never double-counts. Preconditions such as a minimum
//! candidate count are the caller's job.

#![forbid(unsafe_code)]

use thiserror::Error;
use vsim_core::{CandidateId, CoreError};

pub mod duels;
pub mod ranking;
pub mod ties;

pub mod tabulation {
    pub mod common;
    pub mod approval;
    pub mod borda;
    pub mod condorcet;
    pub mod exhaustive_ballot;
    pub mod plurality;
    pub mod veto;

    pub use approval::approval;
    pub use borda::borda;
    pub use condorcet::{condorcet_copeland, condorcet_simple, condorcet_simpson, is_condorcet_winner};
    pub use exhaustive_ballot::exhaustive_ballot;
    pub use plurality::{plurality_one_round, plurality_two_rounds};
    pub use veto::veto;
}

pub use duels::{DuelMatrix, DuelOutcome, DuelRecord};
pub use ranking::{rank, rank_all};
pub use ties::break_ties;

#[derive(Debug, Error, PartialEq)]
pub enum TabError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A ranking or duel record names a candidate outside the current set.
    #[error("unknown candidate {0}")]
    UnknownCandidate(CandidateId),
}

/// Output of one rule application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleResult {
    /// Single ranking, best first.
    OneRound(Vec<CandidateId>),
    /// One ranking per round actually run; later rounds hold fewer candidates.
    Rounds(Vec<Vec<CandidateId>>),
}

impl RuleResult {
    /// Ranking that decides the winner: the only one, or the last round's.
    pub fn final_ranking(&self) -> &[CandidateId] {
        match self {
            RuleResult::OneRound(r) => r,
            RuleResult::Rounds(rounds) => rounds.last().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Top of the final ranking. Condorcet-simple callers must also check
    /// that this candidate beat everyone.
    pub fn leader(&self) -> Option<CandidateId> {
        self.final_ranking().first().copied()
    }

    pub fn round_count(&self) -> usize {
        match self {
            RuleResult::OneRound(_) => 1,
            RuleResult::Rounds(rounds) => rounds.len(),
        }
    }

    pub fn round(&self, round: usize) -> Option<&[CandidateId]> {
        match self {
            RuleResult::OneRound(r) if round == 0 => Some(r),
            RuleResult::OneRound(_) => None,
            RuleResult::Rounds(rounds) => rounds.get(round).map(Vec::as_slice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(raw: u32) -> CandidateId {
        CandidateId::from_raw(raw)
    }

    #[test]
    fn final_ranking_picks_last_round() {
        let r = RuleResult::Rounds(vec![vec![c(1), c(0), c(2)], vec![c(0), c(1)]]);
        assert_eq!(r.final_ranking(), &[c(0), c(1)]);
        assert_eq!(r.leader(), Some(c(0)));
        assert_eq!(r.round_count(), 2);
        assert_eq!(r.round(0), Some(&[c(1), c(0), c(2)][..]));
        assert_eq!(r.round(2), None);
    }

    #[test]
    fn empty_results_have_no_leader() {
        assert_eq!(RuleResult::OneRound(vec![]).leader(), None);
        assert_eq!(RuleResult::Rounds(vec![]).leader(), None);
        assert_eq!(RuleResult::Rounds(vec![]).final_ranking(), &[] as &[CandidateId]);
    }
}
