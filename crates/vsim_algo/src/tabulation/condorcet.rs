//! Condorcet family, all read from the shared `DuelMatrix`.
//!
//! - Simple: +1 per strict pairwise win. A Condorcet winner has n-1 wins.
//! - Copeland: +1 per win, 0.5 each on an exact tie. No duel tie-break.
//! - Simpson (minimax): worst weight any opponent gets against the candidate;
//!   ranked ascending.

use vsim_core::{Candidate, CandidateId, VotingRule};

use super::common::{finish_scalar, ids};
use crate::duels::{DuelMatrix, DuelOutcome};
use crate::TabError;

fn require_covered(candidates: &[Candidate], duels: &DuelMatrix) -> Result<(), TabError> {
    match candidates.iter().find(|c| !duels.covers(c.id)) {
        Some(c) => Err(TabError::UnknownCandidate(c.id)),
        None => Ok(()),
    }
}

pub fn condorcet_simple(
    candidates: &mut [Candidate],
    duels: &DuelMatrix,
    tie: Option<&DuelMatrix>,
) -> Result<Vec<CandidateId>, TabError> {
    require_covered(candidates, duels)?;
    let all = ids(candidates);
    let tally: Vec<f64> = all
        .iter()
        .map(|a| all.iter().filter(|b| duels.beats(*a, **b)).count() as f64)
        .collect();
    finish_scalar(VotingRule::CondorcetSimple, candidates, &tally, tie)
}

/// `id` beat every other candidate of the matrix.
pub fn is_condorcet_winner(duels: &DuelMatrix, id: CandidateId) -> bool {
    duels.covers(id) && duels.candidates().iter().all(|o| *o == id || duels.beats(id, *o))
}

pub fn condorcet_copeland(candidates: &mut [Candidate], duels: &DuelMatrix) -> Result<Vec<CandidateId>, TabError> {
    require_covered(candidates, duels)?;
    let all = ids(candidates);
    let mut tally = vec![0.0; all.len()];
    for i in 0..all.len() {
        for j in (i + 1)..all.len() {
            match duels.outcome(all[i], all[j]) {
                DuelOutcome::Wins => tally[i] += 1.0,
                DuelOutcome::Loses => tally[j] += 1.0,
                DuelOutcome::Tie => {
                    tally[i] += 0.5;
                    tally[j] += 0.5;
                }
            }
        }
    }
    // Copeland is already the duel aggregate; tie-break does not apply.
    finish_scalar(VotingRule::CondorcetCopeland, candidates, &tally, None)
}

pub fn condorcet_simpson(
    candidates: &mut [Candidate],
    duels: &DuelMatrix,
    tie: Option<&DuelMatrix>,
) -> Result<Vec<CandidateId>, TabError> {
    require_covered(candidates, duels)?;
    let all = ids(candidates);
    let tally: Vec<f64> = all
        .iter()
        .map(|c| {
            all.iter()
                .filter(|o| *o != c)
                .map(|o| duels.prefers(*o, *c))
                .max()
                .unwrap_or(0) as f64
        })
        .collect();
    finish_scalar(VotingRule::CondorcetSimpson, candidates, &tally, tie)
}
