//! Shared plumbing for the rule modules: id lookup, score-slot writes and
//! the final score ordering (+ optional duel tie-break).

use std::collections::BTreeMap;

use vsim_core::rules::ScoreOrder;
use vsim_core::{Candidate, CandidateId, Elector, VotingRule};

use crate::duels::DuelMatrix;
use crate::ties::break_ties;
use crate::TabError;

/// Candidate id → index into the candidate slice.
pub(crate) struct CandidateIndex(BTreeMap<CandidateId, usize>);

impl CandidateIndex {
    pub(crate) fn new(candidates: &[Candidate]) -> Self {
        Self(candidates.iter().enumerate().map(|(i, c)| (c.id, i)).collect())
    }

    #[inline]
    pub(crate) fn get(&self, id: CandidateId) -> Result<usize, TabError> {
        self.0.get(&id).copied().ok_or(TabError::UnknownCandidate(id))
    }

    #[inline]
    pub(crate) fn find(&self, id: CandidateId) -> Option<usize> {
        self.0.get(&id).copied()
    }
}

pub fn total_weight(electors: &[Elector]) -> u64 {
    electors.iter().map(|e| u64::from(e.weight)).sum()
}

#[inline]
pub(crate) fn weight(e: &Elector) -> f64 {
    f64::from(e.weight)
}

pub(crate) fn ids(candidates: &[Candidate]) -> Vec<CandidateId> {
    candidates.iter().map(|c| c.id).collect()
}

/// Sort `ids` by score in the rule's direction, equal scores by ascending id,
/// then apply the duel tie-break when one is given and the rule allows it.
pub fn order_by_score(
    rule: VotingRule,
    ids: &[CandidateId],
    score: impl Fn(CandidateId) -> f64,
    tie: Option<&DuelMatrix>,
) -> Vec<CandidateId> {
    let mut out = ids.to_vec();
    out.sort_by(|a, b| {
        let by_score = match rule.score_order() {
            ScoreOrder::Descending => score(*b).total_cmp(&score(*a)),
            ScoreOrder::Ascending => score(*a).total_cmp(&score(*b)),
        };
        by_score.then_with(|| a.cmp(b))
    });
    if let Some(duels) = tie {
        if rule.supports_tie_break() {
            break_ties(&mut out, &score, duels);
        }
    }
    out
}

/// Reset and write a scalar slot per candidate, then rank them.
pub(crate) fn finish_scalar(
    rule: VotingRule,
    candidates: &mut [Candidate],
    tally: &[f64],
    tie: Option<&DuelMatrix>,
) -> Result<Vec<CandidateId>, TabError> {
    for (c, v) in candidates.iter_mut().zip(tally) {
        c.reset_score(rule);
        c.set_scalar(rule, *v)?;
    }
    let scores: BTreeMap<CandidateId, f64> = candidates.iter().map(|c| c.id).zip(tally.iter().copied()).collect();
    Ok(order_by_score(rule, &ids(candidates), |id| scores.get(&id).copied().unwrap_or(0.0), tie))
}
