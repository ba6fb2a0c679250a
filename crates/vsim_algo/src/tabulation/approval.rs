//! Approval: each elector approves candidates up to its approval radius,
//! `distance(top choice) + gap`, scanning its own distance ranking from the
//! top and stopping at the first candidate outside the radius.

use vsim_core::{Candidate, CandidateId, Elector, VotingRule};

use super::common::{finish_scalar, weight, CandidateIndex};
use crate::duels::DuelMatrix;
use crate::TabError;

/// Candidates `e` approves, best first.
pub fn approved_by(e: &Elector, candidates: &[Candidate], gap: f64) -> Result<Vec<CandidateId>, TabError> {
    let index = CandidateIndex::new(candidates);
    approved_with(e, candidates, &index, gap)
}

fn approved_with(
    e: &Elector,
    candidates: &[Candidate],
    index: &CandidateIndex,
    gap: f64,
) -> Result<Vec<CandidateId>, TabError> {
    let Some(top) = e.top_choice() else { return Ok(Vec::new()) };
    let radius = e.position.distance(&candidates[index.get(top)?].position) + gap;
    let mut out = Vec::new();
    for id in e.ranking() {
        let d = e.position.distance(&candidates[index.get(*id)?].position);
        if d > radius {
            break;
        }
        out.push(*id);
    }
    Ok(out)
}

pub fn approval(
    electors: &[Elector],
    candidates: &mut [Candidate],
    gap: f64,
    tie: Option<&DuelMatrix>,
) -> Result<Vec<CandidateId>, TabError> {
    let index = CandidateIndex::new(candidates);
    let mut tally = vec![0.0; candidates.len()];
    for e in electors {
        for id in approved_with(e, candidates, &index, gap)? {
            tally[index.get(id)?] += weight(e);
        }
    }
    finish_scalar(VotingRule::Approval, candidates, &tally, tie)
}
