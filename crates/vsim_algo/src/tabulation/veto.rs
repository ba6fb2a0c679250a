//! Veto: every candidate but the elector's last choice gets its weight.

use vsim_core::{Candidate, CandidateId, Elector, VotingRule};

use super::common::{finish_scalar, weight, CandidateIndex};
use crate::duels::DuelMatrix;
use crate::TabError;

pub fn veto(
    electors: &[Elector],
    candidates: &mut [Candidate],
    tie: Option<&DuelMatrix>,
) -> Result<Vec<CandidateId>, TabError> {
    let index = CandidateIndex::new(candidates);
    let mut tally = vec![0.0; candidates.len()];
    for e in electors {
        if let Some((_, kept)) = e.ranking().split_last() {
            for id in kept {
                tally[index.get(*id)?] += weight(e);
            }
        }
    }
    finish_scalar(VotingRule::Veto, candidates, &tally, tie)
}
