// crates/vsim_algo/src/tabulation/plurality.rs
//
// Plurality, one and two rounds. Each elector's weight goes to its top choice.
// The two-round variant stops after round 0 when the leader holds a strict
// absolute majority (score > total weight / 2); otherwise the top two of the
// round-0 ranking meet in round 1, where each elector backs whichever of the
// two it ranks higher. Round-1 scores of the eliminated candidates are 0.

use std::collections::BTreeMap;

use vsim_core::{Candidate, CandidateId, Elector, VotingRule};

use super::common::{finish_scalar, ids, order_by_score, total_weight, weight, CandidateIndex};
use crate::duels::DuelMatrix;
use crate::TabError;

pub fn plurality_one_round(
    electors: &[Elector],
    candidates: &mut [Candidate],
    tie: Option<&DuelMatrix>,
) -> Result<Vec<CandidateId>, TabError> {
    let index = CandidateIndex::new(candidates);
    let mut tally = vec![0.0; candidates.len()];
    for e in electors {
        if let Some(top) = e.top_choice() {
            tally[index.get(top)?] += weight(e);
        }
    }
    finish_scalar(VotingRule::PluralityOneRound, candidates, &tally, tie)
}

pub fn plurality_two_rounds(
    electors: &[Elector],
    candidates: &mut [Candidate],
    tie: Option<&DuelMatrix>,
) -> Result<Vec<Vec<CandidateId>>, TabError> {
    let rule = VotingRule::PluralityTwoRounds;
    let index = CandidateIndex::new(candidates);
    let half = total_weight(electors) as f64 / 2.0;

    // ---- round 0 ----
    let mut first = vec![0.0; candidates.len()];
    for e in electors {
        if let Some(top) = e.top_choice() {
            first[index.get(top)?] += weight(e);
        }
    }
    for (c, v) in candidates.iter_mut().zip(&first) {
        c.reset_score(rule);
        c.push_round(rule, *v)?;
    }
    let all = ids(candidates);
    let scores: BTreeMap<CandidateId, f64> = all.iter().copied().zip(first.iter().copied()).collect();
    let round0 = order_by_score(rule, &all, |id| scores.get(&id).copied().unwrap_or(0.0), tie);

    let finalists = match round0.as_slice() {
        [a, b, ..] if scores.get(a).copied().unwrap_or(0.0) <= half => [*a, *b],
        _ => return Ok(vec![round0]),
    };

    // ---- round 1 ----
    let mut second = vec![0.0; candidates.len()];
    for e in electors {
        if let Some(choice) = e.first_choice_among(|c| finalists.contains(&c)) {
            second[index.get(choice)?] += weight(e);
        }
    }
    for (c, v) in candidates.iter_mut().zip(&second) {
        c.push_round(rule, *v)?;
    }
    let scores: BTreeMap<CandidateId, f64> = all.iter().copied().zip(second.iter().copied()).collect();
    let round1 = order_by_score(rule, &finalists, |id| scores.get(&id).copied().unwrap_or(0.0), tie);

    Ok(vec![round0, round1])
}
