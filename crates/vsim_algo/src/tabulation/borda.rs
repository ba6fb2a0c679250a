//! Borda count: with N candidates, rank i (0 = top) earns (N-1-i) × weight.

use vsim_core::{Candidate, CandidateId, Elector, VotingRule};

use super::common::{finish_scalar, weight, CandidateIndex};
use crate::duels::DuelMatrix;
use crate::TabError;

pub fn borda(
    electors: &[Elector],
    candidates: &mut [Candidate],
    tie: Option<&DuelMatrix>,
) -> Result<Vec<CandidateId>, TabError> {
    let index = CandidateIndex::new(candidates);
    let n = candidates.len();
    let mut tally = vec![0.0; n];
    for e in electors {
        for (i, id) in e.ranking().iter().enumerate() {
            let points = n.saturating_sub(i + 1) as f64;
            tally[index.get(*id)?] += points * weight(e);
        }
    }
    finish_scalar(VotingRule::Borda, candidates, &tally, tie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsim_core::{ElectorId, Position};

    #[test]
    fn points_by_position() {
        let c: Vec<CandidateId> = (0..3).map(CandidateId::from_raw).collect();
        let mut cs: Vec<Candidate> =
            c.iter().map(|id| Candidate::new(*id, Position::ORIGIN, "", "", 0.5, 0.5)).collect();
        let mut es = vec![
            Elector::with_ranking(ElectorId::from_raw(0), Position::ORIGIN, vec![c[0], c[1], c[2]]),
            Elector::with_ranking(ElectorId::from_raw(1), Position::ORIGIN, vec![c[2], c[1], c[0]]),
        ];
        es[1].weight = 2;
        let r = borda(&es, &mut cs, None).unwrap();
        // c0 = 2, c1 = 1 + 2, c2 = 4
        assert_eq!(r, vec![c[2], c[1], c[0]]);
        assert_eq!(cs[1].scalar(VotingRule::Borda).unwrap(), 3.0);
        assert_eq!(cs[0].scalar(VotingRule::Borda).unwrap(), 2.0);
    }

    #[test]
    fn tie_broken_by_duel_when_enabled() {
        let c: Vec<CandidateId> = (0..2).map(CandidateId::from_raw).collect();
        let mut cs: Vec<Candidate> =
            c.iter().map(|id| Candidate::new(*id, Position::ORIGIN, "", "", 0.5, 0.5)).collect();
        // Equal Borda (1 each); the hand-built duel table has c1 beating c0.
        let es = vec![
            Elector::with_ranking(ElectorId::from_raw(0), Position::ORIGIN, vec![c[0], c[1]]),
            Elector::with_ranking(ElectorId::from_raw(1), Position::ORIGIN, vec![c[1], c[0]]),
        ];
        let duels = DuelMatrix::from_records(
            c.clone(),
            &[crate::duels::DuelRecord { winner: c[1], loser: c[0], score: 2, against: 1 }],
            3,
        )
        .unwrap();
        assert_eq!(borda(&es, &mut cs, None).unwrap(), vec![c[0], c[1]]);
        assert_eq!(borda(&es, &mut cs, Some(&duels)).unwrap(), vec![c[1], c[0]]);
    }
}
