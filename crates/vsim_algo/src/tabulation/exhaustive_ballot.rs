// crates/vsim_algo/src/tabulation/exhaustive_ballot.rs
//
// Exhaustive ballot: repeated plurality rounds, eliminating the last-ranked
// candidate of each round until someone holds a strict majority or two remain
// (at most N-1 rounds).
//
// Scores are cumulative. Each new round slot starts from the previous tallies;
// only the eliminated candidate's electors are re-assigned to their best
// remaining choice. Eliminated candidates score 0 in every later round. Each
// round's ranking lists only the candidates still running.

use std::collections::BTreeMap;

use vsim_core::{Candidate, CandidateId, Elector, VotingRule};

use super::common::{ids, order_by_score, total_weight, weight, CandidateIndex};
use crate::duels::DuelMatrix;
use crate::TabError;

pub fn exhaustive_ballot(
    electors: &[Elector],
    candidates: &mut [Candidate],
    tie: Option<&DuelMatrix>,
) -> Result<Vec<Vec<CandidateId>>, TabError> {
    let rule = VotingRule::ExhaustiveBallot;
    let index = CandidateIndex::new(candidates);
    let half = total_weight(electors) as f64 / 2.0;

    for c in candidates.iter_mut() {
        c.reset_score(rule);
    }

    // Elector → index of the candidate currently holding its vote.
    let mut tally = vec![0.0; candidates.len()];
    let mut holder: Vec<Option<usize>> = Vec::with_capacity(electors.len());
    for e in electors {
        let choice = e.top_choice().map(|id| index.get(id)).transpose()?;
        if let Some(i) = choice {
            tally[i] += weight(e);
        }
        holder.push(choice);
    }

    let mut running = ids(candidates);
    let mut eliminated = vec![false; candidates.len()];
    let mut rounds = Vec::new();

    loop {
        for (c, v) in candidates.iter_mut().zip(&tally) {
            c.push_round(rule, *v)?;
        }
        let scores: BTreeMap<CandidateId, f64> = running
            .iter()
            .map(|id| index.get(*id).map(|i| (*id, tally[i])))
            .collect::<Result<_, _>>()?;
        let ranking = order_by_score(rule, &running, |id| scores.get(&id).copied().unwrap_or(0.0), tie);

        let leader_score = ranking.first().and_then(|id| scores.get(id)).copied().unwrap_or(0.0);
        let last = ranking.last().copied();
        let done = ranking.len() <= 2 || leader_score > half;
        rounds.push(ranking);

        let out = match last {
            Some(id) if !done => id,
            _ => break,
        };
        let out_i = index.get(out)?;
        eliminated[out_i] = true;
        tally[out_i] = 0.0;
        running.retain(|id| *id != out);

        for (e, held) in electors.iter().zip(holder.iter_mut()) {
            if *held != Some(out_i) {
                continue;
            }
            let next = e.first_choice_among(|id| index.find(id).is_some_and(|i| !eliminated[i]));
            *held = next.map(|id| index.get(id)).transpose()?;
            if let Some(i) = *held {
                tally[i] += weight(e);
            }
        }
    }

    Ok(rounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsim_core::{ElectorId, Position};

    fn ballot(groups: &[(usize, [usize; 4])]) -> (Vec<CandidateId>, Vec<Candidate>, Vec<Elector>) {
        let c: Vec<CandidateId> = (0..4).map(CandidateId::from_raw).collect();
        let cs = c.iter().map(|id| Candidate::new(*id, Position::ORIGIN, "", "", 0.5, 0.5)).collect();
        let mut es = Vec::new();
        for (count, r) in groups {
            for _ in 0..*count {
                let ranking = r.iter().map(|i| c[*i]).collect();
                es.push(Elector::with_ranking(ElectorId::from_raw(es.len() as u32), Position::ORIGIN, ranking));
            }
        }
        (c, cs, es)
    }

    #[test]
    fn twelve_electors_three_rounds() {
        const A: usize = 0;
        const B: usize = 1;
        const C: usize = 2;
        const D: usize = 3;
        let (c, mut cs, es) = ballot(&[(3, [A, D, B, C]), (4, [B, D, A, C]), (3, [C, D, A, B]), (2, [D, C, B, A])]);

        let rounds = exhaustive_ballot(&es, &mut cs, None).unwrap();
        assert_eq!(
            rounds,
            vec![vec![c[B], c[A], c[C], c[D]], vec![c[C], c[B], c[A]], vec![c[B], c[C]]]
        );

        let rule = VotingRule::ExhaustiveBallot;
        assert_eq!(cs[A].rounds(rule).unwrap(), &[3.0, 3.0, 0.0]);
        assert_eq!(cs[B].rounds(rule).unwrap(), &[4.0, 4.0, 7.0]);
        assert_eq!(cs[C].rounds(rule).unwrap(), &[3.0, 5.0, 5.0]);
        assert_eq!(cs[D].rounds(rule).unwrap(), &[2.0, 0.0, 0.0]);
    }

    #[test]
    fn first_round_majority_stops() {
        let (c, mut cs, es) = ballot(&[(3, [0, 1, 2, 3]), (1, [1, 0, 2, 3])]);
        let rounds = exhaustive_ballot(&es, &mut cs, None).unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0][0], c[0]);
        assert_eq!(cs[0].rounds(VotingRule::ExhaustiveBallot).unwrap(), &[3.0]);
    }

    #[test]
    fn rerun_resets_rounds() {
        let (_, mut cs, es) = ballot(&[(1, [0, 1, 2, 3]), (1, [1, 0, 2, 3]), (1, [2, 1, 0, 3])]);
        let a = exhaustive_ballot(&es, &mut cs, None).unwrap();
        let b = exhaustive_ballot(&es, &mut cs, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(cs[0].rounds(VotingRule::ExhaustiveBallot).unwrap().len(), a.len());
    }
}
