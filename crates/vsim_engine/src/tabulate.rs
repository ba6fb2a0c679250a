//! Rule dispatch: one call per `VotingRule`, wrapped into a `RuleResult`.

use vsim_algo::tabulation::{
    approval, borda, condorcet_copeland, condorcet_simple, condorcet_simpson, exhaustive_ballot,
    plurality_one_round, plurality_two_rounds, veto,
};
use vsim_algo::{DuelMatrix, RuleResult, TabError};
use vsim_core::variables::SimParams;
use vsim_core::{Candidate, Elector, VotingRule};

/// Apply `rule`. `duels` feeds the Condorcet rules and, when the tie-breaker
/// is on, the tie-break of every other rule.
pub(crate) fn run_rule(
    rule: VotingRule,
    electors: &[Elector],
    candidates: &mut [Candidate],
    duels: &DuelMatrix,
    params: &SimParams,
) -> Result<RuleResult, TabError> {
    let tie = params.tie_breaker.then_some(duels);
    let result = match rule {
        VotingRule::PluralityOneRound => RuleResult::OneRound(plurality_one_round(electors, candidates, tie)?),
        VotingRule::PluralityTwoRounds => RuleResult::Rounds(plurality_two_rounds(electors, candidates, tie)?),
        VotingRule::Veto => RuleResult::OneRound(veto(electors, candidates, tie)?),
        VotingRule::Borda => RuleResult::OneRound(borda(electors, candidates, tie)?),
        VotingRule::Approval => RuleResult::OneRound(approval(electors, candidates, params.approval_gap, tie)?),
        VotingRule::CondorcetSimple => RuleResult::OneRound(condorcet_simple(candidates, duels, tie)?),
        VotingRule::CondorcetCopeland => RuleResult::OneRound(condorcet_copeland(candidates, duels)?),
        VotingRule::CondorcetSimpson => RuleResult::OneRound(condorcet_simpson(candidates, duels, tie)?),
        VotingRule::ExhaustiveBallot => RuleResult::Rounds(exhaustive_ballot(electors, candidates, tie)?),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsim_algo::rank_all;
    use vsim_core::{CandidateId, ElectorId, Position};

    #[test]
    fn every_rule_returns_the_matching_shape() {
        let mut candidates: Vec<Candidate> = [(0.0, 0.0), (0.5, 0.5), (-0.5, 0.2)]
            .iter()
            .enumerate()
            .map(|(i, (x, y))| {
                Candidate::new(CandidateId::from_raw(i as u32), Position::new(*x, *y), "A", "B", 0.5, 0.5)
            })
            .collect();
        let mut electors: Vec<Elector> = [(0.1, 0.0), (0.4, 0.6), (-0.4, 0.1)]
            .iter()
            .enumerate()
            .map(|(i, (x, y))| Elector::new(ElectorId::from_raw(i as u32), Position::new(*x, *y), 1.0))
            .collect();
        rank_all(&mut electors, &candidates);
        let duels = DuelMatrix::compute(&electors, &candidates).unwrap();
        let params = SimParams { tie_breaker: true, ..SimParams::default() };

        for rule in VotingRule::ALL {
            let r = run_rule(rule, &electors, &mut candidates, &duels, &params).unwrap();
            assert_eq!(matches!(r, RuleResult::Rounds(_)), rule.is_multi_round(), "{rule}");
            assert_eq!(r.round(0).map(<[CandidateId]>::len), Some(3), "{rule}");
        }
    }
}
