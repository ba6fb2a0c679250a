//! Report model and the snapshot → model mapping.

use std::collections::BTreeMap;

#[cfg(feature = "render_json")]
use serde::Serialize;
use vsim_core::{CandidateId, VotingRule};
use vsim_io::snapshot::ElectionSnapshot;

use crate::ReportError;

#[cfg_attr(feature = "render_json", derive(Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreReport {
    pub liquid_democracy: bool,
    pub tie_breaker: bool,
    pub candidates: usize,
    pub electors: usize,
    pub total_weight: u64,
    pub rules: Vec<RuleTable>,
}

#[cfg_attr(feature = "render_json", derive(Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RuleTable {
    pub rule: VotingRule,
    pub title: String,
    pub winner: Option<CandidateId>,
    pub winner_name: Option<String>,
    pub rounds: Vec<RoundTable>,
}

#[cfg_attr(feature = "render_json", derive(Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RoundTable {
    pub round: u32,
    pub rows: Vec<ScoreRow>,
}

#[cfg_attr(feature = "render_json", derive(Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreRow {
    /// 1-based.
    pub rank: u32,
    pub candidate: CandidateId,
    pub name: String,
    pub score: f64,
    #[cfg_attr(feature = "render_json", serde(skip_serializing_if = "Option::is_none"))]
    pub satisfaction: Option<f64>,
}

/// Build per-rule tables from the snapshot's stored rankings and scores.
///
/// The winner is the top of the last round, except for Condorcet simple where
/// it must also have won every duel.
pub fn build_table(
    snapshot: &ElectionSnapshot,
    satisfaction: Option<&BTreeMap<CandidateId, f64>>,
) -> Result<ScoreReport, ReportError> {
    let names: BTreeMap<CandidateId, String> = snapshot
        .candidates
        .iter()
        .map(|c| (c.id, format!("{} {}", c.first_name, c.last_name)))
        .collect();
    let name_of = |id: CandidateId| names.get(&id).cloned().ok_or(ReportError::UnknownCandidate(id));

    let one_round: BTreeMap<(VotingRule, CandidateId), f64> = snapshot
        .one_round_results
        .iter()
        .map(|r| ((r.voting_rule, r.candidate_id), r.score))
        .collect();
    let multi_round: BTreeMap<(VotingRule, CandidateId, u32), f64> = snapshot
        .multi_round_results
        .iter()
        .map(|r| ((r.voting_rule, r.candidate_id, r.round), r.score))
        .collect();

    let mut rules = Vec::new();
    for rule in snapshot.ranked_rules() {
        let mut rounds = Vec::new();
        for (round, ranking) in snapshot.rule_rounds(rule).into_iter().enumerate() {
            let round = round as u32;
            let mut rows = Vec::with_capacity(ranking.len());
            for (i, id) in ranking.into_iter().enumerate() {
                let score = if rule.is_multi_round() {
                    multi_round.get(&(rule, id, round))
                } else {
                    one_round.get(&(rule, id))
                };
                let score = *score.ok_or(ReportError::MissingScore { rule, candidate: id, round })?;
                rows.push(ScoreRow {
                    rank: i as u32 + 1,
                    candidate: id,
                    name: name_of(id)?,
                    score,
                    satisfaction: satisfaction.and_then(|s| s.get(&id).copied()),
                });
            }
            rounds.push(RoundTable { round, rows });
        }

        let leader = rounds.last().and_then(|r| r.rows.first()).map(|row| row.candidate);
        let winner = match leader {
            Some(id) if rule == VotingRule::CondorcetSimple => beats_everyone(snapshot, id).then_some(id),
            other => other,
        };
        rules.push(RuleTable {
            rule,
            title: rule.display_name().to_string(),
            winner,
            winner_name: winner.map(name_of).transpose()?,
            rounds,
        });
    }

    Ok(ScoreReport {
        liquid_democracy: snapshot.settings.liquid_democracy(),
        tie_breaker: snapshot.settings.tie_breaker(),
        candidates: snapshot.candidates.len(),
        electors: snapshot.electors.len(),
        total_weight: snapshot.electors.iter().map(|e| u64::from(e.weight)).sum(),
        rules,
    })
}

/// Strict duel win over every other candidate of the snapshot.
fn beats_everyone(snapshot: &ElectionSnapshot, id: CandidateId) -> bool {
    snapshot.candidates.iter().filter(|c| c.id != id).all(|other| {
        snapshot.duels.iter().any(|d| {
            (d.winner_id == id && d.loser_id == other.id && d.score > d.against)
                || (d.loser_id == id && d.winner_id == other.id && d.against > d.score)
        })
    })
}
