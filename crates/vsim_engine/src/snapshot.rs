//! Snapshot export and the two import flows.
//!
//! Both imports run `validate_snapshot` and build everything fallible before
//! touching the election, so a rejected snapshot leaves it as it was.
//! Persisted ids are mapped onto freshly generated in-memory ids.

use std::collections::BTreeMap;

use vsim_algo::{DuelMatrix, DuelRecord, RuleResult};
use vsim_core::ids::IdGenerator;
use vsim_core::{Candidate, CandidateId, Elector, Position, Score, VotingRule};
use vsim_io::snapshot::{
    CandidateRow, DuelRow, ElectionSnapshot, ElectorRow, MultiRoundRow, OneRoundRow, RankingRow, Settings,
};
use vsim_io::validate::validate_snapshot;

use crate::{Election, ElectionState, EngineError};

/// Counts of what an import brought in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub candidates: usize,
    pub electors: usize,
    pub rules: usize,
}

fn check(snapshot: &ElectionSnapshot) -> Result<(), EngineError> {
    let report = validate_snapshot(snapshot);
    if report.pass {
        Ok(())
    } else {
        Err(EngineError::Import(report.summary()))
    }
}

fn map_id(map: &BTreeMap<CandidateId, CandidateId>, old: CandidateId) -> Result<CandidateId, EngineError> {
    map.get(&old)
        .copied()
        .ok_or_else(|| EngineError::Import(format!("unknown candidate {old}")))
}

fn position(x: f64, y: f64) -> Result<Position, EngineError> {
    Position::try_new(x, y).map_err(|e| EngineError::Import(e.to_string()))
}

impl Election {
    /// Current people, scores, duels, rankings and settings.
    pub fn export_snapshot(&self) -> ElectionSnapshot {
        let mut s = ElectionSnapshot {
            settings: Settings::from_flags(self.params.liquid_democracy, self.params.tie_breaker),
            ..ElectionSnapshot::default()
        };

        for c in &self.candidates {
            s.candidates.push(CandidateRow {
                id: c.id,
                x: c.position.x,
                y: c.position.y,
                first_name: c.first_name.clone(),
                last_name: c.last_name.clone(),
                dogmatism: c.dogmatism,
                opposition: c.opposition,
            });
            for (rule, score) in c.scores() {
                match score {
                    Score::Scalar(v) => {
                        s.one_round_results.push(OneRoundRow { candidate_id: c.id, voting_rule: *rule, score: *v })
                    }
                    Score::PerRound(rounds) => {
                        for (r, v) in rounds.iter().enumerate() {
                            s.multi_round_results.push(MultiRoundRow {
                                candidate_id: c.id,
                                voting_rule: *rule,
                                round: r as u32,
                                score: *v,
                            });
                        }
                    }
                }
            }
        }

        for e in &self.electors {
            s.electors.push(ElectorRow {
                id: e.id,
                x: e.position.x,
                y: e.position.y,
                weight: e.weight,
                knowledge: e.knowledge,
            });
        }

        if let Some(duels) = &self.duels {
            s.duels = duels
                .records()
                .into_iter()
                .map(|d| DuelRow { winner_id: d.winner, loser_id: d.loser, score: d.score, against: d.against })
                .collect();
        }

        for (rule, result) in &self.results {
            let Some(result) = result else { continue };
            for round in 0..result.round_count() {
                for (position, id) in result.round(round).unwrap_or(&[]).iter().enumerate() {
                    s.rankings.push(RankingRow {
                        voting_rule: *rule,
                        round: round as u32,
                        position: position as u32,
                        candidate_id: *id,
                    });
                }
            }
        }

        s.sort_rows();
        s
    }

    /// Append the snapshot's candidates and electors with fresh ids. Results
    /// in the snapshot are ignored.
    pub fn import_people(&mut self, snapshot: &ElectionSnapshot) -> Result<ImportSummary, EngineError> {
        check(snapshot)?;
        let candidates = snapshot
            .candidates
            .iter()
            .map(|r| -> Result<_, EngineError> { Ok((position(r.x, r.y)?, r)) })
            .collect::<Result<Vec<_>, EngineError>>()?;
        let electors = snapshot
            .electors
            .iter()
            .map(|r| -> Result<_, EngineError> { Ok((position(r.x, r.y)?, r)) })
            .collect::<Result<Vec<_>, EngineError>>()?;

        for (p, r) in &candidates {
            self.import_candidate(*p, r.first_name.clone(), r.last_name.clone(), r.dogmatism, r.opposition);
        }
        for (p, r) in &electors {
            self.import_elector(*p, r.weight, r.knowledge);
        }
        tracing::info!(candidates = candidates.len(), electors = electors.len(), "people imported");
        Ok(ImportSummary { candidates: candidates.len(), electors: electors.len(), rules: 0 })
    }

    /// Replace the whole election with the snapshot: people, scores, duels,
    /// rankings and settings flags.
    pub fn import_with_results(&mut self, snapshot: &ElectionSnapshot) -> Result<ImportSummary, EngineError> {
        check(snapshot)?;

        // People, on a fresh id sequence.
        let mut candidate_ids = IdGenerator::default();
        let mut elector_ids = IdGenerator::default();
        let mut id_map: BTreeMap<CandidateId, CandidateId> = BTreeMap::new();
        let mut candidates = Vec::with_capacity(snapshot.candidates.len());
        for r in &snapshot.candidates {
            let id = candidate_ids.next_candidate();
            id_map.insert(r.id, id);
            candidates.push(Candidate::new(
                id,
                position(r.x, r.y)?,
                r.first_name.clone(),
                r.last_name.clone(),
                r.dogmatism,
                r.opposition,
            ));
        }
        let mut electors = Vec::with_capacity(snapshot.electors.len());
        for r in &snapshot.electors {
            let mut e = Elector::new(elector_ids.next_elector(), position(r.x, r.y)?, r.knowledge);
            e.weight = r.weight;
            electors.push(e);
        }
        let index: BTreeMap<CandidateId, usize> = candidates.iter().enumerate().map(|(i, c)| (c.id, i)).collect();

        // Scores, in the shape of each rule's family.
        for row in &snapshot.one_round_results {
            let id = map_id(&id_map, row.candidate_id)?;
            candidates[index[&id]].set_score(row.voting_rule, Score::Scalar(row.score))?;
        }
        let mut per_round: BTreeMap<(CandidateId, VotingRule), Vec<(u32, f64)>> = BTreeMap::new();
        for row in &snapshot.multi_round_results {
            let id = map_id(&id_map, row.candidate_id)?;
            per_round.entry((id, row.voting_rule)).or_default().push((row.round, row.score));
        }
        for ((id, rule), mut rounds) in per_round {
            rounds.sort_by_key(|(r, _)| *r);
            let values = rounds.into_iter().map(|(_, v)| v).collect();
            candidates[index[&id]].set_score(rule, Score::PerRound(values))?;
        }

        // Duels, re-keyed.
        let duels = if snapshot.duels.is_empty() {
            None
        } else {
            let records = snapshot
                .duels
                .iter()
                .map(|d| -> Result<DuelRecord, EngineError> {
                    Ok(DuelRecord {
                        winner: map_id(&id_map, d.winner_id)?,
                        loser: map_id(&id_map, d.loser_id)?,
                        score: d.score,
                        against: d.against,
                    })
                })
                .collect::<Result<Vec<_>, EngineError>>()?;
            let order = candidates.iter().map(|c| c.id).collect();
            let total = electors.iter().map(|e| u64::from(e.weight)).sum();
            Some(DuelMatrix::from_records(order, &records, total)?)
        };

        // Rankings.
        let mut results: BTreeMap<VotingRule, Option<RuleResult>> = BTreeMap::new();
        for rule in snapshot.ranked_rules() {
            let rounds = snapshot
                .rule_rounds(rule)
                .into_iter()
                .map(|round| round.into_iter().map(|old| map_id(&id_map, old)).collect())
                .collect::<Result<Vec<Vec<CandidateId>>, EngineError>>()?;
            let result = if rule.is_multi_round() {
                RuleResult::Rounds(rounds)
            } else {
                RuleResult::OneRound(rounds.into_iter().next().unwrap_or_default())
            };
            results.insert(rule, Some(result));
        }

        // Nothing below can fail.
        self.delete_all_data();
        self.params.liquid_democracy = snapshot.settings.liquid_democracy();
        self.params.tie_breaker = snapshot.settings.tie_breaker();
        for e in &electors {
            self.accumulator.add(&e.position);
            if self.params.polls > 0 {
                self.regions.add(&e.position);
            }
        }
        self.candidates = candidates;
        self.electors = electors;
        self.candidate_ids = candidate_ids;
        self.elector_ids = elector_ids;
        self.define_ranking();
        self.measure();
        let rules = results.len();
        self.results = results;
        self.duels = duels;
        self.state = if rules > 0 {
            ElectionState::Resulted
        } else if self.electors.is_empty() && self.candidates.is_empty() {
            ElectionState::Empty
        } else {
            ElectionState::Populated
        };

        tracing::info!(
            candidates = self.candidates.len(),
            electors = self.electors.len(),
            rules,
            "election imported with results"
        );
        Ok(ImportSummary { candidates: self.candidates.len(), electors: self.electors.len(), rules })
    }
}
