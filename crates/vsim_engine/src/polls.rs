//! Straw polls: candidates drift, ally or withdraw, electors adjust rankings.
//!
//! One poll round:
//! 1. Every candidate except the poll rule's leader holds (with probability
//!    `dogmatism`), withdraws (support ratio vs. the leader under
//!    `give_up_threshold`, a stronger ally within `alliance_radius`, and a draw
//!    under `1 − ratio`), or moves `travel_fraction` of the way toward the
//!    leader, or toward the best region when a draw falls under `opposition`.
//! 2. Electors re-rank by distance.
//! 3. Electors drawn under `1 − knowledge` promote each approved candidate
//!    (past their first) one place, with probability equal to its support ratio.
//! 4. Every selected rule is recomputed on the new rankings.

use std::collections::BTreeMap;

use vsim_algo::tabulation::approval::approved_by;
use vsim_algo::tabulation::common::total_weight;
use vsim_algo::{rank_all, RuleResult};
use vsim_core::geometry::clip_unit;
use vsim_core::{Candidate, CandidateId, Position, Score, VotingRule};

use crate::{Election, ElectionState, EngineError};

/// What one poll round did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollRound {
    /// 1-based within the election's poll history.
    pub round: u32,
    /// Leader of the poll rule at the start of the round.
    pub winner: Option<CandidateId>,
    pub withdrawn: Vec<CandidateId>,
    pub moved: Vec<CandidateId>,
    /// Electors whose ranking was reshuffled.
    pub reshuffled: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct RegionCell {
    count: u32,
    sum_x: f64,
    sum_y: f64,
    sum_sq: f64,
}

/// Elector distribution over a `side × side` grid covering the map.
///
/// Filled incrementally as electors are added; candidates are only counted
/// when a target is chosen.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionGrid {
    side: u32,
    cells: Vec<RegionCell>,
}

impl RegionGrid {
    pub fn new(side: u32) -> Self {
        let side = side.max(1);
        Self { side, cells: vec![RegionCell::default(); (side * side) as usize] }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    /// Electors recorded so far.
    pub fn electors(&self) -> u32 {
        self.cells.iter().map(|c| c.count).sum()
    }

    /// Row-major cell index of a map position.
    pub fn cell_of(&self, p: &Position) -> usize {
        let axis = |v: f64| {
            let i = ((v + 1.0) / 2.0 * f64::from(self.side)).floor();
            (i.max(0.0) as u32).min(self.side - 1)
        };
        (axis(p.y) * self.side + axis(p.x)) as usize
    }

    pub fn add(&mut self, p: &Position) {
        let i = self.cell_of(p);
        let cell = &mut self.cells[i];
        cell.count += 1;
        cell.sum_x += p.x;
        cell.sum_y += p.y;
        cell.sum_sq += p.x * p.x + p.y * p.y;
    }

    /// Elector centroid of the best-scoring cell, if any cell holds electors.
    ///
    /// Cell score = `density × (1 − crowding) + variance_weight × spread`, where
    /// density is the cell's share of electors, crowding its share of
    /// candidates and spread the electors' standard distance from their
    /// centroid in cell-size units. Equal scores keep the lowest index.
    pub fn best_target(&self, candidates: &[Candidate], variance_weight: f64) -> Option<Position> {
        let electors = f64::from(self.electors());
        if electors == 0.0 {
            return None;
        }
        let mut crowd = vec![0u32; self.cells.len()];
        for c in candidates {
            crowd[self.cell_of(&c.position)] += 1;
        }
        let n_candidates = candidates.len().max(1) as f64;
        let cell_size = 2.0 / f64::from(self.side);

        let mut best: Option<(f64, Position)> = None;
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.count == 0 {
                continue;
            }
            let n = f64::from(cell.count);
            let (mx, my) = (cell.sum_x / n, cell.sum_y / n);
            let variance = (cell.sum_sq / n - (mx * mx + my * my)).max(0.0);
            let spread = variance.sqrt() / cell_size;
            let density = n / electors;
            let crowding = f64::from(crowd[i]) / n_candidates;
            let score = density * (1.0 - crowding) + variance_weight * spread;
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, Position::new(mx, my)));
            }
        }
        best.map(|(_, p)| p)
    }
}

/// A candidate's standing under `rule`, larger is better.
fn support(c: &Candidate, rule: VotingRule, total_weight: f64) -> f64 {
    match c.score(rule) {
        Some(Score::Scalar(v)) if rule == VotingRule::CondorcetSimpson => total_weight - v,
        Some(Score::Scalar(v)) => *v,
        Some(Score::PerRound(rounds)) => rounds.first().copied().unwrap_or(0.0),
        None => 0.0,
    }
}

impl Election {
    /// Run `params.polls` poll rounds and return the rounds just run.
    ///
    /// Starts an election on the poll rule first when none has run.
    pub fn run_polls(&mut self) -> Result<&[PollRound], EngineError> {
        if self.electors.is_empty() {
            return Err(EngineError::NoElectors);
        }
        let rule = self.params.poll_rule;
        if self.state != ElectionState::Resulted {
            let mut rules: Vec<VotingRule> = self.results.keys().copied().collect();
            if !rules.contains(&rule) {
                rules.push(rule);
            }
            self.start_election(&rules)?;
        }
        self.results.entry(rule).or_insert(None);
        if self.regions.electors() as usize != self.electors.len() {
            self.regions = RegionGrid::new(self.params.region_grid);
            for e in &self.electors {
                self.regions.add(&e.position);
            }
        }

        let start = self.poll_log.len();
        self.state = ElectionState::Polling;
        for _ in 0..self.params.polls {
            let round = self.poll_log.len() as u32 + 1;
            let record = match self.poll_round(round) {
                Ok(r) => r,
                Err(e) => {
                    self.state = ElectionState::Resulted;
                    return Err(e);
                }
            };
            tracing::debug!(
                round,
                winner = ?record.winner,
                withdrawn = record.withdrawn.len(),
                moved = record.moved.len(),
                reshuffled = record.reshuffled,
                "poll round"
            );
            self.poll_log.push(record);
        }
        self.state = ElectionState::Resulted;
        Ok(&self.poll_log[start..])
    }

    fn poll_round(&mut self, round: u32) -> Result<PollRound, EngineError> {
        let rule = self.params.poll_rule;
        if self.result(rule).is_none() {
            self.apply_voting_rule(rule)?;
        }
        let mut record = PollRound { round, ..PollRound::default() };
        let Some(leader) = self.result(rule).and_then(RuleResult::leader) else {
            return Ok(record);
        };
        let Some(leader_pos) = self.candidate(leader).map(|c| c.position) else {
            return Ok(record);
        };
        record.winner = Some(leader);

        let total = total_weight(&self.electors) as f64;
        let supports: BTreeMap<CandidateId, f64> =
            self.candidates.iter().map(|c| (c.id, support(c, rule, total))).collect();
        let support_of = |id: CandidateId| supports.get(&id).copied().unwrap_or(0.0);
        let lead = support_of(leader);
        let ratio = |id: CandidateId| if lead > 0.0 { support_of(id) / lead } else { 1.0 };

        let region = self.regions.best_target(&self.candidates, self.params.variance_weight);
        let p = &self.params;
        let (give_up, alliance, travel) = (p.give_up_threshold, p.alliance_radius, p.travel_fraction);

        // 1. candidates
        for i in 0..self.candidates.len() {
            let c = &self.candidates[i];
            let (id, pos, dogmatism, opposition) = (c.id, c.position, c.dogmatism, c.opposition);
            if id == leader || self.rng.chance(dogmatism) {
                continue;
            }
            let r = ratio(id);
            let remaining = self.candidates.len() - record.withdrawn.len();
            if r < give_up && remaining > 2 {
                let has_ally = self.candidates.iter().any(|a| {
                    a.id != id
                        && !record.withdrawn.contains(&a.id)
                        && support_of(a.id) > support_of(id)
                        && a.position.distance(&pos) <= alliance
                });
                if has_ally && self.rng.chance(1.0 - r) {
                    tracing::warn!(candidate = %id, round, "candidate withdraws");
                    record.withdrawn.push(id);
                    continue;
                }
            }
            let target = if self.rng.chance(opposition) { region.unwrap_or(leader_pos) } else { leader_pos };
            self.candidates[i].position = pos.step_toward(&target, travel);
            record.moved.push(id);
        }
        if !record.withdrawn.is_empty() {
            self.candidates.retain(|c| !record.withdrawn.contains(&c.id));
        }

        // 2. re-rank
        rank_all(&mut self.electors, &self.candidates);

        // 3. reshuffle
        let gap = self.params.approval_gap;
        for e in 0..self.electors.len() {
            if !self.rng.chance(1.0 - self.electors[e].knowledge) {
                continue;
            }
            let approved = approved_by(&self.electors[e], &self.candidates, gap)?;
            let mut changed = false;
            for id in approved.iter().skip(1) {
                if !self.rng.chance(clip_unit(ratio(*id))) {
                    continue;
                }
                let ranking = self.electors[e].ranking_mut();
                if let Some(at) = ranking.iter().position(|c| c == id) {
                    if at > 0 {
                        ranking.swap(at - 1, at);
                        changed = true;
                    }
                }
            }
            if changed {
                record.reshuffled += 1;
            }
        }

        // 4. results
        self.recompute_results()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsim_core::variables::SimParams;

    fn poll_election(params: SimParams) -> Election {
        Election::new(SimParams { polls: 1, ..params }).unwrap()
    }

    #[test]
    fn grid_cells_cover_the_map_edges() {
        let g = RegionGrid::new(4);
        assert_eq!(g.cell_of(&Position::new(-1.0, -1.0)), 0);
        assert_eq!(g.cell_of(&Position::new(1.0, 1.0)), 15);
        assert_eq!(g.cell_of(&Position::new(0.1, -0.9)), 2);
        assert_eq!(RegionGrid::new(0).side(), 1);
    }

    #[test]
    fn best_target_avoids_crowded_cells() {
        let mut g = RegionGrid::new(2);
        for p in [(-0.5, -0.5), (-0.6, -0.4), (0.5, 0.5), (0.6, 0.4)] {
            g.add(&Position::new(p.0, p.1));
        }
        let occupied = [Candidate::new(CandidateId::from_raw(0), Position::new(-0.5, -0.5), "A", "B", 0.0, 0.0)];
        let target = g.best_target(&occupied, 0.0).unwrap();
        assert!((target.x - 0.55).abs() < 1e-12 && (target.y - 0.45).abs() < 1e-12);
        assert!(RegionGrid::new(3).best_target(&occupied, 0.5).is_none());
    }

    #[test]
    fn flexible_candidate_moves_toward_the_leader() {
        let mut el = poll_election(SimParams { give_up_threshold: 0.0, travel_fraction: 0.5, ..SimParams::default() });
        let a = el.import_candidate(Position::new(0.0, 0.0), "A", "A", 1.0, 1.0);
        let b = el.import_candidate(Position::new(0.8, 0.0), "B", "B", 0.0, 0.0);
        for p in [(-0.1, 0.0), (0.0, 0.1), (0.1, 0.0)] {
            el.import_elector(Position::new(p.0, p.1), 1, 1.0);
        }
        el.start_election(&[VotingRule::PluralityOneRound]).unwrap();
        let log = el.run_polls().unwrap().to_vec();

        assert_eq!(log.len(), 1);
        assert_eq!(log[0].winner, Some(a));
        assert_eq!(log[0].moved, vec![b]);
        assert_eq!(log[0].reshuffled, 0);
        assert!((el.candidate(b).unwrap().position.x - 0.4).abs() < 1e-12);
        assert_eq!(el.state(), ElectionState::Resulted);
    }

    #[test]
    fn weak_candidate_with_a_stronger_ally_withdraws() {
        let mut el = poll_election(SimParams { give_up_threshold: 1.0, ..SimParams::default() });
        el.import_candidate(Position::new(0.0, 0.0), "A", "A", 1.0, 1.0);
        let b = el.import_candidate(Position::new(0.3, 0.0), "B", "B", 1.0, 1.0);
        let c = el.import_candidate(Position::new(0.5, 0.0), "C", "C", 0.0, 0.0);
        for p in [(-0.1, 0.0), (0.0, 0.1), (0.0, -0.1), (0.3, 0.05)] {
            el.import_elector(Position::new(p.0, p.1), 1, 1.0);
        }
        el.start_election(&[VotingRule::PluralityOneRound, VotingRule::Borda]).unwrap();
        el.run_polls().unwrap();

        assert_eq!(el.poll_log()[0].withdrawn, vec![c]);
        assert!(el.candidate(c).is_none());
        assert_eq!(el.candidates().len(), 2);
        assert!(el.electors().iter().all(|e| e.ranking().len() == 2));
        let borda = el.result(VotingRule::Borda).unwrap();
        assert_eq!(borda.final_ranking().len(), 2);
        assert!(borda.final_ranking().contains(&b));
    }

    #[test]
    fn polls_start_an_election_when_needed() {
        let mut el = poll_election(SimParams { poll_rule: VotingRule::ExhaustiveBallot, ..SimParams::default() });
        el.populate_random(30, 4);
        el.run_polls().unwrap();
        assert_eq!(el.poll_log().len(), 1);
        assert!(el.result(VotingRule::ExhaustiveBallot).is_some());
        assert_eq!(el.state(), ElectionState::Resulted);
    }

    #[test]
    fn simpson_support_is_inverted() {
        let mut c = Candidate::new(CandidateId::from_raw(0), Position::ORIGIN, "A", "B", 0.0, 0.0);
        c.set_score(VotingRule::CondorcetSimpson, Score::Scalar(3.0)).unwrap();
        c.set_score(VotingRule::ExhaustiveBallot, Score::PerRound(vec![4.0, 6.0])).unwrap();
        assert_eq!(support(&c, VotingRule::CondorcetSimpson, 10.0), 7.0);
        assert_eq!(support(&c, VotingRule::ExhaustiveBallot, 10.0), 4.0);
        assert_eq!(support(&c, VotingRule::Borda, 10.0), 0.0);
    }
}
