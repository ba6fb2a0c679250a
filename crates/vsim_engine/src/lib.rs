//! vsim_engine: the Election orchestrator.
//!
//! Owns the electors and candidates of one simulation, computes the duel
//! matrix once per election, applies the selected voting rules and keeps
//! their results. Winners and satisfaction are derived on demand. Liquid
//! democracy (`delegate`), polls (`polls`) and snapshot import/export
//! (`snapshot`) extend the same `Election` value.
//!
//! There is no global instance: callers construct an `Election` and pass it
//! around explicitly.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use thiserror::Error;
use vsim_algo::tabulation::is_condorcet_winner;
use vsim_algo::{rank_all, DuelMatrix, RuleResult, TabError};
use vsim_core::geometry::PositionAccumulator;
use vsim_core::ids::{IdGenerator, NameGenerator};
use vsim_core::rng::SimRng;
use vsim_core::variables::SimParams;
use vsim_core::{Candidate, CandidateId, CoreError, Elector, ElectorId, Position, VotingRule};
use vsim_io::IoError;

pub mod delegate;
pub mod polls;
mod populate;
pub mod snapshot;
mod tabulate;

pub use delegate::DelegationSummary;
pub use polls::{PollRound, RegionGrid};

/// Single error surface for the orchestrator.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Tab(#[from] TabError),

    #[error(transparent)]
    Io(#[from] IoError),

    /// The average elector position is undefined without electors.
    #[error("no electors in the election")]
    NoElectors,

    #[error("unknown candidate {0}")]
    UnknownCandidate(CandidateId),

    #[error("import failed: {0}")]
    Import(String),
}

/// Lifecycle of an election. `Polling` is only observable from inside a poll run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ElectionState {
    #[default]
    Empty,
    Populated,
    Ranked,
    Resulted,
    Polling,
}

#[derive(Debug)]
pub struct Election {
    pub(crate) params: SimParams,
    pub(crate) electors: Vec<Elector>,
    pub(crate) candidates: Vec<Candidate>,
    /// Selected rules; `None` until the rule has been applied.
    pub(crate) results: BTreeMap<VotingRule, Option<RuleResult>>,
    pub(crate) duels: Option<DuelMatrix>,
    pub(crate) accumulator: PositionAccumulator,
    pub(crate) average: Option<Position>,
    pub(crate) proportion_satisfaction: f64,
    pub(crate) regions: RegionGrid,
    pub(crate) candidate_ids: IdGenerator,
    pub(crate) elector_ids: IdGenerator,
    pub(crate) names: NameGenerator,
    pub(crate) rng: SimRng,
    pub(crate) state: ElectionState,
    pub(crate) poll_log: Vec<PollRound>,
    /// People changed since electors last ranked the candidates.
    pub(crate) rankings_stale: bool,
}

impl Election {
    pub fn new(params: SimParams) -> Result<Self, EngineError> {
        params.validate_domains()?;
        Ok(Self {
            rng: SimRng::from_seed_u64(params.seed),
            regions: RegionGrid::new(params.region_grid),
            params,
            electors: Vec::new(),
            candidates: Vec::new(),
            results: BTreeMap::new(),
            duels: None,
            accumulator: PositionAccumulator::default(),
            average: None,
            proportion_satisfaction: 0.0,
            candidate_ids: IdGenerator::default(),
            elector_ids: IdGenerator::default(),
            names: NameGenerator::default(),
            state: ElectionState::Empty,
            poll_log: Vec::new(),
            rankings_stale: false,
        })
    }

    // ---- accessors ----

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn state(&self) -> ElectionState {
        self.state
    }

    pub fn electors(&self) -> &[Elector] {
        &self.electors
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn results(&self) -> &BTreeMap<VotingRule, Option<RuleResult>> {
        &self.results
    }

    pub fn result(&self, rule: VotingRule) -> Option<&RuleResult> {
        self.results.get(&rule).and_then(Option::as_ref)
    }

    pub fn duels(&self) -> Option<&DuelMatrix> {
        self.duels.as_ref()
    }

    /// Set by `start_election`.
    pub fn average_position(&self) -> Option<Position> {
        self.average
    }

    pub fn proportion_satisfaction(&self) -> f64 {
        self.proportion_satisfaction
    }

    pub fn poll_log(&self) -> &[PollRound] {
        &self.poll_log
    }

    pub fn rng_words_consumed(&self) -> u128 {
        self.rng.words_consumed()
    }

    // ---- settings ----

    /// Takes effect on the next rule application.
    pub fn set_tie_breaker(&mut self, on: bool) {
        self.params.tie_breaker = on;
    }

    /// Takes effect on the next `start_election`.
    pub fn set_liquid_democracy(&mut self, on: bool) {
        self.params.liquid_democracy = on;
    }

    /// Configure polling; the region grid is rebuilt from the current electors.
    pub fn set_polls(&mut self, polls: u32, rule: VotingRule) {
        self.params.polls = polls;
        self.params.poll_rule = rule;
        self.regions = RegionGrid::new(self.params.region_grid);
        if polls > 0 {
            for e in &self.electors {
                self.regions.add(&e.position);
            }
        }
    }

    // ---- people ----

    fn touched(&mut self) {
        for slot in self.results.values_mut() {
            *slot = None;
        }
        for c in &mut self.candidates {
            c.clear_scores();
        }
        self.duels = None;
        self.rankings_stale = true;
        self.state = ElectionState::Populated;
    }

    fn push_elector(&mut self, elector: Elector) -> ElectorId {
        let id = elector.id;
        self.accumulator.add(&elector.position);
        if self.params.polls > 0 {
            self.regions.add(&elector.position);
        }
        self.electors.push(elector);
        self.touched();
        id
    }

    /// Fresh elector; knowledge is drawn from the generation parameters.
    pub fn add_elector(&mut self, position: Position) -> ElectorId {
        let k = self.params.generation.knowledge;
        let knowledge = self.rng.normal(k.mean, k.std_dev);
        let id = self.elector_ids.next_elector();
        self.push_elector(Elector::new(id, position, knowledge))
    }

    /// Fresh elector with caller-supplied weight and knowledge.
    pub fn import_elector(&mut self, position: Position, weight: u32, knowledge: f64) -> ElectorId {
        let id = self.elector_ids.next_elector();
        let mut e = Elector::new(id, position, knowledge);
        e.weight = weight;
        self.push_elector(e)
    }

    /// Fresh candidate. Missing names come from the name generator; dogmatism
    /// and opposition are drawn from the generation parameters.
    pub fn add_candidate(&mut self, position: Position, names: Option<(String, String)>) -> CandidateId {
        let (first, last) = names.unwrap_or_else(|| self.names.next_name());
        let g = self.params.generation;
        let dogmatism = self.rng.normal(g.dogmatism.mean, g.dogmatism.std_dev);
        let opposition = self.rng.normal(g.opposition.mean, g.opposition.std_dev);
        self.import_candidate(position, first, last, dogmatism, opposition)
    }

    /// Fresh candidate with every attribute supplied.
    pub fn import_candidate(
        &mut self,
        position: Position,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        dogmatism: f64,
        opposition: f64,
    ) -> CandidateId {
        let id = self.candidate_ids.next_candidate();
        self.candidates.push(Candidate::new(id, position, first_name, last_name, dogmatism, opposition));
        self.touched();
        id
    }

    /// Every elector ranks the current candidates by distance.
    pub fn define_ranking(&mut self) {
        rank_all(&mut self.electors, &self.candidates);
        self.rankings_stale = false;
        if !self.electors.is_empty() {
            self.state = ElectionState::Ranked;
        }
    }

    // ---- election ----

    /// Rank, measure, optionally delegate, compute duels once and apply `rules`.
    pub fn start_election(&mut self, rules: &[VotingRule]) -> Result<(), EngineError> {
        if self.electors.is_empty() {
            return Err(EngineError::NoElectors);
        }
        tracing::info!(
            electors = self.electors.len(),
            candidates = self.candidates.len(),
            rules = rules.len(),
            "election start"
        );

        self.define_ranking();
        self.measure();

        for e in &mut self.electors {
            e.weight = 1;
        }
        if self.params.liquid_democracy {
            let summary = delegate::delegate(
                &mut self.electors,
                self.params.delegation_radius,
                self.params.delegation_mode,
                &mut self.rng,
            );
            tracing::debug!(delegated = summary.delegated, "delegation pass");
        }

        self.results = rules.iter().map(|r| (*r, None)).collect();
        self.duels = Some(DuelMatrix::compute(&self.electors, &self.candidates)?);
        for rule in rules {
            self.apply_voting_rule(*rule)?;
        }

        self.state = ElectionState::Resulted;
        tracing::info!("election finished");
        Ok(())
    }

    /// Average elector position and the satisfaction normalizer.
    pub(crate) fn measure(&mut self) {
        self.average = self.accumulator.average();
        self.proportion_satisfaction = match self.average {
            Some(average) => self.candidates.iter().map(|c| c.position.distance(&average)).fold(0.0, f64::max),
            None => 0.0,
        };
    }

    /// Apply one rule against the current rankings, re-ranking first when
    /// people were added since. No-op without electors or candidates, or with
    /// fewer candidates than the rule needs.
    pub fn apply_voting_rule(&mut self, rule: VotingRule) -> Result<(), EngineError> {
        if self.electors.is_empty() || self.candidates.is_empty() {
            tracing::warn!(%rule, "rule skipped: no electors or no candidates");
            return Ok(());
        }
        if self.candidates.len() < rule.min_candidates() {
            tracing::warn!(%rule, candidates = self.candidates.len(), "rule skipped: too few candidates");
            return Ok(());
        }
        if self.rankings_stale {
            self.define_ranking();
            self.measure();
            self.duels = None;
        }
        if self.duels.is_none() {
            self.duels = Some(DuelMatrix::compute(&self.electors, &self.candidates)?);
        }
        let duels = self.duels.as_ref().ok_or(EngineError::NoElectors)?;
        let result = tabulate::run_rule(rule, &self.electors, &mut self.candidates, duels, &self.params)?;
        tracing::debug!(%rule, leader = ?result.leader(), rounds = result.round_count(), "rule applied");
        self.results.insert(rule, Some(result));
        Ok(())
    }

    /// Recompute every selected rule against the current rankings.
    pub(crate) fn recompute_results(&mut self) -> Result<(), EngineError> {
        self.duels = Some(DuelMatrix::compute(&self.electors, &self.candidates)?);
        let rules: Vec<VotingRule> = self.results.keys().copied().collect();
        for rule in rules {
            self.apply_voting_rule(rule)?;
        }
        Ok(())
    }

    /// Winner of `rule`, computing the rule first if needed.
    ///
    /// `None` when the ranking is empty, or for Condorcet simple when nobody
    /// beat every other candidate.
    pub fn choose_winner(&mut self, rule: VotingRule) -> Result<Option<CandidateId>, EngineError> {
        if self.result(rule).is_none() {
            self.apply_voting_rule(rule)?;
        }
        let Some(leader) = self.result(rule).and_then(RuleResult::leader) else {
            return Ok(None);
        };
        if rule == VotingRule::CondorcetSimple {
            let beats_all = self.duels.as_ref().is_some_and(|d| is_condorcet_winner(d, leader));
            return Ok(beats_all.then_some(leader));
        }
        Ok(Some(leader))
    }

    /// `|d(candidate, average) − proportion| / proportion × 100`; 0 when the
    /// proportion is 0 or no election has run.
    pub fn calc_satisfaction(&self, id: CandidateId) -> Result<f64, EngineError> {
        let c = self.candidate(id).ok_or(EngineError::UnknownCandidate(id))?;
        let Some(average) = self.average else { return Ok(0.0) };
        let p = self.proportion_satisfaction;
        if p == 0.0 {
            return Ok(0.0);
        }
        Ok((c.position.distance(&average) - p).abs() / p * 100.0)
    }

    /// Satisfaction of every current candidate.
    pub fn satisfaction_table(&self) -> BTreeMap<CandidateId, f64> {
        self.candidates
            .iter()
            .filter_map(|c| self.calc_satisfaction(c.id).ok().map(|s| (c.id, s)))
            .collect()
    }

    /// Full reset: people, results, id/name counters and poll data.
    pub fn delete_all_data(&mut self) {
        self.electors.clear();
        self.candidates.clear();
        self.results.clear();
        self.duels = None;
        self.accumulator.reset();
        self.average = None;
        self.proportion_satisfaction = 0.0;
        self.regions = RegionGrid::new(self.params.region_grid);
        self.candidate_ids.reset();
        self.elector_ids.reset();
        self.names.reset();
        self.poll_log.clear();
        self.rankings_stale = false;
        self.state = ElectionState::Empty;
        tracing::debug!("election data deleted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election() -> Election {
        Election::new(SimParams::default()).unwrap()
    }

    #[test]
    fn start_without_electors_fails_explicitly() {
        let mut el = election();
        el.add_candidate(Position::new(0.0, 0.0), None);
        assert!(matches!(el.start_election(&[VotingRule::Borda]), Err(EngineError::NoElectors)));
        assert_eq!(el.state(), ElectionState::Populated);
    }

    #[test]
    fn apply_without_candidates_is_a_no_op() {
        let mut el = election();
        el.add_elector(Position::new(0.0, 0.0));
        el.start_election(&[VotingRule::Veto]).unwrap();
        assert!(el.result(VotingRule::Veto).is_none());
        assert_eq!(el.choose_winner(VotingRule::Veto).unwrap(), None);
    }

    #[test]
    fn ids_and_names_restart_after_delete() {
        let mut el = election();
        let a = el.add_candidate(Position::new(0.1, 0.1), None);
        el.add_candidate(Position::new(0.2, 0.2), Some(("Ada".into(), "Lovelace".into())));
        let first_name = el.candidates()[0].first_name.clone();
        el.delete_all_data();
        assert_eq!(el.state(), ElectionState::Empty);
        assert!(el.candidates().is_empty());
        let b = el.add_candidate(Position::new(0.3, 0.3), None);
        assert_eq!(a, b);
        assert_eq!(el.candidates()[0].first_name, first_name);
    }

    #[test]
    fn winner_and_satisfaction() {
        let mut el = election();
        let near = el.add_candidate(Position::new(0.0, 0.0), None);
        let far = el.add_candidate(Position::new(1.0, 0.0), None);
        el.add_elector(Position::new(-0.1, 0.0));
        el.add_elector(Position::new(0.1, 0.0));
        el.start_election(&[VotingRule::PluralityOneRound]).unwrap();

        assert_eq!(el.choose_winner(VotingRule::PluralityOneRound).unwrap(), Some(near));
        assert_eq!(el.average_position(), Some(Position::new(0.0, 0.0)));
        assert!((el.proportion_satisfaction() - 1.0).abs() < 1e-12);
        assert!((el.calc_satisfaction(near).unwrap() - 100.0).abs() < 1e-9);
        assert!(el.calc_satisfaction(far).unwrap().abs() < 1e-9);
        assert!(matches!(
            el.calc_satisfaction(CandidateId::from_raw(99)),
            Err(EngineError::UnknownCandidate(_))
        ));
    }

    #[test]
    fn satisfaction_is_zero_when_candidates_sit_on_the_average() {
        let mut el = election();
        let c = el.add_candidate(Position::new(0.0, 0.0), None);
        el.add_elector(Position::new(0.0, 0.5));
        el.add_elector(Position::new(0.0, -0.5));
        assert_eq!(el.calc_satisfaction(c).unwrap(), 0.0);
        el.start_election(&[]).unwrap();
        assert_eq!(el.proportion_satisfaction(), 0.0);
        assert_eq!(el.calc_satisfaction(c).unwrap(), 0.0);
    }

    #[test]
    fn choose_winner_computes_lazily() {
        let mut el = election();
        let a = el.add_candidate(Position::new(0.5, 0.5), None);
        el.add_candidate(Position::new(-0.5, -0.5), None);
        el.add_elector(Position::new(0.4, 0.4));
        el.start_election(&[]).unwrap();
        assert!(el.result(VotingRule::Borda).is_none());
        assert_eq!(el.choose_winner(VotingRule::Borda).unwrap(), Some(a));
        assert!(el.result(VotingRule::Borda).is_some());
    }

    #[test]
    fn condorcet_simple_without_a_winner_is_none() {
        // Three electors with a cyclic preference: A>B>C, B>C>A, C>A>B.
        let mut el = election();
        let a = el.add_candidate(Position::new(0.0, 0.8), None);
        let b = el.add_candidate(Position::new(0.7, -0.4), None);
        let c = el.add_candidate(Position::new(-0.7, -0.4), None);
        el.add_elector(Position::new(0.0, 0.0));
        el.add_elector(Position::new(0.0, 0.0));
        el.add_elector(Position::new(0.0, 0.0));
        el.start_election(&[]).unwrap();
        el.electors[0].set_ranking(vec![a, b, c]);
        el.electors[1].set_ranking(vec![b, c, a]);
        el.electors[2].set_ranking(vec![c, a, b]);
        el.recompute_results().unwrap();
        assert_eq!(el.choose_winner(VotingRule::CondorcetSimple).unwrap(), None);
        // Copeland still names somebody.
        assert!(el.choose_winner(VotingRule::CondorcetCopeland).unwrap().is_some());
    }

    #[test]
    fn adding_people_invalidates_results() {
        let mut el = election();
        el.add_candidate(Position::new(0.0, 0.0), None);
        el.add_candidate(Position::new(0.5, 0.0), None);
        el.add_elector(Position::new(0.1, 0.0));
        el.start_election(&[VotingRule::Veto]).unwrap();
        assert_eq!(el.state(), ElectionState::Resulted);
        assert!(el.result(VotingRule::Veto).is_some());

        el.add_elector(Position::new(0.4, 0.0));
        assert_eq!(el.state(), ElectionState::Populated);
        assert!(el.result(VotingRule::Veto).is_none());
        assert!(el.results().contains_key(&VotingRule::Veto));
        assert!(el.candidates().iter().all(|c| c.score(VotingRule::Veto).is_none()));

        // The recomputed result counts the newcomer.
        el.apply_voting_rule(VotingRule::Veto).unwrap();
        assert!(el.electors().iter().all(|e| e.ranking().len() == 2));
        let total: f64 = el.candidates().iter().map(|c| c.scalar(VotingRule::Veto).unwrap()).sum();
        assert_eq!(total, 2.0);
        assert_eq!(el.state(), ElectionState::Ranked);
    }

    #[test]
    fn candidate_added_after_an_election_can_win() {
        let mut el = election();
        el.add_candidate(Position::new(-0.9, -0.9), None);
        el.add_candidate(Position::new(-0.8, -0.9), None);
        el.add_elector(Position::new(0.9, 0.9));
        el.add_elector(Position::new(0.8, 0.9));
        el.start_election(&[VotingRule::PluralityOneRound]).unwrap();

        let newcomer = el.add_candidate(Position::new(0.9, 0.9), None);
        assert_eq!(el.choose_winner(VotingRule::PluralityOneRound).unwrap(), Some(newcomer));
        assert!(el.electors().iter().all(|e| e.ranking().len() == 3 && e.top_choice() == Some(newcomer)));
        let score = el.candidate(newcomer).unwrap().scalar(VotingRule::PluralityOneRound).unwrap();
        assert_eq!(score, 2.0);
        assert!(el.duels().is_some_and(|d| d.covers(newcomer)));
        // The satisfaction normalizer follows the new candidate set.
        let average = el.average_position().unwrap();
        assert!((el.proportion_satisfaction() - Position::new(-0.9, -0.9).distance(&average)).abs() < 1e-12);
    }

    #[test]
    fn winner_without_start_election_ranks_first() {
        let mut el = election();
        el.add_candidate(Position::new(-0.5, 0.0), None);
        let near = el.add_candidate(Position::new(0.5, 0.0), None);
        el.add_elector(Position::new(0.5, 0.0));

        assert_eq!(el.choose_winner(VotingRule::Borda).unwrap(), Some(near));
        assert_eq!(el.electors()[0].ranking().first(), Some(&near));
        assert_eq!(el.result(VotingRule::Borda).unwrap().final_ranking().len(), 2);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = SimParams { travel_fraction: 2.0, ..SimParams::default() };
        assert!(matches!(Election::new(params), Err(EngineError::Core(_))));
    }
}
