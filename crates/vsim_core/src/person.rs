//! Candidates and electors.
//!
//! Identity (equality, hashing, ordering) is the id alone; positions and
//! scores mutate over a simulation without changing who a person is.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::geometry::{clip_unit, Position};
use crate::ids::{CandidateId, ElectorId};
use crate::rules::VotingRule;
use crate::scores::Score;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    pub id: CandidateId,
    pub position: Position,
    pub first_name: String,
    pub last_name: String,
    /// Probability of holding position during a poll round, in `[0,1]`.
    pub dogmatism: f64,
    /// Reluctance to drift toward the current winner, in `[0,1]`.
    pub opposition: f64,
    scores: BTreeMap<VotingRule, Score>,
}

impl Candidate {
    pub fn new(
        id: CandidateId,
        position: Position,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        dogmatism: f64,
        opposition: f64,
    ) -> Self {
        Self {
            id,
            position,
            first_name: first_name.into(),
            last_name: last_name.into(),
            dogmatism: clip_unit(dogmatism),
            opposition: clip_unit(opposition),
            scores: BTreeMap::new(),
        }
    }

    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (true, true) => self.id.to_string(),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (false, false) => format!("{} {}", self.first_name, self.last_name),
        }
    }

    pub fn scores(&self) -> &BTreeMap<VotingRule, Score> {
        &self.scores
    }

    pub fn score(&self, rule: VotingRule) -> Option<&Score> {
        self.scores.get(&rule)
    }

    /// Reset `rule`'s slot to its neutral value (0, or no rounds).
    pub fn reset_score(&mut self, rule: VotingRule) {
        self.scores.insert(rule, Score::neutral(rule.family()));
    }

    pub fn clear_scores(&mut self) {
        self.scores.clear();
    }

    /// Replace a whole slot, enforcing the rule family's shape.
    pub fn set_score(&mut self, rule: VotingRule, score: Score) -> Result<(), CoreError> {
        if score.family() != rule.family() {
            return Err(CoreError::ScoreShape { rule, expected: rule.family() });
        }
        self.scores.insert(rule, score);
        Ok(())
    }

    pub fn scalar(&self, rule: VotingRule) -> Result<f64, CoreError> {
        match self.scores.get(&rule) {
            Some(Score::Scalar(v)) => Ok(*v),
            Some(Score::PerRound(_)) => Err(CoreError::ScoreShape { rule, expected: rule.family() }),
            None => Err(CoreError::MissingScore(rule)),
        }
    }

    pub fn set_scalar(&mut self, rule: VotingRule, value: f64) -> Result<(), CoreError> {
        match self.scores.get_mut(&rule) {
            Some(Score::Scalar(v)) => {
                *v = value;
                Ok(())
            }
            Some(Score::PerRound(_)) => Err(CoreError::ScoreShape { rule, expected: rule.family() }),
            None => Err(CoreError::MissingScore(rule)),
        }
    }

    pub fn rounds(&self, rule: VotingRule) -> Result<&[f64], CoreError> {
        match self.scores.get(&rule) {
            Some(Score::PerRound(v)) => Ok(v),
            Some(Score::Scalar(_)) => Err(CoreError::ScoreShape { rule, expected: rule.family() }),
            None => Err(CoreError::MissingScore(rule)),
        }
    }

    pub fn round_score(&self, rule: VotingRule, round: usize) -> Result<f64, CoreError> {
        let rounds = self.rounds(rule)?;
        rounds
            .get(round)
            .copied()
            .ok_or(CoreError::RoundOutOfRange { rule, round, rounds: rounds.len() })
    }

    /// Open a new round slot initialized to `value`; returns its index.
    pub fn push_round(&mut self, rule: VotingRule, value: f64) -> Result<usize, CoreError> {
        let rounds = self.rounds_mut(rule)?;
        rounds.push(value);
        Ok(rounds.len() - 1)
    }

    fn rounds_mut(&mut self, rule: VotingRule) -> Result<&mut Vec<f64>, CoreError> {
        match self.scores.get_mut(&rule) {
            Some(Score::PerRound(v)) => Ok(v),
            Some(Score::Scalar(_)) => Err(CoreError::ScoreShape { rule, expected: rule.family() }),
            None => Err(CoreError::MissingScore(rule)),
        }
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Elector {
    pub id: ElectorId,
    pub position: Position,
    /// Vote weight after delegation: 0 = delegated away, n = own vote plus received ones.
    pub weight: u32,
    /// In `[0,1]`: keeps a static ranking and avoids delegating when high.
    pub knowledge: f64,
    candidates_ranked: Vec<CandidateId>,
}

impl Elector {
    pub fn new(id: ElectorId, position: Position, knowledge: f64) -> Self {
        Self {
            id,
            position,
            weight: 1,
            knowledge: clip_unit(knowledge),
            candidates_ranked: Vec::new(),
        }
    }

    /// Elector with a pre-supplied ranking (used by tests and imports).
    pub fn with_ranking(id: ElectorId, position: Position, ranking: Vec<CandidateId>) -> Self {
        let mut e = Self::new(id, position, 1.0);
        e.candidates_ranked = ranking;
        e
    }

    pub fn ranking(&self) -> &[CandidateId] {
        &self.candidates_ranked
    }

    pub fn set_ranking(&mut self, ranking: Vec<CandidateId>) {
        self.candidates_ranked = ranking;
    }

    pub fn ranking_mut(&mut self) -> &mut Vec<CandidateId> {
        &mut self.candidates_ranked
    }

    pub fn top_choice(&self) -> Option<CandidateId> {
        self.candidates_ranked.first().copied()
    }

    /// First candidate of the ranking that `keep` accepts.
    pub fn first_choice_among(&self, keep: impl Fn(CandidateId) -> bool) -> Option<CandidateId> {
        self.candidates_ranked.iter().copied().find(|c| keep(*c))
    }
}

impl PartialEq for Elector {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Elector {}

impl Hash for Elector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
