//! Core error set for domain validation and score-slot access.

use thiserror::Error;

use crate::rules::VotingRule;
use crate::scores::ScoreFamily;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum CoreError {
    /// A value fell outside its documented domain (e.g. a coordinate outside `[-1,1]`).
    #[error("domain out of range: {0}")]
    DomainOutOfRange(&'static str),

    /// A score slot was accessed with the wrong shape; `expected` is the
    /// shape the rule's family requires.
    #[error("score slot for {rule} is {expected:?}-shaped")]
    ScoreShape { rule: VotingRule, expected: ScoreFamily },

    /// A per-round write or read addressed a round that was never initialized.
    #[error("round {round} out of range for {rule} ({rounds} rounds initialized)")]
    RoundOutOfRange { rule: VotingRule, round: usize, rounds: usize },

    /// No score slot exists yet for this rule.
    #[error("no score recorded for {0}")]
    MissingScore(VotingRule),

    #[error("unknown voting rule: {0}")]
    UnknownRule(String),
}
