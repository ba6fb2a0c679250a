//! Voting-rule keys and their static properties.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::scores::ScoreFamily;

/// Every rule the engine can apply. The wire token is the snake_case name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VotingRule {
    PluralityOneRound,
    PluralityTwoRounds,
    Veto,
    Borda,
    Approval,
    CondorcetSimple,
    CondorcetCopeland,
    CondorcetSimpson,
    ExhaustiveBallot,
}

/// Direction in which a rule's scores rank candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreOrder {
    /// Higher score is better.
    Descending,
    /// Lower score is better (Simpson: smallest worst-case defeat).
    Ascending,
}

impl VotingRule {
    pub const ALL: [VotingRule; 9] = [
        VotingRule::PluralityOneRound,
        VotingRule::PluralityTwoRounds,
        VotingRule::Veto,
        VotingRule::Borda,
        VotingRule::Approval,
        VotingRule::CondorcetSimple,
        VotingRule::CondorcetCopeland,
        VotingRule::CondorcetSimpson,
        VotingRule::ExhaustiveBallot,
    ];

    pub fn key(self) -> &'static str {
        match self {
            VotingRule::PluralityOneRound => "plurality_one_round",
            VotingRule::PluralityTwoRounds => "plurality_two_rounds",
            VotingRule::Veto => "veto",
            VotingRule::Borda => "borda",
            VotingRule::Approval => "approval",
            VotingRule::CondorcetSimple => "condorcet_simple",
            VotingRule::CondorcetCopeland => "condorcet_copeland",
            VotingRule::CondorcetSimpson => "condorcet_simpson",
            VotingRule::ExhaustiveBallot => "exhaustive_ballot",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            VotingRule::PluralityOneRound => "Plurality (1 round)",
            VotingRule::PluralityTwoRounds => "Plurality (2 rounds)",
            VotingRule::Veto => "Veto",
            VotingRule::Borda => "Borda",
            VotingRule::Approval => "Approval",
            VotingRule::CondorcetSimple => "Condorcet (simple)",
            VotingRule::CondorcetCopeland => "Condorcet (Copeland)",
            VotingRule::CondorcetSimpson => "Condorcet (Simpson)",
            VotingRule::ExhaustiveBallot => "Exhaustive ballot",
        }
    }

    /// Shape of the per-candidate score slot this rule writes.
    pub fn family(self) -> ScoreFamily {
        match self {
            VotingRule::PluralityTwoRounds | VotingRule::ExhaustiveBallot => ScoreFamily::PerRound,
            _ => ScoreFamily::Scalar,
        }
    }

    #[inline]
    pub fn is_multi_round(self) -> bool {
        self.family() == ScoreFamily::PerRound
    }

    pub fn score_order(self) -> ScoreOrder {
        match self {
            VotingRule::CondorcetSimpson => ScoreOrder::Ascending,
            _ => ScoreOrder::Descending,
        }
    }

    /// Copeland already is the duel aggregate, so duel tie-breaking adds nothing.
    pub fn supports_tie_break(self) -> bool {
        !matches!(self, VotingRule::CondorcetCopeland)
    }

    /// Smallest candidate set the rule is meaningful for. Callers check it.
    pub fn min_candidates(self) -> usize {
        2
    }
}

impl fmt::Display for VotingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for VotingRule {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        VotingRule::ALL
            .iter()
            .copied()
            .find(|r| r.key() == wanted)
            .ok_or_else(|| CoreError::UnknownRule(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_back() {
        for rule in VotingRule::ALL {
            assert_eq!(rule.key().parse::<VotingRule>().unwrap(), rule);
        }
        assert_eq!("Exhaustive-Ballot".parse::<VotingRule>().unwrap(), VotingRule::ExhaustiveBallot);
        assert!(matches!("schulze".parse::<VotingRule>(), Err(CoreError::UnknownRule(_))));
    }

    #[test]
    fn families_and_orders() {
        assert_eq!(VotingRule::Borda.family(), ScoreFamily::Scalar);
        assert!(VotingRule::PluralityTwoRounds.is_multi_round());
        assert!(VotingRule::ExhaustiveBallot.is_multi_round());
        assert_eq!(VotingRule::CondorcetSimpson.score_order(), ScoreOrder::Ascending);
        assert!(!VotingRule::CondorcetCopeland.supports_tie_break());
        assert!(VotingRule::Veto.supports_tie_break());
    }
}
