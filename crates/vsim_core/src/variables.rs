//! Simulation parameters with safe defaults and domain validation.
//!
//! Every field has a default so a params file only needs the values it
//! overrides (`#[serde(default)]` on each struct).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::rules::VotingRule;

/// How a delegation pass mutates weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DelegationMode {
    /// Electors are visited in order and transfers apply immediately, so an
    /// elector who already delegated is no longer an eligible target.
    #[default]
    Sequential,
    /// Every elector picks a target against the starting weights, then all
    /// transfers apply at once. Independent of visiting order.
    TwoPhase,
}

/// Mean / standard deviation of a normal draw clipped to `[0,1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self { mean: 0.5, std_dev: 0.2 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GenerationParams {
    pub knowledge: NormalParams,
    pub dogmatism: NormalParams,
    pub opposition: NormalParams,
    /// `None`: electors uniform over the map. `Some(s)`: normal around a random centre.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub elector_spread: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimParams {
    /// Poll rounds run after the first election. 0 disables polling.
    pub polls: u32,
    /// Rule whose winner drives poll drift.
    pub poll_rule: VotingRule,
    pub tie_breaker: bool,
    pub liquid_democracy: bool,
    pub delegation_mode: DelegationMode,

    /// Added to the top-choice distance to form an elector's approval radius.
    pub approval_gap: f64,
    pub delegation_radius: f64,
    /// Share of the remaining gap a moving candidate covers per poll.
    pub travel_fraction: f64,
    /// Support ratio (vs. the winner) below which a candidate may withdraw.
    pub give_up_threshold: f64,
    /// A withdrawing candidate needs a stronger ally this close.
    pub alliance_radius: f64,
    /// Cells per side of the poll region grid.
    pub region_grid: u32,
    /// Weight of elector spread in the region score.
    pub variance_weight: f64,

    pub seed: u64,
    pub generation: GenerationParams,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            polls: 0,
            poll_rule: VotingRule::PluralityOneRound,
            tie_breaker: false,
            liquid_democracy: false,
            delegation_mode: DelegationMode::Sequential,
            approval_gap: 0.3,
            delegation_radius: 0.3,
            travel_fraction: 0.2,
            give_up_threshold: 0.5,
            alliance_radius: 0.5,
            region_grid: 4,
            variance_weight: 0.5,
            seed: 0,
            generation: GenerationParams::default(),
        }
    }
}

fn unit(v: f64, what: &'static str) -> Result<(), CoreError> {
    if v.is_finite() && (0.0..=1.0).contains(&v) { Ok(()) } else { Err(CoreError::DomainOutOfRange(what)) }
}

fn non_negative(v: f64, what: &'static str) -> Result<(), CoreError> {
    if v.is_finite() && v >= 0.0 { Ok(()) } else { Err(CoreError::DomainOutOfRange(what)) }
}

fn positive(v: f64, what: &'static str) -> Result<(), CoreError> {
    if v.is_finite() && v > 0.0 { Ok(()) } else { Err(CoreError::DomainOutOfRange(what)) }
}

impl NormalParams {
    fn validate(&self, mean: &'static str, std_dev: &'static str) -> Result<(), CoreError> {
        unit(self.mean, mean)?;
        non_negative(self.std_dev, std_dev)
    }
}

impl SimParams {
    /// Check numeric domains. Called before any simulation uses the params.
    pub fn validate_domains(&self) -> Result<(), CoreError> {
        non_negative(self.approval_gap, "approval_gap must be >= 0")?;
        positive(self.delegation_radius, "delegation_radius must be > 0")?;
        unit(self.travel_fraction, "travel_fraction must be in [0,1]")?;
        unit(self.give_up_threshold, "give_up_threshold must be in [0,1]")?;
        positive(self.alliance_radius, "alliance_radius must be > 0")?;
        non_negative(self.variance_weight, "variance_weight must be >= 0")?;
        if self.region_grid == 0 {
            return Err(CoreError::DomainOutOfRange("region_grid must be >= 1"));
        }

        let g = &self.generation;
        g.knowledge.validate("knowledge.mean must be in [0,1]", "knowledge.std_dev must be >= 0")?;
        g.dogmatism.validate("dogmatism.mean must be in [0,1]", "dogmatism.std_dev must be >= 0")?;
        g.opposition.validate("opposition.mean must be in [0,1]", "opposition.std_dev must be >= 0")?;
        if let Some(spread) = g.elector_spread {
            positive(spread, "elector_spread must be > 0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let p = SimParams::default();
        assert!(p.validate_domains().is_ok());
        assert_eq!(p.approval_gap, 0.3);
        assert_eq!(p.region_grid, 4);
        assert_eq!(p.delegation_mode, DelegationMode::Sequential);
    }

    #[test]
    fn out_of_domain_values_are_rejected() {
        let mut p = SimParams { travel_fraction: 1.5, ..SimParams::default() };
        assert!(matches!(p.validate_domains(), Err(CoreError::DomainOutOfRange(_))));

        p = SimParams { region_grid: 0, ..SimParams::default() };
        assert!(p.validate_domains().is_err());

        p = SimParams::default();
        p.generation.dogmatism.std_dev = -0.1;
        assert!(p.validate_domains().is_err());

        p = SimParams::default();
        p.generation.elector_spread = Some(0.0);
        assert!(p.validate_domains().is_err());

        p = SimParams { delegation_radius: f64::NAN, ..SimParams::default() };
        assert!(p.validate_domains().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let p: SimParams =
            serde_json::from_str(r#"{"polls": 3, "poll_rule": "borda", "generation": {"elector_spread": 0.4}}"#)
                .unwrap();
        assert_eq!(p.polls, 3);
        assert_eq!(p.poll_rule, VotingRule::Borda);
        assert_eq!(p.generation.elector_spread, Some(0.4));
        assert_eq!(p.generation.knowledge, NormalParams::default());
        assert_eq!(p.approval_gap, 0.3);
    }
}
