//! Tagged score slots. A rule's slot shape is fixed by its family.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScoreFamily {
    /// One number (one-round and Condorcet rules).
    Scalar,
    /// One number per round (multi-round rules).
    PerRound,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "value", rename_all = "snake_case"))]
pub enum Score {
    Scalar(f64),
    PerRound(Vec<f64>),
}

impl Score {
    /// Neutral value a rule resets its slot to before accumulating.
    pub fn neutral(family: ScoreFamily) -> Score {
        match family {
            ScoreFamily::Scalar => Score::Scalar(0.0),
            ScoreFamily::PerRound => Score::PerRound(Vec::new()),
        }
    }

    pub fn family(&self) -> ScoreFamily {
        match self {
            Score::Scalar(_) => ScoreFamily::Scalar,
            Score::PerRound(_) => ScoreFamily::PerRound,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Score::Scalar(v) => Some(*v),
            Score::PerRound(_) => None,
        }
    }

    pub fn as_rounds(&self) -> Option<&[f64]> {
        match self {
            Score::PerRound(v) => Some(v),
            Score::Scalar(_) => None,
        }
    }
}
