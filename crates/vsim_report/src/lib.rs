//! vsim_report: score tables built from an election snapshot.
//!
//! Pure: callers hand in a snapshot already in memory (plus satisfaction
//! percentages when they have an election to compute them from). Rules appear
//! in rule order, rounds in round order, rows in stored ranking order.

#![deny(unsafe_code)]

use thiserror::Error;
use vsim_core::{CandidateId, VotingRule};

pub mod render_text;
pub mod structure;

#[cfg(feature = "render_json")]
pub mod render_json;

pub use structure::{build_table, RoundTable, RuleTable, ScoreReport, ScoreRow};

// ===== Errors =====

#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    /// A ranking row has no matching score row.
    #[error("{rule}: no score stored for {candidate} in round {round}")]
    MissingScore { rule: VotingRule, candidate: CandidateId, round: u32 },

    #[error("{0} is ranked but not in the candidates table")]
    UnknownCandidate(CandidateId),

    #[error("json: {0}")]
    Json(String),
}
