//! vsim_core: Core types, domains, and deterministic RNG for the election simulator.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! workspace (`vsim_algo`, `vsim_io`, `vsim_engine`, `vsim_report`, `vsim_cli`).
//!
//! - Geometry on the political map `[-1,1]²`
//! - Identity: `CandidateId`, `ElectorId`, monotonic id and name generators
//! - People: `Candidate`, `Elector`
//! - Per-rule score slots with a fixed shape per rule family
//! - `VotingRule` keys and `SimParams`
//! - Seedable RNG (ChaCha20) for every random draw of a simulation
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors;
pub mod geometry;
pub mod ids;
pub mod person;
pub mod rng;
pub mod rules;
pub mod scores;
pub mod variables;

pub use errors::CoreError;
pub use geometry::Position;
pub use ids::{CandidateId, ElectorId};
pub use person::{Candidate, Elector};
pub use rules::VotingRule;
pub use scores::{Score, ScoreFamily};
