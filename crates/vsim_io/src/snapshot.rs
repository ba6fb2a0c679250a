//! Persisted election snapshot.
//!
//! Tables mirror what an election needs to be rebuilt: people, one-round and
//! multi-round scores, the duel table, each rule's stored ranking, and the
//! two settings flags (0/1). Ids are the ids at export time; importers remap
//! them onto fresh in-memory ids.
//!
//! Rows are emitted in a stable order so canonical bytes, and therefore the
//! digest, only depend on content.

use serde::{Deserialize, Serialize};
use vsim_core::{CandidateId, ElectorId, VotingRule};

use crate::hasher::sha256_canonical;
use crate::IoError;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub liquid_democracy_activated: u8,
    pub tie_breaker_activated: u8,
}

impl Settings {
    pub fn from_flags(liquid_democracy: bool, tie_breaker: bool) -> Self {
        Self {
            liquid_democracy_activated: u8::from(liquid_democracy),
            tie_breaker_activated: u8::from(tie_breaker),
        }
    }

    pub fn liquid_democracy(&self) -> bool {
        self.liquid_democracy_activated == 1
    }

    pub fn tie_breaker(&self) -> bool {
        self.tie_breaker_activated == 1
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub id: CandidateId,
    pub x: f64,
    pub y: f64,
    pub first_name: String,
    pub last_name: String,
    pub dogmatism: f64,
    pub opposition: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElectorRow {
    pub id: ElectorId,
    pub x: f64,
    pub y: f64,
    pub weight: u32,
    pub knowledge: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneRoundRow {
    pub candidate_id: CandidateId,
    pub voting_rule: VotingRule,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiRoundRow {
    pub candidate_id: CandidateId,
    pub voting_rule: VotingRule,
    pub round: u32,
    pub score: f64,
}

/// One unordered pair; `score` is the winner's weighted preference count,
/// `against` the loser's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelRow {
    pub winner_id: CandidateId,
    pub loser_id: CandidateId,
    pub score: u64,
    pub against: u64,
}

/// `position` 0 is the best-placed candidate of `round`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRow {
    pub voting_rule: VotingRule,
    pub round: u32,
    pub position: u32,
    pub candidate_id: CandidateId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElectionSnapshot {
    pub format_version: u32,
    pub settings: Settings,
    pub candidates: Vec<CandidateRow>,
    pub electors: Vec<ElectorRow>,
    #[serde(default)]
    pub one_round_results: Vec<OneRoundRow>,
    #[serde(default)]
    pub multi_round_results: Vec<MultiRoundRow>,
    #[serde(default)]
    pub duels: Vec<DuelRow>,
    #[serde(default)]
    pub rankings: Vec<RankingRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl Default for ElectionSnapshot {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            settings: Settings::default(),
            candidates: Vec::new(),
            electors: Vec::new(),
            one_round_results: Vec::new(),
            multi_round_results: Vec::new(),
            duels: Vec::new(),
            rankings: Vec::new(),
            digest: None,
        }
    }
}

impl ElectionSnapshot {
    /// Rules that have a stored ranking, in rule order.
    pub fn ranked_rules(&self) -> Vec<VotingRule> {
        let mut rules: Vec<VotingRule> = self.rankings.iter().map(|r| r.voting_rule).collect();
        rules.sort();
        rules.dedup();
        rules
    }

    /// Stored rankings of `rule`, one `Vec` per round, best first.
    pub fn rule_rounds(&self, rule: VotingRule) -> Vec<Vec<CandidateId>> {
        let mut rows: Vec<&RankingRow> = self.rankings.iter().filter(|r| r.voting_rule == rule).collect();
        rows.sort_by_key(|r| (r.round, r.position));
        let mut out: Vec<Vec<CandidateId>> = Vec::new();
        for r in rows {
            let round = r.round as usize;
            while out.len() <= round {
                out.push(Vec::new());
            }
            out[round].push(r.candidate_id);
        }
        out
    }

    /// Put every table into its canonical row order.
    pub fn sort_rows(&mut self) {
        self.candidates.sort_by_key(|c| c.id);
        self.electors.sort_by_key(|e| e.id);
        self.one_round_results.sort_by_key(|r| (r.voting_rule, r.candidate_id));
        self.multi_round_results.sort_by_key(|r| (r.voting_rule, r.candidate_id, r.round));
        self.duels.sort_by_key(|d| (d.winner_id.min(d.loser_id), d.winner_id.max(d.loser_id)));
        self.rankings.sort_by_key(|r| (r.voting_rule, r.round, r.position));
    }

    /// Digest over the canonical bytes with `digest` itself left out.
    pub fn compute_digest(&self) -> Result<String, IoError> {
        let mut unsealed = self.clone();
        unsealed.digest = None;
        sha256_canonical(&unsealed)
    }

    /// Sort rows and store the digest.
    pub fn seal(&mut self) -> Result<(), IoError> {
        self.sort_rows();
        self.digest = Some(self.compute_digest()?);
        Ok(())
    }

    /// Ok when no digest is stored or it matches the content.
    pub fn verify_digest(&self) -> Result<(), IoError> {
        let Some(stored) = &self.digest else { return Ok(()) };
        let computed = self.compute_digest()?;
        if *stored == computed {
            Ok(())
        } else {
            Err(IoError::DigestMismatch { stored: stored.clone(), computed })
        }
    }
}
