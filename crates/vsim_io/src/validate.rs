//! crates/vsim_io/src/validate.rs
//! Structural & semantic validation of a snapshot before any import.
//! Reports every finding instead of stopping at the first; issue order is stable.

use std::collections::{BTreeMap, BTreeSet};

use vsim_core::{CandidateId, ScoreFamily, VotingRule};

use crate::hasher::is_sha256_hex;
use crate::snapshot::{ElectionSnapshot, FORMAT_VERSION};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    /// JSON-pointer-like location, e.g. `/candidates/3/x`.
    pub pointer: String,
    pub message: String,
}

/// pass = no Error-severity issue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// One line per error, for "import failed: ..." messages.
    pub fn summary(&self) -> String {
        self.errors()
            .map(|i| format!("{} at {}: {}", i.code, i.pointer, i.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn error(&mut self, code: &'static str, pointer: String, message: String) {
        self.0.push(ValidationIssue { severity: Severity::Error, code, pointer, message });
    }

    fn warning(&mut self, code: &'static str, pointer: String, message: String) {
        self.0.push(ValidationIssue { severity: Severity::Warning, code, pointer, message });
    }
}

pub fn validate_snapshot(s: &ElectionSnapshot) -> ValidationReport {
    let mut out = Issues(Vec::new());

    check_header(s, &mut out);
    let candidate_ids = check_candidates(s, &mut out);
    check_electors(s, &mut out);
    check_one_round(s, &candidate_ids, &mut out);
    check_multi_round(s, &candidate_ids, &mut out);
    check_duels(s, &candidate_ids, &mut out);
    check_rankings(s, &candidate_ids, &mut out);

    let mut issues = out.0;
    issues.sort_by(|a, b| {
        (a.severity, a.code, &a.pointer, &a.message).cmp(&(b.severity, b.code, &b.pointer, &b.message))
    });
    ValidationReport { pass: !issues.iter().any(|i| i.severity == Severity::Error), issues }
}

// ------------------------------------------------------------------------------------------------

fn on_map(v: f64) -> bool {
    v.is_finite() && (-1.0..=1.0).contains(&v)
}

fn in_unit(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

fn check_header(s: &ElectionSnapshot, out: &mut Issues) {
    if s.format_version != FORMAT_VERSION {
        out.error(
            "snapshot.version",
            "/format_version".into(),
            format!("unsupported format version {} (expected {FORMAT_VERSION})", s.format_version),
        );
    }
    for (key, v) in [
        ("liquid_democracy_activated", s.settings.liquid_democracy_activated),
        ("tie_breaker_activated", s.settings.tie_breaker_activated),
    ] {
        if v > 1 {
            out.error("settings.flag", format!("/settings/{key}"), format!("flag must be 0 or 1, got {v}"));
        }
    }
    if let Some(d) = &s.digest {
        if !is_sha256_hex(d) {
            out.error("snapshot.digest", "/digest".into(), "digest must be 64 lowercase hex chars".into());
        }
    }
}

fn check_candidates(s: &ElectionSnapshot, out: &mut Issues) -> BTreeSet<CandidateId> {
    let mut seen = BTreeSet::new();
    for (i, c) in s.candidates.iter().enumerate() {
        if !seen.insert(c.id) {
            out.error("candidates.duplicate_id", format!("/candidates/{i}/id"), format!("duplicate id {}", c.id));
        }
        for (field, v) in [("x", c.x), ("y", c.y)] {
            if !on_map(v) {
                out.error("candidates.position", format!("/candidates/{i}/{field}"), format!("{v} outside [-1,1]"));
            }
        }
        for (field, v) in [("dogmatism", c.dogmatism), ("opposition", c.opposition)] {
            if !in_unit(v) {
                out.error("candidates.fraction", format!("/candidates/{i}/{field}"), format!("{v} outside [0,1]"));
            }
        }
    }
    seen
}

fn check_electors(s: &ElectionSnapshot, out: &mut Issues) {
    let mut seen = BTreeSet::new();
    for (i, e) in s.electors.iter().enumerate() {
        if !seen.insert(e.id) {
            out.error("electors.duplicate_id", format!("/electors/{i}/id"), format!("duplicate id {}", e.id));
        }
        for (field, v) in [("x", e.x), ("y", e.y)] {
            if !on_map(v) {
                out.error("electors.position", format!("/electors/{i}/{field}"), format!("{v} outside [-1,1]"));
            }
        }
        if !in_unit(e.knowledge) {
            out.error("electors.fraction", format!("/electors/{i}/knowledge"), format!("{} outside [0,1]", e.knowledge));
        }
    }
    let total: u64 = s.electors.iter().map(|e| u64::from(e.weight)).sum();
    if total != s.electors.len() as u64 {
        out.warning(
            "electors.weight_total",
            "/electors".into(),
            format!("weights sum to {total} for {} electors", s.electors.len()),
        );
    }
}

fn dangling(known: &BTreeSet<CandidateId>, id: CandidateId, pointer: String, out: &mut Issues) {
    if !known.contains(&id) {
        out.error("ref.candidate", pointer, format!("unknown candidate {id}"));
    }
}

fn check_one_round(s: &ElectionSnapshot, known: &BTreeSet<CandidateId>, out: &mut Issues) {
    let mut seen = BTreeSet::new();
    for (i, r) in s.one_round_results.iter().enumerate() {
        let p = format!("/one_round_results/{i}");
        dangling(known, r.candidate_id, format!("{p}/candidate_id"), out);
        if r.voting_rule.family() != ScoreFamily::Scalar {
            out.error("results.family", format!("{p}/voting_rule"), format!("{} is a multi-round rule", r.voting_rule));
        }
        if !r.score.is_finite() {
            out.error("results.score", format!("{p}/score"), "score must be finite".into());
        }
        if !seen.insert((r.voting_rule, r.candidate_id)) {
            out.error("results.duplicate", p, format!("second score for {} under {}", r.candidate_id, r.voting_rule));
        }
    }
}

fn check_multi_round(s: &ElectionSnapshot, known: &BTreeSet<CandidateId>, out: &mut Issues) {
    let mut rounds: BTreeMap<(VotingRule, CandidateId), Vec<u32>> = BTreeMap::new();
    for (i, r) in s.multi_round_results.iter().enumerate() {
        let p = format!("/multi_round_results/{i}");
        dangling(known, r.candidate_id, format!("{p}/candidate_id"), out);
        if r.voting_rule.family() != ScoreFamily::PerRound {
            out.error("results.family", format!("{p}/voting_rule"), format!("{} is a one-round rule", r.voting_rule));
        }
        if !r.score.is_finite() {
            out.error("results.score", format!("{p}/score"), "score must be finite".into());
        }
        rounds.entry((r.voting_rule, r.candidate_id)).or_default().push(r.round);
    }
    for ((rule, id), mut rs) in rounds {
        rs.sort_unstable();
        if rs.iter().enumerate().any(|(i, r)| *r as usize != i) {
            out.error(
                "results.rounds",
                "/multi_round_results".into(),
                format!("rounds for {id} under {rule} are not 0..n: {rs:?}"),
            );
        }
    }
}

fn check_duels(s: &ElectionSnapshot, known: &BTreeSet<CandidateId>, out: &mut Issues) {
    let mut pairs = BTreeSet::new();
    for (i, d) in s.duels.iter().enumerate() {
        let p = format!("/duels/{i}");
        dangling(known, d.winner_id, format!("{p}/winner_id"), out);
        dangling(known, d.loser_id, format!("{p}/loser_id"), out);
        if d.winner_id == d.loser_id {
            out.error("duels.self", p.clone(), format!("{} duels itself", d.winner_id));
        }
        if d.score < d.against {
            out.error("duels.orientation", p.clone(), format!("score {} below against {}", d.score, d.against));
        }
        let key = (d.winner_id.min(d.loser_id), d.winner_id.max(d.loser_id));
        if !pairs.insert(key) {
            out.error("duels.duplicate", p, format!("pair {}-{} listed twice", key.0, key.1));
        }
    }
}

fn check_rankings(s: &ElectionSnapshot, known: &BTreeSet<CandidateId>, out: &mut Issues) {
    let mut groups: BTreeMap<(VotingRule, u32), Vec<(u32, CandidateId)>> = BTreeMap::new();
    for (i, r) in s.rankings.iter().enumerate() {
        let p = format!("/rankings/{i}");
        dangling(known, r.candidate_id, format!("{p}/candidate_id"), out);
        if r.round > 0 && !r.voting_rule.is_multi_round() {
            out.error("rankings.round", format!("{p}/round"), format!("{} has a single round", r.voting_rule));
        }
        groups.entry((r.voting_rule, r.round)).or_default().push((r.position, r.candidate_id));
    }

    let mut rounds_per_rule: BTreeMap<VotingRule, Vec<u32>> = BTreeMap::new();
    for ((rule, round), mut rows) in groups {
        rounds_per_rule.entry(rule).or_default().push(round);
        rows.sort_unstable();
        if rows.iter().enumerate().any(|(i, (pos, _))| *pos as usize != i) {
            out.error("rankings.positions", "/rankings".into(), format!("{rule} round {round}: positions are not 0..n"));
        }
        let distinct: BTreeSet<CandidateId> = rows.iter().map(|(_, c)| *c).collect();
        if distinct.len() != rows.len() {
            out.error("rankings.repeat", "/rankings".into(), format!("{rule} round {round}: candidate listed twice"));
        }
    }
    for (rule, rounds) in rounds_per_rule {
        // BTreeMap iteration already sorted the rounds.
        if rounds.iter().enumerate().any(|(i, r)| *r as usize != i) {
            out.error("rankings.rounds", "/rankings".into(), format!("{rule}: rounds are not 0..n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{CandidateRow, DuelRow, ElectorRow, MultiRoundRow, OneRoundRow, RankingRow, Settings};
    use vsim_core::ElectorId;

    fn cid(raw: u32) -> CandidateId {
        CandidateId::from_raw(raw)
    }

    fn candidate(raw: u32, x: f64) -> CandidateRow {
        CandidateRow {
            id: cid(raw),
            x,
            y: 0.0,
            first_name: String::new(),
            last_name: String::new(),
            dogmatism: 0.5,
            opposition: 0.5,
        }
    }

    fn good() -> ElectionSnapshot {
        ElectionSnapshot {
            settings: Settings::from_flags(false, true),
            candidates: vec![candidate(0, 0.1), candidate(1, -0.4)],
            electors: vec![ElectorRow { id: ElectorId::from_raw(0), x: 0.0, y: 0.0, weight: 1, knowledge: 0.3 }],
            one_round_results: vec![OneRoundRow { candidate_id: cid(0), voting_rule: VotingRule::Borda, score: 1.0 }],
            multi_round_results: vec![
                MultiRoundRow { candidate_id: cid(0), voting_rule: VotingRule::ExhaustiveBallot, round: 0, score: 1.0 },
                MultiRoundRow { candidate_id: cid(1), voting_rule: VotingRule::ExhaustiveBallot, round: 0, score: 0.0 },
            ],
            duels: vec![DuelRow { winner_id: cid(0), loser_id: cid(1), score: 1, against: 0 }],
            rankings: vec![
                RankingRow { voting_rule: VotingRule::Borda, round: 0, position: 0, candidate_id: cid(0) },
                RankingRow { voting_rule: VotingRule::Borda, round: 0, position: 1, candidate_id: cid(1) },
            ],
            ..ElectionSnapshot::default()
        }
    }

    fn codes(r: &ValidationReport) -> Vec<&'static str> {
        r.issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn clean_snapshot_passes() {
        let r = validate_snapshot(&good());
        assert!(r.pass, "{:?}", r.issues);
        assert!(r.issues.is_empty());
    }

    #[test]
    fn positions_and_fractions_are_checked() {
        let mut s = good();
        s.candidates[1].x = 1.5;
        s.electors[0].knowledge = -0.1;
        let r = validate_snapshot(&s);
        assert!(!r.pass);
        assert!(codes(&r).contains(&"candidates.position"));
        assert!(codes(&r).contains(&"electors.fraction"));
        assert!(r.summary().contains("/candidates/1/x"));
    }

    #[test]
    fn family_mismatch_and_dangling_refs() {
        let mut s = good();
        s.one_round_results.push(OneRoundRow {
            candidate_id: cid(9),
            voting_rule: VotingRule::PluralityTwoRounds,
            score: 2.0,
        });
        s.duels.push(DuelRow { winner_id: cid(1), loser_id: cid(0), score: 0, against: 1 });
        let r = validate_snapshot(&s);
        let c = codes(&r);
        assert!(c.contains(&"results.family"));
        assert!(c.contains(&"ref.candidate"));
        assert!(c.contains(&"duels.duplicate"));
        assert!(c.contains(&"duels.orientation"));
    }

    #[test]
    fn round_gaps_and_bad_flags() {
        let mut s = good();
        s.multi_round_results.push(MultiRoundRow {
            candidate_id: cid(0),
            voting_rule: VotingRule::ExhaustiveBallot,
            round: 2,
            score: 1.0,
        });
        s.settings.tie_breaker_activated = 2;
        s.rankings[1].position = 3;
        let r = validate_snapshot(&s);
        let c = codes(&r);
        assert!(c.contains(&"results.rounds"));
        assert!(c.contains(&"settings.flag"));
        assert!(c.contains(&"rankings.positions"));
    }

    #[test]
    fn weight_mismatch_is_only_a_warning() {
        let mut s = good();
        s.electors[0].weight = 3;
        let r = validate_snapshot(&s);
        assert!(r.pass);
        assert_eq!(r.issues[0].severity, Severity::Warning);
    }
}
