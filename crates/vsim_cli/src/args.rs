// crates/vsim_cli/src/args.rs
//
// Argument surface of `vsim`. Flags override the matching fields of the
// params file (or of the defaults when no file is given).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use vsim_core::variables::SimParams;
use vsim_core::VotingRule;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Text,
    Json,
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "vsim",
    disable_help_subcommand = true,
    about = "Political-map election simulator: generate or import an election, apply voting rules, render and export"
)]
pub struct Args {
    /// Simulation params JSON; absent fields take their defaults.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Election snapshot whose people are imported instead of generated.
    #[arg(long, conflicts_with_all = ["electors", "candidates"])]
    pub import: Option<PathBuf>,

    /// Electors to generate.
    #[arg(long, default_value_t = 100)]
    pub electors: usize,

    /// Candidates to generate.
    #[arg(long, default_value_t = 5)]
    pub candidates: usize,

    /// RNG seed: decimal u64 or 0x-hex (1..16 digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// Voting rule to apply (repeatable). Default: every rule.
    #[arg(long = "rule", value_parser = parse_rule)]
    pub rules: Vec<VotingRule>,

    /// Poll rounds to run after the election.
    #[arg(long)]
    pub polls: Option<u32>,

    /// Rule whose winner drives the polls.
    #[arg(long, value_parser = parse_rule)]
    pub poll_rule: Option<VotingRule>,

    #[arg(long)]
    pub tie_breaker: bool,

    #[arg(long)]
    pub liquid_democracy: bool,

    /// Write the resulting snapshot here (canonical JSON with digest).
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = RenderFormat::Text)]
    pub render: RenderFormat,

    /// Load and validate `--import` only; run nothing.
    #[arg(long, requires = "import")]
    pub validate_only: bool,

    /// Only warnings and errors on stderr.
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Debug logging on stderr.
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    /// Rules to apply, in rule order without repeats.
    pub fn selected_rules(&self) -> Vec<VotingRule> {
        if self.rules.is_empty() {
            return VotingRule::ALL.to_vec();
        }
        let mut rules = self.rules.clone();
        rules.sort();
        rules.dedup();
        rules
    }

    /// Fold flag overrides into `params`.
    pub fn apply_overrides(&self, params: &mut SimParams) {
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some(polls) = self.polls {
            params.polls = polls;
        }
        if let Some(rule) = self.poll_rule {
            params.poll_rule = rule;
        }
        if self.tie_breaker {
            params.tie_breaker = true;
        }
        if self.liquid_democracy {
            params.liquid_democracy = true;
        }
    }

    /// Default filter directive when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

pub fn parse_rule(s: &str) -> Result<VotingRule, String> {
    s.trim().parse::<VotingRule>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_parser_decimal_and_hex() {
        assert_eq!(parse_seed("42").unwrap(), 42u64);
        assert_eq!(parse_seed("0x2A").unwrap(), 42u64);
        assert!(parse_seed("0x").is_err());
        assert!(parse_seed("0xFFFFFFFFFFFFFFFFF").is_err()); // 17 nybbles
        assert!(parse_seed("-1").is_err());
    }

    #[test]
    fn rules_parse_from_wire_keys() {
        assert_eq!(parse_rule("condorcet_simpson").unwrap(), VotingRule::CondorcetSimpson);
        assert!(parse_rule("instant_runoff").is_err());
    }

    #[test]
    fn repeated_rules_are_deduplicated_in_rule_order() {
        let a = Args::try_parse_from(["vsim", "--rule", "borda", "--rule", "veto", "--rule", "borda"]).unwrap();
        assert_eq!(a.selected_rules(), vec![VotingRule::Veto, VotingRule::Borda]);
        let all = Args::try_parse_from(["vsim"]).unwrap();
        assert_eq!(all.selected_rules().len(), 9);
    }

    #[test]
    fn flags_override_params() {
        let a = Args::try_parse_from([
            "vsim", "--seed", "0x10", "--polls", "3", "--poll-rule", "borda", "--tie-breaker",
        ])
        .unwrap();
        let mut p = SimParams::default();
        a.apply_overrides(&mut p);
        assert_eq!((p.seed, p.polls, p.poll_rule), (16, 3, VotingRule::Borda));
        assert!(p.tie_breaker && !p.liquid_democracy);
    }

    #[test]
    fn conflicting_flags_are_rejected() {
        assert!(Args::try_parse_from(["vsim", "--import", "s.json", "--electors", "3"]).is_err());
        assert!(Args::try_parse_from(["vsim", "--quiet", "--verbose"]).is_err());
        assert!(Args::try_parse_from(["vsim", "--validate-only"]).is_err());
        assert_eq!(Args::try_parse_from(["vsim", "--quiet"]).unwrap().log_level(), "warn");
    }
}
