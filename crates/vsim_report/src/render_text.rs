//! Aligned plain-text rendering, one block per rule and round.

use std::fmt::Write;

use crate::structure::ScoreReport;

pub fn render_text(report: &ScoreReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} candidates, {} electors (total weight {}), tie-breaker {}, liquid democracy {}",
        report.candidates,
        report.electors,
        report.total_weight,
        on_off(report.tie_breaker),
        on_off(report.liquid_democracy),
    );

    for table in &report.rules {
        let winner = match (&table.winner_name, table.winner) {
            (Some(name), Some(id)) => format!("{name} [{id}]"),
            _ => "none".to_string(),
        };
        let _ = writeln!(out, "\n{}: winner {}", table.title, winner);

        let width = table
            .rounds
            .iter()
            .flat_map(|r| r.rows.iter().map(|row| row.name.len() + row.candidate.to_string().len() + 3))
            .max()
            .unwrap_or(9)
            .max(9);
        for round in &table.rounds {
            if table.rule.is_multi_round() {
                let _ = writeln!(out, "  round {}", round.round);
            }
            let _ = writeln!(out, "  {:>4}  {:<width$}  {:>10}  {:>12}", "rank", "candidate", "score", "satisfaction");
            for row in &round.rows {
                let who = format!("{} [{}]", row.name, row.candidate);
                let sat = row.satisfaction.map(|s| format!("{s:.1}%")).unwrap_or_else(|| "-".to_string());
                let _ = writeln!(out, "  {:>4}  {:<width$}  {:>10.2}  {:>12}", row.rank, who, row.score, sat);
            }
        }
    }
    out
}

fn on_off(b: bool) -> &'static str {
    if b {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::build_table;
    use crate::structure::tests::{cid, sample};
    use std::collections::BTreeMap;

    #[test]
    fn text_lists_winners_rounds_and_scores() {
        let sat: BTreeMap<_, _> = [(cid(0), 12.5)].into_iter().collect();
        let text = render_text(&build_table(&sample(), Some(&sat)).unwrap());

        assert!(text.starts_with("3 candidates, 3 electors (total weight 3), tie-breaker on, liquid democracy off"));
        assert!(text.contains("Borda: winner Bruno Test [C1]"));
        assert!(text.contains("Condorcet (simple): winner none"));
        assert!(text.contains("  round 1"));
        assert!(text.contains("12.5%"));
        assert!(text.contains("4.00"));
    }
}
