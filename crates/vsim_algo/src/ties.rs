//! Duel-based tie-breaking inside runs of equal score.
//!
//! The pass is greedy and not globally consistent when duels cycle, so the
//! visiting order is fixed: pairs `(i, j)` with `i < j` over the run's order
//! as it was before any swap. For each pair, if the currently later candidate
//! beats the currently earlier one, the two swap places. An exact duel tie
//! never swaps.

use vsim_core::CandidateId;

use crate::duels::DuelMatrix;

/// Reorder equal-score runs of an already score-sorted `ranking`.
pub fn break_ties(ranking: &mut [CandidateId], score: impl Fn(CandidateId) -> f64, duels: &DuelMatrix) {
    let mut start = 0;
    while start < ranking.len() {
        let s = score(ranking[start]);
        let mut end = start + 1;
        while end < ranking.len() && score(ranking[end]) == s {
            end += 1;
        }
        if end - start >= 2 {
            resolve_run(&mut ranking[start..end], duels);
        }
        start = end;
    }
}

fn resolve_run(run: &mut [CandidateId], duels: &DuelMatrix) {
    let visit: Vec<CandidateId> = run.to_vec();
    for (i, a) in visit.iter().enumerate() {
        for b in &visit[i + 1..] {
            let (Some(pa), Some(pb)) = (pos(run, *a), pos(run, *b)) else { continue };
            let (early, late) = if pa < pb { (pa, pb) } else { (pb, pa) };
            if duels.beats(run[late], run[early]) {
                run.swap(early, late);
            }
        }
    }
}

#[inline]
fn pos(run: &[CandidateId], id: CandidateId) -> Option<usize> {
    run.iter().position(|c| *c == id)
}
