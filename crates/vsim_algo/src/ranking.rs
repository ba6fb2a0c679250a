//! Distance ranking: an elector prefers closer candidates.

use vsim_core::{Candidate, CandidateId, Elector, Position};

/// Candidates ordered by ascending distance from `position`.
///
/// The sort is stable, so equal distances keep the input order of `candidates`.
pub fn rank(position: &Position, candidates: &[Candidate]) -> Vec<CandidateId> {
    let mut by_distance: Vec<(f64, CandidateId)> =
        candidates.iter().map(|c| (position.distance(&c.position), c.id)).collect();
    by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
    by_distance.into_iter().map(|(_, id)| id).collect()
}

/// Refresh every elector's ranking against the current candidate set.
pub fn rank_all(electors: &mut [Elector], candidates: &[Candidate]) {
    for e in electors.iter_mut() {
        let ranking = rank(&e.position, candidates);
        e.set_ranking(ranking);
    }
}
