//! Weighted pairwise preference matrix.
//!
//! `prefers(A,B)` = total weight of electors ranking A above B. Every ordered
//! pair of distinct candidates is materialized, so the absent direction of a
//! pair is an explicit 0 rather than a missing key.
//!
//! This is the only duel representation in the workspace. Condorcet-simple
//! derives its pairwise winners from it (`beats`), Copeland and Simpson read
//! the raw counts, and the persisted duel table is `records()`: one row per
//! unordered pair oriented toward the larger count, carrying both counts.

use std::collections::{BTreeMap, BTreeSet};

use vsim_core::{Candidate, CandidateId, Elector};

use crate::TabError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuelOutcome {
    Wins,
    Loses,
    Tie,
}

/// One unordered pair, oriented so that `score >= against`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DuelRecord {
    pub winner: CandidateId,
    pub loser: CandidateId,
    /// Weight preferring `winner` over `loser`.
    pub score: u64,
    /// Weight preferring `loser` over `winner`.
    pub against: u64,
}

impl DuelRecord {
    #[inline]
    pub fn is_tie(&self) -> bool {
        self.score == self.against
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DuelMatrix {
    order: Vec<CandidateId>,
    prefers: BTreeMap<(CandidateId, CandidateId), u64>,
    total_weight: u64,
}

impl DuelMatrix {
    /// All pairs at 0 for the given candidate order.
    fn zeroed(order: Vec<CandidateId>) -> Self {
        let mut prefers = BTreeMap::new();
        for (i, a) in order.iter().enumerate() {
            for (j, b) in order.iter().enumerate() {
                if i != j {
                    prefers.insert((*a, *b), 0);
                }
            }
        }
        Self { order, prefers, total_weight: 0 }
    }

    /// Tally every elector's ranking. O(electors × candidates²).
    pub fn compute(electors: &[Elector], candidates: &[Candidate]) -> Result<Self, TabError> {
        let mut m = Self::zeroed(candidates.iter().map(|c| c.id).collect());
        let known: BTreeSet<CandidateId> = m.order.iter().copied().collect();

        for e in electors {
            let w = u64::from(e.weight);
            m.total_weight += w;
            let ranking = e.ranking();
            if let Some(bad) = ranking.iter().find(|id| !known.contains(id)) {
                return Err(TabError::UnknownCandidate(*bad));
            }
            if w == 0 {
                continue;
            }
            for (i, a) in ranking.iter().enumerate() {
                for b in &ranking[i + 1..] {
                    if let Some(slot) = m.prefers.get_mut(&(*a, *b)) {
                        *slot += w;
                    }
                }
            }
        }
        Ok(m)
    }

    /// Rebuild from persisted rows. Pairs without a row stay at 0.
    pub fn from_records(
        order: Vec<CandidateId>,
        records: &[DuelRecord],
        total_weight: u64,
    ) -> Result<Self, TabError> {
        let mut m = Self::zeroed(order);
        m.total_weight = total_weight;
        for r in records {
            for id in [r.winner, r.loser] {
                if !m.covers(id) {
                    return Err(TabError::UnknownCandidate(id));
                }
            }
            m.prefers.insert((r.winner, r.loser), r.score);
            m.prefers.insert((r.loser, r.winner), r.against);
        }
        Ok(m)
    }

    pub fn candidates(&self) -> &[CandidateId] {
        &self.order
    }

    pub fn covers(&self, id: CandidateId) -> bool {
        self.order.contains(&id)
    }

    /// Sum of elector weights at computation time.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    #[inline]
    pub fn prefers(&self, a: CandidateId, b: CandidateId) -> u64 {
        self.prefers.get(&(a, b)).copied().unwrap_or(0)
    }

    /// Strict pairwise win.
    #[inline]
    pub fn beats(&self, a: CandidateId, b: CandidateId) -> bool {
        self.prefers(a, b) > self.prefers(b, a)
    }

    pub fn outcome(&self, a: CandidateId, b: CandidateId) -> DuelOutcome {
        let (ab, ba) = (self.prefers(a, b), self.prefers(b, a));
        match ab.cmp(&ba) {
            std::cmp::Ordering::Greater => DuelOutcome::Wins,
            std::cmp::Ordering::Less => DuelOutcome::Loses,
            std::cmp::Ordering::Equal => DuelOutcome::Tie,
        }
    }

    /// One record per unordered pair in candidate order. A tie keeps the
    /// forward direction (earlier candidate as `winner`).
    pub fn records(&self) -> Vec<DuelRecord> {
        let mut out = Vec::new();
        for (i, a) in self.order.iter().enumerate() {
            for b in &self.order[i + 1..] {
                let (ab, ba) = (self.prefers(*a, *b), self.prefers(*b, *a));
                out.push(if ab >= ba {
                    DuelRecord { winner: *a, loser: *b, score: ab, against: ba }
                } else {
                    DuelRecord { winner: *b, loser: *a, score: ba, against: ab }
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsim_core::{ElectorId, Position};

    fn ids(n: u32) -> Vec<CandidateId> {
        (0..n).map(CandidateId::from_raw).collect()
    }

    fn cands(n: u32) -> Vec<Candidate> {
        ids(n).into_iter().map(|id| Candidate::new(id, Position::ORIGIN, "", "", 0.5, 0.5)).collect()
    }

    fn elector(raw: u32, ranking: Vec<CandidateId>, weight: u32) -> Elector {
        let mut e = Elector::with_ranking(ElectorId::from_raw(raw), Position::ORIGIN, ranking);
        e.weight = weight;
        e
    }

    #[test]
    fn weighted_counts_per_ordered_pair() {
        let c = ids(3);
        let es = vec![
            elector(0, vec![c[0], c[1], c[2]], 2),
            elector(1, vec![c[2], c[1], c[0]], 1),
            elector(2, vec![c[1], c[0], c[2]], 0),
        ];
        let m = DuelMatrix::compute(&es, &cands(3)).unwrap();
        assert_eq!(m.total_weight(), 3);
        assert_eq!(m.prefers(c[0], c[1]), 2);
        assert_eq!(m.prefers(c[1], c[0]), 1);
        assert_eq!(m.prefers(c[2], c[0]), 1);
        assert!(m.beats(c[0], c[2]));
        assert_eq!(m.outcome(c[1], c[2]), DuelOutcome::Wins);
        assert_eq!(m.prefers(c[0], c[0]), 0);
    }

    #[test]
    fn records_orient_to_larger_count_and_rebuild() {
        let c = ids(3);
        let es = vec![
            elector(0, vec![c[2], c[0], c[1]], 1),
            elector(1, vec![c[2], c[1], c[0]], 1),
        ];
        let m = DuelMatrix::compute(&es, &cands(3)).unwrap();
        let recs = m.records();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0], DuelRecord { winner: c[0], loser: c[1], score: 1, against: 1 });
        assert!(recs[0].is_tie());
        assert_eq!(recs[1], DuelRecord { winner: c[2], loser: c[0], score: 2, against: 0 });

        let back = DuelMatrix::from_records(c.clone(), &recs, m.total_weight()).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let c = ids(2);
        let es = vec![elector(0, vec![c[0], CandidateId::from_raw(7)], 1)];
        assert_eq!(
            DuelMatrix::compute(&es, &cands(2)),
            Err(TabError::UnknownCandidate(CandidateId::from_raw(7)))
        );
        let bad = DuelRecord { winner: c[0], loser: CandidateId::from_raw(9), score: 1, against: 0 };
        assert!(DuelMatrix::from_records(c, &[bad], 1).is_err());
    }
}
