//! Random population of an election from the generation parameters.

use vsim_core::Position;

use crate::Election;

impl Election {
    /// Add `n_electors` electors then `n_candidates` candidates.
    ///
    /// Candidates are uniform over the map. Electors are uniform, or normally
    /// spread around one random centre when `elector_spread` is set.
    pub fn populate_random(&mut self, n_electors: usize, n_candidates: usize) {
        let spread = self.params.generation.elector_spread;
        let centre = spread.map(|_| Position::random_uniform(&mut self.rng));
        for _ in 0..n_electors {
            let position = match (centre, spread) {
                (Some(c), Some(s)) => Position::random_normal(&mut self.rng, &c, s),
                _ => Position::random_uniform(&mut self.rng),
            };
            self.add_elector(position);
        }
        for _ in 0..n_candidates {
            let position = Position::random_uniform(&mut self.rng);
            self.add_candidate(position, None);
        }
        tracing::info!(electors = n_electors, candidates = n_candidates, "population generated");
    }
}
