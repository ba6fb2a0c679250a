//! Liquid democracy: electors hand their vote weight to a nearby elector.
//!
//! An elector delegates with probability `1 − knowledge`. Eligible targets are
//! the other electors within `radius` whose weight is nonzero; one is drawn
//! with probability proportional to its knowledge.
//!
//! `Sequential` visits electors once in order and moves weight immediately,
//! so the outcome depends on that order. `TwoPhase` first draws who delegates,
//! then draws targets among the electors who keep their vote, then applies
//! every transfer; an elector never both delegates and receives.

use vsim_core::rng::SimRng;
use vsim_core::variables::DelegationMode;
use vsim_core::Elector;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DelegationSummary {
    /// Electors whose weight ended at 0 because of this pass.
    pub delegated: usize,
}

/// One delegation pass. Weights are expected to start at 1.
pub fn delegate(electors: &mut [Elector], radius: f64, mode: DelegationMode, rng: &mut SimRng) -> DelegationSummary {
    match mode {
        DelegationMode::Sequential => sequential(electors, radius, rng),
        DelegationMode::TwoPhase => two_phase(electors, radius, rng),
    }
}

/// Pick a target among `eligible` indices, weighted by knowledge.
fn pick(electors: &[Elector], eligible: &[usize], rng: &mut SimRng) -> Option<usize> {
    if eligible.is_empty() {
        return None;
    }
    let weights: Vec<f64> = eligible.iter().map(|j| electors[*j].knowledge).collect();
    rng.choose_weighted(&weights).map(|k| eligible[k])
}

fn within(electors: &[Elector], i: usize, j: usize, radius: f64) -> bool {
    i != j && electors[i].position.distance(&electors[j].position) <= radius
}

fn sequential(electors: &mut [Elector], radius: f64, rng: &mut SimRng) -> DelegationSummary {
    let mut summary = DelegationSummary::default();
    for i in 0..electors.len() {
        if electors[i].weight == 0 || !rng.chance(1.0 - electors[i].knowledge) {
            continue;
        }
        let eligible: Vec<usize> = (0..electors.len())
            .filter(|j| within(electors, i, *j, radius) && electors[*j].weight > 0)
            .collect();
        let Some(target) = pick(electors, &eligible, rng) else { continue };
        let w = electors[i].weight;
        electors[target].weight += w;
        electors[i].weight = 0;
        summary.delegated += 1;
    }
    summary
}

fn two_phase(electors: &mut [Elector], radius: f64, rng: &mut SimRng) -> DelegationSummary {
    let wants: Vec<bool> = electors.iter().map(|e| rng.chance(1.0 - e.knowledge)).collect();

    let mut transfers: Vec<(usize, usize)> = Vec::new();
    for i in (0..electors.len()).filter(|i| wants[*i]) {
        let eligible: Vec<usize> = (0..electors.len())
            .filter(|j| !wants[*j] && within(electors, i, *j, radius) && electors[*j].weight > 0)
            .collect();
        if let Some(target) = pick(electors, &eligible, rng) {
            transfers.push((i, target));
        }
    }

    for (from, to) in &transfers {
        let w = electors[*from].weight;
        electors[*to].weight += w;
        electors[*from].weight = 0;
    }
    DelegationSummary { delegated: transfers.len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsim_core::{ElectorId, Position};

    fn crowd(knowledge: &[f64]) -> Vec<Elector> {
        knowledge
            .iter()
            .enumerate()
            .map(|(i, k)| Elector::new(ElectorId::from_raw(i as u32), Position::new(0.01 * i as f64, 0.0), *k))
            .collect()
    }

    fn total(electors: &[Elector]) -> u32 {
        electors.iter().map(|e| e.weight).sum()
    }

    #[test]
    fn weight_is_conserved_in_both_modes() {
        for mode in [DelegationMode::Sequential, DelegationMode::TwoPhase] {
            for seed in 0..20 {
                let mut electors = crowd(&[0.1, 0.9, 0.3, 0.5, 0.0, 0.7]);
                let mut rng = SimRng::from_seed_u64(seed);
                let s = delegate(&mut electors, 0.3, mode, &mut rng);
                assert_eq!(total(&electors), 6);
                assert_eq!(electors.iter().filter(|e| e.weight == 0).count(), s.delegated);
            }
        }
    }

    #[test]
    fn fully_informed_electors_never_delegate() {
        let mut electors = crowd(&[1.0, 1.0, 1.0]);
        let mut rng = SimRng::from_seed_u64(7);
        let s = delegate(&mut electors, 1.0, DelegationMode::Sequential, &mut rng);
        assert_eq!(s.delegated, 0);
        assert!(electors.iter().all(|e| e.weight == 1));
    }

    #[test]
    fn nobody_in_radius_means_no_delegation() {
        let mut electors = vec![
            Elector::new(ElectorId::from_raw(0), Position::new(-1.0, -1.0), 0.0),
            Elector::new(ElectorId::from_raw(1), Position::new(1.0, 1.0), 0.0),
        ];
        let mut rng = SimRng::from_seed_u64(1);
        let s = delegate(&mut electors, 0.3, DelegationMode::Sequential, &mut rng);
        assert_eq!(s.delegated, 0);
    }

    #[test]
    fn sequential_delegator_with_zero_knowledge_hands_over_everything() {
        // Elector 0 always delegates; elector 1 never does and is the only target.
        let mut electors = crowd(&[0.0, 1.0]);
        let mut rng = SimRng::from_seed_u64(3);
        delegate(&mut electors, 0.3, DelegationMode::Sequential, &mut rng);
        assert_eq!((electors[0].weight, electors[1].weight), (0, 2));
    }

    #[test]
    fn two_phase_never_delegates_to_a_delegator() {
        for seed in 0..20 {
            let mut electors = crowd(&[0.2, 0.4, 0.6, 0.8, 0.5]);
            let mut rng = SimRng::from_seed_u64(seed);
            let s = delegate(&mut electors, 0.5, DelegationMode::TwoPhase, &mut rng);
            // Every transfer moves exactly one original vote onto a keeper.
            let received: u32 = electors.iter().filter(|e| e.weight > 1).map(|e| e.weight - 1).sum();
            assert_eq!(received as usize, s.delegated);
            assert_eq!(total(&electors), 5);
        }
    }
}
