// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::engine::operators::Move;
use grid_balance_model::prelude::{AssignmentError, GeneratorIndex, HouseIndex, Network};
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DescentReport {
    pub passes: usize,
    pub improvements: usize,
}

impl std::fmt::Display for DescentReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DescentReport(passes: {}, improvements: {})",
            self.passes, self.improvements
        )
    }
}

/// Strict-improvement hill-climb to a local optimum.
///
/// Each pass shuffles the house order, and for every house shuffles the
/// candidate generators and applies the first strictly-improving move,
/// continuing the scan from the new current generator. Worsening and
/// sideways moves are reverted via the inverse move. Stops when a full
/// pass yields no improvement or the pass cap is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalDescent {
    max_passes: usize,
}

impl Default for LocalDescent {
    fn default() -> Self {
        Self { max_passes: 1000 }
    }
}

impl LocalDescent {
    #[inline]
    pub fn new(max_passes: usize) -> Self {
        Self {
            max_passes: max_passes.max(1),
        }
    }

    #[inline]
    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    pub fn run<R: rand::Rng>(
        &self,
        network: &mut Network,
        rng: &mut R,
    ) -> Result<DescentReport, AssignmentError> {
        network.recompute_cost();

        let mut report = DescentReport::default();
        let mut improved = true;

        while improved && report.passes < self.max_passes {
            improved = false;
            report.passes += 1;

            let mut houses: Vec<usize> = (0..network.houses().len()).collect();
            houses.shuffle(rng);

            for i in houses {
                let house = HouseIndex::new(i);
                let Some(mut current) = network.assigned_generator(house) else {
                    continue;
                };

                let mut candidates: Vec<usize> = (0..network.generators().len()).collect();
                candidates.shuffle(rng);

                for j in candidates {
                    let target = GeneratorIndex::new(j);
                    if target == current {
                        continue;
                    }

                    let before = network.cost();
                    let mv = Move::new(house, current, target);
                    mv.apply(network)?;
                    let after = network.recompute_cost().cost;

                    if after < before {
                        improved = true;
                        report.improvements += 1;
                        current = target;
                    } else {
                        mv.inverse().apply(network)?;
                        network.recompute_cost();
                    }
                }
            }
        }

        tracing::debug!("descent finished: {}", report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_balance_core::prelude::Power;
    use grid_balance_model::prelude::{Consumption, Generator, House};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[inline]
    fn kw(v: i64) -> Power {
        Power::new(v)
    }

    #[inline]
    fn hix(n: usize) -> HouseIndex {
        HouseIndex::new(n)
    }

    #[inline]
    fn gix(n: usize) -> GeneratorIndex {
        GeneratorIndex::new(n)
    }

    fn build_network() -> Network {
        let mut net = Network::new(50.0).unwrap();
        net.add_generator(Generator::new("g1", kw(100)).unwrap())
            .unwrap();
        net.add_generator(Generator::new("g2", kw(50)).unwrap())
            .unwrap();
        net.add_house(House::new("m1", Consumption::Normal)).unwrap();
        net.add_house(House::new("m2", Consumption::Low)).unwrap();
        net.add_house(House::new("m3", Consumption::High)).unwrap();
        net
    }

    #[test]
    fn test_descent_never_increases_cost() {
        let mut net = build_network();
        // Deliberately lopsided start: everything on g2 (overloaded).
        net.assign(hix(0), gix(1)).unwrap();
        net.assign(hix(1), gix(1)).unwrap();
        net.assign(hix(2), gix(1)).unwrap();
        let start = net.recompute_cost().cost;

        let mut rng = ChaCha8Rng::seed_from_u64(17);
        LocalDescent::default().run(&mut net, &mut rng).unwrap();
        let end = net.cost();
        assert!(end <= start, "descent worsened cost: {start} -> {end}");
    }

    #[test]
    fn test_descent_reaches_local_optimum() {
        let mut net = build_network();
        net.assign(hix(0), gix(1)).unwrap();
        net.assign(hix(1), gix(1)).unwrap();
        net.assign(hix(2), gix(1)).unwrap();
        net.recompute_cost();

        let mut rng = ChaCha8Rng::seed_from_u64(23);
        LocalDescent::default().run(&mut net, &mut rng).unwrap();
        let settled = net.cost();

        // No single move improves the settled state.
        for h in 0..net.houses().len() {
            let house = hix(h);
            let current = net.assigned_generator(house).unwrap();
            for g in 0..net.generators().len() {
                let target = gix(g);
                if target == current {
                    continue;
                }
                let mv = Move::new(house, current, target);
                mv.apply(&mut net).unwrap();
                let candidate = net.recompute_cost().cost;
                assert!(candidate >= settled - 1e-12);
                mv.inverse().apply(&mut net).unwrap();
                net.recompute_cost();
            }
        }
    }

    #[test]
    fn test_descent_skips_unassigned_houses() {
        let mut net = build_network();
        net.assign(hix(0), gix(1)).unwrap();
        // m2 and m3 stay unassigned.
        net.recompute_cost();
        let mut rng = ChaCha8Rng::seed_from_u64(29);
        LocalDescent::default().run(&mut net, &mut rng).unwrap();
        assert_eq!(net.assigned_generator(hix(1)), None);
        assert_eq!(net.assigned_generator(hix(2)), None);
    }

    #[test]
    fn test_pass_cap_honored() {
        let mut net = build_network();
        net.assign(hix(0), gix(1)).unwrap();
        net.assign(hix(1), gix(1)).unwrap();
        net.assign(hix(2), gix(1)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let report = LocalDescent::new(1).run(&mut net, &mut rng).unwrap();
        assert_eq!(report.passes, 1);
    }

    #[test]
    fn test_zero_pass_configuration_clamps_to_one() {
        assert_eq!(LocalDescent::new(0).max_passes(), 1);
    }
}
