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

use grid_balance_model::prelude::{AssignmentError, GeneratorIndex, HouseIndex, Network};
use std::cmp::Reverse;

/// Score offset that strongly discourages, but does not forbid, placing a
/// house on a generator that cannot take its demand without overloading.
const OVERLOAD_DISCOURAGEMENT: f64 = 100_000.0;

/// Builds an initial full assignment from scratch.
///
/// Houses are placed in order of descending demand (registration order
/// breaks ties); each house goes to the generator with the strictly best
/// `remaining_capacity × (1 − utilization)` score, the first-registered
/// generator winning ties. Deterministic: no randomness is involved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GreedyConstructor;

impl GreedyConstructor {
    pub fn build(&self, network: &mut Network) -> Result<(), AssignmentError> {
        let house_count = network.houses().len();

        let mut order: Vec<usize> = (0..house_count).collect();
        order.sort_by_key(|&i| Reverse(network.house(HouseIndex::new(i)).demand()));

        // Drop any pre-existing assignment before distributing.
        for i in 0..house_count {
            let house = HouseIndex::new(i);
            if let Some(generator) = network.assigned_generator(house) {
                network.unassign(house, generator)?;
            }
        }

        for i in order {
            let house = HouseIndex::new(i);
            let demand = network.house(house).demand().value() as f64;

            let mut best: Option<GeneratorIndex> = None;
            let mut best_score = f64::NEG_INFINITY;
            for (j, generator) in network.generators().iter().enumerate() {
                let remaining = generator.remaining_capacity().value() as f64;
                let mut score = remaining * (1.0 - generator.utilization());
                if remaining < demand {
                    score -= OVERLOAD_DISCOURAGEMENT;
                }
                if score > best_score {
                    best_score = score;
                    best = Some(GeneratorIndex::new(j));
                }
            }

            // With no generators the house simply stays unassigned.
            if let Some(generator) = best {
                network.assign(house, generator)?;
            }
        }

        network.recompute_cost();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_balance_core::prelude::Power;
    use grid_balance_model::prelude::{Consumption, Generator, House};

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
    fn test_assigns_every_house() {
        let mut net = build_network();
        GreedyConstructor.build(&mut net).unwrap();
        for i in 0..net.houses().len() {
            assert!(net.assigned_generator(hix(i)).is_some());
        }
        let total: Power = net.generators().iter().map(Generator::load).sum();
        assert_eq!(total, kw(70));
    }

    #[test]
    fn test_largest_house_goes_to_emptiest_generator_first() {
        let mut net = build_network();
        GreedyConstructor.build(&mut net).unwrap();
        // m3 (40) is placed first; g1 (remaining 100, utilization 0) scores
        // 100 against g2's 50, so it lands on g1.
        assert_eq!(net.assigned_generator(hix(2)), Some(gix(0)));
    }

    #[test]
    fn test_clears_previous_assignment() {
        let mut net = build_network();
        net.assign(hix(0), gix(1)).unwrap();
        net.assign(hix(1), gix(1)).unwrap();
        GreedyConstructor.build(&mut net).unwrap();

        let total: Power = net.generators().iter().map(Generator::load).sum();
        assert_eq!(total, kw(70));
        // No double-counted loads from the stale assignment.
        for (i, generator) in net.generators().iter().enumerate() {
            let assigned: Power = (0..net.houses().len())
                .filter(|&h| net.assigned_generator(hix(h)) == Some(gix(i)))
                .map(|h| net.house(hix(h)).demand())
                .sum();
            assert_eq!(generator.load(), assigned);
        }
    }

    #[test]
    fn test_construction_is_deterministic() {
        let mut first = build_network();
        let mut second = build_network();
        GreedyConstructor.build(&mut first).unwrap();
        GreedyConstructor.build(&mut second).unwrap();
        assert_eq!(first.assignment(), second.assignment());

        // Rebuilding in place reproduces the same assignment.
        let snapshot = first.assignment().to_vec();
        GreedyConstructor.build(&mut first).unwrap();
        assert_eq!(first.assignment(), snapshot.as_slice());
    }

    #[test]
    fn test_overload_discouraged_but_not_forbidden() {
        // One tiny generator: every house must still land somewhere.
        let mut net = Network::new(10.0).unwrap();
        net.add_generator(Generator::new("g1", kw(40)).unwrap())
            .unwrap();
        net.add_house(House::new("m1", Consumption::Normal)).unwrap();
        net.add_house(House::new("m2", Consumption::Normal)).unwrap();
        GreedyConstructor.build(&mut net).unwrap();
        assert_eq!(net.assigned_generator(hix(0)), Some(gix(0)));
        assert_eq!(net.assigned_generator(hix(1)), Some(gix(0)));
        assert_eq!(net.generator(gix(0)).load(), kw(40));
    }

    #[test]
    fn test_empty_network_build_is_a_noop() {
        // Registration forbids houses without capacity, so a network
        // without generators is necessarily empty.
        let mut net = Network::new(10.0).unwrap();
        GreedyConstructor.build(&mut net).unwrap();
        assert!(net.houses().is_empty());
        assert_eq!(net.cost(), 0.0);
    }

    #[test]
    fn test_refreshes_cost_snapshot() {
        let mut net = build_network();
        GreedyConstructor.build(&mut net).unwrap();
        let before = net.stats();
        let after = net.recompute_cost();
        assert_eq!(before, after);
    }
}
