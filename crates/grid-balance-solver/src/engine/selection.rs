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

//! Biased proposal pickers for the annealer.
//!
//! All pickers read the network's last cost snapshot for the mean
//! utilization; the caller must have recomputed it since the last mutation.

use grid_balance_model::prelude::{GeneratorIndex, HouseIndex, Network};
use rand::seq::IndexedRandom;

/// A house counts as imbalanced when its generator deviates from the mean
/// utilization by more than this, or is overloaded outright.
const IMBALANCE_DEVIATION: f64 = 0.15;
/// Probability of picking among imbalanced houses when any exist.
const PRIORITY_PROBABILITY: f64 = 0.7;
/// Probability of picking among the top-ranked target generators.
const RANKED_PROBABILITY: f64 = 0.8;
/// Size of the top-ranked generator pool.
const RANKED_POOL: usize = 3;
const UNDERUSE_BONUS: f64 = 0.5;
const OVERLOAD_PENALTY: f64 = 10.0;

/// Picks a house for a move proposal, preferring houses attached to
/// imbalanced or overloaded generators.
pub fn choose_house<R: rand::Rng>(network: &Network, rng: &mut R) -> Option<HouseIndex> {
    let count = network.houses().len();
    if count == 0 {
        return None;
    }

    let mean = network.mean_utilization();
    let mut priority: Vec<HouseIndex> = Vec::new();
    for i in 0..count {
        let house = HouseIndex::new(i);
        let Some(generator) = network.assigned_generator(house) else {
            continue;
        };
        let utilization = network.generator(generator).utilization();
        if (utilization - mean).abs() > IMBALANCE_DEVIATION || utilization > 1.0 {
            priority.push(house);
        }
    }

    if !priority.is_empty() && rng.random::<f64>() < PRIORITY_PROBABILITY {
        return priority.choose(rng).copied();
    }
    Some(HouseIndex::new(rng.random_range(0..count)))
}

/// Picks a target generator for moving `house`, ranking generators by
/// closeness to the mean utilization with a bonus for under-used ones and a
/// penalty when accepting the house would overload.
pub fn choose_target_generator<R: rand::Rng>(
    network: &Network,
    house: HouseIndex,
    rng: &mut R,
) -> Option<GeneratorIndex> {
    let count = network.generators().len();
    if count == 0 {
        return None;
    }

    let mean = network.mean_utilization();
    let demand = network.house(house).demand();

    let mut ranked: Vec<(GeneratorIndex, f64)> = network
        .generators()
        .iter()
        .enumerate()
        .map(|(i, generator)| {
            let utilization = generator.utilization();
            let mut score = -(utilization - mean).abs();
            if utilization < mean {
                score += UNDERUSE_BONUS;
            }
            if generator.load() + demand > generator.capacity() {
                score -= OVERLOAD_PENALTY;
            }
            (GeneratorIndex::new(i), score)
        })
        .collect();
    // Stable sort: equal scores keep the generator registration order.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    if rng.random::<f64>() < RANKED_PROBABILITY {
        let pool = RANKED_POOL.min(ranked.len());
        return Some(ranked[rng.random_range(0..pool)].0);
    }
    Some(GeneratorIndex::new(rng.random_range(0..count)))
}

/// Two independent uniform draws over all houses. The pair may be
/// degenerate; the caller rejects equal houses or equal generators.
pub fn choose_swap_pair<R: rand::Rng>(
    network: &Network,
    rng: &mut R,
) -> Option<(HouseIndex, HouseIndex)> {
    let count = network.houses().len();
    if count < 2 {
        return None;
    }
    Some((
        HouseIndex::new(rng.random_range(0..count)),
        HouseIndex::new(rng.random_range(0..count)),
    ))
}
