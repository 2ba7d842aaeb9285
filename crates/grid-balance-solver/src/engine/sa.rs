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

use crate::engine::operators::{Move, Swap};
use crate::engine::selection;
use grid_balance_core::prelude::AcceptanceWindow;
use grid_balance_model::prelude::{AssignmentError, Network};

/// Simulated annealing with acceptance-rate-driven cooling and reheating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedAnnealingConfig {
    pub initial_temperature: f64,
    pub min_temperature: f64,
    /// Safety cap on total iterations per call.
    pub max_iterations: usize,
    /// Length of the acceptance-rate observation window.
    pub adaptation_window: usize,
    /// Iterations without improvement before a reheat fires.
    pub reheat_threshold: usize,
    /// Reheats allowed per call.
    pub max_reheats: usize,
    /// Probability of proposing a swap instead of a move.
    pub swap_probability: f64,
}

impl Default for SimulatedAnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            min_temperature: 0.001,
            max_iterations: 50_000,
            adaptation_window: 100,
            reheat_threshold: 800,
            max_reheats: 3,
            swap_probability: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnnealingReport {
    pub iterations: usize,
    pub acceptances: usize,
    pub improvements: usize,
    pub reheats: usize,
    pub final_temperature: f64,
}

impl AnnealingReport {
    #[inline]
    pub fn acceptance_ratio(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.acceptances as f64 / self.iterations as f64
        }
    }
}

impl std::fmt::Display for AnnealingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AnnealingReport(iterations: {}, acceptances: {} ({:.1}%), improvements: {}, reheats: {})",
            self.iterations,
            self.acceptances,
            100.0 * self.acceptance_ratio(),
            self.improvements,
            self.reheats
        )
    }
}

/// Temperature-controlled stochastic search over the move/swap
/// neighborhood.
///
/// Cooling is adaptive: after every full observation window the acceptance
/// rate picks one of three cooling factors. Stagnation past the threshold
/// triggers a bounded reheat. Only the best cost *value* is tracked for
/// stagnation detection; the engine does not roll back to the best state,
/// so the state at loop exit may be worse than one seen mid-run. The ILS
/// driver compensates by snapshotting externally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedAnnealing {
    config: SimulatedAnnealingConfig,
}

impl Default for SimulatedAnnealing {
    fn default() -> Self {
        Self::new(SimulatedAnnealingConfig::default())
    }
}

impl SimulatedAnnealing {
    #[inline]
    pub fn new(config: SimulatedAnnealingConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &SimulatedAnnealingConfig {
        &self.config
    }

    pub fn run<R: rand::Rng>(
        &self,
        network: &mut Network,
        rng: &mut R,
    ) -> Result<AnnealingReport, AssignmentError> {
        let cfg = &self.config;
        let house_count = network.houses().len();

        let mut report = AnnealingReport {
            final_temperature: cfg.initial_temperature,
            ..AnnealingReport::default()
        };

        if house_count == 0 || network.generators().is_empty() {
            tracing::debug!("annealing skipped: nothing to optimize");
            return Ok(report);
        }

        network.recompute_cost();
        let mut temperature = cfg.initial_temperature;
        let mut window = AcceptanceWindow::new(cfg.adaptation_window);
        let mut best_cost = network.cost();
        let mut stagnation = 0usize;

        while temperature > cfg.min_temperature && report.iterations < cfg.max_iterations {
            report.iterations += 1;

            let accepted = if rng.random::<f64>() < cfg.swap_probability && house_count > 1 {
                self.try_swap(network, rng, temperature)?
            } else {
                self.try_move(network, rng, temperature)?
            };

            window.record(accepted);
            if accepted {
                report.acceptances += 1;
                let cost = network.cost();
                if cost < best_cost {
                    best_cost = cost;
                    report.improvements += 1;
                    stagnation = 0;
                } else {
                    stagnation += 1;
                }
            } else {
                stagnation += 1;
            }

            if window.is_full() {
                let rate = window.rate();
                temperature *= if rate > 0.85 {
                    0.95
                } else if rate < 0.15 {
                    0.985
                } else {
                    0.97
                };
                window.reset();
            }

            if stagnation > cfg.reheat_threshold && report.reheats < cfg.max_reheats {
                temperature = (temperature * 15.0).min(cfg.initial_temperature * 0.4);
                stagnation = 0;
                report.reheats += 1;
                tracing::debug!(
                    "annealing reheat {} at iteration {} to T={:.3}",
                    report.reheats,
                    report.iterations,
                    temperature
                );
            }
        }

        report.final_temperature = temperature;
        tracing::debug!("annealing finished: {}", report);
        Ok(report)
    }

    /// Proposes moving one heuristically chosen house to a heuristically
    /// chosen generator. Returns whether the proposal was accepted.
    fn try_move<R: rand::Rng>(
        &self,
        network: &mut Network,
        rng: &mut R,
        temperature: f64,
    ) -> Result<bool, AssignmentError> {
        let Some(house) = selection::choose_house(network, rng) else {
            return Ok(false);
        };
        let Some(to) = selection::choose_target_generator(network, house, rng) else {
            return Ok(false);
        };
        let Some(from) = network.assigned_generator(house) else {
            return Ok(false);
        };
        if from == to {
            return Ok(false);
        }

        let mv = Move::new(house, from, to);
        let before = network.cost();
        mv.apply(network)?;
        let after = network.recompute_cost().cost;

        if self.metropolis(after - before, temperature, rng) {
            Ok(true)
        } else {
            mv.inverse().apply(network)?;
            network.recompute_cost();
            Ok(false)
        }
    }

    /// Proposes exchanging the generators of two random houses. Returns
    /// whether the proposal was accepted.
    fn try_swap<R: rand::Rng>(
        &self,
        network: &mut Network,
        rng: &mut R,
        temperature: f64,
    ) -> Result<bool, AssignmentError> {
        let Some((first, second)) = selection::choose_swap_pair(network, rng) else {
            return Ok(false);
        };
        if first == second {
            return Ok(false);
        }
        let (Some(first_gen), Some(second_gen)) = (
            network.assigned_generator(first),
            network.assigned_generator(second),
        ) else {
            return Ok(false);
        };
        if first_gen == second_gen {
            return Ok(false);
        }

        let swap = Swap::new(first, second);
        let before = network.cost();
        swap.apply(network)?;
        let after = network.recompute_cost().cost;

        if self.metropolis(after - before, temperature, rng) {
            Ok(true)
        } else {
            swap.inverse().apply(network)?;
            network.recompute_cost();
            Ok(false)
        }
    }

    #[inline]
    fn metropolis<R: rand::Rng>(&self, delta: f64, temperature: f64, rng: &mut R) -> bool {
        delta < 0.0 || (-delta / temperature).exp() > rng.random::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_balance_core::prelude::Power;
    use grid_balance_model::prelude::{
        Consumption, Generator, GeneratorIndex, House, HouseIndex,
    };
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
        net.add_generator(Generator::new("g3", kw(80)).unwrap())
            .unwrap();
        for (name, consumption) in [
            ("m1", Consumption::Normal),
            ("m2", Consumption::Low),
            ("m3", Consumption::High),
            ("m4", Consumption::Normal),
            ("m5", Consumption::High),
            ("m6", Consumption::Low),
        ] {
            net.add_house(House::new(name, consumption)).unwrap();
        }
        net
    }

    fn assign_all_to(net: &mut Network, generator: GeneratorIndex) {
        for i in 0..net.houses().len() {
            net.assign(hix(i), generator).unwrap();
        }
        net.recompute_cost();
    }

    /// Short schedule so tests finish quickly.
    fn quick_config() -> SimulatedAnnealingConfig {
        SimulatedAnnealingConfig {
            max_iterations: 3000,
            ..SimulatedAnnealingConfig::default()
        }
    }

    #[test]
    fn test_run_is_deterministic_under_fixed_seed() {
        let mut first = build_network();
        let mut second = build_network();
        assign_all_to(&mut first, gix(0));
        assign_all_to(&mut second, gix(0));

        let sa = SimulatedAnnealing::new(quick_config());
        let mut rng_a = ChaCha8Rng::seed_from_u64(1234);
        let mut rng_b = ChaCha8Rng::seed_from_u64(1234);
        let report_a = sa.run(&mut first, &mut rng_a).unwrap();
        let report_b = sa.run(&mut second, &mut rng_b).unwrap();

        assert_eq!(report_a, report_b);
        assert_eq!(first.assignment(), second.assignment());
        assert_eq!(first.cost(), second.cost());
    }

    #[test]
    fn test_run_improves_a_lopsided_start() {
        // Everything on the smallest generator: heavily overloaded. A full
        // schedule ends cold, so the final state has shed the overload.
        let mut net = build_network();
        assign_all_to(&mut net, gix(1));
        let start = net.cost();

        let sa = SimulatedAnnealing::default();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        sa.run(&mut net, &mut rng).unwrap();

        assert!(net.cost() < start, "no improvement: {start} -> {}", net.cost());
    }

    #[test]
    fn test_loads_stay_consistent_after_run() {
        let mut net = build_network();
        assign_all_to(&mut net, gix(2));

        let sa = SimulatedAnnealing::new(quick_config());
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        sa.run(&mut net, &mut rng).unwrap();

        for (i, generator) in net.generators().iter().enumerate() {
            let assigned: Power = (0..net.houses().len())
                .filter(|&h| net.assigned_generator(hix(h)) == Some(gix(i)))
                .map(|h| net.house(hix(h)).demand())
                .sum();
            assert_eq!(generator.load(), assigned, "generator {i}");
        }
    }

    #[test]
    fn test_iteration_cap_honored() {
        let mut net = build_network();
        assign_all_to(&mut net, gix(0));
        let config = SimulatedAnnealingConfig {
            max_iterations: 500,
            ..SimulatedAnnealingConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let report = SimulatedAnnealing::new(config).run(&mut net, &mut rng).unwrap();
        assert!(report.iterations <= 500);
    }

    #[test]
    fn test_reheats_bounded() {
        let mut net = build_network();
        assign_all_to(&mut net, gix(0));
        let config = SimulatedAnnealingConfig {
            reheat_threshold: 50,
            ..quick_config()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let report = SimulatedAnnealing::new(config).run(&mut net, &mut rng).unwrap();
        assert!(report.reheats <= config.max_reheats);
    }

    #[test]
    fn test_empty_network_is_a_noop() {
        let mut net = Network::new(1.0).unwrap();
        let sa = SimulatedAnnealing::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = sa.run(&mut net, &mut rng).unwrap();
        assert_eq!(report.iterations, 0);
        assert_eq!(report.acceptances, 0);
    }

    #[test]
    fn test_report_display_and_ratio() {
        let report = AnnealingReport {
            iterations: 200,
            acceptances: 50,
            improvements: 10,
            reheats: 1,
            final_temperature: 0.5,
        };
        assert!((report.acceptance_ratio() - 0.25).abs() < 1e-12);
        assert_eq!(
            report.to_string(),
            "AnnealingReport(iterations: 200, acceptances: 50 (25.0%), improvements: 10, reheats: 1)"
        );
    }
}
