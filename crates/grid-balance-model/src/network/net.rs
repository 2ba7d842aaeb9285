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

use crate::network::err::{
    AlreadyAssignedError, AssignmentError, CapacityExceededError, DuplicateGeneratorError,
    DuplicateHouseError, NegativePenaltyError, NetworkError, NotAssignedToError,
    SnapshotLengthError,
};
use crate::network::generator::{Generator, GeneratorIndex};
use crate::network::house::{House, HouseIndex};
use grid_balance_core::prelude::{Cost, Power};
use num_traits::Zero;
use std::collections::HashMap;

/// Derived cost statistics of an assignment. Not authoritative between
/// recomputations: a mutation invalidates the snapshot until the next
/// [`Network::recompute_cost`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostBreakdown {
    pub mean_utilization: f64,
    pub dispersion: f64,
    pub overload: f64,
    pub cost: Cost,
}

impl std::fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CostBreakdown(mean: {:.5}, dispersion: {:.5}, overload: {:.5}, cost: {:.5})",
            self.mean_utilization, self.dispersion, self.overload, self.cost
        )
    }
}

/// The assignment model: houses, generators, the house→generator mapping
/// and the derived cost statistics.
///
/// Houses and generators are stored in registration order in dense arrays;
/// the assignment is an array of generator indices parallel to the houses
/// array. Generator load counters are maintained incrementally by the
/// assignment operations and always equal the sum of the demands of the
/// houses mapped to them.
#[derive(Debug, Clone)]
pub struct Network {
    houses: Vec<House>,
    generators: Vec<Generator>,
    assignment: Vec<Option<GeneratorIndex>>,
    house_lookup: HashMap<String, HouseIndex>,
    generator_lookup: HashMap<String, GeneratorIndex>,
    penalty: f64,
    total_capacity: Power,
    total_demand: Power,
    stats: CostBreakdown,
}

impl Network {
    pub fn new(penalty: f64) -> Result<Self, NetworkError> {
        if !penalty.is_finite() || penalty < 0.0 {
            return Err(NegativePenaltyError::new(penalty).into());
        }
        Ok(Self {
            houses: Vec::new(),
            generators: Vec::new(),
            assignment: Vec::new(),
            house_lookup: HashMap::new(),
            generator_lookup: HashMap::new(),
            penalty,
            total_capacity: Power::zero(),
            total_demand: Power::zero(),
            stats: CostBreakdown::default(),
        })
    }

    // --------------------- Registration ---------------------

    /// Registers a generator. Names must be unique across generators.
    pub fn add_generator(&mut self, generator: Generator) -> Result<GeneratorIndex, NetworkError> {
        if self.generator_lookup.contains_key(generator.name()) {
            return Err(DuplicateGeneratorError::new(generator.name()).into());
        }
        let index = GeneratorIndex::new(self.generators.len());
        self.total_capacity += generator.capacity();
        self.generator_lookup
            .insert(generator.name().to_string(), index);
        self.generators.push(generator);
        Ok(index)
    }

    /// Registers a house, initially unassigned. Total committed demand must
    /// never exceed total registered capacity; the offending house is not
    /// added.
    pub fn add_house(&mut self, house: House) -> Result<HouseIndex, NetworkError> {
        if self.house_lookup.contains_key(house.name()) {
            return Err(DuplicateHouseError::new(house.name()).into());
        }
        if self.total_demand + house.demand() > self.total_capacity {
            return Err(CapacityExceededError::new(
                house.name(),
                house.demand(),
                self.total_demand,
                self.total_capacity,
            )
            .into());
        }
        let index = HouseIndex::new(self.houses.len());
        self.total_demand += house.demand();
        self.house_lookup.insert(house.name().to_string(), index);
        self.houses.push(house);
        self.assignment.push(None);
        Ok(index)
    }

    // --------------------- Accessors ---------------------

    #[inline]
    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    #[inline]
    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    #[inline]
    pub fn house(&self, index: HouseIndex) -> &House {
        &self.houses[index.get()]
    }

    #[inline]
    pub fn generator(&self, index: GeneratorIndex) -> &Generator {
        &self.generators[index.get()]
    }

    #[inline]
    pub fn house_index(&self, name: &str) -> Option<HouseIndex> {
        self.house_lookup.get(name).copied()
    }

    #[inline]
    pub fn generator_index(&self, name: &str) -> Option<GeneratorIndex> {
        self.generator_lookup.get(name).copied()
    }

    #[inline]
    pub fn contains_house(&self, name: &str) -> bool {
        self.house_lookup.contains_key(name)
    }

    #[inline]
    pub fn contains_generator(&self, name: &str) -> bool {
        self.generator_lookup.contains_key(name)
    }

    #[inline]
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    #[inline]
    pub fn total_capacity(&self) -> Power {
        self.total_capacity
    }

    #[inline]
    pub fn total_demand(&self) -> Power {
        self.total_demand
    }

    #[inline]
    pub fn assigned_generator(&self, house: HouseIndex) -> Option<GeneratorIndex> {
        self.assignment[house.get()]
    }

    /// The full house→generator mapping, parallel to [`Network::houses`].
    /// Cloning the slice yields a restorable snapshot.
    #[inline]
    pub fn assignment(&self) -> &[Option<GeneratorIndex>] {
        &self.assignment
    }

    // --------------------- Assignment operations ---------------------

    /// Connects an unassigned house to a generator and adds its demand to
    /// the generator's load.
    pub fn assign(
        &mut self,
        house: HouseIndex,
        generator: GeneratorIndex,
    ) -> Result<(), AssignmentError> {
        if let Some(current) = self.assignment[house.get()] {
            return Err(AlreadyAssignedError::new(house, current).into());
        }
        let demand = self.houses[house.get()].demand();
        self.generators[generator.get()].add_load(demand);
        self.assignment[house.get()] = Some(generator);
        Ok(())
    }

    /// Disconnects a house from the generator it is assigned to and removes
    /// its demand from the generator's load.
    pub fn unassign(
        &mut self,
        house: HouseIndex,
        generator: GeneratorIndex,
    ) -> Result<(), AssignmentError> {
        let actual = self.assignment[house.get()];
        if actual != Some(generator) {
            return Err(NotAssignedToError::new(house, generator, actual).into());
        }
        let demand = self.houses[house.get()].demand();
        self.generators[generator.get()].remove_load(demand);
        self.assignment[house.get()] = None;
        Ok(())
    }

    /// Moves a house from one generator to another, updating both load
    /// counters atomically with the mapping.
    pub fn reassign(
        &mut self,
        house: HouseIndex,
        from: GeneratorIndex,
        to: GeneratorIndex,
    ) -> Result<(), AssignmentError> {
        let actual = self.assignment[house.get()];
        if actual != Some(from) {
            return Err(NotAssignedToError::new(house, from, actual).into());
        }
        if from == to {
            return Ok(());
        }
        let demand = self.houses[house.get()].demand();
        self.generators[from.get()].remove_load(demand);
        self.generators[to.get()].add_load(demand);
        self.assignment[house.get()] = Some(to);
        Ok(())
    }

    /// Rewrites the whole assignment to match a previously captured
    /// snapshot, re-deriving every load counter through the assignment
    /// operations.
    pub fn restore_assignment(
        &mut self,
        snapshot: &[Option<GeneratorIndex>],
    ) -> Result<(), AssignmentError> {
        if snapshot.len() != self.assignment.len() {
            return Err(SnapshotLengthError::new(self.assignment.len(), snapshot.len()).into());
        }
        for i in 0..snapshot.len() {
            let house = HouseIndex::new(i);
            let current = self.assignment[i];
            let target = snapshot[i];
            if current == target {
                continue;
            }
            if let Some(generator) = current {
                self.unassign(house, generator)?;
            }
            if let Some(generator) = target {
                self.assign(house, generator)?;
            }
        }
        Ok(())
    }

    // --------------------- Cost ---------------------

    /// Fully recomputes the cost statistics from the live assignment.
    ///
    /// O(#generators). Must be called after every mutation before any
    /// decision consumes the cost; the accessors below only echo the last
    /// recomputation.
    pub fn recompute_cost(&mut self) -> CostBreakdown {
        let count = self.generators.len();
        if count == 0 {
            self.stats = CostBreakdown::default();
            return self.stats;
        }

        let mean = self
            .generators
            .iter()
            .map(Generator::utilization)
            .sum::<f64>()
            / count as f64;

        let mut dispersion = 0.0;
        let mut overload = 0.0;
        for generator in &self.generators {
            let utilization = generator.utilization();
            dispersion += (utilization - mean).abs();
            if utilization > 1.0 {
                overload += utilization - 1.0;
            }
        }

        self.stats = CostBreakdown {
            mean_utilization: mean,
            dispersion,
            overload,
            cost: dispersion + self.penalty * overload,
        };
        self.stats
    }

    #[inline]
    pub fn stats(&self) -> CostBreakdown {
        self.stats
    }

    #[inline]
    pub fn cost(&self) -> Cost {
        self.stats.cost
    }

    #[inline]
    pub fn mean_utilization(&self) -> f64 {
        self.stats.mean_utilization
    }

    #[inline]
    pub fn dispersion(&self) -> f64 {
        self.stats.dispersion
    }

    #[inline]
    pub fn overload(&self) -> f64 {
        self.stats.overload
    }
}
