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

/// Reassigns one house from its current generator to another.
///
/// Applying the inverse move exactly undoes the mutation, which is what the
/// annealer's accept/reject rollback relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    house: HouseIndex,
    from: GeneratorIndex,
    to: GeneratorIndex,
}

impl Move {
    #[inline]
    pub fn new(house: HouseIndex, from: GeneratorIndex, to: GeneratorIndex) -> Self {
        Self { house, from, to }
    }

    #[inline]
    pub fn house(&self) -> HouseIndex {
        self.house
    }

    #[inline]
    pub fn from(&self) -> GeneratorIndex {
        self.from
    }

    #[inline]
    pub fn to(&self) -> GeneratorIndex {
        self.to
    }

    #[inline]
    pub fn inverse(&self) -> Move {
        Move {
            house: self.house,
            from: self.to,
            to: self.from,
        }
    }

    /// Errors if the house is not currently assigned to the source
    /// generator.
    #[inline]
    pub fn apply(&self, network: &mut Network) -> Result<(), AssignmentError> {
        network.reassign(self.house, self.from, self.to)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Move({}: {} -> {})", self.house, self.from, self.to)
    }
}

/// Exchanges the generators of two houses; equivalent to the two
/// corresponding moves. Its own inverse: applying the swap again restores
/// the previous state.
///
/// A no-op when either house is unassigned, both share a generator, or the
/// houses coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swap {
    first: HouseIndex,
    second: HouseIndex,
}

impl Swap {
    #[inline]
    pub fn new(first: HouseIndex, second: HouseIndex) -> Self {
        Self { first, second }
    }

    #[inline]
    pub fn first(&self) -> HouseIndex {
        self.first
    }

    #[inline]
    pub fn second(&self) -> HouseIndex {
        self.second
    }

    #[inline]
    pub fn inverse(&self) -> Swap {
        *self
    }

    pub fn apply(&self, network: &mut Network) -> Result<(), AssignmentError> {
        if self.first == self.second {
            return Ok(());
        }
        let (Some(first_gen), Some(second_gen)) = (
            network.assigned_generator(self.first),
            network.assigned_generator(self.second),
        ) else {
            return Ok(());
        };
        if first_gen == second_gen {
            return Ok(());
        }
        network.reassign(self.first, first_gen, second_gen)?;
        network.reassign(self.second, second_gen, first_gen)
    }
}

impl std::fmt::Display for Swap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Swap({}, {})", self.first, self.second)
    }
}
