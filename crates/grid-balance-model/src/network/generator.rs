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

use crate::common::{Identifier, IdentifierMarkerName};
use crate::network::err::NegativeCapacityError;
use grid_balance_core::prelude::Power;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratorIndexMarker;

impl IdentifierMarkerName for GeneratorIndexMarker {
    const NAME: &'static str = "GeneratorIndex";
}

pub type GeneratorIndex = Identifier<usize, GeneratorIndexMarker>;

/// A capacitated resource. The load counter is the sum of the demands of
/// the houses currently assigned to this generator; only the owning network
/// mutates it, through the assignment operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Generator {
    name: String,
    capacity: Power,
    load: Power,
}

impl Generator {
    #[inline]
    pub fn new(
        name: impl Into<String>,
        capacity: Power,
    ) -> Result<Self, NegativeCapacityError> {
        let name = name.into();
        if capacity.is_negative() {
            return Err(NegativeCapacityError::new(name, capacity));
        }
        Ok(Self {
            name,
            capacity,
            load: Power::new(0),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn capacity(&self) -> Power {
        self.capacity
    }

    #[inline]
    pub fn load(&self) -> Power {
        self.load
    }

    #[inline]
    pub fn remaining_capacity(&self) -> Power {
        self.capacity - self.load
    }

    /// Load over capacity; 0.0 for a zero-capacity generator. A value above
    /// 1.0 indicates overload.
    #[inline]
    pub fn utilization(&self) -> f64 {
        if self.capacity.value() == 0 {
            0.0
        } else {
            self.load.value() as f64 / self.capacity.value() as f64
        }
    }

    #[inline]
    pub(crate) fn add_load(&mut self, demand: Power) {
        self.load += demand;
    }

    #[inline]
    pub(crate) fn remove_load(&mut self, demand: Power) {
        self.load -= demand;
    }
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.load, self.capacity)
    }
}
