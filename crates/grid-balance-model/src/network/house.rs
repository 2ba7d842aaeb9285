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
use grid_balance_core::prelude::Power;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HouseIndexMarker;

impl IdentifierMarkerName for HouseIndexMarker {
    const NAME: &'static str = "HouseIndex";
}

pub type HouseIndex = Identifier<usize, HouseIndexMarker>;

/// Consumption category of a house. The persisted format uses the French
/// labels; every category maps to a fixed demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Consumption {
    Low,
    Normal,
    High,
}

impl Consumption {
    pub const ALL: [Consumption; 3] = [Consumption::Low, Consumption::Normal, Consumption::High];

    #[inline]
    pub const fn demand(self) -> Power {
        match self {
            Consumption::Low => Power::new(10),
            Consumption::Normal => Power::new(20),
            Consumption::High => Power::new(40),
        }
    }

    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            Consumption::Low => "BASSE",
            Consumption::Normal => "NORMAL",
            Consumption::High => "FORTE",
        }
    }

    /// Resolves a persisted label, ignoring ASCII case.
    #[inline]
    pub fn from_label(label: &str) -> Option<Consumption> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for Consumption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A demand unit. Immutable after creation; the demand is fixed by the
/// consumption category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct House {
    name: String,
    consumption: Consumption,
}

impl House {
    #[inline]
    pub fn new(name: impl Into<String>, consumption: Consumption) -> Self {
        Self {
            name: name.into(),
            consumption,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn consumption(&self) -> Consumption {
        self.consumption
    }

    #[inline]
    pub fn demand(&self) -> Power {
        self.consumption.demand()
    }
}

impl std::fmt::Display for House {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.demand())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumption_demands() {
        assert_eq!(Consumption::Low.demand(), Power::new(10));
        assert_eq!(Consumption::Normal.demand(), Power::new(20));
        assert_eq!(Consumption::High.demand(), Power::new(40));
    }

    #[test]
    fn test_consumption_labels_round_trip() {
        for c in Consumption::ALL {
            assert_eq!(Consumption::from_label(c.label()), Some(c));
        }
    }

    #[test]
    fn test_from_label_is_case_insensitive() {
        assert_eq!(Consumption::from_label("basse"), Some(Consumption::Low));
        assert_eq!(Consumption::from_label("Forte"), Some(Consumption::High));
        assert_eq!(Consumption::from_label("normal"), Some(Consumption::Normal));
    }

    #[test]
    fn test_from_label_rejects_unknown() {
        assert_eq!(Consumption::from_label("MOYENNE"), None);
        assert_eq!(Consumption::from_label(""), None);
    }

    #[test]
    fn test_house_accessors_and_display() {
        let h = House::new("m1", Consumption::Normal);
        assert_eq!(h.name(), "m1");
        assert_eq!(h.consumption(), Consumption::Normal);
        assert_eq!(h.demand(), Power::new(20));
        assert_eq!(h.to_string(), "m1 (20kW)");
    }

    #[test]
    fn test_house_index_display() {
        assert_eq!(HouseIndex::new(2).to_string(), "HouseIndex(2)");
    }
}
