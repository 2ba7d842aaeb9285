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

use num_traits::Zero;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Scalar cost of a network state. Dispersion is fractional, so costs are
/// real-valued rather than integral.
pub type Cost = f64;

/// An electrical power quantity in kilowatts.
///
/// Demands, capacities and aggregate loads are all `Power` values. The
/// arithmetic operators panic on `i64` overflow; quantities are bounded by
/// the registered network totals, so overflow indicates a bug.
#[repr(transparent)]
#[must_use]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Power(i64);

impl Power {
    #[inline]
    pub const fn new(value: i64) -> Self {
        Power(value)
    }

    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn checked_add(self, rhs: Power) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Power)
    }

    #[inline]
    pub fn checked_sub(self, rhs: Power) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Power)
    }
}

impl std::fmt::Display for Power {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}kW", self.0)
    }
}

impl Add for Power {
    type Output = Power;

    #[inline]
    fn add(self, rhs: Power) -> Self::Output {
        self.checked_add(rhs).expect("error in Power + Power")
    }
}

impl AddAssign for Power {
    #[inline]
    fn add_assign(&mut self, rhs: Power) {
        *self = *self + rhs;
    }
}

impl Sub for Power {
    type Output = Power;

    #[inline]
    fn sub(self, rhs: Power) -> Self::Output {
        self.checked_sub(rhs).expect("error in Power - Power")
    }
}

impl SubAssign for Power {
    #[inline]
    fn sub_assign(&mut self, rhs: Power) {
        *self = *self - rhs;
    }
}

impl Zero for Power {
    #[inline]
    fn zero() -> Self {
        Power(0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Sum for Power {
    #[inline]
    fn sum<I: Iterator<Item = Power>>(iter: I) -> Self {
        iter.fold(Power::zero(), Add::add)
    }
}
