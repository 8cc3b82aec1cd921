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
use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Sub},
};

/// A span of travel time in minutes.
///
/// All costs in the network model are expressed in minutes. `Minutes`
/// is a transparent wrapper around `f64` so that infinite travel times
/// ("unreachable", "no service") remain representable.
///
/// # Examples
///
/// ```
/// use headway_core::Minutes;
///
/// let walk = Minutes::new(5.0);
/// let ride = Minutes::new(12.5);
/// assert_eq!((walk + ride).value(), 17.5);
/// assert!(Minutes::INFINITY.value().is_infinite());
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Minutes(f64);

impl Minutes {
    /// Zero travel time.
    pub const ZERO: Minutes = Minutes(0.0);

    /// Infinite travel time, the "unreachable" sentinel.
    pub const INFINITY: Minutes = Minutes(f64::INFINITY);

    /// Creates a new `Minutes` value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Minutes(value)
    }

    /// Returns the underlying number of minutes.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` when the span is neither infinite nor NaN.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Display for Minutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}min", self.0)
    }
}

impl Add for Minutes {
    type Output = Minutes;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Minutes(self.0 + rhs.0)
    }
}

impl AddAssign for Minutes {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Minutes {
    type Output = Minutes;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Minutes(self.0 - rhs.0)
    }
}

impl Mul<f64> for Minutes {
    type Output = Minutes;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Minutes(self.0 * rhs)
    }
}

impl Div<f64> for Minutes {
    type Output = Minutes;

    #[inline]
    fn div(self, rhs: f64) -> Self::Output {
        Minutes(self.0 / rhs)
    }
}

impl Sum for Minutes {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Minutes::ZERO, Add::add)
    }
}

impl Zero for Minutes {
    #[inline]
    fn zero() -> Self {
        Minutes::ZERO
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

/// A service frequency in departures per minute.
///
/// The inverse of a frequency is the expected headway between vehicles.
/// A frequency of zero means the line runs no vehicles; its headway is
/// infinite. Deterministic (non-boarding) arcs carry an infinite
/// frequency in the assignment model.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Frequency(f64);

impl Frequency {
    /// No departures at all.
    pub const ZERO: Frequency = Frequency(0.0);

    /// The deterministic-arc sentinel: departures are continuous.
    pub const INFINITY: Frequency = Frequency(f64::INFINITY);

    /// Creates a new `Frequency` in departures per minute.
    #[inline]
    pub const fn new(per_minute: f64) -> Self {
        Frequency(per_minute)
    }

    /// Returns the underlying departures-per-minute rate.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` when the rate is neither infinite nor NaN.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// The expected headway between departures.
    ///
    /// A zero frequency yields an infinite headway.
    #[inline]
    pub fn headway(self) -> Minutes {
        if self.0 > 0.0 {
            Minutes::new(1.0 / self.0)
        } else {
            Minutes::INFINITY
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/min", self.0)
    }
}

impl Add for Frequency {
    type Output = Frequency;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Frequency(self.0 + rhs.0)
    }
}

impl AddAssign for Frequency {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Zero for Frequency {
    #[inline]
    fn zero() -> Self {
        Frequency::ZERO
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn minutes_arithmetic() {
        let a = Minutes::new(10.0);
        let b = Minutes::new(2.5);
        assert_eq!((a + b).value(), 12.5);
        assert_eq!((a - b).value(), 7.5);
        assert_eq!((a * 3.0).value(), 30.0);
        assert_eq!((a / 4.0).value(), 2.5);
    }

    #[test]
    fn minutes_sum_and_zero() {
        let total: Minutes = [1.0, 2.0, 3.0].iter().map(|&m| Minutes::new(m)).sum();
        assert_eq!(total.value(), 6.0);
        assert!(Minutes::ZERO.is_zero());
    }

    #[test]
    fn infinity_propagates_through_addition() {
        let inf = Minutes::INFINITY + Minutes::new(10.0);
        assert!(!inf.is_finite());
    }

    #[test]
    fn headway_is_inverse_frequency() {
        let freq = Frequency::new(1.0 / 60.0);
        assert!((freq.headway().value() - 60.0).abs() < 1e-12);
    }

    #[test]
    fn zero_frequency_has_infinite_headway() {
        assert!(!Frequency::ZERO.headway().is_finite());
    }

    #[test]
    fn frequencies_accumulate() {
        let mut f = Frequency::new(1.0 / 30.0);
        f += Frequency::new(1.0 / 60.0);
        assert!((f.value() - 0.05).abs() < 1e-12);
        assert!((f.headway().value() - 20.0).abs() < 1e-12);
    }
}
