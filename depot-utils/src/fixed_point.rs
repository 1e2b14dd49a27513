//! Quantized fixed-point numbers.

use std::{
    fmt::{self, Display},
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use serde::{Deserialize, Serialize};

/// A number with exactly two decimal places, stored as hundredths.
///
/// Equality is exact, so two volumes that were computed the same way always
/// compare equal without a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct FixedPoint2(i32);

impl FixedPoint2 {
    const SHIFT: i32 = 100;

    /// Zero.
    pub const ZERO: Self = Self(0);
    /// Marker for "this object has no volume at all", distinct from an empty volume.
    pub const NONE_SENTINEL: Self = Self(-Self::SHIFT);

    /// Creates a value from a whole number.
    #[must_use]
    pub const fn new(whole: i32) -> Self {
        Self(whole.saturating_mul(Self::SHIFT))
    }

    /// Creates a value from raw hundredths.
    #[must_use]
    pub const fn from_raw(hundredths: i32) -> Self {
        Self(hundredths)
    }

    /// Creates a value from a float, rounding half away from zero.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Self((value * f64::from(Self::SHIFT)).round() as i32)
    }

    /// Returns the raw hundredths.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Returns the value as a float.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / f64::from(Self::SHIFT)
    }
}

impl Add for FixedPoint2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for FixedPoint2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FixedPoint2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for FixedPoint2 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a FixedPoint2> for FixedPoint2 {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<f64> for FixedPoint2 {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<FixedPoint2> for f64 {
    fn from(value: FixedPoint2) -> Self {
        value.as_f64()
    }
}

impl Display for FixedPoint2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / Self::SHIFT.unsigned_abs();
        let frac = abs % Self::SHIFT.unsigned_abs();
        if frac == 0 {
            write!(f, "{sign}{whole}")
        } else if frac % 10 == 0 {
            write!(f, "{sign}{whole}.{}", frac / 10)
        } else {
            write!(f, "{sign}{whole}.{frac:02}")
        }
    }
}
