//! Fixed-point layout units.
//!
//! Geometry is computed in 1/64 px fixed point so that snapping is exact and
//! sums of many boxes never drift. All arithmetic saturates at the
//! representable range instead of wrapping.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use rustkit_css::Length;

const FRACTIONAL_BITS: u32 = 6;
const DENOMINATOR: i32 = 1 << FRACTIONAL_BITS;
const INT_MAX: i32 = i32::MAX / DENOMINATOR;
const INT_MIN: i32 = i32::MIN / DENOMINATOR;

fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// A length in 1/64 px.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LayoutUnit(i32);

impl LayoutUnit {
    pub const ZERO: LayoutUnit = LayoutUnit(0);
    pub const MAX: LayoutUnit = LayoutUnit(i32::MAX);
    pub const MIN: LayoutUnit = LayoutUnit(i32::MIN);
    /// Smallest positive value.
    pub const EPSILON: LayoutUnit = LayoutUnit(1);

    pub const fn from_raw(raw: i32) -> Self {
        LayoutUnit(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Integer pixels, saturating.
    pub const fn from_int(value: i32) -> Self {
        if value > INT_MAX {
            LayoutUnit::MAX
        } else if value < INT_MIN {
            LayoutUnit::MIN
        } else {
            LayoutUnit(value * DENOMINATOR)
        }
    }

    /// Truncates toward zero.
    pub fn from_f32(value: f32) -> Self {
        LayoutUnit(clamp_to_i32((value * DENOMINATOR as f32) as i64))
    }

    pub fn from_f32_round(value: f32) -> Self {
        LayoutUnit(clamp_to_i32((value * DENOMINATOR as f32).round() as i64))
    }

    pub fn from_f32_floor(value: f32) -> Self {
        LayoutUnit(clamp_to_i32((value * DENOMINATOR as f32).floor() as i64))
    }

    pub fn from_f32_ceil(value: f32) -> Self {
        LayoutUnit(clamp_to_i32((value * DENOMINATOR as f32).ceil() as i64))
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / DENOMINATOR as f32
    }

    /// Integer part, truncated toward zero.
    pub const fn to_int(self) -> i32 {
        self.0 / DENOMINATOR
    }

    /// Nearest integer, halves rounding up.
    pub const fn round(self) -> i32 {
        self.0.saturating_add(DENOMINATOR / 2) >> FRACTIONAL_BITS
    }

    pub const fn floor(self) -> i32 {
        self.0 >> FRACTIONAL_BITS
    }

    pub const fn ceil(self) -> i32 {
        if self.0 >= i32::MAX - DENOMINATOR + 1 {
            return INT_MAX;
        }
        (self.0 + DENOMINATOR - 1) >> FRACTIONAL_BITS
    }

    /// Sub-pixel part, with the sign of `self`.
    pub const fn fraction(self) -> LayoutUnit {
        LayoutUnit(self.0 % DENOMINATOR)
    }

    pub fn abs(self) -> LayoutUnit {
        LayoutUnit(self.0.saturating_abs())
    }

    pub fn clamp_negative_to_zero(self) -> LayoutUnit {
        self.max(LayoutUnit::ZERO)
    }

    /// `self * m / d` with a 64-bit intermediate.
    pub fn mul_div(self, m: LayoutUnit, d: LayoutUnit) -> LayoutUnit {
        let n = self.0 as i64 * m.0 as i64;
        if d.0 == 0 {
            return saturate_sign(n);
        }
        LayoutUnit(clamp_to_i32(n / d.0 as i64))
    }
}

fn saturate_sign(value: i64) -> LayoutUnit {
    match value.signum() {
        1 => LayoutUnit::MAX,
        -1 => LayoutUnit::MIN,
        _ => LayoutUnit::ZERO,
    }
}

/// Remainder of `a / b`; the sign follows `a`. Zero for a zero divisor.
pub fn int_mod(a: LayoutUnit, b: LayoutUnit) -> LayoutUnit {
    if b.0 == 0 {
        return LayoutUnit::ZERO;
    }
    LayoutUnit(a.0.wrapping_rem(b.0))
}

/// Snap `size` so that a box starting at `location` covers whole pixels.
///
/// Never collapses a visibly non-empty size to zero.
pub fn snap_size_to_pixel(size: LayoutUnit, location: LayoutUnit) -> i32 {
    let fraction = location.fraction();
    let result = (fraction + size).round() - fraction.round();
    if result == 0 && size.abs() > LayoutUnit(4 * LayoutUnit::EPSILON.0) {
        return if size > LayoutUnit::ZERO { 1 } else { -1 };
    }
    result
}

/// Resolve a style length, with percentages against `maximum` and `auto` as zero.
pub fn minimum_value_for_length(length: Length, maximum: LayoutUnit) -> LayoutUnit {
    match length {
        Length::Px(px) => LayoutUnit::from_f32(px),
        Length::Percent(pct) => LayoutUnit::from_f32(maximum.to_f32() * pct / 100.0),
        Length::Auto | Length::Zero => LayoutUnit::ZERO,
    }
}

impl Add for LayoutUnit {
    type Output = LayoutUnit;
    fn add(self, rhs: LayoutUnit) -> LayoutUnit {
        LayoutUnit(self.0.saturating_add(rhs.0))
    }
}

impl Sub for LayoutUnit {
    type Output = LayoutUnit;
    fn sub(self, rhs: LayoutUnit) -> LayoutUnit {
        LayoutUnit(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for LayoutUnit {
    fn add_assign(&mut self, rhs: LayoutUnit) {
        *self = *self + rhs;
    }
}

impl SubAssign for LayoutUnit {
    fn sub_assign(&mut self, rhs: LayoutUnit) {
        *self = *self - rhs;
    }
}

impl Neg for LayoutUnit {
    type Output = LayoutUnit;
    fn neg(self) -> LayoutUnit {
        LayoutUnit(self.0.saturating_neg())
    }
}

impl Mul for LayoutUnit {
    type Output = LayoutUnit;
    fn mul(self, rhs: LayoutUnit) -> LayoutUnit {
        LayoutUnit(clamp_to_i32(self.0 as i64 * rhs.0 as i64 / DENOMINATOR as i64))
    }
}

impl Mul<i32> for LayoutUnit {
    type Output = LayoutUnit;
    fn mul(self, rhs: i32) -> LayoutUnit {
        LayoutUnit(clamp_to_i32(self.0 as i64 * rhs as i64))
    }
}

impl Div for LayoutUnit {
    type Output = LayoutUnit;
    fn div(self, rhs: LayoutUnit) -> LayoutUnit {
        let n = self.0 as i64 * DENOMINATOR as i64;
        if rhs.0 == 0 {
            return saturate_sign(n);
        }
        LayoutUnit(clamp_to_i32(n / rhs.0 as i64))
    }
}

impl Div<i32> for LayoutUnit {
    type Output = LayoutUnit;
    fn div(self, rhs: i32) -> LayoutUnit {
        if rhs == 0 {
            return saturate_sign(self.0 as i64);
        }
        LayoutUnit(clamp_to_i32(self.0 as i64 / rhs as i64))
    }
}

impl From<i32> for LayoutUnit {
    fn from(value: i32) -> Self {
        LayoutUnit::from_int(value)
    }
}

impl fmt::Debug for LayoutUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f32())
    }
}

impl fmt::Display for LayoutUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f32())
    }
}
