//! Small integer helpers used for ring sizing.
//!
//! A ring whose capacity is a multiple of every chunk size moved through it
//! never splits a chunk at the end of its storage. [`lcm`] finds the smallest
//! such block; [`gcd`] and [`abs`] support it.

use std::ops::{Div, Mul, Rem};

/// Primitive integer types accepted by the helpers in this crate.
pub trait Integer:
    Copy + PartialOrd + Rem<Output = Self> + Div<Output = Self> + Mul<Output = Self>
{
    const ZERO: Self;

    /// Absolute value. Identity for unsigned types.
    fn magnitude(self) -> Self;
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl Integer for $t {
            const ZERO: Self = 0;

            #[inline(always)]
            fn magnitude(self) -> Self {
                if self < 0 { -self } else { self }
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl Integer for $t {
            const ZERO: Self = 0;

            #[inline(always)]
            fn magnitude(self) -> Self {
                self
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64, i128, isize);
impl_unsigned!(u8, u16, u32, u64, u128, usize);

/// Absolute value of `v`.
///
/// # Panics
/// Overflows (and panics in debug builds) for the minimum value of a signed
/// type, like the standard `abs`.
#[inline]
pub fn abs<T: Integer>(v: T) -> T {
    v.magnitude()
}

/// The larger of `a` and `b`; `b` when they compare equal or unordered.
#[inline]
pub fn max<T: PartialOrd>(a: T, b: T) -> T {
    if a > b { a } else { b }
}

/// Greatest common divisor by Euclid's algorithm.
///
/// The result is never negative. `gcd(0, 0) == 0`.
///
/// # Example
/// ```
/// use cadence_math::gcd;
/// assert_eq!(gcd(48u32, 18), 6);
/// assert_eq!(gcd(-4i64, 6), 2);
/// ```
pub fn gcd<T: Integer>(mut a: T, mut b: T) -> T {
    while b != T::ZERO {
        let r = a % b;
        a = b;
        b = r;
    }
    abs(a)
}

/// Least common multiple of `a` and `b`.
///
/// The result is never negative, and is 0 when either argument is 0.
///
/// # Example
/// ```
/// use cadence_math::lcm;
/// assert_eq!(lcm(64usize, 48), 192);
/// assert_eq!(lcm(0u8, 0), 0);
/// ```
pub fn lcm<T: Integer>(a: T, b: T) -> T {
    if a == T::ZERO || b == T::ZERO {
        return T::ZERO;
    }
    (abs(a) / gcd(a, b)) * abs(b)
}
