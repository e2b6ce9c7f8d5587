// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 128-bit scaled decimal value.
//!
//! The wire layout is four 32-bit words in order `lo`, `mid`, `hi`, `flags`,
//! each written as an independent 4-byte primitive. Byte-order flips therefore
//! happen per 4-byte chunk, never across the whole 16 bytes. The flags word
//! carries the scale in bits 16..24 (0..=28 decimal digits after the point)
//! and the sign in bit 31; all other flag bits are reserved zero.

use std::fmt;

const SCALE_SHIFT: u32 = 16;
const SCALE_MASK: u32 = 0x00FF_0000;
const SIGN_MASK: u32 = 0x8000_0000;
const RESERVED_MASK: u32 = !(SCALE_MASK | SIGN_MASK);

/// Maximum number of digits after the decimal point.
pub const MAX_SCALE: u8 = 28;

/// A 96-bit unsigned mantissa with sign and decimal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal128 {
    lo: u32,
    mid: u32,
    hi: u32,
    flags: u32,
}

impl Decimal128 {
    /// Build from a 96-bit mantissa, sign, and scale.
    ///
    /// Returns `None` if `mantissa` exceeds 96 bits or `scale` exceeds
    /// [`MAX_SCALE`].
    pub fn from_parts(mantissa: u128, negative: bool, scale: u8) -> Option<Self> {
        if mantissa >> 96 != 0 || scale > MAX_SCALE {
            return None;
        }
        let mut flags = u32::from(scale) << SCALE_SHIFT;
        if negative {
            flags |= SIGN_MASK;
        }
        Some(Self {
            lo: mantissa as u32,
            mid: (mantissa >> 32) as u32,
            hi: (mantissa >> 64) as u32,
            flags,
        })
    }

    /// Reassemble from the four wire words.
    ///
    /// Returns `None` when the flags word sets reserved bits or an
    /// out-of-range scale.
    pub fn from_words(words: [u32; 4]) -> Option<Self> {
        let [lo, mid, hi, flags] = words;
        if flags & RESERVED_MASK != 0 {
            return None;
        }
        if (flags & SCALE_MASK) >> SCALE_SHIFT > u32::from(MAX_SCALE) {
            return None;
        }
        Some(Self { lo, mid, hi, flags })
    }

    /// The four wire words in serialization order.
    pub const fn to_words(self) -> [u32; 4] {
        [self.lo, self.mid, self.hi, self.flags]
    }

    /// The unsigned 96-bit mantissa.
    pub const fn mantissa(self) -> u128 {
        (self.hi as u128) << 64 | (self.mid as u128) << 32 | self.lo as u128
    }

    /// Number of digits after the decimal point (0..=28).
    pub const fn scale(self) -> u8 {
        ((self.flags & SCALE_MASK) >> SCALE_SHIFT) as u8
    }

    pub const fn is_negative(self) -> bool {
        self.flags & SIGN_MASK != 0
    }

    pub const fn is_zero(self) -> bool {
        self.lo == 0 && self.mid == 0 && self.hi == 0
    }
}

impl fmt::Display for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa().to_string();
        let scale = self.scale() as usize;
        let sign = if self.is_negative() && !self.is_zero() {
            "-"
        } else {
            ""
        };
        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int_part, frac_part)
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}
