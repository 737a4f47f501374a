use crate::{M1fpError, M1fpResult};
use serde::{Deserialize, Serialize};
use unknown_order::BigNumber;

/// Minimum arithmetic precision in bits.
pub const MIN_PRECISION: u16 = 128;

/// Decimal digit width used for vote tallies.
/// `10^9 − 1` comfortably exceeds the 64 · 15,625,000 tally bound.
pub const VOTE_DIGITS: u16 = 9;

/// Largest admissible single vote (6 bits per the paper).
pub const MAX_VOTE: u64 = 64;

/// The `(P, n)` pair fixing the common domain `D = 2^P · 5^n`.
///
/// `P` is the arithmetic precision in bits, `n` the decimal digit width
/// of the numeric plaintext. Because `D = 2^(P−n) · 10^n`, a message
/// `m ∈ [0, 10^n)` embeds exactly as `m · 2^(P−n)` and every modular
/// sum of embedded messages stays an exact multiple of the scale
/// factor.
#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DomainParams {
    prec: u16,
    digits: u16,
}

impl Default for DomainParams {
    fn default() -> Self {
        Self {
            prec: 256,
            digits: VOTE_DIGITS,
        }
    }
}

impl DomainParams {
    /// Create domain parameters, requiring `prec ≥ 128` and
    /// `prec ≥ digits ≥ 1`.
    pub fn new(prec: u16, digits: u16) -> M1fpResult<Self> {
        if digits == 0 {
            return Err(M1fpError::InvalidDigits(digits));
        }
        if prec < MIN_PRECISION || prec < digits {
            return Err(M1fpError::PrecisionTooSmall(prec));
        }
        Ok(Self { prec, digits })
    }

    /// The arithmetic precision `P` in bits.
    pub fn precision(&self) -> u16 {
        self.prec
    }

    /// The decimal digit width `n` of the numeric plaintext.
    pub fn digits(&self) -> u16 {
        self.digits
    }

    /// The common denominator `D = 2^P · 5^n`.
    pub fn denominator(&self) -> BigNumber {
        let two_p = pow(2, u32::from(self.prec));
        let five_n = pow(5, u32::from(self.digits));
        &two_p * &five_n
    }

    /// The scale factor `2^(P−n)` embedding a message into `ℤ/Dℤ`.
    pub fn scale_factor(&self) -> BigNumber {
        self.scale_for(self.digits)
    }

    /// `10^n`, the modulus of the recovered message.
    pub fn ten_pow(&self) -> BigNumber {
        pow(10, u32::from(self.digits))
    }

    // Scale factor for a message narrower than the full digit width.
    // Callers guarantee width ≤ prec.
    pub(crate) fn scale_for(&self, width: u16) -> BigNumber {
        pow(2, u32::from(self.prec) - u32::from(width))
    }
}

/// `base^exp` by square-and-multiply over exact integers.
pub(crate) fn pow(base: u8, mut exp: u32) -> BigNumber {
    let mut acc = BigNumber::one();
    let mut base = BigNumber::from(base);
    while exp > 0 {
        if exp & 1 == 1 {
            acc = &acc * &base;
        }
        base = &base * &base;
        exp >>= 1;
    }
    acc
}
