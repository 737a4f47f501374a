/*
    Copyright the m1fp-rs developers. All Rights Reserved.
    SPDX-License-Identifier: Apache-2.0
*/
//! M1fp-rs contains the additively homomorphic public-key cryptosystem
//! of El-Yahyaoui & Omary (2022). Security rests on the Modulo-1
//! Factoring Problem (M1FP): given an irrational `x ∈ (0,1)` and
//! `c = (a·x) mod 1` for an unknown integer `a`, recover `a`.
//!
//! All arithmetic happens in the common domain `ℤ/Dℤ` with
//! `D = 2^P · 5^n`, so the binary and decimal scalings of a plaintext
//! are exact multiples of a shared factor. Homomorphic addition is
//! plain modular addition and a tally of 10^8 ciphertexts decrypts to
//! the exact integer sum with zero drift.
#![deny(
    warnings,
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    trivial_casts,
    trivial_numeric_casts
)]

mod ciphertext;
mod codec;
mod decryptionkey;
mod domain;
mod encryptionkey;
mod error;

pub use unknown_order;

use rand::{CryptoRng, RngCore};
use unknown_order::BigNumber;

/// The default irrational public parameter: `ln(5) mod 1` to 79 decimal
/// places, enough mantissa for 256-bit precision.
pub const DEFAULT_X: &str =
    "0.6094379124341003746007593332261876395256013542685177219126478914741789877076578";

/// A randomizer drawn during encryption
pub type Randomizer = BigNumber;

// Secret scalars and randomizers carry 128 bits of entropy.
pub(crate) const SCALAR_BYTES: usize = 16;

/// Sample a scalar uniformly from `[1, 2^128)`. A zero draw is replaced
/// with one so the output is always usable as a secret or randomizer.
pub(crate) fn random_scalar(rng: &mut (impl CryptoRng + RngCore)) -> M1fpResult<BigNumber> {
    let mut buf = [0u8; SCALAR_BYTES];
    rng.try_fill_bytes(&mut buf)?;
    let s = BigNumber::from_slice(buf);
    if s.is_zero() {
        return Ok(BigNumber::one());
    }
    Ok(s)
}

pub use ciphertext::*;
pub use codec::*;
pub use decryptionkey::*;
pub use domain::*;
pub use encryptionkey::*;
pub use error::*;
