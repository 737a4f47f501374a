use crate::{M1fpError, M1fpResult};
use serde::{Deserialize, Serialize};
use unknown_order::BigNumber;

/// An M1FP ciphertext: the pair `(C1, C2)` in the common domain
/// `ℤ/Dℤ`, together with its copy of `D` and the decimal digit width
/// of the message it encrypts.
///
/// Ciphertexts are immutable; homomorphic addition produces a fresh
/// value and leaves both operands untouched.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Ciphertext {
    pub(crate) c1: BigNumber,
    pub(crate) c2: BigNumber,
    pub(crate) d: BigNumber,
    pub(crate) digits: u16,
}

impl Ciphertext {
    /// The first component `(r · X) mod D`.
    pub fn c1(&self) -> &BigNumber {
        &self.c1
    }

    /// The second component `(M + r · H) mod D`.
    pub fn c2(&self) -> &BigNumber {
        &self.c2
    }

    /// The common denominator this ciphertext lives in.
    pub fn denominator(&self) -> &BigNumber {
        &self.d
    }

    /// The decimal digit width of the encrypted message.
    pub fn digits(&self) -> u16 {
        self.digits
    }

    /// Homomorphically add two ciphertexts produced under the same
    /// public key, commonly denoted in text as c1 \bigoplus c2.
    ///
    /// The sum decrypts to `(m₁ + m₂) mod 10^n`. Addition in `ℤ/Dℤ`
    /// is commutative and associative bit-for-bit, so any reduction
    /// order over a multiset of ciphertexts yields the same value.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, other: &Self) -> M1fpResult<Self> {
        if self.d != other.d {
            return Err(M1fpError::DomainMismatch);
        }
        Ok(Self {
            c1: self.c1.modadd(&other.c1, &self.d),
            c2: self.c2.modadd(&other.c2, &self.d),
            d: self.d.clone(),
            digits: self.digits.max(other.digits),
        })
    }

    /// Left-fold a non-empty sequence of ciphertexts into their
    /// homomorphic sum.
    pub fn add_many<'a, I>(cts: I) -> M1fpResult<Self>
    where
        I: IntoIterator<Item = &'a Ciphertext>,
    {
        let mut iter = cts.into_iter();
        let mut acc = iter.next().ok_or(M1fpError::EmptyAggregation)?.clone();
        for ct in iter {
            acc = acc.add(ct)?;
        }
        Ok(acc)
    }
}
