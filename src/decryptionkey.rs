use crate::{
    codec,
    domain::{self, DomainParams},
    random_scalar, Ciphertext, EncryptionKey, M1fpError, M1fpResult,
};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use unknown_order::BigNumber;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An M1FP decryption key
///
/// The secret scalar `a` is sampled from `[1, 2^128)` and wiped from
/// memory when the key is dropped. The public half is kept alongside so
/// decryption can validate domains without extra plumbing.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct DecryptionKey {
    #[zeroize(skip)]
    pub(crate) pk: EncryptionKey,
    /// Secret integer used for decryption
    pub(crate) a: BigNumber,
}

#[derive(Serialize, Deserialize)]
struct DecryptionKeyBytes {
    a: Vec<u8>,
    pk: Vec<u8>,
}

impl DecryptionKey {
    /// Generate a new key pair from the OS randomness source.
    ///
    /// `x` is the textual public parameter, an irrational in `(0, 1)`
    /// written as a decimal fraction with at least `P` bits of
    /// mantissa; [`crate::DEFAULT_X`] is the reference choice.
    pub fn random(params: DomainParams, x: &str) -> M1fpResult<Self> {
        Self::from_rng(params, x, &mut OsRng)
    }

    /// Generate a new key pair using the provided `rng`.
    ///
    /// The irrational is quantized to `P` binary fractional bits before
    /// lifting, which makes `x · D` and `((a·x) mod 1) · D` exact
    /// integers. That exactness is what keeps homomorphic tallies
    /// drift-free at any aggregation count.
    pub fn from_rng(
        params: DomainParams,
        x: &str,
        rng: &mut (impl CryptoRng + RngCore),
    ) -> M1fpResult<Self> {
        let (num, mantissa) = parse_irrational(x)?;
        let two_p = domain::pow(2, u32::from(params.precision()));
        let ten_t = domain::pow(10, mantissa);
        // the fraction must carry at least P bits behind the point
        if ten_t < two_p {
            return Err(M1fpError::InvalidIrrational);
        }
        // x2p = ⌊x · 2^P⌋, the dyadic quantization of x
        let scaled = &num * &two_p;
        let x2p = &scaled / &ten_t;
        if x2p.is_zero() {
            return Err(M1fpError::InvalidIrrational);
        }

        let a = random_scalar(rng)?;
        // h2p = frac(a · x) · 2^P, exact because x is dyadic
        let h2p = a.modmul(&x2p, &two_p);

        let five_n = domain::pow(5, u32::from(params.digits()));
        let x_int = &x2p * &five_n;
        let h_int = &h2p * &five_n;
        let d = &two_p * &five_n;

        let pk = EncryptionKey {
            params,
            x_int,
            h_int,
            d,
        };
        Ok(DecryptionKey { pk, a })
    }

    /// Reverse a ciphertext to its byte-string plaintext.
    pub fn decrypt(&self, ct: &Ciphertext) -> M1fpResult<Vec<u8>> {
        let digits = self.decrypt_digits(ct)?;
        codec::digits_to_bytes(&digits)
    }

    /// Reverse a ciphertext to its numeric plaintext, returned as a
    /// zero-padded decimal string of the ciphertext's digit width.
    pub fn decrypt_digits(&self, ct: &Ciphertext) -> M1fpResult<String> {
        let m = self.message_int(ct, false)?;
        Ok(codec::int_to_digits(&m, usize::from(ct.digits)))
    }

    /// Like [`DecryptionKey::decrypt_digits`], but fails closed when
    /// the unscaled message carries a fractional residue. Correct
    /// encryptions always divide out exactly, so a nonzero residue
    /// marks a ciphertext that was never produced by this scheme.
    pub fn decrypt_digits_strict(&self, ct: &Ciphertext) -> M1fpResult<String> {
        let m = self.message_int(ct, true)?;
        Ok(codec::int_to_digits(&m, usize::from(ct.digits)))
    }

    /// Like [`DecryptionKey::decrypt`], but fails closed on any
    /// fractional residue.
    pub fn decrypt_strict(&self, ct: &Ciphertext) -> M1fpResult<Vec<u8>> {
        let digits = self.decrypt_digits_strict(ct)?;
        codec::digits_to_bytes(&digits)
    }

    /// Recover the numeric value from a ciphertext produced by
    /// [`EncryptionKey::encrypt_vote`].
    pub fn decrypt_vote(&self, ct: &Ciphertext) -> M1fpResult<u64> {
        let digits = self.decrypt_digits(ct)?;
        codec::digits_to_u64(&digits)
    }

    /// Like [`DecryptionKey::decrypt_vote`], but fails closed on any
    /// fractional residue.
    pub fn decrypt_vote_strict(&self, ct: &Ciphertext) -> M1fpResult<u64> {
        let digits = self.decrypt_digits_strict(ct)?;
        codec::digits_to_u64(&digits)
    }

    // M' = (C2 − a·C1) mod D, then divide by 2^(P−w) with round
    // half-up and reduce mod 10^w. For well-formed ciphertexts the
    // remainder is zero and the rounding never fires.
    fn message_int(&self, ct: &Ciphertext, strict: bool) -> M1fpResult<BigNumber> {
        if ct.d != self.pk.d {
            return Err(M1fpError::DomainMismatch);
        }
        if ct.c1 >= self.pk.d || ct.c2 >= self.pk.d {
            return Err(M1fpError::MalformedCiphertext);
        }
        let width = ct.digits;
        if self.pk.params.precision() < width {
            return Err(M1fpError::PrecisionTooSmall(self.pk.params.precision()));
        }

        let a_c1 = self.a.modmul(&ct.c1, &ct.d);
        let lifted = ct.c2.modsub(&a_c1, &ct.d);

        let scale = self.pk.params.scale_for(width);
        let mut q = &lifted / &scale;
        let rem = &lifted % &scale;
        if !rem.is_zero() {
            if strict {
                return Err(M1fpError::MalformedCiphertext);
            }
            let half = &scale / &BigNumber::from(2u8);
            if rem >= half {
                q = &q + &BigNumber::one();
            }
        }
        Ok(&q % &domain::pow(10, u32::from(width)))
    }

    /// Get this key's byte representation: the secret scalar as
    /// minimal big-endian bytes next to the public key blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        let bytes = DecryptionKeyBytes {
            a: self.a.to_bytes(),
            pk: self.pk.to_bytes(),
        };
        serde_bare::to_vec(&bytes).unwrap()
    }

    /// Convert a byte representation to a decryption key
    pub fn from_bytes<B: AsRef<[u8]>>(data: B) -> M1fpResult<Self> {
        let bytes = serde_bare::from_slice::<DecryptionKeyBytes>(data.as_ref())
            .map_err(|_| M1fpError::MalformedKeyBlob)?;
        let pk = EncryptionKey::from_bytes(&bytes.pk)?;
        let a = BigNumber::from_slice(bytes.a.as_slice());
        if a.is_zero() {
            return Err(M1fpError::MalformedKeyBlob);
        }
        Ok(Self { pk, a })
    }
}

// Split "0.ddd…" into the digit numerator and its length, so that
// x = num / 10^mantissa exactly.
fn parse_irrational(x: &str) -> M1fpResult<(BigNumber, u32)> {
    let s = x.trim();
    let rest = s
        .strip_prefix("0.")
        .or_else(|| s.strip_prefix('.'))
        .ok_or(M1fpError::InvalidIrrational)?;
    if rest.is_empty() || !rest.bytes().all(|c| c.is_ascii_digit()) {
        return Err(M1fpError::InvalidIrrational);
    }
    let num = codec::digits_to_int(rest).map_err(|_| M1fpError::InvalidIrrational)?;
    if num.is_zero() {
        // x must exceed zero
        return Err(M1fpError::InvalidIrrational);
    }
    let mantissa = u32::try_from(rest.len()).map_err(|_| M1fpError::InvalidIrrational)?;
    Ok((num, mantissa))
}
