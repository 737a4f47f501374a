use crate::{
    codec, random_scalar, Ciphertext, DecryptionKey, DomainParams, M1fpError, M1fpResult,
    Randomizer, MAX_VOTE,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use unknown_order::BigNumber;

// P(2) | n(2) | len(XInt)(4) | len(HInt)(4), all big-endian
const BLOB_HEADER: usize = 12;

/// An M1FP encryption key: the lifted public parameters of the scheme.
///
/// `XInt = ⌊x · D⌋` and `HInt = ⌊((a·x) mod 1) · D⌋` are the integer
/// representatives of the irrational `x` and the masked scalar in the
/// common domain `D = 2^P · 5^n`. Both are strictly below `D`.
#[derive(Clone, Debug, PartialEq)]
pub struct EncryptionKey {
    pub(crate) params: DomainParams,
    pub(crate) x_int: BigNumber,
    pub(crate) h_int: BigNumber,
    // cached common denominator D = 2^P · 5^n
    pub(crate) d: BigNumber,
}

#[derive(Serialize, Deserialize)]
struct EncryptionKeyRepr {
    prec: u16,
    digits: u16,
    x_int: BigNumber,
    h_int: BigNumber,
}

impl Serialize for EncryptionKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        EncryptionKeyRepr {
            prec: self.params.precision(),
            digits: self.params.digits(),
            x_int: self.x_int.clone(),
            h_int: self.h_int.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EncryptionKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = EncryptionKeyRepr::deserialize(deserializer)?;
        let params =
            DomainParams::new(repr.prec, repr.digits).map_err(serde::de::Error::custom)?;
        Self::from_parts(params, repr.x_int, repr.h_int).map_err(serde::de::Error::custom)
    }
}

impl From<&DecryptionKey> for EncryptionKey {
    fn from(sk: &DecryptionKey) -> EncryptionKey {
        sk.pk.clone()
    }
}

impl EncryptionKey {
    // Reassemble a key from its serialized pieces, re-deriving the
    // cached denominator and enforcing the domain invariants.
    pub(crate) fn from_parts(
        params: DomainParams,
        x_int: BigNumber,
        h_int: BigNumber,
    ) -> M1fpResult<Self> {
        let d = params.denominator();
        if x_int.is_zero() || x_int >= d || h_int >= d {
            return Err(M1fpError::MalformedKeyBlob);
        }
        Ok(Self {
            params,
            x_int,
            h_int,
            d,
        })
    }

    /// Encrypt a byte-string message with a fresh 128-bit randomizer.
    /// The message must fit the domain: three digits per byte, at most
    /// `n` digits in total.
    pub fn encrypt<M>(&self, msg: M) -> M1fpResult<(Ciphertext, Randomizer)>
    where
        M: AsRef<[u8]>,
    {
        let r = random_scalar(&mut OsRng)?;
        let ct = self.encrypt_with_randomizer(msg, &r)?;
        Ok((ct, r))
    }

    /// Encrypt a byte-string message with a caller-chosen randomizer.
    /// The output is a pure function of `(key, message, randomizer)`,
    /// which makes test vectors replayable byte for byte.
    pub fn encrypt_with_randomizer<M>(&self, msg: M, r: &Randomizer) -> M1fpResult<Ciphertext>
    where
        M: AsRef<[u8]>,
    {
        let digits = codec::bytes_to_digits(msg.as_ref());
        if digits.len() > usize::from(self.params.digits()) {
            return Err(M1fpError::PlaintextTooLong(digits.len()));
        }
        let width = digits.len() as u16;
        self.encrypt_lifted(&digits, width, r)
    }

    /// Encrypt a numeric plaintext given as at most `n` decimal digits.
    pub fn encrypt_digits(&self, digits: &str) -> M1fpResult<(Ciphertext, Randomizer)> {
        let r = random_scalar(&mut OsRng)?;
        let ct = self.encrypt_digits_with_randomizer(digits, &r)?;
        Ok((ct, r))
    }

    /// Encrypt a numeric plaintext with a caller-chosen randomizer.
    /// The digits are zero-padded on the left to the full width `n`.
    pub fn encrypt_digits_with_randomizer(
        &self,
        digits: &str,
        r: &Randomizer,
    ) -> M1fpResult<Ciphertext> {
        if !digits.bytes().all(|c| c.is_ascii_digit()) {
            return Err(M1fpError::MalformedPlaintext);
        }
        let n = usize::from(self.params.digits());
        if digits.len() > n {
            return Err(M1fpError::PlaintextTooLong(digits.len()));
        }
        let padded = format!("{:0>width$}", digits, width = n);
        self.encrypt_lifted(&padded, self.params.digits(), r)
    }

    /// Encrypt a single vote in `[0, 64]` with a fresh randomizer.
    pub fn encrypt_vote(&self, vote: u64) -> M1fpResult<(Ciphertext, Randomizer)> {
        let r = random_scalar(&mut OsRng)?;
        let ct = self.encrypt_vote_with_randomizer(vote, &r)?;
        Ok((ct, r))
    }

    /// Encrypt a single vote in `[0, 64]` with a caller-chosen
    /// randomizer.
    pub fn encrypt_vote_with_randomizer(
        &self,
        vote: u64,
        r: &Randomizer,
    ) -> M1fpResult<Ciphertext> {
        if vote > MAX_VOTE {
            return Err(M1fpError::VoteOutOfRange(vote));
        }
        let digits = format!("{:0width$}", vote, width = usize::from(self.params.digits()));
        self.encrypt_lifted(&digits, self.params.digits(), r)
    }

    // C1 = (r · XInt) mod D, C2 = (m · 2^(P−w) + r · HInt) mod D.
    // The lift m · 2^(P−w) stays below D because m < 10^w and w ≤ n.
    fn encrypt_lifted(&self, digits: &str, width: u16, r: &Randomizer) -> M1fpResult<Ciphertext> {
        let m = codec::digits_to_int(digits)?;
        let lifted = &m * &self.params.scale_for(width);
        let c1 = r.modmul(&self.x_int, &self.d);
        let c2 = lifted.modadd(&r.modmul(&self.h_int, &self.d), &self.d);
        Ok(Ciphertext {
            c1,
            c2,
            d: self.d.clone(),
            digits: width,
        })
    }

    /// Get this key's byte representation: a length-prefixed binary
    /// blob `P | n | len(XInt) | len(HInt) | XInt | HInt` with the
    /// integers as minimal big-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let x = minimal_bytes(&self.x_int);
        let h = minimal_bytes(&self.h_int);
        let mut out = Vec::with_capacity(BLOB_HEADER + x.len() + h.len());
        out.extend_from_slice(&self.params.precision().to_be_bytes());
        out.extend_from_slice(&self.params.digits().to_be_bytes());
        out.extend_from_slice(&(x.len() as u32).to_be_bytes());
        out.extend_from_slice(&(h.len() as u32).to_be_bytes());
        out.extend_from_slice(&x);
        out.extend_from_slice(&h);
        out
    }

    /// Convert a byte representation to an encryption key. The
    /// denominator is recomputed from `(P, n)`, never trusted from the
    /// wire.
    pub fn from_bytes<B: AsRef<[u8]>>(data: B) -> M1fpResult<Self> {
        let data = data.as_ref();
        if data.len() < BLOB_HEADER {
            return Err(M1fpError::MalformedKeyBlob);
        }
        let prec = u16::from_be_bytes(data[0..2].try_into().expect("two bytes"));
        let digits = u16::from_be_bytes(data[2..4].try_into().expect("two bytes"));
        let len_x = u32::from_be_bytes(data[4..8].try_into().expect("four bytes")) as usize;
        let len_h = u32::from_be_bytes(data[8..12].try_into().expect("four bytes")) as usize;
        if data
            .len()
            .checked_sub(BLOB_HEADER)
            .map(|body| body != len_x.saturating_add(len_h))
            .unwrap_or(true)
        {
            return Err(M1fpError::MalformedKeyBlob);
        }
        let xb = &data[BLOB_HEADER..BLOB_HEADER + len_x];
        let hb = &data[BLOB_HEADER + len_x..];
        // minimal encoding carries no leading zero
        if xb.first() == Some(&0) || hb.first() == Some(&0) {
            return Err(M1fpError::MalformedKeyBlob);
        }
        let params = DomainParams::new(prec, digits)?;
        Self::from_parts(params, BigNumber::from_slice(xb), BigNumber::from_slice(hb))
    }

    /// The domain parameters `(P, n)`.
    pub fn params(&self) -> DomainParams {
        self.params
    }

    /// The lifted irrational `XInt = ⌊x · D⌋`.
    pub fn x_int(&self) -> &BigNumber {
        &self.x_int
    }

    /// The lifted mask `HInt = ⌊((a·x) mod 1) · D⌋`.
    pub fn h_int(&self) -> &BigNumber {
        &self.h_int
    }

    /// The common denominator `D = 2^P · 5^n`.
    pub fn denominator(&self) -> &BigNumber {
        &self.d
    }
}

fn minimal_bytes(n: &BigNumber) -> Vec<u8> {
    let raw = n.to_bytes();
    let start = raw.iter().position(|&b| b != 0).unwrap_or(raw.len());
    raw[start..].to_vec()
}
