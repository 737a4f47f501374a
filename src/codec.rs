//! Decimal-digit codec for plaintexts. Every byte maps to a three-digit
//! group, so a `k`-byte message occupies `3k` digit positions of the
//! numeric plaintext space.

use crate::{M1fpError, M1fpResult};
use unknown_order::BigNumber;

/// Encode a byte string as concatenated three-digit decimal groups,
/// e.g. `b"A"` becomes `"065"`.
pub fn bytes_to_digits(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for b in bytes {
        out.push_str(&format!("{:03}", b));
    }
    out
}

/// Decode three-digit decimal groups back to bytes. The length must be
/// divisible by three and every group must be below 256.
pub fn digits_to_bytes(digits: &str) -> M1fpResult<Vec<u8>> {
    let raw = digits.as_bytes();
    if raw.len() % 3 != 0 {
        return Err(M1fpError::MalformedPlaintext);
    }
    let mut out = Vec::with_capacity(raw.len() / 3);
    for group in raw.chunks(3) {
        let mut v = 0u16;
        for &c in group {
            if !c.is_ascii_digit() {
                return Err(M1fpError::MalformedPlaintext);
            }
            v = v * 10 + u16::from(c - b'0');
        }
        if v > 255 {
            return Err(M1fpError::MalformedPlaintext);
        }
        out.push(v as u8);
    }
    Ok(out)
}

// Fold an ASCII digit string into an exact integer.
pub(crate) fn digits_to_int(digits: &str) -> M1fpResult<BigNumber> {
    let ten = BigNumber::from(10u8);
    let mut acc = BigNumber::zero();
    for c in digits.bytes() {
        if !c.is_ascii_digit() {
            return Err(M1fpError::MalformedPlaintext);
        }
        acc = &acc * &ten;
        acc = &acc + &BigNumber::from(c - b'0');
    }
    Ok(acc)
}

// Format a non-negative integer as a zero-padded decimal string of the
// given width. Callers reduce the value below 10^width first.
pub(crate) fn int_to_digits(value: &BigNumber, width: usize) -> String {
    let ten = BigNumber::from(10u8);
    let mut digits = vec![b'0'; width];
    let mut rest = value.clone();
    for slot in digits.iter_mut().rev() {
        if rest.is_zero() {
            break;
        }
        let rem = &rest % &ten;
        *slot = b'0' + low_byte(&rem);
        rest = &rest / &ten;
    }
    String::from_utf8(digits).expect("digit string is ascii")
}

// Parse a digit string as u64, rejecting overflow.
pub(crate) fn digits_to_u64(digits: &str) -> M1fpResult<u64> {
    let mut acc = 0u64;
    for c in digits.bytes() {
        if !c.is_ascii_digit() {
            return Err(M1fpError::MalformedPlaintext);
        }
        acc = acc
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(c - b'0')))
            .ok_or(M1fpError::MalformedPlaintext)?;
    }
    Ok(acc)
}

fn low_byte(n: &BigNumber) -> u8 {
    n.to_bytes().last().copied().unwrap_or(0)
}
