//! Positional digit manipulation used by the shape bijection.
//!
//! Digit sequences are most-significant first. A shape index `e` written in
//! base `m` is split into `m` child indices by [deinterleave], and
//! [interleave] is its inverse.

use crate::error::{EnumError, Result};

/// Writes `v` in base `m`, most-significant digit first.
///
/// Zero is written as `[0]`. Base 1 is the tally form, `v` ones; the shape
/// bijection never needs it, since a unary root's child index is `e` itself.
pub fn to_base_m(mut v: u64, m: usize) -> Result<Vec<u64>> {
    if m == 0 {
        return Err(EnumError::InternalConsistency("base 0 has no digits".to_string()));
    }
    if v == 0 {
        return Ok(vec![0]);
    }
    if m == 1 {
        return Ok(vec![1; v as usize]);
    }
    let m = m as u64;
    let mut digits = Vec::new();
    while v != 0 {
        digits.push(v % m);
        v /= m;
    }
    digits.reverse();
    Ok(digits)
}

/// Interprets `digits` (most-significant first) in base `m`.
///
/// Returns `None` if the value does not fit in a `u64`.
pub fn from_base_m(digits: &[u64], m: usize) -> Option<u64> {
    let m = m as u64;
    digits
        .iter()
        .try_fold(0u64, |acc, &d| acc.checked_mul(m)?.checked_add(d))
}

/// Splits a digit sequence into `m` sub-sequences.
///
/// The sequence is left-padded with zeros to a multiple of `m`; sub-sequence
/// `j` then receives the digits at positions `j, j + m, j + 2m, ...`.
pub fn deinterleave(digits: &[u64], m: usize) -> Vec<Vec<u64>> {
    assert!(m > 0, "cannot deinterleave into zero parts");
    let pad = (m - digits.len() % m) % m;
    let padded: Vec<u64> = std::iter::repeat(0).take(pad).chain(digits.iter().copied()).collect();

    let mut parts = vec![Vec::with_capacity(padded.len() / m); m];
    for group in padded.chunks(m) {
        for (part, &d) in parts.iter_mut().zip(group) {
            part.push(d);
        }
    }
    parts
}

/// Merges `m = values.len()` numbers into one, inverting
/// `deinterleave(to_base_m(e, m), m)` followed by [from_base_m].
///
/// Returns `None` on `u64` overflow.
pub fn interleave(values: &[u64], m: usize) -> Option<u64> {
    debug_assert_eq!(values.len(), m);
    let parts: Vec<Vec<u64>> = values.iter().map(|&v| to_base_m(v, m).ok()).collect::<Option<_>>()?;
    let width = parts.iter().map(Vec::len).max().unwrap_or(0);

    let mut digits = Vec::with_capacity(width * m);
    for t in 0..width {
        for part in &parts {
            let offset = width - part.len();
            digits.push(if t < offset { 0 } else { part[t - offset] });
        }
    }
    from_base_m(&digits, m)
}
