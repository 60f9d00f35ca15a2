//! Mixed-radix unranking of cartesian products.
//!
//! An index `z ∈ [0, |pool|^r)` names one ordered `r`-tuple of pool elements
//! drawn with replacement: `z` is read as `r` base-`|pool|` digits, most
//! significant first, and digit `t` picks the element in slot `t`. This is
//! the order in which nested loops (or `itertools::iproduct!`) visit the
//! product.

use num_bigint::BigUint;

use crate::error::{EnumError, Result};

/// `base ^ exp` as a big integer. `0 ^ 0 = 1`.
pub fn pow(base: usize, mut exp: u64) -> BigUint {
    if base.is_power_of_two() {
        return BigUint::from(1u32) << (u64::from(base.trailing_zeros()) * exp);
    }
    let mut result = BigUint::from(1u32);
    let mut square = BigUint::from(base);
    while exp > 0 {
        if exp & 1 == 1 {
            result *= &square;
        }
        exp >>= 1;
        if exp > 0 {
            square = &square * &square;
        }
    }
    result
}

/// Returns the `index`-th element of `pool × pool × ... × pool` (`repeat` times).
///
/// An empty pool, or `repeat = 0` with `index = 0`, yields an empty tuple.
/// Any other `index >= |pool|^repeat` is a [`EnumError::RangeOverflow`].
pub fn select<T: Clone>(pool: &[T], repeat: u64, index: &BigUint) -> Result<Vec<T>> {
    if pool.is_empty() {
        return Ok(Vec::new());
    }
    let size = pow(pool.len(), repeat);
    if *index >= size {
        return Err(EnumError::RangeOverflow {
            index: index.clone(),
            size,
        });
    }

    // Peel off as many digits per big-integer division as fit in a u64.
    let radix = pool.len() as u64;
    let (per_chunk, chunk) = if radix == 1 {
        (u32::MAX, BigUint::from(1u32))
    } else {
        let per_chunk = u64::MAX.ilog(radix);
        (per_chunk, BigUint::from(radix.pow(per_chunk)))
    };

    let mut rest = index.clone();
    let mut picks = Vec::with_capacity(repeat as usize);
    while (picks.len() as u64) < repeat {
        let mut low = u64::try_from(&(&rest % &chunk))
            .map_err(|_| EnumError::InternalConsistency(format!("digit chunk of {} exceeds u64", index)))?;
        rest /= &chunk;
        for _ in 0..per_chunk {
            if picks.len() as u64 == repeat {
                break;
            }
            picks.push(pool[(low % radix) as usize].clone());
            low /= radix;
        }
    }
    // Digits come out least significant first.
    picks.reverse();
    Ok(picks)
}

/// Splits `index` into one digit per radix, last radix varying fastest.
///
/// This is the row-major (C order) flattening of an array whose dimensions
/// are `radices`.
pub fn unravel(index: &BigUint, radices: &[BigUint]) -> Result<Vec<BigUint>> {
    let size: BigUint = radices.iter().product();
    if *index >= size {
        return Err(EnumError::RangeOverflow {
            index: index.clone(),
            size,
        });
    }

    let mut rest = index.clone();
    let mut digits = vec![BigUint::ZERO; radices.len()];
    for (digit, radix) in digits.iter_mut().zip(radices).rev() {
        *digit = &rest % radix;
        rest /= radix;
    }
    Ok(digits)
}
