//! Exhaustive enumeration of every equation among the first `n` shapes.
//!
//! # Example
//!
//! ```
//! use treenum::enumerator::Enumerator;
//! use treenum::primitives::PrimitiveSet;
//!
//! let mut pset = PrimitiveSet::new();
//! pset.add_operator("neg", 1).unwrap();
//! pset.add_variable("x");
//! pset.add_variable("y");
//! let en = Enumerator::new(pset);
//!
//! let all = en.exhaustive_search(2, 0).unwrap();
//! assert_eq!(all, vec!["x", "y", "neg(x)", "neg(y)"]);
//! ```
//!
//! The number of equations grows combinatorially with `n`, so prefer the
//! lazy [`Enumerator::solutions`] iterator or a `max_count` bound for large
//! search spaces.

use log::debug;
use num_bigint::BigUint;

use crate::enumerator::Enumerator;
use crate::error::Result;
use crate::solution::Solution;

impl Enumerator {
    /// Returns an iterator over all equations with shape index below `n`.
    ///
    /// Order is shape `i` first, then operator configuration `r`, then
    /// terminal configuration `s`.
    pub fn solutions(&self, n: u64) -> Solutions<'_> {
        Solutions::new(self, n)
    }

    /// Collects up to `max_count` equations from [`Enumerator::solutions`].
    ///
    /// `max_count = 0` enumerates everything, `Q(n)` equations in total.
    pub fn exhaustive_search(&self, n: u64, max_count: usize) -> Result<Vec<String>> {
        debug!("exhaustive_search(n = {}, max_count = {})", n, max_count);
        let limit = if max_count == 0 { usize::MAX } else { max_count };
        self.solutions(n).take(limit).map(|s| s.map(|s| s.formula)).collect()
    }
}

/// Counts of the shape currently being enumerated.
#[derive(Debug)]
struct Frame {
    r_i: BigUint,
    s_i: BigUint,
}

/// An iterator over every `(i, r, s)` triple with `i < n`.
///
/// Created by [`Enumerator::solutions()`]. Stops after yielding the first error.
pub struct Solutions<'a> {
    en: &'a Enumerator,
    n: u64,
    i: u64,
    r: BigUint,
    s: BigUint,
    frame: Option<Frame>,
    failed: bool,
}

impl<'a> Solutions<'a> {
    pub fn new(en: &'a Enumerator, n: u64) -> Self {
        Self {
            en,
            n,
            i: 0,
            r: BigUint::ZERO,
            s: BigUint::ZERO,
            frame: None,
            failed: false,
        }
    }

    fn load(&self) -> Result<Frame> {
        Ok(Frame {
            r_i: self.en.count_r(self.i)?,
            s_i: self.en.count_s(self.i)?,
        })
    }
}

impl Iterator for Solutions<'_> {
    type Item = Result<Solution>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed && self.i < self.n {
            let frame = match self.frame.take() {
                Some(frame) => frame,
                None => match self.load() {
                    Ok(frame) => frame,
                    Err(e) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                },
            };

            if self.s >= frame.s_i {
                self.s = BigUint::ZERO;
                self.r += 1u32;
            }
            if self.r >= frame.r_i || frame.s_i == BigUint::ZERO {
                self.r = BigUint::ZERO;
                self.s = BigUint::ZERO;
                self.i += 1;
                continue;
            }

            let item = self.en.solution(self.i, &self.r, &self.s, self.n);
            self.failed = item.is_err();
            self.s += 1u32;
            self.frame = Some(frame);
            return Some(item);
        }
        None
    }
}
