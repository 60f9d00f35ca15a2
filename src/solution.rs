//! Decoding `(i, r, s)` triples into formula strings.
//!
//! The formula grammar is plain prefix-call notation:
//!
//! ```text
//! formula := terminal | operator "(" formula ("," formula)* ")"
//! ```
//!
//! The operator index `r` is split across the arity buckets in row-major
//! order over `(G_i_0, ..., G_i_{k-1})`, and each bucket's digit selects an
//! ordered tuple of operator names for that bucket's slots. The terminal
//! index `s` selects an ordered tuple of terminal names for the leaves.
//! While the shape string is walked left to right, each bucket tuple and the
//! terminal tuple are consumed from the back.

use std::fmt;

use log::debug;
use num_bigint::BigUint;

use crate::enumerator::Enumerator;
use crate::error::{EnumError, IndexKind, Result};
use crate::shape::{self, LEAF};
use crate::unrank::{select, unravel};

/// A decoded equation together with the indices that produced it.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Solution {
    /// Shape index `i`.
    pub shape: u64,
    /// Operator configuration index `r`.
    pub operators: BigUint,
    /// Terminal configuration index `s`.
    pub terminals: BigUint,
    pub formula: String,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formula)
    }
}

impl Enumerator {
    /// Decodes shape `i`, operator configuration `r` and terminal
    /// configuration `s` into a formula string.
    ///
    /// Requires `i <= n`, `r < R_i` and `s < S_i`; anything else is an
    /// [`EnumError::InvalidIndex`].
    ///
    /// # Examples
    ///
    /// ```
    /// use num_bigint::BigUint;
    /// use treenum::enumerator::Enumerator;
    /// use treenum::primitives::PrimitiveSet;
    ///
    /// let mut pset = PrimitiveSet::new();
    /// pset.add_operator("add", 2).unwrap();
    /// pset.add_operator("mul", 1).unwrap();
    /// pset.add_variable("x");
    /// pset.add_variable("y");
    /// let en = Enumerator::new(pset);
    ///
    /// let zero = BigUint::ZERO;
    /// assert_eq!(en.decode(2, &zero, &zero, 10).unwrap(), "add(x,x)");
    /// ```
    pub fn decode(&self, i: u64, r: &BigUint, s: &BigUint, n: u64) -> Result<String> {
        debug!("decode(i = {}, r = {}, s = {}, n = {})", i, r, s, n);

        if i > n {
            return Err(EnumError::invalid_index(IndexKind::Shape, i, BigUint::from(n) + 1u32));
        }
        let r_i = self.count_r(i)?;
        if *r >= r_i {
            return Err(EnumError::invalid_index(IndexKind::Operator, r.clone(), r_i));
        }
        let s_i = self.count_s(i)?;
        if *s >= s_i {
            return Err(EnumError::invalid_index(IndexKind::Terminal, s.clone(), s_i));
        }

        let tree = self.shape_string(i)?;

        let digits = unravel(r, &self.all_g_i_b(i)?)?;
        let mut operators = Vec::with_capacity(self.num_buckets());
        for (b, z) in digits.iter().enumerate() {
            let pool = self.primitives().operators(self.arities()[b]);
            operators.push(select(pool, self.calculate_l_i_b(i, b)?, z)?);
        }

        let a_i = self.calculate_a_i(i)?;
        let mut terminals = select(&self.primitives().terminals(), a_i, s)?;

        let placeholders = shape::count_leaves(&tree);
        if placeholders as u64 != a_i {
            return Err(EnumError::InternalConsistency(format!(
                "shape {} has {} placeholders, expected {}",
                i, placeholders, a_i
            )));
        }

        self.substitute(&tree, &mut operators, &mut terminals)
    }

    /// Like [`Enumerator::decode`], keeping the indices alongside the formula.
    pub fn solution(&self, i: u64, r: &BigUint, s: &BigUint, n: u64) -> Result<Solution> {
        Ok(Solution {
            shape: i,
            operators: r.clone(),
            terminals: s.clone(),
            formula: self.decode(i, r, s, n)?,
        })
    }

    fn substitute(&self, tree: &str, operators: &mut [Vec<String>], terminals: &mut Vec<String>) -> Result<String> {
        let bytes = tree.as_bytes();
        let mut out = String::with_capacity(tree.len() * 2);
        let mut pos = 0;
        let mut term_arities = shape::term_arities(tree)?.into_iter();

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    let arity = term_arities
                        .next()
                        .ok_or_else(|| EnumError::malformed(tree, format!("unexpected '[' at {}", pos)))?;
                    let bucket = self.arities().iter().position(|&a| a == arity).ok_or_else(|| {
                        EnumError::InternalConsistency(format!("no arity bucket for arity {}", arity))
                    })?;
                    let name = operators[bucket].pop().ok_or_else(|| {
                        EnumError::InternalConsistency(format!("ran out of operators of arity {}", arity))
                    })?;
                    out.push_str(&name);
                    out.push('(');
                    pos += 1;
                }
                b']' => {
                    out.push(')');
                    pos += 1;
                }
                b',' => {
                    out.push(',');
                    pos += 1;
                }
                _ if bytes[pos..].starts_with(LEAF.as_bytes()) => {
                    let name = terminals
                        .pop()
                        .ok_or_else(|| EnumError::InternalConsistency("ran out of terminals".to_string()))?;
                    out.push_str(&name);
                    pos += LEAF.len();
                }
                _ => return Err(EnumError::malformed(tree, format!("unexpected byte at {}", pos))),
            }
        }

        if !terminals.is_empty() || operators.iter().any(|ops| !ops.is_empty()) {
            return Err(EnumError::InternalConsistency(format!(
                "unused slots after decoding '{}'",
                tree
            )));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_log::test;

    use super::*;
    use crate::primitives::PrimitiveSet;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    fn small() -> Enumerator {
        let mut pset = PrimitiveSet::new();
        pset.add_operator("add", 2).unwrap();
        pset.add_operator("mul", 1).unwrap();
        pset.add_variable("x");
        pset.add_variable("y");
        Enumerator::new(pset)
    }

    fn mixed() -> Enumerator {
        let mut pset = PrimitiveSet::new();
        pset.add_operator("add", 2).unwrap();
        pset.add_operator("sub", 2).unwrap();
        pset.add_operator("neg", 1).unwrap();
        pset.add_operator("exp", 1).unwrap();
        pset.add_operator("fma", 3).unwrap();
        pset.add_fitting_parameter("c");
        pset.add_variable("x");
        Enumerator::new(pset)
    }

    #[test]
    fn test_decode_leaf() {
        let en = small();
        assert_eq!(en.decode(0, &big(0), &big(0), 10).unwrap(), "x");
        assert_eq!(en.decode(0, &big(0), &big(1), 10).unwrap(), "y");
    }

    #[test]
    fn test_decode_one_level() {
        let en = small();
        assert_eq!(en.decode(1, &big(0), &big(0), 10).unwrap(), "mul(x)");
        assert_eq!(en.decode(2, &big(0), &big(0), 10).unwrap(), "add(x,x)");
        // Terminals are consumed from the back of the selected tuple.
        assert_eq!(en.decode(2, &big(0), &big(1), 10).unwrap(), "add(y,x)");
        assert_eq!(en.decode(2, &big(0), &big(2), 10).unwrap(), "add(x,y)");
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        let en = small();
        let r_i = en.count_r(2).unwrap();
        assert_eq!(
            en.decode(2, &r_i, &big(0), 10),
            Err(EnumError::InvalidIndex {
                kind: IndexKind::Operator,
                index: big(1),
                bound: big(1)
            })
        );
        let s_i = en.count_s(2).unwrap();
        assert!(matches!(
            en.decode(2, &big(0), &s_i, 10),
            Err(EnumError::InvalidIndex {
                kind: IndexKind::Terminal,
                ..
            })
        ));
        assert!(matches!(
            en.decode(11, &big(0), &big(0), 10),
            Err(EnumError::InvalidIndex {
                kind: IndexKind::Shape,
                ..
            })
        ));
    }

    #[test]
    fn test_operator_configs_are_distinct() {
        let en = mixed();
        for i in 0..200 {
            let r_i = en.count_r(i).unwrap();
            let r_max = u64::try_from(&r_i).unwrap();
            let formulas: HashSet<String> = (0..r_max).map(|r| en.decode(i, &big(r), &big(0), 200).unwrap()).collect();
            assert_eq!(formulas.len() as u64, r_max, "shape {}", i);
        }
    }

    #[test]
    fn test_terminal_configs_are_distinct() {
        let en = mixed();
        for i in 0..100 {
            let s_max = u64::try_from(&en.count_s(i).unwrap()).unwrap();
            let formulas: HashSet<String> = (0..s_max).map(|s| en.decode(i, &big(0), &big(s), 100).unwrap()).collect();
            assert_eq!(formulas.len() as u64, s_max, "shape {}", i);
        }
    }

    #[test]
    fn test_mixed_buckets_use_every_operator() {
        let en = mixed();
        // One binary and one unary slot: 2 * 2 configurations.
        let i = en.rank_shape("[..,[..]]").unwrap();
        assert_eq!(en.count_r(i).unwrap(), big(4));
        let formulas: Vec<String> = (0..4).map(|r| en.decode(i, &big(r), &big(0), i).unwrap()).collect();
        assert_eq!(formulas, vec!["add(c,neg(c))", "sub(c,neg(c))", "add(c,exp(c))", "sub(c,exp(c))"]);
    }

    #[test]
    fn test_formula_counts() {
        let en = mixed();
        for i in 0..200 {
            let formula = en.decode(i, &big(0), &big(0), 200).unwrap();
            let leaves = formula.matches('c').count();
            assert_eq!(leaves as u64, en.calculate_a_i(i).unwrap());
            let slots: u64 = (0..en.num_buckets()).map(|b| en.calculate_l_i_b(i, b).unwrap()).sum();
            assert_eq!(formula.matches('(').count() as u64, slots);
        }
    }

    #[test]
    fn test_solution_display() {
        let en = small();
        let solution = en.solution(3, &big(0), &big(1), 10).unwrap();
        assert_eq!(solution.shape, 3);
        assert_eq!(solution.to_string(), "mul(mul(y))");
    }
}
