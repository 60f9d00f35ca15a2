//! Bijection between non-negative integers and n-ary tree shapes.
//!
//! A shape is a tree topology whose inner nodes take their arity from the
//! sorted arity sequence `K` of the registry, and whose leaves are
//! placeholders. Shapes are rendered as strings: `..` is a leaf, `[` and `]`
//! delimit the children of an inner node, and `,` separates siblings.
//!
//! # Indexing
//!
//! With `k = |K|`:
//!
//! - `0` is the single leaf `..`.
//! - `1..=k` are one-level trees whose root has arity `K[i - 1]`.
//! - Any larger `i` is split as `e = (i - 1) / k`, `j = (i - 1) % k`. The
//!   root has arity `m = K[j]`, and `e` is written in base `m` and
//!   [deinterleaved][crate::digits::deinterleave] into the `m` child indices.
//!   For `m = 1` the only child is `e` itself.
//!
//! Every shape over `K` gets exactly one index, and [rank_shape] computes it
//! back from a rendered string.
//!
//! ```
//! use treenum::shape::{rank_shape, shape_string};
//!
//! let arities = [1, 2];
//! assert_eq!(shape_string(0, &arities).unwrap(), "..");
//! assert_eq!(shape_string(2, &arities).unwrap(), "[..,..]");
//! assert_eq!(rank_shape("[..,..]", &arities).unwrap(), 2);
//! ```

use crate::digits::{deinterleave, from_base_m, interleave, to_base_m};
use crate::error::{EnumError, Result};

/// Leaf placeholder.
pub const LEAF: &str = "..";

/// One level of the index-to-shape decomposition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Decomposition {
    Leaf,
    Node {
        /// Position of the root's arity in `K`.
        bucket: usize,
        arity: usize,
        /// Shape indices of the children, left to right.
        children: Vec<u64>,
    },
}

impl Decomposition {
    pub fn children(&self) -> &[u64] {
        match self {
            Decomposition::Leaf => &[],
            Decomposition::Node { children, .. } => children,
        }
    }
}

/// Splits shape index `i` into its root arity and child indices.
pub fn decompose(i: u64, arities: &[usize]) -> Result<Decomposition> {
    if i == 0 {
        return Ok(Decomposition::Leaf);
    }
    let k = arities.len() as u64;
    if k == 0 {
        return Err(EnumError::UnknownPrimitives(i));
    }

    let e = (i - 1) / k;
    let bucket = ((i - 1) % k) as usize;
    let arity = arities[bucket];

    let children = match arity {
        0 => {
            return Err(EnumError::InternalConsistency(format!(
                "arity bucket {} holds arity 0",
                bucket
            )))
        }
        // For i <= k this is e = 0, so every child is a leaf.
        1 => vec![e],
        m => deinterleave(&to_base_m(e, m)?, m)
            .iter()
            .map(|digits| {
                from_base_m(digits, m).ok_or_else(|| {
                    EnumError::InternalConsistency(format!("child of shape {} overflows", i))
                })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(Decomposition::Node {
        bucket,
        arity,
        children,
    })
}

/// Renders shape `i` with placeholder leaves.
///
/// Rendering keeps its own stack of pending work, so long unary chains
/// (whose depth is linear in `i`) do not exhaust the thread stack.
pub fn shape_string(i: u64, arities: &[usize]) -> Result<String> {
    enum Pending {
        Shape(u64),
        Text(char),
    }

    let mut out = String::new();
    let mut stack = vec![Pending::Shape(i)];
    while let Some(item) = stack.pop() {
        match item {
            Pending::Text(c) => out.push(c),
            Pending::Shape(j) => match decompose(j, arities)? {
                Decomposition::Leaf => out.push_str(LEAF),
                Decomposition::Node { children, .. } => {
                    out.push('[');
                    stack.push(Pending::Text(']'));
                    for (pos, &child) in children.iter().enumerate().rev() {
                        stack.push(Pending::Shape(child));
                        if pos > 0 {
                            stack.push(Pending::Text(','));
                        }
                    }
                }
            },
        }
    }
    Ok(out)
}

/// Computes the index of a rendered shape. Inverse of [shape_string].
pub fn rank_shape(shape: &str, arities: &[usize]) -> Result<u64> {
    let parser = ShapeParser {
        shape,
        bytes: shape.as_bytes(),
        pos: 0,
        arities,
    };
    parser.parse()
}

struct ShapeParser<'a> {
    shape: &'a str,
    bytes: &'a [u8],
    pos: usize,
    arities: &'a [usize],
}

impl ShapeParser<'_> {
    fn error(&self, reason: impl Into<String>) -> EnumError {
        EnumError::malformed(self.shape, reason)
    }

    /// Shift-reduce over the brackets; `open` holds the children ranked so
    /// far for every unclosed `[`.
    fn parse(mut self) -> Result<u64> {
        let mut open: Vec<Vec<u64>> = Vec::new();
        loop {
            // A node starts here.
            let mut index = if self.bytes[self.pos..].starts_with(LEAF.as_bytes()) {
                self.pos += LEAF.len();
                0
            } else if self.bytes.get(self.pos) == Some(&b'[') {
                self.pos += 1;
                open.push(Vec::new());
                continue;
            } else {
                return Err(self.error(format!("expected '..' or '[' at byte {}", self.pos)));
            };

            // A node just ended: attach it, closing every `]` that follows.
            loop {
                let Some(children) = open.last_mut() else {
                    if self.pos != self.bytes.len() {
                        return Err(self.error(format!("trailing input at byte {}", self.pos)));
                    }
                    return Ok(index);
                };
                children.push(index);
                match self.bytes.get(self.pos) {
                    Some(b',') => {
                        self.pos += 1;
                        break;
                    }
                    Some(b']') => {
                        self.pos += 1;
                        let children = open.pop().unwrap_or_default();
                        index = self.rank_node(&children)?;
                    }
                    _ => return Err(self.error(format!("expected ',' or ']' at byte {}", self.pos))),
                }
            }
        }
    }

    fn rank_node(&self, children: &[u64]) -> Result<u64> {
        let arity = children.len();
        let bucket = self
            .arities
            .iter()
            .position(|&a| a == arity)
            .ok_or_else(|| self.error(format!("no operators of arity {}", arity)))?;

        let e = if arity == 1 {
            Some(children[0])
        } else {
            interleave(children, arity)
        };
        let k = self.arities.len() as u64;
        e.and_then(|e| e.checked_mul(k))
            .and_then(|x| x.checked_add(1 + bucket as u64))
            .ok_or_else(|| self.error("index does not fit in 64 bits"))
    }
}

/// Returns the arity of the operator opened by the `[` at byte `start`.
///
/// The arity is one more than the number of `,` at nesting depth 1 before
/// the matching `]`.
pub fn arity_of_term(shape: &str, start: usize) -> Result<usize> {
    let bytes = shape.as_bytes();
    if bytes.get(start) != Some(&b'[') {
        return Err(EnumError::malformed(
            shape,
            format!("byte {} is not an opening bracket", start),
        ));
    }

    let mut depth = 0usize;
    let mut arity = 1;
    for &c in &bytes[start..] {
        match c {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(arity);
                }
            }
            b',' if depth == 1 => arity += 1,
            _ => {}
        }
    }
    Err(EnumError::malformed(
        shape,
        format!("bracket at byte {} is never closed", start),
    ))
}

/// Arities of every operator in a shape string, in order of their `[`.
///
/// This is [arity_of_term] for all brackets at once, in a single pass.
pub fn term_arities(shape: &str) -> Result<Vec<usize>> {
    let mut arities = Vec::new();
    let mut open = Vec::new();
    for (pos, c) in shape.bytes().enumerate() {
        match c {
            b'[' => {
                open.push(arities.len());
                arities.push(1);
            }
            b',' => match open.last() {
                Some(&term) => arities[term] += 1,
                None => {
                    return Err(EnumError::malformed(
                        shape,
                        format!("separator at byte {} outside brackets", pos),
                    ))
                }
            },
            b']' => {
                if open.pop().is_none() {
                    return Err(EnumError::malformed(shape, format!("unmatched ']' at byte {}", pos)));
                }
            }
            _ => {}
        }
    }
    if !open.is_empty() {
        return Err(EnumError::malformed(shape, format!("{} brackets are never closed", open.len())));
    }
    Ok(arities)
}

/// Number of leaf placeholders in a shape string.
pub fn count_leaves(shape: &str) -> usize {
    shape.matches(LEAF).count()
}

/// Number of inner nodes in a shape string.
pub fn count_operators(shape: &str) -> usize {
    shape.bytes().filter(|&c| c == b'[').count()
}

/// Total number of nodes (operators and leaves) in a shape string.
pub fn count_nodes(shape: &str) -> usize {
    count_operators(shape) + count_leaves(shape)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_log::test;

    use super::*;

    const ARITIES: [usize; 3] = [1, 2, 3];

    #[test]
    fn test_leaf() {
        assert_eq!(shape_string(0, &ARITIES).unwrap(), "..");
    }

    #[test]
    fn test_one_level() {
        assert_eq!(shape_string(1, &ARITIES).unwrap(), "[..]");
        assert_eq!(shape_string(2, &ARITIES).unwrap(), "[..,..]");
        assert_eq!(shape_string(3, &ARITIES).unwrap(), "[..,..,..]");
    }

    #[test]
    fn test_nested() {
        // e = 1, unary root
        assert_eq!(shape_string(4, &ARITIES).unwrap(), "[[..]]");
        // e = 1 = [0, 1] in base 2
        assert_eq!(shape_string(5, &ARITIES).unwrap(), "[..,[..]]");
        // e = 3 = [1, 1] in base 2
        assert_eq!(shape_string(11, &ARITIES).unwrap(), "[[..],[..]]");
    }

    #[test]
    fn test_decompose() {
        assert_eq!(decompose(0, &ARITIES).unwrap(), Decomposition::Leaf);
        assert_eq!(
            decompose(3, &ARITIES).unwrap(),
            Decomposition::Node {
                bucket: 2,
                arity: 3,
                children: vec![0, 0, 0]
            }
        );
        assert_eq!(decompose(11, &ARITIES).unwrap().children(), &[1, 1]);
    }

    #[test]
    fn test_no_operators() {
        assert_eq!(shape_string(0, &[]).unwrap(), "..");
        assert_eq!(shape_string(1, &[]), Err(EnumError::UnknownPrimitives(1)));
    }

    #[test]
    fn test_unique_shapes() {
        for arities in [&[1, 2, 3][..], &[2][..], &[1][..], &[2, 5][..]] {
            let shapes: HashSet<String> = (0..500).map(|i| shape_string(i, arities).unwrap()).collect();
            assert_eq!(shapes.len(), 500, "arities = {:?}", arities);
        }
    }

    #[test]
    fn test_rank_inverts_shape_string() {
        for arities in [&[1, 2, 3][..], &[2][..], &[1, 4][..]] {
            for i in 0..1000 {
                let shape = shape_string(i, arities).unwrap();
                assert_eq!(rank_shape(&shape, arities).unwrap(), i, "shape = {}", shape);
            }
        }
    }

    #[test]
    fn test_rank_arbitrary_shape() {
        let shape = "[[..,..,..],[[..]]]";
        let i = rank_shape(shape, &ARITIES).unwrap();
        assert_eq!(shape_string(i, &ARITIES).unwrap(), shape);
    }

    #[test]
    fn test_rank_malformed() {
        assert!(matches!(rank_shape("[..", &ARITIES), Err(EnumError::MalformedShape { .. })));
        assert!(matches!(rank_shape("..,..", &ARITIES), Err(EnumError::MalformedShape { .. })));
        assert!(matches!(rank_shape("[]", &ARITIES), Err(EnumError::MalformedShape { .. })));
        // arity 4 is not registered
        assert!(matches!(rank_shape("[..,..,..,..]", &ARITIES), Err(EnumError::MalformedShape { .. })));
    }

    #[test]
    fn test_arity_of_term() {
        let shape = "[[..,..],..,[..]]";
        assert_eq!(arity_of_term(shape, 0).unwrap(), 3);
        assert_eq!(arity_of_term(shape, 1).unwrap(), 2);
        assert_eq!(arity_of_term(shape, 12).unwrap(), 1);
        assert!(arity_of_term(shape, 2).is_err());
        assert!(arity_of_term("[..,..", 0).is_err());
    }

    #[test]
    fn test_term_arities() {
        assert_eq!(term_arities("[[..,..],..,[..]]").unwrap(), vec![3, 2, 1]);
        assert_eq!(term_arities("..").unwrap(), Vec::<usize>::new());
        assert!(term_arities("[..,..").is_err());
        assert!(term_arities("..]").is_err());
        assert!(term_arities("..,..").is_err());
    }

    #[test]
    fn test_deep_unary_chain() {
        let depth = 200_000;
        let shape = shape_string(depth, &[1]).unwrap();
        assert_eq!(shape.len(), 2 * depth as usize + LEAF.len());
        assert!(shape.starts_with("[[[") && shape.ends_with("..]]]"));
        assert_eq!(count_operators(&shape), depth as usize);
        assert_eq!(rank_shape(&shape, &[1]).unwrap(), depth);
        assert_eq!(term_arities(&shape).unwrap().len(), depth as usize);
    }

    #[test]
    fn test_deeply_unclosed_input() {
        let shape = "[".repeat(500_000);
        assert!(matches!(rank_shape(&shape, &ARITIES), Err(EnumError::MalformedShape { .. })));
    }

    #[test]
    fn test_counts() {
        let shape = "[[..,..],..,[..]]";
        assert_eq!(count_leaves(shape), 4);
        assert_eq!(count_operators(shape), 3);
        assert_eq!(count_nodes(shape), 7);
    }
}
