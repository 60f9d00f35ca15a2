//! # treenum: enumerating n-ary expression trees
//!
//! **`treenum`** assigns a unique, deterministic integer to every distinct
//! expression tree that can be built from a fixed set of operators (each with
//! a declared arity) and terminals, and maps integers back to concrete
//! formulas. It is meant for symbolic-regression style search, where either
//! every candidate up to some complexity bound is tried, or candidates are
//! sampled at random.
//!
//! ## How equations are indexed
//!
//! An equation is named by a triple `(i, r, s)`:
//!
//! - `i` is a **shape**: a tree topology with placeholder leaves. Shapes are
//!   in bijection with the non-negative integers (see [`shape`]).
//! - `r ∈ [0, R_i)` picks an operator name for every inner node.
//! - `s ∈ [0, S_i)` picks a terminal name for every leaf.
//!
//! Shape `i` thus stands for `R_i * S_i` distinct equations. The counts are
//! computed bottom-up over the decomposition and memoized in the
//! [`Enumerator`][crate::enumerator::Enumerator] (see [`enumerator`]), as
//! arbitrary-precision integers.
//!
//! ## Search modes
//!
//! - **Exhaustive**: [`exhaustive_search`][crate::enumerator::Enumerator::exhaustive_search]
//!   walks every triple with `i < n`.
//! - **Random**: [`random_search`][crate::enumerator::Enumerator::random_search]
//!   draws `i` with probability proportional to `R_i * S_i`, so every
//!   concrete equation is equally likely, not every shape.
//!
//! ## Basic Usage
//!
//! ```rust
//! use num_bigint::BigUint;
//! use treenum::enumerator::Enumerator;
//! use treenum::primitives::PrimitiveSet;
//! use treenum::sampler::SamplerConfig;
//!
//! let mut pset = PrimitiveSet::new();
//! pset.add_operator("add", 2).unwrap();
//! pset.add_operator("mul", 1).unwrap();
//! pset.add_variable("x");
//! pset.add_variable("y");
//!
//! let en = Enumerator::new(pset);
//!
//! // Shape 2 is a single binary node.
//! assert_eq!(en.shape_string(2).unwrap(), "[..,..]");
//! let zero = BigUint::ZERO;
//! assert_eq!(en.decode(2, &zero, &zero, 10).unwrap(), "add(x,x)");
//!
//! // Ten reproducible samples from the first 1000 shapes.
//! let config = SamplerConfig::new().with_seed(42);
//! let formulas = en.random_search(1000, 10, &config).unwrap();
//! assert_eq!(formulas.len(), 10);
//! ```
//!
//! ## Core Components
//!
//! - **[`shape`]**: the integer-to-shape bijection and its inverse.
//! - **[`enumerator`]**: the memoized counts `a_i`, `l_i_b`, `G_i_b`, `R_i`, `S_i`.
//! - **[`unrank`]**: mixed-radix unranking of operator and terminal tuples.
//! - **[`solution`]**: decoding `(i, r, s)` into a formula string.
//! - **[`sampler`]** and **[`exhaustive`]**: the two search modes.

pub mod digits;
pub mod enumerator;
pub mod error;
pub mod exhaustive;
pub mod memo;
pub mod primitives;
pub mod sampler;
pub mod shape;
pub mod solution;
pub mod unrank;

pub use enumerator::Enumerator;
pub use error::{EnumError, Result};
pub use primitives::PrimitiveSet;
pub use solution::Solution;
