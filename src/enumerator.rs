//! The enumerator and its memoized counting functions.
//!
//! For a shape index `i` and an arity bucket `b` (an index into the sorted
//! arity sequence `K`):
//!
//! | Count     | Meaning                                                  |
//! |-----------|----------------------------------------------------------|
//! | `a_i`     | number of leaf slots                                     |
//! | `l_i_b`   | number of operator slots of arity `K[b]`                 |
//! | `G_i_b`   | `f_b ^ l_i_b`, ways to fill those slots (`f_b` operators) |
//! | `R_i`     | `Π_b G_i_b`, ways to fill every operator slot            |
//! | `S_i`     | `t ^ a_i`, ways to fill every leaf slot (`t` terminals)  |
//!
//! Shape `i` therefore stands for exactly `R_i * S_i` distinct equations.
//!
//! The recursive decomposition revisits the same sub-indices over and over,
//! so every count is cached per enumerator. Caches are only dropped when the
//! primitive set is replaced via [`Enumerator::set_primitives`].
//!
//! # Example
//!
//! ```
//! use num_bigint::BigUint;
//! use treenum::enumerator::Enumerator;
//! use treenum::primitives::PrimitiveSet;
//!
//! let mut pset = PrimitiveSet::new();
//! pset.add_operator("add", 2).unwrap();
//! pset.add_operator("mul", 1).unwrap();
//! pset.add_variable("x");
//! pset.add_variable("y");
//!
//! let en = Enumerator::new(pset);
//! assert_eq!(en.shape_string(2).unwrap(), "[..,..]");
//! assert_eq!(en.count_s(2).unwrap(), BigUint::from(4u32));
//! ```

use std::cell::RefCell;
use std::fmt::Debug;
use std::hash::Hash;

use log::trace;
use num_bigint::BigUint;

use crate::error::{EnumError, Result};
use crate::memo::{CacheStats, MemoCache};
use crate::primitives::PrimitiveSet;
use crate::sampler::PrefixTable;
use crate::shape::{self, Decomposition};
use crate::unrank::pow;

/// Enumerator of the equations over one [`PrimitiveSet`].
///
/// It owns the registry, the sorted arity sequence `K`, and the memo tables
/// for every count plus the running sums used by the sampler. All of them
/// live behind [`RefCell`], so methods take `&self`, and an `Enumerator` is
/// `!Sync`: share it across threads by giving each thread its own.
pub struct Enumerator {
    pset: PrimitiveSet,
    arities: Vec<usize>,
    leaf_cache: RefCell<MemoCache<u64, u64>>,
    slot_cache: RefCell<MemoCache<(u64, usize), u64>>,
    config_cache: RefCell<MemoCache<(u64, usize), BigUint>>,
    operator_cache: RefCell<MemoCache<u64, BigUint>>,
    terminal_cache: RefCell<MemoCache<u64, BigUint>>,
    pub(crate) prefix: RefCell<Option<PrefixTable>>,
}

/// Counters of every memo family of an [`Enumerator`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct EnumeratorStats {
    /// `a_i`
    pub leaves: CacheStats,
    /// `l_i_b`
    pub slots: CacheStats,
    /// `G_i_b`
    pub bucket_configs: CacheStats,
    /// `R_i`
    pub operator_configs: CacheStats,
    /// `S_i`
    pub terminal_configs: CacheStats,
}

impl Enumerator {
    pub fn new(pset: PrimitiveSet) -> Self {
        let arities = pset.arities();
        Self {
            pset,
            arities,
            leaf_cache: RefCell::new(MemoCache::new()),
            slot_cache: RefCell::new(MemoCache::new()),
            config_cache: RefCell::new(MemoCache::new()),
            operator_cache: RefCell::new(MemoCache::new()),
            terminal_cache: RefCell::new(MemoCache::new()),
            prefix: RefCell::new(None),
        }
    }
}

impl Debug for Enumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enumerator")
            .field("arities", &self.arities)
            .field("terminals", &self.pset.num_terminals())
            .field("cached_leaves", &self.leaf_cache.borrow().len())
            .finish()
    }
}

impl Enumerator {
    pub fn primitives(&self) -> &PrimitiveSet {
        &self.pset
    }

    /// The sorted arity sequence `K`.
    pub fn arities(&self) -> &[usize] {
        &self.arities
    }

    pub fn num_buckets(&self) -> usize {
        self.arities.len()
    }

    /// Replaces the primitive set and drops every cached count.
    pub fn set_primitives(&mut self, pset: PrimitiveSet) {
        self.arities = pset.arities();
        self.pset = pset;
        self.clear_caches();
    }

    pub fn clear_caches(&self) {
        self.leaf_cache.borrow_mut().clear();
        self.slot_cache.borrow_mut().clear();
        self.config_cache.borrow_mut().clear();
        self.operator_cache.borrow_mut().clear();
        self.terminal_cache.borrow_mut().clear();
        *self.prefix.borrow_mut() = None;
    }

    pub fn cache_stats(&self) -> EnumeratorStats {
        EnumeratorStats {
            leaves: self.leaf_cache.borrow().stats(),
            slots: self.slot_cache.borrow().stats(),
            bucket_configs: self.config_cache.borrow().stats(),
            operator_configs: self.operator_cache.borrow().stats(),
            terminal_configs: self.terminal_cache.borrow().stats(),
        }
    }

    /// Root arity and child indices of shape `i`.
    pub fn children(&self, i: u64) -> Result<Decomposition> {
        shape::decompose(i, &self.arities)
    }

    /// Shape `i` rendered with `..` placeholder leaves.
    pub fn shape_string(&self, i: u64) -> Result<String> {
        shape::shape_string(i, &self.arities)
    }

    /// Index of a rendered shape over this enumerator's arities.
    pub fn rank_shape(&self, shape: &str) -> Result<u64> {
        shape::rank_shape(shape, &self.arities)
    }

    fn check_bucket(&self, b: usize) -> Result<()> {
        if b >= self.arities.len() {
            return Err(EnumError::InternalConsistency(format!(
                "bucket {} out of range for {} arities",
                b,
                self.arities.len()
            )));
        }
        Ok(())
    }

    /// `a_i`: number of leaf slots in shape `i`.
    pub fn calculate_a_i(&self, i: u64) -> Result<u64> {
        self.fold_shape(i, &self.leaf_cache, |j| j, 1, |_| 0)
    }

    /// `l_i_b`: number of operator slots of arity `K[b]` in shape `i`.
    pub fn calculate_l_i_b(&self, i: u64, b: usize) -> Result<u64> {
        self.check_bucket(b)?;
        // The root itself fills one slot when its arity is K[b].
        self.fold_shape(i, &self.slot_cache, |j| (j, b), 0, |node| match node {
            Decomposition::Leaf => 0,
            Decomposition::Node { bucket, .. } => u64::from(*bucket == b),
        })
    }

    /// Sums `own(node)` over every node of shape `i`, where a leaf counts
    /// `leaf`, memoizing each subtree's total in `cache`.
    ///
    /// Subtrees are resolved with an explicit stack: a unary chain is as
    /// deep as its index. Child indices are smaller than their parent's, so
    /// the stack never revisits a pending node.
    fn fold_shape<K: Hash + Eq>(
        &self,
        i: u64,
        cache: &RefCell<MemoCache<K, u64>>,
        key: impl Fn(u64) -> K,
        leaf: u64,
        own: impl Fn(&Decomposition) -> u64,
    ) -> Result<u64> {
        if i == 0 {
            return Ok(leaf);
        }
        if let Some(v) = cache.borrow_mut().get(&key(i)) {
            return Ok(v);
        }
        trace!("fold_shape({}): miss", i);

        let known = |j: u64| if j == 0 { Some(leaf) } else { cache.borrow().peek(&key(j)) };

        let mut stack = vec![(i, self.children(i)?)];
        while let Some((j, node)) = stack.last() {
            let pending = node.children().iter().copied().find(|&c| known(c).is_none());
            if let Some(c) = pending {
                let child = self.children(c)?;
                stack.push((c, child));
                continue;
            }

            let mut total = own(node);
            for &c in node.children() {
                total += known(c).unwrap_or_default();
            }
            let j = *j;
            stack.pop();
            cache.borrow_mut().insert(key(j), total);
        }

        known(i).ok_or_else(|| EnumError::InternalConsistency(format!("shape {} was not counted", i)))
    }

    /// `G_i_b = f_b ^ l_i_b`.
    pub fn calculate_g_i_b(&self, i: u64, b: usize) -> Result<BigUint> {
        self.check_bucket(b)?;
        if let Some(g) = self.config_cache.borrow_mut().get(&(i, b)) {
            return Ok(g);
        }

        let f_b = self.pset.operators(self.arities[b]).len();
        let g = pow(f_b, self.calculate_l_i_b(i, b)?);

        self.config_cache.borrow_mut().insert((i, b), g.clone());
        Ok(g)
    }

    /// `G_i_b` for every bucket, in arity order.
    pub fn all_g_i_b(&self, i: u64) -> Result<Vec<BigUint>> {
        (0..self.num_buckets()).map(|b| self.calculate_g_i_b(i, b)).collect()
    }

    /// `R_i`: number of operator configurations of shape `i`.
    pub fn count_r(&self, i: u64) -> Result<BigUint> {
        if i == 0 {
            return Ok(BigUint::from(1u32));
        }
        if self.arities.is_empty() {
            return Err(EnumError::UnknownPrimitives(i));
        }
        if let Some(r) = self.operator_cache.borrow_mut().get(&i) {
            return Ok(r);
        }

        let r = self
            .all_g_i_b(i)?
            .into_iter()
            .filter(|g| *g != BigUint::ZERO)
            .product::<BigUint>();

        self.operator_cache.borrow_mut().insert(i, r.clone());
        Ok(r)
    }

    /// `S_i`: number of terminal configurations of shape `i`.
    pub fn count_s(&self, i: u64) -> Result<BigUint> {
        if let Some(s) = self.terminal_cache.borrow_mut().get(&i) {
            return Ok(s);
        }

        let s = pow(self.pset.num_terminals(), self.calculate_a_i(i)?);

        self.terminal_cache.borrow_mut().insert(i, s.clone());
        Ok(s)
    }

    /// `R_i * S_i`: number of distinct equations with shape `i`.
    pub fn count_equations(&self, i: u64) -> Result<BigUint> {
        Ok(self.count_r(i)? * self.count_s(i)?)
    }
}
