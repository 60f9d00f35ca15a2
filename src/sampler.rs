//! Random search over the first `n` shapes.
//!
//! Shape `i` stands for `w_i = R_i * S_i` equations. Drawing `i` with
//! probability `w_i / Σ w` and then `r` and `s` uniformly makes every
//! concrete equation equally likely. Drawing `i` uniformly instead
//! over-represents small shapes; it is available as
//! [`ShapeDistribution::UniformShape`] for comparison.
//!
//! Big-integer weights are sampled exactly: a uniform draw below `Q(n) = Σ w`
//! is located in the running sums by binary search.

use log::debug;
use num_bigint::BigUint;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::enumerator::Enumerator;
use crate::error::{EnumError, Result};
use crate::solution::Solution;

/// How the shape index is drawn.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ShapeDistribution {
    /// `P(i) = w_i / Σ w`, so each equation is equally likely.
    #[default]
    Weighted,
    /// `P(i) = 1 / n`.
    UniformShape,
}

/// Configuration for [`Enumerator::random_search`].
#[derive(Debug, Clone, Default)]
pub struct SamplerConfig {
    /// Random seed (None seeds from the thread RNG)
    pub seed: Option<u64>,
    /// One seed per sample; sample `j` is drawn from its own generator
    /// seeded with `seeds[j]`, and `seed` is ignored
    pub seeds: Option<Vec<u64>>,
    /// ChaCha stream; concurrent samplers sharing a seed must use distinct streams
    pub stream: u64,
    pub distribution: ShapeDistribution,
}

impl SamplerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_seeds(mut self, seeds: Vec<u64>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    /// Per-sample seeds drawn from the thread RNG.
    pub fn with_random_seeds(self, count: usize) -> Self {
        let mut rng = rand::rng();
        let seeds = (0..count).map(|_| rng.random()).collect();
        self.with_seeds(seeds)
    }

    pub fn with_stream(mut self, stream: u64) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_distribution(mut self, distribution: ShapeDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Builds the batch generator this configuration describes.
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => self.seeded_rng(seed),
            None => {
                let mut rng = ChaCha8Rng::from_rng(&mut rand::rng());
                rng.set_stream(self.stream);
                rng
            }
        }
    }

    /// Generator for a single sample seeded with `seed`, on this stream.
    pub fn seeded_rng(&self, seed: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(self.stream);
        rng
    }
}

/// Running sums `Q(0..=j)` of the equation counts, covering shapes `0..n`.
#[derive(Debug, Clone)]
pub(crate) struct PrefixTable {
    cumulative: Vec<BigUint>,
}

impl PrefixTable {
    fn len(&self) -> u64 {
        self.cumulative.len() as u64
    }
}

/// Uniform draw from `[0, bound)`, by rejection on the bit length of `bound`.
pub fn random_below<R: Rng + ?Sized>(bound: &BigUint, rng: &mut R) -> BigUint {
    assert!(*bound > BigUint::ZERO, "empty range");
    let bits = bound.bits();
    let mut buf = vec![0u8; bits.div_ceil(8) as usize];
    let excess = buf.len() as u64 * 8 - bits;
    loop {
        rng.fill_bytes(&mut buf);
        if let Some(top) = buf.last_mut() {
            *top &= 0xFFu8 >> excess;
        }
        let candidate = BigUint::from_bytes_le(&buf);
        if candidate < *bound {
            return candidate;
        }
    }
}

impl Enumerator {
    /// `w_i = R_i * S_i` for every `i < n`.
    pub fn weights(&self, n: u64) -> Result<Vec<BigUint>> {
        (0..n).map(|i| self.count_equations(i)).collect()
    }

    /// Running sums of [`Enumerator::weights`]; entry `j` is `Σ_{i<=j} w_i`.
    pub fn cumulative_weights(&self, n: u64) -> Result<Vec<BigUint>> {
        self.ensure_prefix(n)?;
        let prefix = self.prefix.borrow();
        let table = prefix.as_ref().map(|t| &t.cumulative[..n as usize]).unwrap_or(&[]);
        Ok(table.to_vec())
    }

    /// `Q(n) = Σ_{i<n} R_i * S_i`, the number of equations among the first `n` shapes.
    pub fn count_q_prefix(&self, n: u64) -> Result<BigUint> {
        if n == 0 {
            return Ok(BigUint::ZERO);
        }
        self.ensure_prefix(n)?;
        Ok(self.prefix_at(n - 1))
    }

    fn prefix_at(&self, j: u64) -> BigUint {
        self.prefix
            .borrow()
            .as_ref()
            .map(|t| t.cumulative[j as usize].clone())
            .unwrap_or_default()
    }

    /// Extends the cached running sums to cover at least `n` shapes.
    fn ensure_prefix(&self, n: u64) -> Result<()> {
        let have = self.prefix.borrow().as_ref().map_or(0, PrefixTable::len);
        if have >= n {
            return Ok(());
        }
        debug!("ensure_prefix(n = {}): extending from {}", n, have);

        let mut total = if have == 0 { BigUint::ZERO } else { self.prefix_at(have - 1) };
        let mut extra = Vec::with_capacity((n - have) as usize);
        for i in have..n {
            total += self.count_equations(i)?;
            extra.push(total.clone());
        }

        let mut prefix = self.prefix.borrow_mut();
        let table = prefix.get_or_insert_with(|| PrefixTable { cumulative: Vec::new() });
        table.cumulative.extend(extra);
        Ok(())
    }

    /// Draws a shape index below `n`.
    pub fn sample_shape<R: Rng + ?Sized>(&self, n: u64, distribution: ShapeDistribution, rng: &mut R) -> Result<u64> {
        if n == 0 {
            return Err(EnumError::EmptySearchSpace(n));
        }
        match distribution {
            ShapeDistribution::UniformShape => Ok(rng.random_range(0..n)),
            ShapeDistribution::Weighted => {
                let total = self.count_q_prefix(n)?;
                if total == BigUint::ZERO {
                    return Err(EnumError::EmptySearchSpace(n));
                }
                let u = random_below(&total, rng);
                let prefix = self.prefix.borrow();
                let cumulative = prefix.as_ref().map(|t| &t.cumulative[..n as usize]).unwrap_or(&[]);
                Ok(cumulative.partition_point(|q| *q <= u) as u64)
            }
        }
    }

    /// Draws one equation from the first `n` shapes.
    pub fn sample_once<R: Rng + ?Sized>(
        &self,
        n: u64,
        distribution: ShapeDistribution,
        rng: &mut R,
    ) -> Result<Solution> {
        let i = self.sample_shape(n, distribution, rng)?;
        let r_i = self.count_r(i)?;
        let s_i = self.count_s(i)?;
        if s_i == BigUint::ZERO {
            return Err(EnumError::EmptySearchSpace(n));
        }
        let r = random_below(&r_i, rng);
        let s = random_below(&s_i, rng);
        self.solution(i, &r, &s, n)
    }

    /// Draws one equation from a generator seeded with `seed` alone, or
    /// from the thread RNG when `seed` is None.
    pub fn sample_seeded(&self, n: u64, seed: Option<u64>, distribution: ShapeDistribution) -> Result<Solution> {
        let config = SamplerConfig {
            seed,
            distribution,
            ..SamplerConfig::default()
        };
        self.sample_once(n, distribution, &mut config.rng())
    }

    /// Draws `num_samples` equations from the first `n` shapes.
    ///
    /// With per-sample seeds, the batch is the concatenation of
    /// independent single draws, one per seed, so any sample can be
    /// reproduced (or computed elsewhere) from its seed alone.
    pub fn random_search(&self, n: u64, num_samples: usize, config: &SamplerConfig) -> Result<Vec<String>> {
        debug!(
            "random_search(n = {}, num_samples = {}, config = {:?})",
            n, num_samples, config
        );
        match &config.seeds {
            Some(seeds) => {
                if seeds.len() != num_samples {
                    return Err(EnumError::SeedCountMismatch {
                        seeds: seeds.len(),
                        samples: num_samples,
                    });
                }
                seeds
                    .iter()
                    .map(|&seed| {
                        let mut rng = config.seeded_rng(seed);
                        self.sample_once(n, config.distribution, &mut rng).map(|s| s.formula)
                    })
                    .collect()
            }
            None => {
                let mut rng = config.rng();
                self.random_search_with(n, num_samples, config.distribution, &mut rng)
            }
        }
    }

    /// Like [`Enumerator::random_search`], with a caller-supplied generator.
    pub fn random_search_with<R: Rng + ?Sized>(
        &self,
        n: u64,
        num_samples: usize,
        distribution: ShapeDistribution,
        rng: &mut R,
    ) -> Result<Vec<String>> {
        (0..num_samples)
            .map(|_| self.sample_once(n, distribution, rng).map(|s| s.formula))
            .collect()
    }
}
