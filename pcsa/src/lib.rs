//! Probabilistic Counting with Stochastic Averaging (PCSA).
//!
//! A bitmap-based distinct-count sketch: `nmap` independent rows of
//! `length` bits, each row recording the trailing-zero pattern of hashed
//! items routed to it. Cardinality is read back with a dual estimator (a
//! "hit counting" branch for small cardinalities, Flajolet-Martin averaging
//! otherwise); rows may additionally be perturbed with independent
//! Bernoulli(`r`) noise once at construction to blunt content leakage.
//!
//! Reference: Flajolet, P., Martin, G.N. "Probabilistic Counting Algorithms
//! for Data Base Applications." JCSS 31(2), 1985.

mod config;
mod phi;

use std::{error, fmt};

use hash_source::HashSource;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use sketch_traits::{DistinctSketch, New};

pub use crate::config::{Config, ConfigError, MAX_LENGTH};

#[derive(Clone, Debug)]
pub struct Pcsa<H> {
    config: Config<H>,
    bitmap: Vec<u32>,
    phi: f64,
}

impl<H> New for Pcsa<H>
where
    H: HashSource,
{
    type Config = Config<H>;

    fn new(config: &Self::Config) -> Self {
        let phi = phi::compute(config.r());
        let mut sketch = Self {
            config: config.clone(),
            bitmap: vec![0u32; config.nmap()],
            phi,
        };
        if config.r() > 0.0 {
            sketch.perturb(&mut StdRng::seed_from_u64(config.seed()));
        }
        sketch
    }
}

impl<H> DistinctSketch for Pcsa<H>
where
    H: HashSource,
{
    type Item = [u8];
    type UnionError = UnionError;

    #[inline]
    fn add(&mut self, item: &Self::Item) {
        let hashed = self.config.hash().hash(item);
        let row = (hashed as usize) % self.config.nmap();
        let tail = hashed / self.config.nmap() as u32;

        // `trailing_zeros(0) == 32`, which is always `>= length` (length is
        // capped at 32), so a zero tail is naturally dropped below without a
        // separate branch — matching the reference's "no set bit found"
        // case, which must never be read as index -1.
        let j = tail.trailing_zeros() as usize;
        if j >= self.config.length() {
            return;
        }
        self.bitmap[row] |= 1 << j;
    }

    fn count(&self) -> f64 {
        let nmap = self.config.nmap() as f64;
        let length = self.config.length();

        let set_first_bit = self.bitmap.iter().filter(|&&row| row & 1 != 0).count();
        let k = self.config.nmap() - set_first_bit;

        if (k as f64) > 0.3 * nmap {
            // Hit counting: correction for small cardinalities.
            (-2.0 * nmap) * ((k as f64) / nmap).ln()
        } else {
            let sum_first_zero: usize = self
                .bitmap
                .iter()
                .map(|&row| first_zero_bit(row, length))
                .sum();
            let a = sum_first_zero as f64 / nmap;
            nmap * 2f64.powf(a) / self.phi
        }
    }

    fn size_bytes(&self) -> f64 {
        (self.config.nmap() * self.config.length()) as f64 / 8.0
    }

    fn union(sketches: &[Self]) -> Result<Self, Self::UnionError> {
        let first = sketches.first().ok_or(UnionError::Empty)?;
        let mut bitmap = first.bitmap.clone();

        for sketch in &sketches[1..] {
            if sketch.config.nmap() != first.config.nmap() {
                return Err(UnionError::IncompatibleSketches(
                    "sketches have different values for nmap",
                ));
            }
            if sketch.config.length() != first.config.length() {
                return Err(UnionError::IncompatibleSketches(
                    "sketches have different values for length",
                ));
            }
            if sketch.config.hash() != first.config.hash() {
                return Err(UnionError::IncompatibleSketches(
                    "pcsa objects use different hash functions",
                ));
            }
            for (dst, src) in bitmap.iter_mut().zip(sketch.bitmap.iter()) {
                *dst |= src;
            }
        }

        Ok(Self {
            config: first.config.clone(),
            bitmap,
            // The reference builds the union result as a fresh, unperturbed
            // PCSA (it constructs with the default `r = 0`), so its phi is
            // always the base FM constant regardless of the operands' `r`.
            phi: phi::compute(0.0),
        })
    }
}

impl<H> Pcsa<H> {
    pub fn config(&self) -> &Config<H> {
        &self.config
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Row `row`'s bit `bit`, exposed for tests that inspect bitmap layout directly.
    pub fn bit(&self, row: usize, bit: usize) -> bool {
        self.bitmap[row] & (1 << bit) != 0
    }

    /// Directly sets row `row`'s bit `bit`. Exposed for building the literal
    /// fixture sketches used in union tests; not part of normal ingestion.
    pub fn set_bit(&mut self, row: usize, bit: usize) {
        self.bitmap[row] |= 1 << bit;
    }

    fn perturb(&mut self, rng: &mut impl Rng) {
        let length = self.config.length;
        let r = self.config.r;
        for row in self.bitmap.iter_mut() {
            for bit in 0..length {
                if rng.gen::<f64>() < r {
                    *row |= 1 << bit;
                }
            }
        }
    }
}

/// Index of the first unset bit in `row` among its low `length` bits, or
/// `length` itself if every one of them is set.
fn first_zero_bit(row: u32, length: usize) -> usize {
    (0..length).find(|&bit| row & (1 << bit) == 0).unwrap_or(length)
}

#[derive(Clone, Debug)]
pub enum UnionError {
    Empty,
    IncompatibleSketches(&'static str),
}

impl fmt::Display for UnionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnionError::Empty => write!(f, "cannot union an empty list of sketches"),
            UnionError::IncompatibleSketches(msg) => write!(f, "{msg}"),
        }
    }
}

impl error::Error for UnionError {}
