//! Local differential privacy via randomized response.
//!
//! Two mechanisms, sharing one non-generic interface (`RandomizedResponse`)
//! for the probability/inversion surface, plus a per-mechanism generic
//! `randomize` for the report itself (kept off the trait: a generic method
//! would make the trait non-object-safe, and `DpMechanism` already needs to
//! dispatch on a concrete variant to call it).

mod grr;
mod rrt;

use std::{error, fmt};

pub use crate::grr::Grr;
pub use crate::rrt::Rrt;

use rand::Rng;

/// The probability law and bias-correction shared by every randomized
/// response mechanism.
pub trait RandomizedResponse {
    /// `(prob1, prob2)`: probability of reporting the true value, and the
    /// probability mass assigned to the random branch (spread, for GRR,
    /// over `dimension - 1` values; for RRT, over all `dimension` values).
    fn probabilities(&self) -> (f64, f64);

    /// Inverts a biased `card` observed out of `n` total reports back to an
    /// unbiased cardinality estimate, truncated toward zero after clamping
    /// at zero: a biased sample can yield a raw negative estimate that has
    /// no cardinality interpretation.
    fn invert(&self, card: f64, n: f64) -> u64;
}

/// A configured differential privacy mechanism, dispatched by variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DpMechanism {
    Rrt(Rrt),
    Grr(Grr),
}

impl DpMechanism {
    pub fn rrt(epsilon: f64, dimension: usize) -> Result<Self, ConfigError> {
        Ok(Self::Rrt(Rrt::new(epsilon, dimension)?))
    }

    pub fn grr(epsilon: f64, dimension: usize) -> Result<Self, ConfigError> {
        Ok(Self::Grr(Grr::new(epsilon, dimension)?))
    }

    pub fn probabilities(&self) -> (f64, f64) {
        match self {
            DpMechanism::Rrt(rrt) => rrt.probabilities(),
            DpMechanism::Grr(grr) => grr.probabilities(),
        }
    }

    pub fn invert(&self, card: f64, n: f64) -> u64 {
        match self {
            DpMechanism::Rrt(rrt) => rrt.invert(card, n),
            DpMechanism::Grr(grr) => grr.invert(card, n),
        }
    }

    pub fn randomize<T>(
        &self,
        element: &T,
        universe: &[T],
        rng: &mut impl Rng,
    ) -> Result<T, UnknownValueError>
    where
        T: Clone + PartialEq,
    {
        match self {
            DpMechanism::Rrt(rrt) => rrt.randomize(element, universe, rng),
            DpMechanism::Grr(grr) => grr.randomize(element, universe, rng),
        }
    }
}

#[derive(Clone, Debug)]
pub enum ConfigError {
    InvalidParameter(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
        }
    }
}

impl error::Error for ConfigError {}

/// The reported/true value was not a member of the mechanism's universe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownValueError;

impl fmt::Display for UnknownValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element is not a member of the configured universe")
    }
}

impl error::Error for UnknownValueError {}
