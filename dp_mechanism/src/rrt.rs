use rand::seq::SliceRandom;
use rand::Rng;

use crate::{ConfigError, RandomizedResponse, UnknownValueError};

/// Randomized Response Forced model: with probability `prob1` report the
/// true value, otherwise draw uniformly at random from the whole universe
/// (which may, by chance, reproduce the true value).
///
/// Reference: Boruch, R. F. "Assuring confidentiality of responses in
/// social research: a note on strategies." The American Sociologist, 1971.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rrt {
    epsilon: f64,
    dimension: usize,
    prob1: f64,
    prob2: f64,
}

impl Rrt {
    pub fn new(epsilon: f64, dimension: usize) -> Result<Self, ConfigError> {
        if epsilon < 0.0 {
            return Err(ConfigError::InvalidParameter("epsilon has to be positive"));
        }
        if dimension <= 1 {
            return Err(ConfigError::InvalidParameter(
                "dimension has to be bigger than 1",
            ));
        }
        if epsilon == 0.0 {
            tracing::warn!("epsilon == 0: randomized responses will be completely random");
        }

        let prob2 = 1.0 / dimension as f64;
        let prob1 = (epsilon.exp() - 1.0) / (epsilon.exp() + dimension as f64 - 1.0);

        Ok(Self {
            epsilon,
            dimension,
            prob1,
            prob2,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Reports `element` with probability `prob1`, otherwise a value drawn
    /// uniformly from `universe` (the forced draw is not excluded from
    /// landing on `element` again).
    pub fn randomize<T>(
        &self,
        element: &T,
        universe: &[T],
        rng: &mut impl Rng,
    ) -> Result<T, UnknownValueError>
    where
        T: Clone + PartialEq,
    {
        if !universe.contains(element) {
            return Err(UnknownValueError);
        }
        if rng.gen::<f64>() < self.prob1 {
            Ok(element.clone())
        } else {
            Ok(universe
                .choose(rng)
                .expect("universe is non-empty, checked via membership above")
                .clone())
        }
    }
}

impl RandomizedResponse for Rrt {
    fn probabilities(&self) -> (f64, f64) {
        (self.prob1, self.prob2)
    }

    fn invert(&self, card: f64, n: f64) -> u64 {
        if n == 0.0 {
            return 0;
        }
        let estimate = ((card / n - self.prob2 + self.prob1 * self.prob2) / self.prob1) * n;
        estimate.max(0.0).trunc() as u64
    }
}
