use rand::seq::SliceRandom;
use rand::Rng;

use crate::{ConfigError, RandomizedResponse, UnknownValueError};

/// General Randomized Response: with probability `prob1` report the true
/// value, otherwise report one of the other `dimension - 1` values,
/// uniformly.
///
/// Reference: Warner, S. L. "Randomised response: a survey technique for
/// eliminating evasive answer bias." JASA 60(309), 1965.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grr {
    epsilon: f64,
    dimension: usize,
    prob1: f64,
    prob2: f64,
}

impl Grr {
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

        let prob1 = epsilon.exp() / (epsilon.exp() + dimension as f64 - 1.0);
        let prob2 = (1.0 - prob1) / (dimension as f64 - 1.0);

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
    /// uniformly from `universe` with `element` excluded.
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
            return Ok(element.clone());
        }
        let others: Vec<&T> = universe.iter().filter(|value| *value != element).collect();
        Ok(others
            .choose(rng)
            .expect("dimension > 1 guarantees at least one other value")
            .to_owned()
            .clone())
    }
}

impl RandomizedResponse for Grr {
    fn probabilities(&self) -> (f64, f64) {
        (self.prob1, self.prob2)
    }

    fn invert(&self, card: f64, n: f64) -> u64 {
        if n == 0.0 {
            return 0;
        }
        let estimate = (card - n * self.prob2) / (self.prob1 - self.prob2);
        estimate.max(0.0).trunc() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn probabilities_match_reference_formula() {
        let grr = Grr::new(300.0, 3).unwrap();
        let prob1 = (300f64).exp() / ((300f64).exp() + 2.0);
        let prob2 = (1.0 - prob1) / 2.0;
        let (p1, p2) = grr.probabilities();
        assert!((p1 - prob1).abs() < 1e-12);
        assert!((p2 - prob2).abs() < 1e-12);
    }

    // Scenario F: GRR cardinality inversion.
    #[test]
    fn cardinality_matches_reference_formula() {
        let grr = Grr::new(300.0, 3).unwrap();
        let (prob1, prob2) = grr.probabilities();
        let expected = (1.0 - (100.0 * prob2)) / (prob1 - prob2);
        assert_eq!(grr.invert(1.0, 100.0), expected.trunc() as u64);
    }

    #[test]
    fn cardinality_never_negative() {
        let grr = Grr::new(3.0, 3).unwrap();
        assert_eq!(grr.invert(1.0, 100.0), 0);
    }

    #[test]
    fn randomize_never_reports_element_on_the_random_branch() {
        let grr = Grr::new(0.0001, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let universe = [1, 2];
        let mut saw_other = false;
        for _ in 0..200 {
            let reported = grr.randomize(&1, &universe, &mut rng).unwrap();
            assert!(universe.contains(&reported));
            if reported != 1 {
                saw_other = true;
            }
        }
        assert!(saw_other, "a low epsilon should occasionally report 2");
    }

    #[test]
    fn randomize_rejects_unknown_value() {
        let grr = Grr::new(3.0, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(grr.randomize(&1, &[2, 3], &mut rng).is_err());
    }
}
