//! Bias-correction constant for the Flajolet-Martin estimator.
//!
//! With no perturbation the constant is the well-known `0.773519`; with
//! perturbation `r` it is estimated by simulating, for each bit position `j`
//! of a 32-bit trailing-zero window, the probability that position `j` is
//! the first unset bit after `n` insertions plus Bernoulli(`r`) noise.
//!
//! The running product `qk` resets to `1.0` at the end of every outer step
//! but only the last inner iteration's delta `a` is read back into the
//! accumulator, matching the reference numeric table in Tschorsch &
//! Scheuermann's analysis of perturbed PCSA.
const WINDOW: u32 = 32;
const SAMPLES: f64 = 100_000.0;

pub(crate) fn compute(r: f64) -> f64 {
    if r == 0.0 {
        return 0.773_519;
    }

    let mut qk: f64 = 1.0;
    let mut expected_value: f64 = 0.0;
    let mut a: f64 = 0.0;

    for j in 1..=WINDOW {
        for i in 1..=j {
            qk *= 1.0 - (1.0 - 2f64.powi(-(i as i32))).powf(SAMPLES) * (1.0 - r);
            let qk1 = qk * (1.0 - (1.0 - 2f64.powi(-((i + 1) as i32))).powf(SAMPLES) * (1.0 - r));
            a = qk - qk1;
        }
        qk = 1.0;
        expected_value += f64::from(j) * a;
    }

    2f64.powf(expected_value) / SAMPLES
}
