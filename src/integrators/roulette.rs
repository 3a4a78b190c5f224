// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Survival probability of a path vertex, never below `cap` and never above one.
pub fn russian_roulette_probability(importance: Float, cap: Float) -> Float {
    importance.max(cap).min(1.0)
}

/// Returns the survival probability when the path goes on, `None` when it is
/// terminated. Survivors must divide their throughput by the returned value.
pub fn russian_roulette(importance: Float, cap: Float, u: Float) -> Option<Float> {
    let prob = russian_roulette_probability(importance, cap);
    if prob > 0.0 && u < prob {
        Some(prob)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::{RandomSampler, Sampler};

    #[test]
    fn test_probability_bounds() {
        assert_eq!(russian_roulette_probability(0.1, 0.5), 0.5);
        assert_eq!(russian_roulette_probability(0.8, 0.5), 0.8);
        assert_eq!(russian_roulette_probability(3.0, 0.5), 1.0);
        assert_eq!(russian_roulette(2.0, 0.5, 0.999), Some(1.0));
        assert_eq!(russian_roulette(0.0, 0.25, 0.3), None);
    }

    #[test]
    fn test_roulette_is_unbiased() {
        let mut sampler = RandomSampler::new(7);
        let value: f64 = 3.0;
        for &(importance, cap) in &[(0.2, 0.5), (0.7, 0.5), (0.05, 0.1)] {
            let trials = 200_000;
            let mut sum = 0.0f64;
            for _ in 0..trials {
                if let Some(p) = russian_roulette(importance, cap, sampler.next_float()) {
                    sum += value / p as f64;
                }
            }
            let mean = sum / trials as f64;
            assert!((mean - value).abs() < 0.05 * value, "mean {} for importance {}", mean, importance);
        }
    }
}
