//! Risk score combination.
//!
//! The detectors emit independent weighted signals; composites reduce them
//! with one of two explicit policies rather than ad hoc boolean logic:
//!
//! - [`noisy_or`] - used by the jailbreak detector. Super-additive for
//!   co-occurring signals (several medium-weight social-engineering cues
//!   together are more dangerous than any single one), monotonic in every
//!   input, capped at 1.0.
//! - [`capped_sum`] - used by the output scanner and the composites, where
//!   the original calibration of the individual deductions is additive.

/// Combines independent signal weights as `1 - prod(1 - w)`.
///
/// Weights outside `[0, 1]` are clamped. An empty slice yields 0.0.
pub fn noisy_or(weights: &[f64]) -> f64 {
    let survival: f64 = weights
        .iter()
        .map(|w| 1.0 - w.clamp(0.0, 1.0))
        .product();
    1.0 - survival
}

/// Sums signal weights and caps the result at 1.0.
pub fn capped_sum(weights: &[f64]) -> f64 {
    weights.iter().sum::<f64>().min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noisy_or_empty() {
        assert_eq!(noisy_or(&[]), 0.0);
    }

    #[test]
    fn test_noisy_or_single() {
        assert!((noisy_or(&[0.4]) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_noisy_or_super_additive() {
        // Two co-occurring signals score higher than either alone but less
        // than their plain sum.
        let combined = noisy_or(&[0.4, 0.5]);
        assert!(combined > 0.5);
        assert!(combined < 0.9);
        assert!((combined - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_noisy_or_monotonic() {
        let base = noisy_or(&[0.3, 0.3]);
        let more = noisy_or(&[0.3, 0.3, 0.2]);
        assert!(more > base);
    }

    #[test]
    fn test_noisy_or_capped() {
        let v = noisy_or(&[1.0, 0.5]);
        assert!(v <= 1.0);
        assert!((v - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_noisy_or_clamps_out_of_range() {
        assert!(noisy_or(&[1.5]) <= 1.0);
        assert_eq!(noisy_or(&[-0.5]), 0.0);
    }

    #[test]
    fn test_capped_sum() {
        assert!((capped_sum(&[0.5, 0.4]) - 0.9).abs() < 1e-9);
        assert_eq!(capped_sum(&[0.8, 0.8]), 1.0);
    }
}
