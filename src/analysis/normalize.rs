//! Probability normalization.
//!
//! Sources report ad hoc scores on whatever scale they like (the quantum
//! backend uses 0..1, the model prompt asks for 5..30). [`normalize`] rescales
//! them to percentages that sum to 100.

use super::types::AnalysisResult;

/// Rescale `raw` so the output sums to 100, preserving relative order.
///
/// Negative and non-finite scores are clamped to 0 first. If nothing positive
/// remains the distribution is uniform. The output depends only on the values,
/// so permuting the input permutes the output identically.
pub fn normalize(raw: &[f64]) -> Vec<f64> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut clamped: Vec<f64> = raw.iter().map(|&v| clamp_score(v)).collect();
    let mut sum: f64 = clamped.iter().sum();

    if !sum.is_finite() {
        // Finite scores can still overflow when added; rescale by the largest.
        let max = clamped.iter().copied().fold(0.0, f64::max);
        clamped.iter_mut().for_each(|v| *v /= max);
        sum = clamped.iter().sum();
    }

    if sum <= 0.0 {
        let uniform = 100.0 / clamped.len() as f64;
        return vec![uniform; clamped.len()];
    }

    clamped.iter().map(|v| 100.0 * v / sum).collect()
}

fn clamp_score(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Normalize the primary and secondary scores of `result` together, in place.
pub fn normalize_result(result: &mut AnalysisResult) {
    let raw: Vec<f64> = result.candidates().map(|c| c.probability).collect();
    let normalized = normalize(&raw);

    let mut scores = normalized.into_iter();
    if let Some(p) = scores.next() {
        result.primary.probability = p;
    }
    for (candidate, p) in result.secondary.iter_mut().zip(scores) {
        candidate.probability = p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{Candidate, SourceMethod};

    fn sum(v: &[f64]) -> f64 {
        v.iter().sum()
    }

    #[test]
    fn sums_to_one_hundred() {
        for raw in [
            vec![75.0, 20.0, 10.0],
            vec![0.93, 0.41, 0.22, 0.21],
            vec![1.0],
            vec![3.0, 0.0, 0.0],
            vec![1e-9, 2e-9],
            vec![1e12, 1.0, 5.0],
        ] {
            let n = normalize(&raw);
            assert!((sum(&n) - 100.0).abs() < 1e-9, "{raw:?} -> {n:?}");
        }
    }

    #[test]
    fn all_zero_is_uniform() {
        let n = normalize(&[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(n, vec![25.0; 4]);
    }

    #[test]
    fn negative_and_nan_are_clamped() {
        let n = normalize(&[-5.0, f64::NAN, 10.0]);
        assert_eq!(n, vec![0.0, 0.0, 100.0]);

        let all_bad = normalize(&[-1.0, f64::NEG_INFINITY]);
        assert_eq!(all_bad, vec![50.0, 50.0]);
    }

    #[test]
    fn preserves_relative_order() {
        let raw = [12.0, 40.0, 7.0, 40.0, 0.5];
        let n = normalize(&raw);
        for i in 0..raw.len() {
            for j in 0..raw.len() {
                if raw[i] < raw[j] {
                    assert!(n[i] < n[j]);
                }
            }
        }
    }

    #[test]
    fn independent_of_input_order() {
        let raw = [75.0, 20.0, 10.0, 3.0];
        let reversed: Vec<f64> = raw.iter().rev().copied().collect();
        let a = normalize(&raw);
        let mut b = normalize(&reversed);
        b.reverse();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_input() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn normalizes_result_in_place() {
        let mut result = AnalysisResult {
            primary: Candidate::new("Paris", 75.0, "", "France"),
            secondary: vec![
                Candidate::new("Lyon", 20.0, "", "France"),
                Candidate::new("Nice", 10.0, "", "France"),
            ],
            source_method: SourceMethod::GeminiDirect,
        };
        normalize_result(&mut result);
        assert!((result.primary.probability - 100.0 * 75.0 / 105.0).abs() < 1e-9);
        let total: f64 = result.candidates().map(|c| c.probability).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn overflowing_sum_keeps_relative_order() {
        let out = normalize(&[1e308, 1e308, 1.0]);
        assert!((sum(&out) - 100.0).abs() < 1e-9);
        assert!((out[0] - 50.0).abs() < 1e-9);
        assert_eq!(out[0], out[1]);
        assert!(out[2] < out[0]);
    }
}
