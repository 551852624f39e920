//! Robust statistics used to pool expert judgments.

/// Replaces a blank or non-finite judgment with the neutral value 0.
#[inline]
pub fn neutral(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Median; the mean of the two central values for even lengths.
///
/// Returns 0.0 for empty input.
///
/// ```
/// use u_criteria::aggregation::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
/// assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
/// assert_eq!(median(&[]), 0.0);
/// ```
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Strict majority: more than half of all votes are `Some(true)`.
///
/// An exact half is a rejection. Blank votes count as "no".
pub fn majority(votes: &[Option<bool>]) -> bool {
    let yes = votes.iter().filter(|v| **v == Some(true)).count();
    2 * yes > votes.len()
}

/// Every vote is `Some(true)`. No votes is not unanimity.
pub fn unanimous(votes: &[Option<bool>]) -> bool {
    !votes.is_empty() && votes.iter().all(|v| *v == Some(true))
}

/// Absolute Pearson correlation of two equal-length samples.
///
/// Zero-variance samples, length mismatches and samples shorter than two
/// yield 0.0 rather than NaN. The result is clamped to `[0, 1]`.
pub fn abs_pearson(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return 0.0;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom <= f64::EPSILON || !denom.is_finite() {
        return 0.0;
    }
    let r = (cov / denom).abs();
    if r.is_finite() {
        r.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral() {
        assert_eq!(neutral(Some(3.5)), 3.5);
        assert_eq!(neutral(None), 0.0);
        assert_eq!(neutral(Some(f64::NAN)), 0.0);
        assert_eq!(neutral(Some(f64::INFINITY)), 0.0);
    }

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[7.0]), 7.0);
        assert_eq!(median(&[9.0, 5.0, 7.0]), 7.0);
        assert_eq!(median(&[5.0, 6.0, 8.0, 9.0]), 7.0);
    }

    #[test]
    fn test_majority_tie_rejects() {
        assert!(!majority(&[Some(true), Some(false)]));
        assert!(majority(&[Some(true), Some(true), Some(false)]));
        assert!(!majority(&[Some(true), None, None]));
        assert!(!majority(&[]));
    }

    #[test]
    fn test_unanimous() {
        assert!(unanimous(&[Some(true), Some(true)]));
        assert!(!unanimous(&[Some(true), None]));
        assert!(!unanimous(&[]));
    }

    #[test]
    fn test_pearson_perfect() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let c = [8.0, 6.0, 4.0, 2.0];
        assert!((abs_pearson(&a, &b) - 1.0).abs() < 1e-12);
        assert!((abs_pearson(&a, &c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance() {
        let a = [1.0, 2.0, 3.0];
        let flat = [5.0, 5.0, 5.0];
        let r = abs_pearson(&a, &flat);
        assert_eq!(r, 0.0);
        assert!(!r.is_nan());
    }

    #[test]
    fn test_pearson_degenerate_lengths() {
        assert_eq!(abs_pearson(&[1.0], &[2.0]), 0.0);
        assert_eq!(abs_pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }
}
