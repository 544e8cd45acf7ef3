//! Branch selection for stochastic operations.

/// Tolerance allowed on the sum of outcome probabilities.
pub const PROBABILITY_TOLERANCE: f64 = 1e-10;

/// Select an outcome for the uniform draw `r`.
///
/// Outcomes partition [0, 1) into left-closed, right-open intervals in
/// declaration order: the first outcome whose running sum exceeds `r` wins.
/// Returns `None` for the implicit no-op branch, i.e. when `r` is not below
/// the total.
///
/// # Example
/// ```
/// use qtraj::branch::select_branch;
///
/// let probs = [0.25, 0.5];
/// assert_eq!(select_branch(probs, 0.1), Some(0));
/// assert_eq!(select_branch(probs, 0.25), Some(1));
/// assert_eq!(select_branch(probs, 0.75), None);
/// ```
pub fn select_branch(probabilities: impl IntoIterator<Item = f64>, r: f64) -> Option<usize> {
    let mut cumsum = 0.0;
    for (i, p) in probabilities.into_iter().enumerate() {
        cumsum += p;
        if r < cumsum {
            return Some(i);
        }
    }
    None
}

/// Probability of the implicit no-op branch.
pub fn residual(probabilities: impl IntoIterator<Item = f64>) -> f64 {
    (1.0 - probabilities.into_iter().sum::<f64>()).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_goes_to_next() {
        let probs = [0.5, 0.5];
        assert_eq!(select_branch(probs, 0.0), Some(0));
        assert_eq!(select_branch(probs, 0.5), Some(1));
    }

    #[test]
    fn test_full_mass_never_noop() {
        let probs = [0.3, 0.7];
        assert_eq!(select_branch(probs, 0.999_999), Some(1));
    }

    #[test]
    fn test_empty_is_noop() {
        assert_eq!(select_branch(std::iter::empty(), 0.0), None);
    }

    #[test]
    fn test_residual() {
        assert!((residual([0.2, 0.3]) - 0.5).abs() < 1e-12);
        assert_eq!(residual([0.6, 0.4 + 1e-12]), 0.0);
    }
}
