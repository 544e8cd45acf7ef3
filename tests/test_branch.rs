use approx::assert_abs_diff_eq;

use qtraj::branch::{residual, select_branch};
use qtraj::rng::{RngRegistry, StreamName};

#[test]
fn test_left_closed_right_open_partition() {
    let probs = [0.2, 0.3, 0.1];
    assert_eq!(select_branch(probs, 0.0), Some(0));
    assert_eq!(select_branch(probs, 0.199), Some(0));
    assert_eq!(select_branch(probs, 0.2), Some(1));
    assert_eq!(select_branch(probs, 0.55), Some(2));
    assert_eq!(select_branch(probs, 0.6), None);
    assert_eq!(select_branch(probs, 0.99), None);
}

#[test]
fn test_empirical_frequencies_converge() {
    let probs = [0.2, 0.3, 0.15];
    let nsamples = 200_000;
    let mut rngs = RngRegistry::new([(StreamName::Control, 2024)]);
    let mut counts = [0usize; 4];
    for _ in 0..nsamples {
        let r = rngs.draw_uniform(StreamName::Control).unwrap();
        match select_branch(probs, r) {
            Some(i) => counts[i] += 1,
            None => counts[3] += 1,
        }
    }
    for (i, &p) in probs.iter().enumerate() {
        assert_abs_diff_eq!(counts[i] as f64 / nsamples as f64, p, epsilon = 0.01);
    }
    assert_abs_diff_eq!(
        counts[3] as f64 / nsamples as f64,
        residual(probs),
        epsilon = 0.01
    );
}

#[test]
fn test_residual_mass() {
    assert_abs_diff_eq!(residual([0.25, 0.25]), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(residual([1.0]), 0.0, epsilon = 1e-12);
}
