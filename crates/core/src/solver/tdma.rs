//! Tridiagonal matrix solver (Thomas algorithm).
//!
//! Solves `a[i]·x[i-1] + b[i]·x[i] + c[i]·x[i+1] = d[i]` for i = 0..n-1 in
//! O(n), with the convention `a[0] = 0` and `c[n-1] = 0` (no wrap-around).
//! This is the primitive behind both directional sweeps of the diffusion
//! step: operator splitting reduces the 2D implicit solve to independent 1D
//! tridiagonal systems per row and per column.

/// Solve a tridiagonal system in place.
///
/// `c` and `d` are mutated during forward elimination and hold intermediate
/// coefficients afterwards; callers must not reuse them. The solution is
/// written into `x`.
///
/// The system must be diagonally dominant: a degenerate pivot
/// `b[i] − c[i-1]·a[i] ≈ 0` produces non-finite values, which this routine
/// does not detect. The diffusion solver builds rows of the form
/// `b = 1 + λw + λe`, `a = −λw`, `c = −λe` with λ ≥ 0, which is strictly
/// dominant.
///
/// # Panics
///
/// Panics if the slices differ in length or are empty.
pub fn solve_in_place(a: &[f32], b: &[f32], c: &mut [f32], d: &mut [f32], x: &mut [f32]) {
    let n = a.len();
    assert!(n >= 1, "tridiagonal system must have at least one row");
    assert!(
        b.len() == n && c.len() == n && d.len() == n && x.len() == n,
        "tridiagonal system slices must have equal length"
    );

    // Forward elimination
    c[0] /= b[0];
    d[0] /= b[0];
    for i in 1..n {
        let m = 1.0 / (b[i] - c[i - 1] * a[i]);
        c[i] *= m;
        d[i] = (d[i] - d[i - 1] * a[i]) * m;
    }

    // Back substitution
    x[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d[i] - c[i] * x[i + 1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Multiply the original tridiagonal matrix by x.
    fn residual(a: &[f32], b: &[f32], c: &[f32], d: &[f32], x: &[f32]) -> f32 {
        let n = a.len();
        let mut worst = 0.0_f32;
        for i in 0..n {
            let mut lhs = b[i] * x[i];
            if i > 0 {
                lhs += a[i] * x[i - 1];
            }
            if i + 1 < n {
                lhs += c[i] * x[i + 1];
            }
            worst = worst.max((lhs - d[i]).abs());
        }
        worst
    }

    #[test]
    fn test_single_row() {
        let a = [0.0];
        let b = [4.0];
        let mut c = [0.0];
        let mut d = [8.0];
        let mut x = [0.0];
        solve_in_place(&a, &b, &mut c, &mut d, &mut x);
        assert!((x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_known_system() {
        // [2 1 0; 1 3 1; 0 1 2] x = [3, 5, 3] -> x = [1, 1, 1]
        let a = [0.0, 1.0, 1.0];
        let b = [2.0, 3.0, 2.0];
        let mut c = [1.0, 1.0, 0.0];
        let mut d = [3.0, 5.0, 3.0];
        let mut x = [0.0; 3];
        solve_in_place(&a, &b, &mut c, &mut d, &mut x);
        for xi in x {
            assert!((xi - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_random_diagonally_dominant_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in [1usize, 2, 3, 17, 64, 257] {
            let mut a = vec![0.0; n];
            let mut b = vec![0.0; n];
            let mut c = vec![0.0; n];
            let mut d = vec![0.0; n];
            for i in 0..n {
                let off_lo: f32 = if i > 0 { rng.random_range(-1.0..1.0) } else { 0.0 };
                let off_hi: f32 = if i + 1 < n {
                    rng.random_range(-1.0..1.0)
                } else {
                    0.0
                };
                a[i] = off_lo;
                c[i] = off_hi;
                // Strict dominance keeps every pivot well away from zero
                b[i] = off_lo.abs() + off_hi.abs() + rng.random_range(1.0..3.0);
                d[i] = rng.random_range(-10.0..10.0);
            }

            let (a0, b0, c0, d0) = (a.clone(), b.clone(), c.clone(), d.clone());
            let mut x = vec![0.0; n];
            solve_in_place(&a, &b, &mut c, &mut d, &mut x);

            assert!(x.iter().all(|v| v.is_finite()), "n={n}: non-finite solution");
            let r = residual(&a0, &b0, &c0, &d0, &x);
            assert!(r < 1e-3, "n={n}: residual {r} too large");
        }
    }
}
