//! Cosine similarity with explicit degenerate-case policy.

use crate::error::DimensionMismatch;

/// Cosine of the angle between `a` and `b`.
///
/// - Lengths must match; a mismatch is reported, never truncated.
/// - A zero-norm operand (or any non-finite intermediate) scores `0.0`, so
///   rankings never see `NaN`/`Infinity`.
///
/// Accumulates in `f64`; the result is clamped to `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DimensionMismatch> {
    if a.len() != b.len() {
        return Err(DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        na += x * x;
        nb += y * y;
    }

    if na == 0.0 || nb == 0.0 {
        return Ok(0.0);
    }

    let sim = dot / (na.sqrt() * nb.sqrt());
    if !sim.is_finite() {
        return Ok(0.0);
    }
    Ok(sim.clamp(-1.0, 1.0) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn self_similarity_is_one() {
        for v in [
            vec![1.0, 0.0],
            vec![0.3, -1.7, 2.2, 9.1],
            vec![1e-3; 384],
            vec![-4.0, 12.5, 0.0, 7.25, -0.001],
        ] {
            assert!((cosine_similarity(&v, &v).unwrap() - 1.0).abs() < EPS, "{v:?}");
        }
    }

    #[test]
    fn symmetric() {
        let a = [0.2, -0.4, 0.9, 1.5];
        let b = [1.0, 0.5, -0.25, 0.0];
        assert_eq!(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        );
    }

    #[test]
    fn orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap() + 1.0).abs() < EPS);
    }

    #[test]
    fn zero_norm_scores_zero() {
        let z = [0.0, 0.0, 0.0];
        let v = [1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&z, &v).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&v, &z).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&z, &z).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn nan_components_never_leak() {
        let s = cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]).unwrap();
        assert_eq!(s, 0.0);
        let s = cosine_similarity(&[f32::INFINITY, 1.0], &[1.0, 1.0]).unwrap();
        assert!(!s.is_nan());
    }

    #[test]
    fn mismatch_is_an_error() {
        let err = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]).unwrap_err();
        assert_eq!(err, DimensionMismatch { left: 3, right: 2 });
    }
}
