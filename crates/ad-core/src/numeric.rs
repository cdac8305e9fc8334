use crate::AdError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, AdError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(AdError::NonFinite { what, value: v })
    }
}

/// Floor of `num / den`, snapping quotients that sit within `rel` of an
/// integer onto that integer. Keeps boundaries like 48h/48h from landing on
/// the wrong side after float accumulation.
pub fn snapped_floor_div(num: Real, den: Real, rel: Real) -> Real {
    let q = num / den;
    let nearest = q.round();
    if (q - nearest).abs() <= rel * nearest.abs().max(1.0) {
        nearest
    } else {
        q.floor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn snapped_floor_div_handles_boundaries() {
        assert_eq!(snapped_floor_div(47.999_999_999_99, 48.0, 1e-9), 1.0);
        assert_eq!(snapped_floor_div(47.0, 48.0, 1e-9), 0.0);
        assert_eq!(snapped_floor_div(96.0, 48.0, 1e-9), 2.0);
        assert_eq!(snapped_floor_div(0.0, 48.0, 1e-9), 0.0);
    }
}
