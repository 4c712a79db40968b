//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Norms below this are treated as zero when normalising or clamping vectors.
pub const NORM_EPSILON: f64 = 1e-12;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a value into `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    if value < min {
        min
    }
    else if value > max {
        max
    }
    else {
        value
    }
}

/// Wrap an angle into the range (-pi, pi].
///
/// Angles already inside the range are returned untouched, which makes the wrap idempotent.
pub fn wrap_to_pi<T>(angle: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t: T = pi_t + pi_t;

    if angle > -pi_t && angle <= pi_t {
        return angle;
    }

    let wrapped = pi_t - rem_euclid(pi_t - angle, tau_t);

    // rem_euclid can round up to tau for tiny negative inputs, which lands on -pi
    if wrapped <= -pi_t {
        wrapped + tau_t
    }
    else {
        wrapped
    }
}

/// Get the shortest signed angular distance to travel from `from` to `to`.
///
/// The result is in (-pi, pi], positive meaning anticlockwise.
pub fn get_ang_dist<T>(from: T, to: T) -> T
where
    T: Float
{
    wrap_to_pi(to - from)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Return the unit vector in the direction of `v`, or the zero vector if `v` is (near) zero.
pub fn normalize_or_zero(v: &Vector2<f64>) -> Vector2<f64> {
    let n = v.norm();
    if n < NORM_EPSILON {
        Vector2::zeros()
    }
    else {
        v / n
    }
}

/// Scale `v` down so that its norm does not exceed `max_norm`, preserving its direction.
///
/// Vectors already within the limit are returned unchanged.
pub fn clamp_norm(v: &Vector2<f64>, max_norm: f64) -> Vector2<f64> {
    let n = v.norm();
    if n < NORM_EPSILON || n <= max_norm {
        *v
    }
    else {
        v * (max_norm / n)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_wrap_to_pi() {
        assert_eq!(wrap_to_pi(0f64), 0f64);
        assert_eq!(wrap_to_pi(PI), PI);
        assert_eq!(wrap_to_pi(-PI), PI);
        assert!((wrap_to_pi(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_to_pi(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert!((wrap_to_pi(-TAU - 1.0) + 1.0).abs() < 1e-12);
        assert!((wrap_to_pi(1.5 * PI) + 0.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_get_ang_dist() {
        assert!((get_ang_dist(1f64, 2f64) - 1.0).abs() < 1e-12);
        assert!((get_ang_dist(2f64, 1f64) + 1.0).abs() < 1e-12);
        assert!(get_ang_dist(0f64, TAU).abs() < 1e-12);
        // Crossing the +-pi seam goes the short way round
        assert!((get_ang_dist(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-12);
        assert!((get_ang_dist(-PI + 0.1, PI - 0.1) + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.25, -1.0, 1.0), 0.25);
    }

    #[test]
    fn test_normalize_or_zero() {
        assert_eq!(normalize_or_zero(&Vector2::new(1e-13, 0.0)), Vector2::zeros());
        let n = normalize_or_zero(&Vector2::new(3.0, 4.0));
        assert!((n - Vector2::new(0.6, 0.8)).norm() < 1e-12);
    }

    #[test]
    fn test_clamp_norm() {
        let v = Vector2::new(3.0, 4.0);
        assert_eq!(clamp_norm(&v, 10.0), v);
        let c = clamp_norm(&v, 1.0);
        assert!((c - Vector2::new(0.6, 0.8)).norm() < 1e-12);
        assert_eq!(clamp_norm(&Vector2::zeros(), 0.0), Vector2::zeros());
    }

    proptest! {
        #[test]
        fn wrap_is_idempotent_and_in_range(angle in -1.0e4f64..1.0e4) {
            let once = wrap_to_pi(angle);
            prop_assert!(once > -PI && once <= PI);
            prop_assert_eq!(wrap_to_pi(once), once);
        }

        #[test]
        fn clamp_norm_respects_limit(
            x in -100.0f64..100.0,
            y in -100.0f64..100.0,
            max in 0.0f64..50.0,
        ) {
            let v = Vector2::new(x, y);
            let c = clamp_norm(&v, max);
            prop_assert!(c.norm() <= max + 1e-9 || v.norm() < NORM_EPSILON);
            if v.norm() <= max {
                prop_assert_eq!(c, v);
            }
        }
    }
}
