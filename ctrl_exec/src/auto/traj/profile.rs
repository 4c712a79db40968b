//! One dimensional trapezoidal velocity profile

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distances at or below this are treated as no motion at all.
const MIN_DISTANCE: f64 = 1e-12;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Rest to rest motion over a distance with bounded speed and acceleration.
///
/// The profile accelerates at the maximum rate, cruises at the maximum speed and then decelerates
/// symmetrically. When the distance is too short to reach the maximum speed the cruise phase
/// vanishes and the profile is triangular.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct TrapezoidProfile {
    distance: f64,
    max_vel: f64,
    max_acc: f64,

    /// Duration of the acceleration phase
    ta: f64,

    /// Duration of the cruise phase
    tc: f64,

    /// Duration of the deceleration phase
    td: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrapezoidProfile {
    /// Compute the profile timing for a (non-negative) distance.
    ///
    /// `max_vel` and `max_acc` must be positive, this is checked by the trajectories which own
    /// the profiles.
    pub fn new(distance: f64, max_vel: f64, max_acc: f64) -> Self {
        let mut profile = Self {
            distance,
            max_vel,
            max_acc,
            ta: 0.0,
            tc: 0.0,
            td: 0.0,
        };

        if distance <= MIN_DISTANCE {
            return profile;
        }

        let ta = max_vel / max_acc;
        let da = 0.5 * max_acc * ta * ta;

        if 2.0 * da <= distance {
            profile.ta = ta;
            profile.tc = (distance - 2.0 * da) / max_vel;
            profile.td = ta;
        } else {
            // Triangular, peak speed never reached
            profile.ta = (distance / max_acc).sqrt();
            profile.td = profile.ta;
        }

        profile
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.ta + self.tc + self.td
    }

    /// Returns true if the profile reaches the maximum speed.
    pub fn is_trapezoidal(&self) -> bool {
        self.tc > 0.0
    }

    /// Speed at the end of acceleration.
    pub fn peak_vel(&self) -> f64 {
        if self.is_trapezoidal() {
            self.max_vel
        } else {
            self.max_acc * self.ta
        }
    }

    /// Sample the distance travelled and speed at `tau` seconds since the start.
    ///
    /// `tau` is clamped into `[0, duration]`.
    pub fn sample(&self, tau: f64) -> (f64, f64) {
        if tau <= 0.0 {
            return (0.0, 0.0);
        }
        if tau >= self.duration() {
            return (self.distance, 0.0);
        }

        let a = self.max_acc;
        let v_peak = self.peak_vel();
        let s_acc = 0.5 * a * self.ta * self.ta;

        if tau < self.ta {
            (0.5 * a * tau * tau, a * tau)
        } else if tau < self.ta + self.tc {
            (s_acc + self.max_vel * (tau - self.ta), self.max_vel)
        } else {
            let t_dec = tau - self.ta - self.tc;
            (
                s_acc + v_peak * self.tc + v_peak * t_dec - 0.5 * a * t_dec * t_dec,
                v_peak - a * t_dec,
            )
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
