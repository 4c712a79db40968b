//! Sequences of point to point trajectories

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::Vector2;

use super::{TrajError, Trajectory, TrajectorySample, TrapezoidalTrajectory};
use crate::auto::{
    limits::{Goal2, Limits},
    loc::{Pose2, State2},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Segments shorter than this keep the previous heading.
const MIN_SEGMENT_LENGTH_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A sequence of trajectories where each starts when the previous one ends.
#[derive(Debug, Clone)]
pub struct TrajectoryChain {
    /// Always contains at least one segment
    segments: Vec<TrapezoidalTrajectory>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryChain {
    /// Build a chain of stop-to-stop segments through the waypoints.
    ///
    /// The robot starts at the first waypoint facing `start_heading_rad` at time `t0_s`. Each
    /// segment turns to face along its direction of travel while moving, so the final heading is
    /// the direction of the last non-zero segment.
    pub fn from_waypoints(
        waypoints: &[Vector2<f64>],
        start_heading_rad: f64,
        t0_s: f64,
        limits: &Limits,
    ) -> Result<Self, TrajError> {
        if waypoints.len() < 2 {
            return Err(TrajError::TooFewWaypoints(waypoints.len()));
        }

        let mut segments = Vec::with_capacity(waypoints.len() - 1);
        let mut t_s = t0_s;
        let mut heading_rad = start_heading_rad;

        for pair in waypoints.windows(2) {
            let delta = pair[1] - pair[0];
            let next_heading_rad = if delta[0].abs() < MIN_SEGMENT_LENGTH_M
                && delta[1].abs() < MIN_SEGMENT_LENGTH_M
            {
                heading_rad
            } else {
                delta[1].atan2(delta[0])
            };

            let start = State2::pose_only(Pose2::new(pair[0], heading_rad), t_s);
            let goal = Goal2::stop(Pose2::new(pair[1], next_heading_rad));
            let segment = TrapezoidalTrajectory::new(&start, &goal, limits)?;

            t_s = segment.tf_s();
            heading_rad = next_heading_rad;
            segments.push(segment);
        }

        debug!(
            "Built trajectory chain of {} segments lasting {:.3} s",
            segments.len(),
            t_s - t0_s
        );

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[TrapezoidalTrajectory] {
        &self.segments
    }

    /// The goal of the final segment.
    pub fn final_goal(&self) -> &Goal2 {
        // The constructor never produces an empty chain
        self.last().goal()
    }

    fn last(&self) -> &TrapezoidalTrajectory {
        &self.segments[self.segments.len() - 1]
    }
}

impl Trajectory for TrajectoryChain {
    fn t0_s(&self) -> f64 {
        self.segments[0].t0_s()
    }

    fn tf_s(&self) -> f64 {
        self.last().tf_s()
    }

    fn sample(&self, t_s: f64) -> TrajectorySample {
        match self.segments.iter().find(|s| t_s <= s.tf_s()) {
            Some(s) => s.sample(t_s),
            None => self.last().sample(t_s),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::loc::Twist2;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_too_few_waypoints() {
        let limits = Limits::default();
        assert_eq!(
            TrajectoryChain::from_waypoints(&[], 0.0, 0.0, &limits).unwrap_err(),
            TrajError::TooFewWaypoints(0)
        );
        assert_eq!(
            TrajectoryChain::from_waypoints(&[Vector2::zeros()], 0.0, 0.0, &limits).unwrap_err(),
            TrajError::TooFewWaypoints(1)
        );
    }

    #[test]
    fn test_chain_timing_and_headings() {
        let limits = Limits::default();
        let waypoints = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 1.0),
        ];
        let chain = TrajectoryChain::from_waypoints(&waypoints, 0.3, 1.0, &limits).unwrap();
        let segs = chain.segments();

        assert_eq!(segs.len(), 3);
        assert_eq!(chain.t0_s(), 1.0);
        assert_eq!(segs[1].t0_s(), segs[0].tf_s());
        assert_eq!(segs[2].t0_s(), segs[1].tf_s());
        assert_eq!(chain.tf_s(), segs[2].tf_s());

        assert!((segs[0].start().heading_rad() - 0.3).abs() < 1e-12);
        assert!(segs[0].goal().pose.heading_rad().abs() < 1e-12);
        assert!((segs[1].goal().pose.heading_rad() - FRAC_PI_2).abs() < 1e-12);

        // Zero length segment keeps the heading and takes no time
        assert!((segs[2].goal().pose.heading_rad() - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(segs[2].tf_s(), segs[2].t0_s());

        assert_eq!(chain.final_goal().pose.position_m, Vector2::new(1.0, 1.0));
    }

    #[test]
    fn test_chain_sampling() {
        let limits = Limits::default();
        let waypoints = [
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(2.0, 2.0),
        ];
        let chain = TrajectoryChain::from_waypoints(&waypoints, 0.0, 0.0, &limits).unwrap();
        let t_mid = chain.segments()[0].tf_s();

        // The joint between segments is the end of the first segment, at rest
        let joint = chain.sample(t_mid);
        assert_eq!(joint.pose.position_m, Vector2::new(2.0, 0.0));
        assert_eq!(joint.twist, Twist2::zero());

        // Within the second segment the robot moves along +Y
        let s = chain.sample(t_mid + 0.5 * chain.segments()[1].duration_s());
        assert!(s.twist.linear_ms[1] > 0.0);
        assert!(s.twist.linear_ms[0].abs() < 1e-12);

        // Before the start and after the end the chain is at rest
        assert_eq!(chain.sample(-1.0).pose.position_m, Vector2::zeros());
        let end = chain.sample(chain.tf_s() + 10.0);
        assert_eq!(end.pose, chain.final_goal().pose);
        assert_eq!(end.twist, Twist2::zero());
    }
}
