//! # Vision Client
//!
//! The vision client is the boundary between perception and the control core. It takes decoded
//! [`DetectionFrame`]s from a [`VisionSource`], converts them into [`WorldState`] snapshots and
//! publishes them to the [`WorldStateStore`].
//!
//! Conversion rules:
//!
//! - Positions are converted from millimeters to meters.
//! - The first detected ball is taken as the ball. With no ball detection the ball is invalid.
//! - Robots with ids outside the team slots are ignored. When an id is detected more than once in
//!   a frame, the last detection is kept.
//! - Robots not detected in the frame are not present.
//!
//! A bad frame is logged and dropped, it never stops the client.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    convert::TryFrom,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use log::{error, info, trace, warn};
use nalgebra::Vector2;

use crate::{
    auto::loc::{Pose2, State2},
    world::{BallState, RobotId, TeamState, WorldState, WorldStateStore},
};
use comms_if::eqpt::vision::{DetectionFrame, DetectionRobot};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const MM_PER_M: f64 = 1000.0;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of decoded detection frames.
pub trait VisionSource {
    /// Get the next frame.
    ///
    /// May block for a short time waiting for data. Returns `Ok(None)` if no frame arrived in that
    /// time.
    fn next_frame(&mut self) -> Result<Option<DetectionFrame>, VisionError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Converts frames and publishes the results.
pub struct VisionClient {
    store: Arc<WorldStateStore>,
    stats: VisionStats,
}

/// Counters kept by the vision client.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct VisionStats {
    /// Frames converted and published
    pub num_published: u64,

    /// Frames dropped because they could not be converted
    pub num_dropped: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum VisionError {
    #[error("Frame contains a non-finite {0}")]
    NonFiniteValue(&'static str),

    #[error("The vision source has disconnected")]
    Disconnected,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VisionClient {
    pub fn new(store: Arc<WorldStateStore>) -> Self {
        Self {
            store,
            stats: VisionStats::default(),
        }
    }

    /// Convert and publish one frame.
    ///
    /// Frames which cannot be converted are logged and dropped, the previous snapshot stays
    /// current.
    pub fn process_frame(&mut self, frame: &DetectionFrame) {
        match frame_to_world(frame) {
            Ok(world) => {
                self.store.update(world);
                self.stats.num_published += 1;
            }
            Err(e) => {
                warn!("Dropping vision frame at t = {:.3} s: {}", frame.t_capture_s, e);
                self.stats.num_dropped += 1;
            }
        }
    }

    pub fn stats(&self) -> VisionStats {
        self.stats
    }

    /// Run the client in a background thread, reading from `source` until `run` is cleared or the
    /// source disconnects.
    ///
    /// `run` is cleared when the thread exits, and the thread returns the client's counters.
    pub fn spawn<S>(mut self, mut source: S, run: Arc<AtomicBool>) -> JoinHandle<VisionStats>
    where
        S: VisionSource + Send + 'static,
    {
        thread::spawn(move || {
            info!("Vision client started");

            while run.load(Ordering::Relaxed) {
                match source.next_frame() {
                    Ok(Some(frame)) => self.process_frame(&frame),
                    Ok(None) => continue,
                    Err(VisionError::Disconnected) => {
                        error!("Vision source disconnected");
                        break;
                    }
                    Err(e) => warn!("Error reading from the vision source: {}", e),
                }
            }

            // Let the rest of the executable know no more data is coming
            run.store(false, Ordering::Relaxed);

            info!(
                "Vision client stopped, {} frames published, {} dropped",
                self.stats.num_published, self.stats.num_dropped
            );

            self.stats
        })
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert a detection frame into a world snapshot.
pub fn frame_to_world(frame: &DetectionFrame) -> Result<WorldState, VisionError> {
    if !frame.t_capture_s.is_finite() {
        return Err(VisionError::NonFiniteValue("capture time"));
    }

    let t_s = frame.t_capture_s;
    let mut world = WorldState::empty(t_s);

    if let Some(ball) = frame.balls.first() {
        let position_m = mm_to_m(ball.x_mm, ball.y_mm, "ball position")?;
        world.ball = BallState::seen(position_m, t_s);
    }

    fill_team(&mut world.blue, &frame.robots_blue, t_s)?;
    fill_team(&mut world.yellow, &frame.robots_yellow, t_s)?;

    trace!(
        "Vision frame at t = {:.3} s: ball {}, {} blue, {} yellow",
        t_s,
        if world.ball.valid { "seen" } else { "not seen" },
        world.blue.num_present(),
        world.yellow.num_present()
    );

    Ok(world)
}

fn fill_team(team: &mut TeamState, robots: &[DetectionRobot], t_s: f64) -> Result<(), VisionError> {
    for robot in robots {
        let id = match RobotId::try_from(robot.robot_id) {
            Ok(id) if id.slot().is_ok() => id,
            _ => {
                trace!("Ignoring {} robot with id {}", team.colour, robot.robot_id);
                continue;
            }
        };

        if team.is_present(id) {
            trace!("Replacing repeated detection of {} robot {}", team.colour, id);
        }

        let position_m = mm_to_m(robot.x_mm, robot.y_mm, "robot position")?;
        if !robot.orientation_rad.is_finite() {
            return Err(VisionError::NonFiniteValue("robot orientation"));
        }

        let state = State2::pose_only(Pose2::new(position_m, robot.orientation_rad), t_s);

        // The slot was checked above
        if team.set_robot(id, state).is_err() {
            continue;
        }
    }

    Ok(())
}

fn mm_to_m(x_mm: f64, y_mm: f64, what: &'static str) -> Result<Vector2<f64>, VisionError> {
    if x_mm.is_finite() && y_mm.is_finite() {
        Ok(Vector2::new(x_mm / MM_PER_M, y_mm / MM_PER_M))
    } else {
        Err(VisionError::NonFiniteValue(what))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::vision::DetectionBall;

    fn robot(robot_id: u32, x_mm: f64, y_mm: f64, orientation_rad: f64) -> DetectionRobot {
        DetectionRobot {
            robot_id,
            x_mm,
            y_mm,
            orientation_rad,
        }
    }

    #[test]
    fn test_frame_conversion() {
        let frame = DetectionFrame {
            t_capture_s: 12.5,
            balls: vec![
                DetectionBall { x_mm: 1500.0, y_mm: -250.0 },
                DetectionBall { x_mm: 0.0, y_mm: 0.0 },
            ],
            robots_blue: vec![robot(2, 1000.0, 2000.0, 0.5), robot(16, 0.0, 0.0, 0.0)],
            robots_yellow: vec![robot(0, 100.0, 100.0, 0.0), robot(0, -500.0, 0.0, 7.0)],
        };

        let world = frame_to_world(&frame).unwrap();

        assert_eq!(world.t_s, 12.5);
        assert!(world.ball.valid);
        assert_eq!(world.ball.position_m, Vector2::new(1.5, -0.25));
        assert_eq!(world.ball.velocity_ms, Vector2::zeros());

        let blue = world.blue.robot(RobotId::new(2)).unwrap();
        assert_eq!(blue.pose.position_m, Vector2::new(1.0, 2.0));
        assert_eq!(blue.pose.heading_rad(), 0.5);
        assert_eq!(blue.t_s, 12.5);
        assert!(!blue.twist_valid);
        assert_eq!(world.blue.num_present(), 1);

        // Last detection wins, heading wrapped
        let yellow = world.yellow.robot(RobotId::new(0)).unwrap();
        assert_eq!(yellow.pose.position_m, Vector2::new(-0.5, 0.0));
        assert!((yellow.pose.heading_rad() - (7.0 - std::f64::consts::TAU)).abs() < 1e-12);
    }

    #[test]
    fn test_no_ball() {
        let frame = DetectionFrame {
            t_capture_s: 1.0,
            ..Default::default()
        };
        let world = frame_to_world(&frame).unwrap();

        assert!(!world.ball.valid);
        assert_eq!(world.ball.position_m, Vector2::zeros());
        assert_eq!(world.blue.num_present() + world.yellow.num_present(), 0);
    }

    #[test]
    fn test_bad_frame_dropped() {
        let store = Arc::new(WorldStateStore::new());
        let mut client = VisionClient::new(store.clone());

        let good = DetectionFrame {
            t_capture_s: 1.0,
            robots_blue: vec![robot(1, 0.0, 0.0, 0.0)],
            ..Default::default()
        };
        let bad = DetectionFrame {
            t_capture_s: 2.0,
            robots_blue: vec![robot(1, f64::NAN, 0.0, 0.0)],
            ..Default::default()
        };

        assert_eq!(
            frame_to_world(&bad).unwrap_err(),
            VisionError::NonFiniteValue("robot position")
        );

        client.process_frame(&good);
        client.process_frame(&bad);

        assert_eq!(client.stats(), VisionStats { num_published: 1, num_dropped: 1 });
        assert_eq!(store.current().t_s, 1.0);
        assert!(store.current().blue.is_present(RobotId::new(1)));
    }

    struct ScriptedSource {
        frames: Vec<Result<Option<DetectionFrame>, VisionError>>,
    }

    impl VisionSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Option<DetectionFrame>, VisionError> {
            if self.frames.is_empty() {
                Err(VisionError::Disconnected)
            } else {
                self.frames.remove(0)
            }
        }
    }

    #[test]
    fn test_thread_runs_until_disconnect() {
        let store = Arc::new(WorldStateStore::new());
        let frame = |t| DetectionFrame {
            t_capture_s: t,
            ..Default::default()
        };
        let source = ScriptedSource {
            frames: vec![
                Ok(Some(frame(1.0))),
                Ok(None),
                Err(VisionError::NonFiniteValue("test")),
                Ok(Some(frame(f64::INFINITY))),
                Ok(Some(frame(3.0))),
            ],
        };

        let run = Arc::new(AtomicBool::new(true));
        let stats = VisionClient::new(store.clone())
            .spawn(source, run.clone())
            .join()
            .unwrap();

        assert!(!run.load(Ordering::Relaxed));
        assert_eq!(stats, VisionStats { num_published: 2, num_dropped: 1 });
        assert_eq!(store.current().t_s, 3.0);
        assert_eq!(store.num_updates(), 2);
    }

    /// Source that never produces a frame and never disconnects.
    struct IdleSource;

    impl VisionSource for IdleSource {
        fn next_frame(&mut self) -> Result<Option<DetectionFrame>, VisionError> {
            thread::sleep(std::time::Duration::from_millis(1));
            Ok(None)
        }
    }

    #[test]
    fn test_thread_stops_when_run_cleared() {
        let store = Arc::new(WorldStateStore::new());
        let run = Arc::new(AtomicBool::new(true));

        let jh = VisionClient::new(store.clone()).spawn(IdleSource, run.clone());
        thread::sleep(std::time::Duration::from_millis(20));

        // As done by the interrupt handler
        run.store(false, Ordering::Relaxed);

        let stats = jh.join().unwrap();
        assert_eq!(stats, VisionStats::default());
        assert_eq!(store.num_updates(), 0);
    }
}
