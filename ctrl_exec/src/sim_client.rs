//! # Simulation Client
//!
//! Provides a simulated vision source for testing and development of the control core without a
//! real field. The simulation integrates the latest velocity command sent to each robot and
//! produces detection frames in the same format as the real vision system, so the rest of the
//! software runs unchanged.
//!
//! Robots are modelled as ideal holonomic bodies: a [`Command2`] (world frame) is applied exactly
//! and held until the next command arrives. The ball is static.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    thread,
    time::{Duration, Instant},
};

use log::{debug, trace};
use nalgebra::Vector2;
use serde::Deserialize;

use crate::{
    auto::{loc::Pose2, traj_ctrl::Command2},
    vision_client::{VisionError, VisionSource},
    world::{RobotId, TeamColour},
};
use comms_if::eqpt::vision::{DetectionBall, DetectionFrame, DetectionRobot};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Time between two frames, both simulated and (if `real_time`) on the wall clock
    pub frame_period_s: f64,

    /// If true the simulation waits so that frames are produced at the frame period
    pub real_time: bool,

    /// Position of the ball, or no ball at all
    pub ball_m: Option<[f64; 2]>,

    pub robots: Vec<SimRobotParams>,
}

/// Initial placement of a simulated robot.
#[derive(Debug, Clone, Deserialize)]
pub struct SimRobotParams {
    pub team: TeamColour,
    pub id: RobotId,

    /// Initial `[x, y, heading]` in meters and radians
    pub pose: [f64; 3],
}

/// Where the controller sends commands for the simulated robots.
///
/// Cheap to clone, all clones share the same commands.
#[derive(Debug, Clone, Default)]
pub struct SimCommandSink {
    commands: Arc<Mutex<HashMap<(TeamColour, RobotId), Command2>>>,
}

/// Vision source backed by a kinematic simulation.
pub struct SimVision {
    params: SimParams,
    t_s: f64,
    robots: Vec<SimRobot>,
    sink: SimCommandSink,
    last_frame_instant: Option<Instant>,
}

struct SimRobot {
    team: TeamColour,
    id: RobotId,
    pose: Pose2,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            frame_period_s: 0.02,
            real_time: true,
            ball_m: None,
            robots: Vec::new(),
        }
    }
}

impl SimCommandSink {
    /// Set the command for one robot, replacing any previous one.
    pub fn send(&self, team: TeamColour, id: RobotId, cmd: Command2) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((team, id), cmd);
    }

    /// Stop every robot.
    pub fn stop_all(&self) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// The current command for a robot, robots which were never commanded are stopped.
    pub fn get(&self, team: TeamColour, id: RobotId) -> Command2 {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(team, id))
            .copied()
            .unwrap_or_else(Command2::stop)
    }
}

impl SimVision {
    pub fn new(params: SimParams) -> Self {
        let robots = params
            .robots
            .iter()
            .map(|r| SimRobot {
                team: r.team,
                id: r.id,
                pose: Pose2::new(Vector2::new(r.pose[0], r.pose[1]), r.pose[2]),
            })
            .collect();

        debug!(
            "Simulation created with {} robots, frame period {} s",
            params.robots.len(),
            params.frame_period_s
        );

        Self {
            params,
            t_s: 0.0,
            robots,
            sink: SimCommandSink::default(),
            last_frame_instant: None,
        }
    }

    /// Get a handle to send commands to the simulated robots.
    pub fn command_sink(&self) -> SimCommandSink {
        self.sink.clone()
    }

    /// Simulated time of the last frame.
    pub fn t_s(&self) -> f64 {
        self.t_s
    }

    /// True pose of a simulated robot.
    pub fn robot_pose(&self, team: TeamColour, id: RobotId) -> Option<Pose2> {
        self.robots
            .iter()
            .find(|r| r.team == team && r.id == id)
            .map(|r| r.pose)
    }

    /// Advance the simulation by one frame period.
    pub fn step(&mut self) {
        let dt = self.params.frame_period_s;

        for robot in self.robots.iter_mut() {
            let cmd = self.sink.get(robot.team, robot.id);
            robot.pose = Pose2::new(
                robot.pose.position_m + cmd.linear_ms * dt,
                robot.pose.heading_rad() + cmd.angular_rads * dt,
            );
        }

        self.t_s += dt;
    }

    /// Build the detection frame for the current simulation state.
    pub fn frame(&self) -> DetectionFrame {
        let mut frame = DetectionFrame {
            t_capture_s: self.t_s,
            balls: self
                .params
                .ball_m
                .iter()
                .map(|b| DetectionBall {
                    x_mm: b[0] * 1000.0,
                    y_mm: b[1] * 1000.0,
                })
                .collect(),
            ..Default::default()
        };

        for robot in self.robots.iter() {
            let det = DetectionRobot {
                robot_id: robot.id.value() as u32,
                x_mm: robot.pose.position_m.x * 1000.0,
                y_mm: robot.pose.position_m.y * 1000.0,
                orientation_rad: robot.pose.heading_rad(),
            };

            match robot.team {
                TeamColour::Blue => frame.robots_blue.push(det),
                TeamColour::Yellow => frame.robots_yellow.push(det),
            }
        }

        frame
    }

    /// Sleep until a frame period has passed since the last frame.
    fn wait_for_frame(&mut self) {
        let period = Duration::from_secs_f64(self.params.frame_period_s);

        if let Some(last) = self.last_frame_instant {
            if let Some(remaining) = period.checked_sub(last.elapsed()) {
                thread::sleep(remaining);
            }
        }

        self.last_frame_instant = Some(Instant::now());
    }
}

impl VisionSource for SimVision {
    fn next_frame(&mut self) -> Result<Option<DetectionFrame>, VisionError> {
        if self.params.real_time {
            self.wait_for_frame();
        }

        self.step();

        trace!("Sim frame at t = {:.3} s", self.t_s);

        Ok(Some(self.frame()))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
