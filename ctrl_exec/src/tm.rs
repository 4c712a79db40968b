//! # Telemetry
//!
//! Builds [`TmSnapshot`]s from the world state and the controller outputs, and records them to
//! the session directory as newline delimited JSON.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use comms_if::tm::{TmBall, TmCtrl, TmPose, TmRobot, TmSnapshot, TmTeam, TmTwist};

use crate::{
    auto::{
        loc::{Pose2, State2, Twist2},
        traj_ctrl::{self, Command2},
    },
    world::{RobotId, TeamColour, TeamState, WorldState},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Writes telemetry snapshots to a file, one JSON object per line.
pub struct TmRecorder {
    path: PathBuf,
    writer: BufWriter<File>,
    num_records: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmError {
    #[error("Could not create the telemetry file {0:?}: {1}")]
    CreateError(PathBuf, std::io::Error),

    #[error("Could not serialize the telemetry: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not write the telemetry: {0}")]
    WriteError(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmRecorder {
    /// Create a recorder writing to a new file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, TmError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| TmError::CreateError(path.clone(), e))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            num_records: 0,
        })
    }

    pub fn record(&mut self, snapshot: &TmSnapshot) -> Result<(), TmError> {
        serde_json::to_writer(&mut self.writer, snapshot).map_err(TmError::SerializationError)?;
        self.writer.write_all(b"\n").map_err(TmError::WriteError)?;
        self.num_records += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), TmError> {
        self.writer.flush().map_err(TmError::WriteError)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn num_records(&self) -> u64 {
        self.num_records
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the telemetry snapshot for one cycle.
///
/// Every team slot gets an entry, robots that are not present are reported with zero pose and
/// twist.
pub fn build_snapshot(world: &WorldState, t_s: f64, ctrl: Vec<TmCtrl>) -> TmSnapshot {
    TmSnapshot {
        t_s,
        t_vision_s: world.t_s,
        ball: TmBall {
            x_m: world.ball.position_m.x,
            y_m: world.ball.position_m.y,
            vx_ms: world.ball.velocity_ms.x,
            vy_ms: world.ball.velocity_ms.y,
            valid: world.ball.valid,
        },
        blue: team_tm(&world.blue),
        yellow: team_tm(&world.yellow),
        ctrl,
    }
}

/// Build the telemetry entry for one controlled robot.
///
/// If the controller has no reference this cycle the target is zero.
pub fn ctrl_entry(
    team: TeamColour,
    id: RobotId,
    report: &traj_ctrl::StatusReport,
    output: &Command2,
) -> TmCtrl {
    let (target_pose, target_twist) = match report.reference {
        Some(r) => (pose_tm(&r.pose), twist_tm(&r.twist)),
        None => (TmPose::default(), TmTwist::default()),
    };

    TmCtrl {
        team: team_colour_tm(team),
        robot_id: id.value(),
        target_pose,
        target_twist,
        output: TmTwist {
            vx_ms: output.linear_ms.x,
            vy_ms: output.linear_ms.y,
            omega_rads: output.angular_rads,
        },
    }
}

fn team_tm(team: &TeamState) -> Vec<TmRobot> {
    team.slots()
        .map(|(id, state)| match state {
            Some(s) => robot_tm(id, s),
            None => TmRobot {
                id: id.value(),
                present: false,
                ..Default::default()
            },
        })
        .collect()
}

fn robot_tm(id: RobotId, state: &State2) -> TmRobot {
    TmRobot {
        id: id.value(),
        pose: pose_tm(&state.pose),
        twist: if state.twist_valid {
            twist_tm(&state.twist)
        } else {
            TmTwist::default()
        },
        present: true,
    }
}

fn pose_tm(pose: &Pose2) -> TmPose {
    TmPose {
        x_m: pose.position_m.x,
        y_m: pose.position_m.y,
        heading_rad: pose.heading_rad(),
    }
}

fn twist_tm(twist: &Twist2) -> TmTwist {
    TmTwist {
        vx_ms: twist.linear_ms.x,
        vy_ms: twist.linear_ms.y,
        omega_rads: twist.angular_rads,
    }
}

fn team_colour_tm(team: TeamColour) -> TmTeam {
    match team {
        TeamColour::Blue => TmTeam::Blue,
        TeamColour::Yellow => TmTeam::Yellow,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        auto::{loc::Frame2, traj::TrajectorySample},
        world::{BallState, MAX_ROBOTS_PER_TEAM},
    };
    use nalgebra::Vector2;

    #[test]
    fn test_snapshot_has_every_slot() {
        let mut world = WorldState::empty(3.0);
        world.ball = BallState::seen(Vector2::new(1.0, 2.0), 3.0);
        world
            .blue
            .set_robot(
                RobotId::new(4),
                State2::new(
                    Pose2::new(Vector2::new(0.5, -0.5), 1.0),
                    Twist2::new(Vector2::new(0.1, 0.2), 0.3),
                    3.0,
                    Frame2::World,
                ),
            )
            .unwrap();
        world
            .yellow
            .set_robot(
                RobotId::new(0),
                State2::pose_only(Pose2::new(Vector2::new(1.0, 1.0), 0.0), 3.0),
            )
            .unwrap();

        let snapshot = build_snapshot(&world, 3.25, Vec::new());

        assert_eq!(snapshot.t_s, 3.25);
        assert_eq!(snapshot.t_vision_s, 3.0);
        assert!(snapshot.ball.valid);
        assert_eq!(snapshot.ball.y_m, 2.0);
        assert_eq!(snapshot.blue.len(), MAX_ROBOTS_PER_TEAM);
        assert_eq!(snapshot.yellow.len(), MAX_ROBOTS_PER_TEAM);

        let blue = snapshot.blue[4];
        assert!(blue.present);
        assert_eq!(blue.id, 4);
        assert_eq!(blue.pose.heading_rad, 1.0);
        assert_eq!(blue.twist.omega_rads, 0.3);

        // Pose only, so the twist is reported as zero
        assert_eq!(snapshot.yellow[0].twist, TmTwist::default());

        assert!(!snapshot.blue[3].present);
        assert_eq!(snapshot.blue[3].id, 3);
        assert_eq!(snapshot.blue[3].pose, TmPose::default());
    }

    #[test]
    fn test_ctrl_entry() {
        let report = traj_ctrl::StatusReport {
            reference: Some(TrajectorySample {
                pose: Pose2::new(Vector2::new(2.0, 1.0), 0.5),
                twist: Twist2::new(Vector2::new(1.0, 0.0), 0.0),
                t_s: 1.0,
            }),
            ..Default::default()
        };
        let cmd = Command2::new(Vector2::new(1.5, -0.5), 0.25);

        let entry = ctrl_entry(TeamColour::Yellow, RobotId::new(7), &report, &cmd);

        assert_eq!(entry.team, TmTeam::Yellow);
        assert_eq!(entry.robot_id, 7);
        assert_eq!(entry.target_pose.x_m, 2.0);
        assert_eq!(entry.target_twist.vx_ms, 1.0);
        assert_eq!(entry.output.vy_ms, -0.5);
        assert_eq!(entry.output.omega_rads, 0.25);

        let idle = ctrl_entry(
            TeamColour::Blue,
            RobotId::new(0),
            &traj_ctrl::StatusReport::default(),
            &Command2::stop(),
        );
        assert_eq!(idle.target_pose, TmPose::default());
    }

    #[test]
    fn test_recorder_writes_lines() {
        let dir = std::env::temp_dir().join(format!("ctrl_tm_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut recorder = TmRecorder::new(dir.join("tm.jsonl")).unwrap();
        let snapshot = build_snapshot(&WorldState::empty(0.0), 0.1, Vec::new());
        recorder.record(&snapshot).unwrap();
        recorder.record(&snapshot).unwrap();
        recorder.flush().unwrap();

        let contents = std::fs::read_to_string(recorder.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(recorder.num_records(), 2);

        let parsed: TmSnapshot = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, snapshot);

        std::fs::remove_dir_all(&dir).ok();
    }
}
