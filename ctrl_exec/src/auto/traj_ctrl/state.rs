//! Trajectory control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
use super::*;
use crate::auto::{
    loc::Pose2,
    traj::{TrajError, Trajectory, TrajectoryChain, TrajectorySample},
};
use util::{maths::get_ang_dist, module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-robot trajectory follower.
pub struct TrajCtrl {
    params: Params,

    /// Executing mode
    mode: TrajCtrlMode,

    /// The trajectory being followed
    trajectory: Option<TrajectoryChain>,

    /// Controller used to calculate the velocity commands
    controller: Se2Controller,

    report: StatusReport,
}

/// Input data to trajectory control.
#[derive(Debug, Copy, Clone)]
pub struct InputData {
    /// Current measured pose of the robot
    pub pose: Pose2,

    /// Current time, on the same clock as the trajectory
    pub t_s: f64,

    /// Time since the previous cycle
    pub dt_s: f64,
}

/// The status report containing the tracking errors.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Distance between the robot and the reference position
    pub pos_error_m: f64,

    /// Signed heading error, reference minus measured
    pub head_error_rad: f64,

    /// True if the robot is within the tolerances of the final goal
    pub goal_reached: bool,

    /// The reference sample tracked this cycle, if following
    pub reference: Option<TrajectorySample>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Could not build the controllers: {0}")]
    ControllerError(#[from] CtrlError),

    #[error("Could not build the trajectory: {0}")]
    TrajectoryError(#[from] TrajError),

    /// A trajectory is already loaded. To follow a new one the current trajectory must finish or
    /// be aborted first.
    #[error("Attempted to load a trajectory while one is already being followed")]
    TrajectoryAlreadyLoaded,

    /// The module is following but no trajectory is loaded.
    #[error("No trajectory has been set")]
    NoTrajectory,
}

/// The possible modes of execution of TrajCtrl.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TrajCtrlMode {
    /// Nothing to follow, stop commands are output
    Off,

    /// Tracking the loaded trajectory
    Following,

    /// The trajectory has ended, stop commands are output until a new one is loaded
    Finished,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for TrajCtrl {
    type InitData = Params;
    type InitError = TrajCtrlError;

    type InputData = InputData;
    type OutputData = Command2;
    type StatusReport = StatusReport;
    type ProcError = TrajCtrlError;

    /// Reinitialise the TrajCtrl module with new parameters.
    ///
    /// Any trajectory being followed is dropped. On error the module is left unchanged.
    fn init(&mut self, params: Self::InitData) -> Result<(), Self::InitError> {
        *self = Self::new(params)?;
        Ok(())
    }

    /// Process trajectory control.
    ///
    /// Processing involves:
    ///  1. Sampling the reference trajectory at the current time
    ///  1. Calculating the command from the error between the reference and measured pose
    ///  1. Checking whether the trajectory has finished
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();

        let cmd = match self.mode {
            TrajCtrlMode::Off | TrajCtrlMode::Finished => Command2::stop(),
            TrajCtrlMode::Following => self.mode_following(input_data)?,
        };

        Ok((cmd, self.report))
    }
}

impl TrajCtrl {
    /// Create a new instance from the given parameters, in `Off` mode.
    pub fn new(params: Params) -> Result<Self, TrajCtrlError> {
        let controller = Se2Controller::with_slew_rates(
            params.pos_k_p,
            params.head_k_p,
            params.lin_slew_rate_mss,
            params.ang_slew_rate_radss,
            &params.limits,
        )?;

        Ok(Self {
            params,
            mode: TrajCtrlMode::Off,
            trajectory: None,
            controller,
            report: StatusReport::default(),
        })
    }

    /// Build the module from a parameter file, relative to the params directory.
    pub fn from_params_file(params_path: &str) -> Result<Self, TrajCtrlError> {
        let params: Params = params::load(params_path).map_err(TrajCtrlError::ParamLoadError)?;
        Self::new(params)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn mode(&self) -> TrajCtrlMode {
        self.mode
    }

    pub fn trajectory(&self) -> Option<&TrajectoryChain> {
        self.trajectory.as_ref()
    }

    /// Begin following a trajectory.
    ///
    /// Following begins on the next call to `proc`. Loading a new trajectory while one is being
    /// followed is an error, call [`TrajCtrl::abort`] first.
    pub fn begin(&mut self, trajectory: TrajectoryChain) -> Result<(), TrajCtrlError> {
        if self.mode == TrajCtrlMode::Following {
            return Err(TrajCtrlError::TrajectoryAlreadyLoaded);
        }

        info!(
            "TrajCtrl following trajectory of {} segments from t = {:.3} s to {:.3} s",
            trajectory.segments().len(),
            trajectory.t0_s(),
            trajectory.tf_s()
        );

        self.trajectory = Some(trajectory);
        self.controller.reset();
        self.mode = TrajCtrlMode::Following;

        Ok(())
    }

    /// Abort the current trajectory, stopping the robot.
    pub fn abort(&mut self) {
        if self.trajectory.is_some() {
            info!("TrajCtrl trajectory aborted");
        }

        self.trajectory = None;
        self.mode = TrajCtrlMode::Off;
    }

    /// Mode following.
    ///
    /// Tracks the reference. Once the end of the trajectory has passed and the goal is reached, or
    /// the settling time has run out, the mode switches to `Finished`.
    fn mode_following(&mut self, input: &InputData) -> Result<Command2, TrajCtrlError> {
        let trajectory = match self.trajectory {
            Some(ref t) => t,
            None => return Err(TrajCtrlError::NoTrajectory),
        };

        let reference = trajectory.sample(input.t_s);
        let goal_reached = trajectory.final_goal().is_reached(&input.pose);
        let tf_s = trajectory.tf_s();

        self.report.pos_error_m = (reference.pose.position_m - input.pose.position_m).norm();
        self.report.head_error_rad =
            get_ang_dist(input.pose.heading_rad(), reference.pose.heading_rad());
        self.report.goal_reached = goal_reached;
        self.report.reference = Some(reference);

        if input.t_s >= tf_s {
            if goal_reached {
                info!("TrajCtrl goal reached at t = {:.3} s", input.t_s);
                self.mode = TrajCtrlMode::Finished;
                return Ok(Command2::stop());
            }

            if input.t_s >= tf_s + self.params.settle_time_s {
                warn!(
                    "TrajCtrl goal not reached {:.3} s after the end of the trajectory, \
                    position error {:.4} m",
                    self.params.settle_time_s,
                    self.report.pos_error_m
                );
                self.mode = TrajCtrlMode::Finished;
                return Ok(Command2::stop());
            }
        }

        let cmd = self.controller.update(
            &input.pose,
            &reference.pose,
            &reference.twist,
            input.dt_s,
        )?;

        Ok(cmd)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::limits::Limits;
    use nalgebra::Vector2;

    const DT_S: f64 = 0.02;

    fn straight_chain() -> TrajectoryChain {
        TrajectoryChain::from_waypoints(
            &[Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)],
            0.0,
            0.0,
            &Limits::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_off_outputs_stop() {
        let mut tc = TrajCtrl::new(Params::default()).unwrap();
        let input = InputData {
            pose: Pose2::default(),
            t_s: 0.0,
            dt_s: DT_S,
        };

        let (cmd, report) = tc.proc(&input).unwrap();
        assert_eq!(cmd, Command2::stop());
        assert!(report.reference.is_none());
        assert_eq!(tc.mode(), TrajCtrlMode::Off);
    }

    #[test]
    fn test_begin_twice_rejected() {
        let mut tc = TrajCtrl::new(Params::default()).unwrap();
        tc.begin(straight_chain()).unwrap();

        match tc.begin(straight_chain()) {
            Err(TrajCtrlError::TrajectoryAlreadyLoaded) => (),
            r => panic!("Expected already loaded error, got {:?}", r.err()),
        }

        tc.abort();
        assert_eq!(tc.mode(), TrajCtrlMode::Off);
        assert!(tc.trajectory().is_none());
        assert!(tc.begin(straight_chain()).is_ok());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut tc = TrajCtrl::new(Params::default()).unwrap();
        let params = Params {
            lin_slew_rate_mss: -1.0,
            ..Default::default()
        };

        match tc.init(params) {
            Err(TrajCtrlError::ControllerError(CtrlError::NegativeSlewRate(_))) => (),
            r => panic!("Expected slew rate error, got {:?}", r),
        }
    }

    #[test]
    fn test_follow_to_finish() {
        let mut tc = TrajCtrl::new(Params::default()).unwrap();
        tc.begin(straight_chain()).unwrap();

        let mut pose = Pose2::default();
        let mut t_s = 0.0;

        while tc.mode() == TrajCtrlMode::Following {
            let (cmd, report) = tc.proc(&InputData { pose, t_s, dt_s: DT_S }).unwrap();
            assert!(report.reference.is_some() || tc.mode() == TrajCtrlMode::Finished);

            pose = Pose2::new(
                pose.position_m + cmd.linear_ms * DT_S,
                pose.heading_rad() + cmd.angular_rads * DT_S,
            );
            t_s += DT_S;

            assert!(t_s < 10.0, "TrajCtrl never finished");
        }

        assert_eq!(tc.mode(), TrajCtrlMode::Finished);
        assert!((pose.position_m - Vector2::new(1.0, 0.0)).norm() < 0.01);

        // Finished keeps the robot stopped
        let (cmd, _) = tc.proc(&InputData { pose, t_s, dt_s: DT_S }).unwrap();
        assert_eq!(cmd, Command2::stop());

        // A new trajectory may now be followed
        assert!(tc.begin(straight_chain()).is_ok());
    }

    #[test]
    fn test_bad_dt_propagates() {
        let mut tc = TrajCtrl::new(Params::default()).unwrap();
        tc.begin(straight_chain()).unwrap();

        match tc.proc(&InputData { pose: Pose2::default(), t_s: 0.1, dt_s: 0.0 }) {
            Err(TrajCtrlError::ControllerError(CtrlError::NonPositiveDt(_))) => (),
            r => panic!("Expected dt error, got {:?}", r.map(|(c, _)| c)),
        }
    }

    #[test]
    fn test_reload_after_abort_on_error() {
        let mut tc = TrajCtrl::new(Params::default()).unwrap();
        tc.begin(straight_chain()).unwrap();

        let bad = InputData { pose: Pose2::default(), t_s: 0.1, dt_s: -DT_S };
        assert!(tc.proc(&bad).is_err());

        // Aborting leaves the module off, waiting for a new trajectory
        tc.abort();
        assert_eq!(tc.mode(), TrajCtrlMode::Off);
        assert!(tc.trajectory().is_none());

        tc.begin(straight_chain()).unwrap();
        assert_eq!(tc.mode(), TrajCtrlMode::Following);

        let good = InputData { pose: Pose2::default(), t_s: 0.1, dt_s: DT_S };
        let (cmd, _) = tc.proc(&good).unwrap();
        assert!(cmd.linear_ms.x > 0.0);
    }
}
