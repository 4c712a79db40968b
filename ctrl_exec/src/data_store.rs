//! # Data Store

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{sync::Arc, time::Instant};

use crate::{
    auto::{loc::State2, traj_ctrl},
    world::{RobotId, TeamColour, WorldState},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Start of the first cycle, the zero of the loop clock
    pub loop_epoch: Option<Instant>,

    /// Loop clock time at the start of the cycle
    pub sim_time_s: f64,

    /// Loop clock time at the start of the previous cycle
    pub prev_sim_time_s: Option<f64>,

    // Perception
    /// Snapshot of the world read at the start of the cycle
    pub world: Arc<WorldState>,

    /// State of the controlled robot, if it is seen this cycle
    pub robot_state: Option<State2>,

    /// Capture time of the last snapshot processed
    pub last_vision_t_s: Option<f64>,

    // TrajCtrl
    pub traj_ctrl_input: Option<traj_ctrl::InputData>,
    pub traj_ctrl_output: traj_ctrl::Command2,
    pub traj_ctrl_status_rpt: traj_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive cycles in which no new vision snapshot arrived
    pub num_consec_stale_vision: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, sets the 1Hz cycle flag and
    /// takes the latest world snapshot.
    ///
    /// The loop clock counts from `cycle_start_instant` of the first cycle and is monotonic.
    pub fn cycle_start(
        &mut self,
        cycle_frequency_hz: f64,
        world: Arc<WorldState>,
        cycle_start_instant: Instant,
    ) {
        let cycles_per_s = (cycle_frequency_hz as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.traj_ctrl_input = None;
        self.traj_ctrl_output = traj_ctrl::Command2::stop();
        self.traj_ctrl_status_rpt = traj_ctrl::StatusReport::default();

        if self.last_vision_t_s == Some(world.t_s) {
            self.num_consec_stale_vision += 1;
        } else {
            self.num_consec_stale_vision = 0;
        }
        self.last_vision_t_s = Some(world.t_s);
        self.world = world;

        self.prev_sim_time_s = if self.num_cycles == 0 {
            None
        } else {
            Some(self.sim_time_s)
        };
        let epoch = *self.loop_epoch.get_or_insert(cycle_start_instant);
        self.sim_time_s = cycle_start_instant
            .saturating_duration_since(epoch)
            .as_secs_f64();
    }

    /// Select the controlled robot from this cycle's snapshot.
    pub fn select_robot(&mut self, team: TeamColour, id: RobotId) {
        self.robot_state = self.world.team(team).robot(id).copied();
    }

    /// Time elapsed since the previous cycle, if there was one and the clock has moved on.
    pub fn cycle_dt_s(&self) -> Option<f64> {
        self.prev_sim_time_s
            .map(|p| self.sim_time_s - p)
            .filter(|dt| *dt > 0.0)
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::loc::Pose2;
    use nalgebra::Vector2;
    use std::time::Duration;

    #[test]
    fn test_cycle_bookkeeping() {
        let mut ds = DataStore::default();
        let world = Arc::new(WorldState::empty(1.0));
        let t0 = Instant::now();

        ds.cycle_start(10.0, world.clone(), t0);
        assert!(ds.is_1_hz_cycle);
        assert_eq!(ds.sim_time_s, 0.0);
        assert_eq!(ds.cycle_dt_s(), None);
        assert_eq!(ds.num_consec_stale_vision, 0);
        ds.cycle_end();

        ds.cycle_start(10.0, world, t0 + Duration::from_millis(100));
        assert!(!ds.is_1_hz_cycle);
        assert!((ds.sim_time_s - 0.1).abs() < 1e-9);
        assert!((ds.cycle_dt_s().unwrap() - 0.1).abs() < 1e-9);
        assert_eq!(ds.num_consec_stale_vision, 1);
        ds.cycle_end();

        ds.cycle_start(10.0, Arc::new(WorldState::empty(2.0)), t0 + Duration::from_millis(200));
        assert_eq!(ds.num_consec_stale_vision, 0);
    }

    #[test]
    fn test_loop_clock_never_goes_back() {
        let mut ds = DataStore::default();
        let world = Arc::new(WorldState::empty(1.0));
        let t0 = Instant::now();

        ds.cycle_start(50.0, world.clone(), t0 + Duration::from_millis(40));
        ds.cycle_end();
        ds.cycle_start(50.0, world.clone(), t0 + Duration::from_millis(60));
        ds.cycle_end();
        assert!((ds.cycle_dt_s().unwrap() - 0.02).abs() < 1e-9);

        // An instant before the epoch is clamped, leaving no positive step to control with
        ds.cycle_start(50.0, world.clone(), t0);
        ds.cycle_end();
        assert_eq!(ds.sim_time_s, 0.0);
        assert_eq!(ds.cycle_dt_s(), None);

        // A repeated instant gives no step either
        ds.cycle_start(50.0, world, t0);
        assert_eq!(ds.cycle_dt_s(), None);
    }

    #[test]
    fn test_select_robot() {
        let mut world = WorldState::empty(1.0);
        let state = State2::pose_only(Pose2::new(Vector2::new(1.0, 2.0), 0.0), 1.0);
        world.blue.set_robot(RobotId::new(1), state).unwrap();

        let mut ds = DataStore::default();
        ds.cycle_start(50.0, Arc::new(world), Instant::now());

        ds.select_robot(TeamColour::Blue, RobotId::new(1));
        assert_eq!(ds.robot_state, Some(state));

        ds.select_robot(TeamColour::Yellow, RobotId::new(1));
        assert_eq!(ds.robot_state, None);
    }
}
